use crate::index_space::Axis;




/**
 * Enum to hold a unit vector in the plane of the grid. Fluxes and Riemann
 * problems are always posed along one of these directions.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    X,
    Y,
}




// ============================================================================
impl Direction {
    pub fn along(&self, other: Direction) -> f64 {
        match (self, other) {
            (Direction::X, Direction::X) => 1.0,
            (Direction::Y, Direction::Y) => 1.0,
            _ => 0.0,
        }
    }
}

impl From<Axis> for Direction {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::I => Direction::X,
            Axis::J => Direction::Y,
        }
    }
}
