use std::str::FromStr;
use crate::error::Error;
use crate::hydro::euler2d::Conserved;
use crate::hydro::geometry::Direction;
use crate::index_space::{Axis, IndexSpace};
use crate::patch::Patch;




/**
 * The condition imposed on one side of the domain, by filling its guard
 * zones before each step.
 *
 * - `Transmissive`: guard zones copy the innermost real cell (zero gradient)
 * - `Periodic`: guard zones copy the real cells on the opposite side
 * - `Wall`: guard zones mirror the real cells about the boundary face, with
 *   the momentum normal to the wall negated
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryCondition {
    Transmissive,
    Periodic,
    Wall,
}




#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Bottom,
    Top,
}




/**
 * The boundary conditions on all four sides of a rectangular domain. A
 * periodic side must be paired with a periodic opposite side.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Boundaries {
    left: BoundaryCondition,
    right: BoundaryCondition,
    bottom: BoundaryCondition,
    top: BoundaryCondition,
}




// ============================================================================
impl FromStr for BoundaryCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "transmissive" => Ok(BoundaryCondition::Transmissive),
            "periodic" => Ok(BoundaryCondition::Periodic),
            "wall" => Ok(BoundaryCondition::Wall),
            _ => Err(Error::UnknownBoundaryCondition(s.to_string())),
        }
    }
}




// ============================================================================
impl Side {
    fn axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::I,
            Side::Bottom | Side::Top => Axis::J,
        }
    }
}




// ============================================================================
impl Boundaries {

    pub fn new(
        left: BoundaryCondition,
        right: BoundaryCondition,
        bottom: BoundaryCondition,
        top: BoundaryCondition) -> Result<Self, Error>
    {
        use BoundaryCondition::Periodic;

        if (left == Periodic) != (right == Periodic) {
            return Err(Error::UnpairedPeriodicBoundary("x1"))
        }
        if (bottom == Periodic) != (top == Periodic) {
            return Err(Error::UnpairedPeriodicBoundary("x2"))
        }
        Ok(Self { left, right, bottom, top })
    }

    pub fn periodic() -> Self {
        let p = BoundaryCondition::Periodic;
        Self { left: p, right: p, bottom: p, top: p }
    }

    pub fn get(&self, side: Side) -> BoundaryCondition {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Top => self.top,
        }
    }


    /**
     * Fill the guard zones of the state patch, which surrounds the given
     * interior space. The x1 sides are filled over the interior rows first;
     * the x2 sides are then filled across the full width of the patch, so the
     * corner zones are copied from guard zones that are already valid.
     */
    pub fn apply(&self, state: &mut Patch, interior: &IndexSpace) {
        let (i0, j0) = interior.start();
        let (i1, j1) = interior.end();
        let (x0, y0) = state.index_space().start();
        let (x1, y1) = state.index_space().end();

        let li = IndexSpace::new(x0..i0, j0..j1);
        let ri = IndexSpace::new(i1..x1, j0..j1);
        let lj = IndexSpace::new(x0..x1, y0..j0);
        let rj = IndexSpace::new(x0..x1, j1..y1);

        for (side, region) in [(Side::Left, li), (Side::Right, ri), (Side::Bottom, lj), (Side::Top, rj)] {
            let bc = self.get(side);

            for index in region.iter() {
                state.copy_cell(source_index(bc, side, index, interior), index);

                if bc == BoundaryCondition::Wall {
                    let direction = Direction::from(side.axis());
                    let u = Conserved::from(state.get_slice(index)).reflect(direction);
                    u.write_to_slice(state.get_slice_mut(index));
                }
            }
        }
    }
}




/**
 * Return the real cell from which the guard zone at `index` takes its
 * value. Only the coordinate normal to the side is changed.
 */
fn source_index(bc: BoundaryCondition, side: Side, index: (i64, i64), interior: &IndexSpace) -> (i64, i64) {
    let axis = side.axis();
    let range = interior.range(axis);
    let n = range.end - range.start;
    let k = match axis {
        Axis::I => index.0,
        Axis::J => index.1,
    } - range.start;

    let lower = matches!(side, Side::Left | Side::Bottom);

    let source = range.start + match (bc, lower) {
        (BoundaryCondition::Transmissive, true) => 0,
        (BoundaryCondition::Transmissive, false) => n - 1,
        (BoundaryCondition::Periodic, true) => k + n,
        (BoundaryCondition::Periodic, false) => k - n,
        (BoundaryCondition::Wall, true) => -1 - k,
        (BoundaryCondition::Wall, false) => 2 * n - 1 - k,
    };

    match axis {
        Axis::I => (source, index.1),
        Axis::J => (index.0, source),
    }
}
