//! Ideal gas equation of state.
//!
//! The scalar functions are unchecked: a zero density or a gamma law index
//! of one yields an infinite or NaN result. The field functions operate
//! elementwise over slices and refuse non-positive densities.

use super::error::Error;




/// Gas pressure `p = rho (gamma - 1) e` from the mass density and the
/// specific internal energy.
pub fn pressure_from_density_energy(mass_density: f64, specific_internal_energy: f64, gamma_law_index: f64) -> f64 {
    mass_density * (gamma_law_index - 1.0) * specific_internal_energy
}

/// Specific internal energy `e = p / (rho (gamma - 1))` from the mass density
/// and the gas pressure.
pub fn internal_energy_from_density_pressure(mass_density: f64, gas_pressure: f64, gamma_law_index: f64) -> f64 {
    gas_pressure / (mass_density * (gamma_law_index - 1.0))
}

pub fn sound_speed(mass_density: f64, gas_pressure: f64, gamma_law_index: f64) -> f64 {
    (gamma_law_index * gas_pressure / mass_density).sqrt()
}




// ============================================================================
fn validate(mass_density: &[f64], other: &[f64], gamma_law_index: f64) -> Result<(), Error> {
    assert_eq!(mass_density.len(), other.len(), "equation of state fields must have equal length");

    if gamma_law_index == 1.0 {
        return Err(Error::InvalidGammaLawIndex(gamma_law_index));
    }
    match mass_density.iter().find(|&&d| !(d > 0.0)) {
        Some(&d) => Err(Error::NegativeMassDensity(d)),
        None => Ok(()),
    }
}

/// Elementwise `pressure_from_density_energy` over equal-length slices.
pub fn pressure_field(mass_density: &[f64], specific_internal_energy: &[f64], gamma_law_index: f64) -> Result<Vec<f64>, Error> {
    validate(mass_density, specific_internal_energy, gamma_law_index)?;

    Ok(mass_density
        .iter()
        .zip(specific_internal_energy)
        .map(|(&d, &e)| pressure_from_density_energy(d, e, gamma_law_index))
        .collect())
}

/// Elementwise `internal_energy_from_density_pressure` over equal-length
/// slices.
pub fn internal_energy_field(mass_density: &[f64], gas_pressure: &[f64], gamma_law_index: f64) -> Result<Vec<f64>, Error> {
    validate(mass_density, gas_pressure, gamma_law_index)?;

    Ok(mass_density
        .iter()
        .zip(gas_pressure)
        .map(|(&d, &p)| internal_energy_from_density_pressure(d, p, gamma_law_index))
        .collect())
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ideal_gas_values_are_correct() {
        assert_eq!(pressure_from_density_energy(2.0, 3.0, 1.5), 3.0);
        assert_eq!(internal_energy_from_density_pressure(2.0, 3.0, 1.5), 3.0);
        assert!((sound_speed(1.0, 1.0, 1.4) - 1.4f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn field_functions_preserve_length() {
        let d = [1.0, 2.0, 4.0];
        let e = [1.0, 1.0, 1.0];
        let p = pressure_field(&d, &e, 1.4).unwrap();
        assert_eq!(p.len(), 3);
        assert!((p[2] - 1.6).abs() < 1e-12);
    }

    #[test]
    fn field_functions_reject_non_positive_density() {
        assert_eq!(
            pressure_field(&[1.0, 0.0], &[1.0, 1.0], 1.4),
            Err(Error::NegativeMassDensity(0.0)));
        assert_eq!(
            internal_energy_field(&[-1.0], &[1.0], 1.4),
            Err(Error::NegativeMassDensity(-1.0)));
    }

    #[test]
    fn field_functions_reject_isothermal_gamma() {
        assert_eq!(
            pressure_field(&[1.0], &[1.0], 1.0),
            Err(Error::InvalidGammaLawIndex(1.0)));
    }

    proptest! {
        #[test]
        fn pressure_round_trips_through_internal_energy(
            d in 1e-3f64..1e3,
            p in 1e-3f64..1e3,
            g in 1.01f64..3.0)
        {
            let e = internal_energy_from_density_pressure(d, p, g);
            let q = pressure_from_density_energy(d, e, g);
            prop_assert!((q - p).abs() <= 1e-12 * p.max(1.0));
        }
    }
}
