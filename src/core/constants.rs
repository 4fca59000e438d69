//! Physical constants and unit conversion factors

/// Faraday constant [C.mol-1]
pub const FARADAY: f64 = 96485.0;

/// Seconds per hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Converts concentration x thickness [mol.m-2] into areal capacity [mA.h.cm-2]
///
/// `F / 3.6` gives mA.h per mol, `/ 10000` converts m-2 to cm-2.
pub const AREAL_CAPACITY_FACTOR: f64 = FARADAY / 3.6 / 10000.0;

/// Volume loading of a 1 m thick layer [uL.cm-2]
pub const UL_PER_CM2_PER_M: f64 = 100_000.0;

/// kg.m-3 -> mg.uL-1
pub const KG_M3_TO_MG_UL: f64 = 1.0 / 1000.0;

/// Thickness [m] x density [kg.m-3] -> mass loading [mg.cm-2]
pub const MASS_LOADING_FACTOR: f64 = UL_PER_CM2_PER_M * KG_M3_TO_MG_UL;

/// Slack allowed on stoichiometry bounds
pub const STOICHIOMETRY_TOLERANCE: f64 = 1e-5;

/// Maximum lithium concentration [mol.m-3] from gravimetric capacity [mA.h.g-1]
pub fn max_concentration_from_capacity(capacity: f64, active_density: f64) -> f64 {
    capacity * active_density * SECONDS_PER_HOUR / FARADAY
}

/// Gravimetric capacity [mA.h.g-1] from maximum lithium concentration [mol.m-3]
pub fn capacity_from_max_concentration(concentration: f64, active_density: f64) -> f64 {
    concentration * FARADAY / SECONDS_PER_HOUR / active_density
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_areal_capacity_factor() {
        // 1 mol.m-2 of lithium is 2.68 mA.h.cm-2
        assert!((AREAL_CAPACITY_FACTOR - 2.680139).abs() < 1e-6);
    }

    #[test]
    fn test_capacity_concentration_inverse() {
        let c = max_concentration_from_capacity(372.0, 2266.0);
        let back = capacity_from_max_concentration(c, 2266.0);
        assert!((back - 372.0).abs() < 1e-9);
    }

    #[test]
    fn test_mass_loading_factor() {
        // 100 um of a 1000 kg.m-3 layer is 10 mg.cm-2
        assert!((100e-6 * 1000.0 * MASS_LOADING_FACTOR - 10.0).abs() < 1e-12);
    }
}
