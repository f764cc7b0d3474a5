use crate::constants::{Degree, DEGRAD, KEPLER_MAX_ITERATIONS};
use crate::skyward_errors::SkywardError;

/// Converged solution of Kepler's equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly in degrees
    pub eccentric_anomaly: Degree,
    /// Number of Newton corrections applied
    pub iterations: usize,
}

/// Solve Kepler's equation `M = E − e°·sin E` for the eccentric anomaly.
///
/// The equation is written in degrees, with `e° = e · 180/π`. Newton's method starts from
/// `E₀ = M + e°·sin M` and applies
///
/// ```text
/// ΔM = M − (Eₙ − e°·sin Eₙ)
/// ΔE = ΔM / (1 − e·cos Eₙ)
/// ```
///
/// until `|ΔE|` drops below `tolerance`.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: M, in degrees
/// * `eccentricity`: e, in `[0, 1)`
/// * `tolerance`: convergence threshold on `|ΔE|`, in degrees
///
/// Return
/// ------
/// * the eccentric anomaly in degrees and the number of iterations
/// * [`SkywardError::InvalidValue`] if the eccentricity is outside `[0, 1)`, the tolerance is
///   not positive, or the iteration cap is reached
pub fn solve_eccentric_anomaly(
    mean_anomaly: Degree,
    eccentricity: f64,
    tolerance: Degree,
) -> Result<KeplerSolution, SkywardError> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(SkywardError::InvalidValue(format!(
            "eccentricity must be in [0, 1), got {eccentricity}"
        )));
    }
    if !(tolerance > 0.0) {
        return Err(SkywardError::InvalidValue(format!(
            "Kepler tolerance must be positive, got {tolerance}"
        )));
    }

    let e_deg = eccentricity * DEGRAD;
    let mut ecc_anomaly = mean_anomaly + e_deg * mean_anomaly.to_radians().sin();

    for iteration in 1..=KEPLER_MAX_ITERATIONS {
        let e_rad = ecc_anomaly.to_radians();
        let delta_m = mean_anomaly - (ecc_anomaly - e_deg * e_rad.sin());
        let delta_e = delta_m / (1.0 - eccentricity * e_rad.cos());
        ecc_anomaly += delta_e;

        if delta_e.abs() < tolerance {
            return Ok(KeplerSolution {
                eccentric_anomaly: ecc_anomaly,
                iterations: iteration,
            });
        }
    }

    Err(SkywardError::InvalidValue(format!(
        "Kepler's equation did not converge after {KEPLER_MAX_ITERATIONS} iterations (M = {mean_anomaly}°, e = {eccentricity})"
    )))
}
