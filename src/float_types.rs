// Our Real scalar type. Gear flank classification compares angles at the
// 1e-12 level, so only double precision is supported.
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized tolerance used across the crate for coincidence
/// checks (line endpoints against key points, duplicate nodes).
///
/// Defaults to `1e-9`, but can be overridden:
///  1) **Build-time**: set env var `GEARMESH_TOLERANCE` (e.g. `GEARMESH_TOLERANCE=1e-8 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before using the library
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_tolerance() -> Real {
    1e-9
}

/// Returns the current coincidence tolerance.
/// If not set yet, it tries `GEARMESH_TOLERANCE` (parsed as `Real`) and
/// falls back to the default.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("GEARMESH_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Set the tolerance programmatically once (subsequent calls are ignored).
/// Call near program start: `gearmesh::float_types::set_tolerance(1e-8);`
pub fn set_tolerance(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}

/// Absolute angular tolerance (radians) under which the two root fillets of
/// a tooth slot are treated as one full-round fillet.
pub const ANGLE_TOLERANCE: Real = 1e-12;

/// Archimedes' constant (π)
pub const PI: Real = core::f64::consts::PI;

/// π/2
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;

/// π/4
pub const FRAC_PI_4: Real = core::f64::consts::FRAC_PI_4;

/// The full circle constant (τ)
pub const TAU: Real = core::f64::consts::TAU;

/// Golden-ratio weights used to bias segment lengths toward the flank.
pub const GOLDEN_LONG: Real = 1.236;
pub const GOLDEN_SHORT: Real = 0.618;

/// Converts an angle given either in radians or in degrees to radians.
///
/// Values of a full turn (2π) or more cannot be a sensible tooth angle in
/// radians, so they are read as degrees.
#[inline]
pub fn normalize_angle(value: Real) -> Real {
    if value < TAU { value } else { value.to_radians() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_are_detected() {
        assert_eq!(normalize_angle(0.3), 0.3);
        assert!((normalize_angle(20.0) - 20.0_f64.to_radians()).abs() < 1e-15);
        assert_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn tolerance_is_positive() {
        assert!(tolerance() > 0.0);
    }
}
