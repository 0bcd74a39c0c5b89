//! Gear-cutting parameters and the quantities derived from them.

use crate::errors::{GearError, Result};
use crate::float_types::{Real, normalize_angle};
use crate::solver::SolverOptions;

/// Segment counts controlling the mesh density of one tooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshResolution {
    /// Segments along the involute flank
    pub n1: usize,
    /// Segments along the transition (fillet) curve
    pub n2: usize,
    /// Segments across the rim / web
    pub n3: usize,
    /// Segments across the tooth, tip arc to centerline
    pub na: usize,
    /// Segments along one side of the root arc
    pub nf: usize,
}

impl MeshResolution {
    pub const fn new(n1: usize, n2: usize, n3: usize, na: usize, nf: usize) -> Self {
        Self { n1, n2, n3, na, nf }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("n1", self.n1),
            ("n2", self.n2),
            ("n3", self.n3),
            ("na", self.na),
            ("nf", self.nf),
        ] {
            if value == 0 {
                return Err(GearError::invalid_configuration(format!(
                    "segment count {name} must be positive"
                )));
            }
        }
        Ok(())
    }
}

impl Default for MeshResolution {
    fn default() -> Self {
        Self::new(5, 5, 5, 3, 3)
    }
}

/// Cutting parameters shared by external and internal gears.
///
/// Angles are stored in radians; the constructor and setters accept degrees
/// as well (see [`normalize_angle`]).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GearConfig {
    /// Normal module m_n (mm)
    pub module: Real,
    /// Tooth count z
    pub teeth: usize,
    /// Normal pressure angle α_n (rad)
    pub pressure_angle: Real,
    /// Helix angle β (rad), 0 for spur gears
    pub helix_angle: Real,
    /// Normal profile shift coefficient x_n
    pub shift: Real,
    /// Addendum coefficient h*a
    pub addendum_coefficient: Real,
    /// Clearance coefficient c*
    pub clearance_coefficient: Real,
    /// Tool tip radius coefficient ρ*
    pub tip_radius_coefficient: Real,
    /// Normal backlash j_n (mm); carried for downstream use, the profile is
    /// cut without it
    pub backlash: Real,
    pub resolution: MeshResolution,
    pub solver: SolverOptions,
}

impl GearConfig {
    /// Standard full-depth tooth (h*a = 1, c* = 0.25, ρ* = 0.38) of the given
    /// module, tooth count and pressure angle.
    pub fn new(module: Real, teeth: usize, pressure_angle: Real) -> Self {
        Self {
            module,
            teeth,
            pressure_angle: normalize_angle(pressure_angle),
            helix_angle: 0.0,
            shift: 0.0,
            addendum_coefficient: 1.0,
            clearance_coefficient: 0.25,
            tip_radius_coefficient: 0.38,
            backlash: 0.0,
            resolution: MeshResolution::default(),
            solver: SolverOptions::default(),
        }
    }

    pub fn with_helix_angle(mut self, helix_angle: Real) -> Self {
        self.helix_angle = normalize_angle(helix_angle);
        self
    }

    pub const fn with_shift(mut self, shift: Real) -> Self {
        self.shift = shift;
        self
    }

    pub const fn with_addendum_coefficient(mut self, value: Real) -> Self {
        self.addendum_coefficient = value;
        self
    }

    pub const fn with_clearance_coefficient(mut self, value: Real) -> Self {
        self.clearance_coefficient = value;
        self
    }

    pub const fn with_tip_radius_coefficient(mut self, value: Real) -> Self {
        self.tip_radius_coefficient = value;
        self
    }

    pub const fn with_backlash(mut self, backlash: Real) -> Self {
        self.backlash = backlash;
        self
    }

    pub const fn with_resolution(mut self, resolution: MeshResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub const fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }

    /// Checks the parameters and computes the transverse-plane quantities.
    ///
    /// # Errors
    /// [`GearError::InvalidConfiguration`] for a tooth count below 2, a
    /// non-positive module, non-finite coefficients, angles outside
    /// `[0, π/2)` or a zero segment count.
    pub fn derive(&self) -> Result<BasicGeometry> {
        if self.teeth < 2 {
            return Err(GearError::invalid_configuration(format!(
                "tooth count must be at least 2, got {}",
                self.teeth
            )));
        }
        if !(self.module > 0.0 && self.module.is_finite()) {
            return Err(GearError::invalid_configuration(format!(
                "module must be positive, got {}",
                self.module
            )));
        }
        for (name, value) in [
            ("shift", self.shift),
            ("addendum coefficient", self.addendum_coefficient),
            ("clearance coefficient", self.clearance_coefficient),
            ("tip radius coefficient", self.tip_radius_coefficient),
            ("backlash", self.backlash),
        ] {
            if !value.is_finite() {
                return Err(GearError::invalid_configuration(format!("{name} is not finite")));
            }
        }
        if self.tip_radius_coefficient <= 0.0 {
            return Err(GearError::invalid_configuration(
                "tool tip radius coefficient must be positive",
            ));
        }
        let alpha_n = normalize_angle(self.pressure_angle);
        let beta = normalize_angle(self.helix_angle);
        if !(alpha_n > 0.0 && alpha_n < crate::float_types::FRAC_PI_2) {
            return Err(GearError::invalid_configuration(format!(
                "pressure angle must lie in (0, π/2), got {alpha_n} rad"
            )));
        }
        if !(0.0..crate::float_types::FRAC_PI_2).contains(&beta) {
            return Err(GearError::invalid_configuration(format!(
                "helix angle must lie in [0, π/2), got {beta} rad"
            )));
        }
        self.resolution.validate()?;

        let transverse_shift = self.shift / beta.cos();
        let transverse_pressure_angle = (alpha_n.tan() / beta.cos()).atan();
        let transverse_module = self.module / beta.cos();
        let pitch_radius = 0.5 * transverse_module * self.teeth as Real;
        let base_radius = pitch_radius * transverse_pressure_angle.cos();

        Ok(BasicGeometry {
            normal_pressure_angle: alpha_n,
            helix_angle: beta,
            transverse_shift,
            transverse_pressure_angle,
            transverse_module,
            pitch_radius,
            base_radius,
        })
    }
}

/// Transverse-plane quantities common to both gear kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicGeometry {
    pub normal_pressure_angle: Real,
    pub helix_angle: Real,
    /// x_t = x_n / cos β
    pub transverse_shift: Real,
    /// α_t = atan(tan α_n / cos β)
    pub transverse_pressure_angle: Real,
    /// m_t = m_n / cos β
    pub transverse_module: Real,
    /// r = m_t z / 2
    pub pitch_radius: Real,
    /// r_b = r cos α_t
    pub base_radius: Real,
}

/// External gear cut by a rack-type tool.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalGearConfig {
    pub gear: GearConfig,
    /// Tip chamfer height, measured on the diameter (mm)
    pub chamfer_diameter: Real,
    /// Inner diameter of the rim (mm)
    pub inner_diameter: Real,
}

impl ExternalGearConfig {
    pub const fn new(gear: GearConfig, inner_diameter: Real) -> Self {
        Self {
            gear,
            chamfer_diameter: 0.0,
            inner_diameter,
        }
    }

    pub const fn with_chamfer_diameter(mut self, chamfer_diameter: Real) -> Self {
        self.chamfer_diameter = chamfer_diameter;
        self
    }
}

/// Internal gear cut by a pinion-type tool.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InternalGearConfig {
    pub gear: GearConfig,
    /// Outer diameter of the rim (mm)
    pub outer_diameter: Real,
    /// Tooth count of the pinion cutter
    pub cutter_teeth: usize,
    /// Normal shift coefficient of the pinion cutter
    pub cutter_shift: Real,
}

impl InternalGearConfig {
    pub const fn new(gear: GearConfig, outer_diameter: Real, cutter_teeth: usize) -> Self {
        Self {
            gear,
            outer_diameter,
            cutter_teeth,
            cutter_shift: 0.0,
        }
    }

    pub const fn with_cutter_shift(mut self, cutter_shift: Real) -> Self {
        self.cutter_shift = cutter_shift;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spur_gear_derivation() {
        let basic = GearConfig::new(2.0, 20, 20.0).derive().unwrap();
        assert!((basic.pitch_radius - 20.0).abs() < 1e-12);
        assert!((basic.transverse_pressure_angle - 20.0_f64.to_radians()).abs() < 1e-12);
        assert!((basic.base_radius - 20.0 * 20.0_f64.to_radians().cos()).abs() < 1e-12);
    }

    #[test]
    fn helix_widens_transverse_module() {
        let basic = GearConfig::new(2.0, 20, 20.0)
            .with_helix_angle(15.0)
            .derive()
            .unwrap();
        assert!(basic.transverse_module > 2.0);
        assert!(basic.transverse_pressure_angle > basic.normal_pressure_angle);
    }

    #[test]
    fn rejects_single_tooth() {
        let err = GearConfig::new(2.0, 1, 20.0).derive().unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn rejects_zero_segments() {
        let err = GearConfig::new(2.0, 20, 20.0)
            .with_resolution(MeshResolution::new(5, 0, 5, 3, 3))
            .derive()
            .unwrap_err();
        assert!(err.to_string().contains("n2"));
    }
}
