//! Point evaluators for the flank and fillet curves generated by the
//! cutting tools.
//!
//! All evaluators are pure: they capture the gear and tool parameters at
//! construction and map a curve parameter to a point of the transverse
//! section, with the tooth centerline on the y axis.

use crate::errors::Result;
use crate::float_types::{FRAC_PI_2, FRAC_PI_4, PI, Real};
use crate::solver::{SolverOptions, solve_scalar};
use nalgebra::Point2;

/// Rack-type cutter generating an external gear.
///
/// The generated points belong to the flank on the negative-x side of the
/// tooth; the other flank is its mirror image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RackCutter {
    /// Normal module m_n
    pub module: Real,
    pub pitch_radius: Real,
    pub transverse_pressure_angle: Real,
    pub helix_angle: Real,
    pub transverse_shift: Real,
    /// Cutter addendum (h*a + c*) m_n
    pub addendum: Real,
    /// Cutter tip radius ρ* m_n
    pub tip_radius: Real,
}

impl RackCutter {
    /// Involute flank point at rack parameter `t`.
    pub fn involute(&self, t: Real) -> Point2<Real> {
        let m = self.module;
        let r = self.pitch_radius;
        let alpha = self.transverse_pressure_angle;
        let cos_beta = self.helix_angle.cos();

        let k = -(PI * m / 4.0 + m * self.transverse_shift * alpha.tan());
        let ca = (FRAC_PI_2 - alpha).cos();
        let sa = (FRAC_PI_2 - alpha).sin();
        let phi = (t * ca * ca + k * ca + t * cos_beta * cos_beta * sa * sa) / (r * cos_beta * ca);
        let (sin_phi, cos_phi) = phi.sin_cos();

        let along = (k + t * ca) / cos_beta;
        Point2::new(
            r * sin_phi - phi * r * cos_phi + t * sin_phi * sa + cos_phi * along,
            r * cos_phi + phi * r * sin_phi + t * cos_phi * sa - sin_phi * along,
        )
    }

    /// Fillet point generated by the cutter tip arc at arc angle `t`.
    pub fn transition(&self, t: Real) -> Point2<Real> {
        let m = self.module;
        let r = self.pitch_radius;
        let rc = self.tip_radius;
        let ha = self.addendum;
        let alpha = self.transverse_pressure_angle;
        let cos_beta = self.helix_angle.cos();
        let cos2_beta = cos_beta * cos_beta;

        // centre of the tip arc in the rack frame
        let x0 = -PI * m / 2.0 + (PI * m / 4.0 - ha * alpha.tan() - rc * (FRAC_PI_4 - 0.5 * alpha).tan());
        let y0 = -(ha - rc) + m * self.transverse_shift;

        let (sin_t, cos_t) = t.sin_cos();
        let phi = (x0 * sin_t + rc * cos_t * sin_t - y0 * cos2_beta * cos_t - rc * cos2_beta * cos_t * sin_t)
            / (r * cos_beta * sin_t);
        let (sin_phi, cos_phi) = phi.sin_cos();

        let dx = (x0 + rc * cos_t) / cos_beta;
        let dy = y0 + rc * sin_t;
        Point2::new(
            r * sin_phi + sin_phi * dy - phi * r * cos_phi + cos_phi * dx,
            r * cos_phi + cos_phi * dy + phi * r * sin_phi - sin_phi * dx,
        )
    }

    /// Involute parameter at the junction with the fillet, where the
    /// straight cutter flank meets its tip arc.
    pub fn involute_start(&self) -> Real {
        let alpha = self.transverse_pressure_angle;
        let rc = self.tip_radius;
        (self.module * self.transverse_shift - (self.addendum - rc + rc * alpha.sin())) / alpha.cos()
    }

    /// Tip-arc angle range, from the bottom of the arc (root circle) to the
    /// tangency with the straight flank.
    pub fn transition_range(&self) -> (Real, Real) {
        (1.5 * PI, 2.0 * PI - self.transverse_pressure_angle)
    }
}

/// Involute of the circle of `base_radius`, turned by `offset` so that the
/// tooth centerline lies on the y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetInvolute {
    pub base_radius: Real,
    pub offset: Real,
}

impl OffsetInvolute {
    pub const fn new(base_radius: Real, offset: Real) -> Self {
        Self { base_radius, offset }
    }

    /// Half angular tooth offset `π/z − (η − inv α_t)` of a gear with `teeth`
    /// teeth and normal shift `shift`, where `η = (π − 4x tan α_n)/(2z)`.
    pub fn tooth_offset(
        teeth: usize,
        shift: Real,
        normal_pressure_angle: Real,
        transverse_pressure_angle: Real,
    ) -> Real {
        let z = teeth as Real;
        let eta = (PI - 4.0 * shift * normal_pressure_angle.tan()) / (2.0 * z);
        PI / z - (eta - involute_function(transverse_pressure_angle))
    }

    /// Point at roll angle `t`.
    pub fn point(&self, t: Real) -> Point2<Real> {
        let rb = self.base_radius;
        let (sin_e, cos_e) = self.offset.sin_cos();
        let (sin_t, cos_t) = t.sin_cos();
        let a = sin_t - t * cos_t;
        let b = cos_t + t * sin_t;
        Point2::new(
            rb * cos_e * a - rb * sin_e * b,
            rb * cos_e * b + rb * sin_e * a,
        )
    }

    /// `cot(t − offset)`. A circle touching the curve at `point(t)` from
    /// polar angle `θ` about its centre satisfies
    /// `tangent_cotangent(t) + cot θ = 0`.
    pub fn tangent_cotangent(&self, t: Real) -> Real {
        let angle = t - self.offset;
        angle.cos() / angle.sin()
    }
}

/// `inv α = tan α − α`.
#[inline]
pub fn involute_function(angle: Real) -> Real {
    angle.tan() - angle
}

/// Envelope of a circular tool edge carried by a pinion cutter meshing with
/// an internal gear.
///
/// The edge is the circle of `radius` about `center`, both in the cutter
/// frame. For each angle `tt` on the edge, the gear rotation `φ` at which
/// that edge point is in contact follows from the conjugate-action
/// equation, solved numerically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinionEnvelope {
    /// Centre distance between gear and cutter
    pub center_distance: Real,
    /// Tooth-count ratio z / z_c
    pub ratio: Real,
    pub center: Point2<Real>,
    pub radius: Real,
}

impl PinionEnvelope {
    fn contact_residual(&self, phi: Real, tt: Real) -> Real {
        let e = self.center_distance;
        let k = self.ratio - 1.0;
        let rc = self.radius;
        let (x0, y0) = (self.center.x, self.center.y);
        let (sp, cp) = (phi * k).sin_cos();
        let (st, ct) = tt.sin_cos();
        let px = x0 + rc * ct;
        let py = y0 + rc * st;

        -(rc * cp * ct + rc * sp * st) * (e * phi.cos() + sp * px * k - cp * py * k)
            - (rc * cp * st - rc * sp * ct) * (e * phi.sin() + cp * px * k + sp * py * k)
    }

    /// Gear-frame point generated by the edge point at angle `tt`.
    ///
    /// # Errors
    /// [`crate::errors::GearError::RootFindingFailure`] if the contact
    /// rotation cannot be found.
    pub fn point(&self, tt: Real, options: &SolverOptions) -> Result<Point2<Real>> {
        let phi = solve_scalar(
            "pinion cutter contact rotation",
            |phi| self.contact_residual(phi, tt),
            0.0,
            options,
        )?;
        let e = self.center_distance;
        let (sp, cp) = (phi * (self.ratio - 1.0)).sin_cos();
        let px = self.center.x + self.radius * tt.cos();
        let py = self.center.y + self.radius * tt.sin();
        Ok(Point2::new(
            sp * py - e * phi.sin() + cp * px,
            e * phi.cos() - sp * px + cp * py,
        ))
    }
}
