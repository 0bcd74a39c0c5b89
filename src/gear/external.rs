//! External gear cut by a rack-type tool.
//!
//! The tooth sector is centred on the positive y axis. Key points, in
//! layout order:
//!
//! ```text
//!  0  rim, under the right root        6  left tip
//!  1  right root                       7  centerline, top of the web
//!  2  right fillet / involute junction 8  centerline, junction level
//!  3  right tip                        9  centerline, tip circle
//!  4  left root                       10  centerline, rim
//!  5  left fillet / involute junction 11  rim, under the left root
//! ```
//!
//! When the slot between two teeth leaves a stretch of root circle, four
//! more key points (12 to 15) split that stretch in half and the seams run
//! through its middle. When the two fillets of a slot merge into a full
//! round, the seams run straight down from the roots.

use crate::errors::{GearError, Result};
use crate::float_types::{
    ANGLE_TOLERANCE, FRAC_PI_2, FRAC_PI_4, GOLDEN_LONG, GOLDEN_SHORT, PI, Real, TAU,
};
use crate::gear::config::{BasicGeometry, ExternalGearConfig, GearConfig};
use crate::gear::kernel::RackCutter;
use crate::gear::profile::ToothProfile;
use crate::gear::{Gear, GearRadii};
use crate::mesh::QuadMesh;
use crate::mesh::layout::{
    Side, SubDomainLayout, mirror, polar, polar_angle, polyline_crossing, polyline_length,
};
use crate::solver::{solve_scalar, solve_system};
use nalgebra::{DVector, Point2};

/// Samples per curve when looking for the undercut crossing
const UNDERCUT_SAMPLES: usize = 200;

#[derive(Debug, Clone)]
pub struct ExternalGear {
    config: ExternalGearConfig,
    basic: BasicGeometry,
    cutter: RackCutter,
    tip_radius: Real,
    effective_tip_radius: Real,
    root_radius: Real,
    inner_radius: Real,
    mesh: Option<QuadMesh>,
}

impl ExternalGear {
    /// Validates `config` and derives the gear radii.
    ///
    /// # Errors
    /// [`GearError::InvalidConfiguration`] for invalid common parameters,
    /// a rim that does not reach below the root circle, a chamfer that
    /// removes the whole addendum, or a tool tip radius so large that the
    /// two fillets of a slot would cross.
    pub fn new(config: ExternalGearConfig) -> Result<Self> {
        let basic = config.gear.derive()?;
        let gear = &config.gear;
        let m = gear.module;

        let tip_radius = basic.pitch_radius + m * (gear.addendum_coefficient + basic.transverse_shift);
        let root_radius = basic.pitch_radius
            - m * (gear.addendum_coefficient + gear.clearance_coefficient - basic.transverse_shift);
        let effective_tip_radius = tip_radius - 0.5 * config.chamfer_diameter;
        let inner_radius = 0.5 * config.inner_diameter;

        if !(config.chamfer_diameter >= 0.0 && config.chamfer_diameter.is_finite()) {
            return Err(GearError::invalid_configuration(format!(
                "chamfer must be non-negative, got {}",
                config.chamfer_diameter
            )));
        }
        if root_radius <= 0.0 {
            return Err(GearError::invalid_configuration(format!(
                "root radius {root_radius} is not positive"
            )));
        }
        if effective_tip_radius <= basic.pitch_radius {
            return Err(GearError::invalid_configuration(format!(
                "effective tip radius {effective_tip_radius} does not exceed the pitch radius {}",
                basic.pitch_radius
            )));
        }
        if !(inner_radius > 0.0 && inner_radius < root_radius) {
            return Err(GearError::invalid_configuration(format!(
                "inner radius {inner_radius} must lie between 0 and the root radius {root_radius}"
            )));
        }

        let cutter = RackCutter {
            module: m,
            pitch_radius: basic.pitch_radius,
            transverse_pressure_angle: basic.transverse_pressure_angle,
            helix_angle: basic.helix_angle,
            transverse_shift: basic.transverse_shift,
            addendum: (gear.addendum_coefficient + gear.clearance_coefficient) * m,
            tip_radius: gear.tip_radius_coefficient * m,
        };

        let gear = Self {
            config,
            basic,
            cutter,
            tip_radius,
            effective_tip_radius,
            root_radius,
            inner_radius,
            mesh: None,
        };

        let gap = gear.slot_gap();
        if gap < -ANGLE_TOLERANCE {
            return Err(GearError::invalid_configuration(format!(
                "tool tip radius coefficient {} exceeds the full-round value {}",
                gear.config.gear.tip_radius_coefficient,
                gear.max_tip_radius_coefficient()
            )));
        }
        Ok(gear)
    }

    pub const fn external_config(&self) -> &ExternalGearConfig {
        &self.config
    }

    pub const fn basic_geometry(&self) -> &BasicGeometry {
        &self.basic
    }

    pub const fn cutter(&self) -> &RackCutter {
        &self.cutter
    }

    /// Tip radius before chamfering.
    pub const fn nominal_tip_radius(&self) -> Real {
        self.tip_radius
    }

    pub const fn inner_radius(&self) -> Real {
        self.inner_radius
    }

    /// Tool tip radius coefficient at which the two fillets of one slot
    /// meet at the slot centre and form a full round.
    pub fn max_tip_radius_coefficient(&self) -> Real {
        let gear = &self.config.gear;
        let alpha = self.basic.transverse_pressure_angle;
        (FRAC_PI_4 - (gear.addendum_coefficient + gear.clearance_coefficient) * alpha.tan())
            / (FRAC_PI_4 - 0.5 * alpha).tan()
    }

    /// Angle between the root point of the right flank, advanced by one
    /// pitch, and the root point of the left flank. Zero for a full-round
    /// fillet, negative when the fillets would cross.
    pub fn slot_gap(&self) -> Real {
        let (root_parameter, _) = self.cutter.transition_range();
        let left_root = polar_angle(&self.cutter.transition(root_parameter));
        let right_root = PI - left_root;
        right_root + TAU / self.config.gear.teeth as Real - left_root
    }

    /// True when the fillets of a slot merge and the reduced layout is used.
    pub fn has_full_round_fillet(&self) -> bool {
        self.slot_gap().abs() < ANGLE_TOLERANCE
    }

    /// Fillet range and involute start of the flank, for an involute that
    /// runs from `start` to `end`.
    ///
    /// Without undercut the fillet ends where the cutter's tip arc meets its
    /// straight flank, which is also where the involute starts. On an
    /// undercut tooth the involute first runs inwards to a cusp and the
    /// fillet crosses its outward branch; both curves stop at that crossing.
    fn fillet_junction(&self, start: Real, end: Real) -> Result<(Real, Real, Real)> {
        let cutter = &self.cutter;
        let (root, junction) = cutter.transition_range();
        let step = (end - start) / UNDERCUT_SAMPLES as Real;
        let radii: Vec<Real> = (0..=UNDERCUT_SAMPLES)
            .map(|i| cutter.involute(start + step * i as Real).coords.norm())
            .collect();
        let cusp = radii
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(i, _)| i);
        if cusp == 0 {
            return Ok((root, junction, start));
        }

        let fillet_step = (junction - root) / UNDERCUT_SAMPLES as Real;
        let fillet: Vec<Point2<Real>> = (0..=UNDERCUT_SAMPLES)
            .map(|i| cutter.transition(root + fillet_step * i as Real))
            .collect();
        let outward: Vec<Point2<Real>> = (cusp..=UNDERCUT_SAMPLES)
            .map(|i| cutter.involute(start + step * i as Real))
            .collect();
        let Some((along_fillet, along_flank)) = polyline_crossing(&fillet, &outward) else {
            // the fillet only touches the flank at the junction
            return Ok((root, junction, start));
        };

        let guess = DVector::from_vec(vec![
            root + fillet_step * along_fillet,
            start + step * (cusp as Real + along_flank),
        ]);
        let crossing = solve_system(
            "fillet crossing of the undercut involute",
            |q: &DVector<Real>| {
                let gap = cutter.transition(q[0]) - cutter.involute(q[1]);
                DVector::from_vec(vec![gap.x, gap.y])
            },
            guess,
            &self.config.gear.solver,
        )?;
        let (fillet_end, flank_start) = (crossing[0], crossing[1]);
        if fillet_end >= junction {
            return Ok((root, junction, start));
        }
        if !(fillet_end > root && flank_start > start && flank_start < end) {
            return Err(GearError::topology(format!(
                "undercut crossing at fillet angle {fillet_end}, involute parameter {flank_start} lies off both curves"
            )));
        }
        log::debug!(
            "external profile: undercut, fillet cut back to {fillet_end}, involute starts at {flank_start}"
        );
        Ok((root, fillet_end, flank_start))
    }
}

impl Gear for ExternalGear {
    fn config(&self) -> &GearConfig {
        &self.config.gear
    }

    fn radii(&self) -> GearRadii {
        GearRadii {
            base: self.basic.base_radius,
            root: self.root_radius,
            pitch: self.basic.pitch_radius,
            tip: self.effective_tip_radius,
        }
    }

    fn profile(&self) -> Result<ToothProfile> {
        let resolution = &self.config.gear.resolution;
        let cutter = &self.cutter;

        let tool_junction = cutter.involute_start();
        let target = self.effective_tip_radius;
        let end = solve_scalar(
            "involute crossing of the tip circle",
            |t| cutter.involute(t).coords.norm() - target,
            self.config.gear.module,
            &self.config.gear.solver,
        )?;
        if end <= tool_junction {
            return Err(GearError::invalid_configuration(format!(
                "tip circle of radius {target} cuts the tooth below the fillet junction"
            )));
        }
        if cutter.involute(end).x >= 0.0 {
            return Err(GearError::invalid_configuration(format!(
                "tooth is pointed below the tip circle of radius {target}"
            )));
        }

        let (root, junction, start) = self.fillet_junction(tool_junction, end)?;
        let n2 = resolution.n2;
        let transition = (0..=n2)
            .map(|i| cutter.transition(root + (junction - root) * i as Real / n2 as Real))
            .collect();
        let n1 = resolution.n1;
        let involute = (0..=n1)
            .map(|i| cutter.involute(start + (end - start) * i as Real / n1 as Real))
            .collect();

        log::debug!("external profile: involute parameters {start} to {end}");
        Ok(ToothProfile::new(transition, involute))
    }

    fn tooth_layout(&self) -> Result<SubDomainLayout> {
        let profile = self.profile()?;
        let right = profile.mirrored();
        let res = self.config.gear.resolution;
        let (n1, n2, n3, na, nf) = (res.n1, res.n2, res.n3, res.na, res.nf);
        let r_in = self.inner_radius;
        let r_tip = self.effective_tip_radius;

        let (Some(&left_root), Some(&left_junction), Some(&left_tip)) = (
            profile.transition.first(),
            profile.transition.last(),
            profile.involute.last(),
        ) else {
            return Err(GearError::topology("empty tooth profile"));
        };

        let angle_left_root = polar_angle(&left_root);
        let angle_right_root = PI - angle_left_root;
        let angle_right_tip = polar_angle(&mirror(&left_tip));
        let angle_left_tip = PI - angle_right_tip;

        let rim_right = polar(r_in, angle_right_root);
        let rim_left = polar(r_in, angle_left_root);

        // split the centerline like the flank, biased towards the involute
        let web = (left_root - rim_left).norm() * n3 as Real;
        let fillet = polyline_length(&profile.transition) * n2 as Real * GOLDEN_SHORT;
        let flank = polyline_length(&profile.involute) * n1 as Real * GOLDEN_LONG;
        let total = web + fillet + flank;
        let web_top = r_in + (r_tip - r_in) * web / total;
        let junction_level = r_in + (r_tip - r_in) * (web + fillet) / total;

        let mut layout = SubDomainLayout::new();
        for p in [
            rim_right,
            mirror(&left_root),
            mirror(&left_junction),
            mirror(&left_tip),
            left_root,
            left_junction,
            left_tip,
            Point2::new(0.0, web_top),
            Point2::new(0.0, junction_level),
            Point2::new(0.0, r_tip),
            Point2::new(0.0, r_in),
            rim_left,
        ] {
            layout.add_key_point(p);
        }

        let e0 = layout.add_straight_edge(0, 1, n3)?;
        let e1 = layout.add_edge(1, 2, right.transition.clone());
        let e2 = layout.add_edge(2, 3, right.involute.clone());
        let e3 = layout.add_straight_edge(10, 7, n3)?;
        let e4 = layout.add_straight_edge(7, 8, n2)?;
        let e5 = layout.add_straight_edge(8, 9, n1)?;
        let e6 = layout.add_straight_edge(11, 4, n3)?;
        let e7 = layout.add_edge(4, 5, profile.transition.clone());
        let e8 = layout.add_edge(5, 6, profile.involute.clone());
        let e9 = layout.add_arc_edge(10, 0, r_in, FRAC_PI_2, angle_right_root, na);
        let e10 = layout.add_straight_edge(7, 1, na)?;
        let e11 = layout.add_straight_edge(8, 2, na)?;
        let e12 = layout.add_arc_edge(9, 3, r_tip, FRAC_PI_2, angle_right_tip, na);
        let e13 = layout.add_arc_edge(11, 10, r_in, angle_left_root, FRAC_PI_2, na);
        let e14 = layout.add_straight_edge(4, 7, na)?;
        let e15 = layout.add_straight_edge(5, 8, na)?;
        let e16 = layout.add_arc_edge(6, 9, r_tip, angle_left_tip, FRAC_PI_2, na);

        use Side as S;
        layout.add_region([S::forward(e0), S::backward(e10), S::backward(e3), S::forward(e9)]);
        layout.add_region([S::forward(e1), S::backward(e11), S::backward(e4), S::forward(e10)]);
        layout.add_region([S::forward(e2), S::backward(e12), S::backward(e5), S::forward(e11)]);
        layout.add_region([S::forward(e3), S::backward(e14), S::backward(e6), S::forward(e13)]);
        layout.add_region([S::forward(e4), S::backward(e15), S::backward(e7), S::forward(e14)]);
        layout.add_region([S::forward(e5), S::backward(e16), S::backward(e8), S::forward(e15)]);

        let gap = angle_right_root + TAU / self.config.gear.teeth as Real - angle_left_root;
        if gap.abs() < ANGLE_TOLERANCE {
            log::debug!("external layout: full-round fillet, reduced topology");
            layout.set_seams(vec![S::forward(e0)], vec![S::forward(e6)]);
            return Ok(layout);
        }
        if gap < 0.0 {
            return Err(GearError::invalid_configuration(format!(
                "fillets of neighbouring teeth overlap by {} rad",
                -gap
            )));
        }

        log::debug!("external layout: root arc of {gap} rad between teeth");
        let r_root = left_root.coords.norm();
        let split_right = angle_right_root - 0.5 * gap;
        let split_left = angle_left_root + 0.5 * gap;
        let k12 = layout.add_key_point(polar(r_in, split_right));
        let k13 = layout.add_key_point(polar(r_root, split_right));
        let k14 = layout.add_key_point(polar(r_in, split_left));
        let k15 = layout.add_key_point(polar(r_root, split_left));

        let e17 = layout.add_straight_edge(k12, k13, n3)?;
        let e18 = layout.add_straight_edge(k14, k15, n3)?;
        let e19 = layout.add_arc_edge(0, k12, r_in, angle_right_root, split_right, nf);
        let e20 = layout.add_arc_edge(k13, 1, r_root, split_right, angle_right_root, nf);
        let e21 = layout.add_arc_edge(k14, 11, r_in, split_left, angle_left_root, nf);
        let e22 = layout.add_arc_edge(4, k15, r_root, angle_left_root, split_left, nf);

        layout.add_region([S::backward(e0), S::forward(e19), S::forward(e17), S::forward(e20)]);
        layout.add_region([S::forward(e6), S::forward(e22), S::backward(e18), S::forward(e21)]);
        layout.set_seams(vec![S::forward(e17)], vec![S::forward(e18)]);
        Ok(layout)
    }

    fn mesh(&self) -> Option<&QuadMesh> {
        self.mesh.as_ref()
    }

    fn generate_mesh(&mut self) -> Result<&QuadMesh> {
        let mesh = self.build_mesh()?;
        let stored: &QuadMesh = self.mesh.insert(mesh);
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> ExternalGear {
        ExternalGear::new(ExternalGearConfig::new(GearConfig::new(2.0, 20, 20.0), 20.0)).unwrap()
    }

    #[test]
    fn standard_radii() {
        let radii = standard().radii();
        assert!((radii.pitch - 20.0).abs() < 1e-12);
        assert!((radii.tip - 22.0).abs() < 1e-12);
        assert!((radii.root - 17.5).abs() < 1e-12);
    }

    #[test]
    fn full_round_coefficient_for_twenty_degrees() {
        assert!((standard().max_tip_radius_coefficient() - 0.471_910_6).abs() < 1e-6);
    }

    #[test]
    fn standard_tool_leaves_a_root_arc() {
        let gear = standard();
        assert!(gear.slot_gap() > 0.0);
        assert!(!gear.has_full_round_fillet());
    }
}
