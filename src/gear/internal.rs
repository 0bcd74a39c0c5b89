//! Internal gear cut by a pinion-type tool.
//!
//! The sector is centred on the positive y axis and bounded by the rays at
//! `π/2 ∓ π/z`, which pass through the middle of two neighbouring teeth.
//! The tooth space between them holds the slot profile; the rim lies
//! outside. Key points, in layout order:
//!
//! ```text
//!  0..=3  right seam: tip circle, two rim split points, outer circle
//!  4..=7  left seam, same order
//!  8, 9   right flank: tip end, fillet junction
//! 10, 11  left flank: tip end, fillet junction
//! 12      slot bottom on the centerline
//! 13      outer circle on the centerline
//! ```
//!
//! A filleted cutter tip (see [`CutterTip`]) adds key points 14 to 17
//! where the fillet meets the arc cut by the cutter's tip circle.

use crate::errors::{GearError, Result};
use crate::float_types::{FRAC_PI_2, GOLDEN_LONG, GOLDEN_SHORT, PI, Real};
use crate::gear::config::{BasicGeometry, GearConfig, InternalGearConfig};
use crate::gear::kernel::{OffsetInvolute, PinionEnvelope, involute_function};
use crate::gear::profile::ToothProfile;
use crate::gear::{Gear, GearRadii};
use crate::mesh::QuadMesh;
use crate::mesh::layout::{Side, SubDomainLayout, mirror, polar, polar_angle};
use crate::solver::{inverse_involute, solve_scalar, solve_system};
use nalgebra::{DVector, Point2};

/// How the cutter tip meets the flank of the cutter tooth, decided once per
/// gear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutterTip {
    /// The tip radius reaches the largest circle that touches the cutter
    /// flank and the tip circle: the fillet runs straight into the slot
    /// bottom.
    FullRound,
    /// A smaller tip radius leaves part of the cutter's tip circle, which
    /// cuts an arc of its own at the slot bottom.
    Filleted {
        /// Centre of the tip arc in the cutter frame
        center: Point2<Real>,
        /// Polar angle, about `center`, of the arc's tangency with the flank
        contact_angle: Real,
    },
}

/// Largest circle touching the cutter flank and the cutter tip circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullRound {
    /// Roll angle of the contact on the cutter involute
    pub roll: Real,
    /// Polar angle of the contact about the circle centre
    pub contact_angle: Real,
    pub radius: Real,
}

#[derive(Debug, Clone)]
pub struct InternalGear {
    config: InternalGearConfig,
    basic: BasicGeometry,
    tip_radius: Real,
    root_radius: Real,
    outer_radius: Real,
    involute: OffsetInvolute,
    cutter_involute: OffsetInvolute,
    cutter_tip_circle: Real,
    tool_tip_radius: Real,
    working_pressure_angle: Real,
    center_distance: Real,
    full_round: FullRound,
    cutter_tip: CutterTip,
    mesh: Option<QuadMesh>,
}

impl InternalGear {
    /// Validates `config`, derives the radii of gear and cutter and solves
    /// the cutter tip geometry.
    ///
    /// # Errors
    /// [`GearError::InvalidConfiguration`] for invalid common parameters, a
    /// cutter with no teeth or at least as many teeth as the gear, a tip
    /// circle inside the base circle, or an outer rim too thin for the key
    /// point layout. [`GearError::RootFindingFailure`] if the cutter tip
    /// geometry cannot be solved.
    pub fn new(config: InternalGearConfig) -> Result<Self> {
        let basic = config.gear.derive()?;
        let gear = &config.gear;
        let m = gear.module;
        let z = gear.teeth;
        let zc = config.cutter_teeth;

        if zc == 0 || zc >= z {
            return Err(GearError::invalid_configuration(format!(
                "cutter needs between 1 and {} teeth, got {zc}",
                z - 1
            )));
        }
        if !config.cutter_shift.is_finite() {
            return Err(GearError::invalid_configuration("cutter shift is not finite"));
        }

        let alpha_n = basic.normal_pressure_angle;
        let alpha_t = basic.transverse_pressure_angle;
        let tip_radius = basic.pitch_radius - m * (gear.addendum_coefficient - gear.shift);
        let root_radius = basic.pitch_radius
            + m * (gear.addendum_coefficient + gear.clearance_coefficient + gear.shift);
        let outer_radius = 0.5 * config.outer_diameter;

        if tip_radius <= basic.base_radius {
            return Err(GearError::invalid_configuration(format!(
                "tip radius {tip_radius} lies inside the base circle {}",
                basic.base_radius
            )));
        }
        let split = (root_radius - tip_radius) / (outer_radius - tip_radius) * GOLDEN_LONG;
        if !(outer_radius > root_radius && split < 1.0) {
            return Err(GearError::invalid_configuration(format!(
                "outer radius {outer_radius} leaves no room for the rim beyond the root radius {root_radius}"
            )));
        }

        let cutter_pitch_radius = 0.5 * basic.transverse_module * zc as Real;
        let cutter_tip_circle = cutter_pitch_radius
            + m * (gear.addendum_coefficient + gear.clearance_coefficient + config.cutter_shift);
        let cutter_involute = OffsetInvolute::new(
            cutter_pitch_radius * alpha_t.cos(),
            OffsetInvolute::tooth_offset(zc, config.cutter_shift, alpha_n, alpha_t),
        );
        let involute = OffsetInvolute::new(
            basic.base_radius,
            OffsetInvolute::tooth_offset(z, gear.shift, alpha_n, alpha_t),
        );

        let working_pressure_angle = inverse_involute(
            2.0 * (gear.shift - config.cutter_shift) * alpha_n.tan() / (z - zc) as Real
                + involute_function(alpha_t),
            &gear.solver,
        )?;
        let center_distance = basic.pitch_radius - cutter_pitch_radius
            + basic.transverse_module
                * (0.5 * (z - zc) as Real * (alpha_t.cos() / working_pressure_angle.cos() - 1.0));

        let tool_tip_radius = m * gear.tip_radius_coefficient;
        let full_round = solve_full_round(&cutter_involute, cutter_tip_circle, m, &gear.solver)?;
        let cutter_tip = if tool_tip_radius >= full_round.radius {
            CutterTip::FullRound
        } else {
            solve_filleted_tip(&cutter_involute, cutter_tip_circle, tool_tip_radius, &gear.solver)?
        };
        log::debug!(
            "internal gear: center distance {center_distance}, full-round radius {}, {:?}",
            full_round.radius,
            cutter_tip
        );

        Ok(Self {
            config,
            basic,
            tip_radius,
            root_radius,
            outer_radius,
            involute,
            cutter_involute,
            cutter_tip_circle,
            tool_tip_radius,
            working_pressure_angle,
            center_distance,
            full_round,
            cutter_tip,
            mesh: None,
        })
    }

    pub const fn internal_config(&self) -> &InternalGearConfig {
        &self.config
    }

    pub const fn basic_geometry(&self) -> &BasicGeometry {
        &self.basic
    }

    pub const fn outer_radius(&self) -> Real {
        self.outer_radius
    }

    /// Tip circle radius of the pinion cutter.
    pub const fn cutter_tip_circle(&self) -> Real {
        self.cutter_tip_circle
    }

    pub const fn cutter_base_radius(&self) -> Real {
        self.cutter_involute.base_radius
    }

    pub const fn working_pressure_angle(&self) -> Real {
        self.working_pressure_angle
    }

    /// Distance between the gear and cutter axes while cutting.
    pub const fn center_distance(&self) -> Real {
        self.center_distance
    }

    pub const fn full_round(&self) -> &FullRound {
        &self.full_round
    }

    pub const fn cutter_tip(&self) -> &CutterTip {
        &self.cutter_tip
    }

    fn envelope(&self, center: Point2<Real>, radius: Real) -> PinionEnvelope {
        PinionEnvelope {
            center_distance: self.center_distance,
            ratio: self.config.gear.teeth as Real / self.config.cutter_teeth as Real,
            center,
            radius,
        }
    }

    /// Slot bottom on the centerline, where the cutter tip circle reaches
    /// deepest.
    pub fn slot_bottom(&self) -> Point2<Real> {
        Point2::new(0.0, self.center_distance + self.cutter_tip_circle)
    }

    /// Left flank from the tip circle towards the slot bottom: the involute
    /// ending on the fillet junction, the fillet ending where the next
    /// segment starts, and for a filleted cutter tip the arc cut by its tip
    /// circle. The last segment ends on the slot bottom.
    fn flank_lines(&self) -> Result<FlankLines> {
        let res = self.config.gear.resolution;
        let options = &self.config.gear.solver;
        let bottom = self.slot_bottom();

        let sample = |envelope: PinionEnvelope, from: Real, to: Real, count: usize| {
            (0..count)
                .map(|i| envelope.point(from + (to - from) * i as Real / count as Real, options))
                .collect::<Result<Vec<_>>>()
        };

        let (mut transition, root_arc) = match self.cutter_tip {
            CutterTip::FullRound => {
                // a larger tool radius cannot fit between flank and tip circle
                let radius = self.full_round.radius;
                let center = Point2::new(0.0, self.cutter_tip_circle - radius);
                let envelope = self.envelope(center, radius);
                let transition = sample(envelope, self.full_round.contact_angle, FRAC_PI_2, res.n2)?;
                (transition, None)
            },
            CutterTip::Filleted {
                center,
                contact_angle,
            } => {
                let arc_start = FRAC_PI_2 - (center.x / center.y).atan();
                let envelope = self.envelope(center, self.tool_tip_radius);
                let transition = sample(envelope, contact_angle, arc_start, res.n2)?;
                let tip_circle = self.envelope(Point2::origin(), self.cutter_tip_circle);
                let mut arc = sample(tip_circle, arc_start, FRAC_PI_2, res.nf)?;
                arc.push(bottom);
                (transition, Some(arc))
            },
        };

        let Some(&junction) = transition.first() else {
            return Err(GearError::topology("empty fillet"));
        };
        let junction_radius = junction.coords.norm();
        let involute = self.involute;
        let roll_at = |radius: Real, what: &str| {
            solve_scalar(
                what,
                |t| involute.point(t).coords.norm() - radius,
                1.0,
                options,
            )
        };
        let tip_roll = roll_at(self.tip_radius, "internal involute crossing of the tip circle")?;
        let junction_roll = roll_at(junction_radius, "internal involute crossing of the fillet")?;

        let mut flank: Vec<Point2<Real>> = (0..res.n1)
            .map(|i| involute.point(tip_roll + (junction_roll - tip_roll) * i as Real / res.n1 as Real))
            .collect();
        flank.push(junction);

        transition.push(match &root_arc {
            Some(arc) => arc[0],
            None => bottom,
        });

        log::debug!(
            "internal flank: roll {tip_roll} to {junction_roll}, fillet gap {}",
            (involute.point(junction_roll) - junction).norm()
        );
        Ok(FlankLines {
            involute: flank,
            transition,
            root_arc,
        })
    }
}

/// Left-flank boundary lines of the slot, each ordered away from the tip.
struct FlankLines {
    involute: Vec<Point2<Real>>,
    transition: Vec<Point2<Real>>,
    root_arc: Option<Vec<Point2<Real>>>,
}

/// Circle of unknown radius touching the cutter flank and, from inside, the
/// cutter tip circle on the cutter tooth centerline.
fn solve_full_round(
    flank: &OffsetInvolute,
    tip_circle: Real,
    module: Real,
    options: &crate::solver::SolverOptions,
) -> Result<FullRound> {
    let residual = |x: &DVector<Real>| {
        let (roll, angle, radius) = (x[0], x[1], x[2]);
        let p = flank.point(roll);
        DVector::from_vec(vec![
            p.x - radius * angle.cos(),
            p.y - (radius * angle.sin() + tip_circle - radius),
            flank.tangent_cotangent(roll) + angle.cos() / angle.sin(),
        ])
    };
    let x = solve_system(
        "full-round cutter tip",
        residual,
        DVector::from_vec(vec![1.0, 0.75 * PI, 0.25 * module]),
        options,
    )?;
    Ok(FullRound {
        roll: x[0],
        contact_angle: x[1],
        radius: x[2],
    })
}

/// Centre of a tip arc of `radius` touching the cutter flank, with the
/// centre on the circle concentric to the tip circle.
fn solve_filleted_tip(
    flank: &OffsetInvolute,
    tip_circle: Real,
    radius: Real,
    options: &crate::solver::SolverOptions,
) -> Result<CutterTip> {
    let residual = |q: &DVector<Real>| {
        let p = flank.point(q[0]);
        DVector::from_vec(vec![
            p.x - (radius * q[1].cos() + q[2]),
            p.y - (radius * q[1].sin() + q[3]),
            flank.tangent_cotangent(q[0]) + q[1].cos() / q[1].sin(),
            q[2] * q[2] + q[3] * q[3] - (tip_circle - radius).powi(2),
        ])
    };
    let q = solve_system(
        "filleted cutter tip",
        residual,
        DVector::from_vec(vec![1.0, 0.75 * PI, 0.0, tip_circle]),
        options,
    )?;
    Ok(CutterTip::Filleted {
        center: Point2::new(q[2], q[3]),
        contact_angle: q[1],
    })
}

impl Gear for InternalGear {
    fn config(&self) -> &GearConfig {
        &self.config.gear
    }

    fn radii(&self) -> GearRadii {
        GearRadii {
            base: self.basic.base_radius,
            root: self.root_radius,
            pitch: self.basic.pitch_radius,
            tip: self.tip_radius,
        }
    }

    /// Left flank from the slot bottom to the tip circle.
    fn profile(&self) -> Result<ToothProfile> {
        let lines = self.flank_lines()?;
        // the fillet ends where the root arc starts
        let transition = match &lines.root_arc {
            Some(arc) => arc
                .iter()
                .rev()
                .chain(lines.transition.iter().rev().skip(1))
                .copied()
                .collect(),
            None => lines.transition.iter().rev().copied().collect(),
        };
        let involute = lines.involute.iter().rev().copied().collect();
        Ok(ToothProfile::new(transition, involute))
    }

    fn tooth_layout(&self) -> Result<SubDomainLayout> {
        let lines = self.flank_lines()?;
        let res = self.config.gear.resolution;
        let (n1, n2, n3, na, nf) = (res.n1, res.n2, res.n3, res.na, res.nf);
        let z = self.config.gear.teeth as Real;
        let r_tip = self.tip_radius;
        let r_out = self.outer_radius;

        let right_seam = FRAC_PI_2 - PI / z;
        let left_seam = FRAC_PI_2 + PI / z;
        let far = (self.root_radius - r_tip) / (r_out - r_tip) * GOLDEN_LONG;
        let near = GOLDEN_SHORT * far;

        let (Some(&flank_tip), Some(&junction)) = (lines.involute.first(), lines.involute.last())
        else {
            return Err(GearError::topology("empty involute"));
        };
        let bottom = self.slot_bottom();

        let mut layout = SubDomainLayout::new();
        for seam_angle in [right_seam, left_seam] {
            let inner = polar(r_tip, seam_angle);
            let outer = polar(r_out, seam_angle);
            layout.add_key_point(inner);
            layout.add_key_point(inner + (outer - inner) * near);
            layout.add_key_point(inner + (outer - inner) * far);
            layout.add_key_point(outer);
        }
        for p in [
            mirror(&flank_tip),
            mirror(&junction),
            flank_tip,
            junction,
            bottom,
            Point2::new(0.0, r_out),
        ] {
            layout.add_key_point(p);
        }
        let angle_right_flank = polar_angle(&mirror(&flank_tip));
        let angle_left_flank = polar_angle(&flank_tip);
        let mirrored = |line: &[Point2<Real>]| line.iter().map(mirror).collect::<Vec<_>>();

        use Side as S;
        let e0 = layout.add_straight_edge(0, 1, n1)?;
        let e1 = layout.add_straight_edge(1, 2, n2)?;
        let e2 = layout.add_straight_edge(2, 3, n3)?;
        let e3 = layout.add_straight_edge(4, 5, n1)?;
        let e4 = layout.add_straight_edge(5, 6, n2)?;
        let e5 = layout.add_straight_edge(6, 7, n3)?;
        let e6 = layout.add_edge(8, 9, mirrored(&lines.involute));
        let e10 = layout.add_arc_edge(8, 0, r_tip, angle_right_flank, right_seam, na);
        let e11 = layout.add_straight_edge(9, 1, na)?;
        let e14 = layout.add_arc_edge(4, 10, r_tip, left_seam, angle_left_flank, na);
        let e8 = layout.add_edge(10, 11, lines.involute.clone());
        let e15 = layout.add_straight_edge(5, 11, na)?;

        layout.add_region([S::forward(e0), S::backward(e11), S::backward(e6), S::forward(e10)]);
        layout.add_region([S::forward(e8), S::backward(e15), S::backward(e3), S::forward(e14)]);

        match &lines.root_arc {
            None => {
                log::debug!("internal layout: full-round cutter tip");
                let e7 = layout.add_edge(9, 12, mirrored(&lines.transition));
                let e9 = layout.add_edge(11, 12, lines.transition.clone());
                let e12 = layout.add_straight_edge(12, 2, na)?;
                let e13 = layout.add_arc_edge(13, 3, r_out, FRAC_PI_2, right_seam, na);
                let e16 = layout.add_straight_edge(6, 12, na)?;
                let e17 = layout.add_arc_edge(7, 13, r_out, left_seam, FRAC_PI_2, na);
                let e18 = layout.add_straight_edge(12, 13, n3)?;

                layout.add_region([S::forward(e1), S::backward(e12), S::backward(e7), S::forward(e11)]);
                layout.add_region([S::forward(e2), S::backward(e13), S::backward(e18), S::forward(e12)]);
                layout.add_region([S::forward(e9), S::backward(e16), S::backward(e4), S::forward(e15)]);
                layout.add_region([S::forward(e18), S::backward(e17), S::backward(e5), S::forward(e16)]);
            },
            Some(arc) => {
                log::debug!("internal layout: filleted cutter tip, separate root arc");
                let Some(&arc_start) = lines.transition.last() else {
                    return Err(GearError::topology("empty fillet"));
                };
                let angle_right_arc = polar_angle(&mirror(&arc_start));
                let angle_left_arc = polar_angle(&arc_start);
                let k14 = layout.add_key_point(mirror(&arc_start));
                let k15 = layout.add_key_point(polar(r_out, angle_right_arc));
                let k16 = layout.add_key_point(arc_start);
                let k17 = layout.add_key_point(polar(r_out, angle_left_arc));

                let e7 = layout.add_edge(9, k14, mirrored(&lines.transition));
                let e9 = layout.add_edge(11, k16, lines.transition.clone());
                let e12 = layout.add_straight_edge(k14, 2, na)?;
                let e13 = layout.add_arc_edge(k15, 3, r_out, angle_right_arc, right_seam, na);
                let e16 = layout.add_straight_edge(6, k16, na)?;
                let e17 = layout.add_arc_edge(7, k17, r_out, left_seam, angle_left_arc, na);
                let e18 = layout.add_straight_edge(k14, k15, n3)?;
                let e19 = layout.add_straight_edge(12, 13, n3)?;
                let e20 = layout.add_straight_edge(k16, k17, n3)?;
                let mut right_arc = mirrored(arc);
                right_arc.reverse();
                let e21 = layout.add_edge(12, k14, right_arc);
                let e22 = layout.add_edge(k16, 12, arc.clone());
                let e23 = layout.add_arc_edge(13, k15, r_out, FRAC_PI_2, angle_right_arc, nf);
                let e24 = layout.add_arc_edge(k17, 13, r_out, angle_left_arc, FRAC_PI_2, nf);

                layout.add_region([S::forward(e1), S::backward(e12), S::backward(e7), S::forward(e11)]);
                layout.add_region([S::forward(e2), S::backward(e13), S::backward(e18), S::forward(e12)]);
                layout.add_region([S::forward(e9), S::backward(e16), S::backward(e4), S::forward(e15)]);
                layout.add_region([S::forward(e20), S::backward(e17), S::backward(e5), S::forward(e16)]);
                layout.add_region([S::forward(e21), S::forward(e18), S::backward(e23), S::backward(e19)]);
                layout.add_region([S::forward(e22), S::forward(e19), S::backward(e24), S::backward(e20)]);
            },
        }

        layout.set_seams(
            vec![S::forward(e0), S::forward(e1), S::forward(e2)],
            vec![S::forward(e3), S::forward(e4), S::forward(e5)],
        );
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

    fn config(teeth: usize, cutter_teeth: usize, outer: Real) -> InternalGearConfig {
        InternalGearConfig::new(GearConfig::new(2.0, teeth, 20.0), outer, cutter_teeth)
    }

    #[test]
    fn radii_are_reversed() {
        let gear = InternalGear::new(config(40, 20, 100.0)).unwrap();
        let radii = gear.radii();
        assert!((radii.tip - 38.0).abs() < 1e-12);
        assert!((radii.root - 42.5).abs() < 1e-12);
        assert!(radii.tip < radii.pitch && radii.pitch < radii.root);
    }

    #[test]
    fn unshifted_pair_works_at_pitch_distance() {
        let gear = InternalGear::new(config(40, 20, 100.0)).unwrap();
        assert!((gear.center_distance() - 20.0).abs() < 1e-9);
        assert!((gear.working_pressure_angle() - 20.0_f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn cutter_must_be_smaller() {
        let err = InternalGear::new(config(20, 20, 60.0)).unwrap_err();
        assert!(err.is_invalid_configuration());
    }
}
