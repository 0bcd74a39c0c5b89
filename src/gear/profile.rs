//! Sampled tooth profile of one flank and its mirror image.

use crate::float_types::{Real, tolerance};
use crate::mesh::layout::mirror;
use nalgebra::Point2;

/// One flank of a tooth, sampled from the root to the tip.
///
/// The transition (fillet) samples come first and end at the junction
/// with the involute; the involute samples run from that junction to the
/// tip circle. The opposite flank is the mirror image in the tooth
/// centerline (the y axis).
#[derive(Debug, Clone, PartialEq)]
pub struct ToothProfile {
    pub transition: Vec<Point2<Real>>,
    pub involute: Vec<Point2<Real>>,
}

impl ToothProfile {
    pub const fn new(transition: Vec<Point2<Real>>, involute: Vec<Point2<Real>>) -> Self {
        Self { transition, involute }
    }

    /// Root end of the flank.
    pub fn root_point(&self) -> Option<Point2<Real>> {
        self.transition.first().or(self.involute.first()).copied()
    }

    /// Tip end of the flank.
    pub fn tip_point(&self) -> Option<Point2<Real>> {
        self.involute.last().or(self.transition.last()).copied()
    }

    /// Transition followed by involute, root to tip. A junction sample that
    /// both segments carry appears once.
    pub fn half(&self) -> Vec<Point2<Real>> {
        let mut points = Vec::with_capacity(self.transition.len() + self.involute.len());
        points.extend_from_slice(&self.transition);
        let mut flank = self.involute.iter().peekable();
        if let (Some(last), Some(first)) = (points.last(), flank.peek()) {
            if (*first - last).norm() <= tolerance() * last.coords.norm().max(1.0) {
                flank.next();
            }
        }
        points.extend(flank);
        points
    }

    /// The profile of the opposite flank, still ordered root to tip.
    pub fn mirrored(&self) -> ToothProfile {
        ToothProfile {
            transition: self.transition.iter().map(mirror).collect(),
            involute: self.involute.iter().map(mirror).collect(),
        }
    }

    /// Both flanks as one sequence: this flank root to tip, then the mirror
    /// flank tip to root. Point `n − 1 − i` is the mirror of point `i`.
    pub fn full(&self) -> Vec<Point2<Real>> {
        let half = self.half();
        let mut points = half.clone();
        points.extend(half.iter().rev().map(mirror));
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_junction_appears_once() {
        let profile = ToothProfile::new(
            vec![Point2::new(-1.0, 0.0), Point2::new(-1.0, 1.0)],
            vec![Point2::new(-1.0, 1.0), Point2::new(-0.5, 2.0)],
        );
        assert_eq!(profile.half().len(), 3);
        let full = profile.full();
        assert_eq!(full.len(), 6);
        assert_eq!(full[5], Point2::new(1.0, 0.0));
    }
}
