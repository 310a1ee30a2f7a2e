//! Checkpoint tracks and their built-in catalog.

use serde::{Deserialize, Serialize};

use crate::{TrackError, core::Vec2};

/// Region a car has to stay within.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Annulus between two concentric circles.
    Ring {
        center: Vec2,
        inner_radius: f32,
        outer_radius: f32,
    },
}

impl Boundary {
    /// Returns `true` if `point` lies on the drivable surface.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Boundary::Ring {
                center,
                inner_radius,
                outer_radius,
            } => {
                let r = center.distance(point);
                *inner_radius <= r && r <= *outer_radius
            }
        }
    }

    fn validate(&self) -> Result<(), TrackError> {
        match self {
            Boundary::Ring {
                center,
                inner_radius,
                outer_radius,
            } => {
                let ok = center.is_finite()
                    && inner_radius.is_finite()
                    && outer_radius.is_finite()
                    && *inner_radius >= 0.0
                    && inner_radius < outer_radius;
                if ok {
                    Ok(())
                } else {
                    Err(TrackError::InvalidRing {
                        inner_radius: *inner_radius,
                        outer_radius: *outer_radius,
                    })
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrackDef {
    #[serde(default)]
    name: String,
    start: Vec2,
    checkpoints: Vec<Vec2>,
    #[serde(default)]
    boundary: Option<Boundary>,
}

impl TryFrom<TrackDef> for Track {
    type Error = TrackError;

    fn try_from(def: TrackDef) -> Result<Self, Self::Error> {
        let track = Track::new(def.name, def.start, def.checkpoints)?;
        match def.boundary {
            Some(boundary) => track.with_boundary(boundary),
            None => Ok(track),
        }
    }
}

/// A validated race track: a start point plus checkpoints visited in order.
///
/// Construction guarantees at least [`Track::MIN_CHECKPOINTS`] checkpoints,
/// finite coordinates, and a start point distinct from the first checkpoint.
/// Deserialization goes through the same checks.
///
/// # Example
///
/// ```
/// use trackmind_engine::{Track, Vec2};
///
/// let track = Track::new(
///     "sprint",
///     Vec2::ZERO,
///     vec![Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0)],
/// )
/// .unwrap();
/// assert_eq!(track.checkpoints().len(), 2);
///
/// assert!(Track::new("bad", Vec2::ZERO, vec![Vec2::new(1.0, 0.0)]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrackDef")]
pub struct Track {
    name: String,
    start: Vec2,
    checkpoints: Vec<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    boundary: Option<Boundary>,
}

impl Track {
    pub const MIN_CHECKPOINTS: usize = 2;

    pub fn new(
        name: impl Into<String>,
        start: Vec2,
        checkpoints: Vec<Vec2>,
    ) -> Result<Self, TrackError> {
        if checkpoints.len() < Self::MIN_CHECKPOINTS {
            return Err(TrackError::TooFewCheckpoints {
                count: checkpoints.len(),
                min: Self::MIN_CHECKPOINTS,
            });
        }
        if !start.is_finite() || checkpoints.iter().any(|c| !c.is_finite()) {
            return Err(TrackError::NonFiniteCoordinate);
        }
        if start.distance(checkpoints[0]) <= f32::EPSILON {
            return Err(TrackError::StartOnFirstCheckpoint);
        }
        Ok(Self {
            name: name.into(),
            start,
            checkpoints,
            boundary: None,
        })
    }

    /// Attaches a boundary, validating its geometry.
    pub fn with_boundary(mut self, boundary: Boundary) -> Result<Self, TrackError> {
        boundary.validate()?;
        self.boundary = Some(boundary);
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.start
    }

    #[must_use]
    pub fn checkpoints(&self) -> &[Vec2] {
        &self.checkpoints
    }

    #[must_use]
    pub fn boundary(&self) -> Option<&Boundary> {
        self.boundary.as_ref()
    }

    /// Returns `true` if `point` is drivable. Tracks without a boundary accept every point.
    #[must_use]
    pub fn is_on_track(&self, point: Vec2) -> bool {
        self.boundary.as_ref().is_none_or(|b| b.contains(point))
    }

    /// Rectangular circuit: a bottom straight, a right-hand turn, a top
    /// straight and a closing turn back towards the start.
    #[must_use]
    pub fn rectangle() -> Self {
        Self {
            name: "rectangle".to_owned(),
            start: Vec2::new(200.0, 400.0),
            checkpoints: vec![
                Vec2::new(500.0, 400.0),
                Vec2::new(900.0, 300.0),
                Vec2::new(500.0, 200.0),
                Vec2::new(200.0, 300.0),
            ],
            boundary: None,
        }
    }

    /// Circular circuit between two concentric radii.
    ///
    /// Checkpoints sit on the middle radius at 0°, 90°, 180° and 270°; the
    /// start is at -90° (the top of the ring).
    pub fn ring(center: Vec2, inner_radius: f32, outer_radius: f32) -> Result<Self, TrackError> {
        let mid = (inner_radius + outer_radius) / 2.0;
        let on_ring = |deg: f32| center + Vec2::from_angle_deg(deg) * mid;
        Self::new(
            "ring",
            on_ring(-90.0),
            [0.0, 90.0, 180.0, 270.0].into_iter().map(on_ring).collect(),
        )?
        .with_boundary(Boundary::Ring {
            center,
            inner_radius,
            outer_radius,
        })
    }

    /// Default ring circuit centred in a 1000×800 area.
    #[must_use]
    pub fn default_ring() -> Self {
        Self::ring(Vec2::new(500.0, 400.0), 200.0, 300.0)
            .unwrap_or_else(|_| unreachable!("default ring geometry is valid"))
    }

    /// Straight sprint along +x with evenly spaced checkpoints.
    pub fn straight(length: f32, checkpoint_count: usize) -> Result<Self, TrackError> {
        #[expect(clippy::cast_precision_loss)]
        let spacing = length / checkpoint_count as f32;
        #[expect(clippy::cast_precision_loss)]
        let checkpoints = (1..=checkpoint_count)
            .map(|i| Vec2::new(spacing * i as f32, 0.0))
            .collect();
        Self::new("straight", Vec2::ZERO, checkpoints)
    }

    /// Points every `step_deg` degrees along the middle of a ring boundary,
    /// starting at 0°. Returns `None` for tracks without a ring.
    #[must_use]
    pub fn ring_waypoints(&self, step_deg: f32) -> Option<Vec<Vec2>> {
        let Some(Boundary::Ring {
            center,
            inner_radius,
            outer_radius,
        }) = &self.boundary
        else {
            return None;
        };
        if step_deg <= 0.0 || !step_deg.is_finite() {
            return None;
        }
        let mid = (inner_radius + outer_radius) / 2.0;
        let mut waypoints = vec![];
        let mut angle = 0.0_f32;
        while angle < 360.0 {
            waypoints.push(*center + Vec2::from_angle_deg(angle) * mid);
            angle += step_deg;
        }
        Some(waypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_too_few_checkpoints() {
        let err = Track::new("t", Vec2::ZERO, vec![Vec2::new(10.0, 0.0)]).unwrap_err();
        assert!(matches!(
            err,
            TrackError::TooFewCheckpoints { count: 1, min: 2 }
        ));
        assert!(Track::new("t", Vec2::ZERO, vec![]).is_err());
    }

    #[test]
    fn test_rejects_start_on_first_checkpoint() {
        let err = Track::new(
            "t",
            Vec2::new(5.0, 5.0),
            vec![Vec2::new(5.0, 5.0), Vec2::new(50.0, 5.0)],
        )
        .unwrap_err();
        assert!(matches!(err, TrackError::StartOnFirstCheckpoint));
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = Track::new(
            "t",
            Vec2::ZERO,
            vec![Vec2::new(f32::NAN, 0.0), Vec2::new(50.0, 5.0)],
        )
        .unwrap_err();
        assert!(matches!(err, TrackError::NonFiniteCoordinate));
    }

    #[test]
    fn test_ring_layout() {
        let track = Track::default_ring();
        let center = Vec2::new(500.0, 400.0);
        assert_eq!(track.checkpoints().len(), 4);
        for cp in track.checkpoints() {
            assert!((cp.distance(center) - 250.0).abs() < 1e-3);
            assert!(track.is_on_track(*cp));
        }
        assert!((track.start().x - 500.0).abs() < 1e-3);
        assert!((track.start().y - 150.0).abs() < 1e-3);
        assert!(!track.is_on_track(center));
        assert!(!track.is_on_track(Vec2::new(500.0, 50.0)));
    }

    #[test]
    fn test_invalid_ring_rejected() {
        let err = Track::ring(Vec2::ZERO, 300.0, 200.0).unwrap_err();
        assert!(matches!(err, TrackError::InvalidRing { .. }));
    }

    #[test]
    fn test_ring_waypoints() {
        let track = Track::default_ring();
        let waypoints = track.ring_waypoints(10.0).unwrap();
        assert_eq!(waypoints.len(), 36);
        assert!(Track::rectangle().ring_waypoints(10.0).is_none());
        assert!(track.ring_waypoints(0.0).is_none());
    }

    #[test]
    fn test_straight_track() {
        let track = Track::straight(200.0, 2).unwrap();
        assert_eq!(
            track.checkpoints(),
            &[Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0)]
        );
        assert!(track.is_on_track(Vec2::new(-1e6, 1e6)));
    }

    #[test]
    fn test_json_roundtrip_and_validation() {
        let track = Track::default_ring();
        let json = serde_json::to_string(&track).unwrap();
        let parsed: Track = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, track);

        let invalid = r#"{"name":"x","start":{"x":0,"y":0},"checkpoints":[{"x":1,"y":0}]}"#;
        assert!(serde_json::from_str::<Track>(invalid).is_err());

        let no_name = r#"{"start":{"x":0,"y":0},"checkpoints":[{"x":10,"y":0},{"x":20,"y":0}]}"#;
        let parsed: Track = serde_json::from_str(no_name).unwrap();
        assert_eq!(parsed.name(), "");
        assert!(parsed.boundary().is_none());
    }
}
