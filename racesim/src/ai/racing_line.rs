use crate::core::track::{SafeZone, Track, TrackError};
use helpers::general::{argmax, lin_interp};
use helpers::geometry::{distance_to_segment, Segment, Vec2};
use serde::{Deserialize, Serialize};

/// Number of centerline samples used when deriving a racing line from the track geometry.
const NO_SAMPLES: usize = 32;

/// Heading change (rad) between consecutive centerline segments above which a sample is
/// treated as an apex.
const APEX_TURN_ANGLE: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerType {
    Straight,
    Entry,
    Apex,
    Exit,
}

impl CornerType {
    /// Lateral position within the band, measured from the inner boundary (0) to the outer
    /// boundary (1).
    fn lateral_fraction(self) -> f64 {
        match self {
            CornerType::Straight => 0.5,
            CornerType::Entry => 0.65,
            CornerType::Apex => 0.3,
            CornerType::Exit => 0.6,
        }
    }

    fn target_speed(self) -> f64 {
        match self {
            CornerType::Straight => 5.0,
            CornerType::Entry => 3.0,
            CornerType::Apex => 2.0,
            CornerType::Exit => 4.0,
        }
    }
}

/// * `pos` - Position of the waypoint
/// * `target_speed` - Speed a car should carry through the waypoint
/// * `brake_zone` - True if cars should shed speed around the waypoint
/// * `corner_type` - Corner phase of the waypoint
/// * `safe_zone` - Zone of the circuit the waypoint lies in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RacingLinePoint {
    pub pos: Vec2,
    pub target_speed: f64,
    pub brake_zone: bool,
    pub corner_type: CornerType,
    pub safe_zone: SafeZone,
}

/// RacingLine is the ordered, cyclic sequence of waypoints the computer players follow.
#[derive(Debug, Clone)]
pub struct RacingLine {
    points: Vec<RacingLinePoint>,
}

impl RacingLine {
    pub fn new(points: Vec<RacingLinePoint>) -> Result<RacingLine, TrackError> {
        if points.is_empty() {
            return Err(TrackError::EmptyRacingLine);
        }
        Ok(RacingLine { points })
    }

    /// from_track derives a racing line from the track geometry. The centerline is sampled
    /// by casting rays from the circuit center, corner phases are classified from the
    /// heading change along it and each waypoint is then shifted towards the inner or outer
    /// boundary depending on its phase.
    pub fn from_track(track: &Track) -> Result<RacingLine, TrackError> {
        let mut spans: Vec<(Vec2, Vec2)> = Vec::with_capacity(NO_SAMPLES);

        for (sample, angle) in track.racing_angles(NO_SAMPLES, 0.0).into_iter().enumerate() {
            spans.push(
                track
                    .band_span(angle)
                    .ok_or(TrackError::RacingLineNotDerivable { sample })?,
            );
        }

        let centerline: Vec<Vec2> = spans
            .iter()
            .map(|&(inner_pt, outer_pt)| (inner_pt + outer_pt) * 0.5)
            .collect();
        let corner_types = classify_corners(&centerline);

        let no_points = spans.len();
        let mut points = Vec::with_capacity(no_points);

        for (i, &(inner_pt, outer_pt)) in spans.iter().enumerate() {
            let corner_type = corner_types[i];
            let pos = inner_pt + (outer_pt - inner_pt) * corner_type.lateral_fraction();
            let next_type = corner_types[(i + 1) % no_points];

            points.push(RacingLinePoint {
                pos,
                target_speed: corner_type.target_speed(),
                brake_zone: corner_type == CornerType::Entry
                    || (corner_type == CornerType::Straight && next_type == CornerType::Entry),
                corner_type,
                safe_zone: track.zone_of(pos),
            });
        }

        RacingLine::new(points)
    }

    pub fn get_points(&self) -> &[RacingLinePoint] {
        &self.points
    }

    pub fn get_point(&self, idx: usize) -> &RacingLinePoint {
        &self.points[idx % self.points.len()]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// nearest_index returns the index of the waypoint closest to p.
    pub fn nearest_index(&self, p: Vec2) -> usize {
        let neg_dists: Vec<f64> = self.points.iter().map(|pt| -pt.pos.distance(p)).collect();
        argmax(&neg_dists)
    }

    /// distance_to_line returns the distance from p to the closed polyline through all
    /// waypoints.
    pub fn distance_to_line(&self, p: Vec2) -> f64 {
        let no_points = self.points.len();
        if no_points == 1 {
            return self.points[0].pos.distance(p);
        }

        (0..no_points)
            .map(|i| {
                let seg = Segment::new(self.points[i].pos, self.points[(i + 1) % no_points].pos);
                distance_to_segment(p, &seg)
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// select_target picks the waypoint a car at `pos` should head for. Waypoints are rated by
    /// how well the direction towards them matches the expected racing direction and by their
    /// distance, favoring points 2 to 8 units ahead. Points behind the car are ruled out.
    pub fn select_target(&self, track: &Track, pos: Vec2) -> usize {
        let expected = track.expected_direction(pos);

        let scores: Vec<f64> = self
            .points
            .iter()
            .map(|pt| {
                let dist = pos.distance(pt.pos);
                if dist < 0.5 {
                    return -50.0;
                }
                let align = (pt.pos - pos).normalized().dot(expected);
                if align < -0.2 {
                    -1000.0 - dist
                } else {
                    10.0 * align
                        + lin_interp(
                            dist,
                            &[0.0, 2.0, 8.0, 14.0, 30.0],
                            &[-8.0, 6.0, 6.0, -4.0, -20.0],
                        )
                }
            })
            .collect();

        argmax(&scores)
    }
}

/// classify_corners marks samples with a large heading change as apexes, their predecessors
/// as entries and their successors as exits.
fn classify_corners(centerline: &[Vec2]) -> Vec<CornerType> {
    let n = centerline.len();
    let turn_angle = |i: usize| {
        let prev = centerline[(i + n - 1) % n];
        let next = centerline[(i + 1) % n];
        let d_in = (centerline[i] - prev).normalized();
        let d_out = (next - centerline[i]).normalized();
        d_in.cross(d_out).atan2(d_in.dot(d_out)).abs()
    };
    let is_apex: Vec<bool> = (0..n).map(|i| turn_angle(i) > APEX_TURN_ANGLE).collect();

    (0..n)
        .map(|i| {
            if is_apex[i] {
                CornerType::Apex
            } else if is_apex[(i + 1) % n] {
                CornerType::Entry
            } else if is_apex[(i + n - 1) % n] {
                CornerType::Exit
            } else {
                CornerType::Straight
            }
        })
        .collect()
}
