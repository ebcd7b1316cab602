use helpers::geometry::{
    distance_to_segment, path_satisfies, point_in_polygon, polygon_edges,
    ray_segment_intersection, BoundingBox, Segment, Vec2,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::f64::consts::FRAC_PI_4;
use std::fmt;
use std::path::PathBuf;

/// Cars cross the start line from top (smaller y) to bottom (larger y) when racing forward.
pub const FORWARD_START_DIRECTION: Vec2 = Vec2::new(0.0, 1.0);

/// Checkpoint segments are extended beyond both boundaries by this amount so that no move
/// inside the band can slip past their ends.
const CHECKPOINT_OVERHANG: f64 = 0.5;

/// Points closer than this to a wall are treated as lying on the wall.
const WALL_EPS: f64 = 1e-9;

/// Minimum distance between a grid slot and the nearest wall.
const GRID_WALL_MARGIN: f64 = 1.0;
const GRID_SPACING: f64 = 2.0;
const GRID_MAX_ROWS: usize = 16;

/// * `name` - Track name
/// * `outer` - Outer boundary polygon (closed implicitly)
/// * `inner` - Inner boundary polygon, i.e. the hole in the middle of the circuit
/// * `start` - Horizontal start/finish segment spanning the track band
/// * `checkpoints` - (optional) Four checkpoint segments in racing order, derived from the
/// geometry if not given
/// * `racing_line_file` - (optional) CSV file containing the racing line, derived from the
/// geometry if not given
#[derive(Debug, Deserialize, Clone)]
pub struct TrackPars {
    #[serde(default = "default_track_name")]
    pub name: String,
    pub outer: Vec<Vec2>,
    pub inner: Vec<Vec2>,
    pub start: Segment,
    #[serde(default)]
    pub checkpoints: Option<Vec<Segment>>,
    #[serde(default)]
    pub racing_line_file: Option<PathBuf>,
}

fn default_track_name() -> String {
    String::from("unnamed")
}

/// TrackError is raised when track or racing-line data does not describe a usable circuit. It
/// is only produced at the loading boundary, the simulation itself assumes valid tracks.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    TooFewVertices { boundary: &'static str, count: usize },
    InnerOutsideOuter { vertex: usize },
    DegenerateInner,
    StartNotHorizontal,
    StartOutsideBand,
    StartOnRadialLine,
    CheckpointCount { count: usize },
    CheckpointNotDerivable { index: usize },
    NotEnoughGridSlots { requested: usize, available: usize },
    EmptyRacingLine,
    RacingLineNotDerivable { sample: usize },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrackError::TooFewVertices { boundary, count } => write!(
                f,
                "{} boundary needs at least 3 vertices, got {}",
                boundary, count
            ),
            TrackError::InnerOutsideOuter { vertex } => {
                write!(f, "inner boundary vertex {} lies outside the outer boundary", vertex)
            }
            TrackError::DegenerateInner => write!(f, "inner boundary has zero width or height"),
            TrackError::StartNotHorizontal => write!(f, "start segment must be horizontal"),
            TrackError::StartOutsideBand => {
                write!(f, "start segment midpoint does not lie on the track")
            }
            TrackError::StartOnRadialLine => write!(
                f,
                "racing direction cannot be derived, start line is crossed radially"
            ),
            TrackError::CheckpointCount { count } => {
                write!(f, "exactly 4 checkpoints are required, got {}", count)
            }
            TrackError::CheckpointNotDerivable { index } => {
                write!(f, "checkpoint {} could not be derived from the geometry", index)
            }
            TrackError::NotEnoughGridSlots {
                requested,
                available,
            } => write!(
                f,
                "{} cars requested but only {} grid slots fit behind the start line",
                requested, available
            ),
            TrackError::EmptyRacingLine => write!(f, "racing line contains no points"),
            TrackError::RacingLineNotDerivable { sample } => write!(
                f,
                "racing line sample {} does not hit both track boundaries",
                sample
            ),
        }
    }
}

impl Error for TrackError {}

/// Boundary-adjacent zone of the circuit, relative to the inner boundary's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeZone {
    Left,
    Right,
    Top,
    Bottom,
}

impl SafeZone {
    /// Outward normal of the zone, pointing away from the inner boundary.
    fn outward_normal(self) -> Vec2 {
        match self {
            SafeZone::Left => Vec2::new(-1.0, 0.0),
            SafeZone::Right => Vec2::new(1.0, 0.0),
            SafeZone::Top => Vec2::new(0.0, -1.0),
            SafeZone::Bottom => Vec2::new(0.0, 1.0),
        }
    }
}

/// Side of the horizontal start line a position lies on. Positions exactly on the line count
/// as bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartSide {
    Top,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub outer: Vec<Vec2>,
    pub inner: Vec<Vec2>,
    pub walls: Vec<Segment>,
    pub start: Segment,
    pub checkpoints: [Segment; 4],
    center: Vec2,
    inner_bbox: BoundingBox,
    // +1.0 if cars circulate such that the zone tangent (n.y, -n.x) points forward, else -1.0
    racing_sense: f64,
}

impl Track {
    pub fn new(track_pars: &TrackPars) -> Result<Track, TrackError> {
        if track_pars.outer.len() < 3 {
            return Err(TrackError::TooFewVertices {
                boundary: "outer",
                count: track_pars.outer.len(),
            });
        }
        if track_pars.inner.len() < 3 {
            return Err(TrackError::TooFewVertices {
                boundary: "inner",
                count: track_pars.inner.len(),
            });
        }
        if let Some(vertex) = track_pars
            .inner
            .iter()
            .position(|&v| !point_in_polygon(v, &track_pars.outer))
        {
            return Err(TrackError::InnerOutsideOuter { vertex });
        }

        let inner_bbox = BoundingBox::from_points(&track_pars.inner);
        let half = inner_bbox.half_extents();
        if half.x <= 0.0 || half.y <= 0.0 {
            return Err(TrackError::DegenerateInner);
        }

        if (track_pars.start.a.y - track_pars.start.b.y).abs() > WALL_EPS {
            return Err(TrackError::StartNotHorizontal);
        }

        let mut walls = polygon_edges(&track_pars.outer);
        walls.extend(polygon_edges(&track_pars.inner));

        let mut track = Track {
            name: track_pars.name.to_owned(),
            outer: track_pars.outer.to_owned(),
            inner: track_pars.inner.to_owned(),
            walls,
            start: track_pars.start,
            checkpoints: [track_pars.start; 4],
            center: inner_bbox.center(),
            inner_bbox,
            racing_sense: 1.0,
        };

        if !track.contains(track.start.midpoint()) {
            return Err(TrackError::StartOutsideBand);
        }

        // derive the racing sense from the forward crossing direction at the start line
        let tangent = track.zone_tangent(track.zone_of(track.start.midpoint()));
        let alignment = tangent.dot(FORWARD_START_DIRECTION);
        if alignment == 0.0 {
            return Err(TrackError::StartOnRadialLine);
        }
        track.racing_sense = alignment.signum();

        track.checkpoints = match &track_pars.checkpoints {
            Some(checkpoints) => {
                if checkpoints.len() != 4 {
                    return Err(TrackError::CheckpointCount {
                        count: checkpoints.len(),
                    });
                }
                [checkpoints[0], checkpoints[1], checkpoints[2], checkpoints[3]]
            }
            None => track.derive_checkpoints()?,
        };

        Ok(track)
    }

    // ---------------------------------------------------------------------------------------------
    // BAND PREDICATES -----------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// contains returns true if p lies strictly inside the track band, i.e. inside the outer
    /// boundary, outside the inner boundary and not on any wall.
    pub fn contains(&self, p: Vec2) -> bool {
        point_in_polygon(p, &self.outer)
            && !point_in_polygon(p, &self.inner)
            && self.walls.iter().all(|w| distance_to_segment(p, w) > WALL_EPS)
    }

    /// path_legal is the authoritative legality test: every sample between a and b (spacing at
    /// most 0.5 units) must lie inside the band.
    pub fn path_legal(&self, a: Vec2, b: Vec2) -> bool {
        path_satisfies(a, b, |p| self.contains(p))
    }

    /// path_roughly_legal is the cheap approximation used during lookahead search. It only
    /// checks both endpoints and the midpoint.
    pub fn path_roughly_legal(&self, a: Vec2, b: Vec2) -> bool {
        self.contains(b) && self.contains((a + b) * 0.5) && self.contains(a)
    }

    pub fn distance_to_wall(&self, p: Vec2) -> f64 {
        self.walls
            .iter()
            .map(|w| distance_to_segment(p, w))
            .fold(f64::INFINITY, f64::min)
    }

    // ---------------------------------------------------------------------------------------------
    // RACING DIRECTION ----------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Geometric center of the circuit (center of the inner boundary's bounding box).
    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn zone_of(&self, p: Vec2) -> SafeZone {
        let half = self.inner_bbox.half_extents();
        let dx = (p.x - self.center.x) / half.x;
        let dy = (p.y - self.center.y) / half.y;

        if dx.abs() >= dy.abs() {
            if dx < 0.0 {
                SafeZone::Left
            } else {
                SafeZone::Right
            }
        } else if dy < 0.0 {
            SafeZone::Top
        } else {
            SafeZone::Bottom
        }
    }

    fn zone_tangent(&self, zone: SafeZone) -> Vec2 {
        let n = zone.outward_normal();
        Vec2::new(n.y, -n.x) * self.racing_sense
    }

    /// expected_direction returns the unit direction a car at p is supposed to travel in,
    /// derived from the zone it occupies and the circuit's racing sense.
    pub fn expected_direction(&self, p: Vec2) -> Vec2 {
        self.zone_tangent(self.zone_of(p))
    }

    /// Sign of the polar angle change (around the center) when driving forward.
    fn angular_sign(&self) -> f64 {
        let r = self.start.midpoint() - self.center;
        let forward = self.expected_direction(self.start.midpoint());
        if r.cross(forward) >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Polar angle of the start line midpoint as seen from the center.
    fn start_angle(&self) -> f64 {
        let r = self.start.midpoint() - self.center;
        r.y.atan2(r.x)
    }

    /// racing_angles returns `count` polar angles starting at the start line and proceeding in
    /// racing order, offset by `offset` radians.
    pub fn racing_angles(&self, count: usize, offset: f64) -> Vec<f64> {
        let theta_s = self.start_angle();
        let sign = self.angular_sign();
        let step = std::f64::consts::TAU / count as f64;
        (0..count)
            .map(|k| theta_s + sign * (offset + k as f64 * step))
            .collect()
    }

    /// band_span casts a ray from the center and returns the points where it leaves the inner
    /// boundary and where it then hits the outer boundary.
    pub fn band_span(&self, angle: f64) -> Option<(Vec2, Vec2)> {
        let dir = Vec2::new(angle.cos(), angle.sin());
        let n_outer = self.outer.len();

        let t_inner = self.walls[n_outer..]
            .iter()
            .filter_map(|w| ray_segment_intersection(self.center, dir, w))
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))))?;
        let t_outer = self.walls[..n_outer]
            .iter()
            .filter_map(|w| ray_segment_intersection(self.center, dir, w))
            .filter(|&t| t > t_inner)
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))))?;

        Some((self.center + dir * t_inner, self.center + dir * t_outer))
    }

    fn derive_checkpoints(&self) -> Result<[Segment; 4], TrackError> {
        let angles = self.racing_angles(4, FRAC_PI_4);
        let mut checkpoints = [self.start; 4];

        for (index, &angle) in angles.iter().enumerate() {
            let (inner_pt, outer_pt) = self
                .band_span(angle)
                .ok_or(TrackError::CheckpointNotDerivable { index })?;
            let dir = (outer_pt - inner_pt).normalized();
            checkpoints[index] = Segment::new(
                inner_pt - dir * CHECKPOINT_OVERHANG,
                outer_pt + dir * CHECKPOINT_OVERHANG,
            );
        }

        Ok(checkpoints)
    }

    // ---------------------------------------------------------------------------------------------
    // START LINE ----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn start_line_y(&self) -> f64 {
        self.start.a.y
    }

    pub fn side_of_start(&self, p: Vec2) -> StartSide {
        if p.y < self.start_line_y() {
            StartSide::Top
        } else {
            StartSide::Bottom
        }
    }

    /// grid_positions returns up to `no_cars` integer start slots just past the start line,
    /// filled row by row from the middle of the start segment outwards.
    pub fn grid_positions(&self, no_cars: usize) -> Vec<Vec2> {
        let mid_x = self.start.midpoint().x.round();
        let half_width = (self.start.a.x - self.start.b.x).abs() / 2.0;
        let max_offset = (half_width / GRID_SPACING).ceil() as i32;

        let mut offsets: Vec<i32> = vec![0];
        for k in 1..=max_offset {
            offsets.push(-k);
            offsets.push(k);
        }

        let mut slots = Vec::with_capacity(no_cars);
        for row in 0..GRID_MAX_ROWS {
            let y = self.start_line_y().floor() + GRID_SPACING * (row as f64 + 1.0);
            for &k in offsets.iter() {
                if slots.len() == no_cars {
                    return slots;
                }
                let p = Vec2::new(mid_x + k as f64 * GRID_SPACING, y);
                if self.contains(p) && self.distance_to_wall(p) >= GRID_WALL_MARGIN {
                    slots.push(p);
                }
            }
        }
        slots
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use helpers::geometry::segments_intersect;

    pub(crate) fn rect_track_pars() -> TrackPars {
        TrackPars {
            name: String::from("rect"),
            outer: vec![
                Vec2::new(2.0, 2.0),
                Vec2::new(48.0, 2.0),
                Vec2::new(48.0, 33.0),
                Vec2::new(2.0, 33.0),
            ],
            inner: vec![
                Vec2::new(12.0, 10.0),
                Vec2::new(38.0, 10.0),
                Vec2::new(38.0, 25.0),
                Vec2::new(12.0, 25.0),
            ],
            start: Segment::new(Vec2::new(2.0, 18.0), Vec2::new(12.0, 18.0)),
            checkpoints: None,
            racing_line_file: None,
        }
    }

    pub(crate) fn rect_track() -> Track {
        Track::new(&rect_track_pars()).unwrap()
    }

    #[test]
    fn band_excludes_hole_walls_and_outside() {
        let track = rect_track();
        assert!(track.contains(Vec2::new(7.0, 21.0)));
        assert!(!track.contains(Vec2::new(20.0, 20.0)));
        assert!(!track.contains(Vec2::new(1.0, 20.0)));
        assert!(!track.contains(Vec2::new(2.0, 20.0)));
        assert!(!track.contains(Vec2::new(12.0, 20.0)));
    }

    #[test]
    fn path_legality_samples_between_endpoints() {
        let track = rect_track();
        assert!(track.path_legal(Vec2::new(7.0, 20.0), Vec2::new(7.0, 21.0)));
        // both endpoints are in the band but the path cuts through the hole
        assert!(!track.path_legal(Vec2::new(7.0, 20.0), Vec2::new(42.0, 20.0)));
        assert!(!track.path_legal(Vec2::new(7.0, 20.0), Vec2::new(0.0, 20.0)));
    }

    #[test]
    fn zones_and_expected_directions_follow_forward_start_crossing() {
        let track = rect_track();
        assert_eq!(track.zone_of(Vec2::new(7.0, 20.0)), SafeZone::Left);
        assert_eq!(track.zone_of(Vec2::new(25.0, 30.0)), SafeZone::Bottom);
        assert_eq!(track.zone_of(Vec2::new(43.0, 17.0)), SafeZone::Right);
        assert_eq!(track.zone_of(Vec2::new(25.0, 5.0)), SafeZone::Top);

        assert_eq!(track.expected_direction(Vec2::new(7.0, 20.0)), Vec2::new(0.0, 1.0));
        assert_eq!(track.expected_direction(Vec2::new(25.0, 30.0)), Vec2::new(1.0, 0.0));
        assert_eq!(track.expected_direction(Vec2::new(43.0, 17.0)), Vec2::new(0.0, -1.0));
        assert_eq!(track.expected_direction(Vec2::new(25.0, 5.0)), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn derived_checkpoints_span_the_band_in_racing_order() {
        let track = rect_track();
        let quadrant = |s: &Segment| {
            let m = s.midpoint() - track.center();
            (m.x > 0.0, m.y > 0.0)
        };
        // bottom-left, bottom-right, top-right, top-left
        assert_eq!(quadrant(&track.checkpoints[0]), (false, true));
        assert_eq!(quadrant(&track.checkpoints[1]), (true, true));
        assert_eq!(quadrant(&track.checkpoints[2]), (true, false));
        assert_eq!(quadrant(&track.checkpoints[3]), (false, false));

        for cp in track.checkpoints.iter() {
            assert!(!track.contains(cp.a));
            assert!(!track.contains(cp.b));
            assert!(track.contains(cp.midpoint()));
        }

        // driving down the bottom straight crosses checkpoint 0 only
        let bottom_run = Segment::new(Vec2::new(5.0, 29.0), Vec2::new(20.0, 29.0));
        assert!(segments_intersect(&bottom_run, &track.checkpoints[0]));
        assert!(!segments_intersect(&bottom_run, &track.checkpoints[1]));
    }

    #[test]
    fn grid_slots_fill_the_first_row_from_the_middle() {
        let track = rect_track();
        let slots = track.grid_positions(3);
        assert_eq!(
            slots,
            vec![Vec2::new(7.0, 20.0), Vec2::new(5.0, 20.0), Vec2::new(9.0, 20.0)]
        );
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let mut pars = rect_track_pars();
        pars.start = Segment::new(Vec2::new(2.0, 18.0), Vec2::new(12.0, 19.0));
        assert_eq!(Track::new(&pars).unwrap_err(), TrackError::StartNotHorizontal);

        let mut pars = rect_track_pars();
        pars.inner.truncate(2);
        assert!(matches!(
            Track::new(&pars),
            Err(TrackError::TooFewVertices { boundary: "inner", .. })
        ));

        let mut pars = rect_track_pars();
        pars.inner[1] = Vec2::new(60.0, 10.0);
        assert_eq!(
            Track::new(&pars).unwrap_err(),
            TrackError::InnerOutsideOuter { vertex: 1 }
        );

        let mut pars = rect_track_pars();
        pars.checkpoints = Some(vec![pars.start]);
        assert_eq!(
            Track::new(&pars).unwrap_err(),
            TrackError::CheckpointCount { count: 1 }
        );
    }
}
