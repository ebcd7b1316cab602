use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Vec2 is a plain 2D vector used for positions, velocities and accelerations. All grid
/// quantities are integral, so exact float comparisons are meaningful for them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Vec2 {
        Vec2 { x, y }
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product.
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or the zero vector for zero input.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            Vec2::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Componentwise sign with 0 mapped to 0.
    pub fn signum(self) -> Vec2 {
        fn sgn(v: f64) -> f64 {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        }
        Vec2::new(sgn(self.x), sgn(self.y))
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Segment is an ordered pair of points, used for walls, the start line, checkpoints and
/// single moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub const fn new(a: Vec2, b: Vec2) -> Segment {
        Segment { a, b }
    }

    pub fn direction(&self) -> Vec2 {
        self.b - self.a
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.a + self.b) * 0.5
    }
}

// -------------------------------------------------------------------------------------------------
// PREDICATES --------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn orientation(p: Vec2, q: Vec2, r: Vec2) -> Orientation {
    let val = (q - p).cross(r - p);
    if val > 0.0 {
        Orientation::CounterClockwise
    } else if val < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// q lies within the bounding box of p-r (only meaningful if p, q, r are collinear).
fn on_segment(p: Vec2, q: Vec2, r: Vec2) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// segments_intersect returns true if the two closed segments share at least one point. This
/// includes touching endpoints and collinear overlaps.
pub fn segments_intersect(s1: &Segment, s2: &Segment) -> bool {
    let o1 = orientation(s1.a, s1.b, s2.a);
    let o2 = orientation(s1.a, s1.b, s2.b);
    let o3 = orientation(s2.a, s2.b, s1.a);
    let o4 = orientation(s2.a, s2.b, s1.b);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(s1.a, s2.a, s1.b))
        || (o2 == Orientation::Collinear && on_segment(s1.a, s2.b, s1.b))
        || (o3 == Orientation::Collinear && on_segment(s2.a, s1.a, s2.b))
        || (o4 == Orientation::Collinear && on_segment(s2.a, s1.b, s2.b))
}

/// crossing_param returns the parameter t in [0, 1] along `path` at which it first touches
/// `other`, or None if the segments do not intersect. For collinear overlaps the start of the
/// overlap is returned.
pub fn crossing_param(path: &Segment, other: &Segment) -> Option<f64> {
    if !segments_intersect(path, other) {
        return None;
    }

    let d = path.direction();
    let e = other.direction();
    let denom = d.cross(e);

    if denom != 0.0 {
        let t = (other.a - path.a).cross(e) / denom;
        return Some(t.clamp(0.0, 1.0));
    }

    let len_sq = d.length_sq();
    if len_sq == 0.0 {
        return Some(0.0);
    }
    let t0 = (other.a - path.a).dot(d) / len_sq;
    let t1 = (other.b - path.a).dot(d) / len_sq;
    Some(t0.min(t1).clamp(0.0, 1.0))
}

/// point_in_polygon performs a ray-casting parity test. The polygon is closed implicitly.
pub fn point_in_polygon(p: Vec2, poly: &[Vec2]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = poly[i];
        let vj = poly[j];
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// closest_point_on_segment returns the point of `seg` with minimal distance to `p`.
pub fn closest_point_on_segment(p: Vec2, seg: &Segment) -> Vec2 {
    let d = seg.direction();
    let len_sq = d.length_sq();
    if len_sq == 0.0 {
        return seg.a;
    }
    let t = ((p - seg.a).dot(d) / len_sq).clamp(0.0, 1.0);
    seg.a + d * t
}

pub fn distance_to_segment(p: Vec2, seg: &Segment) -> f64 {
    p.distance(closest_point_on_segment(p, seg))
}

/// ray_segment_intersection returns the ray parameter t >= 0 at which the ray
/// `origin + t * dir` hits `seg`. Parallel segments are reported as no hit.
pub fn ray_segment_intersection(origin: Vec2, dir: Vec2, seg: &Segment) -> Option<f64> {
    let e = seg.direction();
    let denom = dir.cross(e);
    if denom == 0.0 {
        return None;
    }
    let w = seg.a - origin;
    let t = w.cross(e) / denom;
    let u = w.cross(dir) / denom;
    if t >= 0.0 && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// polygon_edges returns the closing edge list of a polygon.
pub fn polygon_edges(poly: &[Vec2]) -> Vec<Segment> {
    let n = poly.len();
    (0..n)
        .map(|i| Segment::new(poly[i], poly[(i + 1) % n]))
        .collect()
}

/// centroid returns the vertex average of a point list.
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, &p| acc + p);
    sum * (1.0 / points.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl BoundingBox {
    pub fn from_points(points: &[Vec2]) -> BoundingBox {
        let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        BoundingBox { min, max }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }
}

// -------------------------------------------------------------------------------------------------
// PATH SAMPLING -----------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------

/// sample_count returns the number of intervals used to sample the path a -> b such that two
/// neighboring samples are at most 0.5 units apart on each axis.
pub fn sample_count(a: Vec2, b: Vec2) -> usize {
    let d = b - a;
    (2.0 * d.x.abs().max(d.y.abs())).ceil() as usize
}

/// path_samples yields the sampled points from a to b, both endpoints included.
pub fn path_samples(a: Vec2, b: Vec2) -> impl Iterator<Item = Vec2> {
    let steps = sample_count(a, b);
    let d = b - a;
    (0..=steps).map(move |i| {
        if steps == 0 {
            a
        } else {
            a + d * (i as f64 / steps as f64)
        }
    })
}

/// path_satisfies returns true if every sampled point between a and b fulfills `pred`.
pub fn path_satisfies<F: Fn(Vec2) -> bool>(a: Vec2, b: Vec2, pred: F) -> bool {
    path_samples(a, b).all(pred)
}
