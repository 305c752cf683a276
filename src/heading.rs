//! Cardinal headings and direction classification.
//!
//! A heading is the exit/entry direction at a connector endpoint. Bound
//! endpoints classify the opposite endpoint into one of four sectors around
//! the shape to pick the side the connector leaves from; unbound endpoints
//! classify the raw direction vector.

use glam::DVec2;

use crate::types::{Bounds, GlobalPoint};

/// Sector cones project this far beyond the shape (relative to its center).
const SECTOR_SCALE: f64 = 2.0;

/// Cardinal exit/entry direction at a connector endpoint.
///
/// Variant order is the fixed neighbor-visit order of the pathfinder, so
/// tie-breaks stay deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    /// All headings in fixed visit order.
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    /// Unit vector, y-down screen convention (Up is negative y).
    #[inline]
    pub const fn unit(self) -> DVec2 {
        match self {
            Heading::Up => DVec2::new(0.0, -1.0),
            Heading::Right => DVec2::new(1.0, 0.0),
            Heading::Down => DVec2::new(0.0, 1.0),
            Heading::Left => DVec2::new(-1.0, 0.0),
        }
    }

    /// The opposite heading.
    #[inline]
    pub const fn flip(self) -> Heading {
        match self {
            Heading::Up => Heading::Down,
            Heading::Right => Heading::Left,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
        }
    }

    #[inline]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Heading::Left | Heading::Right)
    }

    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Heading::Up | Heading::Down)
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Heading::Up => "up",
            Heading::Right => "right",
            Heading::Down => "down",
            Heading::Left => "left",
        };
        write!(f, "{name}")
    }
}

/// Classify a direction vector into the cardinal with the larger axis-aligned
/// magnitude. Ties (including the zero vector) prefer horizontal.
pub fn vector_to_heading(v: DVec2) -> Heading {
    if v.x.abs() >= v.y.abs() {
        if v.x >= 0.0 { Heading::Right } else { Heading::Left }
    } else if v.y >= 0.0 {
        Heading::Down
    } else {
        Heading::Up
    }
}

/// Heading of the (assumed axis-aligned) step from `a` to `b`.
#[inline]
pub fn heading_between(a: GlobalPoint, b: GlobalPoint) -> Heading {
    vector_to_heading(b - a)
}

/// Which side of a rectangular shape faces `other`.
///
/// The four corner-derived triangles (corners pushed out 2x from the center)
/// split the neighborhood into up/right/down/left sectors whose boundaries
/// run along the box diagonals. Points beyond the cones classify by raw
/// direction, which agrees with the cones wherever they reach.
pub fn sector_heading(bounds: &Bounds, other: GlobalPoint) -> Heading {
    let mid = bounds.center();
    if bounds.is_degenerate() {
        return vector_to_heading(other.0 - mid);
    }
    let top_left = scale_from(mid, bounds.min, SECTOR_SCALE);
    let top_right = scale_from(mid, DVec2::new(bounds.max.x, bounds.min.y), SECTOR_SCALE);
    let bottom_right = scale_from(mid, bounds.max, SECTOR_SCALE);
    let bottom_left = scale_from(mid, DVec2::new(bounds.min.x, bounds.max.y), SECTOR_SCALE);

    let p = other.0;
    if point_in_triangle(p, top_left, top_right, mid) {
        Heading::Up
    } else if point_in_triangle(p, top_right, bottom_right, mid) {
        Heading::Right
    } else if point_in_triangle(p, bottom_right, bottom_left, mid) {
        Heading::Down
    } else if point_in_triangle(p, bottom_left, top_left, mid) {
        Heading::Left
    } else {
        vector_to_heading(p - mid)
    }
}

/// Which vertex of a diamond shape faces `other`.
///
/// Diamond edges are diagonal, so the sector boundaries are the two
/// edge-parallel lines through the center (`u + v = 0` and `u - v = 0` on
/// aspect-normalized offsets) instead of the box diagonals. Each sector is
/// centered on one diamond vertex.
pub fn diamond_sector_heading(bounds: &Bounds, other: GlobalPoint) -> Heading {
    let mid = bounds.center();
    let half_w = bounds.width() / 2.0;
    let half_h = bounds.height() / 2.0;
    if half_w == 0.0 || half_h == 0.0 {
        return vector_to_heading(other.0 - mid);
    }
    let u = (other.0.x - mid.x) / half_w;
    let v = (other.0.y - mid.y) / half_h;
    if u + v <= 0.0 && u - v >= 0.0 {
        Heading::Up
    } else if u + v >= 0.0 && u - v >= 0.0 {
        Heading::Right
    } else if u + v >= 0.0 {
        Heading::Down
    } else {
        Heading::Left
    }
}

fn scale_from(origin: DVec2, p: DVec2, factor: f64) -> DVec2 {
    origin + (p - origin) * factor
}

/// Sign-based triangle membership; boundary points count as inside, so the
/// first sector tested wins on ties.
fn point_in_triangle(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> bool {
    let d1 = edge_sign(p, a, b);
    let d2 = edge_sign(p, b, c);
    let d3 = edge_sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

fn edge_sign(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    (p.x - b.x) * (a.y - b.y) - (a.x - b.x) * (p.y - b.y)
}
