//! Dynamic obstacle construction.
//!
//! Each endpoint contributes one padded "keep-out" box and one dongle: the
//! virtual waypoint just outside the box where pathfinding starts or ends.
//! The padding is asymmetric (the exit side stays short), midpoint-aware for
//! diagonal placements, and collapses to point-sized boxes when the two
//! padded boxes would trap the path between them.

use glam::DVec2;

use crate::heading::Heading;
use crate::types::{Bounds, GlobalPoint};

use super::ResolvedEndpoint;
use super::defaults::{BASE_PADDING, OVERLAP_PADDING, head_padding};

/// The pathfinder's view of the two endpoints.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ObstacleSet {
    pub start_box: Bounds,
    pub end_box: Bounds,
    pub start_dongle: GlobalPoint,
    pub end_dongle: GlobalPoint,
}

impl ObstacleSet {
    pub(crate) fn boxes(&self) -> [Bounds; 2] {
        [self.start_box, self.end_box]
    }
}

/// Build both obstacle boxes and dongles for a routing call.
pub(crate) fn build_obstacles(start: &ResolvedEndpoint, end: &ResolvedEndpoint) -> ObstacleSet {
    let start_raw = raw_box(start);
    let end_raw = raw_box(end);

    let mut start_box = padded_box(start, start_raw);
    let mut end_box = padded_box(end, end_raw);

    // Diagonal placement: when the raw boxes share no axis range, the sides
    // facing each other stop at the midpoint of the gap unless the plain
    // padding is tighter.
    if disjoint_x(&start_raw, &end_raw) && disjoint_y(&start_raw, &end_raw) {
        pull_facing_sides(&mut start_box, &start_raw, &end_raw);
        pull_facing_sides(&mut end_box, &end_raw, &start_raw);
    }

    // Overlapping padded boxes would trap the path between them; fall back
    // to symmetric boxes around the attachment points themselves.
    if interiors_overlap(&start_box, &end_box) {
        start_box = Bounds::from_point(start.point, OVERLAP_PADDING);
        end_box = Bounds::from_point(end.point, OVERLAP_PADDING);
    }

    ObstacleSet {
        start_box,
        end_box,
        start_dongle: dongle(&start_box, start.point, start.heading),
        end_dongle: dongle(&end_box, end.point, end.heading),
    }
}

/// The unpadded footprint: the bound shape's bounds, or a zero-size box at
/// the endpoint itself when nothing contributes an obstacle. The zero-size
/// box keeps the endpoint on the grid without blocking anything, and its
/// dongle coincides with the endpoint.
fn raw_box(ep: &ResolvedEndpoint) -> Bounds {
    match ep.shape_bounds {
        Some(b) => b,
        None => Bounds::from_point(ep.point, 0.0),
    }
}

/// Apply base padding on three sides and the reduced head padding on the
/// exit side. Unbound endpoints get no padding at all.
fn padded_box(ep: &ResolvedEndpoint, raw: Bounds) -> Bounds {
    if ep.shape_bounds.is_none() {
        return raw;
    }
    let head = head_padding(ep.arrowhead);
    let side = |h: Heading| if h == ep.heading { head } else { BASE_PADDING };
    raw.expand(
        side(Heading::Up),
        side(Heading::Right),
        side(Heading::Down),
        side(Heading::Left),
    )
}

fn disjoint_x(a: &Bounds, b: &Bounds) -> bool {
    a.max.x < b.min.x || b.max.x < a.min.x
}

fn disjoint_y(a: &Bounds, b: &Bounds) -> bool {
    a.max.y < b.min.y || b.max.y < a.min.y
}

/// Strict overlap: boxes that merely share an edge (the diagonal midpoint
/// rule makes facing boxes meet exactly) do not count.
fn interiors_overlap(a: &Bounds, b: &Bounds) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

/// Per axis, move the side of `padded` that faces `other` to the midpoint of
/// the gap between the raw boxes, unless the padded boundary is already
/// closer to the shape.
fn pull_facing_sides(padded: &mut Bounds, own: &Bounds, other: &Bounds) {
    if other.max.x < own.min.x {
        let mid = (own.min.x + other.max.x) / 2.0;
        padded.min.x = padded.min.x.max(mid);
    } else if own.max.x < other.min.x {
        let mid = (own.max.x + other.min.x) / 2.0;
        padded.max.x = padded.max.x.min(mid);
    }
    if other.max.y < own.min.y {
        let mid = (own.min.y + other.max.y) / 2.0;
        padded.min.y = padded.min.y.max(mid);
    } else if own.max.y < other.min.y {
        let mid = (own.max.y + other.min.y) / 2.0;
        padded.max.y = padded.max.y.min(mid);
    }
}

/// The point on the box edge in the heading direction, keeping the
/// attachment's perpendicular coordinate.
fn dongle(b: &Bounds, attachment: GlobalPoint, heading: Heading) -> GlobalPoint {
    match heading {
        Heading::Up => GlobalPoint(DVec2::new(attachment.x(), b.min.y)),
        Heading::Right => GlobalPoint(DVec2::new(b.max.x, attachment.y())),
        Heading::Down => GlobalPoint(DVec2::new(attachment.x(), b.max.y)),
        Heading::Left => GlobalPoint(DVec2::new(b.min.x, attachment.y())),
    }
}
