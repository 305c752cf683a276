//! Path post-processing: endpoint reattachment, segment welding and the
//! final renormalization into anchor-relative coordinates.
//!
//! The search returns dongle-to-dongle node positions. Before a path is
//! handed back it gets the real endpoints spliced on, collinear runs and
//! sub-unit stubs welded away, and its origin moved onto the first point.

use glam::DVec2;

use crate::types::{Anchor, GlobalPoint, LocalPoint};

use super::defaults::DEDUP_THRESHOLD;

/// Coordinates this close count as the same grid lane.
const AXIS_EPSILON: f64 = 1e-9;

/// Splice the true endpoints onto a dongle-to-dongle path. No-ops on ends
/// that already coincide.
pub(crate) fn reattach(path: &mut Vec<GlobalPoint>, start: GlobalPoint, end: GlobalPoint) {
    if path.first().is_some_and(|p| *p != start) {
        path.insert(0, start);
    }
    if path.last().is_some_and(|p| *p != end) {
        path.push(end);
    }
}

pub(crate) fn cleanup_global(points: Vec<GlobalPoint>) -> Vec<GlobalPoint> {
    cleanup(points.into_iter().map(|p| p.0).collect())
        .into_iter()
        .map(GlobalPoint)
        .collect()
}

pub(crate) fn cleanup_local(points: Vec<LocalPoint>) -> Vec<LocalPoint> {
    cleanup(points.into_iter().map(|p| p.0).collect())
        .into_iter()
        .map(LocalPoint)
        .collect()
}

/// Weld a raw elbow path: merge collinear runs, fold sub-unit stubs into
/// their neighbors, then merge whatever the folding lined up. Endpoints
/// never move.
fn cleanup(points: Vec<DVec2>) -> Vec<DVec2> {
    let points = simplify_collinear(points);
    let points = merge_short_segments(points, DEDUP_THRESHOLD);
    simplify_collinear(points)
}

/// Drop interior points whose neighbors share an axis with them. Also
/// swallows exact duplicates, which share both.
fn simplify_collinear(points: Vec<DVec2>) -> Vec<DVec2> {
    if points.len() < 3 {
        return points;
    }
    let mut out: Vec<DVec2> = Vec::with_capacity(points.len());
    for p in points {
        while out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let shares_x = (a.x - b.x).abs() <= AXIS_EPSILON && (b.x - p.x).abs() <= AXIS_EPSILON;
            let shares_y = (a.y - b.y).abs() <= AXIS_EPSILON && (b.y - p.y).abs() <= AXIS_EPSILON;
            if shares_x || shares_y {
                out.pop();
            } else {
                break;
            }
        }
        out.push(p);
    }
    out
}

/// Remove interior points that sit within `threshold` of their predecessor.
/// The segment leaving the removed stub keeps its orientation and its
/// constant axis snaps onto the surviving point, so the path stays
/// orthogonal. A stub whose removal would drag the far endpoint stays put.
fn merge_short_segments(mut points: Vec<DVec2>, threshold: f64) -> Vec<DVec2> {
    if points.len() < 3 {
        return points;
    }
    let mut i = 1;
    while i + 1 < points.len() {
        let prev = points[i - 1];
        let here = points[i];
        if (here - prev).length() > threshold {
            i += 1;
            continue;
        }
        let next = points[i + 1];
        let snapped = if (next.x - here.x).abs() <= AXIS_EPSILON {
            DVec2::new(prev.x, next.y)
        } else {
            DVec2::new(next.x, prev.y)
        };
        if i + 1 == points.len() - 1 && (snapped - next).length() > AXIS_EPSILON {
            i += 1;
            continue;
        }
        points[i + 1] = snapped;
        points.remove(i);
    }
    points
}

/// A global path re-expressed relative to its first point.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedPath {
    pub(crate) anchor: Anchor,
    pub(crate) points: Vec<LocalPoint>,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

/// Move the anchor onto the first path point and measure the bounding box.
pub(crate) fn renormalize(path: &[GlobalPoint]) -> NormalizedPath {
    let origin = path.first().copied().unwrap_or(GlobalPoint::ZERO);
    let anchor = Anchor(origin.0);
    let points: Vec<LocalPoint> = path.iter().map(|p| anchor.to_local(*p)).collect();
    let mut min = DVec2::ZERO;
    let mut max = DVec2::ZERO;
    for p in &points {
        min = min.min(p.0);
        max = max.max(p.0);
    }
    NormalizedPath { anchor, points, width: max.x - min.x, height: max.y - min.y }
}

/// Shift the anchor so the first local point lands back on the origin.
/// Returns the corrected anchor; all points move by the same delta.
pub(crate) fn reorigin(anchor: Anchor, points: &mut [LocalPoint]) -> Anchor {
    let shift = match points.first() {
        Some(p) if !p.is_origin(0.0) => p.0,
        _ => return anchor,
    };
    for p in points.iter_mut() {
        p.0 -= shift;
    }
    Anchor(anchor.0 + shift)
}
