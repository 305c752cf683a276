//! The fixed-segment editor, the one public entry point for geometry edits.
//!
//! Every edit (endpoint drag, shape move, segment lock/unlock, resize)
//! lands here as a [`ConnectorUpdate`] against the current [`Connector`]. The
//! update is classified into exactly one scenario, handled, and the
//! complete replacement geometry returned. Fixed segments are the
//! complication: they must survive re-routing verbatim, so most scenarios
//! route only the unfixed spans and splice the results around the locks.
//!
//! Malformed requests never fail the call. Bad fixed segments are dropped
//! with a warning, an empty search degrades to a fallback bend, and
//! out-of-range coordinates are clamped. The only hard errors are inputs
//! that are not a connector at all (too few points, non-finite values).

use std::collections::BTreeSet;
use std::fmt;

use glam::DVec2;

use crate::connector::{
    Connector, ConnectorUpdate, FixedSegment, is_valid_elbow_path, point_finite,
};
use crate::errors::RouteError;
use crate::heading::{Heading, vector_to_heading};
use crate::log::{debug, warn};
use crate::route::defaults::{MAX_POS, ORTHO_TOLERANCE};
use crate::route::{
    ResolvedEndpoint, cleanup_local, renormalize, reorigin, resolve_pair, route_between,
};
use crate::shapes::ShapeRegistry;
use crate::types::{Anchor, LocalPoint};

// ============================================================================
// Result geometry
// ============================================================================

/// The complete replacement geometry for a connector.
///
/// `x`/`y` is the new anchor, `points` the normalized local path (first
/// point always the origin), `fixed_segments` the surviving locks reindexed
/// against the new point array.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedConnector {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub points: Vec<LocalPoint>,
    pub fixed_segments: Vec<FixedSegment>,
}

impl RoutedConnector {
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Total path length. Segments are axis-aligned so this is also the
    /// Euclidean length.
    pub fn manhattan_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| {
                let d = w[1] - w[0];
                d.x.abs() + d.y.abs()
            })
            .sum()
    }

    /// Number of 90-degree turns in the path.
    pub fn bend_count(&self) -> usize {
        self.points
            .windows(3)
            .filter(|w| {
                let a = w[1] - w[0];
                let b = w[2] - w[1];
                (a.x.abs() >= a.y.abs()) != (b.x.abs() >= b.y.abs())
            })
            .count()
    }
}

impl fmt::Display for RoutedConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Scenario classification
// ============================================================================

/// What a [`ConnectorUpdate`] asks for, one variant per editing scenario.
/// Updates that restate the current geometry are normalized away before
/// classification, so each variant's precondition is genuine.
#[derive(Debug, Clone, PartialEq)]
enum UpdateScenario {
    /// Nothing requested: clean the existing path up.
    Renormalize,
    /// No locks before or after: route from scratch.
    FullReroute { points: Option<Vec<LocalPoint>> },
    /// Locks were removed: re-route the gaps they leave.
    Release { fixed: Vec<FixedSegment> },
    /// Locks moved (or were added) with the same point array.
    MoveSegment { fixed: Vec<FixedSegment> },
    /// Points and locks replaced together, e.g. by a resize.
    Rescale { points: Vec<LocalPoint>, fixed: Vec<FixedSegment> },
    /// Points changed under existing locks: an endpoint drag.
    EndpointDrag { points: Vec<LocalPoint> },
}

fn classify(
    current_fixed: &[FixedSegment],
    points_update: Option<Vec<LocalPoint>>,
    fixed_update: Option<Vec<FixedSegment>>,
) -> UpdateScenario {
    let after_empty = fixed_update.as_deref().unwrap_or(current_fixed).is_empty();
    match (points_update, fixed_update) {
        (None, None) => UpdateScenario::Renormalize,
        (points, _) if current_fixed.is_empty() && after_empty => {
            UpdateScenario::FullReroute { points }
        }
        (None, Some(f)) if f.len() < current_fixed.len() => UpdateScenario::Release { fixed: f },
        (None, Some(f)) => UpdateScenario::MoveSegment { fixed: f },
        (Some(p), Some(f)) => UpdateScenario::Rescale { points: p, fixed: f },
        (Some(p), None) => UpdateScenario::EndpointDrag { points: p },
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Apply `update` to `connector` and return the replacement geometry.
///
/// The connector itself is not mutated; the caller persists the result. See
/// the module docs for the degradation rules.
pub fn route(
    connector: &Connector,
    update: ConnectorUpdate,
    registry: &dyn ShapeRegistry,
) -> Result<RoutedConnector, RouteError> {
    connector.validate()?;
    if let Some(points) = &update.points {
        if points.len() < 2 {
            return Err(RouteError::TooFewPoints { count: points.len() });
        }
        for p in points {
            point_finite(p.0, "update points")?;
        }
    }

    let current_fixed = sanitize_fixed_segments(&connector.fixed_segments, connector.points.len());

    // Requests that restate the current geometry are no-ops.
    let points_update = update.points.filter(|p| *p != connector.points);
    let fixed_update = update.fixed_segments.filter(|f| *f != connector.fixed_segments);

    let scenario = classify(&current_fixed, points_update, fixed_update);
    debug!("connector update classified as {:?}", scenario);

    let (anchor, points, fixed) = match scenario {
        UpdateScenario::Renormalize => renormalize_only(connector, &current_fixed, registry),
        UpdateScenario::FullReroute { points } => {
            full_reroute(connector, points.as_deref(), registry)
        }
        UpdateScenario::Release { fixed } => release(connector, &current_fixed, fixed, registry),
        UpdateScenario::MoveSegment { fixed } => move_segments(connector, fixed),
        UpdateScenario::Rescale { points, fixed } => rescale(connector, points, fixed),
        UpdateScenario::EndpointDrag { points } => {
            endpoint_drag(connector, &current_fixed, points, registry)
        }
    };
    Ok(finalize(anchor, points, fixed))
}

// ============================================================================
// Scenario handlers
// ============================================================================

type Geometry = (Anchor, Vec<LocalPoint>, Vec<FixedSegment>);

/// Scenario: cleanup-only call. Welds the existing path and re-locates the
/// locks by their value pairs; a lock whose geometry got welded away is
/// released. If that releases everything, the connector has nothing pinning
/// it and gets routed from scratch.
fn renormalize_only(
    connector: &Connector,
    current_fixed: &[FixedSegment],
    registry: &dyn ShapeRegistry,
) -> Geometry {
    let cleaned = cleanup_local(connector.points.clone());
    let fixed = reindex_by_values(current_fixed, &cleaned);
    if !current_fixed.is_empty() && fixed.is_empty() {
        return full_reroute(connector, None, registry);
    }
    (connector.anchor, cleaned, fixed)
}

/// Scenario: nothing is locked, so resolve both bindings and route the
/// whole connector fresh.
fn full_reroute(
    connector: &Connector,
    new_points: Option<&[LocalPoint]>,
    registry: &dyn ShapeRegistry,
) -> Geometry {
    let points = new_points.unwrap_or(&connector.points);
    let start = connector.to_global(*points.first().unwrap_or(&LocalPoint::ZERO));
    let end = connector.to_global(*points.last().unwrap_or(&LocalPoint::ZERO));
    let (s, e) = resolve_pair(
        start,
        end,
        connector.start_binding.as_ref(),
        connector.end_binding.as_ref(),
        connector.start_arrowhead,
        connector.end_arrowhead,
        registry,
    );
    let path = route_between(&s, &e);
    let n = renormalize(&path);
    (n.anchor, n.points, Vec::new())
}

/// Scenario: locks were removed. The remaining locks partition the path
/// into runs; every run that lost a lock is re-routed between its
/// boundaries, everything else is kept verbatim.
fn release(
    connector: &Connector,
    current_fixed: &[FixedSegment],
    requested: Vec<FixedSegment>,
    registry: &dyn ShapeRegistry,
) -> Geometry {
    let points = &connector.points;
    let n = points.len();
    let kept = sanitize_fixed_segments(&requested, n);
    let kept_indices: BTreeSet<usize> = kept.iter().map(|s| s.index).collect();
    let released: Vec<usize> = current_fixed
        .iter()
        .map(|s| s.index)
        .filter(|i| !kept_indices.contains(i))
        .collect();
    if released.is_empty() {
        return (connector.anchor, points.clone(), kept);
    }

    // A run bordering a true connector endpoint keeps that endpoint's
    // binding: the bound shape stays an obstacle and the run lands on the
    // resolved attachment.
    let ends = resolve_span_ends(connector, points[0], points[n - 1], registry);

    let mut out: Vec<LocalPoint> = Vec::new();
    let mut cursor = 0usize;
    for seg in &kept {
        free_run(connector, points, cursor, seg.index - 1, &released, &ends, &mut out);
        extend_path(&mut out, &[points[seg.index - 1], points[seg.index]]);
        cursor = seg.index;
    }
    free_run(connector, points, cursor, n - 1, &released, &ends, &mut out);

    let fixed = reindex_by_values(&kept, &out);
    (connector.anchor, out, fixed)
}

/// Append the unfixed run covering points `a..=b`: verbatim if no released
/// lock falls inside it, otherwise a fresh sub-route between the run's
/// boundaries. A boundary at a bound true endpoint uses its resolved
/// attachment; every other boundary stays where it is, with a heading taken
/// from the surrounding geometry.
fn free_run(
    connector: &Connector,
    points: &[LocalPoint],
    a: usize,
    b: usize,
    released: &[usize],
    ends: &(SpanEnd, SpanEnd),
    out: &mut Vec<LocalPoint>,
) {
    let n = points.len();
    if !released.iter().any(|&r| a < r && r <= b) {
        extend_path(out, &points[a..=b]);
        return;
    }
    let (s, snap_a) = if a == 0 && connector.start_binding.is_some() {
        (ends.0.resolved, ends.0.target)
    } else {
        let heading = if a == 0 {
            segment_heading(points[0], points[1])
        } else {
            segment_heading(points[a - 1], points[a])
        };
        (span_endpoint(connector.anchor, points[a], heading), points[a])
    };
    let (e, snap_b) = if b == n - 1 && connector.end_binding.is_some() {
        (ends.1.resolved, ends.1.target)
    } else {
        let heading = if b == n - 1 {
            segment_heading(points[n - 2], points[n - 1]).flip()
        } else {
            segment_heading(points[b], points[b + 1]).flip()
        };
        (span_endpoint(connector.anchor, points[b], heading), points[b])
    };
    let piece = route_span(connector.anchor, &s, &e, snap_a, snap_b);
    extend_path(out, &piece);
}

/// Scenario: the lock list changed without a point change, so segments
/// moved or were freshly locked. A horizontal segment only moves in Y and a
/// vertical one only in X; the shared points drag their neighbors along.
/// A lock landing on the first or last segment gets a transition point
/// spliced in so the outermost segment stays free to adapt to bindings.
fn move_segments(connector: &Connector, requested: Vec<FixedSegment>) -> Geometry {
    let mut pts = connector.points.clone();
    let mut tracked: Vec<usize> = Vec::new();
    let mut requested = requested;
    requested.sort_by_key(|s| s.index);
    let mut shift = 0usize;

    for r in requested {
        let idx = r.index + shift;
        if idx == 0 || idx >= pts.len() {
            warn!("fixed segment index {} is outside the path; ignoring it", r.index);
            continue;
        }
        if !r.is_orthogonal(ORTHO_TOLERANCE) {
            warn!("fixed segment {} is not axis-aligned; ignoring it", r.index);
            continue;
        }
        if tracked.last().is_some_and(|&t| t == idx) {
            warn!("duplicate fixed segment at index {}; keeping the first", r.index);
            continue;
        }
        let cs = pts[idx - 1];
        let ce = pts[idx];
        if r.start == cs && r.end == ce {
            tracked.push(idx);
            continue;
        }
        if idx == 1 && idx == pts.len() - 1 {
            warn!("cannot fix the only segment of a two-point connector");
            continue;
        }
        let d = ce - cs;
        let horizontal = d.x.abs() >= d.y.abs();
        let target = if horizontal { r.start.y() } else { r.start.x() };
        let moved = |p: LocalPoint| {
            if horizontal { LocalPoint::new(p.x(), target) } else { LocalPoint::new(target, p.y()) }
        };
        if idx == 1 {
            // Would become the first segment: splice a transition point
            // after the start so the lock sits one segment in.
            let transition = moved(pts[0]);
            pts[1] = moved(ce);
            pts.insert(1, transition);
            shift += 1;
            tracked.push(2);
        } else if idx == pts.len() - 1 {
            let last = pts.len() - 1;
            let transition = moved(pts[last]);
            pts[last - 1] = moved(cs);
            pts.insert(last, transition);
            shift += 1;
            tracked.push(last);
        } else {
            pts[idx - 1] = moved(cs);
            pts[idx] = moved(ce);
            tracked.push(idx);
        }
    }

    // A move can fold the outermost segment to nothing; drop the duplicate
    // point. Interior stubs are left for the next cleanup pass.
    if pts.len() > 2 && pts[0] == pts[1] {
        pts.remove(1);
        for t in &mut tracked {
            *t = t.saturating_sub(1);
        }
    }
    if pts.len() > 2 && pts[pts.len() - 1] == pts[pts.len() - 2] {
        let last = pts.len() - 1;
        pts.remove(last - 1);
    }

    let fixed = tracked
        .iter()
        .filter(|&&i| i >= 1 && i < pts.len())
        .map(|&i| FixedSegment::new(i, pts[i - 1], pts[i]))
        .collect();
    (connector.anchor, pts, fixed)
}

/// Scenario: points and locks replaced together, e.g. a host-side resize
/// that scaled everything. The new points are authoritative; lock values
/// are rebuilt from them by index. No routing.
fn rescale(
    connector: &Connector,
    new_points: Vec<LocalPoint>,
    requested: Vec<FixedSegment>,
) -> Geometry {
    let kept = sanitize_fixed_segments(&requested, new_points.len());
    let fixed = kept
        .iter()
        .map(|s| FixedSegment::new(s.index, new_points[s.index - 1], new_points[s.index]))
        .collect();
    (connector.anchor, new_points, fixed)
}

/// Scenario: the point array changed while locks exist, i.e. an endpoint
/// drag. Only the lead-in (start to first lock) and trail-out (last lock to
/// end) are re-routed, and only on the side whose endpoint actually moved;
/// the locked middle is carried over verbatim.
fn endpoint_drag(
    connector: &Connector,
    current_fixed: &[FixedSegment],
    new_points: Vec<LocalPoint>,
    registry: &dyn ShapeRegistry,
) -> Geometry {
    let old = &connector.points;
    let old_start = *old.first().unwrap_or(&LocalPoint::ZERO);
    let old_end = *old.last().unwrap_or(&LocalPoint::ZERO);
    let new_start = *new_points.first().unwrap_or(&LocalPoint::ZERO);
    let new_end = *new_points.last().unwrap_or(&LocalPoint::ZERO);
    let start_changed = new_start != old_start;
    let end_changed = new_end != old_end;

    if !start_changed && !end_changed {
        // Interior points edited directly; honor them and keep whatever
        // locks still line up.
        let fixed = reindex_by_values(current_fixed, &new_points);
        return (connector.anchor, new_points, fixed);
    }
    let (Some(first_fixed), Some(last_fixed)) = (current_fixed.first(), current_fixed.last())
    else {
        return full_reroute(connector, Some(&new_points), registry);
    };

    // A bound side lands on its resolved attachment, not the raw drag
    // point; an unbound side goes exactly where it was dragged.
    let (s, e) = resolve_span_ends(connector, new_start, new_end, registry);

    // Point index where the locked middle begins and ends.
    let mid_a = first_fixed.index - 1;
    let mid_b = last_fixed.index;

    let mut out: Vec<LocalPoint> = Vec::new();
    if start_changed {
        let entry = segment_heading(old[mid_a], old[mid_a + 1]).flip();
        let lock_start = span_endpoint(connector.anchor, old[mid_a], entry);
        let lead = route_span(connector.anchor, &s.resolved, &lock_start, s.target, old[mid_a]);
        extend_path(&mut out, &lead);
    } else {
        extend_path(&mut out, &old[..=mid_a]);
    }
    extend_path(&mut out, &old[mid_a..=mid_b]);
    if end_changed {
        let exit = segment_heading(old[mid_b - 1], old[mid_b]);
        let lock_end = span_endpoint(connector.anchor, old[mid_b], exit);
        let trail = route_span(connector.anchor, &lock_end, &e.resolved, old[mid_b], e.target);
        extend_path(&mut out, &trail);
    } else {
        extend_path(&mut out, &old[mid_b..]);
    }

    let fixed = reindex_by_values(current_fixed, &out);
    (connector.anchor, out, fixed)
}

// ============================================================================
// Shared plumbing
// ============================================================================

/// Drop fixed segments that cannot be honored: duplicate or non-interior
/// indices and non-orthogonal value pairs. Returns the survivors sorted by
/// index.
fn sanitize_fixed_segments(segments: &[FixedSegment], point_count: usize) -> Vec<FixedSegment> {
    let mut sorted = segments.to_vec();
    sorted.sort_by_key(|s| s.index);
    let mut out: Vec<FixedSegment> = Vec::with_capacity(sorted.len());
    for seg in sorted {
        if out.last().is_some_and(|p| p.index == seg.index) {
            warn!("duplicate fixed segment at index {}; keeping the first", seg.index);
            continue;
        }
        if seg.index <= 1 || point_count < 2 || seg.index >= point_count - 1 {
            warn!("fixed segment index {} is not interior; ignoring it", seg.index);
            continue;
        }
        if !seg.is_orthogonal(ORTHO_TOLERANCE) {
            warn!("fixed segment {} is not axis-aligned; ignoring it", seg.index);
            continue;
        }
        out.push(seg);
    }
    out
}

/// Re-locate each lock in `points` by its exact value pair, in order. Locks
/// whose geometry is gone are released.
fn reindex_by_values(segments: &[FixedSegment], points: &[LocalPoint]) -> Vec<FixedSegment> {
    let mut out: Vec<FixedSegment> = Vec::new();
    let mut from = 0usize;
    for seg in segments {
        let found = points
            .windows(2)
            .enumerate()
            .skip(from)
            .find(|(_, w)| w[0] == seg.start && w[1] == seg.end)
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                from = i + 1;
                out.push(FixedSegment::new(i + 1, seg.start, seg.end));
            }
            None => {
                warn!("fixed segment {} no longer matches the path; releasing it", seg.index);
            }
        }
    }
    out
}

/// Append `piece` to the path, skipping the boundary point both sides
/// share.
fn extend_path(out: &mut Vec<LocalPoint>, piece: &[LocalPoint]) {
    let skip = usize::from(!out.is_empty()).min(piece.len());
    out.extend_from_slice(&piece[skip..]);
}

fn segment_heading(a: LocalPoint, b: LocalPoint) -> Heading {
    vector_to_heading(b - a)
}

fn span_endpoint(anchor: Anchor, p: LocalPoint, heading: Heading) -> ResolvedEndpoint {
    ResolvedEndpoint { point: anchor.to_global(p), heading, shape_bounds: None, arrowhead: false }
}

/// A partial re-route boundary at a true connector endpoint: what the
/// router sees, and the exact local point the spliced result must land on.
#[derive(Clone, Copy)]
struct SpanEnd {
    resolved: ResolvedEndpoint,
    target: LocalPoint,
}

/// Resolve the connector's true endpoints for a partial re-route. A bound
/// side lands on its resolved attachment; an unbound side keeps the raw
/// point it was asked for.
fn resolve_span_ends(
    connector: &Connector,
    start_raw: LocalPoint,
    end_raw: LocalPoint,
    registry: &dyn ShapeRegistry,
) -> (SpanEnd, SpanEnd) {
    let (s, e) = resolve_pair(
        connector.to_global(start_raw),
        connector.to_global(end_raw),
        connector.start_binding.as_ref(),
        connector.end_binding.as_ref(),
        connector.start_arrowhead,
        connector.end_arrowhead,
        registry,
    );
    let start_target = if connector.start_binding.is_some() {
        connector.anchor.to_local(s.point)
    } else {
        start_raw
    };
    let end_target = if connector.end_binding.is_some() {
        connector.anchor.to_local(e.point)
    } else {
        end_raw
    };
    (
        SpanEnd { resolved: s, target: start_target },
        SpanEnd { resolved: e, target: end_target },
    )
}

/// Route between two resolved endpoints and bring the result back to local
/// space. The round trip through global coordinates can wobble the last
/// bit, so the span's boundary points are restored exactly.
fn route_span(
    anchor: Anchor,
    s: &ResolvedEndpoint,
    e: &ResolvedEndpoint,
    snap_a: LocalPoint,
    snap_b: LocalPoint,
) -> Vec<LocalPoint> {
    let mut out: Vec<LocalPoint> =
        route_between(s, e).into_iter().map(|p| anchor.to_local(p)).collect();
    if let Some(first) = out.first_mut() {
        *first = snap_a;
    }
    if let Some(last) = out.last_mut() {
        *last = snap_b;
    }
    out
}

/// Post-scenario validation: restore the origin invariant, clamp runaway
/// coordinates, drop locks the result can no longer honor, and measure the
/// bounding box.
fn finalize(anchor: Anchor, mut points: Vec<LocalPoint>, fixed: Vec<FixedSegment>) -> RoutedConnector {
    let anchor = reorigin(anchor, &mut points);

    let mut clamped = false;
    let limit = DVec2::splat(MAX_POS);
    let origin = anchor.0.clamp(-limit, limit);
    if origin != anchor.0 {
        clamped = true;
    }
    for p in &mut points {
        let c = p.0.clamp(-limit, limit);
        if c != p.0 {
            clamped = true;
            p.0 = c;
        }
    }

    let mut fixed = sanitize_fixed_segments(&fixed, points.len());
    if clamped {
        warn!("coordinates clamped to +/-{}", MAX_POS);
    }
    // Reorigin and clamping both move points; lock values follow them.
    for s in &mut fixed {
        s.start = points[s.index - 1];
        s.end = points[s.index];
    }
    if !is_valid_elbow_path(&points, ORTHO_TOLERANCE) {
        warn!("routed path is not axis-aligned within tolerance");
    }

    let mut min = DVec2::ZERO;
    let mut max = DVec2::ZERO;
    for p in &points {
        min = min.min(p.0);
        max = max.max(p.0);
    }
    RoutedConnector {
        x: origin.x,
        y: origin.y,
        width: max.x - min.x,
        height: max.y - min.y,
        points,
        fixed_segments: fixed,
    }
}
