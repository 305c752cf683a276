use orthru::{
    Anchor, Binding, Bounds, Connector, ConnectorUpdate, FixedSegment, GlobalPoint, LocalPoint,
    Scene, ShapeId, ShapeKind, is_valid_elbow_path, route,
};

fn lp(x: f64, y: f64) -> LocalPoint {
    LocalPoint::new(x, y)
}

fn seg(index: usize, sx: f64, sy: f64, ex: f64, ey: f64) -> FixedSegment {
    FixedSegment::new(index, lp(sx, sy), lp(ex, ey))
}

fn connector(points: Vec<LocalPoint>) -> Connector {
    Connector::new(Anchor::new(0.0, 0.0), points)
}

/// Result-shape checks every scenario must uphold.
fn check_invariants(r: &orthru::RoutedConnector) {
    assert!(is_valid_elbow_path(&r.points, 0.01), "path not orthogonal: {r}");
    assert_eq!(r.points[0], lp(0.0, 0.0), "first point off origin: {r}");
    for s in &r.fixed_segments {
        assert!(
            s.index > 1 && s.index < r.points.len() - 1,
            "fixed segment {} not interior in a {}-point path",
            s.index,
            r.points.len()
        );
    }
}

// =============================================================================
// Free routing
// =============================================================================

#[test]
fn aligned_endpoints_route_direct() {
    let c = connector(vec![lp(0.0, 100.0), lp(300.0, 100.0)]);
    let update = ConnectorUpdate::points(vec![lp(0.0, 100.0), lp(200.0, 100.0)]);
    let r = route(&c, update, &Scene::new()).unwrap();

    check_invariants(&r);
    assert_eq!(r.points, vec![lp(0.0, 0.0), lp(200.0, 0.0)]);
    // Back in global space this is the requested line.
    let anchor = Anchor::new(r.x, r.y);
    assert_eq!(anchor.to_global(r.points[0]), GlobalPoint::new(0.0, 100.0));
    assert_eq!(anchor.to_global(r.points[1]), GlobalPoint::new(200.0, 100.0));
}

#[test]
fn diagonal_endpoints_route_with_one_bend() {
    let c = connector(vec![lp(0.0, 0.0), lp(100.0, 0.0)]);
    let update = ConnectorUpdate::points(vec![lp(0.0, 0.0), lp(100.0, 100.0)]);
    let r = route(&c, update, &Scene::new()).unwrap();

    check_invariants(&r);
    assert_eq!(r.bend_count(), 1);
    insta::assert_snapshot!(r, @"(0, 0) -> (100, 0) -> (100, 100)");
}

#[test]
fn route_is_deterministic() {
    let c = connector(vec![lp(0.0, 0.0), lp(100.0, 0.0)]);
    let update = ConnectorUpdate::points(vec![lp(0.0, 0.0), lp(100.0, 100.0)]);
    let a = route(&c, update.clone(), &Scene::new()).unwrap();
    let b = route(&c, update, &Scene::new()).unwrap();
    assert_eq!(a, b);
}

// =============================================================================
// Bound routing
// =============================================================================

fn tall_rect_scene(id: ShapeId) -> Scene {
    Scene::new().with_shape(id, ShapeKind::Rectangle, Bounds::new(100.0, 0.0, 160.0, 200.0))
}

#[test]
fn bound_route_ends_at_the_orbit_attachment() {
    let id = ShapeId(1);
    let scene = tall_rect_scene(id);
    let c = connector(vec![lp(0.0, 100.0), lp(100.0, 100.0)])
        .with_end_binding(Binding::new(id, 0.5, 0.5))
        .with_arrowheads(false, true);
    // Drag the end onto the shape; the route stops at the orbit gap instead.
    let update = ConnectorUpdate::points(vec![lp(0.0, 100.0), lp(130.0, 100.0)]);
    let r = route(&c, update, &scene).unwrap();

    check_invariants(&r);
    assert_eq!(r.x, 0.0);
    assert_eq!(r.y, 100.0);
    assert_eq!(r.points, vec![lp(0.0, 0.0), lp(95.0, 0.0)]);
}

#[test]
fn bound_route_detours_around_the_shape() {
    let id = ShapeId(1);
    let shape = Bounds::new(100.0, 0.0, 160.0, 200.0);
    let scene = Scene::new().with_shape(id, ShapeKind::Rectangle, shape);
    // Start below-left of the shape; the attachment resolves to the bottom
    // edge, so the route has to come around rather than cut through.
    let c = connector(vec![lp(0.0, 300.0), lp(120.0, 100.0)])
        .with_end_binding(Binding::new(id, 0.5, 0.5))
        .with_arrowheads(false, false);
    let update = ConnectorUpdate::points(vec![lp(0.0, 300.0), lp(130.0, 100.0)]);
    let r = route(&c, update, &scene).unwrap();

    check_invariants(&r);
    insta::assert_snapshot!(r, @"(0, 0) -> (0, -70) -> (130, -70) -> (130, -95)");

    // No segment midpoint may fall inside the shape itself.
    let anchor = Anchor::new(r.x, r.y);
    for w in r.points.windows(2) {
        let mid = anchor.to_global(w[0]).midpoint(anchor.to_global(w[1]));
        assert!(!shape.contains(mid), "segment midpoint {mid} crosses the shape");
    }
}

// =============================================================================
// Fixed-segment editing
// =============================================================================

#[test]
fn moving_a_fixed_segment_shifts_only_the_perpendicular_axis() {
    let mut c = connector(vec![lp(0.0, 0.0), lp(0.0, 30.0), lp(60.0, 30.0), lp(60.0, 60.0)]);
    c.fixed_segments = vec![seg(2, 0.0, 30.0, 60.0, 30.0)];
    // Horizontal segment moved down by 20: only Y may change.
    let update = ConnectorUpdate::fixed_segments(vec![seg(2, 0.0, 50.0, 60.0, 50.0)]);
    let r = route(&c, update, &Scene::new()).unwrap();

    check_invariants(&r);
    assert_eq!(r.points, vec![lp(0.0, 0.0), lp(0.0, 50.0), lp(60.0, 50.0), lp(60.0, 60.0)]);
    assert_eq!(r.fixed_segments, vec![seg(2, 0.0, 50.0, 60.0, 50.0)]);
    let xs: Vec<f64> = r.points.iter().map(|p| p.x()).collect();
    assert_eq!(xs, vec![0.0, 0.0, 60.0, 60.0]);
}

#[test]
fn locking_the_leading_segment_inserts_a_transition_point() {
    let c = connector(vec![lp(0.0, 0.0), lp(100.0, 0.0), lp(100.0, 80.0)]);
    let update = ConnectorUpdate::fixed_segments(vec![seg(1, 0.0, 30.0, 100.0, 30.0)]);
    let r = route(&c, update, &Scene::new()).unwrap();

    check_invariants(&r);
    assert_eq!(
        r.points,
        vec![lp(0.0, 0.0), lp(0.0, 30.0), lp(100.0, 30.0), lp(100.0, 80.0)]
    );
    // The lock lands one segment in, keeping the first segment free.
    assert_eq!(r.fixed_segments, vec![seg(2, 0.0, 30.0, 100.0, 30.0)]);
}

#[test]
fn fixing_the_first_segment_in_place_is_rejected() {
    let c = connector(vec![lp(0.0, 0.0), lp(100.0, 0.0), lp(100.0, 80.0)]);
    // Same values as the current first segment: nothing to move, and the
    // lock itself is not allowed to stay.
    let update = ConnectorUpdate::fixed_segments(vec![seg(1, 0.0, 0.0, 100.0, 0.0)]);
    let r = route(&c, update, &Scene::new()).unwrap();

    check_invariants(&r);
    assert_eq!(r.points, vec![lp(0.0, 0.0), lp(100.0, 0.0), lp(100.0, 80.0)]);
    assert!(r.fixed_segments.is_empty());
}

#[test]
fn releasing_one_lock_keeps_the_others() {
    let mut c = connector(vec![
        lp(0.0, 0.0),
        lp(0.0, 30.0),
        lp(40.0, 30.0),
        lp(40.0, 60.0),
        lp(80.0, 60.0),
        lp(80.0, 90.0),
        lp(120.0, 90.0),
    ]);
    c.fixed_segments = vec![seg(2, 0.0, 30.0, 40.0, 30.0), seg(4, 40.0, 60.0, 80.0, 60.0)];
    // Drop the first lock; the run it pinned is re-routed.
    let update = ConnectorUpdate::fixed_segments(vec![seg(4, 40.0, 60.0, 80.0, 60.0)]);
    let r = route(&c, update, &Scene::new()).unwrap();

    check_invariants(&r);
    assert_eq!(
        r.points,
        vec![
            lp(0.0, 0.0),
            lp(0.0, 60.0),
            lp(40.0, 60.0),
            lp(80.0, 60.0),
            lp(80.0, 90.0),
            lp(120.0, 90.0),
        ]
    );
    // The surviving lock keeps its exact start/end, reindexed to the new
    // array.
    assert_eq!(r.fixed_segments, vec![seg(3, 40.0, 60.0, 80.0, 60.0)]);
}

#[test]
fn releasing_the_last_lock_still_avoids_the_bound_shape() {
    let id = ShapeId(1);
    let shape = Bounds::new(100.0, 0.0, 160.0, 200.0);
    let scene = Scene::new().with_shape(id, ShapeKind::Rectangle, shape);
    // Bound at the shape's right side, looping under the shape to an end
    // on its left.
    let mut c = Connector::new(
        Anchor::new(165.0, 100.0),
        vec![lp(0.0, 0.0), lp(35.0, 0.0), lp(35.0, 140.0), lp(-145.0, 140.0), lp(-145.0, 0.0)],
    )
    .with_start_binding(Binding::new(id, 0.5, 0.5))
    .with_arrowheads(false, false);
    c.fixed_segments = vec![seg(3, 35.0, 140.0, -145.0, 140.0)];
    // Releasing the only lock re-routes the whole connector. The binding
    // still holds: the shape stays an obstacle and the route leaves from
    // the re-resolved left-side attachment.
    let update = ConnectorUpdate::fixed_segments(vec![]);
    let r = route(&c, update, &scene).unwrap();

    check_invariants(&r);
    assert_eq!(r.x, 95.0);
    assert_eq!(r.y, 100.0);
    assert_eq!(r.points, vec![lp(0.0, 0.0), lp(-75.0, 0.0)]);
    assert!(r.fixed_segments.is_empty());
    let anchor = Anchor::new(r.x, r.y);
    for w in r.points.windows(2) {
        let a = anchor.to_global(w[0]);
        let b = anchor.to_global(w[1]);
        let crosses = a.x().min(b.x()) < shape.max.x
            && a.x().max(b.x()) > shape.min.x
            && a.y().min(b.y()) < shape.max.y
            && a.y().max(b.y()) > shape.min.y;
        assert!(!crosses, "segment {a} -> {b} crosses the shape");
    }
}

#[test]
fn endpoint_drag_reroutes_only_the_trail() {
    let mut c = connector(vec![
        lp(0.0, 0.0),
        lp(0.0, 30.0),
        lp(40.0, 30.0),
        lp(40.0, 60.0),
        lp(80.0, 60.0),
    ]);
    c.fixed_segments = vec![seg(3, 40.0, 30.0, 40.0, 60.0)];
    // Drag the free end from (80, 60) to (100, 80).
    let update = ConnectorUpdate::points(vec![
        lp(0.0, 0.0),
        lp(0.0, 30.0),
        lp(40.0, 30.0),
        lp(40.0, 60.0),
        lp(100.0, 80.0),
    ]);
    let r = route(&c, update, &Scene::new()).unwrap();

    check_invariants(&r);
    insta::assert_snapshot!(r, @"(0, 0) -> (0, 30) -> (40, 30) -> (40, 60) -> (40, 80) -> (100, 80)");
    // Lead-in and lock carried over verbatim.
    assert_eq!(&r.points[..4], &c.points[..4]);
    assert_eq!(r.fixed_segments, vec![seg(3, 40.0, 30.0, 40.0, 60.0)]);
}

#[test]
fn dragging_a_bound_start_lands_on_the_attachment() {
    let id = ShapeId(1);
    let shape = Bounds::new(100.0, 0.0, 160.0, 200.0);
    let scene = Scene::new().with_shape(id, ShapeKind::Rectangle, shape);
    let mut c = Connector::new(
        Anchor::new(165.0, 100.0),
        vec![lp(0.0, 0.0), lp(35.0, 0.0), lp(35.0, 60.0), lp(95.0, 60.0)],
    )
    .with_start_binding(Binding::new(id, 0.5, 0.5))
    .with_arrowheads(false, false);
    c.fixed_segments = vec![seg(2, 35.0, 0.0, 35.0, 60.0)];
    // Drag the bound start to a point inside its own shape while the lock
    // holds. The raw drag point is not where the connector may start: the
    // lead re-routes from the re-resolved orbit attachment.
    let update =
        ConnectorUpdate::points(vec![lp(-35.0, 7.0), lp(35.0, 0.0), lp(35.0, 60.0), lp(95.0, 60.0)]);
    let r = route(&c, update, &scene).unwrap();

    check_invariants(&r);
    assert_eq!(r.x, 165.0);
    assert_eq!(r.y, 100.0);
    assert_eq!(r.points, vec![lp(0.0, 0.0), lp(35.0, 0.0), lp(35.0, 60.0), lp(95.0, 60.0)]);
    assert_eq!(r.fixed_segments, vec![seg(2, 35.0, 0.0, 35.0, 60.0)]);
    // The start maps back to the right-side orbit gap, not the drag point.
    let anchor = Anchor::new(r.x, r.y);
    assert_eq!(anchor.to_global(r.points[0]), GlobalPoint::new(165.0, 100.0));
}

#[test]
fn resize_scales_locks_with_the_points() {
    let mut c = connector(vec![lp(0.0, 0.0), lp(0.0, 30.0), lp(60.0, 30.0), lp(60.0, 60.0)]);
    c.fixed_segments = vec![seg(2, 0.0, 30.0, 60.0, 30.0)];
    // Host doubled everything; points and locks arrive together.
    let update = ConnectorUpdate::points(vec![
        lp(0.0, 0.0),
        lp(0.0, 60.0),
        lp(120.0, 60.0),
        lp(120.0, 120.0),
    ])
    .with_fixed_segments(vec![seg(2, 0.0, 60.0, 120.0, 60.0)]);
    let r = route(&c, update, &Scene::new()).unwrap();

    check_invariants(&r);
    assert_eq!(
        r.points,
        vec![lp(0.0, 0.0), lp(0.0, 60.0), lp(120.0, 60.0), lp(120.0, 120.0)]
    );
    assert_eq!(r.fixed_segments, vec![seg(2, 0.0, 60.0, 120.0, 60.0)]);
}

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn renormalize_is_idempotent_on_clean_paths() {
    let mut c = Connector::new(
        Anchor::new(10.0, 20.0),
        vec![lp(0.0, 0.0), lp(0.0, 30.0), lp(60.0, 30.0), lp(60.0, 60.0)],
    );
    c.fixed_segments = vec![seg(2, 0.0, 30.0, 60.0, 30.0)];
    let r = route(&c, ConnectorUpdate::none(), &Scene::new()).unwrap();

    check_invariants(&r);
    assert_eq!(r.x, 10.0);
    assert_eq!(r.y, 20.0);
    assert_eq!(r.points, c.points);
    assert_eq!(r.fixed_segments, c.fixed_segments);
}

#[test]
fn renormalize_welds_stray_geometry() {
    // Duplicate point and a collinear run, as left behind by sloppy host
    // edits.
    let c = connector(vec![
        lp(0.0, 0.0),
        lp(50.0, 0.0),
        lp(50.0, 0.0),
        lp(100.0, 0.0),
        lp(100.0, 70.0),
    ]);
    let r = route(&c, ConnectorUpdate::none(), &Scene::new()).unwrap();

    check_invariants(&r);
    assert_eq!(r.points, vec![lp(0.0, 0.0), lp(100.0, 0.0), lp(100.0, 70.0)]);
}
