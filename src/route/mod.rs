//! Route computation, from binding resolution to the welded global path.
//!
//! The pipeline runs resolve -> pad -> grid -> search -> weld. Endpoints are
//! first resolved into an attachment point and a cardinal heading, the bound
//! shapes get padded into keep-out boxes with dongles marking the exit
//! lanes, and the search runs dongle to dongle over the sparse grid. The
//! editor drives this per connector update; nothing here is retained
//! between calls.

mod astar;
pub(crate) mod defaults;
mod grid;
mod obstacle;
mod post;

pub(crate) use post::{cleanup_local, renormalize, reorigin};

use glam::DVec2;

use crate::connector::{Binding, BindingMode};
use crate::heading::{Heading, vector_to_heading};
use crate::log::{debug, warn};
use crate::shapes::{Outline, ShapeOutline, ShapeRegistry};
use crate::types::{Bounds, GlobalPoint};

use self::astar::find_path;
use self::defaults::{BINDING_GAP, POINT_SHAPE_PAD};
use self::grid::Grid;
use self::obstacle::build_obstacles;
use self::post::{cleanup_global, reattach};

/// An endpoint after binding resolution: where the path really starts or
/// ends, which way it must leave, and the shape to route around (if any).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedEndpoint {
    pub(crate) point: GlobalPoint,
    pub(crate) heading: Heading,
    pub(crate) shape_bounds: Option<Bounds>,
    pub(crate) arrowhead: bool,
}

/// Resolve both endpoints. Each endpoint's heading is classified against a
/// reference on the far side: the other endpoint's raw point, or its shape
/// center when the other endpoint is bound.
pub(crate) fn resolve_pair(
    start_desired: GlobalPoint,
    end_desired: GlobalPoint,
    start_binding: Option<&Binding>,
    end_binding: Option<&Binding>,
    start_arrowhead: bool,
    end_arrowhead: bool,
    registry: &dyn ShapeRegistry,
) -> (ResolvedEndpoint, ResolvedEndpoint) {
    let start_ref = reference_for(end_desired, end_binding, registry);
    let end_ref = reference_for(start_desired, start_binding, registry);
    let start = resolve_endpoint(start_desired, start_binding, start_ref, start_arrowhead, registry);
    let end = resolve_endpoint(end_desired, end_binding, end_ref, end_arrowhead, registry);
    (start, end)
}

fn reference_for(
    desired: GlobalPoint,
    binding: Option<&Binding>,
    registry: &dyn ShapeRegistry,
) -> GlobalPoint {
    binding
        .and_then(|b| registry.bounds(b.shape))
        .map(|b| GlobalPoint(b.center()))
        .unwrap_or(desired)
}

/// Resolve one endpoint against its optional binding.
///
/// Bound endpoints attach to the shape outline at the binding's fixed-point
/// ratio, on the side facing `other`. A binding whose shape the registry no
/// longer knows degrades to an unbound endpoint.
pub(crate) fn resolve_endpoint(
    desired: GlobalPoint,
    binding: Option<&Binding>,
    other: GlobalPoint,
    arrowhead: bool,
    registry: &dyn ShapeRegistry,
) -> ResolvedEndpoint {
    let Some(binding) = binding else {
        return unbound(desired, other, arrowhead);
    };
    let Some(bounds) = registry.bounds(binding.shape) else {
        warn!("binding references unknown shape {}; treating endpoint as unbound", binding.shape);
        return unbound(desired, other, arrowhead);
    };
    // Zero-area shapes still need a side to exit from.
    let bounds = if bounds.is_degenerate() {
        bounds.expand(POINT_SHAPE_PAD, POINT_SHAPE_PAD, POINT_SHAPE_PAD, POINT_SHAPE_PAD)
    } else {
        bounds
    };
    let kind = registry.kind(binding.shape).unwrap_or_default();
    let outline = ShapeOutline::for_kind(kind);
    let heading = outline.exit_heading(&bounds, other);

    match binding.mode {
        BindingMode::Inside => {
            let ratio = binding.fixed_point.clamp(DVec2::ZERO, DVec2::ONE);
            let point = GlobalPoint(bounds.min + ratio * (bounds.max - bounds.min));
            ResolvedEndpoint { point, heading, shape_bounds: Some(bounds), arrowhead }
        }
        BindingMode::Orbit => {
            let edge = outline.edge_attachment(&bounds, binding.fixed_point, heading);
            let point = GlobalPoint(edge.0 + heading.unit() * BINDING_GAP);
            ResolvedEndpoint { point, heading, shape_bounds: Some(bounds), arrowhead }
        }
        BindingMode::Skip => {
            // Same attachment as orbit; the shape just stops being an
            // obstacle.
            let edge = outline.edge_attachment(&bounds, binding.fixed_point, heading);
            let point = GlobalPoint(edge.0 + heading.unit() * BINDING_GAP);
            ResolvedEndpoint { point, heading, shape_bounds: None, arrowhead }
        }
    }
}

fn unbound(desired: GlobalPoint, other: GlobalPoint, arrowhead: bool) -> ResolvedEndpoint {
    ResolvedEndpoint {
        point: desired,
        heading: vector_to_heading(other - desired),
        shape_bounds: None,
        arrowhead,
    }
}

/// Route between two resolved endpoints and weld the result. Always returns
/// at least two points; when the grid search finds nothing the path degrades
/// to a heading-derived bend.
pub(crate) fn route_between(start: &ResolvedEndpoint, end: &ResolvedEndpoint) -> Vec<GlobalPoint> {
    let set = build_obstacles(start, end);
    let boxes = set.boxes();
    let mut grid =
        Grid::build(&boxes, set.start_dongle, start.heading, set.end_dongle, end.heading);
    debug!("routing {} -> {} over {} grid nodes", start.point, end.point, grid.nodes.len());
    let found = match (grid.node_at(set.start_dongle), grid.node_at(set.end_dongle)) {
        (Some(s), Some(e)) => find_path(&mut grid, s, e, start.heading, end.heading, &boxes),
        _ => None,
    };
    let mut path = match found {
        Some(p) => p,
        None => {
            warn!("no grid path between {} and {}; using fallback bend", start.point, end.point);
            fallback_path(start.point, start.heading, end.point, end.heading)
        }
    };
    reattach(&mut path, start.point, end.point);
    let mut path = cleanup_global(path);
    if path.len() < 2 {
        path = vec![start.point, end.point];
    }
    path
}

/// Deterministic 2-4 point path built straight from the headings, for when
/// the search comes up empty.
fn fallback_path(
    start: GlobalPoint,
    start_heading: Heading,
    end: GlobalPoint,
    end_heading: Heading,
) -> Vec<GlobalPoint> {
    let d = end - start;
    if d.x == 0.0 || d.y == 0.0 {
        return vec![start, end];
    }
    match (start_heading.is_horizontal(), end_heading.is_horizontal()) {
        (true, false) => vec![start, GlobalPoint::new(end.x(), start.y()), end],
        (false, true) => vec![start, GlobalPoint::new(start.x(), end.y()), end],
        (true, true) => {
            let mid_x = (start.x() + end.x()) / 2.0;
            vec![
                start,
                GlobalPoint::new(mid_x, start.y()),
                GlobalPoint::new(mid_x, end.y()),
                end,
            ]
        }
        (false, false) => {
            let mid_y = (start.y() + end.y()) / 2.0;
            vec![
                start,
                GlobalPoint::new(start.x(), mid_y),
                GlobalPoint::new(end.x(), mid_y),
                end,
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Scene, ShapeId, ShapeKind};

    fn gp(x: f64, y: f64) -> GlobalPoint {
        GlobalPoint::new(x, y)
    }

    fn tall_rect_scene(id: ShapeId) -> Scene {
        Scene::new().with_shape(id, ShapeKind::Rectangle, Bounds::new(100.0, 0.0, 160.0, 200.0))
    }

    // ==================== resolver tests ====================

    #[test]
    fn unbound_heading_prefers_horizontal() {
        let r = resolve_endpoint(gp(0.0, 0.0), None, gp(100.0, 100.0), false, &Scene::new());
        assert_eq!(r.heading, Heading::Right);
        assert_eq!(r.point, gp(0.0, 0.0));
        assert!(r.shape_bounds.is_none());
    }

    #[test]
    fn orbit_binding_attaches_outside_the_outline() {
        let id = ShapeId(1);
        let scene = tall_rect_scene(id);
        let binding = Binding::new(id, 0.5, 0.5);
        let r = resolve_endpoint(gp(130.0, 100.0), Some(&binding), gp(0.0, 100.0), true, &scene);
        assert_eq!(r.heading, Heading::Left);
        assert_eq!(r.point, gp(95.0, 100.0));
        assert_eq!(r.shape_bounds, Some(Bounds::new(100.0, 0.0, 160.0, 200.0)));
        assert!(r.arrowhead);
    }

    #[test]
    fn inside_binding_keeps_the_gapless_interior_point() {
        let id = ShapeId(2);
        let scene =
            Scene::new().with_shape(id, ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 100.0, 200.0));
        let binding = Binding::new(id, 0.25, 0.5).with_mode(BindingMode::Inside);
        let r = resolve_endpoint(gp(0.0, 0.0), Some(&binding), gp(300.0, 100.0), false, &scene);
        assert_eq!(r.heading, Heading::Right);
        assert_eq!(r.point, gp(25.0, 100.0));
        assert!(r.shape_bounds.is_some());
    }

    #[test]
    fn skip_binding_drops_the_obstacle() {
        let id = ShapeId(3);
        let scene = tall_rect_scene(id);
        let binding = Binding::new(id, 0.5, 0.5).with_mode(BindingMode::Skip);
        let r = resolve_endpoint(gp(130.0, 100.0), Some(&binding), gp(0.0, 100.0), false, &scene);
        assert_eq!(r.point, gp(95.0, 100.0));
        assert!(r.shape_bounds.is_none());
    }

    #[test]
    fn unknown_shape_falls_back_to_unbound() {
        let binding = Binding::new(ShapeId(9), 0.5, 0.5);
        let r = resolve_endpoint(gp(10.0, 20.0), Some(&binding), gp(200.0, 20.0), false, &Scene::new());
        assert_eq!(r.point, gp(10.0, 20.0));
        assert_eq!(r.heading, Heading::Right);
        assert!(r.shape_bounds.is_none());
    }

    #[test]
    fn zero_area_shape_gets_point_bounds() {
        let id = ShapeId(4);
        let scene =
            Scene::new().with_shape(id, ShapeKind::Rectangle, Bounds::new(50.0, 50.0, 50.0, 50.0));
        let binding = Binding::new(id, 0.5, 0.5);
        let r = resolve_endpoint(gp(50.0, 50.0), Some(&binding), gp(200.0, 50.0), false, &scene);
        assert_eq!(r.shape_bounds, Some(Bounds::new(49.0, 49.0, 51.0, 51.0)));
        assert_eq!(r.heading, Heading::Right);
        assert_eq!(r.point, gp(56.0, 50.0));
    }

    #[test]
    fn bound_reference_is_the_shape_center() {
        let id = ShapeId(5);
        let scene = tall_rect_scene(id);
        let binding = Binding::new(id, 0.5, 0.5);
        let (s, e) = resolve_pair(
            gp(0.0, 100.0),
            gp(130.0, 100.0),
            None,
            Some(&binding),
            false,
            true,
            &scene,
        );
        // The start classifies against the shape center (130, 100), dead
        // ahead to the right.
        assert_eq!(s.heading, Heading::Right);
        assert_eq!(e.heading, Heading::Left);
        assert_eq!(e.point, gp(95.0, 100.0));
    }

    // ==================== pipeline tests ====================

    #[test]
    fn straight_route_is_two_points() {
        let (s, e) =
            resolve_pair(gp(0.0, 100.0), gp(200.0, 100.0), None, None, false, true, &Scene::new());
        let path = route_between(&s, &e);
        assert_eq!(path, vec![gp(0.0, 100.0), gp(200.0, 100.0)]);
    }

    #[test]
    fn diagonal_route_turns_once() {
        let (s, e) =
            resolve_pair(gp(0.0, 0.0), gp(100.0, 100.0), None, None, false, true, &Scene::new());
        let path = route_between(&s, &e);
        assert_eq!(path, vec![gp(0.0, 0.0), gp(100.0, 0.0), gp(100.0, 100.0)]);
    }

    #[test]
    fn bound_route_stops_at_the_attachment() {
        let id = ShapeId(6);
        let scene = tall_rect_scene(id);
        let binding = Binding::new(id, 0.5, 0.5);
        let (s, e) = resolve_pair(
            gp(0.0, 100.0),
            gp(130.0, 100.0),
            None,
            Some(&binding),
            false,
            true,
            &scene,
        );
        let path = route_between(&s, &e);
        assert_eq!(path, vec![gp(0.0, 100.0), gp(95.0, 100.0)]);
    }

    #[test]
    fn identical_endpoints_stay_two_points() {
        let (s, e) =
            resolve_pair(gp(50.0, 50.0), gp(50.0, 50.0), None, None, false, true, &Scene::new());
        let path = route_between(&s, &e);
        assert_eq!(path, vec![gp(50.0, 50.0), gp(50.0, 50.0)]);
    }

    // ==================== fallback tests ====================

    #[test]
    fn fallback_direct_when_aligned() {
        let path = fallback_path(gp(0.0, 0.0), Heading::Right, gp(100.0, 0.0), Heading::Left);
        assert_eq!(path, vec![gp(0.0, 0.0), gp(100.0, 0.0)]);
    }

    #[test]
    fn fallback_l_bend_mixed_headings() {
        let path = fallback_path(gp(0.0, 0.0), Heading::Right, gp(100.0, 100.0), Heading::Up);
        assert_eq!(path, vec![gp(0.0, 0.0), gp(100.0, 0.0), gp(100.0, 100.0)]);

        let path = fallback_path(gp(0.0, 0.0), Heading::Down, gp(100.0, 100.0), Heading::Left);
        assert_eq!(path, vec![gp(0.0, 0.0), gp(0.0, 100.0), gp(100.0, 100.0)]);
    }

    #[test]
    fn fallback_s_bend_parallel_headings() {
        let path = fallback_path(gp(0.0, 0.0), Heading::Right, gp(100.0, 80.0), Heading::Left);
        assert_eq!(
            path,
            vec![gp(0.0, 0.0), gp(50.0, 0.0), gp(50.0, 80.0), gp(100.0, 80.0)]
        );

        let path = fallback_path(gp(0.0, 0.0), Heading::Down, gp(100.0, 80.0), Heading::Up);
        assert_eq!(
            path,
            vec![gp(0.0, 0.0), gp(0.0, 40.0), gp(100.0, 40.0), gp(100.0, 80.0)]
        );
    }
}
