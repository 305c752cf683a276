//! Shape kinds and outline geometry for binding resolution.
//!
//! Each bindable shape kind answers two questions:
//! - Which side (heading) faces a given point
//! - Where on its boundary a connector attaches for a given heading
//!
//! The shapes themselves live in the host document; this module only sees
//! their bounds and kind through [`ShapeRegistry`].

use std::collections::BTreeMap;

use enum_dispatch::enum_dispatch;
use glam::DVec2;

use crate::heading::{Heading, diamond_sector_heading, sector_heading};
use crate::types::{Bounds, GlobalPoint};

/// Identifier the host document assigns to a bindable shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub u64);

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometric family of a bindable shape.
///
/// Only diamonds change how headings resolve; ellipses additionally refine
/// where on the boundary the attachment lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Diamond,
    Ellipse,
}

/// Source of shape geometry, implemented by the host document.
///
/// Lookups are by value and may fail: bindings hold ids, not references, and
/// a stale id is not an error (the endpoint is treated as unbound).
pub trait ShapeRegistry {
    fn bounds(&self, id: ShapeId) -> Option<Bounds>;
    fn kind(&self, id: ShapeId) -> Option<ShapeKind>;
}

// ============================================================================
// Outline queries
// ============================================================================

/// Boundary geometry of one shape kind.
#[enum_dispatch]
pub trait Outline {
    /// Which side of the shape faces `other`.
    fn exit_heading(&self, bounds: &Bounds, other: GlobalPoint) -> Heading;

    /// Boundary point on the `heading` side. `ratio` is the binding's fixed
    /// point in `[0,1]^2` over the bounds; only its coordinate perpendicular
    /// to the heading survives (the heading picks the side).
    fn edge_attachment(&self, bounds: &Bounds, ratio: DVec2, heading: Heading) -> GlobalPoint;
}

/// Plain boxes: sector cones, attachment slides along the facing edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct RectangleOutline;

impl Outline for RectangleOutline {
    fn exit_heading(&self, bounds: &Bounds, other: GlobalPoint) -> Heading {
        sector_heading(bounds, other)
    }

    fn edge_attachment(&self, bounds: &Bounds, ratio: DVec2, heading: Heading) -> GlobalPoint {
        rect_edge_point(bounds, ratio, heading)
    }
}

/// Diamonds: edge-line sectors, attachment snaps to the facing vertex (the
/// only spots where an orthogonal segment meets the outline head-on).
#[derive(Clone, Copy, Debug, Default)]
pub struct DiamondOutline;

impl Outline for DiamondOutline {
    fn exit_heading(&self, bounds: &Bounds, other: GlobalPoint) -> Heading {
        diamond_sector_heading(bounds, other)
    }

    fn edge_attachment(&self, bounds: &Bounds, _ratio: DVec2, heading: Heading) -> GlobalPoint {
        let c = bounds.center();
        match heading {
            Heading::Up => GlobalPoint::new(c.x, bounds.min.y),
            Heading::Right => GlobalPoint::new(bounds.max.x, c.y),
            Heading::Down => GlobalPoint::new(c.x, bounds.max.y),
            Heading::Left => GlobalPoint::new(bounds.min.x, c.y),
        }
    }
}

/// Ellipses: headings as for boxes, attachment projected onto the curve.
#[derive(Clone, Copy, Debug, Default)]
pub struct EllipseOutline;

impl Outline for EllipseOutline {
    fn exit_heading(&self, bounds: &Bounds, other: GlobalPoint) -> Heading {
        sector_heading(bounds, other)
    }

    fn edge_attachment(&self, bounds: &Bounds, ratio: DVec2, heading: Heading) -> GlobalPoint {
        let edge = rect_edge_point(bounds, ratio, heading);
        let center = bounds.center();
        let rx = bounds.width() / 2.0;
        let ry = bounds.height() / 2.0;
        if rx == 0.0 || ry == 0.0 {
            return edge;
        }
        // Ray from the center through the box-edge point, intersected with
        // the ellipse: scale the offset so (dx/rx)^2 + (dy/ry)^2 = 1. The
        // edge point is never the center here, so the ray is well-defined.
        let d = edge.0 - center;
        let t = 1.0 / ((d.x / rx).powi(2) + (d.y / ry).powi(2)).sqrt();
        GlobalPoint(center + d * t)
    }
}

fn rect_edge_point(bounds: &Bounds, ratio: DVec2, heading: Heading) -> GlobalPoint {
    let r = ratio.clamp(DVec2::ZERO, DVec2::ONE);
    let at = bounds.min + r * (bounds.max - bounds.min);
    match heading {
        Heading::Up => GlobalPoint::new(at.x, bounds.min.y),
        Heading::Right => GlobalPoint::new(bounds.max.x, at.y),
        Heading::Down => GlobalPoint::new(at.x, bounds.max.y),
        Heading::Left => GlobalPoint::new(bounds.min.x, at.y),
    }
}

/// Outline dispatcher over the shape kinds.
#[enum_dispatch(Outline)]
#[derive(Clone, Copy, Debug)]
pub enum ShapeOutline {
    Rectangle(RectangleOutline),
    Diamond(DiamondOutline),
    Ellipse(EllipseOutline),
}

impl ShapeOutline {
    pub fn for_kind(kind: ShapeKind) -> ShapeOutline {
        match kind {
            ShapeKind::Rectangle => RectangleOutline.into(),
            ShapeKind::Diamond => DiamondOutline.into(),
            ShapeKind::Ellipse => EllipseOutline.into(),
        }
    }
}

// ============================================================================
// Scene registry
// ============================================================================

/// A minimal owned [`ShapeRegistry`] for hosts without their own store.
///
/// Backed by a `BTreeMap` so iteration (and therefore everything downstream)
/// is deterministic.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    shapes: BTreeMap<ShapeId, (ShapeKind, Bounds)>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }

    /// Insert or replace a shape. Returns `self` for chained setup.
    pub fn with_shape(mut self, id: ShapeId, kind: ShapeKind, bounds: Bounds) -> Scene {
        self.shapes.insert(id, (kind, bounds));
        self
    }

    pub fn insert(&mut self, id: ShapeId, kind: ShapeKind, bounds: Bounds) {
        self.shapes.insert(id, (kind, bounds));
    }

    pub fn remove(&mut self, id: ShapeId) -> bool {
        self.shapes.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl ShapeRegistry for Scene {
    fn bounds(&self, id: ShapeId) -> Option<Bounds> {
        self.shapes.get(&id).map(|(_, b)| *b)
    }

    fn kind(&self, id: ShapeId) -> Option<ShapeKind> {
        self.shapes.get(&id).map(|(k, _)| *k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== attachment points ====================

    #[test]
    fn rectangle_attachment_slides_along_edge() {
        let b = Bounds::new(0.0, 0.0, 100.0, 50.0);
        let o = RectangleOutline;
        assert_eq!(
            o.edge_attachment(&b, DVec2::new(0.25, 0.0), Heading::Up),
            GlobalPoint::new(25.0, 0.0)
        );
        assert_eq!(
            o.edge_attachment(&b, DVec2::new(0.0, 0.8), Heading::Right),
            GlobalPoint::new(100.0, 40.0)
        );
        // Out-of-range ratios clamp onto the edge.
        assert_eq!(
            o.edge_attachment(&b, DVec2::new(3.0, -1.0), Heading::Down),
            GlobalPoint::new(100.0, 50.0)
        );
    }

    #[test]
    fn diamond_attachment_is_the_facing_vertex() {
        let b = Bounds::new(0.0, 0.0, 100.0, 50.0);
        let o = DiamondOutline;
        assert_eq!(
            o.edge_attachment(&b, DVec2::new(0.9, 0.9), Heading::Up),
            GlobalPoint::new(50.0, 0.0)
        );
        assert_eq!(
            o.edge_attachment(&b, DVec2::new(0.1, 0.1), Heading::Right),
            GlobalPoint::new(100.0, 25.0)
        );
    }

    #[test]
    fn ellipse_attachment_lands_on_the_curve() {
        let b = Bounds::new(0.0, 0.0, 200.0, 100.0);
        let o = EllipseOutline;
        // Axis-aligned ratio: the box edge point is already on the curve.
        assert_eq!(
            o.edge_attachment(&b, DVec2::new(1.0, 0.5), Heading::Right),
            GlobalPoint::new(200.0, 50.0)
        );
        // Off-axis: projected inward onto the ellipse.
        let p = o.edge_attachment(&b, DVec2::new(1.0, 0.25), Heading::Right);
        let dx = (p.x() - 100.0) / 100.0;
        let dy = (p.y() - 50.0) / 50.0;
        assert!((dx * dx + dy * dy - 1.0).abs() < 1e-9);
        assert!(p.x() < 200.0 && p.y() < 50.0);
    }

    #[test]
    fn outline_dispatches_by_kind() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let other = GlobalPoint::new(20.0, 5.0);
        for kind in [ShapeKind::Rectangle, ShapeKind::Diamond, ShapeKind::Ellipse] {
            let outline = ShapeOutline::for_kind(kind);
            assert_eq!(outline.exit_heading(&b, other), Heading::Right);
        }
    }

    // ==================== scene registry ====================

    #[test]
    fn scene_lookup_and_removal() {
        let mut scene = Scene::new()
            .with_shape(ShapeId(1), ShapeKind::Rectangle, Bounds::new(0.0, 0.0, 10.0, 10.0))
            .with_shape(ShapeId(2), ShapeKind::Diamond, Bounds::new(20.0, 0.0, 30.0, 10.0));

        assert_eq!(scene.kind(ShapeId(2)), Some(ShapeKind::Diamond));
        assert_eq!(
            scene.bounds(ShapeId(1)),
            Some(Bounds::new(0.0, 0.0, 10.0, 10.0))
        );
        assert_eq!(scene.bounds(ShapeId(3)), None);

        assert!(scene.remove(ShapeId(1)));
        assert!(!scene.remove(ShapeId(1)));
        assert_eq!(scene.len(), 1);
    }
}
