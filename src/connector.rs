//! Connector data model: the element under edit.
//!
//! A connector owns its point list and fixed-segment list; the shapes it
//! attaches to are referenced only by id and resolved through the registry
//! at routing time.

use glam::DVec2;

use crate::errors::RouteError;
use crate::shapes::ShapeId;
use crate::types::{Anchor, GlobalPoint, LocalPoint, NumericError};

/// How a resolved attachment point relates to the shape outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BindingMode {
    /// Attachment point is the fixed-point ratio location itself, clamped
    /// into the shape bounds.
    Inside,
    /// Attachment point orbits the outline on the exit side.
    #[default]
    Orbit,
    /// Attachment as `Orbit`, but the shape contributes no obstacle padding.
    Skip,
}

/// One endpoint's attachment to a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Binding {
    /// Shape looked up by id at resolution time (weak relation).
    pub shape: ShapeId,
    /// Fixed point over the shape bounds, each axis in `[0, 1]`.
    pub fixed_point: DVec2,
    pub mode: BindingMode,
}

impl Binding {
    pub fn new(shape: ShapeId, rx: f64, ry: f64) -> Binding {
        Binding {
            shape,
            fixed_point: DVec2::new(rx, ry),
            mode: BindingMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: BindingMode) -> Binding {
        self.mode = mode;
        self
    }
}

/// A user-locked segment, excluded from automatic re-routing.
///
/// `index` is 1-based: segment `i` joins `points[i-1]..points[i]`. Valid
/// indices are strictly interior (`1 < index < points.len() - 1`) because the
/// first and last segment must stay free to adapt to binding changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedSegment {
    pub index: usize,
    pub start: LocalPoint,
    pub end: LocalPoint,
}

impl FixedSegment {
    pub fn new(index: usize, start: LocalPoint, end: LocalPoint) -> FixedSegment {
        FixedSegment { index, start, end }
    }

    /// Whether start and end differ in at most one axis (within `tolerance`).
    pub fn is_orthogonal(&self, tolerance: f64) -> bool {
        let d = self.end - self.start;
        d.x.abs() <= tolerance || d.y.abs() <= tolerance
    }

    /// Whether the segment runs horizontally (by dominant axis).
    pub fn is_horizontal(&self) -> bool {
        let d = self.end - self.start;
        d.x.abs() >= d.y.abs()
    }
}

/// The element under edit.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    /// Global position of the first point; local points are relative to it.
    pub anchor: Anchor,
    /// At least two points; the first is the local origin once normalized.
    pub points: Vec<LocalPoint>,
    pub start_binding: Option<Binding>,
    pub end_binding: Option<Binding>,
    /// Locked segments in ascending index order, no duplicates. Empty means
    /// the whole path is free.
    pub fixed_segments: Vec<FixedSegment>,
    pub start_arrowhead: bool,
    pub end_arrowhead: bool,
}

impl Connector {
    pub fn new(anchor: Anchor, points: Vec<LocalPoint>) -> Connector {
        Connector {
            anchor,
            points,
            start_binding: None,
            end_binding: None,
            fixed_segments: Vec::new(),
            start_arrowhead: false,
            end_arrowhead: true,
        }
    }

    pub fn with_start_binding(mut self, binding: Binding) -> Connector {
        self.start_binding = Some(binding);
        self
    }

    pub fn with_end_binding(mut self, binding: Binding) -> Connector {
        self.end_binding = Some(binding);
        self
    }

    pub fn with_arrowheads(mut self, start: bool, end: bool) -> Connector {
        self.start_arrowhead = start;
        self.end_arrowhead = end;
        self
    }

    /// Convert a local point to global space.
    #[inline]
    pub fn to_global(&self, p: LocalPoint) -> GlobalPoint {
        self.anchor.to_global(p)
    }

    /// Convert a global point to this connector's local space.
    #[inline]
    pub fn to_local(&self, p: GlobalPoint) -> LocalPoint {
        self.anchor.to_local(p)
    }

    /// The point list in global space.
    pub fn global_points(&self) -> Vec<GlobalPoint> {
        self.points.iter().map(|&p| self.to_global(p)).collect()
    }

    pub fn start_global(&self) -> GlobalPoint {
        self.to_global(*self.points.first().unwrap_or(&LocalPoint::ZERO))
    }

    pub fn end_global(&self) -> GlobalPoint {
        self.to_global(*self.points.last().unwrap_or(&LocalPoint::ZERO))
    }

    /// Structural validation: enough points, all of them finite.
    ///
    /// Fixed-segment problems are deliberately not errors; the editor drops
    /// offending segments instead (they degrade, the call succeeds).
    pub fn validate(&self) -> Result<(), RouteError> {
        if self.points.len() < 2 {
            return Err(RouteError::TooFewPoints { count: self.points.len() });
        }
        for p in &self.points {
            point_finite(p.0, "connector points")?;
        }
        point_finite(self.anchor.0, "connector anchor")?;
        Ok(())
    }
}

pub(crate) fn point_finite(v: DVec2, context: &'static str) -> Result<(), RouteError> {
    if v.x.is_nan() || v.y.is_nan() {
        Err(RouteError::non_finite(context, NumericError::NaN))
    } else if !v.is_finite() {
        Err(RouteError::non_finite(context, NumericError::Infinite))
    } else {
        Ok(())
    }
}

/// A requested change to a connector's geometry. `None` fields are "leave
/// unchanged"; the editor classifies the combination into a scenario.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectorUpdate {
    pub points: Option<Vec<LocalPoint>>,
    pub fixed_segments: Option<Vec<FixedSegment>>,
}

impl ConnectorUpdate {
    /// A renormalize-only request.
    pub fn none() -> ConnectorUpdate {
        ConnectorUpdate::default()
    }

    pub fn points(points: Vec<LocalPoint>) -> ConnectorUpdate {
        ConnectorUpdate { points: Some(points), fixed_segments: None }
    }

    pub fn fixed_segments(segments: Vec<FixedSegment>) -> ConnectorUpdate {
        ConnectorUpdate { points: None, fixed_segments: Some(segments) }
    }

    pub fn with_points(mut self, points: Vec<LocalPoint>) -> ConnectorUpdate {
        self.points = Some(points);
        self
    }

    pub fn with_fixed_segments(mut self, segments: Vec<FixedSegment>) -> ConnectorUpdate {
        self.fixed_segments = Some(segments);
        self
    }
}

/// Check that every consecutive point pair is axis-aligned within
/// `tolerance` (at least one axis delta is ~0). Needs two or more points.
pub fn is_valid_elbow_path(points: &[LocalPoint], tolerance: f64) -> bool {
    if points.len() < 2 {
        return false;
    }
    points.windows(2).all(|w| {
        let d = w[1] - w[0];
        d.x.abs() <= tolerance || d.y.abs() <= tolerance
    })
}
