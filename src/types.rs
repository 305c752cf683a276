//! Space-tagged geometry primitives for orthru (zero-cost newtypes).
//!
//! Design goals:
//! - No raw `f64` pairs in domain logic
//! - Global (canvas) and local (connector-relative) points cannot be mixed
//! - Conversions only via Anchor

use std::fmt;
use std::ops::{Add, Sub};

use glam::DVec2;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
        }
    }
}

impl std::error::Error for NumericError {}

fn check_finite(v: DVec2) -> Result<DVec2, NumericError> {
    if v.x.is_nan() || v.y.is_nan() {
        Err(NumericError::NaN)
    } else if !v.is_finite() {
        Err(NumericError::Infinite)
    } else {
        Ok(v)
    }
}

/// Canvas-absolute point. Shape bounds, obstacles, and pathfinding all live
/// in this space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[repr(transparent)]
pub struct GlobalPoint(pub DVec2);

impl GlobalPoint {
    pub const ZERO: GlobalPoint = GlobalPoint(DVec2::ZERO);

    /// Create a GlobalPoint (const-friendly, unchecked).
    /// Use `try_new` for values crossing the API boundary.
    #[inline]
    pub const fn new(x: f64, y: f64) -> GlobalPoint {
        GlobalPoint(DVec2::new(x, y))
    }

    /// Create a GlobalPoint with validation (rejects NaN/infinite)
    #[inline]
    pub fn try_new(x: f64, y: f64) -> Result<GlobalPoint, NumericError> {
        check_finite(DVec2::new(x, y)).map(GlobalPoint)
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.0.y
    }

    /// Midpoint between two points
    #[inline]
    pub fn midpoint(self, other: GlobalPoint) -> GlobalPoint {
        GlobalPoint(self.0.midpoint(other.0))
    }

    /// Manhattan (taxicab) distance to another point
    #[inline]
    pub fn manhattan(self, other: GlobalPoint) -> f64 {
        (self.0.x - other.0.x).abs() + (self.0.y - other.0.y).abs()
    }

    /// Check if both coordinates are finite (not NaN or infinite)
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Clamp both coordinates into `[-limit, limit]`
    #[inline]
    pub fn clamp_abs(self, limit: f64) -> GlobalPoint {
        GlobalPoint(self.0.clamp(DVec2::splat(-limit), DVec2::splat(limit)))
    }
}

/// Subtract two points to get an offset vector
impl Sub<GlobalPoint> for GlobalPoint {
    type Output = DVec2;
    fn sub(self, rhs: GlobalPoint) -> DVec2 {
        self.0 - rhs.0
    }
}

/// Add an offset to a point to get a new point
impl Add<DVec2> for GlobalPoint {
    type Output = GlobalPoint;
    fn add(self, rhs: DVec2) -> GlobalPoint {
        GlobalPoint(self.0 + rhs)
    }
}

impl fmt::Display for GlobalPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0.x, self.0.y)
    }
}

/// Point relative to a connector's anchor. The first point of a normalized
/// connector is always the local origin.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[repr(transparent)]
pub struct LocalPoint(pub DVec2);

impl LocalPoint {
    pub const ZERO: LocalPoint = LocalPoint(DVec2::ZERO);

    /// Create a LocalPoint (const-friendly, unchecked).
    /// Use `try_new` for values crossing the API boundary.
    #[inline]
    pub const fn new(x: f64, y: f64) -> LocalPoint {
        LocalPoint(DVec2::new(x, y))
    }

    /// Create a LocalPoint with validation (rejects NaN/infinite)
    #[inline]
    pub fn try_new(x: f64, y: f64) -> Result<LocalPoint, NumericError> {
        check_finite(DVec2::new(x, y)).map(LocalPoint)
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.0.y
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// True if this point is the local origin (within `tolerance`)
    #[inline]
    pub fn is_origin(self, tolerance: f64) -> bool {
        self.0.x.abs() <= tolerance && self.0.y.abs() <= tolerance
    }
}

impl Sub<LocalPoint> for LocalPoint {
    type Output = DVec2;
    fn sub(self, rhs: LocalPoint) -> DVec2 {
        self.0 - rhs.0
    }
}

impl Add<DVec2> for LocalPoint {
    type Output = LocalPoint;
    fn add(self, rhs: DVec2) -> LocalPoint {
        LocalPoint(self.0 + rhs)
    }
}

impl fmt::Display for LocalPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0.x, self.0.y)
    }
}

/// A connector's global origin; converts between the two point spaces.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Anchor(pub DVec2);

impl Anchor {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Anchor {
        Anchor(DVec2::new(x, y))
    }

    /// Convert a local point to global space.
    #[inline]
    pub fn to_global(self, p: LocalPoint) -> GlobalPoint {
        GlobalPoint(self.0 + p.0)
    }

    /// Convert a global point to local space.
    #[inline]
    pub fn to_local(self, p: GlobalPoint) -> LocalPoint {
        LocalPoint(p.0 - self.0)
    }
}

/// Axis-aligned box in global space.
///
/// Invariant: `min.x <= max.x` and `min.y <= max.y`, maintained by every
/// constructor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// Create from edge coordinates, normalizing a reversed pair.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bounds {
        Bounds {
            min: DVec2::new(min_x.min(max_x), min_y.min(max_y)),
            max: DVec2::new(min_x.max(max_x), min_y.max(max_y)),
        }
    }

    /// Create from a center point and full width/height.
    pub fn from_center_size(center: DVec2, width: f64, height: f64) -> Bounds {
        let half = DVec2::new(width.abs() / 2.0, height.abs() / 2.0);
        Bounds { min: center - half, max: center + half }
    }

    /// A box of `pad` on every side of a point.
    pub fn from_point(p: GlobalPoint, pad: f64) -> Bounds {
        Bounds { min: p.0 - DVec2::splat(pad), max: p.0 + DVec2::splat(pad) }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> DVec2 {
        self.min.midpoint(self.max)
    }

    /// Zero-area check (a point or a line)
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Strict interior test; points on the edge are outside. Pathfinding
    /// relies on this so grid nodes sitting on obstacle edges stay usable.
    pub fn contains(&self, p: GlobalPoint) -> bool {
        p.0.x > self.min.x && p.0.x < self.max.x && p.0.y > self.min.y && p.0.y < self.max.y
    }

    /// Closed overlap test (shared edges count as overlapping)
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Smallest box covering both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Grow by per-side amounts (negative shrinks). The result is
    /// re-normalized so the min/max invariant survives over-shrinking.
    pub fn expand(&self, top: f64, right: f64, bottom: f64, left: f64) -> Bounds {
        Bounds::new(
            self.min.x - left,
            self.min.y - top,
            self.max.x + right,
            self.max.y + bottom,
        )
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.min.x, self.min.y, self.max.x, self.max.y)
    }
}
