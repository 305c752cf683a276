//! Routing constants.
//!
//! Tuned around typical diagram scales (shape extents in the tens to
//! hundreds of units). Changing `BASE_PADDING` or `BINDING_GAP` shifts the
//! derived head clearance, so the pinned values in the tests below must move
//! with them.

/// Clearance kept on the non-exit sides of a bound shape's obstacle box.
pub(crate) const BASE_PADDING: f64 = 40.0;

/// Gap between a shape outline and an attachment point orbiting it.
pub(crate) const BINDING_GAP: f64 = 5.0;

/// Padding around each attachment point when the two obstacle boxes overlap
/// and the shape-sized boxes are abandoned.
pub(crate) const OVERLAP_PADDING: f64 = 4.0 * BINDING_GAP;

/// Half-extent substituted for a zero-area shape so it still produces a
/// usable box.
pub(crate) const POINT_SHAPE_PAD: f64 = 1.0;

/// Segments shorter than this are merged into a neighbor during cleanup.
pub(crate) const DEDUP_THRESHOLD: f64 = 1.0;

/// Maximum coordinate magnitude; anything beyond gets clamped.
pub(crate) const MAX_POS: f64 = 1e6;

/// How far apart two coordinates may drift while still counting as the same
/// axis value (orthogonality checks, collinearity runs).
pub(crate) const ORTHO_TOLERANCE: f64 = 0.01;

/// Exit-side clearance: the one obstacle side that must stay short so the
/// segment leaving a shape does not balloon to the full padding.
///
/// Resolves to 10 units with an arrowhead present and 30 without.
#[inline]
pub(crate) fn head_padding(arrowhead: bool) -> f64 {
    BASE_PADDING - BINDING_GAP * if arrowhead { 6.0 } else { 2.0 }
}
