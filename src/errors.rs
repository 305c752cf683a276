//! Error types with rich diagnostics using miette
//!
//! Routing is deliberately hard to fail: search dead-ends, malformed
//! fixed-segment requests, and degenerate shapes all degrade to valid
//! output (see the editor and pipeline modules). The errors here cover the
//! only unrecoverable situations: input that is not a connector at all.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::NumericError;

// ============================================================================
// Routing Errors
// ============================================================================

/// Errors that reject a routing request outright
#[derive(Error, Diagnostic, Debug)]
pub enum RouteError {
    #[error("connector has {count} point(s)")]
    #[diagnostic(
        code(orthru::route::too_few_points),
        help("a connector needs at least a start and an end point")
    )]
    TooFewPoints { count: usize },

    #[error("non-finite coordinate in {context}")]
    #[diagnostic(code(orthru::route::non_finite))]
    NonFinite {
        context: &'static str,
        #[source]
        source: NumericError,
    },
}

impl RouteError {
    /// Wrap a numeric validation failure with the input it came from.
    pub(crate) fn non_finite(context: &'static str, source: NumericError) -> RouteError {
        RouteError::NonFinite { context, source }
    }
}
