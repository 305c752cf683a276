//! Orthogonal ("elbow") connector routing for diagram tooling.
//!
//! Connectors are axis-aligned polylines between two endpoints, either of
//! which may be bound to a shape. [`route`] is the single entry point: it
//! takes the current [`Connector`], a [`ConnectorUpdate`] describing an
//! edit, and a [`ShapeRegistry`] resolving shape geometry, and returns the
//! complete replacement geometry as a [`RoutedConnector`].
//!
//! Paths are found on a sparse grid built from the padded endpoint shapes,
//! with an A* search that charges heavily for turns, so routes prefer few
//! bends over short detours. Segments the user has dragged into place can
//! be pinned as [`FixedSegment`]s; later edits re-route around the pins
//! instead of discarding the manual layout.
//!
//! ```
//! use orthru::{Anchor, Connector, ConnectorUpdate, LocalPoint, Scene};
//!
//! let connector = Connector::new(
//!     Anchor::new(40.0, 25.0),
//!     vec![LocalPoint::new(0.0, 0.0), LocalPoint::new(100.0, 0.0)],
//! );
//! // Drag the free end down to (100, 100): one bend appears.
//! let update = ConnectorUpdate::points(vec![
//!     LocalPoint::new(0.0, 0.0),
//!     LocalPoint::new(100.0, 100.0),
//! ]);
//! let routed = orthru::route(&connector, update, &Scene::new())?;
//! assert_eq!(routed.to_string(), "(0, 0) -> (100, 0) -> (100, 100)");
//! # Ok::<(), orthru::RouteError>(())
//! ```
//!
//! Coordinates are `f64` in screen space, y growing downward. A connector
//! stores its points relative to its own anchor, and every result keeps
//! the first point on the local origin.
//!
//! Debug logging is compiled out unless the `tracing` feature is enabled.

mod connector;
mod editor;
mod errors;
mod heading;
mod log;
mod route;
mod shapes;
mod types;

pub use connector::{
    Binding, BindingMode, Connector, ConnectorUpdate, FixedSegment, is_valid_elbow_path,
};
pub use editor::{RoutedConnector, route};
pub use errors::RouteError;
pub use heading::Heading;
pub use shapes::{Scene, ShapeId, ShapeKind, ShapeRegistry};
pub use types::{Anchor, Bounds, GlobalPoint, LocalPoint, NumericError};
