//! # Slint Pending Connection
//!
//! The "pending connection" interaction of a node editor: the link a user drags
//! out of a connector before it is committed. This crate owns the gesture's
//! state machine, target hit testing, snapping, and hover/preview feedback, and
//! leaves drawing, layout and graph storage to the application.
//!
//! ## Features
//!
//! - **Prioritized Hit Testing** - Connectors first, then node containers, then anything
//! - **Snapping** - Lock the dragged end onto the exact anchor of the connector under the pointer
//! - **Hover Exclusivity** - At most one element flagged as hovered, always released on completion
//! - **Preview** - Expose the hovered candidate's context data (e.g. for a ghost node)
//! - **Reentrancy Safe** - Stray or late events after completion or teardown are no-ops
//!
//! ## Core Types
//!
//! - [`NodeEditor`] - Element tree, pointer position, event channel and side-table flags
//! - [`ConnectorDrag`] - Turns pointer input on a connector into lifecycle events
//! - [`PendingConnection`] - Listens to the events and keeps the observable session state
//! - [`find_potential_connector`] - The prioritized hit test on its own
//!
//! ## Quick Start
//!
//! ```ignore
//! let editor = Rc::new(NodeEditor::<MyNodeData>::new());
//! let pending = PendingConnection::new(PendingConnectionConfig::new().with_snapping(true));
//! pending.attach(&editor);
//!
//! let drag = ConnectorDrag::new(editor.clone());
//! window.on_pointer_moved(drag.pointer_moved_callback());
//! window.on_compute_pending_path(pending.pending_path_callback());
//!
//! pending.on_connection_completed(|source, target| {
//!     // validate and create the link in your model
//! });
//! ```

pub mod config;
pub mod connector;
pub mod editor;
pub mod error;
pub mod events;
pub mod geometry;
pub mod observable;
pub mod path;
pub mod pending;
pub mod tree;

pub use config::PendingConnectionConfig;
pub use connector::ConnectorDrag;
pub use editor::NodeEditor;
pub use error::{ConfigError, TreeError};
pub use events::{EventChannel, PendingConnectionEvent, PendingConnectionEventArgs, SubscriptionId};
pub use geometry::{Point, Rect};
pub use hit_test::{element_under_point, elements_under_point, find_potential_connector};
pub use observable::Property;
pub use path::{generate_bezier_path, LinkCurve};
pub use pending::PendingConnection;
pub use tree::{ElementId, ElementKind, ElementTree};
