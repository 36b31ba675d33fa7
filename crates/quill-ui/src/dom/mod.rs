//! In-memory platform document
//!
//! Nodes, events, a window with location and history, and the optional
//! view-transition primitive. Views and the router only talk to the
//! platform through this module.

pub mod event;
pub mod html;
pub mod node;
pub mod transition;
pub mod window;

pub use event::{Event, Listener, ListenerId};
pub use node::{Namespace, Node, WeakNode};
pub use transition::{InstantTransitions, TransitionError, ViewTransitions};
pub use window::{Location, Window};
