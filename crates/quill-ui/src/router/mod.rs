//! Client-side router
//!
//! Maps the window's path to a registered view and keeps the router's
//! container showing that view.
//!
//! ## Matching
//!
//! Routes are tried in registration order and the first full match wins.
//! A pattern matches when it has as many segments as the path, every
//! static segment is equal, and every `:name` segment binds whatever text
//! is at its position. With no match the first route renders with empty
//! parameters.
//!
//! ## Usage
//!
//! ```ignore
//! let router = Router::mount(&window, &outlet, vec![
//!     Route::new("/", home),
//!     Route::new("/notes/:noteId", note_detail),
//! ], RouterOptions::default()).await?;
//!
//! router.navigate("/notes/42", NavigateOptions::transition());
//! ```

mod error;
mod navigator;
mod pattern;
mod route;

pub use error::{RouterError, RouterResult};
pub use navigator::{NavigateOptions, Navigator, Router, RouterOptions, RouterState, LINK_ATTR};
pub use pattern::{Params, RoutePattern, Segment, PARAM_SIGIL};
pub use route::{resolve, Route, RouteContext, RouteMatch, View, ViewFuture};
