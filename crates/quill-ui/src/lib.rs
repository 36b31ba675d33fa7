//! Quill UI Library
//!
//! This crate provides the interface side of Quill: a JSX-style element
//! builder over an in-memory document, a client-side router with
//! latest-navigation-wins rendering, toast notifications and the three
//! note views.
//!
//! # Architecture
//!
//! - **Single-threaded**: nodes, views and the router are `Rc` based and
//!   their tasks run on a `tokio::task::LocalSet`.
//! - **Builder over a document**: views call [`h`] and get real nodes back;
//!   there is no virtual tree or diffing.
//!
//! # Quick Start
//!
//! ```text
//! let window = Window::with_url(DEFAULT_ORIGIN, "/")?;
//! let app = App::mount(&window, &config, Rc::new(store), &hub).await?;
//! println!("{}", app.outlet_html());
//! ```
//!
//! # Modules
//!
//! - `builder`: Element builder (`h`, props, children, components)
//! - `dom`: Nodes, events, window, history and view transitions
//! - `router`: Path patterns, routes and the router itself
//! - `toast`: Transient notifications
//! - `views`: Home, new-note and note-detail views
//! - `app`: Session wiring

pub mod app;
pub mod builder;
pub mod dom;
pub mod router;
pub mod toast;
pub mod views;

pub use app::{App, AppContext};
pub use builder::{fragment, h, Child, Component, ComponentProps, Props, Tag};
pub use dom::window::DEFAULT_ORIGIN;
pub use dom::{Event, Node, Window};
pub use router::{NavigateOptions, Navigator, Route, Router, RouterError, RouterOptions};
pub use toast::{ToastKind, Toasts};
