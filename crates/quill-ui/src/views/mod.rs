//! Route views and the components they share
//!
//! Each view takes the [`AppContext`](crate::app::AppContext) and the
//! route context and returns a freshly built node tree. Views never touch
//! the router's container; the router attaches what they return.

pub mod components;
pub mod home;
pub mod icons;
pub mod new_note;
pub mod note_detail;

pub use home::home;
pub use new_note::new_note;
pub use note_detail::{not_found, note_detail, DELETE_CONFIRMATION};
