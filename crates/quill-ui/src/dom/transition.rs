//! Animated view swaps
//!
//! A platform may offer a primitive that snapshots the old view, runs an
//! update, and animates to the new one. The router only needs to hand it the
//! update and learn whether the animation went through.

use futures_util::future::LocalBoxFuture;
use thiserror::Error;

/// Why a transition did not animate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("View transition skipped")]
    Skipped,

    #[error("View transition aborted: {0}")]
    Aborted(String),
}

/// View-transition capability
///
/// Implementations must drive `update` to completion even when they
/// reject, so the new view is always attached.
pub trait ViewTransitions {
    fn start(
        &self,
        update: LocalBoxFuture<'static, ()>,
    ) -> LocalBoxFuture<'static, Result<(), TransitionError>>;
}

/// Runs the update with no animation
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantTransitions;

impl ViewTransitions for InstantTransitions {
    fn start(
        &self,
        update: LocalBoxFuture<'static, ()>,
    ) -> LocalBoxFuture<'static, Result<(), TransitionError>> {
        Box::pin(async move {
            update.await;
            Ok(())
        })
    }
}
