//! Trait definitions for wwpoints.
//!
//! The host platform sits behind [`PollSink`]: pollers hand it one
//! [`PollResult`] per completed cycle and expect nothing back.

use crate::models::{AccountId, PollResult};

/// Receiver of poll results for the host's entity layer.
///
/// Implementors decide presentation: which values stay visible, which
/// become unavailable, which are marked stale.
pub trait PollSink: Send + Sync + 'static {
    /// Publishes the result of one completed cycle for an account.
    ///
    /// Called at most once per cycle, in cycle completion order per account.
    fn publish(
        &self,
        account: &AccountId,
        result: PollResult,
    ) -> impl std::future::Future<Output = ()> + Send;
}
