//! Wake progress observer
//!
//! Abstraction for surfacing wake progress to the caller's UI stream.
//! Callers that don't care simply pass `None`.

use mcplink_core::Integration;

/// Hooks invoked while a cold server is being woken
///
/// Both hooks are best-effort and must not block: the connection flow never
/// waits on them and never fails because of them.
///
/// **Object Safety**: takes `&str` rather than `impl Into<String>` so the
/// trait can be used behind a reference.
pub trait WakeObserver: Send + Sync {
    /// A cold server was detected and a wake is about to be requested
    fn wake_in_progress(&self, integration: &Integration);

    /// The wake request failed; `message` is user-facing and
    /// support-actionable, distinct from the raw adapter error
    fn wake_failed(&self, integration: &Integration, message: &str);
}
