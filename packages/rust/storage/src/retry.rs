//! Single-retry wrapper for final table writes.
//!
//! A spreadsheet program holding the output open makes the write fail with
//! [`Locked`](wikiloot_shared::WikilootError::Locked). The user gets one
//! chance to close it; any second failure is returned as-is.

use std::path::Path;

use tracing::warn;

use wikiloot_shared::Result;

/// Asks the user to release a locked destination.
pub trait RetryPrompt {
    /// Block until the user acknowledges that `path` has been closed.
    fn acknowledge_locked(&self, path: &Path);
}

/// Run `write`, retrying exactly once when the destination is locked.
pub fn write_with_retry<P, F>(path: &Path, prompt: &P, mut write: F) -> Result<()>
where
    P: RetryPrompt + ?Sized,
    F: FnMut() -> Result<()>,
{
    match write() {
        Err(err) if err.is_locked() => {
            warn!(path = %path.display(), "destination locked, waiting for user");
            prompt.acknowledge_locked(path);
            write()
        }
        other => other,
    }
}

/// Prompt that never waits; the retry happens immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl RetryPrompt for NoPrompt {
    fn acknowledge_locked(&self, _path: &Path) {}
}
