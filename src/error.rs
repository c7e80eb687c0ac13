use thiserror::Error;

/// Failure modes of the sync subsystem. None of them is fatal; each one leaves
/// both panes in a state that the next scroll or render re-synchronizes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error("no anchor for line {line}")]
    AnchorNotFound { line: usize },

    #[error("could not find \"{text}\" in the source; try selecting distinct text")]
    OccurrenceNotFound { text: String },

    #[error("scroll target for line {line} of {total_lines} is not a finite offset")]
    InvalidScrollTarget { line: usize, total_lines: usize },

    #[error("scroll animation stuck for {elapsed_ms}ms, forcing idle")]
    AnimationWatchdogTimeout { elapsed_ms: u128 },
}

impl SyncError {
    /// Whether the error should be shown to the user rather than only logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, SyncError::OccurrenceNotFound { .. })
    }
}
