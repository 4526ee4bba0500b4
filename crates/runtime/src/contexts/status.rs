//! Status returned by context handlers.

/// Outcome of driving a context for one call.
///
/// `Running` is a return value, not a suspension: the runtime keeps the
/// context in its slot and calls `update` again on the next think.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
pub enum Status {
    /// Nothing was attempted.
    #[default]
    None,
    /// Still in progress; the context stays in its slot.
    Running,
    /// Finished successfully; the context was ended and its slot cleared.
    Completed,
    /// Rejected or failed; the context was ended and its slot cleared.
    Failed,
    /// Ended early because another context replaced it.
    Interrupted,
}

impl Status {
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    #[inline]
    pub fn is_completed(self) -> bool {
        matches!(self, Status::Completed)
    }

    #[inline]
    pub fn is_failed(self) -> bool {
        matches!(self, Status::Failed)
    }

    /// Terminal results that end a context.
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            Status::Completed | Status::Failed | Status::Interrupted
        )
    }

    /// A power that is running or just completed used up the agent's turn;
    /// movement is skipped.
    #[inline]
    pub fn consumes_tick(self) -> bool {
        matches!(self, Status::Running | Status::Completed)
    }
}
