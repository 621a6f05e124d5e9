//! Cancelable delayed work owned by a game session.
//!
//! Time is pushed in by the host (`advance(delta)`), the same way UI effects are
//! stepped by frame time. Cancelling is dropping the task.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskKind {
    /// Move the reveal highlight to the next path cell.
    RevealStep,
    /// Wipe the player's input after a mistake.
    ClearInput,
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    kind: TaskKind,
    elapsed: Duration,
    due: Duration,
}

impl ScheduledTask {
    #[must_use]
    pub(crate) fn new(kind: TaskKind, due: Duration) -> Self {
        Self {
            kind,
            elapsed: Duration::ZERO,
            due,
        }
    }

    #[must_use]
    pub(crate) fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Advance the task clock. Returns the time left over past the deadline if
    /// the task became due.
    pub(crate) fn advance(&mut self, delta: Duration) -> Option<Duration> {
        self.elapsed = self.elapsed.saturating_add(delta);
        self.elapsed.checked_sub(self.due)
    }

    #[must_use]
    pub(crate) fn remaining(&self) -> Duration {
        self.due.saturating_sub(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_at_deadline_with_overshoot() {
        let mut task = ScheduledTask::new(TaskKind::RevealStep, Duration::from_millis(500));
        assert_eq!(task.advance(Duration::from_millis(200)), None);
        assert_eq!(task.remaining(), Duration::from_millis(300));
        assert_eq!(
            task.advance(Duration::from_millis(450)),
            Some(Duration::from_millis(150))
        );
    }

    #[test]
    fn exact_deadline_leaves_no_overshoot() {
        let mut task = ScheduledTask::new(TaskKind::ClearInput, Duration::from_millis(800));
        assert_eq!(task.advance(Duration::from_millis(800)), Some(Duration::ZERO));
        assert_eq!(task.kind(), TaskKind::ClearInput);
    }
}
