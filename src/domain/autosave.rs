use std::time::{Duration, Instant};

pub const DEFAULT_AUTOSAVE_IDLE: Duration = Duration::from_millis(2_500);

/// Idle-timer bookkeeping for debounced saves.
///
/// Each edit re-arms the deadline; a flush (automatic or manual) disarms it.
/// The dirty flag decides whether teardown owes one last flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveDebouncer {
    idle: Duration,
    deadline: Option<Instant>,
    dirty: bool,
}

impl Default for AutosaveDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_IDLE)
    }
}

impl AutosaveDebouncer {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            deadline: None,
            dirty: false,
        }
    }

    pub fn idle(&self) -> Duration {
        self.idle
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn touch(&mut self, now: Instant) {
        self.dirty = true;
        self.deadline = Some(now + self.idle);
    }

    pub fn due(&self, now: Instant) -> bool {
        self.dirty && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn flushed(&mut self) {
        self.dirty = false;
        self.deadline = None;
    }

    /// Keeps the data dirty and retries after another idle window.
    pub fn flush_failed(&mut self, now: Instant) {
        self.dirty = true;
        self.deadline = Some(now + self.idle);
    }

    /// Cancels the timer; returns true when unsaved edits still need a final flush.
    pub fn teardown(&mut self) -> bool {
        self.deadline = None;
        std::mem::replace(&mut self.dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_debouncer_is_never_due() {
        let debouncer = AutosaveDebouncer::default();

        assert!(!debouncer.is_dirty());
        assert_eq!(debouncer.idle(), Duration::from_millis(2_500));
    }

    #[test]
    fn becomes_due_after_idle_window() {
        let start = Instant::now();
        let mut debouncer = AutosaveDebouncer::new(Duration::from_millis(100));
        debouncer.touch(start);

        assert!(!debouncer.due(start + Duration::from_millis(99)));
        assert!(debouncer.due(start + Duration::from_millis(100)));
    }

    #[test]
    fn new_edit_rearms_deadline() {
        let start = Instant::now();
        let mut debouncer = AutosaveDebouncer::new(Duration::from_millis(100));
        debouncer.touch(start);
        debouncer.touch(start + Duration::from_millis(80));

        assert!(!debouncer.due(start + Duration::from_millis(150)));
        assert!(debouncer.due(start + Duration::from_millis(180)));
    }

    #[test]
    fn flush_cancels_timer() {
        let start = Instant::now();
        let mut debouncer = AutosaveDebouncer::new(Duration::from_millis(100));
        debouncer.touch(start);
        debouncer.flushed();

        assert!(!debouncer.due(start + Duration::from_secs(1)));
        assert!(!debouncer.is_dirty());
    }

    #[test]
    fn teardown_requests_final_flush_only_when_dirty() {
        let mut debouncer = AutosaveDebouncer::default();
        assert!(!debouncer.teardown());

        debouncer.touch(Instant::now());
        assert!(debouncer.teardown());
        assert!(!debouncer.is_dirty());
        assert!(!debouncer.teardown());
    }

    #[test]
    fn failed_flush_stays_dirty() {
        let start = Instant::now();
        let mut debouncer = AutosaveDebouncer::new(Duration::from_millis(100));
        debouncer.touch(start);
        debouncer.flush_failed(start + Duration::from_millis(100));

        assert!(debouncer.is_dirty());
        assert!(debouncer.due(start + Duration::from_millis(200)));
    }
}
