//! Debounced autosave for a class attendance grid.
//!
//! Edits land in an explicit [`AttendanceRoll`] owned by the worker. A
//! background task waits for the grid to go idle and then flushes the pending
//! cells through an [`AttendanceStore`]. Manual saves flush immediately;
//! closing the worker stops the task and flushes once more if anything is
//! still unsaved.

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tokio::{runtime::Runtime, sync::mpsc, task::JoinHandle};

use crate::domain::{
    attendance::{AttendanceMark, AttendanceRecord, AttendanceRoll},
    autosave::AutosaveDebouncer,
};

const AUTOSAVE_FLUSHED: &str = "ATTENDANCE_AUTOSAVE_FLUSHED";
const AUTOSAVE_FLUSH_FAILED: &str = "ATTENDANCE_AUTOSAVE_FLUSH_FAILED";
const AUTOSAVE_FINAL_FLUSH_FAILED: &str = "ATTENDANCE_AUTOSAVE_FINAL_FLUSH_FAILED";

pub trait AttendanceStore: Send + 'static {
    fn save(&mut self, class_id: &str, records: &[AttendanceRecord]) -> Result<()>;
}

#[derive(Debug)]
struct Shared<S> {
    roll: AttendanceRoll,
    debouncer: AutosaveDebouncer,
    store: S,
}

impl<S: AttendanceStore> Shared<S> {
    /// Returns Ok(true) when something was written.
    fn flush(&mut self) -> Result<bool> {
        if !self.debouncer.is_dirty() || !self.roll.is_dirty() {
            self.debouncer.flushed();
            return Ok(false);
        }

        let pending = self.roll.take_pending();
        match self.store.save(self.roll.class_id(), &pending) {
            Ok(()) => {
                self.debouncer.flushed();
                tracing::debug!(
                    code = AUTOSAVE_FLUSHED,
                    class_id = self.roll.class_id(),
                    cells = pending.len(),
                    "attendance flushed"
                );
                Ok(true)
            }
            Err(error) => {
                self.roll.restore_pending(pending);
                self.debouncer.flush_failed(Instant::now());
                Err(error)
            }
        }
    }
}

pub struct AttendanceAutosave<S: AttendanceStore> {
    shared: Arc<Mutex<Shared<S>>>,
    edit_tx: Option<mpsc::UnboundedSender<()>>,
    task: Option<JoinHandle<()>>,
}

impl<S: AttendanceStore> AttendanceAutosave<S> {
    pub fn start(runtime: &Runtime, roll: AttendanceRoll, store: S, idle: Duration) -> Self {
        let shared = Arc::new(Mutex::new(Shared {
            roll,
            debouncer: AutosaveDebouncer::new(idle),
            store,
        }));
        let (edit_tx, edit_rx) = mpsc::unbounded_channel();
        let task = runtime.spawn(run_autosave(Arc::clone(&shared), edit_rx));

        Self {
            shared,
            edit_tx: Some(edit_tx),
            task: Some(task),
        }
    }

    /// Applies an edit and re-arms the idle timer if the cell changed.
    pub fn mark(&self, student_id: &str, date: NaiveDate, mark: AttendanceMark) -> Result<bool> {
        let changed = {
            let mut shared = self.lock()?;
            let changed = shared.roll.mark(student_id, date, mark);
            if changed {
                shared.debouncer.touch(Instant::now());
            }
            changed
        };

        if changed {
            if let Some(edit_tx) = &self.edit_tx {
                let _ = edit_tx.send(());
            }
        }

        Ok(changed)
    }

    pub fn present_count(&self, date: NaiveDate) -> usize {
        self.lock()
            .map(|shared| shared.roll.present_count(date))
            .unwrap_or(0)
    }

    pub fn is_dirty(&self) -> bool {
        self.lock()
            .map(|shared| shared.debouncer.is_dirty())
            .unwrap_or(false)
    }

    /// Manual save: flushes now and cancels the pending idle timer.
    pub fn flush_now(&self) -> Result<bool> {
        self.lock()?.flush()
    }

    /// Stops the timer task; flushes a final time when edits are unsaved.
    pub fn close(mut self) -> Result<bool> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<bool> {
        self.edit_tx.take();
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let mut shared = self.lock()?;
        if !shared.debouncer.teardown() {
            return Ok(false);
        }

        // teardown cleared the flag; re-mark so flush sees the unsaved cells
        shared.debouncer.touch(Instant::now());
        shared.flush()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Shared<S>>> {
        self.shared
            .lock()
            .map_err(|_| anyhow!("attendance autosave state is poisoned"))
    }
}

impl<S: AttendanceStore> Drop for AttendanceAutosave<S> {
    fn drop(&mut self) {
        if let Err(error) = self.shutdown() {
            tracing::error!(
                code = AUTOSAVE_FINAL_FLUSH_FAILED,
                error = ?error,
                "final attendance flush failed"
            );
        }
    }
}

async fn run_autosave<S: AttendanceStore>(
    shared: Arc<Mutex<Shared<S>>>,
    mut edit_rx: mpsc::UnboundedReceiver<()>,
) {
    let Ok(idle) = shared.lock().map(|state| state.debouncer.idle()) else {
        return;
    };

    'armed: loop {
        if edit_rx.recv().await.is_none() {
            return;
        }

        loop {
            match tokio::time::timeout(idle, edit_rx.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_elapsed) => {
                    let outcome = match shared.lock() {
                        // a manual save may already have disarmed the timer
                        Ok(mut state) if state.debouncer.due(Instant::now()) => state.flush(),
                        Ok(_) => continue 'armed,
                        Err(_) => return,
                    };

                    match outcome {
                        Ok(_) => continue 'armed,
                        Err(error) => {
                            tracing::warn!(
                                code = AUTOSAVE_FLUSH_FAILED,
                                error = ?error,
                                "attendance autosave failed, retrying after idle window"
                            );
                        }
                    }
                }
            }
        }
    }
}
