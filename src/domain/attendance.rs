use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceMark {
    Present,
    Absent,
    Excused,
}

impl AttendanceMark {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "present" | "p" => Some(Self::Present),
            "absent" | "a" => Some(Self::Absent),
            "excused" | "e" => Some(Self::Excused),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub date: NaiveDate,
    pub mark: AttendanceMark,
}

/// Attendance grid for one class, tracking which cells changed since the last save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceRoll {
    class_id: String,
    marks: BTreeMap<(String, NaiveDate), AttendanceMark>,
    pending: BTreeMap<(String, NaiveDate), AttendanceMark>,
}

impl AttendanceRoll {
    pub fn new(class_id: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            ..Self::default()
        }
    }

    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    /// Seeds the grid from saved records without marking anything dirty.
    pub fn load(&mut self, records: Vec<AttendanceRecord>) {
        self.pending.clear();
        self.marks = records
            .into_iter()
            .map(|record| ((record.student_id, record.date), record.mark))
            .collect();
    }

    /// Records an edit; returns false when the cell already had that mark.
    pub fn mark(&mut self, student_id: &str, date: NaiveDate, mark: AttendanceMark) -> bool {
        if self.mark_of(student_id, date) == Some(mark) {
            return false;
        }

        let key = (student_id.to_owned(), date);
        self.marks.insert(key.clone(), mark);
        self.pending.insert(key, mark);
        true
    }

    pub fn mark_of(&self, student_id: &str, date: NaiveDate) -> Option<AttendanceMark> {
        self.marks.get(&(student_id.to_owned(), date)).copied()
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drains the unsaved edits for a flush.
    pub fn take_pending(&mut self) -> Vec<AttendanceRecord> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|((student_id, date), mark)| AttendanceRecord {
                student_id,
                date,
                mark,
            })
            .collect()
    }

    /// Puts edits back after a failed flush; newer edits to the same cell win.
    pub fn restore_pending(&mut self, records: Vec<AttendanceRecord>) {
        for record in records {
            self.pending
                .entry((record.student_id, record.date))
                .or_insert(record.mark);
        }
    }

    pub fn present_count(&self, date: NaiveDate) -> usize {
        self.marks
            .iter()
            .filter(|((_, day), mark)| *day == date && **mark == AttendanceMark::Present)
            .count()
    }
}
