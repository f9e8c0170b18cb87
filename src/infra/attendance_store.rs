use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    domain::attendance::AttendanceRecord, usecases::attendance_autosave::AttendanceStore,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AttendanceFile {
    class_id: String,
    records: Vec<AttendanceRecord>,
}

/// Persists a class's attendance grid as one JSON document.
///
/// A file belongs to exactly one class; loading or saving another class
/// through it is an error.
#[derive(Debug, Clone)]
pub struct JsonAttendanceStore {
    path: PathBuf,
}

impl JsonAttendanceStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, class_id: &str) -> Result<Vec<AttendanceRecord>> {
        Ok(self.read_file(class_id)?.records)
    }

    fn read_file(&self, class_id: &str) -> Result<AttendanceFile> {
        if !self.path.exists() {
            return Ok(AttendanceFile::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let file: AttendanceFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;

        if !file.class_id.is_empty() && file.class_id != class_id {
            bail!(
                "{} holds attendance for class {}, not {class_id}",
                self.path.display(),
                file.class_id
            );
        }

        Ok(file)
    }
}

impl AttendanceStore for JsonAttendanceStore {
    fn save(&mut self, class_id: &str, records: &[AttendanceRecord]) -> Result<()> {
        let mut merged = self.load(class_id)?;

        for record in records {
            match merged
                .iter_mut()
                .find(|saved| saved.student_id == record.student_id && saved.date == record.date)
            {
                Some(saved) => saved.mark = record.mark,
                None => merged.push(record.clone()),
            }
        }

        let file = AttendanceFile {
            class_id: class_id.to_owned(),
            records: merged,
        };
        let raw = serde_json::to_string_pretty(&file)?;

        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::attendance::AttendanceMark;

    fn record(student: &str, mark: AttendanceMark) -> AttendanceRecord {
        AttendanceRecord {
            student_id: student.to_owned(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
            mark,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonAttendanceStore::new(dir.path().join("roll.json"));

        assert!(store.load("class-1").expect("load").is_empty());
    }

    #[test]
    fn save_merges_over_existing_cells() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = JsonAttendanceStore::new(dir.path().join("roll.json"));

        store
            .save(
                "class-1",
                &[
                    record("s1", AttendanceMark::Present),
                    record("s2", AttendanceMark::Absent),
                ],
            )
            .expect("first save");
        store
            .save("class-1", &[record("s2", AttendanceMark::Excused)])
            .expect("second save");

        let saved = store.load("class-1").expect("load");
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].mark, AttendanceMark::Excused);
    }

    #[test]
    fn another_class_cannot_use_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("roll.json");
        let mut store = JsonAttendanceStore::new(&path);
        store
            .save("class-A", &[record("alice", AttendanceMark::Present)])
            .expect("class A saves");

        let err = store.load("class-B").expect_err("class B must not read class A");
        assert!(err.to_string().contains("class-A"));

        assert!(store
            .save("class-B", &[record("bob", AttendanceMark::Absent)])
            .is_err());

        let raw = fs::read_to_string(&path).expect("file readable");
        assert!(raw.contains("class-A"));
        assert!(!raw.contains("bob"));
        assert_eq!(store.load("class-A").expect("load").len(), 1);
    }
}
