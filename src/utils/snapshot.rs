use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::info;
use serde_json::to_string_pretty;
use crate::models::{GradeMap, Snapshot};

const DEFAULT_SNAPSHOT_FILE: &str = "grades.json";

// Snapshot location, overridable through GRADES_FILE for runs outside the working directory.
pub fn snapshot_path() -> PathBuf {
    env::var("GRADES_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_FILE))
}

// Loads the snapshot written by the previous run. A missing file is a normal
// first-run condition; anything else that keeps the file from being parsed is
// reported as corrupt rather than folded into "absent".
pub fn load_snapshot(path: &Path) -> Snapshot {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Snapshot::Absent,
        Err(e) => return Snapshot::Corrupt(e.into()),
    };

    match serde_json::from_str(&contents) {
        Ok(grades) => Snapshot::Present(grades),
        Err(e) => Snapshot::Corrupt(e.into()),
    }
}

pub fn store_snapshot(path: &Path, grades: &GradeMap) -> Result<()> {
    fs::write(path, to_string_pretty(grades)?)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))
}

// Compares the freshly extracted grades against the previous snapshot and keeps
// the entries whose course did not exist before. Grade changes on courses that
// were already present are intentionally not detected.
//
// The fresh data always replaces the snapshot on disk, even when the old one was
// absent or unreadable, so a corrupt file heals itself on the next run.
pub fn diff_grades(path: &Path, current: &GradeMap) -> Result<Option<GradeMap>> {
    let previous = load_snapshot(path);

    store_snapshot(path, current)?;

    match previous {
        Snapshot::Absent => {
            info!("No snapshot at {}, storing current grades as baseline", path.display());
            Ok(None)
        }
        Snapshot::Corrupt(e) => {
            Err(e.context(format!("Snapshot at {} exists but could not be used", path.display())))
        }
        Snapshot::Present(old) => Ok(Some(
            current
                .iter()
                .filter(|(course, _)| !old.contains_key(*course))
                .map(|(course, grade)| (course.clone(), grade.clone()))
                .collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn grade_map(entries: &[(&str, &str)]) -> GradeMap {
        entries
            .iter()
            .map(|(course, grade)| (course.to_string(), grade.to_string()))
            .collect()
    }

    #[test]
    fn snapshot_round_trips_through_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        let grades = grade_map(&[("CourseA", "1.0"), ("CourseB", "2.0")]);

        store_snapshot(&path, &grades).unwrap();

        match load_snapshot(&path) {
            Snapshot::Present(loaded) => assert_eq!(loaded, grades),
            other => panic!("expected stored snapshot to load, got {other:?}"),
        }
    }

    #[test]
    fn first_run_yields_no_differences_but_stores_the_baseline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        let current = grade_map(&[("CourseA", "1.0")]);

        let diffs = diff_grades(&path, &current).unwrap();

        assert!(diffs.is_none());
        match load_snapshot(&path) {
            Snapshot::Present(stored) => assert_eq!(stored, current),
            other => panic!("expected baseline to be written, got {other:?}"),
        }
    }

    #[test]
    fn new_courses_show_up_in_the_differences() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        store_snapshot(&path, &grade_map(&[("CourseA", "1.0")])).unwrap();
        let current = grade_map(&[("CourseA", "1.0"), ("CourseB", "2.0")]);

        let diffs = diff_grades(&path, &current).unwrap();

        assert_eq!(diffs, Some(grade_map(&[("CourseB", "2.0")])));
    }

    #[test]
    fn unchanged_grades_yield_an_empty_difference_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        let current = grade_map(&[("CourseA", "1.0"), ("CourseB", "2.0")]);
        store_snapshot(&path, &current).unwrap();

        let diffs = diff_grades(&path, &current).unwrap();

        assert_eq!(diffs, Some(GradeMap::new()));
    }

    #[test]
    fn grade_change_on_an_existing_course_is_not_a_difference() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        store_snapshot(&path, &grade_map(&[("CourseA", "NA")])).unwrap();
        let current = grade_map(&[("CourseA", "1.0")]);

        let diffs = diff_grades(&path, &current).unwrap();

        assert_eq!(diffs, Some(GradeMap::new()));
    }

    #[test]
    fn corrupt_snapshot_is_reported_and_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        fs::write(&path, "not json at all {{").unwrap();
        let current = grade_map(&[("CourseA", "1.0")]);

        let err = diff_grades(&path, &current).unwrap_err();

        assert!(err.to_string().contains("could not be used"), "unexpected error: {err}");
        match load_snapshot(&path) {
            Snapshot::Present(stored) => assert_eq!(stored, current),
            other => panic!("expected snapshot to be replaced, got {other:?}"),
        }
    }
}
