use anyhow::Error;
use std::collections::BTreeMap;

/// Course name mapped to the grade value shown on the results page.
pub type GradeMap = BTreeMap<String, String>;

/// Outcome of loading the persisted snapshot from the previous run.
#[derive(Debug)]
pub enum Snapshot {
    /// No snapshot file exists yet (first run).
    Absent,
    /// A file exists but could not be read or parsed.
    Corrupt(Error),
    Present(GradeMap),
}
