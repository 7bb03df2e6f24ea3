//! # Clash Detection
//!
//! Finds members of different (or the same) models whose occupied space
//! overlaps. Detection itself is a pure function of a [`ClashRequest`]
//! snapshot ([`detect_clashes`]); [`ClashWorker`] runs it on a background
//! thread with a single cancellable in-flight slot.
//!
//! A run produces a fresh record list. [`ClashReport`] holds the list the user
//! annotates; a completed run replaces it wholesale and annotations are not
//! carried over.
//!
//! [`ClashRequest`]: crate::snapshot::ClashRequest

pub mod detector;
pub mod worker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};
use crate::geometry::Point3;

pub use detector::{detect_clashes, detect_clashes_cancellable};
pub use worker::{ClashEvent, ClashWorker};

/// Reference to an element in a specific model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub model: String,
    pub name: String,
    pub display_name: String,
}

impl ElementRef {
    pub fn new(model: impl Into<String>, name: impl Into<String>) -> Self {
        let model = model.into();
        let name = name.into();
        ElementRef {
            display_name: format!("{} ({})", name, model),
            model,
            name,
        }
    }
}

/// One geometric conflict between two or more elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClashRecord {
    /// Sequential id, assigned in discovery order starting at 1
    pub id: u32,

    /// Participating elements (at least two)
    pub elements: Vec<ElementRef>,

    /// Location of the conflict
    pub pos: Point3,

    /// Closest approach between the members' axes (m)
    pub distance: f64,

    /// User flag: accepted / not a real problem
    #[serde(default)]
    pub ignore: bool,

    /// User note
    #[serde(default)]
    pub remark: String,
}

impl ClashRecord {
    /// Order-independent identity of the participating elements
    pub fn pair_key(&self) -> Vec<(String, String)> {
        let mut key: Vec<_> = self
            .elements
            .iter()
            .map(|e| (e.model.clone(), e.name.clone()))
            .collect();
        key.sort();
        key
    }

    /// Display names joined for tables
    pub fn element_names(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.display_name.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// The clash list the user works with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClashReport {
    /// Run that produced the records, `None` before the first run
    pub run_id: Option<Uuid>,

    pub generated_at: Option<DateTime<Utc>>,

    pub records: Vec<ClashRecord>,
}

impl ClashReport {
    /// Report for a finished run.
    pub fn new(run_id: Uuid, records: Vec<ClashRecord>) -> Self {
        ClashReport {
            run_id: Some(run_id),
            generated_at: Some(Utc::now()),
            records,
        }
    }

    /// Apply a worker event.
    ///
    /// A completed run replaces every record. A failed run leaves the report
    /// untouched and hands the failure back for the user to be notified.
    pub fn apply(&mut self, event: ClashEvent) -> EngineResult<()> {
        match event {
            ClashEvent::Completed { run_id, records } => {
                *self = ClashReport::new(run_id, records);
                Ok(())
            }
            ClashEvent::Failed { error, .. } => Err(error),
        }
    }

    pub fn get(&self, id: u32) -> Option<&ClashRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: u32) -> EngineResult<&mut ClashRecord> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| {
                EngineError::invalid_input("id", id.to_string(), "No clash record with this id")
            })
    }

    /// Mark a record as ignored (or not).
    pub fn set_ignore(&mut self, id: u32, ignore: bool) -> EngineResult<()> {
        self.get_mut(id)?.ignore = ignore;
        Ok(())
    }

    /// Replace a record's remark.
    pub fn set_remark(&mut self, id: u32, remark: impl Into<String>) -> EngineResult<()> {
        self.get_mut(id)?.remark = remark.into();
        Ok(())
    }

    /// Records the user has not ignored
    pub fn active(&self) -> impl Iterator<Item = &ClashRecord> {
        self.records.iter().filter(|r| !r.ignore)
    }

    pub fn ignored_count(&self) -> usize {
        self.records.iter().filter(|r| r.ignore).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, a: &str, b: &str) -> ClashRecord {
        ClashRecord {
            id,
            elements: vec![ElementRef::new("Steel", a), ElementRef::new("Pipes", b)],
            pos: Point3::default(),
            distance: 0.0,
            ignore: false,
            remark: String::new(),
        }
    }

    #[test]
    fn test_annotations_mutate_in_place() {
        let records = vec![record(1, "B1", "P1"), record(2, "B2", "P1")];
        let mut report = ClashReport::new(Uuid::new_v4(), records);
        report.set_ignore(2, true).unwrap();
        report.set_remark(1, "reroute P1 above").unwrap();

        assert_eq!(report.ignored_count(), 1);
        assert_eq!(report.active().count(), 1);
        assert_eq!(report.get(1).unwrap().remark, "reroute P1 above");
        assert!(report.set_ignore(9, true).is_err());
    }

    #[test]
    fn test_completed_run_replaces_everything() {
        let mut report = ClashReport::new(Uuid::new_v4(), vec![record(1, "B1", "P1")]);
        report.set_remark(1, "checked").unwrap();

        let run_id = Uuid::new_v4();
        report
            .apply(ClashEvent::Completed {
                run_id,
                records: vec![record(1, "B1", "P1")],
            })
            .unwrap();

        assert_eq!(report.run_id, Some(run_id));
        assert_eq!(report.get(1).unwrap().remark, "");
    }

    #[test]
    fn test_failed_run_keeps_prior_records() {
        let mut report = ClashReport::new(Uuid::new_v4(), vec![record(1, "B1", "P1")]);
        let before = report.clone();
        let result = report.apply(ClashEvent::Failed {
            run_id: Uuid::new_v4(),
            error: EngineError::detector_failed("disk full"),
        });
        assert!(result.is_err());
        assert_eq!(report, before);
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        let ab = record(1, "B1", "P1");
        let mut ba = ab.clone();
        ba.elements.reverse();
        assert_eq!(ab.pair_key(), ba.pair_key());
        assert_eq!(ab.element_names(), "B1 (Steel) / P1 (Pipes)");
    }
}
