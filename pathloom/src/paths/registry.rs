//! Per-scope edge id → path table.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{ControlPath, DataPath};
use crate::model::EdgeId;

/// Lazily populated map from edge id to its path object.
///
/// The first query for an id materializes the path; later queries return the
/// same `Arc`, so every consumer and producer of one edge shares one slot.
/// Control and data ids live in separate tables: the discipline of an id is
/// fixed by the port that owns it, and a well-formed document never uses one
/// id in both roles.
#[derive(Default)]
pub struct PathRegistry {
    data: Mutex<FxHashMap<EdgeId, Arc<DataPath>>>,
    control: Mutex<FxHashMap<EdgeId, Arc<ControlPath>>>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_path(&self, id: EdgeId) -> Arc<DataPath> {
        Arc::clone(
            self.data
                .lock()
                .entry(id)
                .or_insert_with(|| Arc::new(DataPath::new(id))),
        )
    }

    pub fn control_path(&self, id: EdgeId) -> Arc<ControlPath> {
        Arc::clone(
            self.control
                .lock()
                .entry(id)
                .or_insert_with(|| Arc::new(ControlPath::new(id))),
        )
    }

    pub fn data_len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn control_len(&self) -> usize {
        self.control.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_yields_same_path() {
        let reg = PathRegistry::new();
        let a = reg.data_path(EdgeId(1));
        let b = reg.data_path(EdgeId(1));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(reg.data_len(), 1);

        let c = reg.control_path(EdgeId(1));
        let d = reg.control_path(EdgeId(1));
        assert!(Arc::ptr_eq(&c, &d));
        assert_eq!(reg.control_len(), 1);
    }

    #[test]
    fn distinct_ids_yield_distinct_paths() {
        let reg = PathRegistry::new();
        let a = reg.data_path(EdgeId(1));
        let b = reg.data_path(EdgeId(2));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(reg.data_len(), 2);
    }
}
