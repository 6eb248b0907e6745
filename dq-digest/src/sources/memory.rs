//! In-memory loader for tests and dry runs.

use super::{Dataset, DatasetLoader};
use crate::core::DatasetDefinition;
use crate::prelude::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves datasets that were handed to it up front, keyed by dataset name.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    datasets: HashMap<String, Dataset>,
    loads: AtomicUsize,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dataset, served under its own name.
    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.insert(dataset.name().to_string(), dataset);
        self
    }

    /// Number of `load` calls so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetLoader for MemoryLoader {
    async fn load(&self, definition: &DatasetDefinition) -> Result<Dataset> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.datasets
            .get(&definition.name)
            .cloned()
            .ok_or_else(|| {
                DigestError::query_failed(&definition.name, "no such dataset in memory")
            })
    }

    fn description(&self) -> String {
        format!("in-memory ({} datasets)", self.datasets.len())
    }
}
