//! Dataset loaders.
//!
//! A loader turns a [`DatasetDefinition`] into an in-memory [`Dataset`] of
//! Arrow record batches that the validator can register with DataFusion.

use crate::core::DatasetDefinition;
use crate::prelude::*;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use std::fmt::Debug;
use std::sync::Arc;

mod convert;
mod memory;
mod postgres;

pub use convert::{arrow_type_for, text_rows_to_batch, TextColumn};
pub use memory::MemoryLoader;
pub use postgres::PostgresLoader;

/// A named table of typed columns, loaded once per run.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self {
            name: name.into(),
            schema,
            batches,
        }
    }

    /// Wraps a single batch.
    pub fn from_batch(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self::new(name, batch.schema(), vec![batch])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Registers the dataset with `ctx` as an in-memory table.
    pub fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        let provider = MemTable::try_new(self.schema.clone(), vec![self.batches.clone()])?;
        ctx.register_table(table_name, Arc::new(provider))?;
        Ok(())
    }
}

/// Loads datasets from wherever they live.
///
/// # Examples
///
/// ```rust,ignore
/// use dq_digest::core::DatasetDefinition;
/// use dq_digest::sources::{DatasetLoader, PostgresLoader};
///
/// # async fn example(loader: PostgresLoader) -> dq_digest::prelude::Result<()> {
/// let sales = loader.load(&DatasetDefinition::sales()).await?;
/// println!("{} rows", sales.num_rows());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DatasetLoader: Debug + Send + Sync {
    /// Loads one dataset.
    ///
    /// Connectivity problems are [`ErrorKind::ConnectionFailed`]; problems with
    /// the statement or its results are [`ErrorKind::QueryFailed`].
    async fn load(&self, definition: &DatasetDefinition) -> Result<Dataset>;

    /// Returns a human-readable description of this loader.
    fn description(&self) -> String;
}
