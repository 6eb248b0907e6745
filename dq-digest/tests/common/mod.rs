//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use dq_digest::core::{SuiteStore, Validator};
use dq_digest::notify::Notifier;
use dq_digest::pipeline::Pipeline;
use dq_digest::prelude::Result;
use dq_digest::report::ReportBuilder;
use dq_digest::sources::{Dataset, MemoryLoader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// One sales row; every field is optional so tests can plant nulls.
#[derive(Debug, Clone)]
pub struct SalesRow {
    pub region: Option<&'static str>,
    pub country: Option<&'static str>,
    pub sales_channel: Option<&'static str>,
    pub order_priority: Option<&'static str>,
    pub order_id: Option<&'static str>,
    pub units_sold: Option<i64>,
    pub unit_price: Option<f64>,
    pub total_revenue: Option<f64>,
    pub total_cost: Option<f64>,
}

impl SalesRow {
    pub fn valid() -> Self {
        Self {
            region: Some("Europe"),
            country: Some("Norway"),
            sales_channel: Some("offline"),
            order_priority: Some("H"),
            order_id: Some("686800706"),
            units_sold: Some(8446),
            unit_price: Some(437.20),
            total_revenue: Some(3692591.20),
            total_cost: Some(2224085.18),
        }
    }
}

pub fn sales_dataset(rows: &[SalesRow]) -> Dataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Region", DataType::Utf8, true),
        Field::new("Country", DataType::Utf8, true),
        Field::new("Sales_Channel", DataType::Utf8, true),
        Field::new("Order_Priority", DataType::Utf8, true),
        Field::new("Order_ID", DataType::Utf8, true),
        Field::new("Units_Sold", DataType::Int64, true),
        Field::new("Unit_Price", DataType::Float64, true),
        Field::new("Total_Revenue", DataType::Float64, true),
        Field::new("Total_Cost", DataType::Float64, true),
    ]));
    let strings = |f: fn(&SalesRow) -> Option<&'static str>| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let floats = |f: fn(&SalesRow) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            strings(|r| r.region),
            strings(|r| r.country),
            strings(|r| r.sales_channel),
            strings(|r| r.order_priority),
            strings(|r| r.order_id),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.units_sold).collect::<Vec<_>>(),
            )),
            floats(|r| r.unit_price),
            floats(|r| r.total_revenue),
            floats(|r| r.total_cost),
        ],
    )
    .unwrap();
    Dataset::new("sales", schema, vec![batch])
}

/// Customers with the given ids; the other columns are filled in.
pub fn customers_dataset(ids: &[Option<&str>]) -> Dataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Index", DataType::Int64, true),
        Field::new("Customer_Id", DataType::Utf8, true),
        Field::new("First_Name", DataType::Utf8, true),
        Field::new("Last_Name", DataType::Utf8, true),
        Field::new("Subscription_Date", DataType::Date32, true),
    ]));
    let n = ids.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from((1..=n as i64).collect::<Vec<_>>())),
            Arc::new(StringArray::from(ids.to_vec())),
            Arc::new(StringArray::from(vec!["Sheryl"; n])),
            Arc::new(StringArray::from(vec!["Baxter"; n])),
            Arc::new(Date32Array::from(vec![18017; n])),
        ],
    )
    .unwrap();
    Dataset::new("customers", schema, vec![batch])
}

/// Records every path it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<PathBuf>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<PathBuf> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, path: &Path) -> Result<()> {
        self.sent.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// A pipeline over in-memory data, writing into `dir`.
pub struct Harness {
    pub dir: TempDir,
    pub loader: Arc<MemoryLoader>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(loader: MemoryLoader) -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            loader: Arc::new(loader),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn context_dir(&self) -> PathBuf {
        self.dir.path().join("gx")
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.path().join("combined_report.pdf")
    }

    pub fn pipeline(&self) -> Pipeline {
        self.pipeline_writing_to(self.report_path())
    }

    pub fn pipeline_writing_to(&self, report_path: PathBuf) -> Pipeline {
        Pipeline::new(
            self.loader.clone(),
            Validator::new(SuiteStore::new(self.context_dir())),
            ReportBuilder::new(report_path),
            self.notifier.clone(),
        )
    }
}
