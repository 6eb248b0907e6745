//! End-to-end runs of the digest pipeline over in-memory datasets.

mod common;

use common::{customers_dataset, sales_dataset, Harness, SalesRow};
use dq_digest::core::SuiteStore;
use dq_digest::normalizer::EvaluationRecord;
use dq_digest::pipeline::{DatasetStatus, NotificationStatus, SkipReason};
use dq_digest::prelude::ErrorKind;
use dq_digest::sources::MemoryLoader;

fn valid_customers() -> dq_digest::sources::Dataset {
    customers_dataset(&[Some("DD37Cf93aecA6Dc"), Some("1Ef7b82A4CAAD10")])
}

#[tokio::test]
async fn test_all_rules_pass_and_report_is_sent_once() {
    let harness = Harness::new(
        MemoryLoader::new()
            .with_dataset(sales_dataset(&[SalesRow::valid(), SalesRow::valid()]))
            .with_dataset(valid_customers()),
    );

    let outcome = harness.pipeline().run().await;

    assert_eq!(outcome.sales.records.len(), 9);
    assert_eq!(outcome.customers.records.len(), 7);
    assert!(outcome.sales.records.iter().all(|r| r.success));
    assert!(outcome.customers.records.iter().all(|r| r.success));

    assert_eq!(outcome.report, Some(harness.report_path()));
    assert_eq!(outcome.notification, NotificationStatus::Sent);
    assert_eq!(harness.notifier.sent(), vec![harness.report_path()]);

    let bytes = std::fs::read(harness.report_path()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_null_total_cost_fails_its_rule_in_place() {
    let bad = SalesRow {
        total_cost: None,
        ..SalesRow::valid()
    };
    let harness = Harness::new(
        MemoryLoader::new()
            .with_dataset(sales_dataset(&[SalesRow::valid(), bad]))
            .with_dataset(valid_customers()),
    );

    let outcome = harness.pipeline().run().await;
    let records = &outcome.sales.records;

    assert_eq!(records.len(), 9);
    assert_eq!(
        records[1],
        EvaluationRecord::new("Total_Cost", "not-null", false, None)
    );
    assert_eq!(records.iter().filter(|r| !r.success).count(), 1);
    assert_eq!(outcome.notification, NotificationStatus::Sent);
}

#[tokio::test]
async fn test_long_customer_id_fails_length_only() {
    let harness = Harness::new(MemoryLoader::new().with_dataset(customers_dataset(&[
        Some("DD37Cf93aecA6Dc"),
        Some("ABCDEFGHIJKLMNOPQRST"),
    ])));

    let outcome = harness.pipeline().run().await;
    let records = &outcome.customers.records;

    assert_eq!(records.len(), 7);
    assert_eq!(records[0].column_name, "Customer_Id");
    assert_eq!(records[0].expectation_type, "not-null");
    assert!(records[0].success);
    assert_eq!(records[1].column_name, "Customer_Id");
    assert_eq!(records[1].expectation_type, "length-between");
    assert!(!records[1].success);

    // Sales never loaded, but customer results alone are enough to report.
    assert_eq!(
        outcome.sales.status,
        DatasetStatus::LoadFailed(ErrorKind::QueryFailed)
    );
    assert!(outcome.sales.records.is_empty());
    assert_eq!(outcome.notification, NotificationStatus::Sent);
}

#[tokio::test]
async fn test_type_rules_report_observed_type() {
    let harness = Harness::new(MemoryLoader::new().with_dataset(valid_customers()));

    let outcome = harness.pipeline().run().await;
    let index = outcome
        .customers
        .records
        .iter()
        .find(|r| r.column_name == "Index")
        .unwrap();

    assert_eq!(index.expectation_type, "of-type");
    assert_eq!(index.observed_value, Some(serde_json::json!("INTEGER")));
}

#[tokio::test]
async fn test_no_results_means_no_report_and_no_mail() {
    let harness = Harness::new(MemoryLoader::new());

    let outcome = harness.pipeline().run().await;

    assert!(outcome.sales.records.is_empty());
    assert!(outcome.customers.records.is_empty());
    assert_eq!(outcome.report, None);
    assert_eq!(
        outcome.notification,
        NotificationStatus::Skipped(SkipReason::NoResults)
    );
    assert!(!harness.report_path().exists());
    assert!(harness.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_validation_failure_degrades_whole_dataset() {
    // Customer rules name columns this table does not have.
    let sales_only_columns = sales_dataset(&[SalesRow::valid()]);
    let broken = dq_digest::sources::Dataset::new(
        "customers",
        sales_only_columns.schema().clone(),
        sales_only_columns.batches().to_vec(),
    );
    let harness = Harness::new(MemoryLoader::new().with_dataset(broken));

    let outcome = harness.pipeline().run().await;

    assert_eq!(
        outcome.customers.status,
        DatasetStatus::ValidationFailed(ErrorKind::SuiteError)
    );
    assert!(outcome.customers.records.is_empty());
    assert_eq!(
        outcome.notification,
        NotificationStatus::Skipped(SkipReason::NoResults)
    );
}

#[tokio::test]
async fn test_report_write_failure_skips_notification() {
    let harness = Harness::new(
        MemoryLoader::new()
            .with_dataset(sales_dataset(&[SalesRow::valid()]))
            .with_dataset(valid_customers()),
    );
    let unwritable = harness.dir.path().join("no_such_dir").join("report.pdf");

    let outcome = harness.pipeline_writing_to(unwritable).run().await;

    assert_eq!(outcome.sales.records.len(), 9);
    assert_eq!(outcome.report, None);
    assert_eq!(
        outcome.notification,
        NotificationStatus::Skipped(SkipReason::ReportFailed)
    );
    assert!(harness.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_empty_table_passes_vacuously() {
    let harness = Harness::new(
        MemoryLoader::new()
            .with_dataset(sales_dataset(&[]))
            .with_dataset(valid_customers()),
    );

    let outcome = harness.pipeline().run().await;

    assert_eq!(outcome.sales.status, DatasetStatus::Validated);
    assert_eq!(outcome.sales.records.len(), 9);
    assert!(outcome.sales.records.iter().all(|r| r.success));
}

#[tokio::test]
async fn test_repeated_runs_reuse_rule_sets() {
    let harness = Harness::new(
        MemoryLoader::new()
            .with_dataset(sales_dataset(&[SalesRow::valid()]))
            .with_dataset(valid_customers()),
    );

    harness.pipeline().run().await;
    harness.pipeline().run().await;

    let store = SuiteStore::new(harness.context_dir());
    let names = store.list_names().await.unwrap();
    assert_eq!(
        names,
        vec![
            "customer_expectation_suite".to_string(),
            "sales_expectation_suite".to_string()
        ]
    );
    let sales = store.load("sales_expectation_suite").await.unwrap().unwrap();
    assert_eq!(sales.len(), 9);
    assert_eq!(harness.loader.load_count(), 4);
    assert_eq!(harness.notifier.sent().len(), 2);
}
