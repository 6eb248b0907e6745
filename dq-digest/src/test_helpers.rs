//! Test helpers for constraints and validators.

use crate::core::{Constraint, ConstraintResult, ValidationContext, CURRENT_CONTEXT};
use crate::prelude::*;
use crate::sources::Dataset;
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use std::sync::Arc;

/// Evaluates a constraint with the given table name in the validation context.
pub async fn evaluate_constraint_with_context(
    constraint: &dyn Constraint,
    ctx: &SessionContext,
    table_name: &str,
) -> Result<ConstraintResult> {
    let validation_ctx = ValidationContext::new(table_name, "test_suite");
    CURRENT_CONTEXT
        .scope(validation_ctx, constraint.evaluate(ctx))
        .await
}

async fn single_column_context(column: &str, data_type: DataType, array: ArrayRef) -> SessionContext {
    let schema = Arc::new(Schema::new(vec![Field::new(column, data_type, true)]));
    let batch = RecordBatch::try_new(schema.clone(), vec![array]).unwrap();
    let provider = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
    let ctx = SessionContext::new();
    ctx.register_table("data", Arc::new(provider)).unwrap();
    ctx
}

pub async fn string_context(column: &str, values: Vec<Option<&str>>) -> SessionContext {
    single_column_context(column, DataType::Utf8, Arc::new(StringArray::from(values))).await
}

pub async fn float_context(column: &str, values: Vec<Option<f64>>) -> SessionContext {
    single_column_context(column, DataType::Float64, Arc::new(Float64Array::from(values))).await
}

pub async fn int_context(column: &str, values: Vec<Option<i64>>) -> SessionContext {
    single_column_context(column, DataType::Int64, Arc::new(Int64Array::from(values))).await
}

/// Dates are days since the Unix epoch.
pub async fn date_context(column: &str, values: Vec<Option<i32>>) -> SessionContext {
    single_column_context(column, DataType::Date32, Arc::new(Date32Array::from(values))).await
}

/// Three sales rows that satisfy every sales rule.
pub fn sales_dataset() -> Dataset {
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
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["Europe", "Asia", "Sub-Saharan Africa"])),
            Arc::new(StringArray::from(vec!["Norway", "Mongolia", "Chad"])),
            Arc::new(StringArray::from(vec!["offline", "online", "offline"])),
            Arc::new(StringArray::from(vec!["H", "C", "M"])),
            Arc::new(StringArray::from(vec!["686800706", "185941302", "246222341"])),
            Arc::new(Int64Array::from(vec![8446, 3018, 1517])),
            Arc::new(Float64Array::from(vec![437.20, 154.06, 152.58])),
            Arc::new(Float64Array::from(vec![3692591.20, 464953.08, 231463.86])),
            Arc::new(Float64Array::from(vec![2224085.18, 289504.74, 140311.33])),
        ],
    )
    .unwrap();
    Dataset::new("sales", schema, vec![batch])
}

/// Two customer rows that satisfy every customer rule.
pub fn customers_dataset() -> Dataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Index", DataType::Int64, true),
        Field::new("Customer_Id", DataType::Utf8, true),
        Field::new("First_Name", DataType::Utf8, true),
        Field::new("Last_Name", DataType::Utf8, true),
        Field::new("Subscription_Date", DataType::Date32, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec!["DD37Cf93aecA6Dc", "1Ef7b82A4CAAD10"])),
            Arc::new(StringArray::from(vec!["Sheryl", "Preston"])),
            Arc::new(StringArray::from(vec!["Baxter", "Lozano"])),
            Arc::new(Date32Array::from(vec![18017, 18791])),
        ],
    )
    .unwrap();
    Dataset::new("customers", schema, vec![batch])
}
