//! PostgreSQL loader.

use super::convert::{text_rows_to_batch, TextColumn};
use super::{Dataset, DatasetLoader};
use crate::config::DatabaseConfig;
use crate::core::DatasetDefinition;
use crate::prelude::*;
use crate::security::{SecureString, SqlSecurity};
use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::{Connection, Row};
use tracing::{debug, info, instrument};

const COLUMNS_QUERY: &str = r#"
    SELECT column_name, udt_name
    FROM information_schema.columns
    WHERE table_schema = lower($1) AND table_name = lower($2)
    ORDER BY ordinal_position
"#;

/// Loads each dataset over a fresh connection.
///
/// The table's columns are looked up in `information_schema`, then every
/// column is selected cast to `text`; the looked-up type names decide how
/// that text is converted.
///
/// Schema and table names are sent unquoted, so PostgreSQL folds them to
/// lower case (`dbo.Sales` reads `dbo.sales`). A table created with a quoted
/// mixed-case name needs a lower-case view in front of it.
#[derive(Debug, Clone)]
pub struct PostgresLoader {
    url: SecureString,
    schema: String,
}

impl PostgresLoader {
    pub fn new(url: SecureString, schema: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        SqlSecurity::validate_identifier(&schema)?;
        Ok(Self { url, schema })
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.schema.clone())
    }

    /// The statement that reads every column of `definition` as text.
    pub fn query_for(
        &self,
        definition: &DatasetDefinition,
        columns: &[TextColumn],
    ) -> Result<String> {
        SqlSecurity::validate_identifier(&definition.table)?;
        let select = columns
            .iter()
            .map(|c| {
                let quoted = quote_column(&c.name);
                format!("{quoted}::text AS {quoted}")
            })
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "SELECT {select} FROM {}.{}",
            self.schema, definition.table
        ))
    }
}

fn quote_column(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

type TextRows = (Vec<TextColumn>, Vec<Vec<Option<String>>>);

/// Reads one table: column lookup, text select, close.
#[instrument(skip(url, loader, definition), fields(dataset.name = %definition.name))]
async fn fetch_text(
    url: &str,
    loader: &PostgresLoader,
    definition: &DatasetDefinition,
) -> Result<TextRows> {
    let dataset = definition.name.as_str();
    let mut conn = PgConnection::connect(url)
        .await
        .map_err(|e| DigestError::connection_failed("could not open database session", e))?;

    let column_rows = sqlx::query(COLUMNS_QUERY)
        .bind(loader.schema.as_str())
        .bind(definition.table.as_str())
        .fetch_all(&mut conn)
        .await
        .map_err(|e| DigestError::query_failed_with_source(dataset, "cannot list columns", e))?;
    if column_rows.is_empty() {
        return Err(DigestError::query_failed(
            dataset,
            format!("table {}.{} not found", loader.schema, definition.table),
        ));
    }

    let mut columns = Vec::with_capacity(column_rows.len());
    for row in &column_rows {
        let name: String = row
            .try_get(0)
            .map_err(|e| DigestError::query_failed_with_source(dataset, "cannot read column", e))?;
        let type_name: String = row
            .try_get(1)
            .map_err(|e| DigestError::query_failed_with_source(dataset, "cannot read column", e))?;
        columns.push(TextColumn::new(name, type_name));
    }

    let sql = loader.query_for(definition, &columns)?;
    debug!(sql = %sql, "Running dataset query");
    let rows = sqlx::query(&sql)
        .fetch_all(&mut conn)
        .await
        .map_err(|e| DigestError::query_failed_with_source(dataset, "query failed", e))?;

    let mut values = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut cells = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            let cell: Option<String> = row.try_get(index).map_err(|e| {
                DigestError::query_failed_with_source(dataset, "cannot read value", e)
            })?;
            cells.push(cell);
        }
        values.push(cells);
    }

    // Closing is best effort; the rows are already in hand.
    if let Err(e) = conn.close().await {
        debug!(error = %e, "Error closing database session");
    }

    Ok((columns, values))
}

#[async_trait]
impl DatasetLoader for PostgresLoader {
    async fn load(&self, definition: &DatasetDefinition) -> Result<Dataset> {
        let (columns, values) = fetch_text(self.url.expose(), self, definition).await?;

        let batch = text_rows_to_batch(&definition.name, &columns, values)?;
        info!(
            dataset.name = %definition.name,
            rows = batch.num_rows(),
            columns = columns.len(),
            "Dataset loaded"
        );
        Ok(Dataset::from_batch(&definition.name, batch))
    }

    fn description(&self) -> String {
        format!("PostgreSQL (schema {})", self.schema)
    }
}
