use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use postgres_native_tls::MakeTlsConnector;
use rust_decimal::Decimal;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row, Statement};
use tracing::{debug, error};

use crate::db::{Store, TableData};
use crate::error::{Result, VerifyError};
use crate::models::{quote_ident, IntegrityRule, RoutineSpec, TableSpec};

pub struct Database {
    client: Client,
}

// Render one column of a row as display text, trying the types the loja schema uses
fn row_value_to_string(row: &Row, idx: usize) -> String {
    const NULL: &str = "(NULL)";

    // String/text types
    if let Ok(val) = row.try_get::<_, Option<String>>(idx) {
        return val.unwrap_or_else(|| NULL.to_string());
    }

    // Integer types
    if let Ok(val) = row.try_get::<_, Option<i32>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }
    if let Ok(val) = row.try_get::<_, Option<i64>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }
    if let Ok(val) = row.try_get::<_, Option<i16>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }

    // NUMERIC, e.g. prices and totals
    if let Ok(val) = row.try_get::<_, Option<Decimal>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }

    // Floating point types
    if let Ok(val) = row.try_get::<_, Option<f32>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }
    if let Ok(val) = row.try_get::<_, Option<f64>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }

    if let Ok(val) = row.try_get::<_, Option<bool>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }

    if let Ok(val) = row.try_get::<_, Option<uuid::Uuid>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }

    // Date and timestamp types
    if let Ok(val) = row.try_get::<_, Option<NaiveDate>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }
    if let Ok(val) = row.try_get::<_, Option<NaiveDateTime>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }
    if let Ok(val) = row.try_get::<_, Option<DateTime<Utc>>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }

    if let Ok(val) = row.try_get::<_, Option<serde_json::Value>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| v.to_string());
    }

    if let Ok(val) = row.try_get::<_, Option<Vec<u8>>>(idx) {
        return val.map_or_else(|| NULL.to_string(), |v| format!("<{} bytes>", v.len()));
    }

    let type_name = row.columns()[idx].type_().name().to_string();
    format!("<{}>", type_name)
}

fn to_table_data(statement: &Statement, rows: &[Row]) -> TableData {
    let columns = statement
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();

    let data = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| row_value_to_string(row, i)).collect())
        .collect();

    TableData::new(columns, data)
}

impl Database {
    pub async fn connect(config: &tokio_postgres::Config, tls: bool) -> Result<Self> {
        let client = if tls {
            let connector = native_tls::TlsConnector::new()?;
            let (client, connection) = config
                .connect(MakeTlsConnector::new(connector))
                .await
                .map_err(VerifyError::Connect)?;

            // Keep connection alive in background task
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!(error = %e, "database connection error");
                }
            });
            client
        } else {
            let (client, connection) = config.connect(NoTls).await.map_err(VerifyError::Connect)?;

            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!(error = %e, "database connection error");
                }
            });
            client
        };

        Ok(Database { client })
    }

    async fn select(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<TableData> {
        debug!(sql = %sql, "select");
        let statement = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| VerifyError::query(sql, e))?;
        let rows = self
            .client
            .query(&statement, params)
            .await
            .map_err(|e| VerifyError::query(sql, e))?;

        Ok(to_table_data(&statement, &rows))
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Row> {
        debug!(sql = %sql, "query_one");
        self.client
            .query_one(sql, params)
            .await
            .map_err(|e| VerifyError::query(sql, e))
    }
}

impl Store for Database {
    type Error = VerifyError;

    async fn table_exists(&mut self, table: &TableSpec) -> Result<bool> {
        let sql = "SELECT 1 FROM information_schema.tables
                   WHERE table_schema = current_schema() AND table_name = $1::text";
        debug!(sql = %sql, table = table.name, "table_exists");
        let rows = self
            .client
            .query(sql, &[&table.name])
            .await
            .map_err(|e| VerifyError::query(sql, e))?;

        Ok(!rows.is_empty())
    }

    async fn table_columns(&mut self, table: &TableSpec) -> Result<Vec<String>> {
        let sql = "SELECT column_name::text FROM information_schema.columns
                   WHERE table_schema = current_schema() AND table_name = $1::text
                   ORDER BY ordinal_position";
        debug!(sql = %sql, table = table.name, "table_columns");
        let rows = self
            .client
            .query(sql, &[&table.name])
            .await
            .map_err(|e| VerifyError::query(sql, e))?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn sample_rows(&mut self, table: &TableSpec, limit: i64) -> Result<TableData> {
        let sql = format!("SELECT * FROM {} LIMIT {}", quote_ident(table.name), limit.max(0));
        self.select(&sql, &[]).await
    }

    async fn count_rows(&mut self, table: &TableSpec) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table.name));
        let row = self.query_one(&sql, &[]).await?;
        Ok(row.get(0))
    }

    async fn routine_exists(&mut self, routine: &RoutineSpec) -> Result<bool> {
        let sql = "SELECT 1 FROM information_schema.routines
                   WHERE routine_catalog = current_database()
                   AND routine_schema = current_schema()
                   AND routine_name = $1::text
                   AND routine_type = $2::text";
        debug!(sql = %sql, routine = routine.name, kind = routine.kind.as_str(), "routine_exists");
        let rows = self
            .client
            .query(sql, &[&routine.name, &routine.kind.as_str()])
            .await
            .map_err(|e| VerifyError::query(sql, e))?;

        Ok(!rows.is_empty())
    }

    async fn call_function(&mut self, routine: &RoutineSpec, arg: i32) -> Result<Option<Decimal>> {
        let sql = format!("SELECT {}($1::integer)::numeric", quote_ident(routine.name));
        let row = self.query_one(&sql, &[&arg]).await?;
        row.try_get::<_, Option<Decimal>>(0)
            .map_err(|e| VerifyError::query(&sql, e))
    }

    async fn call_procedure(&mut self, routine: &RoutineSpec, args: &[i32]) -> Result<()> {
        let placeholders: Vec<String> = (1..=args.len()).map(|i| format!("${}::integer", i)).collect();
        let sql = format!("CALL {}({})", quote_ident(routine.name), placeholders.join(", "));
        let params: Vec<&(dyn ToSql + Sync)> = args.iter().map(|a| a as &(dyn ToSql + Sync)).collect();
        debug!(sql = %sql, ?args, "call_procedure");

        let transaction = self
            .client
            .transaction()
            .await
            .map_err(|e| VerifyError::query(&sql, e))?;
        transaction
            .execute(sql.as_str(), &params)
            .await
            .map_err(|e| VerifyError::query(&sql, e))?;
        transaction
            .commit()
            .await
            .map_err(|e| VerifyError::query("COMMIT", e))
    }

    async fn latest_order_id(&mut self, customer_id: i32) -> Result<Option<i32>> {
        let sql = "SELECT MAX(id)::integer FROM pedidos WHERE cliente_id = $1::integer";
        let row = self.query_one(sql, &[&customer_id]).await?;
        Ok(row.get(0))
    }

    async fn order_items(&mut self, order_id: i32) -> Result<TableData> {
        let sql = "SELECT * FROM itens_pedido WHERE pedido_id = $1::integer ORDER BY id";
        self.select(sql, &[&order_id]).await
    }

    async fn find_orphans(&mut self, rule: &IntegrityRule) -> Result<TableData> {
        self.select(rule.sql, &[]).await
    }
}
