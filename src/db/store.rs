use rust_decimal::Decimal;

use crate::db::TableData;
use crate::models::{IntegrityRule, RoutineSpec, TableSpec};

#[allow(async_fn_in_trait)]
pub trait Store {
    type Error: std::error::Error;

    async fn table_exists(&mut self, table: &TableSpec) -> Result<bool, Self::Error>;

    async fn table_columns(&mut self, table: &TableSpec) -> Result<Vec<String>, Self::Error>;

    async fn sample_rows(&mut self, table: &TableSpec, limit: i64) -> Result<TableData, Self::Error>;

    async fn count_rows(&mut self, table: &TableSpec) -> Result<i64, Self::Error>;

    async fn routine_exists(&mut self, routine: &RoutineSpec) -> Result<bool, Self::Error>;

    // Ok(None) for SQL NULL
    async fn call_function(&mut self, routine: &RoutineSpec, arg: i32) -> Result<Option<Decimal>, Self::Error>;

    async fn call_procedure(&mut self, routine: &RoutineSpec, args: &[i32]) -> Result<(), Self::Error>;

    async fn latest_order_id(&mut self, customer_id: i32) -> Result<Option<i32>, Self::Error>;

    async fn order_items(&mut self, order_id: i32) -> Result<TableData, Self::Error>;

    async fn find_orphans(&mut self, rule: &IntegrityRule) -> Result<TableData, Self::Error>;
}
