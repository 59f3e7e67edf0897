use std::collections::{HashMap, HashSet, VecDeque};
use std::io;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::{Store, TableData};
use crate::models::catalog::{
    IntegrityRule, RoutineKind, RoutineSpec, TableSpec, ADICIONAR_ITEM, CALCULAR_TOTAL_PEDIDO,
    CRIAR_PEDIDO,
};
use crate::report::{captured, Operator, Reporter};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(pub String);

#[derive(Debug, Clone)]
pub struct FakeTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl FakeTable {
    fn new(columns: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            columns: strings(columns),
            rows: rows.iter().map(|r| strings(r)).collect(),
        }
    }

    fn ids(&self, column: usize) -> HashSet<String> {
        self.rows.iter().filter_map(|r| r.get(column).cloned()).collect()
    }
}

pub struct FakeStore {
    pub tables: HashMap<&'static str, FakeTable>,
    pub routines: HashSet<(&'static str, RoutineKind)>,
    pub function_result: Result<Option<Decimal>, String>,
    pub failing_procedures: HashSet<&'static str>,
    pub broken_tables: HashSet<&'static str>,
    pub broken_rules: HashSet<&'static str>,
    // e.g. exists:clientes or call:criar_pedido(1)
    pub calls: Vec<String>,
}

impl FakeStore {
    pub fn healthy() -> Self {
        let mut tables = HashMap::new();
        tables.insert(
            "clientes",
            FakeTable::new(
                &["id", "nome", "email"],
                &[
                    &["1", "Ana", "ana@loja.com"],
                    &["2", "Bruno", "bruno@loja.com"],
                    &["3", "Carla", "carla@loja.com"],
                ],
            ),
        );
        tables.insert(
            "produtos",
            FakeTable::new(
                &["id", "nome", "preco", "estoque"],
                &[
                    &["1", "Caneta", "2.50", "100"],
                    &["2", "Caderno", "15.90", "40"],
                    &["3", "Mochila", "89.00", "5"],
                ],
            ),
        );
        tables.insert(
            "pedidos",
            FakeTable::new(
                &["id", "cliente_id", "data_pedido"],
                &[
                    &["1", "1", "2026-01-10"],
                    &["2", "2", "2026-01-11"],
                    &["3", "3", "2026-01-12"],
                ],
            ),
        );
        tables.insert(
            "itens_pedido",
            FakeTable::new(
                &["id", "pedido_id", "produto_id", "quantidade"],
                &[&["1", "1", "1", "2"], &["2", "1", "2", "1"], &["3", "2", "3", "1"]],
            ),
        );

        let routines = [CRIAR_PEDIDO, ADICIONAR_ITEM, CALCULAR_TOTAL_PEDIDO]
            .iter()
            .map(|r| (r.name, r.kind))
            .collect();

        Self {
            tables,
            routines,
            function_result: Ok(Some(Decimal::new(2090, 2))),
            failing_procedures: HashSet::new(),
            broken_tables: HashSet::new(),
            broken_rules: HashSet::new(),
            calls: Vec::new(),
        }
    }

    pub fn table_mut(&mut self, name: &str) -> &mut FakeTable {
        self.tables.get_mut(name).unwrap()
    }

    pub fn drop_column(&mut self, table: &str, column: &str) {
        let table = self.table_mut(table);
        let idx = table.columns.iter().position(|c| c == column).unwrap();
        table.columns.remove(idx);
        for row in &mut table.rows {
            row.remove(idx);
        }
    }

    pub fn push_row(&mut self, table: &str, row: &[&str]) {
        self.table_mut(table).rows.push(strings(row));
    }

    pub fn orders_of(&self, customer_id: i32) -> usize {
        let customer = customer_id.to_string();
        self.tables["pedidos"].rows.iter().filter(|r| r[1] == customer).count()
    }

    pub fn called(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn table(&self, spec: &TableSpec) -> Result<&FakeTable, FakeError> {
        if self.broken_tables.contains(spec.name) {
            return Err(FakeError(format!("permission denied for table {}", spec.name)));
        }
        self.tables
            .get(spec.name)
            .ok_or_else(|| FakeError(format!("relation \"{}\" does not exist", spec.name)))
    }

    fn next_id(table: &FakeTable) -> i32 {
        table
            .rows
            .iter()
            .filter_map(|r| r[0].parse::<i32>().ok())
            .max()
            .unwrap_or(0)
            + 1
    }

    fn orphans(&self, child: &str, key: usize, parent: &str, columns: &[&str]) -> TableData {
        let parent_ids = self.tables.get(parent).map(|t| t.ids(0)).unwrap_or_default();
        let rows = self
            .tables
            .get(child)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
            .into_iter()
            .filter(|r| !parent_ids.contains(&r[key]))
            .map(|r| vec![r[0].clone(), r[key].clone(), "(NULL)".to_string()])
            .collect();
        TableData::new(strings(columns), rows)
    }
}

impl Store for FakeStore {
    type Error = FakeError;

    async fn table_exists(&mut self, table: &TableSpec) -> Result<bool, FakeError> {
        self.calls.push(format!("exists:{}", table.name));
        if self.broken_tables.contains(table.name) {
            return Err(FakeError(format!("permission denied for table {}", table.name)));
        }
        Ok(self.tables.contains_key(table.name))
    }

    async fn table_columns(&mut self, table: &TableSpec) -> Result<Vec<String>, FakeError> {
        self.calls.push(format!("columns:{}", table.name));
        Ok(self.table(table)?.columns.clone())
    }

    async fn sample_rows(&mut self, table: &TableSpec, limit: i64) -> Result<TableData, FakeError> {
        self.calls.push(format!("sample:{}", table.name));
        let data = self.table(table)?;
        let rows = data.rows.iter().take(limit.max(0) as usize).cloned().collect();
        Ok(TableData::new(data.columns.clone(), rows))
    }

    async fn count_rows(&mut self, table: &TableSpec) -> Result<i64, FakeError> {
        self.calls.push(format!("count:{}", table.name));
        Ok(self.table(table)?.rows.len() as i64)
    }

    async fn routine_exists(&mut self, routine: &RoutineSpec) -> Result<bool, FakeError> {
        self.calls.push(format!("routine:{}", routine.name));
        Ok(self.routines.contains(&(routine.name, routine.kind)))
    }

    async fn call_function(&mut self, routine: &RoutineSpec, arg: i32) -> Result<Option<Decimal>, FakeError> {
        self.calls.push(format!("function:{}({})", routine.name, arg));
        self.function_result.clone().map_err(FakeError)
    }

    async fn call_procedure(&mut self, routine: &RoutineSpec, args: &[i32]) -> Result<(), FakeError> {
        let rendered: Vec<String> = args.iter().map(i32::to_string).collect();
        self.calls.push(format!("call:{}({})", routine.name, rendered.join(",")));
        if self.failing_procedures.contains(routine.name) {
            return Err(FakeError(format!("procedure {} failed", routine.name)));
        }

        match routine.name {
            "criar_pedido" => {
                let pedidos = self.table_mut("pedidos");
                let id = Self::next_id(pedidos).to_string();
                pedidos.rows.push(vec![id, rendered[0].clone(), "2026-10-16".to_string()]);
            }
            "adicionar_item" => {
                let itens = self.table_mut("itens_pedido");
                let id = Self::next_id(itens).to_string();
                itens.rows.push(vec![id, rendered[0].clone(), rendered[1].clone(), rendered[2].clone()]);
            }
            other => return Err(FakeError(format!("unknown procedure {}", other))),
        }
        Ok(())
    }

    async fn latest_order_id(&mut self, customer_id: i32) -> Result<Option<i32>, FakeError> {
        self.calls.push(format!("latest_order:{}", customer_id));
        let customer = customer_id.to_string();
        Ok(self.tables["pedidos"]
            .rows
            .iter()
            .filter(|r| r[1] == customer)
            .filter_map(|r| r[0].parse::<i32>().ok())
            .max())
    }

    async fn order_items(&mut self, order_id: i32) -> Result<TableData, FakeError> {
        self.calls.push(format!("items:{}", order_id));
        let itens = &self.tables["itens_pedido"];
        let order = order_id.to_string();
        let rows = itens.rows.iter().filter(|r| r[1] == order).cloned().collect();
        Ok(TableData::new(itens.columns.clone(), rows))
    }

    async fn find_orphans(&mut self, rule: &IntegrityRule) -> Result<TableData, FakeError> {
        self.calls.push(format!("orphans:{}", rule.label));
        if self.broken_rules.contains(rule.label) {
            return Err(FakeError("canceling statement due to statement timeout".to_string()));
        }
        let data = match rule.label {
            "cliente_id em pedidos" => {
                self.orphans("pedidos", 1, "clientes", &["pedido_id", "cliente_id", "cliente_existente"])
            }
            "pedido_id em itens_pedido" => {
                self.orphans("itens_pedido", 1, "pedidos", &["item_id", "pedido_id", "pedido_existente"])
            }
            "produto_id em itens_pedido" => {
                self.orphans("itens_pedido", 2, "produtos", &["item_id", "produto_id", "produto_existente"])
            }
            other => return Err(FakeError(format!("unknown rule {}", other))),
        };
        Ok(data)
    }
}

#[derive(Default)]
pub struct ScriptedOperator {
    pub answers: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl ScriptedOperator {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Operator for ScriptedOperator {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left"))
    }
}

pub fn quiet_reporter() -> Reporter<Vec<u8>> {
    Reporter::new(Vec::new(), false, false)
}

pub fn log_of(reporter: Reporter<Vec<u8>>) -> String {
    captured(reporter)
}
