use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::TableData;
use crate::models::{IntegrityRule, RoutineSpec, TableSpec};

#[derive(Debug, Clone)]
pub struct TableCheckResult {
    pub table: &'static str,
    pub exists: bool,
    pub columns: Vec<String>,
    pub missing: BTreeSet<String>,
    pub extra: BTreeSet<String>,
    pub sample: TableData,
    pub row_count: i64,
}

impl TableCheckResult {
    pub fn absent(spec: &TableSpec) -> Self {
        Self {
            table: spec.name,
            exists: false,
            columns: Vec::new(),
            missing: spec.columns.iter().map(|c| c.to_string()).collect(),
            extra: BTreeSet::new(),
            sample: TableData::default(),
            row_count: 0,
        }
    }

    pub fn present(spec: &TableSpec, columns: Vec<String>, sample: TableData, row_count: i64) -> Self {
        let (missing, extra) = column_diff(spec.columns, &columns);
        Self {
            table: spec.name,
            exists: true,
            columns,
            missing,
            extra,
            sample,
            row_count,
        }
    }

    pub fn columns_correct(&self) -> bool {
        self.exists && self.missing.is_empty() && self.extra.is_empty()
    }

    pub fn has_enough_rows(&self, threshold: i64) -> bool {
        self.exists && self.row_count >= threshold
    }
}

pub fn column_diff(expected: &[&str], actual: &[String]) -> (BTreeSet<String>, BTreeSet<String>) {
    let expected: BTreeSet<String> = expected.iter().map(|c| c.to_string()).collect();
    let actual: BTreeSet<String> = actual.iter().cloned().collect();

    let missing = expected.difference(&actual).cloned().collect();
    let extra = actual.difference(&expected).cloned().collect();
    (missing, extra)
}

#[derive(Debug, Clone)]
pub struct RoutineCheckResult {
    pub spec: RoutineSpec,
    pub found: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    #[error("Erro executando função: {0}")]
    Invocation(String),
    #[error("função retornou NULL")]
    NullResult,
}

pub type ProbeResult = Result<Decimal, ProbeError>;

#[derive(Debug, Clone)]
pub struct IntegrityResult {
    pub label: &'static str,
    pub violations: TableData,
    pub error: Option<String>,
}

impl IntegrityResult {
    pub fn evaluated(rule: &IntegrityRule, violations: TableData) -> Self {
        Self {
            label: rule.label,
            violations,
            error: None,
        }
    }

    pub fn failed(rule: &IntegrityRule, error: String) -> Self {
        Self {
            label: rule.label,
            violations: TableData::default(),
            error: Some(error),
        }
    }

    pub fn ok(&self) -> bool {
        self.error.is_none() && self.violations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    NotRun,
    Declined,
    Succeeded,
    Failed,
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WriteStatus::NotRun => "não executado",
            WriteStatus::Declined => "ignorado pelo operador",
            WriteStatus::Succeeded => "OK",
            WriteStatus::Failed => "ERRO",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineState {
    pub structure_ok: bool,
    pub data_ok: bool,
    pub routines_ok: bool,
    pub probe_ok: bool,
    pub integrity_ok: bool,
    pub writes: WriteStatus,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            structure_ok: true,
            data_ok: true,
            routines_ok: true,
            probe_ok: true,
            integrity_ok: true,
            writes: WriteStatus::NotRun,
        }
    }
}
