use std::io::Write;

use tracing::{instrument, warn};

use crate::config::PipelineConfig;
use crate::db::Store;
use crate::models::{PipelineState, TableCheckResult, TableSpec};
use crate::pipeline::Session;
use crate::report::{Reporter, Tone};

pub async fn check_table<S: Store>(
    store: &mut S,
    spec: &TableSpec,
    sample_size: i64,
) -> Result<TableCheckResult, S::Error> {
    if !store.table_exists(spec).await? {
        return Ok(TableCheckResult::absent(spec));
    }

    let columns = store.table_columns(spec).await?;
    let sample = store.sample_rows(spec, sample_size).await?;
    let row_count = store.count_rows(spec).await?;

    Ok(TableCheckResult::present(spec, columns, sample, row_count))
}

fn join(values: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn report_table<W: Write>(
    report: &mut Reporter<W>,
    result: &TableCheckResult,
    min_rows: i64,
    state: &mut PipelineState,
) {
    if !result.exists {
        report.line(Tone::Failure, format!("Tabela '{}' NÃO existe.", result.table));
        state.structure_ok = false;
        return;
    }

    report.line(Tone::Success, format!("Tabela '{}' encontrada.", result.table));
    if result.columns_correct() {
        report.plain(format!("- Colunas OK: {}", join(&result.columns)));
    } else {
        state.structure_ok = false;
        if !result.missing.is_empty() {
            report.line(Tone::Failure, format!("- Colunas faltando: [{}]", join(&result.missing)));
        }
        if !result.extra.is_empty() {
            report.line(Tone::Warning, format!("- Colunas extras: [{}]", join(&result.extra)));
        }
    }

    report.plain("- Exemplos de registros:");
    report.grid(Tone::Plain, &result.sample, "(sem registros)");

    if result.has_enough_rows(min_rows) {
        report.line(Tone::Success, format!("- Total de registros: {}", result.row_count));
    } else {
        report.line(
            Tone::Warning,
            format!("- Atenção: menos de {} registros ({})", min_rows, result.row_count),
        );
        state.data_ok = false;
    }
}

#[instrument(skip_all)]
pub async fn check_structure<S: Store, O, W: Write>(
    session: &mut Session<'_, S, O, W>,
    tables: &[TableSpec],
    config: &PipelineConfig,
    mut state: PipelineState,
) -> (PipelineState, Vec<TableCheckResult>) {
    let mut results = Vec::with_capacity(tables.len());

    for spec in tables {
        match check_table(&mut *session.store, spec, config.sample_size).await {
            Ok(result) => {
                report_table(&mut *session.report, &result, config.min_row_threshold, &mut state);
                results.push(result);
            }
            Err(e) => {
                warn!(table = spec.name, error = %e, "table introspection failed");
                session
                    .report
                    .line(Tone::Failure, format!("Erro ao verificar tabela '{}': {}", spec.name, e));
                state.structure_ok = false;
            }
        }
    }

    session.report.blank();
    if state.structure_ok && state.data_ok {
        session
            .report
            .line(Tone::Success, "✔ Estrutura e dados verificados com sucesso.");
    } else {
        session
            .report
            .line(Tone::Failure, "✘ Problemas detectados na estrutura ou nos dados.");
    }

    (state, results)
}
