use std::io::Write;

use tracing::{instrument, warn};

use crate::db::Store;
use crate::models::{IntegrityResult, IntegrityRule, PipelineState};
use crate::pipeline::Session;
use crate::report::Tone;

pub async fn evaluate_rule<S: Store>(store: &mut S, rule: &IntegrityRule) -> IntegrityResult {
    match store.find_orphans(rule).await {
        Ok(rows) => IntegrityResult::evaluated(rule, rows),
        Err(e) => IntegrityResult::failed(rule, e.to_string()),
    }
}

#[instrument(skip_all)]
pub async fn check_integrity<S: Store, O, W: Write>(
    session: &mut Session<'_, S, O, W>,
    rules: &[IntegrityRule],
    mut state: PipelineState,
) -> (PipelineState, Vec<IntegrityResult>) {
    session
        .report
        .line(Tone::Info, "Validação dos relacionamentos e integridade referencial:");
    session.report.blank();

    let mut results = Vec::with_capacity(rules.len());
    for rule in rules {
        let result = evaluate_rule(&mut *session.store, rule).await;

        if result.ok() {
            session
                .report
                .line(Tone::Success, format!("- {}: OK (nenhum registro inválido)", result.label));
        } else if let Some(e) = &result.error {
            warn!(rule = rule.label, error = %e, "integrity query failed");
            session
                .report
                .line(Tone::Failure, format!("- {}: ERRO - consulta falhou: {}", result.label, e));
        } else {
            session.report.line(
                Tone::Failure,
                format!(
                    "- {}: ERRO - {} registro(s) inválido(s) encontrado(s)",
                    result.label,
                    result.violations.len()
                ),
            );
            session.report.grid(Tone::Warning, &result.violations, "");
        }

        state.integrity_ok &= result.ok();
        results.push(result);
    }

    session.report.blank();
    if state.integrity_ok {
        session
            .report
            .line(Tone::Success, "✔ Integridade referencial validada com sucesso.");
    } else {
        session
            .report
            .line(Tone::Failure, "✘ Problemas detectados na integridade referencial.");
    }

    (state, results)
}
