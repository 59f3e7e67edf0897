use std::io::Write;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{instrument, warn};

use crate::config::PipelineConfig;
use crate::db::Store;
use crate::models::{Catalog, PipelineState, ProbeError, ProbeResult, RoutineCheckResult, RoutineSpec};
use crate::pipeline::Session;
use crate::report::Tone;

pub struct RoutineStage {
    pub results: Vec<RoutineCheckResult>,
    // None when a routine is missing
    pub probe: Option<ProbeResult>,
}

pub async fn check_routine<S: Store>(store: &mut S, spec: &RoutineSpec) -> RoutineCheckResult {
    match store.routine_exists(spec).await {
        Ok(found) => RoutineCheckResult {
            spec: *spec,
            found,
            error: None,
        },
        Err(e) => RoutineCheckResult {
            spec: *spec,
            found: false,
            error: Some(e.to_string()),
        },
    }
}

pub async fn probe_function<S: Store>(store: &mut S, spec: &RoutineSpec, arg: i32) -> ProbeResult {
    match store.call_function(spec, arg).await {
        Ok(Some(total)) => Ok(total),
        Ok(None) => Err(ProbeError::NullResult),
        Err(e) => Err(ProbeError::Invocation(e.to_string())),
    }
}

// Leaves routines_ok false when any routine is missing; the caller stops the run
#[instrument(skip_all)]
pub async fn check_routines<S: Store, O, W: Write>(
    session: &mut Session<'_, S, O, W>,
    catalog: &Catalog,
    config: &PipelineConfig,
    mut state: PipelineState,
) -> (PipelineState, RoutineStage) {
    let mut results = Vec::with_capacity(catalog.routines.len());

    for routine in catalog.routines {
        let result = check_routine(&mut *session.store, routine).await;
        let spec = &result.spec;
        let kind = spec.kind.as_str();
        if result.found {
            session
                .report
                .line(Tone::Success, format!("- {} '{}' encontrada.", kind, spec.name));
        } else {
            state.routines_ok = false;
            match &result.error {
                Some(e) => {
                    warn!(routine = spec.name, error = %e, "routine lookup failed");
                    session.report.line(
                        Tone::Failure,
                        format!("- {} '{}' NÃO encontrada (erro na consulta: {}).", kind, spec.name, e),
                    );
                }
                None => session
                    .report
                    .line(Tone::Failure, format!("- {} '{}' NÃO encontrada.", kind, spec.name)),
            }
        }
        results.push(result);
    }

    session.report.blank();
    if !state.routines_ok {
        session
            .report
            .line(Tone::Failure, "✘ Falha na verificação de rotinas. Encerrando.");
        return (state, RoutineStage { results, probe: None });
    }

    session.report.line(Tone::Success, "✔ Todas as rotinas estão presentes.");
    let order_id = config.probe_order_id;
    session.report.plain(format!(
        "- Testando função '{}' com pedido_id={}",
        catalog.probe.name, order_id
    ));

    let probe = probe_function(&mut *session.store, &catalog.probe, order_id).await;
    match &probe {
        Ok(total) => {
            session
                .report
                .line(Tone::Success, format!("  ✔ Resultado: R$ {}", format_money(*total)));
            session.report.blank();
            session.report.plain(format!("Itens do pedido {}:", order_id));
            match session.store.order_items(order_id).await {
                Ok(items) => session.report.grid(Tone::Plain, &items, "(pedido sem itens)"),
                Err(e) => session
                    .report
                    .line(Tone::Failure, format!("  ✘ Erro ao listar itens: {}", e)),
            }
        }
        Err(e) => {
            state.probe_ok = false;
            session.report.line(Tone::Failure, format!("  ✘ {}", e));
        }
    }

    (state, RoutineStage { results, probe: Some(probe) })
}

// Two places, half-to-even; Decimal's own precision formatting truncates
fn format_money(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    )
}
