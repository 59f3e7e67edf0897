mod integrity;
mod routines;
mod structure;
mod writes;

#[cfg(test)]
pub(crate) mod testing;

use std::io::Write;
use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::config::PipelineConfig;
use crate::db::Store;
use crate::models::{Catalog, PipelineState, WriteStatus};
use crate::report::{Operator, Reporter, Tone};

pub struct Session<'a, S, O, W: Write> {
    pub store: &'a mut S,
    pub operator: &'a mut O,
    pub report: &'a mut Reporter<W>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed(PipelineState),
    Aborted(PipelineState),
}

impl PipelineOutcome {
    pub fn state(&self) -> &PipelineState {
        match self {
            PipelineOutcome::Completed(state) | PipelineOutcome::Aborted(state) => state,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineOutcome::Completed(_) => 0,
            PipelineOutcome::Aborted(_) => 1,
        }
    }
}

fn verdict(ok: bool) -> (Tone, &'static str) {
    if ok {
        (Tone::Success, "OK")
    } else {
        (Tone::Failure, "ERRO")
    }
}

fn summarize<W: Write>(report: &mut Reporter<W>, state: &PipelineState) {
    let flags = [
        ("Estrutura", state.structure_ok),
        ("Dados", state.data_ok),
        ("Rotinas", state.routines_ok),
        ("Função de teste", state.probe_ok),
        ("Integridade referencial", state.integrity_ok),
    ];
    for (label, ok) in flags {
        let (tone, text) = verdict(ok);
        report.line(tone, format!("- {}: {}", label, text));
    }

    let tone = match state.writes {
        WriteStatus::Succeeded => Tone::Success,
        WriteStatus::Failed => Tone::Failure,
        WriteStatus::Declined | WriteStatus::NotRun => Tone::Warning,
    };
    report.line(tone, format!("- Testes dinâmicos: {}", state.writes));
}

#[instrument(skip_all)]
pub async fn run<S: Store, O: Operator, W: Write>(
    session: &mut Session<'_, S, O, W>,
    catalog: &Catalog,
    config: &PipelineConfig,
) -> PipelineOutcome {
    let started = Instant::now();
    let state = PipelineState::default();

    session.report.banner("Etapa 1 - Estrutura e dados");
    let (state, tables) = structure::check_structure(session, catalog.tables, config, state).await;
    debug!(checked = tables.len(), "structure stage done");

    session.report.banner("Etapa 2 - Procedures e função");
    let (state, stage) = routines::check_routines(session, catalog, config, state).await;
    debug!(
        found = stage.results.iter().filter(|r| r.found).count(),
        probe = ?stage.probe,
        "routine stage done"
    );
    if !state.routines_ok {
        info!("expected routine missing, stopping");
        return PipelineOutcome::Aborted(state);
    }

    session.report.banner("Etapa 3 - Integridade referencial");
    let (state, rules) = integrity::check_integrity(session, catalog.integrity_rules, state).await;
    debug!(
        violations = rules.iter().map(|r| r.violations.len()).sum::<usize>(),
        "integrity stage done"
    );

    session.report.banner("Etapa 4 - Testes dinâmicos das procedures");
    let (state, outcome) = writes::exercise_writes(session, catalog, config, state).await;
    debug!(order_id = ?outcome.order_id, "write stage done");

    session.report.banner("Resumo");
    summarize(&mut *session.report, &state);
    session.report.blank();
    session.report.line(
        Tone::Heading,
        format!("Execução finalizada em {:.3}s", started.elapsed().as_secs_f64()),
    );

    PipelineOutcome::Completed(state)
}
