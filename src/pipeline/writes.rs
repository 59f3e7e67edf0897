use std::io::Write;

use tracing::{info, instrument, warn};

use crate::config::{OnCreateOrderFailure, PipelineConfig};
use crate::db::Store;
use crate::models::{Catalog, PipelineState, WriteStatus};
use crate::pipeline::Session;
use crate::report::{Operator, Tone};

const CONFIRMATION: &str = "Executar os testes dinâmicos? Isso cria um pedido e um item no banco";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub created: bool,
    pub order_id: Option<i32>,
    pub item_added: bool,
}

fn approved<O: Operator, S, W: Write>(session: &mut Session<'_, S, O, W>, config: &PipelineConfig) -> bool {
    if !config.prompt_before_mutation {
        session
            .report
            .line(Tone::Info, "Modo estrito: executando testes dinâmicos sem confirmação.");
        return true;
    }

    match session.operator.confirm(CONFIRMATION) {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "could not read confirmation, treating as no");
            false
        }
    }
}

// The two calls commit separately, so every accepted run adds rows
#[instrument(skip_all)]
pub async fn exercise_writes<S: Store, O: Operator, W: Write>(
    session: &mut Session<'_, S, O, W>,
    catalog: &Catalog,
    config: &PipelineConfig,
    mut state: PipelineState,
) -> (PipelineState, WriteReport) {
    let mut outcome = WriteReport::default();

    if !approved(session, config) {
        session
            .report
            .line(Tone::Warning, "Testes dinâmicos ignorados pelo operador.");
        state.writes = WriteStatus::Declined;
        return (state, outcome);
    }

    let customer_id = config.customer_id;
    session.report.line(
        Tone::Info,
        format!("- Executando '{}' com cliente_id={}...", catalog.create_order.name, customer_id),
    );
    match session
        .store
        .call_procedure(&catalog.create_order, &[customer_id])
        .await
    {
        Ok(()) => {
            outcome.created = true;
            session.report.line(Tone::Success, "  ✔ Pedido criado com sucesso.");
        }
        Err(e) => {
            session
                .report
                .line(Tone::Failure, format!("  ✘ Erro ao criar pedido: {}", e));
        }
    }

    // The procedure's own output id is not read back; the newest order of the
    // customer is taken instead.
    let mut order_id = None;
    if outcome.created {
        match session.store.latest_order_id(customer_id).await {
            Ok(Some(id)) => order_id = Some(id),
            Ok(None) => session.report.line(
                Tone::Warning,
                format!("  Nenhum pedido encontrado para cliente_id={}.", customer_id),
            ),
            Err(e) => session
                .report
                .line(Tone::Failure, format!("  ✘ Erro ao localizar o pedido criado: {}", e)),
        }
    }

    if order_id.is_none() {
        if let OnCreateOrderFailure::UseFallbackId(fallback) = config.on_create_order_failure {
            session
                .report
                .line(Tone::Warning, format!("  Usando pedido_id de reserva {}.", fallback));
            order_id = Some(fallback);
        }
    }

    let Some(order_id) = order_id else {
        session.report.line(
            Tone::Failure,
            format!("  ✘ Nenhum pedido_id disponível; '{}' não será executado.", catalog.add_item.name),
        );
        state.writes = WriteStatus::Failed;
        return (state, outcome);
    };
    outcome.order_id = Some(order_id);

    let (product_id, quantity) = (config.product_id, config.quantity);
    session.report.line(
        Tone::Info,
        format!(
            "- Adicionando item ao pedido_id={}, produto_id={}, quantidade={}...",
            order_id, product_id, quantity
        ),
    );
    match session
        .store
        .call_procedure(&catalog.add_item, &[order_id, product_id, quantity])
        .await
    {
        Ok(()) => {
            outcome.item_added = true;
            session.report.line(Tone::Success, "  ✔ Item adicionado com sucesso.");
        }
        Err(e) => {
            session
                .report
                .line(Tone::Failure, format!("  ✘ Erro ao adicionar item: {}", e));
        }
    }

    session.report.blank();
    session
        .report
        .line(Tone::Heading, format!("Itens atuais do pedido {}:", order_id));
    match session.store.order_items(order_id).await {
        Ok(items) => session.report.grid(Tone::Plain, &items, "(pedido sem itens)"),
        Err(e) => session
            .report
            .line(Tone::Failure, format!("  ✘ Erro ao listar itens: {}", e)),
    }

    state.writes = if outcome.created && outcome.item_added {
        WriteStatus::Succeeded
    } else {
        WriteStatus::Failed
    };
    info!(?outcome, "write exercise finished");
    (state, outcome)
}
