mod cli;
mod config;
mod db;
mod error;
mod models;
mod pipeline;
mod report;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;
use db::Database;
use models::Catalog;
use pipeline::Session;
use report::{read_password, Reporter, TerminalOperator, Tone};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("verification could not start: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);

    if cli.save_config {
        let path = match &cli.config {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => config.save()?,
        };
        info!(path = %path.display(), "configuration saved");
    }
    cli.apply_run_only(&mut config);

    let mut report = Reporter::create(&config.log_file, !cli.no_color)
        .with_context(|| format!("cannot create log file {}", config.log_file.display()))?;

    let connection = &config.connection;
    report.line(
        Tone::Info,
        format!(
            "Tentando conexão com o banco de dados '{}' em {}:{}...",
            connection.database, connection.host, connection.port
        ),
    );

    let password = read_password(&format!("Senha do usuário '{}': ", connection.user))
        .context("could not read the password")?;
    let pg_config = connection.to_pg_config(&password);
    drop(password);

    let mut database = match Database::connect(&pg_config, connection.tls).await {
        Ok(database) => {
            report.line(Tone::Success, "Conexão bem-sucedida.");
            database
        }
        Err(e) => {
            report.line(Tone::Failure, format!("Erro de conexão: {}", e));
            return Ok(1);
        }
    };
    drop(pg_config);

    let mut operator = TerminalOperator::stdin();
    let mut session = Session {
        store: &mut database,
        operator: &mut operator,
        report: &mut report,
    };
    let outcome = pipeline::run(&mut session, &Catalog::loja(), &config.pipeline).await;
    info!(state = ?outcome.state(), "verification finished");

    Ok(outcome.exit_code())
}
