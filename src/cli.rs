use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, OnCreateOrderFailure};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about)]
/// Verify the loja database: table shapes and seed data, stored routines,
/// referential integrity, and a live order/item write exercise.
///
/// The write exercise inserts real rows. It asks for confirmation unless
/// --yes is given. The password is always read from the terminal.
pub struct Cli {
    /// Config file to read (and write with --save-config). Defaults to
    /// <config dir>/loja-verify/config.json
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Database host
    #[arg(long, env = "PGHOST")]
    pub host: Option<String>,

    /// Database port
    #[arg(long, env = "PGPORT")]
    pub port: Option<u16>,

    /// User to connect as
    #[arg(long, env = "PGUSER")]
    pub user: Option<String>,

    /// Database name
    #[arg(long, env = "PGDATABASE")]
    pub database: Option<String>,

    /// Connect over TLS
    #[arg(long)]
    pub tls: bool,

    /// Report log file, truncated at the start of every run
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Run the write exercise without asking first (never saved to the config file)
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Minimum number of rows every table must hold
    #[arg(long)]
    pub min_rows: Option<i64>,

    /// How many sample rows to show per table
    #[arg(long)]
    pub sample_size: Option<i64>,

    /// Order id handed to the probe function
    #[arg(long)]
    pub probe_order_id: Option<i32>,

    /// Customer the write exercise creates an order for
    #[arg(long)]
    pub customer_id: Option<i32>,

    /// Product the write exercise adds to the new order
    #[arg(long)]
    pub product_id: Option<i32>,

    /// Quantity of the added item
    #[arg(long)]
    pub quantity: Option<i32>,

    /// When creating the order fails, add the item to this order instead of
    /// skipping that step
    #[arg(long)]
    pub fallback_order_id: Option<i32>,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,

    /// Write the effective settings (never the password) back to the config file
    #[arg(long)]
    pub save_config: bool,
}

impl Cli {
    /// Overlay every flag that was given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        let connection = &mut config.connection;
        if let Some(host) = &self.host {
            connection.host = host.clone();
        }
        if let Some(port) = self.port {
            connection.port = port;
        }
        if let Some(user) = &self.user {
            connection.user = user.clone();
        }
        if let Some(database) = &self.database {
            connection.database = database.clone();
        }
        if self.tls {
            connection.tls = true;
        }

        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }

        let pipeline = &mut config.pipeline;
        if let Some(min_rows) = self.min_rows {
            pipeline.min_row_threshold = min_rows;
        }
        if let Some(sample_size) = self.sample_size {
            pipeline.sample_size = sample_size;
        }
        if let Some(id) = self.probe_order_id {
            pipeline.probe_order_id = id;
        }
        if let Some(id) = self.customer_id {
            pipeline.customer_id = id;
        }
        if let Some(id) = self.product_id {
            pipeline.product_id = id;
        }
        if let Some(quantity) = self.quantity {
            pipeline.quantity = quantity;
        }
        if let Some(id) = self.fallback_order_id {
            pipeline.on_create_order_failure = OnCreateOrderFailure::UseFallbackId(id);
        }
    }

    // Overrides for this run only, applied after the config may have been saved
    pub fn apply_run_only(&self, config: &mut Config) {
        if self.yes {
            config.pipeline.prompt_before_mutation = false;
        }
    }
}
