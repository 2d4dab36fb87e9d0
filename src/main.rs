mod api;
mod baseline;
mod config;
mod error;
mod history;
mod models;
mod monitor;
mod ranking;
mod reconcile;
mod report;
mod rpc;
mod snapshot;

use std::sync::Arc;

use baseline::BaselineStore;
use chrono::Utc;
use monitor::Cycle;
use snapshot::{PeriodKey, SnapshotStore};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Holder monitor starting...");

    let cfg = config::load()?;
    info!("  Rune: {}", cfg.rune_id);
    info!("  Data dir: {:?}", cfg.data_dir);
    info!("  Report: {:?}", cfg.report_path);
    info!("  Include zero balances: {}", cfg.include_zero_balances);

    let offset = cfg.utc_offset()?;
    let now = Utc::now();
    let cycle = Cycle {
        project: cfg.project_name.clone(),
        period: PeriodKey::at(now, offset),
        generated_at: now
            .with_timezone(&offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        options: cfg.reconcile_options(),
    };

    let client = rpc::http_client()?;
    let fetched = rpc::fetch_current_balances(&client, &cfg).await?;

    let report = monitor::run_cycle(
        &BaselineStore::new(&cfg.data_dir),
        &SnapshotStore::new(&cfg.data_dir),
        &cycle,
        fetched,
    )?;
    report::write_report(&cfg.report_path, &report)?;
    info!(
        "Cycle {} complete: {} active holders",
        report.period, report.active_holders
    );

    if cfg.serve_report {
        let report = Arc::new(report);
        tokio::select! {
            res = api::serve(&cfg, report) => if let Err(e) = res {
                error!("API error: {:?}", e);
            },
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received, stopping...");
            }
        }
    }

    info!("Holder monitor stopped.");
    Ok(())
}
