//! CLI command implementations

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::ReplayEngine;
use crate::export::write_loss_report;
use crate::feed::FeedLoader;
use crate::notify::Notifier;
use crate::oracle::{DecisionOracle, GeminiOracle, PassthroughOracle};

/// Run a full replay over the configured data file
pub async fn run(config: &Config, offline: bool) -> Result<()> {
    let loader = FeedLoader::new(config.feed.clone(), &config.strategy);
    let samples = loader.load()?;
    info!(
        bars = samples.len(),
        path = %config.feed.data_path,
        "feed loaded and annotated"
    );

    let oracle: Box<dyn DecisionOracle> = if offline || !config.oracle.enabled {
        info!("oracle disabled, deterministic signals pass through unchallenged");
        Box::new(PassthroughOracle)
    } else {
        Box::new(GeminiOracle::new(&config.oracle)?)
    };

    let mut engine = ReplayEngine::new(config, oracle, Notifier::new(&config.notify));
    let summary = engine.run(&samples).await?;

    if config.export.enabled {
        match write_loss_report(&config.export.loss_report_path, engine.ledger().loss_records()) {
            Ok(()) => info!(
                path = %config.export.loss_report_path,
                records = engine.ledger().loss_records().len(),
                "loss report written"
            ),
            Err(e) => warn!(error = %e, "failed to write loss report"),
        }
    }

    Notifier::new(&config.notify)
        .send(&format!(
            "📊 **Replay finished**\nBalance: {:.2} → {:.2} U\nTrades: {} ({} W / {} L, {:.1}% win rate)",
            summary.initial_balance,
            summary.final_balance,
            summary.trades,
            summary.wins,
            summary.losses,
            summary.win_rate_pct,
        ))
        .await;

    println!("Initial balance : {:>12.2} U", summary.initial_balance);
    println!("Final balance   : {:>12.2} U", summary.final_balance);
    println!(
        "Trades          : {} ({} wins / {} losses, {:.1}% win rate)",
        summary.trades, summary.wins, summary.losses, summary.win_rate_pct
    );

    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}
