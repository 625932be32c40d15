use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use mando_gateway::{
    ClassifierClient, Config, ConsoleDisplay, KeyResolver, ModeController, TextStreamEngine,
};

/// Mando - voice-controlled command gateway for robot movement orders
#[derive(Parser)]
#[command(name = "mando", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,mando_gateway=info",
        1 => "info,mando_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::default();

    tracing::info!(
        wake_word = %config.wake_word,
        inactivity_ms = config.inactivity_threshold.as_millis(),
        model = %config.classifier_model,
        "starting mando gateway"
    );

    let keys = Arc::new(KeyResolver::new(config.key_store_url.clone()));

    // Prefetch the classifier key; a failure must not block recognition —
    // the next classification attempt re-fetches on demand
    if let Err(e) = keys.resolve().await {
        tracing::warn!(error = %e, "API key prefetch failed, classification disabled until next attempt");
    }

    let classifier = Arc::new(ClassifierClient::new(
        config.classifier_url.clone(),
        config.classifier_model.clone(),
        Arc::clone(&keys),
    ));

    // Stdin stands in for the speech engine: plain lines are final
    // transcripts, lines prefixed with `~` are interim
    let (engine_tx, engine_rx) = mpsc::channel(64);
    let engine = TextStreamEngine::new(engine_tx);

    let (controller, handle) = ModeController::new(
        config,
        Box::new(engine),
        engine_rx,
        Box::new(ConsoleDisplay),
        classifier,
    );

    // Auto-start into Active
    handle.request_start().await;
    tracing::info!("listening - type an utterance and press enter (`~` prefix for interim)");

    let controller_task = tokio::spawn(controller.run());

    tokio::signal::ctrl_c().await?;
    handle.request_stop().await;
    tracing::info!("stopped - press ctrl-c again to exit");

    tokio::signal::ctrl_c().await?;
    controller_task.abort();

    Ok(())
}
