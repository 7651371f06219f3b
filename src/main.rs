use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use versebot::config::Config;
use versebot::platform::HttpPlatform;
use versebot::render::SvgRenderer;
use versebot::run::Orchestrator;
use versebot::verse::{BundleEngine, BundleLexicon, load_bundle};

/// Answers unread direct messages with rhymed compositions.
#[derive(Parser)]
#[command(name = "versebot")]
struct Cli {
    /// Path to the precomputed lookup-table bundle.
    bundle: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "versebot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let bundle = match load_bundle(&cli.bundle) {
        Ok(bundle) => Arc::new(bundle),
        Err(e) => {
            tracing::error!("failed to load bundle {}: {e}", cli.bundle.display());
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = Orchestrator::new(
        HttpPlatform::new(&config),
        BundleLexicon::new(Arc::clone(&bundle)),
        BundleEngine::new(),
        SvgRenderer::default(),
        bundle,
        config,
    );

    match orchestrator.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("run failed: {e}");
            ExitCode::FAILURE
        }
    }
}
