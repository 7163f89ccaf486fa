use std::net::SocketAddr;

use clap::Parser;
use healthai_chat::GeminiChat;
use healthai_cli::server::{router, AppState};
use healthai_cli::{init_tracing, load_settings, training_progress};
use healthai_pipeline::DiseasePredictor;
use tracing::{info, warn};

/// HealthAI HTTP server
#[derive(Parser, Debug)]
#[command(name = "healthai-server")]
#[command(about = "Serve symptom-based disease predictions over HTTP")]
struct Args {
    /// Bind address (overrides server.host)
    #[arg(long)]
    host: Option<String>,

    /// Port (overrides server.port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();
    let settings = load_settings()?;

    let progress = training_progress(settings.model.n_trees);
    let predictor = {
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || DiseasePredictor::initialize_with_progress(&settings, &progress)).await??
    };
    let chat = GeminiChat::from_settings(&settings.chat)?;
    if !chat.is_configured() {
        warn!(env = %settings.chat.api_key_env, "chat API key not set; /chat will answer with a notice");
    }

    let host = args.host.unwrap_or(settings.server.host);
    let port = args.port.unwrap_or(settings.server.port);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, symptoms = predictor.vocabulary().len(), "healthai-server listening");
    axum::serve(listener, router(AppState::new(predictor, chat))).await?;
    Ok(())
}
