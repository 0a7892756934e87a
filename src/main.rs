use anyhow::{Context, Result};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use std::path::Path;
use std::sync::Arc;
use subwire::audio::FfmpegOpener;
use subwire::cli::{Cli, Commands};
use subwire::config::Config;
use subwire::metrics::LogMetricSink;
use subwire::server::Server;
use subwire::session::protocol::{ClientRequest, ServerMessage};
use subwire::session::SessionServices;
use subwire::storage::CatalogAssetStore;
use subwire::transcribe::RemoteTranscribeBackend;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let config = load_config(cli.config.as_deref())?.with_env_overrides();

    match cli.command {
        Commands::Serve { bind } => serve(config, bind).await,
        Commands::Probe {
            url,
            uuid,
            source_locale,
            target_locale,
            format,
            stop_after,
        } => {
            probe(
                &url,
                &uuid,
                &source_locale,
                &target_locale,
                format.as_deref(),
                stop_after,
            )
            .await
        }
    }
}

fn init_tracing(quiet: bool, verbose: u8) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("subwire={}", default_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path),
            None => Ok(Config::default()),
        },
    }
}

async fn serve(config: Config, bind: Option<String>) -> Result<()> {
    if config.transcribe.endpoint.is_empty() {
        anyhow::bail!(
            "no transcription endpoint configured \
             (set [transcribe] endpoint or SUBWIRE_TRANSCRIBE_ENDPOINT)"
        );
    }

    let services = Arc::new(SessionServices {
        assets: Arc::new(CatalogAssetStore::new(config.assets.clone())),
        opener: Arc::new(FfmpegOpener::new(config.audio.clone())),
        transcribe: Arc::new(RemoteTranscribeBackend::new(
            config.transcribe.endpoint.clone(),
            config.audio.sample_rate,
        )),
        metrics: Arc::new(LogMetricSink),
        fallback_language: config.transcribe.default_language.clone(),
    });

    let addr = bind.unwrap_or(config.server.bind_addr);
    let server = Server::bind(&addr, services)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    server.run().await?;
    Ok(())
}

/// Exercise a running server: send the request, start transcription, and
/// print every frame the server sends until the connection closes.
async fn probe(
    url: &str,
    uuid: &str,
    source_locale: &str,
    target_locale: &str,
    format: Option<&str>,
    stop_after: Option<u64>,
) -> Result<()> {
    let (mut ws, _) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to {}", url))?;

    let request = ClientRequest {
        uuid: uuid.to_string(),
        source_locale: source_locale.to_string(),
        target_locale: target_locale.to_string(),
        request_type: "transcription".to_string(),
        subtitle_format: format.map(str::to_string),
    };
    ws.send(Message::Text(request.to_json()?)).await?;
    ws.send(Message::Text(
        r#"{"action": "start_transcription"}"#.to_string(),
    ))
    .await?;

    let mut subtitles = 0u64;
    while let Some(frame) = ws.next().await {
        let frame = frame?;
        let Ok(text) = frame.to_text() else { continue };
        if text.is_empty() {
            continue;
        }
        println!("{}", text);

        match ServerMessage::from_json(text) {
            Ok(ServerMessage::Subtitle { .. }) => {
                subtitles += 1;
                if let Some(limit) = stop_after
                    && subtitles >= limit
                {
                    ws.send(Message::Text(
                        r#"{"action": "stop_transcription"}"#.to_string(),
                    ))
                    .await?;
                }
            }
            Ok(ServerMessage::Error { .. }) => break,
            _ => {}
        }
    }
    Ok(())
}
