use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use redliner_core::config::{ProviderKind, PublishBackend};
use redliner_core::vault::EnvVaultProvider;
use redliner_core::{Config, DocumentAnalyzer, ReviewReport, ReviewService, RevisionPipeline, Upload};
use redliner_gateway::GatewayServer;
use redliner_llm::any::AnyProvider;
use redliner_llm::claude::ClaudeProvider;
use redliner_llm::gemini::GeminiProvider;
use redliner_publish::{
    AnyPublisher, GoogleAuth, GoogleDocsPublisher, LocalPublisher, ServiceAccountKey,
};
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(
    name = "redliner",
    version,
    about = "Find ambiguous or biased clauses in legal documents and publish a revised draft"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP gateway
    Serve,
    /// Review a local PDF or plain-text file
    Review {
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Write results to this directory instead of the configured backend
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

type Service = ReviewService<AnyProvider, AnyPublisher>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path)?;
    config.resolve_secrets(&EnvVaultProvider).await?;
    tracing::info!(
        config = %config_path.display(),
        provider = %config.llm.provider,
        model = %config.llm.model,
        "configuration loaded"
    );

    match cli.command {
        Command::Serve => serve(&config).await,
        Command::Review {
            file,
            json,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.publish.backend = PublishBackend::Local;
                config.publish.output_dir = dir;
            }
            let report = review_file(&config, &file).await?;
            print_report(&report, json)
        }
    }
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_owned();
    }
    if let Ok(path) = std::env::var("REDLINER_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    let api_key = config.llm_api_key()?.expose().to_owned();
    let client = redliner_llm::http::default_client(Duration::from_secs(config.timeouts.llm_secs))?;
    let model = config.llm.model.clone();

    let provider = match config.llm.provider {
        ProviderKind::Gemini => {
            let mut provider = GeminiProvider::new(api_key, model)
                .with_client(client)
                .with_max_output_tokens(config.llm.max_tokens);
            if let Some(url) = &config.llm.base_url {
                provider = provider.with_base_url(url.clone());
            }
            AnyProvider::Gemini(provider)
        }
        ProviderKind::Claude => {
            let mut provider =
                ClaudeProvider::new(api_key, model, config.llm.max_tokens).with_client(client);
            if let Some(url) = &config.llm.base_url {
                provider = provider.with_base_url(url.clone());
            }
            AnyProvider::Claude(provider)
        }
    };
    Ok(provider)
}

fn google_auth(config: &Config) -> anyhow::Result<GoogleAuth> {
    if let Some(path) = &config.publish.service_account_file {
        let key = ServiceAccountKey::from_file(path).with_context(|| {
            format!("failed to load service account key {}", path.display())
        })?;
        tracing::info!(account = %key.client_email, "using Google service account");
        return Ok(GoogleAuth::service_account(key));
    }
    let token = config.secrets.google_access_token.as_ref().context(
        "the google_docs publish backend needs publish.service_account_file \
         (REDLINER_GOOGLE_SERVICE_ACCOUNT_FILE) or REDLINER_GOOGLE_ACCESS_TOKEN",
    )?;
    tracing::warn!("using a fixed Google access token, publishing fails once it expires");
    Ok(GoogleAuth::access_token_only(token.expose().to_owned()))
}

fn create_publisher(config: &Config) -> anyhow::Result<AnyPublisher> {
    match config.publish.backend {
        PublishBackend::GoogleDocs => {
            let client = redliner_llm::http::default_client(Duration::from_secs(
                config.timeouts.publish_secs,
            ))?;
            Ok(AnyPublisher::GoogleDocs(GoogleDocsPublisher::new(
                google_auth(config)?,
                client,
            )))
        }
        PublishBackend::Local => Ok(AnyPublisher::Local(LocalPublisher::new(
            config.publish.output_dir.clone(),
        ))),
    }
}

fn build_service(config: &Config) -> anyhow::Result<Service> {
    let provider = Arc::new(create_provider(config)?);
    let publisher = Arc::new(create_publisher(config)?);
    let pipeline = RevisionPipeline::new(Arc::clone(&provider))
        .with_threshold(config.revision.single_call_threshold)
        .with_max_concurrency(config.revision.max_concurrency);

    Ok(ReviewService::new(provider, publisher)
        .with_pipeline(pipeline)
        .with_max_file_size(config.document.max_file_size))
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let analyzer: Arc<dyn DocumentAnalyzer> = Arc::new(build_service(config)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let gateway = &config.gateway;
    GatewayServer::new(&gateway.bind, gateway.port, analyzer, shutdown_rx)?
        .with_auth(
            config
                .secrets
                .gateway_token
                .as_ref()
                .map(|token| token.expose().to_owned()),
        )
        .with_rate_limit(gateway.rate_limit)
        .with_max_body_size(gateway.max_body_size)
        .serve()
        .await?;
    Ok(())
}

fn upload_from_file(path: &Path, bytes: Vec<u8>) -> anyhow::Result<Upload> {
    let Some(content_type) = redliner_document::content_type_for_path(path) else {
        bail!(
            "unsupported file type for {}: use a .pdf or .txt file",
            path.display()
        );
    };
    let filename = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Upload {
        bytes,
        content_type: content_type.to_owned(),
        filename,
    })
}

async fn review_file(config: &Config, path: &Path) -> anyhow::Result<ReviewReport> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let upload = upload_from_file(path, bytes)?;
    let service = build_service(config)?;
    Ok(service.review(upload).await?)
}

fn print_report(report: &ReviewReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("Summary: {}", report.summary);
        println!("Issues document: {}", report.issues_doc_url);
        println!("Revised document: {}", report.modified_doc_url);
    }
    Ok(())
}
