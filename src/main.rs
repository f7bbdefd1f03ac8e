use clap::{Parser, ValueEnum};
use skillmatch_api::RestApi;
use skillmatch_catalog::{CatalogLoader, SampleQuestionBook};
use skillmatch_core::{Encoder, RankOptions, RecommendationService, ServiceConfig};
use skillmatch_encoder::{HashingEncoder, OllamaConfig, OllamaEncoder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const OLLAMA_DEFAULT_DIMENSION: usize = 384;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EncoderKind {
    /// Offline feature hashing of words and character trigrams
    Hash,
    /// Sentence embeddings from an Ollama server
    Ollama,
}

/// Semantic assessment recommender
#[derive(Parser, Debug)]
#[command(name = "skillmatch")]
#[command(about = "Recommends assessments for a job description", long_about = None)]
struct Args {
    /// Catalog file (.csv or .json)
    #[arg(short, long)]
    catalog: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Text encoder backend
    #[arg(long, value_enum, default_value_t = EncoderKind::Hash)]
    encoder: EncoderKind,

    /// Embedding dimension (defaults to 2048 for hash, 384 for ollama)
    #[arg(long)]
    dimension: Option<usize>,

    /// Ollama server URL
    #[arg(long, default_value = "http://localhost:11434")]
    ollama_url: String,

    /// Ollama embedding model
    #[arg(long, default_value = "all-minilm")]
    ollama_model: String,

    /// Sample questions JSON file (builtin question sets otherwise)
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Results returned when a request does not specify top_n
    #[arg(long, default_value_t = 5)]
    top_n: usize,

    /// Per-query encoder deadline in milliseconds
    #[arg(long, default_value_t = 30_000)]
    encode_timeout_ms: u64,

    /// Deadline for embedding the catalog at start-up, in seconds
    #[arg(long, default_value_t = 300)]
    build_timeout_secs: u64,

    /// Maximum simultaneous encoder calls
    #[arg(long)]
    max_concurrent_encodes: Option<usize>,

    /// Drop results whose embedding is at least this similar to a higher-ranked one
    #[arg(long)]
    dedup_threshold: Option<f32>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn build_encoder(args: &Args) -> anyhow::Result<Arc<dyn Encoder>> {
    let encoder: Arc<dyn Encoder> = match args.encoder {
        EncoderKind::Hash => {
            let mut builder = HashingEncoder::builder();
            if let Some(dim) = args.dimension {
                builder = builder.dimension(dim);
            }
            Arc::new(builder.build()?)
        }
        EncoderKind::Ollama => Arc::new(OllamaEncoder::new(OllamaConfig {
            base_url: args.ollama_url.clone(),
            model: args.ollama_model.clone(),
            dimension: args.dimension.unwrap_or(OLLAMA_DEFAULT_DIMENSION),
            timeout: Duration::from_millis(args.encode_timeout_ms),
            ..OllamaConfig::default()
        })?),
    };
    Ok(encoder)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting SkillMatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("HTTP API port: {}", args.http_port);

    if args.top_n == 0 {
        anyhow::bail!("--top-n must be at least 1");
    }

    let items = CatalogLoader::load(&args.catalog)?;
    let samples = match &args.samples {
        Some(path) => SampleQuestionBook::from_json_file(path)?,
        None => SampleQuestionBook::builtin(),
    };
    info!("Sample question sets: {}", samples.len());

    let encoder = build_encoder(&args)?;
    info!("Encoder: {} ({} dimensions)", encoder.model_name(), encoder.dimension());

    let config = ServiceConfig {
        default_top_n: args.top_n,
        encode_timeout: Duration::from_millis(args.encode_timeout_ms),
        build_timeout: Duration::from_secs(args.build_timeout_secs),
        max_concurrent_encodes: args.max_concurrent_encodes,
        rank: RankOptions {
            dedup_threshold: args.dedup_threshold,
            ..RankOptions::default()
        },
    };
    let service = Arc::new(RecommendationService::start(items, encoder, config).await?);

    let service_http = service.clone();
    let samples = Arc::new(samples);
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || -> std::io::Result<()> {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(RestApi::start(service_http, samples, http_port))
    });
    let mut http_task = tokio::task::spawn_blocking(move || http_handle.join());

    info!("SkillMatch started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    let outcome = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            // actix stops on the same signal; give it a moment to release the service
            match tokio::time::timeout(Duration::from_secs(10), &mut http_task).await {
                Ok(joined) => server_outcome(joined?),
                Err(_) => {
                    warn!("HTTP server did not stop within 10s");
                    Ok(())
                }
            }
        }
        joined = &mut http_task => server_outcome(joined?),
    };

    info!("Shutting down...");
    match Arc::try_unwrap(service) {
        Ok(service) => service.shutdown(),
        Err(_) => warn!("Recommendation service still in use at exit"),
    }
    outcome
}

/// Turn the HTTP thread's exit into the process result
fn server_outcome(joined: std::thread::Result<std::io::Result<()>>) -> anyhow::Result<()> {
    match joined {
        Ok(Ok(())) => {
            info!("HTTP server stopped");
            Ok(())
        }
        Ok(Err(e)) => {
            error!("HTTP server error: {}", e);
            Err(anyhow::Error::new(e).context("HTTP server failed"))
        }
        Err(_) => {
            error!("HTTP server thread panicked");
            Err(anyhow::anyhow!("HTTP server thread panicked"))
        }
    }
}
