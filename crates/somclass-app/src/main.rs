//! Somclass - Somali poetry/prose classification service.
//!
//! Loads the model once, then serves the HTTP API. A missing or broken model
//! does not stop the server: it starts in degraded mode and reports
//! service-unavailable for classification requests.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use directories::ProjectDirs;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use somclass_core::classifier::{self, EncodeOptions};
use somclass_core::{
    ClassificationPipeline, InputValidator, ModelHandle, PipelineConfig, ValidatorConfig,
};
use somclass_server::{AppState, Server, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};

/// Somclass - Somali poetry/prose classification API
#[derive(Parser, Debug)]
#[command(name = "somclass", version, about)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "SOMCLASS_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port to bind to
    #[arg(long, env = "SOMCLASS_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory holding model.onnx and tokenizer.json
    #[arg(long, env = "SOMCLASS_MODEL_DIR", default_value = "models/somberta")]
    model_dir: PathBuf,

    /// Normalized texts with fewer characters skip inference
    #[arg(long, env = "SOMCLASS_MIN_CHARS", default_value_t = 30)]
    min_chars: usize,

    /// Normalized texts with fewer words skip inference
    #[arg(long, env = "SOMCLASS_MIN_WORDS", default_value_t = 5)]
    min_words: usize,

    /// Minimum words before language identification runs
    #[arg(long, env = "SOMCLASS_LANGID_MIN_WORDS", default_value_t = 3)]
    langid_min_words: usize,

    /// Minimum characters before language identification runs
    #[arg(long, env = "SOMCLASS_LANGID_MIN_CHARS", default_value_t = 10)]
    langid_min_chars: usize,

    /// Maximum sequence length (tokens) passed to the model
    #[arg(long, env = "SOMCLASS_MAX_LENGTH", default_value_t = 512)]
    max_length: usize,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, env = "SOMCLASS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write logs to this directory (rotated daily)
    #[arg(long, env = "SOMCLASS_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Also write logs to the platform data directory
    #[arg(long)]
    file_log: bool,
}

/// Get the default logs directory path.
fn default_logs_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "somclass", "Somclass").map(|dirs| dirs.data_dir().join("logs"))
}

/// Initialize logging, optionally with file rotation.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("somclass={},warn", log_level)));

    let log_dir = args
        .log_dir
        .clone()
        .or_else(|| args.file_log.then(default_logs_dir).flatten());

    if let Some(log_dir) = log_dir {
        if std::fs::create_dir_all(&log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("somclass")
                .filename_suffix("log")
                .build(&log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(std::io::stdout))
                    .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                    .init();

                tracing::info!("Logging to {:?}", log_dir);
                return Some(guard);
            }
        }

        tracing_subscriber::fmt().with_env_filter(env_filter).init();
        tracing::warn!("File logging unavailable, using console only");
        return None;
    }

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    None
}

/// Builds the validator, attaching a language detector when compiled in.
fn build_validator(args: &Args) -> InputValidator {
    let config = ValidatorConfig {
        langid_min_words: args.langid_min_words,
        langid_min_chars: args.langid_min_chars,
        ..Default::default()
    };
    let validator = InputValidator::new(config);

    #[cfg(feature = "langid")]
    let validator = {
        tracing::info!("Loading language detector...");
        validator.with_detector(Arc::new(somclass_core::language::LinguaDetector::new()))
    };

    if !validator.has_detector() {
        tracing::info!("No language detector available, language check disabled");
    }
    validator
}

/// Tokenizer settings for every inference call.
fn encode_options(args: &Args) -> EncodeOptions {
    EncodeOptions {
        max_length: args.max_length,
        ..Default::default()
    }
}

/// Loads the model into a handle. Failure leaves the handle empty.
fn load_model(args: &Args) -> Arc<ModelHandle> {
    let handle = Arc::new(ModelHandle::empty());

    tracing::info!("Loading model from {:?}...", args.model_dir);
    match classifier::load_model(&args.model_dir, encode_options(args)) {
        Ok(model) => {
            handle.install(model);
            tracing::info!("Model loaded successfully");
        }
        Err(e) => {
            tracing::error!("Failed to load model: {}", e);
            tracing::warn!("Serving in degraded mode; classification requests will fail");
        }
    }

    handle
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args);

    tracing::info!("Starting Somali Text AI Classifier...");

    let model = load_model(&args);
    let pipeline_config = PipelineConfig {
        min_chars: args.min_chars,
        min_words: args.min_words,
        encode: encode_options(&args),
        ..Default::default()
    };
    let pipeline = ClassificationPipeline::new(build_validator(&args), model.clone(), pipeline_config);

    let server_config = ServerConfig::default()
        .with_host(args.host.clone())
        .with_port(args.port);
    let server = Server::new(server_config, AppState::new(pipeline))
        .context("failed to configure API server")?;

    let result = server.run().await.context("API server failed");

    model.teardown();
    result
}
