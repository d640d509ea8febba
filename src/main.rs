use dotenvy::dotenv;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};
use unsplash_relay_bot::bot::runner::run_bot;
use unsplash_relay_bot::config::{ProviderConfig, Settings};

/// Secrets that must never reach the log output, with their replacements
const MASK_RULES: &[(&str, &str)] = &[
    // Token inside a Bot API URL
    (r"(https?://[^/]+/bot)[0-9]+:[A-Za-z0-9_-]+", "${1}[TELEGRAM_TOKEN]"),
    (r"bot[0-9]{8,10}:[A-Za-z0-9_-]+", "bot[TELEGRAM_TOKEN]"),
    (r"[0-9]{8,10}:[A-Za-z0-9_-]{35}", "[TELEGRAM_TOKEN]"),
    (r"client_id=[^\s&]+", "client_id=[MASKED]"),
    (r"UNSPLASH_ACCESS_KEY=[^\s&]+", "UNSPLASH_ACCESS_KEY=[MASKED]"),
];

/// Compiled [`MASK_RULES`], applied in order
struct SecretFilter {
    rules: Vec<(Regex, &'static str)>,
}

impl SecretFilter {
    fn new() -> Result<Self, regex::Error> {
        let rules = MASK_RULES
            .iter()
            .map(|&(pattern, replacement)| Regex::new(pattern).map(|regex| (regex, replacement)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    fn mask(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |text, (regex, replacement)| {
                regex.replace_all(&text, *replacement).into_owned()
            })
    }
}

/// Writer that masks secrets in every formatted log line
struct MaskedWriter<W: Write> {
    inner: W,
    filter: Arc<SecretFilter>,
}

impl<W: Write> Write for MaskedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let masked = self.filter.mask(&String::from_utf8_lossy(buf));
        self.inner.write_all(masked.as_bytes())?;
        // The caller's bytes are consumed even if the masked text is shorter
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Stderr sink for the fmt layer
struct MaskedStderr(Arc<SecretFilter>);

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for MaskedStderr {
    type Writer = MaskedWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskedWriter {
            inner: io::stderr(),
            filter: Arc::clone(&self.0),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Compile before logging starts so nothing is written unmasked
    let filter = Arc::new(SecretFilter::new().map_err(|e| {
        eprintln!("Failed to compile secret masks: {e}");
        e
    })?);

    init_logging(filter);

    info!("Starting Unsplash relay bot...");

    let settings = init_settings();
    let provider_config = init_provider_config(&settings);

    if let Err(e) = run_bot(settings, provider_config).await {
        error!("Bot stopped with error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(secrets: Arc<SecretFilter>) {

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let filter = if debug_mode {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "unsplash_relay_bot=info,teloxide=info,hyper=warn,h2=error,reqwest=warn,tokio=warn,tower=warn,axum=warn",
            )
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(MaskedStderr(secrets)))
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_provider_config(settings: &Settings) -> Arc<ProviderConfig> {
    match ProviderConfig::from_file(&settings.unsplash_config_path) {
        Ok(c) => {
            info!(
                "Unsplash configuration loaded from {}.",
                settings.unsplash_config_path
            );
            Arc::new(c)
        }
        Err(e) => {
            error!(
                "Failed to load Unsplash configuration from {}: {}",
                settings.unsplash_config_path, e
            );
            std::process::exit(1);
        }
    }
}
