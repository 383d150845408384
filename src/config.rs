//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup, validated, and then injected into
//! the renderer and export service. Nothing below the binaries reads the
//! environment on its own.
//!
//! ## Browser selection
//!
//! ```bash
//! # Managed hosting: fixed system Chromium with sandboxing flags
//! export BROWSER_ENV="hosted"
//!
//! # Developer machine: auto-detect the installed Chrome/Chromium
//! export BROWSER_ENV="local"
//!
//! # Either environment: explicit binary
//! export CHROME_PATH="/opt/google/chrome/chrome"
//! ```
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `BEHIND_PROXY` - Rate-limit on forwarded client IP (default: `false`)
//! - `RATE_LIMIT_PER_SECOND` / `RATE_LIMIT_BURST` - Export rate limit (default: 1 / 10)
//! - `BROWSER_NO_SANDBOX` - Pass sandboxing flags (default: `true` when hosted)
//! - `BROWSER_LAUNCH_TIMEOUT` - Seconds to wait for the browser (default: 20)
//! - `NAVIGATION_TIMEOUT` - Seconds for load, idle wait and print (default: 45)
//! - `NETWORK_IDLE_MS` - Quiet window in milliseconds (default: 500)
//! - `NETWORK_IDLE_MAX_INFLIGHT` - Requests tolerated while idle, 0..=2 (default: 0)
//! - `PDF_PAPER_FORMAT` - `a4`, `a3`, `letter` or `legal` (default: `a4`)
//! - `EXPORT_FILENAME` - Attachment filename (default: `neonest-data.pdf`)
//! - `EXPORT_MAX_CONCURRENT` - Browsers running at once (default: 4)
//! - `EXPORT_QUEUE_TIMEOUT` - Seconds to wait for a free slot (default: 10)
//! - `EXPORT_TIMEOUT` - Overall seconds per export (default: 80). Must cover
//!   launch, navigation and browser shutdown, see [`RendererSettings::render_budget`]

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::document::{DEFAULT_FILENAME, PaperFormat};

/// Chromium location used on managed hosting.
pub const HOSTED_CHROME_PATH: &str = "/usr/bin/chromium";

/// How long a browser gets to answer the close command, and again to exit,
/// before it is killed.
pub const BROWSER_EXIT_GRACE: Duration = Duration::from_secs(5);

/// Deployment environment that decides where the browser binary comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserEnvironment {
    /// Managed hosting with a fixed system Chromium.
    Hosted,
    /// Developer machine; the installed browser is auto-detected.
    #[default]
    Local,
}

impl FromStr for BrowserEnvironment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosted" | "production" => Ok(BrowserEnvironment::Hosted),
            "local" | "development" => Ok(BrowserEnvironment::Local),
            other => anyhow::bail!("BROWSER_ENV must be 'hosted' or 'local', got '{}'", other),
        }
    }
}

impl fmt::Display for BrowserEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserEnvironment::Hosted => f.write_str("hosted"),
            BrowserEnvironment::Local => f.write_str("local"),
        }
    }
}

/// Settings for launching the headless browser and printing pages.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub environment: BrowserEnvironment,
    /// Explicit executable; wins over the environment default.
    pub chrome_path: Option<PathBuf>,
    /// Adds `--no-sandbox` and `--disable-setuid-sandbox`.
    pub no_sandbox: bool,
    pub launch_timeout: Duration,
    /// Bounds navigation, the network-idle wait and printing together.
    pub navigation_timeout: Duration,
    pub network_idle_window: Duration,
    pub network_idle_max_inflight: usize,
    pub paper_format: PaperFormat,
}

impl RendererSettings {
    /// Defaults for the given environment.
    pub fn for_environment(environment: BrowserEnvironment) -> Self {
        Self {
            environment,
            chrome_path: None,
            no_sandbox: environment == BrowserEnvironment::Hosted,
            launch_timeout: Duration::from_secs(20),
            navigation_timeout: Duration::from_secs(45),
            network_idle_window: Duration::from_millis(500),
            network_idle_max_inflight: 0,
            paper_format: PaperFormat::A4,
        }
    }

    /// Longest a single render can take when every step runs into its
    /// timeout: launch, navigation and a close-then-kill shutdown.
    pub fn render_budget(&self) -> Duration {
        self.launch_timeout + self.navigation_timeout + BROWSER_EXIT_GRACE * 2
    }

    /// Resolves the executable to launch.
    ///
    /// `None` means the browser is auto-detected at launch time.
    pub fn executable(&self) -> Option<PathBuf> {
        if let Some(path) = &self.chrome_path {
            return Some(path.clone());
        }

        match self.environment {
            BrowserEnvironment::Hosted => Some(PathBuf::from(HOSTED_CHROME_PATH)),
            BrowserEnvironment::Local => None,
        }
    }

    fn from_env() -> Result<Self> {
        let environment = env::var("BROWSER_ENV")
            .ok()
            .map(|v| v.parse::<BrowserEnvironment>())
            .transpose()?
            .unwrap_or_default();

        let defaults = Self::for_environment(environment);

        let chrome_path = env::var("CHROME_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let no_sandbox = env::var("BROWSER_NO_SANDBOX")
            .map(|v| parse_bool(&v))
            .unwrap_or(defaults.no_sandbox);

        let paper_format = match env::var("PDF_PAPER_FORMAT") {
            Ok(v) => v.parse().context("Invalid PDF_PAPER_FORMAT")?,
            Err(_) => defaults.paper_format,
        };

        Ok(Self {
            environment,
            chrome_path,
            no_sandbox,
            launch_timeout: Duration::from_secs(env_or("BROWSER_LAUNCH_TIMEOUT", 20)),
            navigation_timeout: Duration::from_secs(env_or("NAVIGATION_TIMEOUT", 45)),
            network_idle_window: Duration::from_millis(env_or("NETWORK_IDLE_MS", 500)),
            network_idle_max_inflight: env_or("NETWORK_IDLE_MAX_INFLIGHT", 0),
            paper_format,
        })
    }
}

/// Settings for the export service wrapped around the renderer.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub filename: String,
    pub max_concurrent: usize,
    pub queue_timeout: Duration,
    pub export_timeout: Duration,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            max_concurrent: 4,
            queue_timeout: Duration::from_secs(10),
            export_timeout: Duration::from_secs(80),
        }
    }
}

impl ExportSettings {
    fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            filename: env::var("EXPORT_FILENAME").unwrap_or(defaults.filename),
            max_concurrent: env_or("EXPORT_MAX_CONCURRENT", defaults.max_concurrent),
            queue_timeout: Duration::from_secs(env_or("EXPORT_QUEUE_TIMEOUT", 10)),
            export_timeout: Duration::from_secs(env_or("EXPORT_TIMEOUT", 80)),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// When true, rate limiting reads client IP from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
    /// Seconds between replenished rate-limit tokens per client.
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub renderer: RendererSettings,
    pub export: ExportSettings,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let behind_proxy = env::var("BEHIND_PROXY")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        let renderer =
            RendererSettings::from_env().context("Failed to load browser configuration")?;

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            behind_proxy,
            rate_limit_per_second: env_or("RATE_LIMIT_PER_SECOND", 1),
            rate_limit_burst: env_or("RATE_LIMIT_BURST", 10),
            renderer,
            export: ExportSettings::from_env(),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - rate limit, concurrency, timeout or idle settings are out of range
    /// - the export filename is empty or contains path/header separators
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.rate_limit_per_second == 0 || self.rate_limit_burst == 0 {
            anyhow::bail!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be greater than 0");
        }

        if self.export.max_concurrent == 0 || self.export.max_concurrent > 64 {
            anyhow::bail!(
                "EXPORT_MAX_CONCURRENT must be between 1 and 64, got {}",
                self.export.max_concurrent
            );
        }

        if self.export.export_timeout.is_zero() || self.export.queue_timeout.is_zero() {
            anyhow::bail!("EXPORT_TIMEOUT and EXPORT_QUEUE_TIMEOUT must be greater than 0");
        }

        let filename = &self.export.filename;
        if filename.is_empty()
            || filename
                .chars()
                .any(|c| matches!(c, '/' | '\\' | '"' | ';') || c.is_control())
        {
            anyhow::bail!("EXPORT_FILENAME is not a valid filename: '{}'", filename);
        }

        let renderer = &self.renderer;
        if renderer.launch_timeout.is_zero() || renderer.navigation_timeout.is_zero() {
            anyhow::bail!("BROWSER_LAUNCH_TIMEOUT and NAVIGATION_TIMEOUT must be greater than 0");
        }

        if renderer.network_idle_max_inflight > 2 {
            anyhow::bail!(
                "NETWORK_IDLE_MAX_INFLIGHT must be between 0 and 2, got {}",
                renderer.network_idle_max_inflight
            );
        }

        if renderer.network_idle_window.is_zero() {
            anyhow::bail!("NETWORK_IDLE_MS must be greater than 0");
        }

        if renderer.render_budget() > self.export.export_timeout {
            anyhow::bail!(
                "EXPORT_TIMEOUT ({}s) must cover BROWSER_LAUNCH_TIMEOUT + NAVIGATION_TIMEOUT + browser shutdown ({}s)",
                self.export.export_timeout.as_secs(),
                renderer.render_budget().as_secs()
            );
        }

        Ok(())
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Browser environment: {}", self.renderer.environment);

        match self.renderer.executable() {
            Some(path) => tracing::info!("  Browser executable: {}", path.display()),
            None => tracing::info!("  Browser executable: auto-detect"),
        }

        tracing::info!("  Sandbox disabled: {}", self.renderer.no_sandbox);
        tracing::info!("  Paper format: {}", self.renderer.paper_format);
        tracing::info!(
            "  Network idle: <= {} in flight for {}ms",
            self.renderer.network_idle_max_inflight,
            self.renderer.network_idle_window.as_millis()
        );
        tracing::info!("  Max concurrent exports: {}", self.export.max_concurrent);
        tracing::info!("  Export timeout: {}s", self.export.export_timeout.as_secs());
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Parses an environment variable, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if parsing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
