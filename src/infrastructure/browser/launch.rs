//! Browser launch configuration.

use std::path::Path;

use chromiumoxide::browser::BrowserConfig;

use crate::config::RendererSettings;
use crate::domain::renderer::RenderError;

/// Flags that turn off the Chromium sandbox for container hosts.
pub const SANDBOX_ARGS: [&str; 2] = ["--no-sandbox", "--disable-setuid-sandbox"];

/// Flags passed to every launch.
pub const BASE_ARGS: [&str; 3] = [
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--hide-scrollbars",
];

/// Extra command-line flags for the given settings.
pub fn launch_args(settings: &RendererSettings) -> Vec<&'static str> {
    let mut args = BASE_ARGS.to_vec();
    if settings.no_sandbox {
        args.extend(SANDBOX_ARGS);
    }
    args
}

/// Builds the launch configuration for one browser process.
///
/// `profile_dir` must be unique per process; concurrent browsers sharing a
/// profile block on Chromium's singleton lock.
pub fn browser_config(
    settings: &RendererSettings,
    profile_dir: &Path,
) -> Result<BrowserConfig, RenderError> {
    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .user_data_dir(profile_dir)
        .launch_timeout(settings.launch_timeout)
        .request_timeout(settings.navigation_timeout)
        .args(launch_args(settings));

    if let Some(executable) = settings.executable() {
        builder = builder.chrome_executable(executable);
    }

    builder.build().map_err(RenderError::Launch)
}
