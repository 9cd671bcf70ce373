// Browser launcher
// Opens the served URL with the platform's default handler

use tokio::process::Command;

use crate::logger;

#[cfg(target_os = "macos")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    // Empty title argument, otherwise `start` treats the URL as one
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

/// Open `url` in the default browser. Failure is logged, never fatal.
pub async fn open_browser(url: &str) {
    match opener(url).status().await {
        Ok(status) if status.success() => tracing::debug!(url, "browser opened"),
        Ok(status) => logger::log_warning(&format!("Browser opener exited with {status}")),
        Err(e) => logger::log_warning(&format!("Failed to open browser for {url}: {e}")),
    }
}
