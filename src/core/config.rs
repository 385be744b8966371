use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub browser: BrowserConfig,
    pub poll: PollConfig,
    pub screenshot: ScreenshotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Total budget for resolving one field
    pub timeout_ms: u64,
    /// Sleep between poll ticks
    pub interval_ms: u64,
    /// One-time budget for the document-ready precondition
    pub page_ready_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    /// Directory failure artifacts are written to
    pub output_dir: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            poll: PollConfig::default(),
            screenshot: ScreenshotConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 720,
            args: vec![],
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 20_000,
            interval_ms: 250,
            page_ready_timeout_ms: 10_000,
        }
    }
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            output_dir: "artifacts".to_string(),
        }
    }
}

impl PollConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn page_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.page_ready_timeout_ms)
    }
}
