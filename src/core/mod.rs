pub mod config;
pub mod driver;

pub use config::{BrowserConfig, HarnessConfig, PollConfig, ScreenshotConfig};
pub use driver::Driver;
