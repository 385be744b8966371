use crate::core::{Driver, ScreenshotConfig};
use crate::errors::{HarnessError, Result};
use crate::verify::VerificationOutcome;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Captures a diagnostic screenshot when a verification sequence dies.
///
/// Capture is best-effort: it is attempted exactly once per failure
/// and a capture error is logged, never allowed to replace the error
/// that triggered it.
pub struct FailureReporter {
    output_dir: PathBuf,
}

impl FailureReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &ScreenshotConfig) -> Self {
        Self::new(&config.output_dir)
    }

    /// Run a verification sequence; on error, capture a screenshot and
    /// re-raise a wrapping error that preserves the original message
    /// and references the artifact.
    pub async fn run<D, T, Fut>(&self, driver: &D, operation: Fut) -> Result<T>
    where
        D: Driver,
        Fut: Future<Output = Result<T>>,
    {
        match operation.await {
            Ok(value) => Ok(value),
            Err(err) => {
                let screenshot = self.capture(driver).await;
                Err(HarnessError::VerificationAborted {
                    message: err.to_string(),
                    screenshot,
                })
            }
        }
    }

    /// Attach a failure screenshot to an already-failed outcome; a
    /// passed outcome is returned untouched.
    pub async fn annotate<D: Driver>(
        &self,
        driver: &D,
        outcome: VerificationOutcome,
    ) -> VerificationOutcome {
        if outcome.passed {
            return outcome;
        }
        let screenshot = self.capture(driver).await;
        outcome.with_screenshot(screenshot)
    }

    /// Best-effort screenshot capture. Returns the artifact path, or
    /// `None` when the capture or the write failed.
    pub async fn capture<D: Driver>(&self, driver: &D) -> Option<PathBuf> {
        let bytes = match driver.take_screenshot().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("diagnostic screenshot capture failed: {}", err);
                return None;
            }
        };

        let file_name = format!(
            "failure-{}.png",
            chrono::Utc::now().format("%Y%m%d-%H%M%S%.3f")
        );
        let path = self.output_dir.join(file_name);
        match write_artifact(&path, &bytes).await {
            Ok(()) => {
                info!("failure screenshot written to {}", path.display());
                Some(path)
            }
            Err(err) => {
                warn!(
                    "could not persist failure screenshot to {}: {}",
                    path.display(),
                    err
                );
                None
            }
        }
    }

    /// Screenshot as base64, for embedding in reports
    pub async fn take_base64<D: Driver>(&self, driver: &D) -> Result<String> {
        let bytes = driver.take_screenshot().await?;
        Ok(base64::encode(bytes))
    }
}

async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDriver;

    fn temp_reporter() -> (FailureReporter, PathBuf) {
        let dir = std::env::temp_dir().join(format!("fieldprobe-{}", uuid::Uuid::new_v4()));
        (FailureReporter::new(&dir), dir)
    }

    #[tokio::test]
    async fn success_passes_through_without_capture() {
        let driver = MockDriver::new();
        let (reporter, _dir) = temp_reporter();
        let value = reporter.run(&driver, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(driver.screenshot_attempts(), 0);
    }

    #[tokio::test]
    async fn failure_captures_once_and_preserves_the_original_message() {
        let driver = MockDriver::new();
        let (reporter, dir) = temp_reporter();

        let err = reporter
            .run::<_, (), _>(&driver, async {
                Err(HarnessError::JavaScriptFailed("session lost".to_string()))
            })
            .await
            .unwrap_err();

        assert_eq!(driver.screenshot_attempts(), 1);
        assert!(err.to_string().contains("session lost"));
        match err {
            HarnessError::VerificationAborted { screenshot, .. } => {
                let path = screenshot.expect("artifact path");
                assert!(path.starts_with(&dir));
                assert!(path.exists());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn capture_failure_never_masks_the_original_error() {
        let driver = MockDriver::new();
        driver.fail_screenshots();
        let (reporter, _dir) = temp_reporter();

        let err = reporter
            .run::<_, (), _>(&driver, async {
                Err(HarnessError::NavigationFailed("tab crashed".to_string()))
            })
            .await
            .unwrap_err();

        assert_eq!(driver.screenshot_attempts(), 1);
        assert!(err.to_string().contains("tab crashed"));
        match err {
            HarnessError::VerificationAborted { screenshot, .. } => assert!(screenshot.is_none()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn annotate_attaches_a_screenshot_only_to_failures() {
        let driver = MockDriver::new();
        let (reporter, _dir) = temp_reporter();

        let failed = crate::verify::test_support::failed_outcome("Email");
        let annotated = reporter.annotate(&driver, failed).await;
        assert!(annotated.screenshot.is_some());
        assert_eq!(driver.screenshot_attempts(), 1);

        let passed = crate::verify::test_support::passed_outcome("Email");
        let annotated = reporter.annotate(&driver, passed).await;
        assert!(annotated.screenshot.is_none());
        assert_eq!(driver.screenshot_attempts(), 1);
    }
}
