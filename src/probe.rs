use crate::core::Driver;
use crate::errors::{HarnessError, Result};
use crate::poll::{BoundedPoller, PollResult};
use crate::selector::SelectorChain;
use std::time::Duration;
use tracing::debug;

const PAGE_READY_INTERVAL: Duration = Duration::from_millis(100);

/// Adapts a selector chain into a probe the poller can drive.
///
/// An exhausted chain becomes `Pending` (retry next tick); anything
/// the chain treats as fatal still propagates and aborts the poll.
/// Each tick re-runs the whole chain from scratch, so a node replaced
/// by a re-render between ticks is picked up fresh.
pub struct ElementProbe {
    chain: SelectorChain,
}

impl ElementProbe {
    pub fn new(chain: SelectorChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &SelectorChain {
        &self.chain
    }

    /// One poll tick: run the chain once
    pub async fn tick<D: Driver>(&self, driver: &D) -> Result<PollResult<D::Element>> {
        match self.chain.resolve(driver).await? {
            Some(element) => Ok(PollResult::Found(element)),
            None => Ok(PollResult::Pending),
        }
    }

    /// Drive the probe under a poller until found or the budget runs out
    pub async fn resolve_within<D: Driver>(
        &self,
        driver: &D,
        poller: &BoundedPoller,
    ) -> Result<PollResult<D::Element>> {
        poller.poll(|| self.tick(driver)).await
    }
}

/// Block until `document.readyState` reports `complete`.
///
/// One-time precondition before the first field poll, not part of the
/// per-tick loop.
pub async fn wait_for_page_ready<D: Driver>(driver: &D, budget: Duration) -> Result<()> {
    let poller = BoundedPoller::new(budget, PAGE_READY_INTERVAL);
    let outcome = poller
        .poll(move || async move {
            let state = driver.execute_script("document.readyState").await?;
            if state.as_str() == Some("complete") {
                Ok(PollResult::Found(()))
            } else {
                debug!("document.readyState = {}, waiting", state);
                Ok(PollResult::Pending)
            }
        })
        .await?;

    match outcome {
        PollResult::Found(()) => Ok(()),
        _ => Err(HarnessError::Timeout(format!(
            "page did not reach readyState 'complete' within {:?}",
            budget
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;
    use crate::testing::MockDriver;
    use serde_json::json;

    fn fast_poller() -> BoundedPoller {
        BoundedPoller::new(Duration::from_millis(100), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn tick_maps_exhausted_chain_to_pending() {
        let driver = MockDriver::new();
        let probe = ElementProbe::new(SelectorChain::new(Selector::css("input[value='Male']")));
        assert_eq!(
            probe.tick(&driver).await.unwrap(),
            PollResult::<_>::Pending
        );
    }

    #[tokio::test]
    async fn late_rendered_element_is_found_on_a_later_tick() {
        let driver = MockDriver::new();
        driver.add_text_input("slow", &["input[name='slow']"]);
        driver.appears_after_find_calls("slow", 3);

        let probe = ElementProbe::new(SelectorChain::new(Selector::css("input[name='slow']")));
        let result = probe.resolve_within(&driver, &fast_poller()).await.unwrap();
        assert!(result.is_found());
        assert!(driver.find_calls("input[name='slow']") >= 4);
    }

    #[tokio::test]
    async fn element_that_never_appears_times_out() {
        let driver = MockDriver::new();
        let probe = ElementProbe::new(SelectorChain::new(Selector::css("input[name='ghost']")));
        let result = probe.resolve_within(&driver, &fast_poller()).await.unwrap();
        assert_eq!(result, PollResult::TimedOut);
    }

    #[tokio::test]
    async fn page_ready_completes_when_document_is_complete() {
        let driver = MockDriver::new();
        driver.set_script_result("document.readyState", json!("complete"));
        wait_for_page_ready(&driver, Duration::from_millis(100))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn page_ready_times_out_while_loading() {
        let driver = MockDriver::new();
        driver.set_script_result("document.readyState", json!("loading"));
        let err = wait_for_page_ready(&driver, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::Timeout(_)));
    }
}
