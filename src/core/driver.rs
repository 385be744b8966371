use crate::errors::Result;
use crate::selector::Selector;
use async_trait::async_trait;
use serde_json::Value;

/// The browser collaborator the harness runs against.
///
/// One implementation drives one browser session; the harness assumes
/// exclusive access to that session for the duration of a verification
/// call. Element handles are only valid for immediate, synchronous use
/// within the poll tick that produced them. The DOM node behind a
/// handle may be replaced by a re-render at any time, so every tick
/// re-resolves from scratch.
#[async_trait]
pub trait Driver: Send + Sync {
    type Element: Send + Sync;

    /// Navigate the session to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Locate a single element.
    ///
    /// Returns `HarnessError::ElementNotFound` when nothing matches;
    /// any other error means the lookup itself is broken (malformed
    /// selector, lost session) and must not be retried.
    async fn find(&self, selector: &Selector) -> Result<Self::Element>;

    /// Whether the element is rendered (non-zero size, not hidden)
    async fn is_displayed(&self, element: &Self::Element) -> Result<bool>;

    /// Whether a radio/checkbox element is currently checked
    async fn is_selected(&self, element: &Self::Element) -> Result<bool>;

    /// Clear the current value of an input element
    async fn clear(&self, element: &Self::Element) -> Result<()>;

    /// Type text into an input element
    async fn send_text(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// Click an element
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Read an attribute; `value` reads the live property
    async fn get_attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Execute JavaScript in the page
    async fn execute_script(&self, script: &str) -> Result<Value>;

    /// Capture a screenshot of the current page
    async fn take_screenshot(&self) -> Result<Vec<u8>>;
}
