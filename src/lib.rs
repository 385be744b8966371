pub mod core;
pub mod driver;
pub mod errors;
pub mod poll;
pub mod probe;
pub mod report;
pub mod selector;
pub mod testing;
pub mod verify;

pub use self::core::{BrowserConfig, Driver, HarnessConfig, PollConfig, ScreenshotConfig};
pub use driver::{ChromeDriver, ChromeElement};
pub use errors::{HarnessError, Result};
pub use poll::{BoundedPoller, PollResult};
pub use probe::{wait_for_page_ready, ElementProbe};
pub use report::FailureReporter;
pub use selector::{Selector, SelectorChain};
pub use verify::{
    FieldExpectation, FieldVerifier, Interaction, RadioGroupExpectation, RadioOption,
    VerificationOutcome,
};
