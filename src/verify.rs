use crate::core::{Driver, HarnessConfig};
use crate::errors::Result;
use crate::poll::{BoundedPoller, PollResult};
use crate::probe::ElementProbe;
use crate::selector::SelectorChain;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// The interaction to exercise once a field is located
#[derive(Debug, Clone)]
pub enum Interaction {
    /// Clear the field, type the text, read back the live value
    TypeText { text: String },
    /// Click the element and read back its checked state
    SelectRadio,
}

/// Logical description of one field: a name for error messages, the
/// fallback chain that locates it, and the interaction to perform.
#[derive(Debug, Clone)]
pub struct FieldExpectation {
    pub name: String,
    pub chain: SelectorChain,
    pub interaction: Interaction,
}

impl FieldExpectation {
    pub fn text_input(
        name: impl Into<String>,
        chain: SelectorChain,
        text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            chain,
            interaction: Interaction::TypeText { text: text.into() },
        }
    }

    pub fn radio(name: impl Into<String>, chain: SelectorChain) -> Self {
        Self {
            name: name.into(),
            chain,
            interaction: Interaction::SelectRadio,
        }
    }

    fn not_found_message(&self) -> String {
        match self.interaction {
            Interaction::TypeText { .. } => format!("{} field should be found", self.name),
            Interaction::SelectRadio => format!("{} radio button should be found", self.name),
        }
    }
}

/// One option of a mutually exclusive radio group
#[derive(Debug, Clone)]
pub struct RadioOption {
    pub name: String,
    pub chain: SelectorChain,
}

impl RadioOption {
    pub fn new(name: impl Into<String>, chain: SelectorChain) -> Self {
        Self {
            name: name.into(),
            chain,
        }
    }
}

/// A radio group checked as a whole: every option is resolved inside
/// one verification call, options are clicked in declared order, and
/// after the last click only the last option may report selected.
#[derive(Debug, Clone)]
pub struct RadioGroupExpectation {
    pub group: String,
    pub options: Vec<RadioOption>,
}

impl RadioGroupExpectation {
    pub fn new(group: impl Into<String>, options: Vec<RadioOption>) -> Self {
        Self {
            group: group.into(),
            options,
        }
    }
}

/// Immutable result record for one field check
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub passed: bool,
    pub field: String,
    pub message: Option<String>,
    pub observed: Option<String>,
    pub screenshot: Option<PathBuf>,
}

impl VerificationOutcome {
    fn pass(field: &str, observed: impl Into<String>) -> Self {
        Self {
            passed: true,
            field: field.to_string(),
            message: None,
            observed: Some(observed.into()),
            screenshot: None,
        }
    }

    fn fail(field: &str, message: String) -> Self {
        Self {
            passed: false,
            field: field.to_string(),
            message: Some(message),
            observed: None,
            screenshot: None,
        }
    }

    fn fail_observed(field: &str, message: String, observed: impl Into<String>) -> Self {
        Self {
            observed: Some(observed.into()),
            ..Self::fail(field, message)
        }
    }

    pub fn with_screenshot(mut self, screenshot: Option<PathBuf>) -> Self {
        self.screenshot = screenshot;
        self
    }
}

/// Locates a field under a bounded poll budget, exercises it, and
/// compares observed against expected state.
///
/// Assumes exclusive access to the driver's session for the duration
/// of each call; a poll timeout is a failed outcome, not an error, and
/// is never retried internally.
pub struct FieldVerifier<'a, D: Driver> {
    driver: &'a D,
    poller: BoundedPoller,
}

impl<'a, D: Driver> FieldVerifier<'a, D> {
    pub fn new(driver: &'a D, config: &HarnessConfig) -> Self {
        Self {
            driver,
            poller: BoundedPoller::from_config(&config.poll),
        }
    }

    pub fn with_poller(driver: &'a D, poller: BoundedPoller) -> Self {
        Self { driver, poller }
    }

    /// Resolve one field and exercise its expected interaction.
    ///
    /// Driver protocol errors propagate; everything the harness can
    /// classify (not found in time, observed != expected) comes back
    /// as an outcome.
    pub async fn verify_field(&self, expectation: &FieldExpectation) -> Result<VerificationOutcome> {
        debug!("verifying field '{}'", expectation.name);
        let probe = ElementProbe::new(expectation.chain.clone());
        let element = match probe.resolve_within(self.driver, &self.poller).await? {
            PollResult::Found(element) => element,
            _ => {
                info!(
                    "field '{}' not found within {:?}",
                    expectation.name,
                    self.poller.timeout()
                );
                return Ok(VerificationOutcome::fail(
                    &expectation.name,
                    expectation.not_found_message(),
                ));
            }
        };

        match &expectation.interaction {
            Interaction::TypeText { text } => {
                self.driver.clear(&element).await?;
                self.driver.send_text(&element, text).await?;
                let observed = self
                    .driver
                    .get_attribute(&element, "value")
                    .await?
                    .unwrap_or_default();
                if observed == *text {
                    Ok(VerificationOutcome::pass(&expectation.name, observed))
                } else {
                    Ok(VerificationOutcome::fail_observed(
                        &expectation.name,
                        format!(
                            "{} field should accept input: expected {:?}, observed {:?}",
                            expectation.name, text, observed
                        ),
                        observed,
                    ))
                }
            }
            Interaction::SelectRadio => {
                self.driver.click(&element).await?;
                let selected = self.driver.is_selected(&element).await?;
                if selected {
                    Ok(VerificationOutcome::pass(&expectation.name, "selected"))
                } else {
                    Ok(VerificationOutcome::fail(
                        &expectation.name,
                        format!("{} radio button should be selectable", expectation.name),
                    ))
                }
            }
        }
    }

    /// Verify a radio group's selection behavior including mutual
    /// exclusivity.
    ///
    /// All option handles are resolved up front and retained for the
    /// whole call, since exclusivity is a cross-element invariant: the
    /// earlier options must be re-read after the last click.
    pub async fn verify_radio_group(
        &self,
        expectation: &RadioGroupExpectation,
    ) -> Result<VerificationOutcome> {
        debug!("verifying radio group '{}'", expectation.group);
        let mut handles = Vec::with_capacity(expectation.options.len());
        for option in &expectation.options {
            let probe = ElementProbe::new(option.chain.clone());
            match probe.resolve_within(self.driver, &self.poller).await? {
                PollResult::Found(element) => handles.push(element),
                _ => {
                    return Ok(VerificationOutcome::fail(
                        &expectation.group,
                        format!("{} radio button should be found", option.name),
                    ));
                }
            }
        }

        for (option, element) in expectation.options.iter().zip(&handles) {
            self.driver.click(element).await?;
            if !self.driver.is_selected(element).await? {
                return Ok(VerificationOutcome::fail(
                    &expectation.group,
                    format!("{} radio button should be selectable", option.name),
                ));
            }
        }

        // After the last click every earlier option must have dropped
        // its selection
        let (last, earlier) = match expectation.options.split_last() {
            Some(split) => split,
            None => {
                return Ok(VerificationOutcome::fail(
                    &expectation.group,
                    format!("{} radio group has no options", expectation.group),
                ));
            }
        };
        for (option, element) in earlier.iter().zip(&handles) {
            if self.driver.is_selected(element).await? {
                return Ok(VerificationOutcome::fail(
                    &expectation.group,
                    format!(
                        "{} radio button should be deselected when {} is selected",
                        option.name, last.name
                    ),
                ));
            }
        }

        Ok(VerificationOutcome::pass(
            &expectation.group,
            format!("{} selected", last.name),
        ))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::VerificationOutcome;

    pub fn passed_outcome(field: &str) -> VerificationOutcome {
        VerificationOutcome::pass(field, "ok")
    }

    pub fn failed_outcome(field: &str) -> VerificationOutcome {
        VerificationOutcome::fail(field, format!("{} field should be found", field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;
    use crate::testing::MockDriver;
    use std::time::Duration;

    fn fast_verifier<'a>(driver: &'a MockDriver) -> FieldVerifier<'a, MockDriver> {
        FieldVerifier::with_poller(
            driver,
            BoundedPoller::new(Duration::from_millis(100), Duration::from_millis(10)),
        )
    }

    #[tokio::test]
    async fn text_input_round_trips_its_value() {
        let driver = MockDriver::new();
        driver.add_text_input("first-name", &["input[name='firstName']"]);

        let expectation = FieldExpectation::text_input(
            "First Name",
            SelectorChain::new(Selector::css("input[name='firstName']")),
            "John",
        );
        let outcome = fast_verifier(&driver).verify_field(&expectation).await.unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.observed.as_deref(), Some("John"));
        assert_eq!(driver.value_of("first-name"), "John");
    }

    #[tokio::test]
    async fn text_input_verification_is_idempotent() {
        let driver = MockDriver::new();
        driver.add_text_input("first-name", &["input[name='firstName']"]);

        let expectation = FieldExpectation::text_input(
            "First Name",
            SelectorChain::new(Selector::css("input[name='firstName']")),
            "John",
        );
        let verifier = fast_verifier(&driver);
        let first = verifier.verify_field(&expectation).await.unwrap();
        let second = verifier.verify_field(&expectation).await.unwrap();
        assert!(first.passed && second.passed);
        assert_eq!(first.observed, second.observed);
    }

    #[tokio::test]
    async fn fallback_selector_still_verifies() {
        let driver = MockDriver::new();
        driver.add_text_input("email", &["//input[contains(@placeholder, 'Email')]"]);

        let expectation = FieldExpectation::text_input(
            "Email",
            SelectorChain::new(Selector::css("input[type='email']"))
                .or(Selector::xpath("//input[contains(@placeholder, 'Email')]")),
            "test@example.com",
        );
        let outcome = fast_verifier(&driver).verify_field(&expectation).await.unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.observed.as_deref(), Some("test@example.com"));
    }

    #[tokio::test]
    async fn missing_field_times_out_with_named_message() {
        let driver = MockDriver::new();
        let expectation = FieldExpectation::radio(
            "Male",
            SelectorChain::new(Selector::css("input[value='Male']")),
        );
        let outcome = fast_verifier(&driver).verify_field(&expectation).await.unwrap();
        assert!(!outcome.passed);
        assert!(outcome
            .message
            .as_deref()
            .unwrap()
            .contains("Male radio button should be found"));
    }

    #[tokio::test]
    async fn rejected_input_reports_observed_value() {
        let driver = MockDriver::new();
        driver.add_text_input("stubborn", &["input[name='stubborn']"]);
        driver.make_read_only("stubborn");

        let expectation = FieldExpectation::text_input(
            "Stubborn",
            SelectorChain::new(Selector::css("input[name='stubborn']")),
            "John",
        );
        let outcome = fast_verifier(&driver).verify_field(&expectation).await.unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.observed.as_deref(), Some(""));
        assert!(outcome.message.as_deref().unwrap().contains("should accept input"));
    }

    #[tokio::test]
    async fn radio_group_enforces_mutual_exclusivity() {
        let driver = MockDriver::new();
        driver.add_radio("male", &["input[value='Male']"], "gender");
        driver.add_radio("female", &["input[value='Female']"], "gender");

        let expectation = RadioGroupExpectation::new(
            "Gender",
            vec![
                RadioOption::new(
                    "Male",
                    SelectorChain::new(Selector::css("input[value='Male']")),
                ),
                RadioOption::new(
                    "Female",
                    SelectorChain::new(Selector::css("input[value='Female']")),
                ),
            ],
        );
        let outcome = fast_verifier(&driver)
            .verify_radio_group(&expectation)
            .await
            .unwrap();
        assert!(outcome.passed);
        assert!(!driver.is_selected_id("male"));
        assert!(driver.is_selected_id("female"));
    }

    #[tokio::test]
    async fn radio_group_fails_when_exclusivity_is_broken() {
        let driver = MockDriver::new();
        // Distinct groups: selecting one does not clear the other
        driver.add_radio("male", &["input[value='Male']"], "gender-a");
        driver.add_radio("female", &["input[value='Female']"], "gender-b");

        let expectation = RadioGroupExpectation::new(
            "Gender",
            vec![
                RadioOption::new(
                    "Male",
                    SelectorChain::new(Selector::css("input[value='Male']")),
                ),
                RadioOption::new(
                    "Female",
                    SelectorChain::new(Selector::css("input[value='Female']")),
                ),
            ],
        );
        let outcome = fast_verifier(&driver)
            .verify_radio_group(&expectation)
            .await
            .unwrap();
        assert!(!outcome.passed);
        assert!(outcome
            .message
            .as_deref()
            .unwrap()
            .contains("Male radio button should be deselected when Female is selected"));
    }

    #[tokio::test]
    async fn radio_group_names_the_missing_option() {
        let driver = MockDriver::new();
        driver.add_radio("male", &["input[value='Male']"], "gender");

        let expectation = RadioGroupExpectation::new(
            "Gender",
            vec![
                RadioOption::new(
                    "Male",
                    SelectorChain::new(Selector::css("input[value='Male']")),
                ),
                RadioOption::new(
                    "Female",
                    SelectorChain::new(Selector::css("input[value='Female']")),
                ),
            ],
        );
        let outcome = fast_verifier(&driver)
            .verify_radio_group(&expectation)
            .await
            .unwrap();
        assert!(!outcome.passed);
        assert!(outcome
            .message
            .as_deref()
            .unwrap()
            .contains("Female radio button should be found"));
    }

    #[tokio::test]
    async fn driver_errors_propagate_out_of_verification() {
        let driver = MockDriver::new();
        driver.fail_find_on("input[[broken", "Unexpected token in selector");

        let expectation = FieldExpectation::text_input(
            "Broken",
            SelectorChain::new(Selector::css("input[[broken")),
            "x",
        );
        let err = fast_verifier(&driver).verify_field(&expectation).await.unwrap_err();
        assert!(matches!(err, crate::errors::HarnessError::JavaScriptFailed(_)));
    }
}
