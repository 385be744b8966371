use fieldprobe::{
    wait_for_page_ready, ChromeDriver, FailureReporter, FieldExpectation, FieldVerifier,
    Driver, HarnessConfig, RadioGroupExpectation, RadioOption, Selector, SelectorChain,
};
use tracing::{error, info};

const PRACTICE_FORM_URL: &str = "https://app.cloudqa.io/home/AutomationPracticeForm";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = HarnessConfig::default();

    info!("Launching Chrome");
    let driver = ChromeDriver::launch(&config)?;

    info!("Navigating to {}", PRACTICE_FORM_URL);
    driver.navigate(PRACTICE_FORM_URL).await?;
    wait_for_page_ready(&driver, config.poll.page_ready_timeout()).await?;

    let verifier = FieldVerifier::new(&driver, &config);
    let reporter = FailureReporter::from_config(&config.screenshot);

    let first_name = FieldExpectation::text_input(
        "First Name",
        SelectorChain::new(Selector::css("input[name='firstName']"))
            .or(Selector::css("input[type='text']"))
            .or(Selector::xpath("//input[contains(@placeholder, 'First Name')]")),
        "John",
    );

    let email = FieldExpectation::text_input(
        "Email",
        SelectorChain::new(Selector::css("input[type='email']"))
            .or(Selector::xpath("//input[contains(@placeholder, 'Email')]")),
        "test@example.com",
    );

    let gender = RadioGroupExpectation::new(
        "Gender",
        vec![
            RadioOption::new(
                "Male",
                SelectorChain::new(Selector::css("input[value='Male']"))
                    .or(Selector::xpath("//input[@type='radio' and @value='Male']")),
            ),
            RadioOption::new(
                "Female",
                SelectorChain::new(Selector::css("input[value='Female']"))
                    .or(Selector::xpath("//input[@type='radio' and @value='Female']")),
            ),
        ],
    );

    let outcomes = reporter
        .run(&driver, async {
            let mut outcomes = Vec::new();
            outcomes.push(verifier.verify_field(&first_name).await?);
            outcomes.push(verifier.verify_field(&email).await?);
            outcomes.push(verifier.verify_radio_group(&gender).await?);
            Ok(outcomes)
        })
        .await?;

    let mut all_passed = true;
    for outcome in outcomes {
        let outcome = reporter.annotate(&driver, outcome).await;
        if outcome.passed {
            info!(
                "PASS {} (observed: {})",
                outcome.field,
                outcome.observed.as_deref().unwrap_or("-")
            );
        } else {
            all_passed = false;
            error!(
                "FAIL {}: {}{}",
                outcome.field,
                outcome.message.as_deref().unwrap_or("unknown failure"),
                outcome
                    .screenshot
                    .as_deref()
                    .map(|p| format!(" (screenshot: {})", p.display()))
                    .unwrap_or_default()
            );
        }
    }

    if !all_passed {
        std::process::exit(1);
    }
    Ok(())
}
