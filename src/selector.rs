use crate::core::Driver;
use crate::errors::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A single element-location strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "input[name='firstName']")
    Css(String),
    /// XPath selector (e.g., "//input[contains(@placeholder, 'Email')]")
    XPath(String),
}

impl Selector {
    pub fn css(expression: impl Into<String>) -> Self {
        Self::Css(expression.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    pub fn expression(&self) -> &str {
        match self {
            Self::Css(expr) | Self::XPath(expr) => expr,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(expr) => write!(f, "css:{}", expr),
            Self::XPath(expr) => write!(f, "xpath:{}", expr),
        }
    }
}

/// Prioritized list of candidate selectors for one logical field.
///
/// Evaluated left-to-right; order encodes priority, most reliable
/// first. A chain is pure configuration data: construct it once at
/// field-definition time and share it freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    pub fn new(first: Selector) -> Self {
        Self {
            selectors: vec![first],
        }
    }

    /// Append a lower-priority fallback selector
    pub fn or(mut self, fallback: Selector) -> Self {
        self.selectors.push(fallback);
        self
    }

    /// Build a chain from a list; fails on an empty list, since a
    /// chain must always contain at least one selector.
    pub fn from_selectors(selectors: Vec<Selector>) -> Result<Self> {
        if selectors.is_empty() {
            return Err(HarnessError::InvalidChain(
                "a selector chain needs at least one selector".to_string(),
            ));
        }
        Ok(Self { selectors })
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Try each selector in order and return the first displayed match.
    ///
    /// A not-found lookup or a match that is not currently displayed
    /// falls through to the next candidate. Any other driver error
    /// (malformed selector, lost session) propagates immediately;
    /// "element absent" and "selector broken" are different failures.
    ///
    /// Returns `Ok(None)` once every candidate is exhausted.
    pub async fn resolve<D: Driver>(&self, driver: &D) -> Result<Option<D::Element>> {
        for selector in &self.selectors {
            let element = match driver.find(selector).await {
                Ok(element) => element,
                Err(err) if err.is_not_found() => {
                    debug!("selector {} matched nothing, trying next", selector);
                    continue;
                }
                Err(err) => return Err(err),
            };

            if driver.is_displayed(&element).await? {
                return Ok(Some(element));
            }
            debug!("selector {} matched a hidden element, trying next", selector);
        }
        Ok(None)
    }
}
