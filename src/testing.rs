//! Scripted fake driver for exercising locate/poll/verify logic
//! without a browser.

use crate::core::Driver;
use crate::errors::{HarnessError, Result};
use crate::selector::Selector;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct FakeElement {
    displayed: bool,
    value: String,
    selected: bool,
    radio_group: Option<String>,
    read_only: bool,
    /// Number of find calls that must land on this element before it
    /// "renders" (simulates a late-appearing node)
    appears_after: u32,
}

impl FakeElement {
    fn visible_input() -> Self {
        Self {
            displayed: true,
            value: String::new(),
            selected: false,
            radio_group: None,
            read_only: false,
            appears_after: 0,
        }
    }
}

#[derive(Default)]
struct MockState {
    elements: HashMap<String, FakeElement>,
    // selector expression -> element id
    selectors: HashMap<String, String>,
    find_calls: HashMap<String, u32>,
    // selector expression -> injected protocol error message
    broken_selectors: HashMap<String, String>,
    script_results: HashMap<String, Value>,
    screenshot_attempts: u32,
    screenshots_fail: bool,
}

/// Opaque element handle handed out by [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    id: String,
}

pub struct MockDriver {
    state: Mutex<MockState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    fn add_element(&self, id: &str, selectors: &[&str], element: FakeElement) {
        let mut state = self.state.lock().unwrap();
        state.elements.insert(id.to_string(), element);
        for expr in selectors {
            state.selectors.insert(expr.to_string(), id.to_string());
        }
    }

    /// A displayed text input reachable through the given selector
    /// expressions (CSS or XPath alike; the mock matches on the raw
    /// expression)
    pub fn add_text_input(&self, id: &str, selectors: &[&str]) {
        self.add_element(id, selectors, FakeElement::visible_input());
    }

    /// An input that exists in the DOM but is not rendered
    pub fn add_hidden_input(&self, id: &str, selectors: &[&str]) {
        self.add_element(
            id,
            selectors,
            FakeElement {
                displayed: false,
                ..FakeElement::visible_input()
            },
        );
    }

    /// A displayed radio button belonging to a named group; clicking
    /// it deselects every other member of that group
    pub fn add_radio(&self, id: &str, selectors: &[&str], group: &str) {
        self.add_element(
            id,
            selectors,
            FakeElement {
                radio_group: Some(group.to_string()),
                ..FakeElement::visible_input()
            },
        );
    }

    /// Make the element invisible to `find` until it has been asked
    /// for `calls` times (render-race simulation)
    pub fn appears_after_find_calls(&self, id: &str, calls: u32) {
        let mut state = self.state.lock().unwrap();
        if let Some(element) = state.elements.get_mut(id) {
            element.appears_after = calls;
        }
    }

    /// The element swallows writes, as a readonly input would
    pub fn make_read_only(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(element) = state.elements.get_mut(id) {
            element.read_only = true;
        }
    }

    /// Any `find` with this exact expression raises a protocol error
    pub fn fail_find_on(&self, expression: &str, message: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .broken_selectors
            .insert(expression.to_string(), message.to_string());
    }

    pub fn set_script_result(&self, script: &str, result: Value) {
        let mut state = self.state.lock().unwrap();
        state.script_results.insert(script.to_string(), result);
    }

    pub fn fail_screenshots(&self) {
        self.state.lock().unwrap().screenshots_fail = true;
    }

    pub fn screenshot_attempts(&self) -> u32 {
        self.state.lock().unwrap().screenshot_attempts
    }

    pub fn find_calls(&self, expression: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .find_calls
            .get(expression)
            .copied()
            .unwrap_or(0)
    }

    pub fn element_id(&self, element: &MockElement) -> String {
        element.id.clone()
    }

    pub fn value_of(&self, id: &str) -> String {
        self.state.lock().unwrap().elements[id].value.clone()
    }

    pub fn is_selected_id(&self, id: &str) -> bool {
        self.state.lock().unwrap().elements[id].selected
    }

    fn with_element<T>(
        &self,
        element: &MockElement,
        f: impl FnOnce(&mut FakeElement, &mut MockState) -> T,
    ) -> Result<T> {
        let mut state = self.state.lock().unwrap();
        let mut fake = match state.elements.get(&element.id) {
            Some(fake) => fake.clone(),
            None => {
                return Err(HarnessError::ElementNotFound(format!(
                    "stale handle {}",
                    element.id
                )))
            }
        };
        let result = f(&mut fake, &mut state);
        state.elements.insert(element.id.clone(), fake);
        Ok(result)
    }
}

#[async_trait]
impl Driver for MockDriver {
    type Element = MockElement;

    async fn navigate(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn find(&self, selector: &Selector) -> Result<MockElement> {
        let mut state = self.state.lock().unwrap();
        let expr = selector.expression().to_string();
        if let Some(message) = state.broken_selectors.get(&expr) {
            return Err(HarnessError::JavaScriptFailed(message.clone()));
        }

        let calls = state.find_calls.entry(expr.clone()).or_insert(0);
        *calls += 1;
        let calls = *calls;

        let id = state
            .selectors
            .get(&expr)
            .cloned()
            .ok_or_else(|| HarnessError::ElementNotFound(expr.clone()))?;
        let element = &state.elements[&id];
        if calls <= element.appears_after {
            return Err(HarnessError::ElementNotFound(expr));
        }
        Ok(MockElement { id })
    }

    async fn is_displayed(&self, element: &MockElement) -> Result<bool> {
        self.with_element(element, |fake, _| fake.displayed)
    }

    async fn is_selected(&self, element: &MockElement) -> Result<bool> {
        self.with_element(element, |fake, _| fake.selected)
    }

    async fn clear(&self, element: &MockElement) -> Result<()> {
        self.with_element(element, |fake, _| {
            if !fake.read_only {
                fake.value.clear();
            }
        })
    }

    async fn send_text(&self, element: &MockElement, text: &str) -> Result<()> {
        self.with_element(element, |fake, _| {
            if !fake.read_only {
                fake.value.push_str(text);
            }
        })
    }

    async fn click(&self, element: &MockElement) -> Result<()> {
        let clicked_id = element.id.clone();
        self.with_element(element, |fake, state| {
            if let Some(group) = fake.radio_group.clone() {
                fake.selected = true;
                for (id, other) in state.elements.iter_mut() {
                    if *id != clicked_id && other.radio_group.as_deref() == Some(&group) {
                        other.selected = false;
                    }
                }
            }
        })
    }

    async fn get_attribute(&self, element: &MockElement, name: &str) -> Result<Option<String>> {
        self.with_element(element, |fake, _| match name {
            "value" => Some(fake.value.clone()),
            _ => None,
        })
    }

    async fn execute_script(&self, script: &str) -> Result<Value> {
        let state = self.state.lock().unwrap();
        Ok(state
            .script_results
            .get(script)
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn take_screenshot(&self) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.screenshot_attempts += 1;
        if state.screenshots_fail {
            return Err(HarnessError::ScreenshotFailed(
                "capture unavailable".to_string(),
            ));
        }
        // Minimal PNG signature is enough for artifact tests
        Ok(vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'])
    }
}
