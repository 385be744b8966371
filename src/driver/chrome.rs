use crate::core::{Driver, HarnessConfig};
use crate::errors::{HarnessError, Result};
use crate::selector::Selector;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;
use uuid::Uuid;

/// Element handle: a key into the page-side handle registry.
///
/// Valid only for immediate use within the poll tick that produced it;
/// the registry entry may be dropped once enough newer handles have
/// been created.
#[derive(Debug, Clone)]
pub struct ChromeElement {
    handle: String,
}

/// `Driver` implementation over a headless Chrome session.
///
/// Element operations run as JavaScript in the page; located nodes are
/// pinned in `window.__fieldprobeHandles` keyed by UUID so the opaque
/// handle survives the round trips within one tick. Scripts report
/// back as JSON strings, which round-trip reliably through CDP.
pub struct ChromeDriver {
    // Kept alive for the session lifetime
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(config: &HarnessConfig) -> Result<Self> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.browser.window_width, config.browser.window_height
        );

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-extensions"),
            OsStr::new(&window_size_arg),
        ];
        for arg in &config.browser.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.browser.headless)
            .args(args)
            .build()
            .map_err(|e| HarnessError::LaunchFailed(e.to_string()))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| HarnessError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| HarnessError::LaunchFailed(e.to_string()))?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    fn eval(&self, script: &str) -> Result<Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| HarnessError::JavaScriptFailed(e.to_string()))?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    /// Run a script that returns a JSON string and parse it, mapping
    /// the in-page `error`/`stale` markers onto the error taxonomy.
    fn eval_json(&self, script: &str) -> Result<Value> {
        let raw = self.eval(script)?;
        let text = raw.as_str().ok_or_else(|| {
            HarnessError::JavaScriptFailed("unexpected script result shape".to_string())
        })?;
        let parsed: Value = serde_json::from_str(text)?;

        if let Some(error) = parsed.get("error").and_then(Value::as_str) {
            return Err(HarnessError::JavaScriptFailed(error.to_string()));
        }
        if parsed.get("stale").and_then(Value::as_bool).unwrap_or(false) {
            return Err(HarnessError::ElementNotFound(
                "stale element handle".to_string(),
            ));
        }
        Ok(parsed)
    }

    fn run_on_element(&self, element: &ChromeElement, body: &str) -> Result<Value> {
        let script = format!(
            r#"
            (function() {{
                try {{
                    const el = (window.__fieldprobeHandles || {{}})['{handle}'];
                    if (!el) {{ return JSON.stringify({{ stale: true }}); }}
                    {body}
                }} catch (e) {{
                    return JSON.stringify({{ error: e.toString() }});
                }}
            }})()
            "#,
            handle = element.handle,
            body = body,
        );
        self.eval_json(&script)
    }
}

#[async_trait]
impl Driver for ChromeDriver {
    type Element = ChromeElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| HarnessError::NavigationFailed(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| HarnessError::NavigationFailed(e.to_string()))?;
        Ok(())
    }

    async fn find(&self, selector: &Selector) -> Result<ChromeElement> {
        let locate = match selector {
            Selector::Css(expr) => {
                format!("document.querySelector({})", serde_json::to_string(expr)?)
            }
            Selector::XPath(expr) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                serde_json::to_string(expr)?
            ),
        };

        let handle = Uuid::new_v4().to_string();
        let script = format!(
            r#"
            (function() {{
                try {{
                    if (!window.__fieldprobeHandles) {{ window.__fieldprobeHandles = {{}}; }}
                    if (Object.keys(window.__fieldprobeHandles).length > 64) {{
                        window.__fieldprobeHandles = {{}};
                    }}
                    const el = {locate};
                    if (!el) {{ return JSON.stringify({{ found: false }}); }}
                    window.__fieldprobeHandles['{handle}'] = el;
                    return JSON.stringify({{ found: true }});
                }} catch (e) {{
                    return JSON.stringify({{ error: e.toString() }});
                }}
            }})()
            "#,
            locate = locate,
            handle = handle,
        );

        let result = self.eval_json(&script)?;
        if !result.get("found").and_then(Value::as_bool).unwrap_or(false) {
            return Err(HarnessError::ElementNotFound(selector.to_string()));
        }
        Ok(ChromeElement { handle })
    }

    async fn is_displayed(&self, element: &ChromeElement) -> Result<bool> {
        let result = self.run_on_element(
            element,
            r#"
            const rect = el.getBoundingClientRect();
            const style = window.getComputedStyle(el);
            const displayed = rect.width > 0 && rect.height > 0
                && style.display !== 'none' && style.visibility !== 'hidden';
            return JSON.stringify({ value: displayed });
            "#,
        )?;
        Ok(result.get("value").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn is_selected(&self, element: &ChromeElement) -> Result<bool> {
        let result =
            self.run_on_element(element, "return JSON.stringify({ value: !!el.checked });")?;
        Ok(result.get("value").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn clear(&self, element: &ChromeElement) -> Result<()> {
        self.run_on_element(
            element,
            r#"
            el.focus();
            el.value = '';
            el.dispatchEvent(new Event('input', { bubbles: true, cancelable: true }));
            el.dispatchEvent(new Event('change', { bubbles: true, cancelable: true }));
            return JSON.stringify({ value: true });
            "#,
        )?;
        Ok(())
    }

    async fn send_text(&self, element: &ChromeElement, text: &str) -> Result<()> {
        let body = format!(
            r#"
            el.focus();
            el.value = el.value + {text};
            el.dispatchEvent(new Event('input', {{ bubbles: true, cancelable: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true, cancelable: true }}));
            return JSON.stringify({{ value: el.value }});
            "#,
            text = serde_json::to_string(text)?,
        );
        self.run_on_element(element, &body)?;
        Ok(())
    }

    async fn click(&self, element: &ChromeElement) -> Result<()> {
        self.run_on_element(
            element,
            r#"
            el.scrollIntoView({ block: 'center' });
            el.click();
            return JSON.stringify({ value: true });
            "#,
        )?;
        Ok(())
    }

    async fn get_attribute(&self, element: &ChromeElement, name: &str) -> Result<Option<String>> {
        let body = format!(
            r#"
            const name = {name};
            let value;
            if (name === 'value' && 'value' in el) {{
                value = el.value;
            }} else {{
                value = el.getAttribute(name);
            }}
            return JSON.stringify({{ value: value }});
            "#,
            name = serde_json::to_string(name)?,
        );
        let result = self.run_on_element(element, &body)?;
        Ok(result
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn execute_script(&self, script: &str) -> Result<Value> {
        self.eval(script)
    }

    async fn take_screenshot(&self) -> Result<Vec<u8>> {
        let screenshot = self
            .tab
            .capture_screenshot(
                headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption::Png,
                None,
                None,
                true,
            )
            .map_err(|e| HarnessError::ScreenshotFailed(e.to_string()))?;
        Ok(screenshot)
    }
}
