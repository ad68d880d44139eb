//! Fingerprint-evasion injection for sites that sit behind bot screens.
//!
//! Scripts are registered to run on every new document, so they survive the
//! per-page navigations of a traversal. Injection happens once per page,
//! before the first navigation.

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::browser::GetVersionParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page;
use tracing::debug;

const ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en;q=0.8";

const WEBDRIVER_JS: &str = r"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => false
    });
";

const LANGUAGES_JS: &str = r"
    Object.defineProperty(navigator, 'languages', {
        get: () => ['pt-BR', 'pt', 'en-US']
    });
";

const CHROME_RUNTIME_JS: &str = r"
    if (!window.chrome) {
        window.chrome = {};
    }
    if (!window.chrome.runtime) {
        window.chrome.runtime = {
            connect: () => ({
                onMessage: { addListener: () => {}, removeListener: () => {} },
                postMessage: () => {}
            })
        };
    }
";

/// Register the evasion scripts and override the user agent.
///
/// Uses the configured user agent when present, otherwise the browser's own
/// agent with the `Headless` marker stripped.
pub async fn inject(page: &Page, user_agent: Option<&str>) -> Result<()> {
    debug!("injecting stealth scripts");

    for (name, source) in [
        ("webdriver", WEBDRIVER_JS),
        ("languages", LANGUAGES_JS),
        ("chrome_runtime", CHROME_RUNTIME_JS),
    ] {
        page.execute(AddScriptToEvaluateOnNewDocumentParams {
            source: source.to_string(),
            include_command_line_api: None,
            world_name: None,
            run_immediately: None,
        })
        .await
        .with_context(|| format!("failed to register {name} evasion script"))?;
    }

    let user_agent = match user_agent {
        Some(configured) => configured.to_string(),
        None => {
            let version = page
                .execute(GetVersionParams {})
                .await
                .context("failed to read browser version")?;
            version.user_agent.replace("Headless", "")
        }
    };

    page.execute(SetUserAgentOverrideParams {
        user_agent,
        accept_language: Some(ACCEPT_LANGUAGE.to_string()),
        platform: Some("Win32".to_string()),
        user_agent_metadata: None,
    })
    .await
    .context("failed to override user agent")?;

    debug!("stealth injection complete");
    Ok(())
}
