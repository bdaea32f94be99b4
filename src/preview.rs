//! Static preview surface for a running app.
//!
//! At most one preview exists per process. Opening while one is live just
//! reveals it; disposing clears it so the next open creates a new one.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tower_lsp::lsp_types::Url;
use tracing::{debug, info};

pub const DEFAULT_PREVIEW_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Invalid NiceGUI preview URL: {0}")]
    InvalidUrl(String),
}

/// What the client should do with the preview surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PreviewAction {
    Reveal { url: String },
    Create { url: String, title: String, html: String },
}

#[derive(Debug)]
struct PreviewPanel {
    url: Url,
}

#[derive(Debug, Default)]
pub struct PreviewHost {
    panel: Mutex<Option<PreviewPanel>>,
}

impl PreviewHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveal the live panel, or validate `configured_url` and create one.
    ///
    /// An invalid URL creates nothing and leaves a live panel untouched.
    pub fn open(&self, configured_url: &str) -> Result<PreviewAction, PreviewError> {
        let mut panel = self.lock();
        if let Some(existing) = panel.as_ref() {
            debug!("Revealing preview of {}", existing.url);
            return Ok(PreviewAction::Reveal {
                url: existing.url.to_string(),
            });
        }

        let url = validate_url(configured_url)?;
        info!("Opening preview of {}", url);
        let action = PreviewAction::Create {
            url: url.to_string(),
            title: "NiceGUI".to_string(),
            html: html_shell(&url),
        };
        *panel = Some(PreviewPanel { url });
        Ok(action)
    }

    /// Drop the live panel; returns whether one existed
    pub fn dispose(&self) -> bool {
        self.lock().take().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<PreviewPanel>> {
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parse a preview URL, accepting only `http` and `https`
pub fn validate_url(configured: &str) -> Result<Url, PreviewError> {
    let url = Url::parse(configured.trim()).map_err(|_| PreviewError::InvalidUrl(configured.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(PreviewError::InvalidUrl(configured.to_string())),
    }
}

/// HTML page embedding `url` full-size
pub fn html_shell(url: &Url) -> String {
    let src = escape_attribute(url.as_str());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>NiceGUI</title>
</head>
<body>
    <object data="{src}" style="width:100%;height:100vh;">
        <embed src="{src}" style="width:100%;height:100vh;"> </embed>
        Error: Embedded data could not be displayed.
    </object>
</body>
</html>"#
    )
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url("http://localhost:8080").unwrap().as_str(), "http://localhost:8080/");
        assert!(validate_url("https://example.com/app").is_ok());
        assert!(validate_url("file:///etc/passwd").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn test_lifecycle() {
        let host = PreviewHost::new();
        let created = host.open(DEFAULT_PREVIEW_URL).unwrap();
        let PreviewAction::Create { url, html, .. } = created else {
            panic!("expected a new panel");
        };
        assert_eq!(url, "http://localhost:8080/");
        assert!(html.contains(r#"<object data="http://localhost:8080/""#));
        assert!(html.contains(r#"<embed src="http://localhost:8080/""#));

        // Second open reveals, even with a bad URL configured
        assert_eq!(
            host.open("ftp://nope").unwrap(),
            PreviewAction::Reveal {
                url: "http://localhost:8080/".to_string()
            }
        );

        assert!(host.dispose());
        assert!(!host.dispose());
        assert!(matches!(host.open("https://app.local").unwrap(), PreviewAction::Create { .. }));
    }

    #[test]
    fn test_invalid_url_creates_nothing() {
        let host = PreviewHost::new();
        let err = host.open("ftp://files.local").unwrap_err();
        assert_eq!(err.to_string(), "Invalid NiceGUI preview URL: ftp://files.local");
        assert!(!host.is_open());
    }

    #[test]
    fn test_html_escaping() {
        let url = Url::parse("http://host/?a=1&b=2").unwrap();
        assert!(html_shell(&url).contains("http://host/?a=1&amp;b=2"));
    }
}
