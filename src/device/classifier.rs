//! Mobile vs. desktop classification from user agent and viewport width.

use std::fmt;

use axum::http::HeaderMap;
use serde::Serialize;

use crate::config::DeviceConfig;

/// Client hint carrying the layout viewport width in CSS pixels.
pub const VIEWPORT_WIDTH_HINT: &str = "sec-ch-viewport-width";

/// Pre-standard spelling of the same hint.
pub const LEGACY_VIEWPORT_WIDTH_HINT: &str = "viewport-width";

/// UI variant a client gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    pub fn is_mobile(self) -> bool {
        self == DeviceClass::Mobile
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Mobile => f.write_str("mobile"),
            DeviceClass::Desktop => f.write_str("desktop"),
        }
    }
}

/// Signals observed from the client runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceEnvironment {
    pub user_agent: Option<String>,
    pub viewport_width: Option<u32>,
}

impl DeviceEnvironment {
    pub fn new(user_agent: impl Into<String>, viewport_width: u32) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
            viewport_width: Some(viewport_width),
        }
    }

    /// Read `User-Agent` and the viewport width client hint.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let viewport_width = [VIEWPORT_WIDTH_HINT, LEGACY_VIEWPORT_WIDTH_HINT]
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| v.trim().parse::<f64>().ok())
            .filter(|w| w.is_finite() && *w >= 0.0)
            .map(|w| w.round() as u32);

        Self {
            user_agent,
            viewport_width,
        }
    }
}

/// Classifies a [`DeviceEnvironment`].
#[derive(Debug, Clone)]
pub struct DeviceClassifier {
    max_mobile_width: u32,
    /// Lowercased tokens.
    tokens: Vec<String>,
}

impl Default for DeviceClassifier {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}

impl DeviceClassifier {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            max_mobile_width: config.max_mobile_width,
            tokens: config
                .mobile_tokens
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| t.to_lowercase())
                .collect(),
        }
    }

    /// True if the user agent carries a mobile token.
    pub fn matches_user_agent(&self, user_agent: &str) -> bool {
        let ua = user_agent.to_lowercase();
        self.tokens.iter().any(|t| ua.contains(t.as_str()))
    }

    /// True if the viewport is narrow enough to be mobile.
    pub fn is_narrow(&self, width: u32) -> bool {
        width <= self.max_mobile_width
    }

    pub fn is_mobile(&self, env: &DeviceEnvironment) -> bool {
        env.user_agent.as_deref().is_some_and(|ua| self.matches_user_agent(ua))
            || env.viewport_width.is_some_and(|w| self.is_narrow(w))
    }

    pub fn classify(&self, env: &DeviceEnvironment) -> DeviceClass {
        if self.is_mobile(env) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const DESKTOP_UA: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    #[test]
    fn test_mobile_tokens() {
        let classifier = DeviceClassifier::default();
        let agents = [
            "Mozilla/5.0 (Linux; Android 14; Pixel 8)",
            "Mozilla/5.0 (webOS/2.2.4; U; en-US)",
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)",
            "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)",
            "Mozilla/5.0 (iPod touch; CPU iPhone OS 12_0)",
            "BlackBerry9700/5.0.0.351",
            "Mozilla/5.0 (compatible; MSIE 9.0; Windows Phone OS 7.5; IEMobile/9.0)",
            "Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)",
            "MOZILLA/5.0 (LINUX; ANDROID 14)",
        ];
        for ua in agents {
            let env = DeviceEnvironment::new(ua, 1920);
            assert_eq!(classifier.classify(&env), DeviceClass::Mobile, "{ua}");
        }
    }

    #[test]
    fn test_width_threshold() {
        let classifier = DeviceClassifier::default();
        assert_eq!(classifier.classify(&DeviceEnvironment::new(DESKTOP_UA, 768)), DeviceClass::Mobile);
        assert_eq!(classifier.classify(&DeviceEnvironment::new(DESKTOP_UA, 320)), DeviceClass::Mobile);
        assert_eq!(classifier.classify(&DeviceEnvironment::new(DESKTOP_UA, 769)), DeviceClass::Desktop);
        assert_eq!(classifier.classify(&DeviceEnvironment::new(DESKTOP_UA, 1920)), DeviceClass::Desktop);
    }

    #[test]
    fn test_missing_signals_are_desktop() {
        let classifier = DeviceClassifier::default();
        assert_eq!(classifier.classify(&DeviceEnvironment::default()), DeviceClass::Desktop);

        let env = DeviceEnvironment {
            user_agent: None,
            viewport_width: Some(500),
        };
        assert_eq!(classifier.classify(&env), DeviceClass::Mobile);
    }

    #[test]
    fn test_custom_policy() {
        let classifier = DeviceClassifier::from_config(&DeviceConfig {
            max_mobile_width: 1024,
            mobile_tokens: vec!["KaiOS".into()],
        });
        assert!(classifier.is_mobile(&DeviceEnvironment::new("Mozilla/5.0 (Mobile; KAIOS/3.0)", 2000)));
        assert!(classifier.is_mobile(&DeviceEnvironment::new(DESKTOP_UA, 1000)));
        assert!(!classifier.is_mobile(&DeviceEnvironment::new("Android", 1500)));
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("Mozilla/5.0 (iPhone)"));
        headers.insert(VIEWPORT_WIDTH_HINT, HeaderValue::from_static("390.4"));
        let env = DeviceEnvironment::from_headers(&headers);
        assert_eq!(env.user_agent.as_deref(), Some("Mozilla/5.0 (iPhone)"));
        assert_eq!(env.viewport_width, Some(390));

        let mut headers = HeaderMap::new();
        headers.insert(LEGACY_VIEWPORT_WIDTH_HINT, HeaderValue::from_static("1280"));
        let env = DeviceEnvironment::from_headers(&headers);
        assert!(env.user_agent.is_none());
        assert_eq!(env.viewport_width, Some(1280));

        let mut headers = HeaderMap::new();
        headers.insert(VIEWPORT_WIDTH_HINT, HeaderValue::from_static("wide"));
        assert_eq!(DeviceEnvironment::from_headers(&headers).viewport_width, None);
    }
}
