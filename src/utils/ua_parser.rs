//! User-agent and referrer parsing.
//!
//! Pure, deterministic functions: the same input always yields the same
//! output, byte for byte. Parsing is backed by woothee, with a tablet
//! heuristic layered on top since woothee folds tablets into its
//! smartphone category.

use serde::Serialize;
use std::sync::LazyLock;
use woothee::parser::Parser;

static PARSER: LazyLock<Parser> = LazyLock::new(Parser::new);

/// Device class resolved from the user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
            Self::Unknown => "unknown",
        }
    }
}

/// Structured result of parsing a user-agent string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUserAgent {
    pub device_type: DeviceType,
    pub browser_name: String,
    pub browser_version: String,
    pub os_name: String,
    pub os_version: String,
    pub is_bot: bool,
}

/// Parses a raw user-agent string into device, browser, OS, and bot fields.
///
/// Device resolution order: mobile, tablet, desktop, else unknown.
pub fn parse_user_agent(raw: &str) -> ParsedUserAgent {
    let parsed = PARSER.parse(raw);

    let lowered = raw.to_ascii_lowercase();
    let looks_tablet = lowered.contains("ipad") || lowered.contains("tablet");

    match parsed {
        Some(ua) => {
            let is_bot = ua.category == "crawler";
            let is_mobile =
                !looks_tablet && (ua.category == "smartphone" || ua.category == "mobilephone");

            let device_type = if is_mobile {
                DeviceType::Mobile
            } else if looks_tablet {
                DeviceType::Tablet
            } else if ua.category == "pc" {
                DeviceType::Desktop
            } else {
                DeviceType::Unknown
            };

            ParsedUserAgent {
                device_type,
                browser_name: clean(ua.name),
                browser_version: clean(&ua.version),
                os_name: clean(ua.os),
                os_version: clean(&ua.os_version),
                is_bot,
            }
        }
        None => ParsedUserAgent {
            device_type: if looks_tablet {
                DeviceType::Tablet
            } else {
                DeviceType::Unknown
            },
            browser_name: String::new(),
            browser_version: String::new(),
            os_name: String::new(),
            os_version: String::new(),
            is_bot: false,
        },
    }
}

/// woothee reports unknowns as the literal "UNKNOWN"; collapse to empty.
fn clean(value: &str) -> String {
    if value == "UNKNOWN" {
        String::new()
    } else {
        value.to_string()
    }
}

/// Extracts the registrable host part of a referrer URL.
///
/// Strips an `http://` or `https://` prefix and returns everything before
/// the first `/`. Empty input yields an empty string.
pub fn extract_domain(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let stripped = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);

    stripped.split('/').next().unwrap_or(stripped).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPAD_SAFARI: &str = "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";
    const GOOGLEBOT: &str =
        "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    #[test]
    fn test_desktop_browser() {
        let ua = parse_user_agent(CHROME_DESKTOP);
        assert_eq!(ua.device_type, DeviceType::Desktop);
        assert_eq!(ua.browser_name, "Chrome");
        assert!(!ua.is_bot);
    }

    #[test]
    fn test_mobile_browser() {
        let ua = parse_user_agent(IPHONE_SAFARI);
        assert_eq!(ua.device_type, DeviceType::Mobile);
        assert!(!ua.is_bot);
    }

    #[test]
    fn test_tablet_heuristic() {
        let ua = parse_user_agent(IPAD_SAFARI);
        assert_eq!(ua.device_type, DeviceType::Tablet);
    }

    #[test]
    fn test_crawler_is_bot() {
        let ua = parse_user_agent(GOOGLEBOT);
        assert!(ua.is_bot);
    }

    #[test]
    fn test_garbage_input_is_unknown() {
        let ua = parse_user_agent("definitely not a user agent");
        assert_eq!(ua.device_type, DeviceType::Unknown);
        assert!(!ua.is_bot);
        assert_eq!(ua.browser_name, "");
    }

    #[test]
    fn test_parse_is_pure() {
        assert_eq!(parse_user_agent(CHROME_DESKTOP), parse_user_agent(CHROME_DESKTOP));
        assert_eq!(parse_user_agent(""), parse_user_agent(""));
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://news.example.com/story/1"), "news.example.com");
        assert_eq!(extract_domain("http://example.com"), "example.com");
        assert_eq!(extract_domain("example.com/path"), "example.com");
        assert_eq!(extract_domain(""), "");
    }
}
