//! Device identification from the user-agent string.

use serde::{Deserialize, Serialize};

use crate::models::DeviceClass;

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// "<class> - <browser>", e.g. "Desktop - Chrome".
    pub device: String,
    pub device_type: DeviceClass,
    pub browser: String,
    pub os: String,
}

const TABLET_MARKERS: &[&str] = &["tablet", "ipad", "playbook", "silk"];

const MOBILE_MARKERS: &[&str] = &[
    "Mobile",
    "Android",
    "iPhone",
    "iPod",
    "IEMobile",
    "BlackBerry",
    "Kindle",
    "Silk-Accelerated",
    "hpwOS",
    "webOS",
    "Opera Mobi",
    "Opera Mini",
];

// Order matters: Chromium derivatives also advertise "Chrome" and "Safari".
const BROWSERS: &[(&[&str], &str)] = &[
    (&["Firefox"], "Firefox"),
    (&["SamsungBrowser"], "Samsung Internet"),
    (&["Opera", "OPR"], "Opera"),
    (&["Trident"], "Internet Explorer"),
    (&["Edge"], "Edge (Legacy)"),
    (&["Edg"], "Edge"),
    (&["Chrome"], "Chrome"),
    (&["Safari"], "Safari"),
];

// Android reports "Linux" and iOS reports "like Mac OS X", so both go first.
const OPERATING_SYSTEMS: &[(&[&str], &str)] = &[
    (&["Windows"], "Windows"),
    (&["Android"], "Android"),
    (&["iPhone", "iPad", "iPod", "iOS"], "iOS"),
    (&["CrOS"], "ChromeOS"),
    (&["Mac"], "macOS"),
    (&["Linux"], "Linux"),
];

fn first_match(ua: &str, table: &[(&[&str], &'static str)]) -> &'static str {
    table
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| ua.contains(needle)))
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN)
}

fn device_class(ua: &str) -> DeviceClass {
    let lower = ua.to_ascii_lowercase();
    let android_tablet = lower
        .find("android")
        .is_some_and(|at| !lower[at..].contains("mobi"));
    if android_tablet || TABLET_MARKERS.iter().any(|m| lower.contains(m)) {
        DeviceClass::Tablet
    } else if MOBILE_MARKERS.iter().any(|m| ua.contains(m)) {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

/// Classifies a user-agent. First match wins; never fails.
pub fn identify(user_agent: &str) -> DeviceInfo {
    let device_type = device_class(user_agent);
    let browser = first_match(user_agent, BROWSERS).to_string();
    let os = first_match(user_agent, OPERATING_SYSTEMS).to_string();
    DeviceInfo {
        device: format!("{} - {}", device_type, browser),
        device_type,
        browser,
        os,
    }
}

/// User-agent describing this client when none is configured.
pub fn default_user_agent() -> String {
    let platform = match std::env::consts::OS {
        "windows" => "Windows NT 10.0; Win64",
        "macos" => "Macintosh; Mac OS X",
        "android" => "Linux; Android",
        "ios" => "iPhone; iOS",
        _ => "X11; Linux",
    };
    format!(
        "wardwatch-client/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        platform,
        std::env::consts::ARCH
    )
}

/// Short, stable identifier for this user-agent/language/timezone combination.
pub fn fingerprint(user_agent: &str, language: &str, timezone: &str) -> String {
    let source = format!("{user_agent}-{language}-{timezone}");
    let hash = source
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(unit as i32)
        })
        .unsigned_abs();
    to_base36(hash)
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAMSUNG: &str = "Mozilla/5.0 (Linux; Android 13; SM-S911B) AppleWebKit/537.36 (KHTML, like Gecko) SamsungBrowser/23.0 Chrome/115.0.0.0 Mobile Safari/537.36";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const SAFARI_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15";

    #[test]
    fn desktop_browsers() {
        let info = identify(CHROME_WINDOWS);
        assert_eq!(info.device, "Desktop - Chrome");
        assert_eq!(info.os, "Windows");

        let info = identify(EDGE_WINDOWS);
        assert_eq!(info.browser, "Edge");

        let info = identify(FIREFOX_LINUX);
        assert_eq!(info.device, "Desktop - Firefox");
        assert_eq!(info.os, "Linux");

        let info = identify(SAFARI_MAC);
        assert_eq!(info.browser, "Safari");
        assert_eq!(info.os, "macOS");
    }

    #[test]
    fn phones_and_tablets() {
        let info = identify(SAFARI_IPHONE);
        assert_eq!(info.device_type, DeviceClass::Mobile);
        assert_eq!(info.os, "iOS");

        let info = identify(SAFARI_IPAD);
        assert_eq!(info.device_type, DeviceClass::Tablet);
        assert_eq!(info.os, "iOS");

        let info = identify(ANDROID_PHONE);
        assert_eq!(info.device, "Mobile - Chrome");
        assert_eq!(info.os, "Android");

        let info = identify(ANDROID_TABLET);
        assert_eq!(info.device_type, DeviceClass::Tablet);

        let info = identify(SAMSUNG);
        assert_eq!(info.browser, "Samsung Internet");
    }

    #[test]
    fn mobile_and_darwin_agents_are_not_misread() {
        assert_eq!(identify(SAFARI_IPHONE).os, "iOS");
        assert_eq!(identify(ANDROID_PHONE).os, "Android");
        assert_eq!(identify("CFNetwork/1410.0.3 Darwin/22.6.0").os, UNKNOWN);
        let chromebook = "Mozilla/5.0 (X11; CrOS x86_64 14541.0.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        assert_eq!(identify(chromebook).os, "ChromeOS");
    }

    #[test]
    fn unknown_agent_defaults_to_desktop() {
        let info = identify("curl/8.4.0");
        assert_eq!(info.device, "Desktop - Unknown");
        assert_eq!(info.os, UNKNOWN);
        assert_eq!(identify(""), info);
    }

    #[test]
    fn default_user_agent_is_classifiable() {
        let info = identify(&default_user_agent());
        assert_eq!(info.device_type, DeviceClass::Desktop);
    }

    #[test]
    fn fingerprint_is_stable_and_input_sensitive() {
        let a = fingerprint(CHROME_WINDOWS, "en-US", "Europe/Lisbon");
        assert_eq!(a, fingerprint(CHROME_WINDOWS, "en-US", "Europe/Lisbon"));
        assert_ne!(a, fingerprint(CHROME_WINDOWS, "pt-PT", "Europe/Lisbon"));
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
