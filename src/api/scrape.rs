//! Patterns used to pull data out of portal HTML.
//!
//! The portal publishes no API, so every piece of state comes from matching fixed
//! substrings of its pages. Keep all of them here.

use super::Error;
use regex::Regex;
use std::collections::BTreeMap;

/// Present in the login response body only when the login succeeded.
pub const LOGGED_IN_MARKER: &str = r#"<input name="devId""#;

lazy_static! {
    static ref DEVICE_LINK: Regex = Regex::new(r#"control\.php\?devId=(\d+)">([A-Z0-9]*)"#)
        .expect("device link pattern is valid");
    static ref TOKEN_INPUT: Regex = Regex::new(
        r#"<input id="token" name="token" type="hidden" value="(\d+-[a-zA-Z0-9]+)" />"#
    )
    .expect("token pattern is valid");
}

/// Failed logins still return 200, so the body is the only signal.
pub fn is_logged_in(body: &str) -> bool {
    body.contains(LOGGED_IN_MARKER)
}

/// Map of device code to internal id. A code listed twice keeps its last id.
pub fn device_ids(body: &str) -> BTreeMap<String, String> {
    DEVICE_LINK
        .captures_iter(body)
        .map(|caps| (caps[2].to_string(), caps[1].to_string()))
        .collect()
}

pub fn token(body: &str) -> Result<String, Error> {
    TOKEN_INPUT
        .captures(body)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| Error::parse("session token", "no hidden token input on page"))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn read_resource(filename: &str) -> String {
        let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push(format!("resources/test/{}", filename));
        fs::read_to_string(d.as_path()).unwrap()
    }

    #[test]
    fn login_success_has_marker() {
        assert!(is_logged_in(&read_resource("login_success.html")));
    }

    #[test]
    fn login_failure_has_no_marker() {
        assert!(!is_logged_in(&read_resource("login_failure.html")));
    }

    #[test]
    fn devices_page() {
        let devices = device_ids(&read_resource("devices.html"));
        assert_eq!(2, devices.len());
        assert_eq!("12345", devices["STA10072968"]);
        assert_eq!("67890", devices["STA00074484"]);

        let codes: Vec<&str> = devices.keys().map(String::as_str).collect();
        assert_eq!(vec!["STA00074484", "STA10072968"], codes);
    }

    #[test]
    fn repeated_code_keeps_last_occurrence() {
        let devices = device_ids(&read_resource("devices_duplicate.html"));
        assert_eq!(2, devices.len());
        assert_eq!("99999", devices["STA10072968"]);
    }

    #[test]
    fn no_devices_is_empty_not_error() {
        let body = read_resource("devices_empty.html");
        assert!(device_ids(&body).is_empty());
        assert_eq!("1609459200-Ab12Cd", token(&body).unwrap());
    }

    #[test]
    fn token_from_devices_page() {
        let token = token(&read_resource("devices.html")).unwrap();
        assert_eq!("1609459200-a1B2c3D4e5", token);
    }

    #[test]
    fn missing_token_is_parse_error() {
        match token(&read_resource("login_failure.html")) {
            Err(Error::Parse { what, .. }) => assert_eq!("session token", what),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn code_group_may_be_empty() {
        let body = r#"<a href="control.php?devId=1">sta1</a>"#;
        let devices = device_ids(body);
        assert_eq!(1, devices.len());
        assert_eq!("1", devices[""]);
    }
}
