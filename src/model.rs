use chrono::{DateTime, Utc};
use std::fmt;

pub type Celsius = f64;

/// Portal login. Supplied once by the caller and never mutated.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Portal address together with the HTTP client used to talk to it.
#[derive(Debug, Clone)]
pub struct Portal {
    pub url: String,
    pub client: reqwest::Client,
}

/// Result of a successful login: the session cookie, before the token is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedIn {
    pub cookie: String,
}

/// Fully established session. Both fields are always non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cookie: String,
    token: String,
}

impl Session {
    /// Returns `None` unless both parts are present; a half-built session is never kept.
    pub fn new(cookie: impl Into<String>, token: impl Into<String>) -> Option<Self> {
        let cookie = cookie.into();
        let token = token.into();

        if cookie.is_empty() || token.is_empty() {
            None
        } else {
            Some(Session { cookie, token })
        }
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Devices listed on the devices page, keyed by device code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceListing {
    pub session: Session,
    pub devices: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceValues {
    pub temperature: Celsius,
    pub set_point: Celsius,
    pub heater_on: bool,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Human-readable code, e.g. `STA10072968`.
    pub code: String,
    /// Numeric id used by the portal in its URLs.
    pub internal_id: String,
    pub values: DeviceValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Uninitialized,
    Authenticating,
    DirectoryLoaded,
    Ready,
    Failed,
}
