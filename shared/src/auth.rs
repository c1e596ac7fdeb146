//! Login gate. The bundled [`StaticCredentials`] is a demo stub, not a
//! security boundary; real shells plug in their own [`Authenticator`].

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Password as typed by the user. Redacted in `Debug`, wiped on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug)]
pub struct Credentials {
    username: String,
    password: Password,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Password) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn password(&self) -> &Password {
        &self.password
    }
}

pub trait Authenticator: Send + Sync {
    fn verify(&self, credentials: &Credentials) -> bool;

    /// Text shown under the login form, if any.
    fn hint(&self) -> Option<String> {
        None
    }
}

/// Accepts exactly one username/password pair.
pub struct StaticCredentials {
    username: String,
    password: SecretString,
    hint: Option<String>,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// The demo account the sample shells advertise on the login screen.
    #[must_use]
    pub fn demo() -> Self {
        Self::new("vikas", "12345").with_hint("Use → vikas / 12345")
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Authenticator for StaticCredentials {
    fn verify(&self, credentials: &Credentials) -> bool {
        credentials.username() == self.username
            && credentials.password().expose() == self.password.expose_secret().as_str()
    }

    fn hint(&self) -> Option<String> {
        self.hint.clone()
    }
}
