//! Authentication gate.
//!
//! A stateless predicate over an immutable [`AuthConfig`] and a
//! [`CredentialLookup`]. Malformed input is a denial, never an error.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::traits::CredentialLookup;

/// Static administrator credential, checked before any store lookup.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Authentication settings, fixed for the lifetime of the gate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Accept every request on the authorization-string path.
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub admin: Option<AdminCredential>,
}

impl AuthConfig {
    pub fn public() -> Self {
        Self {
            public: true,
            admin: None,
        }
    }

    pub fn with_admin(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            public: false,
            admin: Some(AdminCredential {
                user: user.into(),
                pass: pass.into(),
            }),
        }
    }
}

/// A decoded HTTP Basic credential pair.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub user: String,
    pub pass: String,
}

impl BasicCredentials {
    /// Decode an `Authorization` header value of the form
    /// `Basic base64(user:pass)`. The password may contain `:`.
    pub fn parse(authorization: &str) -> Option<Self> {
        let encoded = authorization.strip_prefix("Basic ")?;
        let decoded = STANDARD.decode(encoded).ok()?;
        let text = String::from_utf8(decoded).ok()?;
        let (user, pass) = text.split_once(':')?;
        Some(Self {
            user: user.to_string(),
            pass: pass.to_string(),
        })
    }

    /// Encode as an `Authorization` header value.
    pub fn to_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.user, self.pass)))
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Decides allow/deny before any store read or mutation.
#[derive(Clone, Debug, Default)]
pub struct AuthGate {
    config: AuthConfig,
}

impl AuthGate {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn is_public(&self) -> bool {
        self.config.public
    }

    /// Check an `Authorization` header value.
    ///
    /// Public mode accepts unconditionally. Otherwise the value must be a
    /// well-formed Basic credential that matches the admin credential or a
    /// stored user.
    pub fn authenticate(&self, authorization: &str, lookup: &dyn CredentialLookup) -> bool {
        if self.config.public {
            return true;
        }
        match BasicCredentials::parse(authorization) {
            Some(creds) => self.validate(&creds.user, &creds.pass, lookup),
            None => {
                debug!("rejected malformed authorization value");
                false
            }
        }
    }

    /// Check an already-decoded credential pair.
    ///
    /// Public mode does not apply here: callers on this path need the
    /// owner identity, so the pair must be valid.
    pub fn validate(&self, user: &str, pass: &str, lookup: &dyn CredentialLookup) -> bool {
        if self.is_admin(user, pass) {
            return true;
        }
        match lookup.secret(user) {
            Ok(Some(secret)) => !secret.is_empty() && secret == pass,
            Ok(None) => {
                debug!(user, "unknown user");
                false
            }
            Err(err) => {
                warn!(user, error = %err, "credential lookup failed");
                false
            }
        }
    }

    fn is_admin(&self, user: &str, pass: &str) -> bool {
        match &self.config.admin {
            Some(admin) => !admin.user.is_empty() && admin.user == user && admin.pass == pass,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use std::collections::HashMap;

    struct Users(HashMap<String, String>);

    impl Users {
        fn with(pairs: &[(&str, &str)]) -> Self {
            Self(
                pairs
                    .iter()
                    .map(|(u, p)| (u.to_string(), p.to_string()))
                    .collect(),
            )
        }
    }

    impl CredentialLookup for Users {
        fn secret(&self, user: &str) -> StoreResult<Option<String>> {
            Ok(self.0.get(user).cloned())
        }
    }

    struct Broken;

    impl CredentialLookup for Broken {
        fn secret(&self, _user: &str) -> StoreResult<Option<String>> {
            Err(StoreError::BucketMissing("users".into()))
        }
    }

    fn header(user: &str, pass: &str) -> String {
        BasicCredentials {
            user: user.into(),
            pass: pass.into(),
        }
        .to_header()
    }

    #[test]
    fn parse_basic() {
        let creds = BasicCredentials::parse("Basic YWxpY2U6czNjcjp0").unwrap();
        assert_eq!(creds.user, "alice");
        assert_eq!(creds.pass, "s3cr:t");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(BasicCredentials::parse("").is_none());
        assert!(BasicCredentials::parse("Bearer abc").is_none());
        assert!(BasicCredentials::parse("Basic !!!notbase64").is_none());
        // "alice" without a separator
        assert!(BasicCredentials::parse("Basic YWxpY2U=").is_none());
        assert!(BasicCredentials::parse("Basic   YWxpY2U6cHc=  ").is_none());
        assert!(BasicCredentials::parse("Basic YWxpY2U6cHc=\n").is_none());
    }

    #[test]
    fn public_mode_accepts_anything() {
        let gate = AuthGate::new(AuthConfig::public());
        assert!(gate.authenticate("", &Users::with(&[])));
        assert!(gate.authenticate("garbage", &Broken));
    }

    #[test]
    fn public_mode_does_not_bypass_pair_validation() {
        let gate = AuthGate::new(AuthConfig::public());
        assert!(!gate.validate("nobody", "x", &Users::with(&[])));
    }

    #[test]
    fn admin_accepted_without_lookup() {
        let gate = AuthGate::new(AuthConfig::with_admin("admin", "root"));
        assert!(gate.authenticate(&header("admin", "root"), &Broken));
        assert!(!gate.authenticate(&header("admin", "wrong"), &Broken));
    }

    #[test]
    fn stored_user_must_match_secret() {
        let gate = AuthGate::new(AuthConfig::default());
        let users = Users::with(&[("alice", "pw"), ("empty", "")]);
        assert!(gate.authenticate(&header("alice", "pw"), &users));
        assert!(!gate.authenticate(&header("alice", "nope"), &users));
        assert!(!gate.authenticate(&header("bob", "pw"), &users));
        assert!(!gate.authenticate(&header("empty", ""), &users));
    }

    #[test]
    fn lookup_failure_denies() {
        let gate = AuthGate::new(AuthConfig::default());
        assert!(!gate.authenticate(&header("alice", "pw"), &Broken));
    }

    #[test]
    fn malformed_header_denies() {
        let gate = AuthGate::new(AuthConfig::default());
        let users = Users::with(&[("alice", "pw")]);
        assert!(!gate.authenticate("alice:pw", &users));
        assert!(!gate.authenticate("Basic %%%", &users));
    }

    #[test]
    fn debug_hides_passwords() {
        let cfg = AuthConfig::with_admin("admin", "topsecret");
        assert!(!format!("{cfg:?}").contains("topsecret"));
        let creds = BasicCredentials::parse(&header("u", "topsecret")).unwrap();
        assert!(!format!("{creds:?}").contains("topsecret"));
    }
}
