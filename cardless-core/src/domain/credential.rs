//! Access/refresh credential domain model

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Access tokens expiring within this window are refreshed before use
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// Token pair issued by the secret-credential exchange
///
/// Both expiries are lifetimes counted from `issued_at`, not absolute instants.
/// Never mutated; a refresh produces a new value via [`Credential::renewed`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    access_expires: Duration,
    refresh_token: String,
    refresh_expires: Duration,
    issued_at: DateTime<Utc>,
}

/// New access token returned by the refresh endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub access_token: String,
    pub access_expires: Duration,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        access_expires: Duration,
        refresh_token: impl Into<String>,
        refresh_expires: Duration,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            access_expires,
            refresh_token: refresh_token.into(),
            refresh_expires,
            issued_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn access_expires(&self) -> Duration {
        self.access_expires
    }

    pub fn refresh_expires(&self) -> Duration {
        self.refresh_expires
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Instant at which the access token stops being accepted
    ///
    /// `None` when the lifetime reaches past the representable range.
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at.checked_add_signed(self.access_expires)
    }

    /// True when the access token expires before `now` plus the safety margin
    pub fn will_expire_shortly(&self, now: DateTime<Utc>) -> bool {
        let Some(expires_at) = self.access_expires_at() else {
            return false;
        };
        match now.checked_add_signed(Duration::seconds(EXPIRY_MARGIN_SECS)) {
            Some(deadline) => expires_at < deadline,
            None => true,
        }
    }

    /// Credential carrying a freshly granted access token
    ///
    /// The refresh token and its lifetime are carried over unchanged.
    pub fn renewed(&self, grant: AccessGrant, now: DateTime<Utc>) -> Self {
        Self {
            access_token: grant.access_token,
            access_expires: grant.access_expires,
            refresh_token: self.refresh_token.clone(),
            refresh_expires: self.refresh_expires,
            issued_at: now,
        }
    }
}

// Tokens are bearer secrets; keep them out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("access_expires", &self.access_expires)
            .field("refresh_token", &"<redacted>")
            .field("refresh_expires", &self.refresh_expires)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGrant")
            .field("access_token", &"<redacted>")
            .field("access_expires", &self.access_expires)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issued(now: DateTime<Utc>, access_secs: i64) -> Credential {
        Credential::new(
            "access",
            Duration::seconds(access_secs),
            "refresh",
            Duration::seconds(2_592_000),
            now,
        )
    }

    #[test]
    fn test_expiry_margin_boundary() {
        let now = Utc::now();
        assert!(issued(now, 9).will_expire_shortly(now));
        assert!(!issued(now, 11).will_expire_shortly(now));
    }

    #[test]
    fn test_expiry_is_relative_to_issuance() {
        let issued_at = Utc::now() - Duration::seconds(3_600);
        let credential = issued(issued_at, 3_600);
        assert!(credential.will_expire_shortly(Utc::now()));
        assert!(!credential.will_expire_shortly(issued_at));
    }

    #[test]
    fn test_lifetime_past_max_date_does_not_expire() {
        let now = Utc::now();
        let credential = issued(now, 1_000_000_000_000_000);
        assert_eq!(credential.access_expires_at(), None);
        assert!(!credential.will_expire_shortly(now));
    }

    #[test]
    fn test_renewed_keeps_refresh_token() {
        let now = Utc::now();
        let original = issued(now - Duration::seconds(86_400), 86_400);
        let renewed = original.renewed(
            AccessGrant {
                access_token: "new-access".to_string(),
                access_expires: Duration::seconds(86_400),
            },
            now,
        );

        assert_eq!(renewed.access_token(), "new-access");
        assert_eq!(renewed.refresh_token(), original.refresh_token());
        assert_eq!(renewed.refresh_expires(), original.refresh_expires());
        assert_eq!(renewed.issued_at(), now);
        assert!(!renewed.will_expire_shortly(now));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", issued(Utc::now(), 60));
        assert!(!rendered.contains("\"access\""));
        assert!(rendered.contains("<redacted>"));
    }
}
