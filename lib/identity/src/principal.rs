//! The authenticated principal and its session tokens.
//!
//! A principal is the identity-provider-issued view of a signed-in user.
//! The provider owns issuance and verification; this module only models
//! what the application reads off a verified session: the opaque id, the
//! email, and the self-service metadata captured at sign-up.

use serde::{Deserialize, Serialize};
use studysync_core::PrincipalId;

/// An authenticated identity issued by the identity provider.
///
/// Lifetime equals the session lifetime; the application never persists
/// principals, only the profile rows keyed by their id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque provider-issued identifier.
    pub id: PrincipalId,
    /// Email address the principal authenticated with.
    pub email: String,
    /// Self-service metadata captured at sign-up (name and role hints).
    #[serde(default)]
    pub metadata: PrincipalMetadata,
}

impl Principal {
    /// Returns the best available display-name hint.
    ///
    /// Providers populate different metadata keys depending on the sign-in
    /// method, so the OAuth-style keys are checked first, then the key the
    /// email-registration flow writes.
    #[must_use]
    pub fn display_name_hint(&self) -> Option<&str> {
        self.metadata
            .full_name
            .as_deref()
            .or(self.metadata.name.as_deref())
            .or(self.metadata.display_name.as_deref())
    }

    /// Returns the raw role hint from sign-up metadata, if present.
    #[must_use]
    pub fn role_hint(&self) -> Option<&str> {
        self.metadata.role.as_deref()
    }
}

/// Principal metadata stored with the provider at sign-up.
///
/// All fields are optional; OAuth providers and the email flow populate
/// different subsets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// The token pair carried in session cookies.
///
/// The access token is what the provider verifies on each request; the
/// refresh token lets the resolver rotate an expired access token without
/// a new login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// Bearer token presented to the provider for verification.
    pub access_token: String,
    /// Token used to mint a replacement pair when the access token expires.
    pub refresh_token: Option<String>,
    /// Advertised access-token lifetime in seconds, if the provider sent one.
    pub expires_in: Option<i64>,
}

impl SessionTokens {
    /// Creates a token pair with no advertised lifetime.
    #[must_use]
    pub fn new(access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal_with_metadata(metadata: PrincipalMetadata) -> Principal {
        Principal {
            id: PrincipalId::from("principal-1"),
            email: "alice@example.com".to_string(),
            metadata,
        }
    }

    #[test]
    fn display_name_hint_prefers_full_name() {
        let principal = principal_with_metadata(PrincipalMetadata {
            display_name: Some("display".to_string()),
            full_name: Some("Alice Liddell".to_string()),
            name: Some("alice".to_string()),
            role: None,
        });
        assert_eq!(principal.display_name_hint(), Some("Alice Liddell"));
    }

    #[test]
    fn display_name_hint_falls_back_in_order() {
        let principal = principal_with_metadata(PrincipalMetadata {
            display_name: Some("display".to_string()),
            full_name: None,
            name: Some("alice".to_string()),
            role: None,
        });
        assert_eq!(principal.display_name_hint(), Some("alice"));

        let principal = principal_with_metadata(PrincipalMetadata {
            display_name: Some("display".to_string()),
            ..PrincipalMetadata::default()
        });
        assert_eq!(principal.display_name_hint(), Some("display"));
    }

    #[test]
    fn display_name_hint_absent_when_no_metadata() {
        let principal = principal_with_metadata(PrincipalMetadata::default());
        assert!(principal.display_name_hint().is_none());
    }

    #[test]
    fn metadata_deserializes_from_provider_payload() {
        let json = r#"{"full_name": "Bob Teacher", "role": "teacher", "extra": true}"#;
        let metadata: PrincipalMetadata = serde_json::from_str(json).expect("deserialize");
        assert_eq!(metadata.full_name.as_deref(), Some("Bob Teacher"));
        assert_eq!(metadata.role.as_deref(), Some("teacher"));
    }
}
