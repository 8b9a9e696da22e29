//! Error types for identity provider operations.
//!
//! Absence of a session is never an error here; resolvers return
//! `Ok(None)` for that. These variants cover provider connectivity,
//! rejected credentials/codes, and malformed provider responses.

use std::fmt;

/// Errors from identity provider operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The provider could not be reached or did not answer.
    ProviderUnavailable { details: String },
    /// The provider rejected an authorization code during exchange.
    CodeRejected { status: u16, reason: String },
    /// The provider rejected an email/password sign-in.
    InvalidCredentials,
    /// The provider rejected a sign-up request.
    SignUpRejected { reason: String },
    /// The provider answered with a payload we could not interpret.
    MalformedResponse { details: String },
    /// The client could not be constructed from its configuration.
    Configuration { details: String },
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable { details } => {
                write!(f, "identity provider unavailable: {details}")
            }
            Self::CodeRejected { status, reason } => {
                write!(f, "authorization code rejected ({status}): {reason}")
            }
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::SignUpRejected { reason } => write!(f, "sign-up rejected: {reason}"),
            Self::MalformedResponse { details } => {
                write!(f, "malformed provider response: {details}")
            }
            Self::Configuration { details } => {
                write!(f, "identity client configuration error: {details}")
            }
        }
    }
}

impl std::error::Error for IdentityError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_unavailable_display() {
        let err = IdentityError::ProviderUnavailable {
            details: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn code_rejected_display_includes_status() {
        let err = IdentityError::CodeRejected {
            status: 401,
            reason: "flow state expired".to_string(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("flow state expired"));
    }
}
