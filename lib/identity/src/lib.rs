//! Hosted identity provider boundary for StudySync.
//!
//! This crate provides:
//! - Provider configuration with fail-closed validation (`IdentityConfig`)
//! - The authenticated principal type (`Principal`)
//! - An HTTP client for session resolution, code exchange, and the
//!   email/password flows (`IdentityClient`)
//!
//! The application never mints or stores credentials itself: session and
//! token verification is delegated entirely to the hosted provider. This
//! crate only reads the `{id, email, metadata}` triple off verified
//! responses.

pub mod client;
pub mod config;
pub mod error;
pub mod principal;

pub use client::{EstablishedSession, IdentityApi, IdentityClient, ResolvedSession, SignUpOutcome};
pub use config::{ConfigValidationError, IdentityConfig};
pub use error::IdentityError;
pub use principal::{Principal, PrincipalMetadata, SessionTokens};
