//! Roles, profiles, access routing, and first-login bootstrap for StudySync.
//!
//! This crate holds the decision core of the platform's thin server glue:
//! - `Role`: the exhaustive student/teacher enumeration
//! - `Profile` / `TutorProfile`: application user records and their
//!   bootstrap defaults
//! - `ProfileStore`: the row-level store boundary with its error taxonomy
//! - `router`: the stateless per-request access decision
//! - `Bootstrapper`: idempotent creation of default rows on first login
//!
//! Everything here is pure domain logic plus an async store seam; the
//! HTTP server wires it to real cookies, a real identity provider, and a
//! real database.

pub mod bootstrap;
pub mod profile;
pub mod role;
pub mod router;
pub mod schema;
pub mod store;

pub use bootstrap::{BootstrapError, BootstrapHints, BootstrapOutcome, Bootstrapper};
pub use profile::{Profile, TutorProfile, DEFAULT_HOURLY_RATE_CENTS, DEFAULT_TUTOR_BIO};
pub use role::{ParseRoleError, Role};
pub use router::{decide, needs_profile, ProfileGate, RouteDecision};
pub use store::{ProfileStore, StoreError};
