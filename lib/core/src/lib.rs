//! Core domain types and utilities for the StudySync platform.
//!
//! This crate provides the foundational types and shared identifiers used
//! throughout the StudySync tutoring platform.

pub mod id;

pub use id::{
    AchievementId, BookingId, MessageId, PrincipalId, ProfileId, ReviewId, StudyRoomId,
    StudySessionId, TutorProfileId,
};
