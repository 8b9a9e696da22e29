//! Typed records for relations the server never touches.
//!
//! These mirror the rest of the data store's schema: study sessions,
//! achievements, rooms, bookings, reviews, and messages are written and
//! read by other parts of the platform. The server carries the types so
//! the relation names and shapes live in one place (the database preflight
//! checks these relations exist), but no routing or auth path consults
//! their contents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studysync_core::{
    AchievementId, BookingId, MessageId, PrincipalId, ReviewId, StudyRoomId, StudySessionId,
};

/// How a study session was conducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Solo,
    Group,
    Tutoring,
}

/// A completed study session, the source of XP and streak updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: StudySessionId,
    pub principal_id: PrincipalId,
    pub subject: String,
    pub duration_minutes: i32,
    pub xp_earned: i32,
    pub kind: SessionKind,
    pub focus_score: Option<i32>,
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Grouping for achievement unlock criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Streak,
    Xp,
    Social,
    Focus,
    Milestone,
}

/// A badge definition; unlock criteria are opaque to this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub xp_reward: i32,
    pub badge_color: String,
    pub category: AchievementCategory,
    pub unlock_criteria: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A shared study room hosted by one principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRoom {
    pub id: StudyRoomId,
    pub name: String,
    pub subject: String,
    pub description: Option<String>,
    pub host_principal_id: PrincipalId,
    pub max_participants: i32,
    pub current_participants: i32,
    pub is_active: bool,
    pub level_requirement: String,
    /// Name of the provisioned video room, when one exists.
    pub video_room_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a tutoring booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// A student's booking of a tutor's time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorBooking {
    pub id: BookingId,
    pub student_id: PrincipalId,
    pub tutor_id: PrincipalId,
    pub subject: String,
    pub session_date: DateTime<Utc>,
    pub duration_minutes: i32,
    /// Rate at booking time, in currency minor units.
    pub hourly_rate_cents: i32,
    pub total_cost_cents: i32,
    pub status: BookingStatus,
    pub session_notes: Option<String>,
    pub video_room_name: Option<String>,
    /// Payment provider checkout session, passthrough only.
    pub payment_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A student's review of a completed booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorReview {
    pub id: ReviewId,
    pub booking_id: BookingId,
    pub student_id: PrincipalId,
    pub tutor_id: PrincipalId,
    /// 1 through 5.
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    File,
    System,
}

/// A chat message scoped to a room or a booking.
///
/// Exactly one of `room_id` and `booking_id` is set; the constraint lives
/// in the schema, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub room_id: Option<StudyRoomId>,
    pub booking_id: Option<BookingId>,
    pub sender_id: PrincipalId,
    pub content: String,
    pub kind: MessageKind,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionKind::Tutoring).expect("serialize"),
            "\"tutoring\""
        );
    }

    #[test]
    fn booking_status_round_trips() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).expect("serialize");
            let back: BookingStatus = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, status);
        }
    }

    #[test]
    fn achievement_category_rejects_unknown_values() {
        let result = serde_json::from_str::<AchievementCategory>("\"speed\"");
        assert!(result.is_err());
    }

    #[test]
    fn message_deserializes_with_nullable_scopes() {
        let json = serde_json::json!({
            "id": MessageId::new(),
            "room_id": null,
            "booking_id": BookingId::new(),
            "sender_id": "principal-1",
            "content": "see you at 4pm",
            "kind": "text",
            "file_url": null,
            "created_at": "2025-06-01T12:00:00Z",
        });
        let message: Message = serde_json::from_value(json).expect("deserialize");
        assert!(message.room_id.is_none());
        assert!(message.booking_id.is_some());
        assert_eq!(message.kind, MessageKind::Text);
    }
}
