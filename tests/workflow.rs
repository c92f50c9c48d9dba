//! End-to-end checks of the authorization + lifecycle + aggregation core,
//! composed the way the request path composes them. Everything here is
//! pure; storage behavior (upserts, compare-and-set) is exercised against
//! a real database in deployment, not in unit scope.

use time::macros::date;
use uuid::Uuid;

use tms_backend::domain::authorizer::RoleAuthorizer;
use tms_backend::domain::feedback::{aggregate, classify, Sentiment};
use tms_backend::domain::lifecycle::{
    check_precondition, transition_capability, SessionStatus,
};
use tms_backend::domain::presence::{session_stats, PresenceStatus};
use tms_backend::domain::role::{Principal, Role};
use tms_backend::error::AppError;

fn principal(role: Role) -> Principal {
    Principal {
        user_id: Uuid::now_v7(),
        display_name: "Workflow Test".to_string(),
        role,
    }
}

/// A planned session starting tomorrow, validated by a principal without
/// the validate capability: the edge exists, authorization denies.
#[test]
fn validation_without_capability_is_denied() {
    let today = date!(2026 - 03 - 01);
    let date_start = date!(2026 - 03 - 02);
    let date_end = date!(2026 - 03 - 03);

    let capability =
        transition_capability(SessionStatus::Planned, SessionStatus::Validated).unwrap();
    let actor = principal(Role::SessionParticipant);
    let err = RoleAuthorizer::authorize(&actor, capability).unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // The precondition itself would have passed.
    assert!(check_precondition(
        SessionStatus::Planned,
        SessionStatus::Validated,
        date_start,
        date_end,
        today
    )
    .is_ok());
}

/// A validated session with today inside its range, started by a principal
/// holding start-session: every gate passes.
#[test]
fn start_in_range_with_capability_is_allowed() {
    let today = date!(2026 - 03 - 02);
    let date_start = date!(2026 - 03 - 01);
    let date_end = date!(2026 - 03 - 05);

    let capability =
        transition_capability(SessionStatus::Validated, SessionStatus::InProgress).unwrap();
    let actor = principal(Role::SessionHost);
    assert!(RoleAuthorizer::authorize(&actor, capability).is_ok());
    assert!(check_precondition(
        SessionStatus::Validated,
        SessionStatus::InProgress,
        date_start,
        date_end,
        today
    )
    .is_ok());
}

/// Reopening a terminal session is rejected before any authorization or
/// precondition question arises.
#[test]
fn terminal_states_reject_every_edge() {
    for from in [SessionStatus::Completed, SessionStatus::Cancelled] {
        for to in [
            SessionStatus::Planned,
            SessionStatus::Validated,
            SessionStatus::InProgress,
            SessionStatus::Completed,
            SessionStatus::Cancelled,
        ] {
            assert!(transition_capability(from, to).is_none());
        }
    }
}

#[test]
fn five_entries_four_present_gives_eighty_percent() {
    let stats = session_stats([
        PresenceStatus::Present,
        PresenceStatus::Present,
        PresenceStatus::Present,
        PresenceStatus::Present,
        PresenceStatus::Absent,
    ]);
    assert_eq!(stats.total_recorded, 5);
    assert!((stats.presence_rate - 0.8).abs() < f64::EPSILON);
}

/// A session host asking for feedback on a session they do not host is
/// denied no matter what else the request carries.
#[test]
fn host_cannot_read_foreign_feedback() {
    let host = principal(Role::SessionHost);
    let foreign_host = Uuid::now_v7();
    let err = RoleAuthorizer::authorize_feedback_scope(&host, foreign_host).unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[test]
fn sentiment_buckets_cover_the_rating_range() {
    assert_eq!(classify(1), Sentiment::Negative);
    assert_eq!(classify(3), Sentiment::Neutral);
    assert_eq!(classify(5), Sentiment::Positive);

    let summary = aggregate(&[1, 3, 5]);
    assert_eq!(summary.count, 3);
    assert_eq!(summary.positive_count, 1);
    assert_eq!(summary.neutral_count, 1);
    assert_eq!(summary.negative_count, 1);
    assert!((summary.average_rating.unwrap() - 3.0).abs() < f64::EPSILON);
}
