use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use time::Date;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::db::models::formation::{Formation, NewFormation, UpdateFormation};
use crate::db::models::session::{NewSession, Session, UpdateSession};
use crate::db::repositories::formation_repository::FormationRepository;
use crate::db::repositories::session_repository::SessionRepository;
use crate::db::repositories::user_repository::UserRepository;
use crate::domain::authorizer::RoleAuthorizer;
use crate::domain::role::{Capability, Principal, Role, RoleCatalog};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "session_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Planned,
    Validated,
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Planned => "planned",
            SessionStatus::Validated => "validated",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "formation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FormationStatus {
    Draft,
    PendingValidation,
    Validated,
    Cancelled,
}

impl FormationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormationStatus::Draft => "draft",
            FormationStatus::PendingValidation => "pending_validation",
            FormationStatus::Validated => "validated",
            FormationStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FormationStatus::Validated | FormationStatus::Cancelled)
    }
}

impl fmt::Display for FormationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The session transition table. `None` means the edge does not exist.
pub fn transition_capability(from: SessionStatus, to: SessionStatus) -> Option<Capability> {
    use SessionStatus::*;
    match (from, to) {
        (Planned, Validated) => Some(Capability::ValidateSession),
        (Planned, Cancelled) | (Validated, Cancelled) | (InProgress, Cancelled) => {
            Some(Capability::CancelSession)
        }
        (Validated, InProgress) => Some(Capability::StartSession),
        (InProgress, Completed) => Some(Capability::CompleteSession),
        _ => None,
    }
}

/// Date preconditions for an edge already known to be in the table.
pub fn check_precondition(
    from: SessionStatus,
    to: SessionStatus,
    date_start: Date,
    date_end: Date,
    today: Date,
) -> AppResult<()> {
    use SessionStatus::*;
    match (from, to) {
        (Planned, Validated) if date_start < today => Err(AppError::PreconditionFailed(
            "cannot validate a session whose start date is in the past".to_string(),
        )),
        (Validated, InProgress) if today < date_start || today > date_end => {
            Err(AppError::PreconditionFailed(
                "session can only be started between its start and end dates".to_string(),
            ))
        }
        (InProgress, Completed) if today < date_end => Err(AppError::PreconditionFailed(
            "session can only be completed on or after its end date".to_string(),
        )),
        _ => Ok(()),
    }
}

/// The formation transition table.
pub fn formation_transition_capability(
    from: FormationStatus,
    to: FormationStatus,
) -> Option<Capability> {
    use FormationStatus::*;
    match (from, to) {
        (Draft, PendingValidation) => Some(Capability::CreateFormation),
        (PendingValidation, Validated) => Some(Capability::ValidateFormation),
        (Draft, Cancelled) | (PendingValidation, Cancelled) | (Validated, Cancelled) => {
            Some(Capability::CancelFormation)
        }
        _ => None,
    }
}

pub fn validate_date_range(date_start: Date, date_end: Date) -> AppResult<()> {
    if date_end < date_start {
        return Err(AppError::Validation(
            "date_end must be on or after date_start".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_max_participants(max_participants: Option<i32>) -> AppResult<()> {
    if let Some(max) = max_participants {
        if max <= 0 {
            return Err(AppError::Validation(
                "max_participants must be greater than zero".to_string(),
            ));
        }
    }
    Ok(())
}

/// The assigned host must hold a role granting the hosting capability.
pub fn ensure_hosting_role(role: Role) -> AppResult<()> {
    if RoleCatalog::grants(role, Capability::HostSession) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "user with role {} cannot be assigned as session host",
            role
        )))
    }
}

/// Orchestrates every mutation that touches a session's status or host
/// assignment. No other code path writes the status column.
pub struct SessionLifecycle;

impl SessionLifecycle {
    pub async fn create(
        pool: &PgPool,
        draft: &NewSession,
        principal: &Principal,
    ) -> AppResult<Session> {
        RoleAuthorizer::authorize(principal, Capability::CreateSession)?;
        draft.validate()?;
        validate_date_range(draft.date_start, draft.date_end)?;
        validate_max_participants(draft.max_participants)?;

        let host = UserRepository::find_by_id(pool, draft.host_user_id)
            .await?
            .ok_or_else(|| AppError::Validation("host user does not exist".to_string()))?;
        ensure_hosting_role(host.role)?;

        let session = SessionRepository::insert(pool, draft).await?;
        info!(session_id = %session.id, host = %session.host_user_id, "Session created");
        Ok(session)
    }

    /// Apply a field patch, then (if the patch carries a status) route the
    /// status change through `apply_transition`.
    pub async fn update(
        pool: &PgPool,
        session_id: Uuid,
        patch: &UpdateSession,
        principal: &Principal,
        today: Date,
    ) -> AppResult<Session> {
        patch.validate()?;

        let mut session = SessionRepository::find_by_id(pool, session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("session {}", session_id)))?;

        if patch.has_field_changes() {
            RoleAuthorizer::authorize(principal, Capability::UpdateSession)?;

            if session.status.is_terminal() {
                return Err(AppError::PreconditionFailed(format!(
                    "cannot edit a {} session",
                    session.status
                )));
            }

            let date_start = patch.date_start.unwrap_or(session.date_start);
            let date_end = patch.date_end.unwrap_or(session.date_end);
            validate_date_range(date_start, date_end)?;
            validate_max_participants(patch.max_participants.or(session.max_participants))?;

            if let Some(host_user_id) = patch.host_user_id {
                let host = UserRepository::find_by_id(pool, host_user_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Validation("host user does not exist".to_string())
                    })?;
                ensure_hosting_role(host.role)?;
            }

            session = SessionRepository::update_fields(pool, session_id, patch).await?;
        }

        if let Some(target) = patch.status {
            session = Self::apply_transition(pool, session_id, target, principal, today).await?;
        }

        Ok(session)
    }

    /// Validate and commit one status transition. Rejection order: edge not
    /// in the table, then authorization, then date precondition. The commit
    /// is a compare-and-set against the status the checks ran on; a
    /// concurrent writer surfaces as `Conflict`.
    pub async fn apply_transition(
        pool: &PgPool,
        session_id: Uuid,
        target: SessionStatus,
        principal: &Principal,
        today: Date,
    ) -> AppResult<Session> {
        let session = SessionRepository::find_by_id(pool, session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("session {}", session_id)))?;

        let capability =
            transition_capability(session.status, target).ok_or(AppError::InvalidTransition {
                from: session.status.to_string(),
                to: target.to_string(),
            })?;
        RoleAuthorizer::authorize(principal, capability)?;
        check_precondition(session.status, target, session.date_start, session.date_end, today)?;

        let updated = SessionRepository::commit_transition(pool, session_id, session.status, target)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "session {} changed status concurrently",
                    session_id
                ))
            })?;

        info!(
            session_id = %session_id,
            from = %session.status,
            to = %target,
            actor = %principal.user_id,
            "Session transition committed"
        );
        Ok(updated)
    }
}

/// Same single-writer discipline for formations.
pub struct FormationLifecycle;

impl FormationLifecycle {
    pub async fn create(
        pool: &PgPool,
        draft: &NewFormation,
        principal: &Principal,
    ) -> AppResult<Formation> {
        RoleAuthorizer::authorize(principal, Capability::CreateFormation)?;
        draft.validate()?;
        validate_date_range(draft.date_start, draft.date_end)?;

        let formation = FormationRepository::insert(pool, draft, principal.user_id).await?;
        info!(formation_id = %formation.id, "Formation created");
        Ok(formation)
    }

    pub async fn update(
        pool: &PgPool,
        formation_id: Uuid,
        patch: &UpdateFormation,
        principal: &Principal,
    ) -> AppResult<Formation> {
        patch.validate()?;

        let mut formation = FormationRepository::find_by_id(pool, formation_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("formation {}", formation_id)))?;

        if patch.has_field_changes() {
            RoleAuthorizer::authorize(principal, Capability::CreateFormation)?;
            Self::ensure_owner_or_admin(&formation, principal)?;

            if formation.status.is_terminal() {
                return Err(AppError::PreconditionFailed(format!(
                    "cannot edit a {} formation",
                    formation.status
                )));
            }

            let date_start = patch.date_start.unwrap_or(formation.date_start);
            let date_end = patch.date_end.unwrap_or(formation.date_end);
            validate_date_range(date_start, date_end)?;

            formation = FormationRepository::update_fields(pool, formation_id, patch).await?;
        }

        if let Some(target) = patch.status {
            formation = Self::apply_transition(pool, formation_id, target, principal).await?;
        }

        Ok(formation)
    }

    pub async fn apply_transition(
        pool: &PgPool,
        formation_id: Uuid,
        target: FormationStatus,
        principal: &Principal,
    ) -> AppResult<Formation> {
        let formation = FormationRepository::find_by_id(pool, formation_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("formation {}", formation_id)))?;

        let capability = formation_transition_capability(formation.status, target).ok_or(
            AppError::InvalidTransition {
                from: formation.status.to_string(),
                to: target.to_string(),
            },
        )?;
        RoleAuthorizer::authorize(principal, capability)?;

        // Submitting a draft is reserved to its owning manager.
        if formation.status == FormationStatus::Draft
            && target == FormationStatus::PendingValidation
        {
            Self::ensure_owner_or_admin(&formation, principal)?;
        }

        let updated =
            FormationRepository::commit_transition(pool, formation_id, formation.status, target)
                .await?
                .ok_or_else(|| {
                    AppError::Conflict(format!(
                        "formation {} changed status concurrently",
                        formation_id
                    ))
                })?;

        info!(
            formation_id = %formation_id,
            from = %formation.status,
            to = %target,
            actor = %principal.user_id,
            "Formation transition committed"
        );
        Ok(updated)
    }

    fn ensure_owner_or_admin(formation: &Formation, principal: &Principal) -> AppResult<()> {
        if principal.role == Role::Admin || formation.manager_user_id == principal.user_id {
            Ok(())
        } else {
            Err(AppError::Unauthorized(
                "only the owning manager or an admin may modify this formation".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const ALL_SESSION_STATUSES: [SessionStatus; 5] = [
        SessionStatus::Planned,
        SessionStatus::Validated,
        SessionStatus::InProgress,
        SessionStatus::Completed,
        SessionStatus::Cancelled,
    ];

    #[test]
    fn transition_table_matches_design() {
        use SessionStatus::*;
        assert_eq!(
            transition_capability(Planned, Validated),
            Some(Capability::ValidateSession)
        );
        assert_eq!(
            transition_capability(Planned, Cancelled),
            Some(Capability::CancelSession)
        );
        assert_eq!(
            transition_capability(Validated, Cancelled),
            Some(Capability::CancelSession)
        );
        assert_eq!(
            transition_capability(Validated, InProgress),
            Some(Capability::StartSession)
        );
        assert_eq!(
            transition_capability(InProgress, Cancelled),
            Some(Capability::CancelSession)
        );
        assert_eq!(
            transition_capability(InProgress, Completed),
            Some(Capability::CompleteSession)
        );
        // Skipping states is never allowed.
        assert_eq!(transition_capability(Planned, InProgress), None);
        assert_eq!(transition_capability(Planned, Completed), None);
        assert_eq!(transition_capability(Validated, Completed), None);
    }

    #[test]
    fn completed_and_cancelled_are_absorbing() {
        for to in ALL_SESSION_STATUSES {
            assert_eq!(transition_capability(SessionStatus::Completed, to), None);
            assert_eq!(transition_capability(SessionStatus::Cancelled, to), None);
        }
    }

    #[test]
    fn self_transitions_are_rejected() {
        for status in ALL_SESSION_STATUSES {
            assert_eq!(transition_capability(status, status), None);
        }
    }

    #[test]
    fn validate_requires_future_start() {
        let start = date!(2026 - 03 - 10);
        let end = date!(2026 - 03 - 12);
        assert!(check_precondition(
            SessionStatus::Planned,
            SessionStatus::Validated,
            start,
            end,
            date!(2026 - 03 - 10)
        )
        .is_ok());
        assert!(check_precondition(
            SessionStatus::Planned,
            SessionStatus::Validated,
            start,
            end,
            date!(2026 - 03 - 09)
        )
        .is_ok());
        let err = check_precondition(
            SessionStatus::Planned,
            SessionStatus::Validated,
            start,
            end,
            date!(2026 - 03 - 11),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
    }

    #[test]
    fn start_requires_today_within_range() {
        let start = date!(2026 - 03 - 10);
        let end = date!(2026 - 03 - 12);
        for today in [date!(2026 - 03 - 10), date!(2026 - 03 - 11), date!(2026 - 03 - 12)] {
            assert!(check_precondition(
                SessionStatus::Validated,
                SessionStatus::InProgress,
                start,
                end,
                today
            )
            .is_ok());
        }
        for today in [date!(2026 - 03 - 09), date!(2026 - 03 - 13)] {
            assert!(check_precondition(
                SessionStatus::Validated,
                SessionStatus::InProgress,
                start,
                end,
                today
            )
            .is_err());
        }
    }

    #[test]
    fn complete_requires_end_reached() {
        let start = date!(2026 - 03 - 10);
        let end = date!(2026 - 03 - 12);
        assert!(check_precondition(
            SessionStatus::InProgress,
            SessionStatus::Completed,
            start,
            end,
            date!(2026 - 03 - 11)
        )
        .is_err());
        assert!(check_precondition(
            SessionStatus::InProgress,
            SessionStatus::Completed,
            start,
            end,
            date!(2026 - 03 - 12)
        )
        .is_ok());
    }

    #[test]
    fn cancellation_has_no_date_precondition() {
        let start = date!(2026 - 03 - 10);
        let end = date!(2026 - 03 - 12);
        for from in [
            SessionStatus::Planned,
            SessionStatus::Validated,
            SessionStatus::InProgress,
        ] {
            assert!(check_precondition(
                from,
                SessionStatus::Cancelled,
                start,
                end,
                date!(2030 - 01 - 01)
            )
            .is_ok());
        }
    }

    #[test]
    fn formation_table_matches_design() {
        use FormationStatus::*;
        assert_eq!(
            formation_transition_capability(Draft, PendingValidation),
            Some(Capability::CreateFormation)
        );
        assert_eq!(
            formation_transition_capability(PendingValidation, Validated),
            Some(Capability::ValidateFormation)
        );
        for from in [Draft, PendingValidation, Validated] {
            assert_eq!(
                formation_transition_capability(from, Cancelled),
                Some(Capability::CancelFormation)
            );
        }
        // No shortcut from draft to validated, nothing leaves terminals.
        assert_eq!(formation_transition_capability(Draft, Validated), None);
        for to in [Draft, PendingValidation, Validated, Cancelled] {
            assert_eq!(formation_transition_capability(Cancelled, to), None);
            assert_eq!(formation_transition_capability(Validated, to).is_some(), to == Cancelled);
        }
    }

    #[test]
    fn date_range_validation() {
        assert!(validate_date_range(date!(2026 - 01 - 01), date!(2026 - 01 - 01)).is_ok());
        assert!(validate_date_range(date!(2026 - 01 - 02), date!(2026 - 01 - 01)).is_err());
    }

    #[test]
    fn max_participants_must_be_positive() {
        assert!(validate_max_participants(None).is_ok());
        assert!(validate_max_participants(Some(12)).is_ok());
        assert!(validate_max_participants(Some(0)).is_err());
        assert!(validate_max_participants(Some(-3)).is_err());
    }

    #[test]
    fn hosting_role_check() {
        assert!(ensure_hosting_role(Role::SessionHost).is_ok());
        assert!(ensure_hosting_role(Role::Admin).is_ok());
        assert!(ensure_hosting_role(Role::SessionParticipant).is_err());
        assert!(ensure_hosting_role(Role::FormationManager).is_err());
    }
}
