use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::role::{Capability, Principal, Role, RoleCatalog};
use crate::error::AppError;

/// Pure allow/deny decisions over the role catalog. Performs no I/O;
/// denials are terminal for the request and never retried.
pub struct RoleAuthorizer;

impl RoleAuthorizer {
    /// Allow when the principal's role grants the capability.
    pub fn authorize(principal: &Principal, capability: Capability) -> Result<(), AppError> {
        if RoleCatalog::grants(principal.role, capability) {
            Ok(())
        } else {
            warn!(
                user_id = %principal.user_id,
                role = %principal.role,
                capability = %capability,
                "Capability denied"
            );
            Err(AppError::Unauthorized(format!(
                "role {} lacks capability {}",
                principal.role, capability
            )))
        }
    }

    /// Legacy-style check against an explicit list of acceptable roles.
    pub fn authorize_any(principal: &Principal, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&principal.role) {
            Ok(())
        } else {
            warn!(
                user_id = %principal.user_id,
                role = %principal.role,
                "Role not in accepted set"
            );
            Err(AppError::Unauthorized(format!(
                "role {} is not accepted for this operation",
                principal.role
            )))
        }
    }

    /// Check a capability given by its wire name. An unknown name is a
    /// configuration error and always denies.
    pub fn authorize_named(principal: &Principal, name: &str) -> Result<(), AppError> {
        match name.parse::<Capability>() {
            Ok(capability) => Self::authorize(principal, capability),
            Err(_) => {
                error!(capability = name, "Unknown capability in authorization check");
                Err(AppError::Unauthorized(format!(
                    "unknown capability {}",
                    name
                )))
            }
        }
    }

    /// Feedback read scoping: manager roles and admin read everything, a
    /// session host reads only sessions they host.
    pub fn authorize_feedback_scope(
        principal: &Principal,
        host_user_id: Uuid,
    ) -> Result<(), AppError> {
        Self::authorize(principal, Capability::ReadFeedback)?;
        if principal.role == Role::SessionHost && principal.user_id != host_user_id {
            warn!(
                user_id = %principal.user_id,
                host_user_id = %host_user_id,
                "Session host attempted to read feedback for a session they do not host"
            );
            return Err(AppError::Unauthorized(
                "session hosts may only read feedback for their own sessions".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::now_v7(),
            display_name: "Test User".to_string(),
            role,
        }
    }

    #[test]
    fn manager_may_validate_sessions() {
        let p = principal(Role::RegionalManager);
        assert!(RoleAuthorizer::authorize(&p, Capability::ValidateSession).is_ok());
    }

    #[test]
    fn participant_denied_session_validation() {
        let p = principal(Role::SessionParticipant);
        let err = RoleAuthorizer::authorize(&p, Capability::ValidateSession).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn authorize_any_accepts_listed_role() {
        let p = principal(Role::CurriculumManager);
        assert!(RoleAuthorizer::authorize_any(
            &p,
            &[Role::Admin, Role::CurriculumManager]
        )
        .is_ok());
        assert!(RoleAuthorizer::authorize_any(&p, &[Role::Admin]).is_err());
    }

    #[test]
    fn unknown_capability_name_fails_closed() {
        let p = principal(Role::Admin);
        let err = RoleAuthorizer::authorize_named(&p, "definitely-not-a-capability").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn known_capability_name_resolves() {
        let p = principal(Role::SessionHost);
        assert!(RoleAuthorizer::authorize_named(&p, "mark-presence").is_ok());
        assert!(RoleAuthorizer::authorize_named(&p, "manage-users").is_err());
    }

    #[test]
    fn host_reads_only_own_sessions() {
        let p = principal(Role::SessionHost);
        assert!(RoleAuthorizer::authorize_feedback_scope(&p, p.user_id).is_ok());
        let err =
            RoleAuthorizer::authorize_feedback_scope(&p, Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn managers_read_any_session_feedback() {
        for role in [
            Role::Admin,
            Role::FormationManager,
            Role::RegionalManager,
            Role::CurriculumManager,
        ] {
            let p = principal(role);
            assert!(RoleAuthorizer::authorize_feedback_scope(&p, Uuid::now_v7()).is_ok());
        }
    }

    #[test]
    fn participant_denied_feedback_read() {
        let p = principal(Role::SessionParticipant);
        assert!(RoleAuthorizer::authorize_feedback_scope(&p, Uuid::now_v7()).is_err());
    }
}
