use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    FormationManager,
    RegionalManager,
    CurriculumManager,
    SessionHost,
    SessionParticipant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::FormationManager => "formation_manager",
            Role::RegionalManager => "regional_manager",
            Role::CurriculumManager => "curriculum_manager",
            Role::SessionHost => "session_host",
            Role::SessionParticipant => "session_participant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named permission granted to one or more roles. Wire names are
/// kebab-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    CreateSession,
    UpdateSession,
    ValidateSession,
    StartSession,
    CompleteSession,
    CancelSession,
    HostSession,
    MarkPresence,
    SubmitFeedback,
    ReadFeedback,
    CreateFormation,
    ValidateFormation,
    CancelFormation,
    ManageUsers,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CreateSession => "create-session",
            Capability::UpdateSession => "update-session",
            Capability::ValidateSession => "validate-session",
            Capability::StartSession => "start-session",
            Capability::CompleteSession => "complete-session",
            Capability::CancelSession => "cancel-session",
            Capability::HostSession => "host-session",
            Capability::MarkPresence => "mark-presence",
            Capability::SubmitFeedback => "submit-feedback",
            Capability::ReadFeedback => "read-feedback",
            Capability::CreateFormation => "create-formation",
            Capability::ValidateFormation => "validate-formation",
            Capability::CancelFormation => "cancel-formation",
            Capability::ManageUsers => "manage-users",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create-session" => Ok(Capability::CreateSession),
            "update-session" => Ok(Capability::UpdateSession),
            "validate-session" => Ok(Capability::ValidateSession),
            "start-session" => Ok(Capability::StartSession),
            "complete-session" => Ok(Capability::CompleteSession),
            "cancel-session" => Ok(Capability::CancelSession),
            "host-session" => Ok(Capability::HostSession),
            "mark-presence" => Ok(Capability::MarkPresence),
            "submit-feedback" => Ok(Capability::SubmitFeedback),
            "read-feedback" => Ok(Capability::ReadFeedback),
            "create-formation" => Ok(Capability::CreateFormation),
            "validate-formation" => Ok(Capability::ValidateFormation),
            "cancel-formation" => Ok(Capability::CancelFormation),
            "manage-users" => Ok(Capability::ManageUsers),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::CreateSession,
    Capability::UpdateSession,
    Capability::ValidateSession,
    Capability::StartSession,
    Capability::CompleteSession,
    Capability::CancelSession,
    Capability::HostSession,
    Capability::MarkPresence,
    Capability::SubmitFeedback,
    Capability::ReadFeedback,
    Capability::CreateFormation,
    Capability::ValidateFormation,
    Capability::CancelFormation,
    Capability::ManageUsers,
];

const FORMATION_MANAGER_CAPABILITIES: &[Capability] = &[
    Capability::CreateFormation,
    Capability::CancelFormation,
    Capability::CreateSession,
    Capability::UpdateSession,
    Capability::ValidateSession,
    Capability::CancelSession,
    Capability::ReadFeedback,
];

const REGIONAL_MANAGER_CAPABILITIES: &[Capability] = &[
    Capability::ValidateSession,
    Capability::CancelSession,
    Capability::ReadFeedback,
];

const CURRICULUM_MANAGER_CAPABILITIES: &[Capability] = &[
    Capability::ValidateFormation,
    Capability::ReadFeedback,
];

const SESSION_HOST_CAPABILITIES: &[Capability] = &[
    Capability::HostSession,
    Capability::StartSession,
    Capability::CompleteSession,
    Capability::MarkPresence,
    Capability::ReadFeedback,
];

const SESSION_PARTICIPANT_CAPABILITIES: &[Capability] = &[Capability::SubmitFeedback];

/// Static registry mapping each role to its fixed capability set.
pub struct RoleCatalog;

impl RoleCatalog {
    pub fn capabilities(role: Role) -> &'static [Capability] {
        match role {
            Role::Admin => ADMIN_CAPABILITIES,
            Role::FormationManager => FORMATION_MANAGER_CAPABILITIES,
            Role::RegionalManager => REGIONAL_MANAGER_CAPABILITIES,
            Role::CurriculumManager => CURRICULUM_MANAGER_CAPABILITIES,
            Role::SessionHost => SESSION_HOST_CAPABILITIES,
            Role::SessionParticipant => SESSION_PARTICIPANT_CAPABILITIES,
        }
    }

    pub fn grants(role: Role, capability: Capability) -> bool {
        Self::capabilities(role).contains(&capability)
    }
}

/// An authenticated actor. Built exactly once per request by the auth
/// middleware; the role comes from the user row, never from request data.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_every_capability() {
        for capability in ADMIN_CAPABILITIES {
            assert!(RoleCatalog::grants(Role::Admin, *capability));
        }
    }

    #[test]
    fn participant_only_submits_feedback() {
        assert!(RoleCatalog::grants(
            Role::SessionParticipant,
            Capability::SubmitFeedback
        ));
        assert!(!RoleCatalog::grants(
            Role::SessionParticipant,
            Capability::MarkPresence
        ));
        assert!(!RoleCatalog::grants(
            Role::SessionParticipant,
            Capability::CreateSession
        ));
    }

    #[test]
    fn only_host_and_admin_can_host() {
        assert!(RoleCatalog::grants(Role::SessionHost, Capability::HostSession));
        assert!(RoleCatalog::grants(Role::Admin, Capability::HostSession));
        assert!(!RoleCatalog::grants(
            Role::FormationManager,
            Capability::HostSession
        ));
        assert!(!RoleCatalog::grants(
            Role::RegionalManager,
            Capability::HostSession
        ));
    }

    #[test]
    fn capability_names_round_trip() {
        for capability in ADMIN_CAPABILITIES {
            let parsed: Capability = capability.as_str().parse().unwrap();
            assert_eq!(parsed, *capability);
        }
        assert!("drop-tables".parse::<Capability>().is_err());
    }
}
