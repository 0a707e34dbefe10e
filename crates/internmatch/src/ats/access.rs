//! Single authorization capability consulted before any ATS read, write, or score.

use serde::{Deserialize, Serialize};

use super::domain::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Recruiter,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Self::Student),
            "recruiter" | "organization" => Some(Self::Recruiter),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Recruiter => "recruiter",
            Self::Admin => "admin",
        }
    }
}

/// Authenticated caller as asserted by the upstream gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role,
        }
    }

    fn owns(&self, owner: &UserId) -> bool {
        &self.user_id == owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Modify,
    Score,
}

/// Resource under check, reduced to what the policy needs.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Resume { owner: &'a UserId },
    ParameterSet { owner: &'a UserId },
    /// Creating a new record; there is no owner yet.
    NewResume,
    NewParameterSet,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{role} '{user}' may not {action} {resource}")]
pub struct AccessDenied {
    pub user: UserId,
    pub role: &'static str,
    pub action: &'static str,
    pub resource: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    enforce_parameter_ownership: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AccessPolicy {
    pub fn new(enforce_parameter_ownership: bool) -> Self {
        Self {
            enforce_parameter_ownership,
        }
    }

    pub fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: Resource<'_>,
    ) -> Result<(), AccessDenied> {
        if self.allows(principal, action, resource) {
            Ok(())
        } else {
            Err(AccessDenied {
                user: principal.user_id.clone(),
                role: principal.role.label(),
                action: action_label(action),
                resource: resource_label(resource),
            })
        }
    }

    fn allows(&self, principal: &Principal, action: Action, resource: Resource<'_>) -> bool {
        if principal.role == Role::Admin {
            return true;
        }

        match resource {
            Resource::NewResume => principal.role == Role::Student,
            Resource::NewParameterSet => principal.role == Role::Recruiter,
            Resource::Resume { owner } => match principal.role {
                Role::Student => principal.owns(owner),
                Role::Recruiter => matches!(action, Action::Read | Action::Score),
                Role::Admin => true,
            },
            Resource::ParameterSet { owner } => match (principal.role, action) {
                (Role::Student, Action::Score) => true,
                (Role::Student, _) => false,
                (Role::Recruiter, Action::Score) => {
                    !self.enforce_parameter_ownership || principal.owns(owner)
                }
                (Role::Recruiter, _) => principal.owns(owner),
                (Role::Admin, _) => true,
            },
        }
    }
}

fn action_label(action: Action) -> &'static str {
    match action {
        Action::Read => "read",
        Action::Modify => "modify",
        Action::Score => "score with",
    }
}

fn resource_label(resource: Resource<'_>) -> &'static str {
    match resource {
        Resource::Resume { .. } => "this resume",
        Resource::ParameterSet { .. } => "this parameter set",
        Resource::NewResume => "a new resume",
        Resource::NewParameterSet => "a new parameter set",
    }
}
