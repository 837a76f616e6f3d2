use serde::{Deserialize, Serialize};

use crate::domain::case::{CaseStatus, Role};
use crate::workflow::table::{find_transition, get_available_actions, StateTransition};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPermission {
    pub action: String,
    pub to: CaseStatus,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome of gating one action for one role. Denials carry the text shown to the operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ActionDecision {
    Allowed { to: CaseStatus },
    NotAvailable { reason: String },
    Unauthorized { to: CaseStatus, reason: String },
}

impl ActionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { .. } => None,
            Self::NotAvailable { reason } | Self::Unauthorized { reason, .. } => Some(reason),
        }
    }
}

pub fn required_roles_reason(entry: &StateTransition) -> String {
    let roles: Vec<&str> = entry.requires_role.iter().map(|role| role.code()).collect();
    format!("Requires role: {}", roles.join(", "))
}

fn permission_for(entry: &StateTransition, role: Role) -> ActionPermission {
    let allowed = entry.permits(role);
    ActionPermission {
        action: entry.action.to_string(),
        to: entry.to,
        allowed,
        reason: (!allowed).then(|| required_roles_reason(entry)),
    }
}

pub fn get_allowed_actions(status: CaseStatus, role: Role) -> Vec<ActionPermission> {
    get_available_actions(status).iter().map(|entry| permission_for(entry, role)).collect()
}

/// The single gate a status mutation must pass.
pub fn can_user_perform_action(status: CaseStatus, role: Role, action: &str) -> bool {
    get_allowed_actions(status, role)
        .into_iter()
        .find(|permission| permission.action == action)
        .map(|permission| permission.allowed)
        .unwrap_or(false)
}

pub fn check_action(status: CaseStatus, role: Role, action: &str) -> ActionDecision {
    let Some(entry) = find_transition(status, action) else {
        return ActionDecision::NotAvailable {
            reason: format!("Action `{action}` is not available from status {status}"),
        };
    };

    if entry.permits(role) {
        ActionDecision::Allowed { to: entry.to }
    } else {
        ActionDecision::Unauthorized { to: entry.to, reason: required_roles_reason(entry) }
    }
}
