use serde::Serialize;

use crate::domain::case::{CaseStatus, Role};

/// Queue filter for one role. Used to list cases, never to authorize a mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleVisibility {
    pub statuses: Vec<CaseStatus>,
    pub description: String,
}

impl RoleVisibility {
    fn new(statuses: &[CaseStatus], description: &str) -> Self {
        Self { statuses: statuses.to_vec(), description: description.to_string() }
    }

    fn empty() -> Self {
        Self { statuses: Vec::new(), description: "No visible cases for this role".to_string() }
    }

    pub fn contains(&self, status: CaseStatus) -> bool {
        self.statuses.contains(&status)
    }
}

const ATENDENTE_QUEUE: [CaseStatus; 5] = [
    CaseStatus::Disponivel,
    CaseStatus::Atribuido,
    CaseStatus::SimulacaoAprovada,
    CaseStatus::SimulacaoReprovada,
    CaseStatus::ContratoConfirmado,
];

pub fn visible_statuses_for_role(role: Role) -> RoleVisibility {
    match role {
        Role::Atendente => RoleVisibility::new(
            &ATENDENTE_QUEUE,
            "Available cases, own assignments and cases returned from calculation or closing",
        ),
        Role::Calculista => {
            RoleVisibility::new(&[CaseStatus::PendenteCalculo], "Cases waiting for calculation")
        }
        Role::GerenteFechamento => {
            RoleVisibility::new(&[CaseStatus::EmFechamento], "Cases waiting for closing approval")
        }
        Role::Financeiro => RoleVisibility::new(
            &[CaseStatus::EnviadoFinanceiro],
            "Contracts waiting for disbursement confirmation",
        ),
        Role::Superadmin => RoleVisibility::new(&CaseStatus::ALL, "All cases in every status"),
    }
}

/// Lookup by raw role code; anything unrecognized sees nothing.
pub fn visible_statuses_for_code(role_code: &str) -> RoleVisibility {
    match role_code.parse::<Role>() {
        Ok(role) => visible_statuses_for_role(role),
        Err(_) => RoleVisibility::empty(),
    }
}
