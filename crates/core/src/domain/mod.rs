pub mod case;

pub use case::{Case, CaseId, CaseStatus, ParseCodeError, Role};
