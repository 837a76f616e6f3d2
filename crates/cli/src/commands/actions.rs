use refin_core::workflow::get_allowed_actions;

use crate::commands::{parse_status_and_role, to_data, CommandResult, EXIT_INPUT};

pub fn run(status: &str, role: &str) -> CommandResult {
    let (status, role) = match parse_status_and_role(status, role) {
        Ok(parsed) => parsed,
        Err(error) => return CommandResult::failure("actions", "unknown_code", error.to_string(), EXIT_INPUT),
    };

    let permissions = get_allowed_actions(status, role);
    let allowed = permissions.iter().filter(|permission| permission.allowed).count();
    CommandResult::success_with_data(
        "actions",
        format!("{allowed} of {} actions from {status} allowed for {role}", permissions.len()),
        to_data(&permissions),
    )
}
