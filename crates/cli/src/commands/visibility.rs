use refin_core::workflow::visible_statuses_for_code;

use crate::commands::{to_data, CommandResult};

pub fn run(role: &str) -> CommandResult {
    let visibility = visible_statuses_for_code(role);
    CommandResult::success_with_data("visibility", visibility.description.clone(), to_data(&visibility))
}
