pub mod actions;
pub mod config;
pub mod simulate;
pub mod transition;
pub mod visibility;

use refin_core::{ApplicationError, CaseStatus, ParseCodeError, Role};
use serde::Serialize;
use serde_json::Value;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_DENIED: u8 = 3;
pub const EXIT_INPUT: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Maps an application failure through the interface layer, keeping its detail as the message.
pub(crate) fn failure_from(
    command: &str,
    error_class: &str,
    error: ApplicationError,
    correlation_id: &str,
    exit_code: u8,
) -> CommandResult {
    let interface = error.into_interface(correlation_id);
    tracing::warn!(
        event_name = "cli.command_failed",
        command,
        error_class,
        correlation_id = interface.correlation_id(),
        detail = interface.message(),
        "{}",
        interface.user_message()
    );
    CommandResult::failure(command, error_class, interface.message(), exit_code)
}

pub(crate) fn to_data<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

pub(crate) fn parse_status_and_role(
    status: &str,
    role: &str,
) -> Result<(CaseStatus, Role), ParseCodeError> {
    Ok((status.parse()?, role.parse()?))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
