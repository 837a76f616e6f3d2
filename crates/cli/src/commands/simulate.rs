use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use refin_core::config::{AppConfig, LoadOptions};
use refin_core::simulation::{RefinancingSimulator, SimulationRequest};
use refin_core::{ApplicationError, DomainError};

use crate::commands::{failure_from, to_data, CommandResult, EXIT_CONFIG, EXIT_INPUT};

pub fn run(input_path: &Path) -> CommandResult {
    let correlation_id = input_path.display().to_string();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return failure_from(
                "simulate",
                "config_validation",
                ApplicationError::Configuration(format!("configuration issue: {error}")),
                &correlation_id,
                EXIT_CONFIG,
            );
        }
    };

    let request = match load_request(input_path) {
        Ok(request) => request,
        Err(error) => {
            return failure_from(
                "simulate",
                "input_read",
                ApplicationError::Input(format!("{error:#}")),
                &correlation_id,
                EXIT_INPUT,
            );
        }
    };

    let input = match request.into_input(config.simulation.default_prazo) {
        Ok(input) => input,
        Err(error) => {
            return failure_from(
                "simulate",
                "malformed_input",
                ApplicationError::from(DomainError::from(error)),
                &correlation_id,
                EXIT_INPUT,
            );
        }
    };

    let totals = config.simulation.simulator().simulate(&input);
    tracing::info!(
        event_name = "cli.simulate_finished",
        input = %correlation_id,
        bank_count = input.banks.len(),
        liberado_cliente = %totals.liberado_cliente,
        "simulation finished"
    );

    CommandResult::success_with_data(
        "simulate",
        format!("liberado ao cliente: {}", totals.liberado_cliente),
        to_data(&totals),
    )
}

fn load_request(path: &Path) -> Result<SimulationRequest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read simulation request `{}`", path.display()))?;

    let is_json = path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext == "json");
    if is_json {
        serde_json::from_str(&raw)
            .with_context(|| format!("could not parse JSON request `{}`", path.display()))
    } else {
        toml::from_str(&raw)
            .with_context(|| format!("could not parse TOML request `{}`", path.display()))
    }
}
