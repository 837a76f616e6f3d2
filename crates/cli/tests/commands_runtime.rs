use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use refin_cli::commands::{actions, config, simulate, transition, visibility};
use serde_json::Value;
use tempfile::TempDir;

const REFERENCE_REQUEST_TOML: &str = r#"
prazo = 96
coeficiente = "0,0193333"
seguro = 1000
percentualConsultoria = 10

[[banks]]
bank = "Margem*"
parcela = -91.98
saldoDevedor = 0

[[banks]]
bank = "SANTANDER"
parcela = "500,00"
saldoDevedor = "1000.00"
"#;

#[test]
fn simulate_reference_request_from_toml() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("proposta.toml");
        fs::write(&path, REFERENCE_REQUEST_TOML).expect("write request");

        let result = simulate::run(&path);
        assert_eq!(result.exit_code, 0, "expected successful simulation: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "simulate");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["liberadoCliente"], "16518.31");
        assert_eq!(payload["data"]["valorParcelaTotal"], "408.02");
    });
}

#[test]
fn simulate_json_request_uses_configured_default_prazo() {
    with_env(&[("REFIN_SIMULATION_DEFAULT_PRAZO", "12")], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("proposta.json");
        fs::write(
            &path,
            r#"{"banks": [{"bank": "ITAU", "parcela": 100, "saldoDevedor": 0}], "taxaMensal": "1,5"}"#,
        )
        .expect("write request");

        let result = simulate::run(&path);
        assert_eq!(result.exit_code, 0, "expected successful simulation: {}", result.output);

        let payload = parse_payload(&result.output);
        // PRICE coefficient for 1.5% over 12 installments is ~0.0916800
        let coefficient: f64 =
            payload["data"]["coeficiente"].as_str().unwrap_or("0").parse().unwrap_or(0.0);
        assert!((coefficient - 0.09168).abs() < 0.00001, "coefficient was {coefficient}");
    });
}

#[test]
fn simulate_rejects_malformed_numbers() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("proposta.toml");
        fs::write(&path, "coeficiente = \"zero\"\n[[banks]]\nbank = \"ITAU\"\nparcela = 100\n")
            .expect("write request");

        let result = simulate::run(&path);
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "malformed_input");
    });
}

#[test]
fn simulate_reports_missing_file() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let result = simulate::run(&dir.path().join("missing.toml"));
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "input_read");
    });
}

#[test]
fn simulate_fails_on_invalid_config() {
    with_env(&[("REFIN_SIMULATION_DEFAULT_PRAZO", "0")], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("proposta.toml");
        fs::write(&path, REFERENCE_REQUEST_TOML).expect("write request");

        let result = simulate::run(&path);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

#[test]
fn actions_report_denial_reasons() {
    let result = actions::run("PENDENTE_CALCULO", "atendente");
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    let permissions = payload["data"].as_array().expect("permission list");
    assert_eq!(permissions.len(), 2);
    assert_eq!(permissions[0]["action"], "calcApprove");
    assert_eq!(permissions[0]["allowed"], false);
    assert_eq!(permissions[0]["reason"], "Requires role: calculista");
}

#[test]
fn actions_reject_unknown_codes() {
    let result = actions::run("PENDENTE", "calculista");
    assert_eq!(result.exit_code, 4);
    assert_eq!(parse_payload(&result.output)["error_class"], "unknown_code");
}

#[test]
fn transition_applies_and_releases_lock() {
    let result = transition::run(transition::TransitionArgs {
        status: "ENVIADO_FINANCEIRO".to_string(),
        role: "financeiro".to_string(),
        action: "financeConfirm".to_string(),
        case_id: "C-2026-0007".to_string(),
        assigned_user: Some("user-3".to_string()),
    });
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["outcome"]["to"], "CONTRATO_ATIVADO");
    assert_eq!(payload["data"]["outcome"]["lock_released"], true);
    assert_eq!(payload["data"]["case"]["assigned_user_id"], Value::Null);
}

#[test]
fn transition_denial_surfaces_reason_verbatim() {
    let result = transition::run(transition::TransitionArgs {
        status: "EM_FECHAMENTO".to_string(),
        role: "atendente".to_string(),
        action: "closingApprove".to_string(),
        case_id: "C-2026-0008".to_string(),
        assigned_user: None,
    });
    assert_eq!(result.exit_code, 3);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "unauthorized_role");
    assert_eq!(payload["message"], "Requires role: gerente_fechamento");
}

#[test]
fn visibility_is_empty_for_unknown_roles() {
    let payload = parse_payload(&visibility::run("auditor").output);
    assert_eq!(payload["data"]["statuses"].as_array().map(Vec::len), Some(0));

    let payload = parse_payload(&visibility::run("financeiro").output);
    assert_eq!(payload["data"]["statuses"][0], "ENVIADO_FINANCEIRO");
}

#[test]
fn config_reports_env_sources() {
    with_env(&[("REFIN_SIMULATION_MARGIN_TOKEN", "ajuste")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        let entries = payload["data"].as_array().expect("config entries");
        assert_eq!(entries[0]["key"], "simulation.margin_token");
        assert_eq!(entries[0]["value"], "ajuste");
        assert_eq!(entries[0]["source"], "env (REFIN_SIMULATION_MARGIN_TOKEN)");
        assert_eq!(entries[1]["value"], "96");
        assert_eq!(entries[1]["source"], "default");
    });
}

#[test]
fn config_reports_validation_failure_as_json() {
    with_env(&[("REFIN_SIMULATION_DEFAULT_PRAZO", "0")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn simulate_rejects_coefficient_too_small_to_divide() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("proposta.json");
        fs::write(
            &path,
            r#"{"banks": [{"bank": "ITAU", "parcela": 500, "saldoDevedor": 100}], "coeficiente": "0.000000000000000000000000001"}"#,
        )
        .expect("write request");

        let result = simulate::run(&path);
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "malformed_input");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "REFIN_SIMULATION_MARGIN_TOKEN",
        "REFIN_SIMULATION_DEFAULT_PRAZO",
        "REFIN_LOGGING_LEVEL",
        "REFIN_LOGGING_FORMAT",
        "REFIN_LOG_LEVEL",
        "REFIN_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
