pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use refin_core::config::{AppConfig, ConfigError, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "refin",
    about = "Refinancing back-office operator CLI",
    long_about = "Run refinancing simulations and inspect case workflow permissions.",
    after_help = "Examples:\n  refin simulate --input proposta.toml\n  refin actions --status PENDENTE_CALCULO --role calculista\n  refin transition --status EM_FECHAMENTO --role gerente_fechamento --action closingApprove"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute refinancing totals from a TOML or JSON request file")]
    Simulate {
        #[arg(long, help = "Path to the simulation request (.toml or .json)")]
        input: PathBuf,
    },
    #[command(about = "List the actions of a status and whether a role may perform them")]
    Actions {
        #[arg(long)]
        status: String,
        #[arg(long)]
        role: String,
    },
    #[command(about = "Check and apply one action to a case snapshot")]
    Transition {
        #[arg(long)]
        status: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        action: String,
        #[arg(long, default_value = "unsaved")]
        case_id: String,
        #[arg(long, help = "User currently holding the case lock")]
        assigned_user: Option<String>,
    },
    #[command(about = "Show which case statuses a role sees in its queue")]
    Visibility {
        #[arg(long)]
        role: String,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

fn init_logging(config: &AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    // stdout carries the command payload, so logs go to stderr
    match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

// commands report an invalid config themselves; logging still starts from defaults
fn load_logging_config() -> (AppConfig, Option<ConfigError>) {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => (config, None),
        Err(error) => (AppConfig::default(), Some(error)),
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let (config, load_error) = load_logging_config();
    if let Err(error) = init_logging(&config) {
        eprintln!("logging disabled: {error}");
    }
    if let Some(error) = load_error {
        tracing::warn!(
            event_name = "cli.config_fallback",
            error = %error,
            "configuration failed to load; logging with defaults"
        );
    }

    let result = match cli.command {
        Command::Simulate { input } => commands::simulate::run(&input),
        Command::Actions { status, role } => commands::actions::run(&status, &role),
        Command::Transition { status, role, action, case_id, assigned_user } => {
            commands::transition::run(commands::transition::TransitionArgs {
                status,
                role,
                action,
                case_id,
                assigned_user,
            })
        }
        Command::Visibility { role } => commands::visibility::run(&role),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
