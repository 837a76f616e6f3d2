use std::process::ExitCode;

fn main() -> ExitCode {
    refin_cli::run()
}
