use std::process::ExitCode;

fn main() -> ExitCode {
    munchy_cli::run()
}
