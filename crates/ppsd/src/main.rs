use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match ppsd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut stderr = io::stderr().lock();
            drop(writeln!(stderr, "ppsd: {error}"));
            ExitCode::FAILURE
        }
    }
}
