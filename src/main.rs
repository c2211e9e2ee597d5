use std::process::ExitCode;

use fs_guard::FsGuardError;
use fs_guard::output as out;

mod app;
mod cli;
mod logging;

fn main() -> ExitCode {
    let args = cli::parse();
    match app::run(args) {
        Ok(code) => code,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            let code = e
                .downcast_ref::<FsGuardError>()
                .map(|fe| fe.code())
                .unwrap_or(2);
            ExitCode::from(u8::try_from(code).unwrap_or(2))
        }
    }
}
