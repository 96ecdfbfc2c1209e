use std::process::ExitCode;
use wordfilter::cli::xmain;

fn main() -> ExitCode {
    match xmain() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
