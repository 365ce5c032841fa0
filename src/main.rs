//! cachefront CLI entry point.

use clap::Parser;

use cachefront::cli::{parse_error_code, run, Cli};
use cachefront::domain::errors::EXIT_CONFIG;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = parse_error_code(&err);
            // Best effort; a closed stream leaves nothing to report to
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start async runtime: {err}");
            std::process::exit(EXIT_CONFIG);
        }
    };

    let code = runtime.block_on(run(cli));
    drop(runtime);
    std::process::exit(code);
}
