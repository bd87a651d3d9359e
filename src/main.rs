use std::env;
use std::io::{self, Write};
use std::path::Path;

use bf_vm::cli_util::print_error;
use bf_vm::commands::run::{self, RunArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "bf",
    version,
    about = "Run a Brainfuck program on a bounded byte tape"
)]
struct Cli {
    #[command(flatten)]
    args: RunArgs,
}

fn main() {
    // Program name for diagnostics, e.g. "bf: Parse error: ..."
    let program = env::args()
        .next()
        .as_deref()
        .and_then(|p| Path::new(p).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();

    // Flush whatever the program printed before a ctrl+c kills it.
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(130);
    }) {
        print_error(&program, &format!("failed to set ctrl+c handler: {e}"));
    }

    std::process::exit(run::run(&program, cli.args));
}
