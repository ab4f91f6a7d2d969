//! Trazar CLI — declarative cloud stack composition.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "trazar",
    version,
    about = "Declarative cloud stack composition — typed resource graphs, fail-fast wiring, BLAKE3 fingerprints"
)]
struct Cli {
    #[command(subcommand)]
    command: trazar::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = trazar::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
