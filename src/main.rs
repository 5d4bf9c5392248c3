use clap::Parser;
use kolak::driver::{run, Cli};
use std::process::exit;

fn main() {
    let cli = Cli::parse();
    exit(run(cli));
}
