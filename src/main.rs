use clap::Parser;
use tast::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
