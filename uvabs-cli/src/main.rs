//! UVABS CLI - Command line tool for uploading corrected UV absorbance spectra.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "uvabs-cli",
    version,
    about = "UV absorbance batch processing and upload toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: uvabs_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    uvabs_cmd::run(cli.command)
}
