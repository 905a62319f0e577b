use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

mod asn1;
mod error;
mod output;
mod pem;
mod utils;

use error::Result;

use crate::asn1::Asn1Commands;
use crate::pem::PemCommands;

#[derive(Parser)]
#[command(name = "kumiki")]
#[command(about = "Schema-driven ASN.1 DER/PEM toolkit", long_about = None)]
struct Cli {
    /// Log more; repeat for trace output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// PEM section operations
    Pem {
        #[command(subcommand)]
        command: PemCommands,
    },
    /// ASN.1 operations
    Asn1 {
        #[command(subcommand)]
        command: Asn1Commands,
    },
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pem { command } => match command {
            PemCommands::Decode { config } => {
                crate::pem::decode::execute(config)?;
            }
            PemCommands::Encode { config } => {
                crate::pem::encode::execute(config)?;
            }
        },
        Commands::Asn1 { command } => match command {
            Asn1Commands::Decode { config } => {
                crate::asn1::decode::execute(config)?;
            }
        },
    }

    Ok(())
}
