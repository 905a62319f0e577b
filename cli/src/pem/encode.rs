use clap::Args;
use pem::{Label, Pem};

use crate::error::Result;
use crate::utils::read_input;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the DER file. If not specified, reads from stdin
    file: Option<String>,

    /// Label of the section to write, e.g. CERTIFICATE
    #[arg(short, long)]
    label: String,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let der = read_input(config.file.as_deref())?;
    let pem = Pem::from_bytes(Label::new(&config.label), &der);
    println!("{pem}");
    Ok(())
}
