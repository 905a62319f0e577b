use std::io::{self, Write};

use clap::Args;
use kumiki::decoder::Decoder;
use pem::{Label, Pem};
use tracing::{debug, warn};

use crate::error::Result;
use crate::utils::{format_hex_dump, read_text};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the PEM file. If not specified, reads from stdin
    file: Option<String>,

    /// Label of the section to extract, e.g. CERTIFICATE
    #[arg(short, long)]
    label: String,

    /// Print a hex dump instead of raw DER bytes
    #[arg(long)]
    hex: bool,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let text = read_text(config.file.as_deref())?;
    let pem = match Pem::find(&text, &Label::new(&config.label)) {
        Ok(pem) => pem,
        Err(err) => {
            let labels = available_labels(&text);
            if !labels.is_empty() {
                warn!(available = %labels.join(", "), "requested section is missing");
            }
            return Err(err.into());
        }
    };
    let der: Vec<u8> = pem.decode()?;
    debug!(label = %pem.label(), len = der.len(), "section decoded");

    if config.hex {
        print!("{}", format_hex_dump(&der));
    } else {
        io::stdout().write_all(&der)?;
    }
    Ok(())
}

/// Labels of every well-formed section in `text`, in order of appearance.
fn available_labels(text: &str) -> Vec<String> {
    pem::parse_many(text)
        .map(|pems| pems.iter().map(|p| p.label().to_string()).collect())
        .unwrap_or_default()
}
