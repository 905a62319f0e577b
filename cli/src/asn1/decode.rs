use asn1::{DecodeOptions, Format, Phase};
use clap::Args;
use tracing::{debug, warn};

use crate::error::Result;
use crate::output::OutputFormat;
use crate::utils::read_input;

use super::schema::element;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the DER or PEM file. If not specified, reads from stdin
    file: Option<String>,

    /// Treat the input as PEM and decode the section with this label
    #[arg(short, long)]
    label: Option<String>,

    /// Keep going past malformed elements and report every error
    #[arg(long)]
    partial: bool,

    /// Print the tagged and content offsets of every element
    #[arg(long)]
    track: bool,

    /// Deepest element nesting to follow before giving up
    #[arg(long, default_value_t = asn1::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input = read_input(config.file.as_deref())?;
    let schema = element()?;

    let format = if config.label.is_some() {
        Format::Pem
    } else {
        Format::Der
    };
    let mut events = Vec::new();
    let mut track = |path: &str, start: usize, end: usize, phase: Phase| {
        events.push(format!("{phase}\t{start}\t{end}\t{path}"));
    };
    let mut options = DecodeOptions::default()
        .partial(config.partial)
        .max_depth(config.max_depth);
    if let Some(label) = &config.label {
        options = options.label(label);
    }
    if config.track {
        options = options.track(&mut track);
    }
    debug!(%format, partial = config.partial, "decoding generic element");

    let decoded = schema.decode(&input, format, options)?;
    for err in decoded.errors() {
        warn!(error = %err, "element skipped");
    }
    if let Some(value) = decoded.value() {
        println!("{}", config.output.render(value)?);
    }
    for event in &events {
        println!("{event}");
    }
    Ok(())
}
