pub(crate) mod decode;
mod schema;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Asn1Commands {
    /// Decode arbitrary DER or PEM input into a generic element tree
    Decode {
        #[command(flatten)]
        config: decode::Config,
    },
}
