pub(crate) mod decode;
pub(crate) mod encode;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum PemCommands {
    /// Extract the DER payload of a labelled section
    Decode {
        #[command(flatten)]
        config: decode::Config,
    },
    /// Wrap DER bytes in a labelled section
    Encode {
        #[command(flatten)]
        config: encode::Config,
    },
}
