use asn1::Value;

use crate::error::Result;

#[derive(Clone, Copy, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    pub(crate) fn render(self, value: &Value) -> Result<String> {
        Ok(match self {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yml::to_string(value)?,
        })
    }
}
