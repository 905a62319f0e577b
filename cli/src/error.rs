use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PEM error: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("input is not valid UTF-8 text")]
    NotText,
}

pub type Result<T> = std::result::Result<T, Error>;
