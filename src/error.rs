//! Error types for the Osmosis execution tools

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid mnemonic phrase")]
    InvalidMnemonic,

    #[error("Invalid vote option: {0}")]
    InvalidVoteOption(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool not implemented: {0}")]
    NotImplemented(String),

    #[error("Transaction build failed: {0}")]
    Transaction(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors raised before anything was sent to the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingParameter(_)
                | Error::InvalidMnemonic
                | Error::InvalidVoteOption(_)
                | Error::InvalidAddress(_)
                | Error::InvalidArgument(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
