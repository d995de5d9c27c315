use idpconfgen::core::dssp::DsspError;
use idpconfgen::core::identifiers::PdbIdError;
use idpconfgen::core::io::ReadError;
use idpconfgen::core::io::pdb::PdbError;
use idpconfgen::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Pdb(#[from] PdbError),

    #[error(transparent)]
    DsspData(#[from] DsspError),

    #[error(transparent)]
    PdbId(#[from] PdbIdError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Secondary-structure command failed for '{path}': {stderr}", path = path.display())]
    DsspCommand { path: PathBuf, stderr: String },

    #[error("Download failed for entry '{0}' from all known sources")]
    DownloadFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
