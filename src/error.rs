//! Error types for the logger
//!
//! Every fallible operation returns [`Result`]; callers decide whether to
//! log, retry, or degrade a subsystem to its offline state.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Store unreachable or malformed query
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O errors (settings, macros, export, score report)
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings or past-contacts document could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML document could not be read or written
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Radio socket or XML-RPC transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Callsign lookup service reported an error or was unreachable
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Morse keyer could not be reached
    #[error("Keyer error: {0}")]
    Keyer(String),

    /// Operator input rejected
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A contact could not be rendered into the interchange format
    #[error("Export error: {0}")]
    Export(String),

    /// No contact with the given id
    #[error("Contact not found: {0}")]
    NotFound(i64),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
