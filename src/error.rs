use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

/// Provides `WhatifError` and maps other errors to
/// convert to a `WhatifError`
#[derive(Debug)]
pub enum WhatifError {
    /// Scenario name is not a registered key; carries the valid key list.
    UnknownScenario { name: String, valid: Vec<String> },
    /// Out-of-range numeric input to an intervention builder or parameter set.
    InvalidParameter(String),
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    EncodeError(bincode::error::EncodeError),
    /// A run bundle could not be read back; names the offending file.
    DecodeError {
        path: PathBuf,
        source: bincode::error::DecodeError,
    },
    PlotError(String),
    WhatifError(String),
}

impl From<io::Error> for WhatifError {
    fn from(error: io::Error) -> Self {
        WhatifError::IoError(error)
    }
}

impl From<serde_json::Error> for WhatifError {
    fn from(error: serde_json::Error) -> Self {
        WhatifError::JsonError(error)
    }
}

impl From<csv::Error> for WhatifError {
    fn from(error: csv::Error) -> Self {
        WhatifError::CsvError(error)
    }
}

impl From<bincode::error::EncodeError> for WhatifError {
    fn from(error: bincode::error::EncodeError) -> Self {
        WhatifError::EncodeError(error)
    }
}

impl From<String> for WhatifError {
    fn from(error: String) -> Self {
        WhatifError::WhatifError(error)
    }
}

impl From<&str> for WhatifError {
    fn from(error: &str) -> Self {
        WhatifError::WhatifError(error.to_string())
    }
}

impl std::error::Error for WhatifError {}

impl Display for WhatifError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WhatifError::UnknownScenario { name, valid } => {
                write!(
                    f,
                    "Scenario '{name}' not found. Available: [{}]",
                    valid.join(", ")
                )
            }
            WhatifError::InvalidParameter(message) => {
                write!(f, "Invalid parameter: {message}")
            }
            WhatifError::IoError(error) => write!(f, "IO error: {error}"),
            WhatifError::JsonError(error) => write!(f, "JSON error: {error}"),
            WhatifError::CsvError(error) => write!(f, "CSV error: {error}"),
            WhatifError::EncodeError(error) => {
                write!(f, "Failed to serialize run bundle: {error}")
            }
            WhatifError::DecodeError { path, source } => {
                write!(
                    f,
                    "Failed to load run bundle '{}': {source}",
                    path.display()
                )
            }
            WhatifError::PlotError(message) => write!(f, "Plot error: {message}"),
            WhatifError::WhatifError(message) => write!(f, "Error: {message}"),
        }
    }
}
