use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Header of {path} is missing columns: {}", missing.join(", "))]
    HeaderMismatch { path: PathBuf, missing: Vec<String> },
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },
}
