//! File input/output and logging

pub mod fs;
mod source;
pub mod telemetry;

pub use fs::{OutputError, Overwrite, write_bundle_dir, write_output, write_source_pair};
pub use source::{FileSource, SourceError, read_text};
pub use telemetry::{LogFormat, LogLevel, LoggingSettings, TelemetryError};
