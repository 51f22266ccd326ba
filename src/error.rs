//! # Error Types
//!
//! The chord engine itself never fails: unknown roots, stray brackets and
//! blank lines all degrade to pass-through output. Errors only come from the
//! edges that read user files, namely song documents and layout configs.
//!
//! ## Error Types
//! - `MetadataError` - Invalid or missing values in the song header
//! - `FormatError` - Structural problems in a song document, with a line number
//! - `ConfigError` - Layout configuration that does not deserialize
//! - `Io` - A file the CLI was asked to read could not be read
//!
//! ## Usage
//! ```rust
//! use cancionero::{Song, SongError};
//!
//! match Song::from_source("no header here") {
//!     Ok(song) => println!("Loaded {}", song.title),
//!     Err(SongError::FormatError { line, message }) => {
//!         eprintln!("Bad song file at line {}: {}", line, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SongError {
    /// Invalid header value.
    ///
    /// # Example
    /// ```
    /// # use cancionero::SongError;
    /// let err = SongError::MetadataError("base-key 'H' is not a note of the scale".to_string());
    /// assert_eq!(err.to_string(), "Invalid song metadata: base-key 'H' is not a note of the scale");
    /// ```
    #[error("Invalid song metadata: {0}")]
    MetadataError(String),

    /// Structural error in a song document.
    ///
    /// # Example
    /// ```
    /// # use cancionero::SongError;
    /// let err = SongError::FormatError {
    ///     line: 1,
    ///     message: "expected '---' to open the song header".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Format error at line 1: expected '---' to open the song header");
    /// ```
    #[error("Format error at line {line}: {message}")]
    FormatError { line: usize, message: String },

    /// Layout configuration that could not be read.
    #[error("Invalid layout config: {0}")]
    ConfigError(String),

    /// I/O failure while reading a file from disk.
    #[error("Could not read '{path}': {message}")]
    Io { path: String, message: String },
}
