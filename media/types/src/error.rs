/*!
    Error types for the monoeye media crates.
*/

use thiserror::Error as ThisError;

/**
    Error type for the monoeye media crates.

    Geometry and configuration errors are raised before any frame is
    processed. Decode errors are recoverable per frame, everything else
    aborts the run.
*/
#[derive(Debug, ThisError)]
pub enum Error {
    /// Plane or region dimensions that cannot describe a 4:2:0 image.
    #[error("invalid geometry: {message}")]
    InvalidGeometry { message: String },
    /// Frame rate, decimation and time base that do not divide evenly.
    #[error("configuration error: {message}")]
    Configuration { message: String },
    /// A single input frame failed to decode.
    #[error("decode error: {message}")]
    Decode { message: String },
    /// The encoder rejected a submitted frame or failed to open.
    #[error("encode error: {message}")]
    Encode { message: String },
    /// The output sink rejected a write.
    #[error("mux write error: {message}")]
    MuxWrite { message: String },
    /// Valid input that this pipeline does not handle.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },
    /// I/O error outside of the output sink (opening inputs, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /**
        Create an invalid geometry error with the given message.
    */
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /**
        Create a configuration error with the given message.
    */
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /**
        Create a decode error with the given message.
    */
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /**
        Create an encode error with the given message.
    */
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /**
        Create a mux write error with the given message.
    */
    pub fn mux_write(message: impl Into<String>) -> Self {
        Self::MuxWrite {
            message: message.into(),
        }
    }

    /**
        Create an unsupported format error with the given message.
    */
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /**
        Returns true if the pipeline may skip the offending frame and continue.
    */
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/**
    Result type alias for the monoeye media crates.
*/
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn error_display() {
        let e = Error::invalid_geometry("odd width 5759");
        assert_eq!(format!("{e}"), "invalid geometry: odd width 5759");

        let e = Error::configuration("48000 % 7 != 0");
        assert_eq!(format!("{e}"), "configuration error: 48000 % 7 != 0");

        let e = Error::mux_write("disk full");
        assert_eq!(format!("{e}"), "mux write error: disk full");
    }

    #[test]
    fn only_decode_errors_are_recoverable() {
        assert!(Error::decode("corrupt slice").is_recoverable());
        assert!(!Error::encode("rejected").is_recoverable());
        assert!(!Error::mux_write("closed").is_recoverable());
        assert!(!Error::invalid_geometry("zero").is_recoverable());
    }

    #[test]
    fn error_from_io() {
        let e = Error::from(std::io::Error::other("input went away"));
        assert!(matches!(e, Error::Io(_)));
        assert!(StdError::source(&e).is_some());
        assert_eq!(e.to_string(), "I/O error: input went away");
        assert!(!e.is_recoverable());
    }
}
