/// All errors that can occur while converting a `.vol` container.
#[derive(Debug)]
pub enum Error {
    /// The stream ended before an expected field was fully read.
    TruncatedInput,
    /// A required literal tag did not match.
    BadMagic {
        /// The tag the container format requires at this position.
        expected: &'static str,
        /// What the file actually contained (lossily decoded).
        found: String,
    },
    /// An expected metadata element or its `value` attribute is absent.
    MissingField(&'static str),
    /// The metadata chunk could not be decoded as Shift-JIS text.
    BadTextEncoding,
    /// Decoded sample count differs from the size computed from the bounds.
    SizeMismatch {
        /// Element count implied by the axis bounding boxes.
        expected: usize,
        /// Element count actually present in the sample stream.
        actual: usize,
    },
    /// A bounding-box pair yields a non-positive axis size.
    InvalidBounds {
        /// Axis label (X, Y, or Z).
        axis: char,
        /// Inclusive lower bound as stored.
        min: i32,
        /// Inclusive upper bound as stored.
        max: i32,
    },
    /// Rotation was requested but the in-plane grid spacings differ.
    UnsupportedAnisotropicRotation {
        /// Physical grid spacing along X.
        spacing_x: f64,
        /// Physical grid spacing along Y.
        spacing_y: f64,
    },
    /// The metadata chunk is not well-formed XML.
    Xml(quick_xml::Error),
    /// An I/O error from the standard library.
    Io(std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TruncatedInput => write!(f, "unexpected end of input"),
            Error::BadMagic { expected, found } => {
                write!(f, "bad magic: expected {expected:?}, found {found:?}")
            }
            Error::MissingField(name) => write!(f, "missing metadata field: {name}"),
            Error::BadTextEncoding => write!(f, "metadata chunk is not valid Shift-JIS text"),
            Error::SizeMismatch { expected, actual } => {
                write!(f, "sample count mismatch: expected {expected}, got {actual}")
            }
            Error::InvalidBounds { axis, min, max } => {
                write!(f, "axis {axis} bounds [{min}, {max}] give a non-positive size")
            }
            Error::UnsupportedAnisotropicRotation {
                spacing_x,
                spacing_y,
            } => write!(
                f,
                "rotation requires equal X/Y grid spacing, got {spacing_x} and {spacing_y}"
            ),
            Error::Xml(e) => write!(f, "malformed metadata XML: {e}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Xml(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Xml(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncated_input() {
        let e = Error::TruncatedInput;
        assert_eq!(e.to_string(), "unexpected end of input");
    }

    #[test]
    fn display_bad_magic() {
        let e = Error::BadMagic {
            expected: "CArray3D",
            found: "CArray2D".into(),
        };
        assert_eq!(
            e.to_string(),
            "bad magic: expected \"CArray3D\", found \"CArray2D\""
        );
    }

    #[test]
    fn display_missing_field() {
        let e = Error::MissingField("tfXGridSize");
        assert_eq!(e.to_string(), "missing metadata field: tfXGridSize");
    }

    #[test]
    fn display_size_mismatch() {
        let e = Error::SizeMismatch {
            expected: 100,
            actual: 99,
        };
        assert_eq!(e.to_string(), "sample count mismatch: expected 100, got 99");
    }

    #[test]
    fn display_invalid_bounds() {
        let e = Error::InvalidBounds {
            axis: 'Y',
            min: 5,
            max: 3,
        };
        assert_eq!(e.to_string(), "axis Y bounds [5, 3] give a non-positive size");
    }

    #[test]
    fn display_anisotropic_rotation() {
        let e = Error::UnsupportedAnisotropicRotation {
            spacing_x: 0.3,
            spacing_y: 0.25,
        };
        assert_eq!(
            e.to_string(),
            "rotation requires equal X/Y grid spacing, got 0.3 and 0.25"
        );
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = std::io::Error::other("oops");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
    }

    #[test]
    fn std_error_source() {
        use std::error::Error as StdError;

        let e = Error::TruncatedInput;
        assert!(e.source().is_none());

        let e = Error::Io(std::io::Error::other("inner"));
        assert!(e.source().is_some());
    }

    #[test]
    fn result_type_alias() {
        let ok: Result<u32> = Ok(42);
        assert!(ok.is_ok());

        let err: Result<u32> = Err(Error::TruncatedInput);
        assert!(err.is_err());
    }
}
