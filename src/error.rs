use thiserror::Error;

#[derive(Debug, Error)]
pub enum Proj4Error {
    #[error("Projection init failed (errno {code}): {message}")]
    Init { code: i32, message: String },

    #[error("Coordinate transform failed (errno {code}): {message}")]
    Transform { code: i32, message: String },

    #[error("Projection failed (errno {code}): {message}")]
    Projection { code: i32, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Interior nul byte in string passed to PROJ: {0}")]
    Nul(#[from] std::ffi::NulError),

    #[error("PROJ returned a non UTF-8 string: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`Proj4Error`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl Proj4Error {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create an invalid argument error.
    invalid_argument => InvalidArgument,
    /// Create a configuration error.
    config => ConfigError,
}

/// Generates factory methods for the errno-carrying variants. The message is
/// looked up through `pj_strerrno` so callers only pass the raw code.
macro_rules! errno_constructors {
    ($($method:ident => $variant:ident),* $(,)?) => {
        impl Proj4Error {
            $(
                pub fn $method(code: i32) -> Self {
                    Self::$variant {
                        code,
                        message: crate::ffi::proj4::errno_message(code),
                    }
                }
            )*
        }
    };
}

errno_constructors! {
    init => Init,
    transform => Transform,
    projection => Projection,
}

impl Proj4Error {
    /// The PROJ errno carried by this error, if it came from the library.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Init { code, .. } | Self::Transform { code, .. } | Self::Projection { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }
}

impl From<serde_yml::Error> for Proj4Error {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(format!("Failed to parse settings YAML: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, Proj4Error>;
