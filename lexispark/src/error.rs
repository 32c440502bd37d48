//! Error type for catalog, puzzle and session operations

use lexispark_core::LexisError;

/// Errors raised outside the pure core
#[derive(Debug)]
pub enum Error {
    /// Codec, selection or parsing failure from the core
    Core(LexisError),
    /// No playable category with this id
    CategoryNotFound(u32),
    /// Category definition that cannot be built
    InvalidCategory { name: String, reason: &'static str },
    /// Stored filter of a category is unreadable or misses catalog words
    StaleFilter { id: u32, reason: String },
    /// Filesystem failure
    Io(std::io::Error),
    /// Malformed JSON
    Json(serde_json::Error),
    /// Malformed base64 blob
    Base64(base64::DecodeError),
    /// Transport failure talking to the puzzle server
    #[cfg(feature = "http")]
    Http(reqwest::Error),
    /// Puzzle server answered with an error body
    Remote { status: u16, message: String },
    /// The guess was superseded or its session abandoned
    Cancelled,
    /// The puzzle rolled over to a new day before the guess was sent
    Expired,
}

impl Error {
    /// HTTP status this error maps to at a request boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Core(LexisError::NoCandidates) => 404,
            Error::Core(LexisError::InvalidCategoryId) => 400,
            Error::Core(LexisError::InvalidLabel) => 400,
            Error::Core(_) => 500,
            Error::CategoryNotFound(_) => 404,
            Error::Expired => 410,
            Error::Json(_) => 400,
            Error::Remote { status, .. } => *status,
            _ => 500,
        }
    }

    /// Whether retyping the same guess later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            Error::Http(_) => true,
            Error::Remote { status, .. } => *status >= 500,
            Error::Io(_) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Core(e) => write!(f, "{e}"),
            Error::CategoryNotFound(id) => {
                write!(f, "Category not found or no longer valid. ID: {id}")
            }
            Error::InvalidCategory { name, reason } => write!(f, "Category {name} {reason}"),
            Error::StaleFilter { id, reason } => {
                write!(f, "Filter of category {id} does not match its catalog: {reason}")
            }
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::Base64(e) => write!(f, "Invalid base64 blob: {e}"),
            #[cfg(feature = "http")]
            Error::Http(e) => write!(f, "HTTP request failed: {e}"),
            Error::Remote { status, message } => write!(f, "Server error {status}: {message}"),
            Error::Cancelled => write!(f, "Guess cancelled"),
            Error::Expired => write!(f, "Puzzle expired, a new one is available"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Core(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Base64(e) => Some(e),
            #[cfg(feature = "http")]
            Error::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LexisError> for Error {
    fn from(e: LexisError) -> Self {
        Error::Core(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Base64(e)
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;
