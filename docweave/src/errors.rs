use backtrace::Backtrace;
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for docweave operations.
///
/// # Examples
///
/// ```rust,ignore
/// use docweave::errors::{WeaveError, ErrorKind, WeaveResult};
///
/// fn example() -> WeaveResult<()> {
///     Err(WeaveError::new("Embed not found", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// An entity (document) or an embed descriptor does not exist
    NotFound,
    /// A uniqueness violation, such as inserting a duplicate `_id`
    Conflict,
    /// The query or input is malformed
    Invalid,
    /// The underlying store failed to execute an operation
    StoreFailure,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::Conflict => write!(f, "Conflict"),
            ErrorKind::Invalid => write!(f, "Invalid"),
            ErrorKind::StoreFailure => write!(f, "Store failure"),
        }
    }
}

/// Machine readable error names shared by the engine.
pub const UNKNOWN_EMBED: &str = "unknown_embed";
pub const INSERT_ERROR: &str = "insert_error";
pub const INVALID_QUERY: &str = "invalid_query";
pub const STORE_ERROR: &str = "store_error";
pub const CONFLICT: &str = "conflict";

/// Custom docweave error type.
///
/// `WeaveError` carries a human readable message, an [ErrorKind], a machine
/// readable `code` such as `question_not_found` or `unknown_embed`, the ids of
/// the entities the error refers to, and an optional cause.
///
/// # Examples
///
/// ```rust,ignore
/// use docweave::errors::{WeaveError, ErrorKind};
///
/// let cause = WeaveError::new("disk unavailable", ErrorKind::StoreFailure);
/// let err = WeaveError::new_with_cause("Insert failed", ErrorKind::StoreFailure, cause)
///     .with_code("insert_error");
/// assert_eq!(err.code(), "insert_error");
/// ```
#[derive(Clone)]
pub struct WeaveError {
    message: String,
    error_kind: ErrorKind,
    code: String,
    entities: Vec<i64>,
    cause: Option<Box<WeaveError>>,
    backtrace: Arc<Mutex<Backtrace>>,
}

impl WeaveError {
    /// Creates a new `WeaveError` with the specified message and error kind.
    ///
    /// The code defaults to a generic name derived from the kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        let code = default_code(&error_kind).to_string();
        WeaveError {
            message: message.to_string(),
            error_kind,
            code,
            entities: Vec::new(),
            cause: None,
            backtrace: Arc::new(Mutex::new(Backtrace::new())),
        }
    }

    /// Creates a new `WeaveError` wrapping a cause.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: WeaveError) -> Self {
        let mut error = WeaveError::new(message, error_kind);
        error.cause = Some(Box::new(cause));
        error
    }

    /// Creates a `<entity>_not_found` error for a document lookup in `collection`.
    pub fn entity_not_found(collection: &str, id: Option<i64>) -> Self {
        let entity = entity_name(collection);
        let mut error = WeaveError::new(
            &format!("{} not found in collection {}", entity, collection),
            ErrorKind::NotFound,
        )
        .with_code(&format!("{}_not_found", entity));
        if let Some(id) = id {
            error.entities.push(id);
        }
        error
    }

    /// Replaces the machine readable code.
    pub fn with_code(mut self, code: &str) -> Self {
        self.code = code.to_string();
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Ids of the documents this error refers to, if any.
    pub fn entities(&self) -> &[i64] {
        &self.entities
    }

    pub fn cause(&self) -> Option<&WeaveError> {
        self.cause.as_deref()
    }
}

fn default_code(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::Conflict => CONFLICT,
        ErrorKind::Invalid => INVALID_QUERY,
        ErrorKind::StoreFailure => STORE_ERROR,
    }
}

/// Singular entity name of a collection, used to build `<entity>_not_found` codes.
///
/// `categories` becomes `category`, `questions` becomes `question`; names
/// without a plural suffix are returned unchanged.
pub fn entity_name(collection: &str) -> String {
    if let Some(stem) = collection.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    match collection.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
        _ => collection.to_string(),
    }
}

impl Display for WeaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for WeaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "[{}] {}\nCaused by: {:?}", self.code, self.message, cause),
            None => write!(f, "[{}] {}\n{:?}", self.code, self.message, self.backtrace.lock()),
        }
    }
}

impl Error for WeaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for docweave operations.
pub type WeaveResult<T> = Result<T, WeaveError>;

impl From<regex::Error> for WeaveError {
    fn from(err: regex::Error) -> Self {
        WeaveError::new(&format!("Invalid pattern: {}", err), ErrorKind::Invalid)
    }
}

impl From<std::io::Error> for WeaveError {
    fn from(err: std::io::Error) -> Self {
        WeaveError::new(&format!("IO error: {}", err), ErrorKind::StoreFailure)
    }
}

impl From<String> for WeaveError {
    fn from(msg: String) -> Self {
        WeaveError::new(&msg, ErrorKind::StoreFailure)
    }
}

impl From<&str> for WeaveError {
    fn from(msg: &str) -> Self {
        WeaveError::new(msg, ErrorKind::StoreFailure)
    }
}
