use thiserror::Error;

/// Classification of a [`ResourceError`], independent of its message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Conflict,
    MethodNotAllowed,
    UnsupportedMediaType,
    NotAcceptable,
    Internal,
}

impl ErrorKind {
    /// The HTTP status a transport adapter reports for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::NotAcceptable => 406,
            Self::Conflict => 409,
            Self::UnsupportedMediaType => 415,
            Self::Internal => 500,
        }
    }
}

/// Errors from resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No resource exists at the identifier, or the identifier is out of scope.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed identifier, invalid relative path, or unparsable input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The target state conflicts with what already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation is not supported on this resource or store.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// No conversion exists from the supplied content type.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// No conversion exists to any of the accepted content types.
    #[error("not acceptable: {0}")]
    NotAcceptable(String),

    /// Backing-medium failure not otherwise classified.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error from the backing medium.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResourceError {
    /// The kind of this error. I/O errors reporting a missing file are
    /// classified as [`ErrorKind::NotFound`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::MethodNotAllowed(_) => ErrorKind::MethodNotAllowed,
            Self::UnsupportedMediaType(_) => ErrorKind::UnsupportedMediaType,
            Self::NotAcceptable(_) => ErrorKind::NotAcceptable,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if this is a not-found failure.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Result alias for resource operations.
pub type StoreResult<T> = Result<T, ResourceError>;
