use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// A builder operation was called out of sequence.
    ///
    /// The build in progress cannot be recovered; the builder should be
    /// discarded or reset.
    pub fn invalid_state(operation: impl Into<String>, state: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidState {
                operation: operation.into(),
                state: state.into(),
            }
            .into(),
        )
    }

    pub fn capacity_exceeded(requested: usize, limit: usize) -> Error {
        Error(ErrorKind::CapacityExceeded { requested, limit }.into())
    }

    pub fn malformed(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::MalformedBuffer {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid builder state for {operation}: {state}")]
    InvalidState { operation: String, state: String },

    #[error("buffer capacity exceeded: {requested} bytes requested, limit is {limit}")]
    CapacityExceeded { requested: usize, limit: usize },

    #[error("malformed buffer at '{element}': {message}")]
    MalformedBuffer { element: String, message: String },

    #[error("checksum mismatch for '{element}'")]
    ChecksumMismatch { element: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(e: std::str::Utf8Error) -> Self {
        Error::malformed("string", e.to_string())
    }
}
