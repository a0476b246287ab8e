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

    pub fn not_readable_or_writable(readable: bool, writable: bool) -> Error {
        Error(ErrorKind::NotReadableOrWritable { readable, writable }.into())
    }

    pub fn file_too_large(len: u64, max: u64) -> Error {
        Error(ErrorKind::FileTooLarge { len, max }.into())
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

    /// Returns the underlying I/O error, if this is an `Io` error.
    pub fn as_io(&self) -> Option<&std::io::Error> {
        match self.kind() {
            ErrorKind::Io { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_invalid_arg(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("file handle must be readable and writable (readable: {readable}, writable: {writable})")]
    NotReadableOrWritable { readable: bool, writable: bool },

    #[error("file length {len} exceeds the addressable region length {max}")]
    FileTooLarge { len: u64, max: u64 },

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_source_kind() {
        let err = Error::io(
            "open /tmp/x",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(err.as_io().unwrap().kind(), std::io::ErrorKind::NotFound);
        assert!(err.to_string().contains("open /tmp/x"));
    }

    #[test]
    fn test_from_io_error() {
        let err: Error = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        match err.into_kind() {
            ErrorKind::Io { context, source } => {
                assert!(context.is_empty());
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            kind => panic!("unexpected {kind:?}"),
        }
    }

    #[test]
    fn test_display() {
        let err = Error::file_too_large(1 << 32, i32::MAX as u64);
        assert_eq!(
            err.to_string(),
            "file length 4294967296 exceeds the addressable region length 2147483647"
        );
        let err = Error::invalid_arg("size", "size > 0");
        assert!(err.is_invalid_arg());
        assert_eq!(err.to_string(), "invalid argument size: size > 0");
    }
}
