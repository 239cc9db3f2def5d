/// Broad failure classes.
///
/// Every kind maps to a stable process exit code so wrapper scripts can tell a
/// rejected grid apart from a sweep that simply found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed command-line input.
    Usage,
    /// Grid or parameter configuration that violates a model constraint.
    Config,
    /// File open / read / write / parse failures.
    Io,
    /// Numeric degeneracy that must not be swallowed (zero composition, or a
    /// sweep where no combination produced a finite score).
    Degenerate,
    /// No combination was evaluated (empty axes, fully pruned, or nothing
    /// under the requested SSR ceiling).
    EmptyResult,
    /// The sweep deadline elapsed before enumeration finished.
    Cancelled,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage => 1,
            ErrorKind::Config => 2,
            ErrorKind::Io => 3,
            ErrorKind::Degenerate => 4,
            ErrorKind::EmptyResult => 5,
            ErrorKind::Cancelled => 6,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let kinds = [
            ErrorKind::Usage,
            ErrorKind::Config,
            ErrorKind::Io,
            ErrorKind::Degenerate,
            ErrorKind::EmptyResult,
            ErrorKind::Cancelled,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.exit_code(), b.exit_code());
            }
        }
    }

    #[test]
    fn display_is_the_message() {
        let err = AppError::config("bad switch fraction");
        assert_eq!(err.to_string(), "bad switch fraction");
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
