/// Coarse failure category, used by the pipeline to decide whether a
/// failure aborts the run or only degrades it.
///
/// Everything except `Division` is fatal: a schema or reconciliation
/// failure means the uniqueness invariants of the canonical table can no
/// longer be trusted, so no partial table is emitted. A `Division` failure
/// only affects one derived row, which is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad CLI arguments or missing environment configuration.
    Config,
    /// Network fetch or response parsing failure in a source adapter.
    Fetch,
    /// Unrecognized region/process/unit label, negative value, or a
    /// cadence violation in a source series.
    Schema,
    /// More than two candidates for one `(date, region, process)` key.
    Reconciliation,
    /// Zero denominator in a derived ratio.
    Division,
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, 2, message)
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, 4, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, 3, message)
    }

    pub fn reconciliation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reconciliation, 5, message)
    }

    pub fn division(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Division, 6, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
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
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
