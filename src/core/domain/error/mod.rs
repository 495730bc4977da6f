use thiserror::Error;

/// The main error type for pvectl operations.
///
/// Fatal variants (`Connection`, `Authentication`, `Validation`, `DirectoryFetch`,
/// `Usage`) abort the invocation before any action is taken. The per-target
/// variants are converted into report outcomes and never abort a batch.
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// Represents errors that occur while talking to the API
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the request
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents authentication failures
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },

    /// The cluster resource list could not be fetched or was malformed.
    #[error("Failed to fetch cluster resources: {0}")]
    DirectoryFetch(String),

    /// A requested VMID is not present in the cluster.
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// The API refused or failed an action for one target.
    #[error("Action {action} failed for {target}: {message}")]
    ActionDispatch {
        action: String,
        target: String,
        message: String,
    },

    /// The invocation was interrupted by the operator.
    #[error("Interrupted by user")]
    Interrupted,

    /// The command line is well-formed but cannot be executed as given.
    #[error("Usage error: {0}")]
    Usage(String),
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Type alias for Results that may fail with a ProxmoxError
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;
