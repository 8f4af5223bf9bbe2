//! Caller-facing error taxonomy for account operations
//!
//! Every variant carries a stable wire error code, a transport status and the
//! human-readable message the response layer renders verbatim. Store faults
//! never surface directly: they are logged and folded into
//! [`AccountError::Internal`].

use iam_types::StoreError;
use thiserror::Error;

/// Machine-readable category of an [`AccountError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    DeleteConflict,
    CapacityExceeded,
    Unauthorized,
    InvalidInput,
    InternalFailure,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("The request was rejected because it referenced an entity that does not exist. ")]
    NoSuchEntity,

    #[error("The request was rejected because it attempted to create an account that already exists.")]
    AccountAlreadyExists,

    #[error("The request was rejected because account with this access key already exists.")]
    AccessKeyAlreadyExists,

    /// Subordinate entities remain; `detail` names them
    #[error(
        "The request was rejected because it attempted to delete a resource that has attached \
         subordinate entities. The error message describes these entities."
    )]
    DeleteConflict { detail: String },

    #[error("The request was rejected because maximum limit(i.e {limit}) of account creation has exceeded.")]
    MaxAccountLimitExceeded { limit: usize },

    #[error(
        "You are not authorized to perform this operation. Check your IAM policies, and ensure that \
         you are using the correct access keys. "
    )]
    Unauthorized,

    #[error("An invalid or out-of-range value was supplied for the input parameter: {0}")]
    InvalidInput(String),

    /// Unexpected failure; the reason is for logs only
    #[error("The request processing has failed because of an unknown error, exception or failure.")]
    Internal(String),
}

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::NoSuchEntity => ErrorKind::NotFound,
            AccountError::AccountAlreadyExists | AccountError::AccessKeyAlreadyExists => {
                ErrorKind::AlreadyExists
            },
            AccountError::DeleteConflict { .. } => ErrorKind::DeleteConflict,
            AccountError::MaxAccountLimitExceeded { .. } => ErrorKind::CapacityExceeded,
            AccountError::Unauthorized => ErrorKind::Unauthorized,
            AccountError::InvalidInput(_) => ErrorKind::InvalidInput,
            AccountError::Internal(_) => ErrorKind::InternalFailure,
        }
    }

    /// Stable wire error code
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::NoSuchEntity => "NoSuchEntity",
            AccountError::AccountAlreadyExists => "EntityAlreadyExists",
            AccountError::AccessKeyAlreadyExists => "AccessKeyAlreadyExists",
            AccountError::DeleteConflict { .. } => "DeleteConflict",
            AccountError::MaxAccountLimitExceeded { .. } => "MaxAccountLimitExceeded",
            AccountError::Unauthorized => "UnauthorizedOperation",
            AccountError::InvalidInput(_) => "InvalidParameterValue",
            AccountError::Internal(_) => "InternalFailure",
        }
    }

    /// Transport status code
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyExists | ErrorKind::DeleteConflict => 409,
            ErrorKind::CapacityExceeded => 403,
            ErrorKind::Unauthorized => 401,
            ErrorKind::InvalidInput => 400,
            ErrorKind::InternalFailure => 500,
        }
    }

    /// Short outcome label used in spans and metrics
    pub fn outcome(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::DeleteConflict => "delete_conflict",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::InternalFailure => "internal_failure",
        }
    }
}

pub type AccountResult<T> = std::result::Result<T, AccountError>;

/// Build a `map_err` adapter that logs a store fault and hides it behind
/// [`AccountError::Internal`].
pub(crate) fn store_fault(context: &'static str) -> impl FnOnce(StoreError) -> AccountError {
    move |err| {
        tracing::error!(error = %err, context, "Directory store failure");
        AccountError::Internal(format!("{context}: {err}"))
    }
}
