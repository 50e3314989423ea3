use thiserror::Error;

/// Failure reported by a document-store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Access rules rejected the read or write.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// The query needs a backend index that does not exist yet.
    #[error("index missing: {message}")]
    IndexMissing { message: String },

    /// An `update` write targeted a document that does not exist.
    #[error("document not found: {path}")]
    NotFound { path: String },

    /// The query or write is malformed for this backend.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Backend unreachable or failed for a transient reason.
    #[error("backend unavailable: {message}")]
    Unavailable { message: String },

    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Normalized error handed to callers of the service layer.
///
/// Backend error shapes never cross this boundary: every [`StoreError`] is
/// classified into one of these kinds.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller-supplied input failed a precondition.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// A referenced document does not exist.
    #[error("{entity} not found")]
    NotFound { entity: String },

    /// The backend refused the operation.
    #[error("permission denied: {message}")]
    Permission { message: String },

    /// A range or array query needs an index that is still being built.
    #[error("index missing: {message}")]
    IndexMissing { message: String },

    /// Any other backend or network failure.
    #[error("transient failure: {message}")]
    Transient { message: String },
}

impl ServiceError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound { entity: entity.into() }
    }

    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Validation(err) => err
                .issues
                .first()
                .map(|issue| issue.message.clone())
                .unwrap_or_else(|| "Girilen bilgiler geçersiz.".to_string()),
            ServiceError::NotFound { .. } => "İstenen içerik bulunamadı.".to_string(),
            ServiceError::Permission { .. } => {
                "Bu işlemi yapmak için yetkiniz yok. Lütfen uygulama yöneticisiyle iletişime geçin.".to_string()
            }
            ServiceError::IndexMissing { .. } => {
                "Arama dizini oluşturuluyor. Lütfen daha sonra tekrar deneyin.".to_string()
            }
            ServiceError::Transient { .. } => "Bir hata oluştu. Lütfen tekrar deneyin.".to_string(),
        }
    }

    pub fn is_index_missing(&self) -> bool {
        matches!(self, ServiceError::IndexMissing { .. })
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PermissionDenied { message } => ServiceError::Permission { message },
            StoreError::IndexMissing { message } => ServiceError::IndexMissing { message },
            StoreError::NotFound { path } => ServiceError::NotFound { entity: path },
            other => ServiceError::Transient {
                message: other.to_string(),
            },
        }
    }
}

/// Collection of validation issues encountered while preparing a write.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns `Err(self)` when any issue was collected.
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub type ServiceResult<T> = Result<T, ServiceError>;
