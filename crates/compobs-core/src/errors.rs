use compobs_core_types::ObserverId;
use thiserror::Error;

use crate::diff::model::ChangeKind;
use crate::identity::ItemKey;

/// Result type alias using the canonical error facility
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// The computation yields items without a derivable identity
    Configuration,
    /// Two items in one snapshot share an identity key
    DuplicateIdentity,
    /// A consumer-supplied callback returned an error
    CallbackFailed,
    /// Lifecycle misuse (start on a started or stopped observer)
    InvalidState,
    /// A change operation does not fit the mirror it is applied to
    MirrorConflict,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::DuplicateIdentity => "ERR_DUPLICATE_IDENTITY",
            ExErrorKind::CallbackFailed => "ERR_CALLBACK_FAILED",
            ExErrorKind::InvalidState => "ERR_INVALID_STATE",
            ExErrorKind::MirrorConflict => "ERR_MIRROR_CONFLICT",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context for
/// debugging. Cheap to clone so it can be both logged and handed to a
/// runtime error channel.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    observer_id: Option<ObserverId>,
    key: Option<ItemKey>,
    index: Option<usize>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            observer_id: None,
            key: None,
            index: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add observer context
    pub fn with_observer_id(mut self, id: ObserverId) -> Self {
        self.observer_id = Some(id);
        self
    }

    /// Add item key context
    pub fn with_key(mut self, key: ItemKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Add snapshot index context
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the observer context, if any
    pub fn observer_id(&self) -> Option<&ObserverId> {
        self.observer_id.as_ref()
    }

    /// Get the item key context, if any
    pub fn key(&self) -> Option<&ItemKey> {
        self.key.as_ref()
    }

    /// Get the snapshot index context, if any
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(index) = self.index {
            write!(f, " (index: {})", index)?;
        }
        if let Some(observer_id) = &self.observer_id {
            write!(f, " (observer_id: {})", observer_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Concrete failures raised by the observer, the differ and the mirror
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompObsError {
    // ===== Configuration Errors =====
    /// The identity policy could not derive a key for an item
    #[error("Item at index {index} has no derivable identity")]
    MissingIdentity { index: usize },

    // ===== Snapshot Errors =====
    /// Two items in the same snapshot share a key
    #[error("Duplicate identity {key} at indices {first_index} and {second_index}")]
    DuplicateIdentity {
        key: ItemKey,
        first_index: usize,
        second_index: usize,
    },

    // ===== Dispatch Errors =====
    /// A registered callback returned an error
    #[error("{kind} callback failed for {key}: {reason}")]
    CallbackFailed {
        kind: ChangeKind,
        key: ItemKey,
        reason: String,
    },

    // ===== Lifecycle Errors =====
    /// `start` called on an observer that is already running
    #[error("Observer is already started")]
    AlreadyStarted,

    /// `start` called on an observer that has been stopped
    #[error("Observer is stopped")]
    AlreadyStopped,

    // ===== Mirror Errors =====
    /// `added` for a key the mirror already holds
    #[error("Mirror already contains {key}")]
    MirrorKeyExists { key: ItemKey },

    /// Operation targets a key the mirror does not hold
    #[error("Mirror does not contain {key}")]
    MirrorKeyNotFound { key: ItemKey },

    /// Operation index does not point at its key, or is out of range
    #[error("Mirror holds {key} at {actual:?}, operation expects index {expected}")]
    MirrorIndexMismatch {
        key: ItemKey,
        expected: usize,
        actual: Option<usize>,
    },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<CompObsError> for ExError {
    fn from(err: CompObsError) -> Self {
        match err {
            CompObsError::MissingIdentity { index } => ExError::new(ExErrorKind::Configuration)
                .with_index(index)
                .with_message("item has no derivable identity"),
            CompObsError::DuplicateIdentity {
                key,
                first_index,
                second_index,
            } => ExError::new(ExErrorKind::DuplicateIdentity)
                .with_key(key)
                .with_index(second_index)
                .with_message(format!("identity already used at index {}", first_index)),
            CompObsError::CallbackFailed { kind, key, reason } => {
                ExError::new(ExErrorKind::CallbackFailed)
                    .with_op(kind.callback_name())
                    .with_key(key)
                    .with_message(reason)
            }
            CompObsError::AlreadyStarted => ExError::new(ExErrorKind::InvalidState)
                .with_op("start")
                .with_message("observer is already started"),
            CompObsError::AlreadyStopped => ExError::new(ExErrorKind::InvalidState)
                .with_op("start")
                .with_message("observer is stopped"),
            CompObsError::MirrorKeyExists { key } => ExError::new(ExErrorKind::MirrorConflict)
                .with_key(key)
                .with_message("key already present in mirror"),
            CompObsError::MirrorKeyNotFound { key } => ExError::new(ExErrorKind::MirrorConflict)
                .with_key(key)
                .with_message("key not present in mirror"),
            CompObsError::MirrorIndexMismatch {
                key,
                expected,
                actual,
            } => ExError::new(ExErrorKind::MirrorConflict)
                .with_key(key)
                .with_index(expected)
                .with_message(match actual {
                    Some(actual) => format!("key found at index {}", actual),
                    None => "index out of range".to_string(),
                }),
            CompObsError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}
