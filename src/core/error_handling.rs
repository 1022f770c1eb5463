//! Error reporting at the binary boundary
//!
//! Errors that the user can fix (bad configuration, bad arguments) are
//! reported with their own message. Everything else is reported with the
//! operation that failed, with the underlying error at debug level.

/// Errors that know whether their message is meant for the user
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with the detail level its kind calls for
///
/// # Examples
/// ```rust,no_run
/// # use systemlog::core::error_handling::log_error_with_context;
/// # use systemlog::core::validation::ValidationError;
/// let err = ValidationError::new("Queue capacity must be at least 2, got 1");
/// log_error_with_context(&err, "Loading configuration");
/// // Logs: "FATAL: Queue capacity must be at least 2, got 1"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

impl ContextualError for crate::core::validation::ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(self.message())
    }
}
