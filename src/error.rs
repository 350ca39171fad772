use thiserror::Error;

/// Reasons a session delete is refused before anything is touched.
///
/// I/O failures during a delete are not errors here; they are collected in
/// [`crate::models::DeletionResult::errors`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteError {
    #[error("session {session_id} is live and cannot be deleted")]
    SessionLive { session_id: String },

    /// An empty id would match every history line.
    #[error("refusing to delete a session with an empty id")]
    EmptySessionId,

    /// History lines are matched by substring, so an id the history never names could
    /// match the `sessionId` key of every line.
    #[error("session {session_id} is not in the history index")]
    UnknownSession { session_id: String },
}
