use std::time::Instant;

use tracing::{Span, debug, info, warn};
use uuid::Uuid;

use crate::common::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Validating,
    Resolving,
    Selecting,
    Streaming,
    Completed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Forward-only progression. `Failed` is reachable from any live state,
    /// `Completed` only from `Streaming`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Created, Validating)
            | (Validating, Resolving)
            | (Resolving, Selecting)
            | (Selecting, Streaming)
            | (Streaming, Completed) => true,
            _ => false,
        }
    }
}

/// How the byte copy of a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Completed { bytes: u64 },
    Disconnected { bytes: u64 },
    Failed { bytes: u64, error: String },
}

/// Lifecycle of one client request.
pub struct RelaySession {
    video: String,
    state: SessionState,
    started: Instant,
    span: Span,
}

impl RelaySession {
    pub fn new(video: &str) -> Self {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("session", id = %id, video = %video);
        Self {
            video: video.to_string(),
            state: SessionState::Created,
            started: Instant::now(),
            span,
        }
    }

    pub fn video(&self) -> &str {
        &self.video
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Moves to `next` if the transition is legal. Returns whether it moved.
    pub fn advance(&mut self, next: SessionState) -> bool {
        if !self.state.can_transition_to(next) {
            warn!(parent: &self.span, "illegal transition {:?} -> {:?}", self.state, next);
            return false;
        }
        debug!(parent: &self.span, "{:?} -> {:?}", self.state, next);
        self.state = next;
        true
    }

    /// Terminates the session with `err`. A session already terminated is
    /// left untouched so each failure is reported once.
    pub fn fail(&mut self, err: &RelayError) {
        if !self.advance(SessionState::Failed) {
            return;
        }
        match err {
            RelayError::InvalidIdentifier(_) => {
                warn!(parent: &self.span, "rejected: {}", err)
            }
            _ => tracing::error!(
                parent: &self.span,
                "failed after {:?}: {}",
                self.started.elapsed(),
                err
            ),
        }
    }

    pub fn finish(&mut self, outcome: &RelayOutcome) {
        let elapsed = self.started.elapsed();
        match outcome {
            RelayOutcome::Completed { bytes } => {
                if self.advance(SessionState::Completed) {
                    info!(parent: &self.span, "completed: {} bytes in {:?}", bytes, elapsed);
                }
            }
            RelayOutcome::Disconnected { bytes } => {
                if self.advance(SessionState::Failed) {
                    info!(
                        parent: &self.span,
                        "client disconnected after {} bytes in {:?}",
                        bytes,
                        elapsed
                    );
                }
            }
            RelayOutcome::Failed { bytes, error } => {
                if self.advance(SessionState::Failed) {
                    tracing::error!(
                        parent: &self.span,
                        "upstream failed after {} bytes: {}",
                        bytes,
                        error
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut session = RelaySession::new("dQw4w9WgXcQ");
        for state in [
            SessionState::Validating,
            SessionState::Resolving,
            SessionState::Selecting,
            SessionState::Streaming,
        ] {
            assert!(session.advance(state));
        }
        session.finish(&RelayOutcome::Completed { bytes: 10 });
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn test_cannot_skip_states() {
        let mut session = RelaySession::new("dQw4w9WgXcQ");
        assert!(!session.advance(SessionState::Streaming));
        assert_eq!(session.state(), SessionState::Created);
    }

    #[test]
    fn test_failure_is_terminal_and_reported_once() {
        let mut session = RelaySession::new("bad");
        session.advance(SessionState::Validating);
        session.fail(&RelayError::InvalidIdentifier("bad".into()));
        assert_eq!(session.state(), SessionState::Failed);

        assert!(!session.advance(SessionState::Resolving));
        session.finish(&RelayOutcome::Completed { bytes: 1 });
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn test_disconnect_ends_failed() {
        let mut session = RelaySession::new("dQw4w9WgXcQ");
        session.advance(SessionState::Validating);
        session.advance(SessionState::Resolving);
        session.advance(SessionState::Selecting);
        session.advance(SessionState::Streaming);
        session.finish(&RelayOutcome::Disconnected { bytes: 3 });
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn test_completed_only_from_streaming() {
        assert!(!SessionState::Resolving.can_transition_to(SessionState::Completed));
        assert!(SessionState::Streaming.can_transition_to(SessionState::Completed));
        assert!(!SessionState::Completed.can_transition_to(SessionState::Failed));
    }
}
