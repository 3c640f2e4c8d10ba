use serde::{Deserialize, Serialize};

use super::{ChallengeOutcome, ChallengeValidator, RealtimeHint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Buffer equals the original broken text.
    Unmodified,
    Editing,
    /// Last submission passed. Further edits reopen the attempt.
    Solved,
    /// Last submission failed.
    StillBroken,
}

/// One learner's attempt at a challenge. Owned by the caller; the engine
/// itself keeps no session state.
#[derive(Debug, Clone)]
pub struct ChallengeSession<'v> {
    validator: &'v ChallengeValidator,
    challenge_id: u32,
    buffer: String,
    state: SessionState,
    last_outcome: Option<ChallengeOutcome>,
    submissions: u32,
}

impl<'v> ChallengeSession<'v> {
    pub fn start(validator: &'v ChallengeValidator, challenge_id: u32) -> Self {
        Self {
            validator,
            challenge_id,
            buffer: validator.original_text(challenge_id).to_string(),
            state: SessionState::Unmodified,
            last_outcome: None,
            submissions: 0,
        }
    }

    pub fn challenge_id(&self) -> u32 {
        self.challenge_id
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_outcome(&self) -> Option<&ChallengeOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn submissions(&self) -> u32 {
        self.submissions
    }

    /// Replace the buffer and return fresh live feedback.
    pub fn edit(&mut self, text: impl Into<String>) -> RealtimeHint {
        self.buffer = text.into();
        let hint = self.hint();
        self.state = if hint.has_changes {
            SessionState::Editing
        } else {
            SessionState::Unmodified
        };
        hint
    }

    pub fn hint(&self) -> RealtimeHint {
        self.validator.live_hint(self.challenge_id, &self.buffer)
    }

    pub fn submit(&mut self) -> ChallengeOutcome {
        let outcome = self.validator.validate(self.challenge_id, &self.buffer);
        self.submissions += 1;
        self.state = if outcome.pass {
            SessionState::Solved
        } else {
            SessionState::StillBroken
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Restore the original broken text verbatim.
    pub fn reset(&mut self) {
        self.buffer = self.validator.original_text(self.challenge_id).to_string();
        self.state = SessionState::Unmodified;
        self.last_outcome = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_state_machine() {
        let validator = ChallengeValidator::builtin();
        let mut session = ChallengeSession::start(validator, 1);
        assert_eq!(session.state(), SessionState::Unmodified);

        let broken = session.text().to_string();
        let hint = session.edit(broken.replace("ClusterIP", "LoadBalancer"));
        assert!(hint.has_changes);
        assert!(!hint.likely_correct);
        assert_eq!(session.state(), SessionState::Editing);

        assert!(!session.submit().pass);
        assert_eq!(session.state(), SessionState::StillBroken);

        let hint = session.edit(broken.replace("ClusterIP", "NodePort"));
        assert!(hint.likely_correct);
        assert_eq!(session.state(), SessionState::Editing);

        assert!(session.submit().pass);
        assert_eq!(session.state(), SessionState::Solved);
        assert_eq!(session.submissions(), 2);

        // Solved does not lock the session.
        session.edit(broken.clone());
        assert_eq!(session.state(), SessionState::Unmodified);
        assert!(!session.submit().pass);
    }

    #[test]
    fn reset_restores_original() {
        let validator = ChallengeValidator::builtin();
        let mut session = ChallengeSession::start(validator, 5);
        session.edit("garbage");
        session.submit();
        session.reset();
        assert_eq!(session.text(), validator.original_text(5));
        assert_eq!(session.state(), SessionState::Unmodified);
        assert!(session.last_outcome().is_none());
        assert!(!session.hint().has_changes);
    }
}
