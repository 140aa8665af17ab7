//! Session slice

use serde::{Deserialize, Serialize};

use crate::models::{AuthResponse, RecoveryState, RecoveryStep, TokenPair, User};
use crate::storage::PersistedSession;

/// Authenticated-user context.
///
/// `sign_in` and `sign_out` are the only ways the token changes hands, so
/// `token.is_some() == is_authenticated` holds after every transition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub recovery: Option<RecoveryState>,
}

impl SessionData {
    pub fn sign_in(&mut self, token: String, user: User, refresh_token: Option<String>) {
        self.token = Some(token);
        self.user = Some(user);
        self.refresh_token = refresh_token;
        self.is_authenticated = true;
        self.recovery = None;
    }

    pub fn sign_in_with(&mut self, response: AuthResponse) {
        self.sign_in(response.token, response.user, response.refresh);
    }

    pub fn restore(&mut self, persisted: PersistedSession) {
        self.sign_in(persisted.token, persisted.user, persisted.refresh_token);
    }

    pub fn sign_out(&mut self) {
        *self = SessionData::default();
    }

    /// New access token; a missing refresh token in the answer keeps the old one
    pub fn rotate_tokens(&mut self, tokens: TokenPair) {
        self.token = Some(tokens.token);
        if tokens.refresh.is_some() {
            self.refresh_token = tokens.refresh;
        }
        self.is_authenticated = true;
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn advance_recovery(&mut self, email: &str, step: RecoveryStep) {
        self.recovery = Some(RecoveryState {
            email: email.to_string(),
            step,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::sample_user;

    #[test]
    fn test_sign_in_and_out_keep_token_invariant() {
        let mut session = SessionData::default();
        session.sign_in("t".into(), sample_user(), None);
        assert!(session.is_authenticated);
        assert_eq!(session.token.as_deref(), Some("t"));

        session.sign_out();
        assert!(!session.is_authenticated);
        assert_eq!(session, SessionData::default());
    }

    #[test]
    fn test_rotate_keeps_refresh_when_absent() {
        let mut session = SessionData::default();
        session.sign_in("old".into(), sample_user(), Some("r1".into()));
        session.rotate_tokens(TokenPair { token: "new".into(), refresh: None });
        assert_eq!(session.token.as_deref(), Some("new"));
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));
    }
}
