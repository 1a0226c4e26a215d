//! Authorization-code sign-in and session lookup

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::ServiceError;

/// A signed-in user's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// Session issued after a successful code exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque bearer token, a random v4 UUID
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Identity provider used by the request layer
pub trait Authenticator: Send + Sync {
    /// Exchange a one-time authorization code for a session
    fn exchange_code(&self, code: &str) -> Result<Session, ServiceError>;

    /// Resolve the user behind a session token
    fn current_user(&self, token: &str) -> Option<User>;
}

#[derive(Debug, Default)]
struct AuthState {
    /// Outstanding one-time codes
    pending_codes: HashMap<String, User>,
    /// Upserted on every successful sign-in
    profiles: HashMap<String, User>,
    /// token -> user id
    sessions: HashMap<String, String>,
}

/// Authenticator kept in process memory
///
/// Codes are registered up front (the identity provider's side of the
/// handshake) and can each be exchanged once.
#[derive(Debug, Default)]
pub struct InMemoryAuthenticator {
    state: Mutex<AuthState>,
}

impl InMemoryAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a one-time code that signs in `user`
    pub fn register_code(&self, code: impl Into<String>, user: User) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.pending_codes.insert(code.into(), user);
    }

    /// Build from a `code=user_id:email` list separated by commas
    ///
    /// Used to seed sign-in codes from configuration.
    pub fn from_code_list(list: &str) -> Result<Self, ServiceError> {
        let auth = Self::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let parsed = entry
                .split_once('=')
                .and_then(|(code, user)| user.split_once(':').map(|(id, email)| (code, id, email)));
            match parsed {
                Some((code, id, email)) if !code.is_empty() && !id.is_empty() => {
                    auth.register_code(
                        code,
                        User {
                            id: id.to_string(),
                            email: email.to_string(),
                        },
                    );
                }
                _ => {
                    return Err(ServiceError::Validation(format!(
                        "malformed auth code entry {:?}",
                        entry
                    )))
                }
            }
        }
        Ok(auth)
    }

    /// Stored profile for a user id
    pub fn profile(&self, user_id: &str) -> Option<User> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.profiles.get(user_id).cloned()
    }
}

impl Authenticator for InMemoryAuthenticator {
    fn exchange_code(&self, code: &str) -> Result<Session, ServiceError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let user = state
            .pending_codes
            .remove(code)
            .ok_or(ServiceError::InvalidAuthCode)?;

        let created_at = Utc::now();
        let token = Uuid::new_v4().to_string();

        state.sessions.insert(token.clone(), user.id.clone());
        let user_id = user.id.clone();
        state.profiles.insert(user.id.clone(), user);

        log::info!("user {} signed in", user_id);

        Ok(Session {
            token,
            user_id,
            created_at,
        })
    }

    fn current_user(&self, token: &str) -> Option<User> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let user_id = state.sessions.get(token)?;
        state.profiles.get(user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: "user-alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn test_exchange_code_creates_session() {
        let auth = InMemoryAuthenticator::new();
        auth.register_code("code-1", alice());

        let session = auth.exchange_code("code-1").unwrap();
        assert_eq!(session.user_id, "user-alice");
        assert_eq!(auth.current_user(&session.token), Some(alice()));
        assert_eq!(auth.profile("user-alice"), Some(alice()));
    }

    #[test]
    fn test_code_is_single_use() {
        let auth = InMemoryAuthenticator::new();
        auth.register_code("code-1", alice());

        assert!(auth.exchange_code("code-1").is_ok());
        assert!(matches!(auth.exchange_code("code-1"), Err(ServiceError::InvalidAuthCode)));
    }

    #[test]
    fn test_unknown_code_and_token() {
        let auth = InMemoryAuthenticator::new();
        assert!(matches!(auth.exchange_code("nope"), Err(ServiceError::InvalidAuthCode)));
        assert_eq!(auth.current_user("sess-unknown"), None);
    }

    #[test]
    fn test_from_code_list() {
        let auth = InMemoryAuthenticator::from_code_list(
            "abc=user-alice:alice@example.com, def=user-bob:bob@example.com",
        )
        .unwrap();
        assert_eq!(auth.exchange_code("def").unwrap().user_id, "user-bob");
        assert_eq!(auth.exchange_code("abc").unwrap().user_id, "user-alice");

        assert!(InMemoryAuthenticator::from_code_list("").is_ok());
        assert!(InMemoryAuthenticator::from_code_list("no-separator").is_err());
        assert!(InMemoryAuthenticator::from_code_list("=user:mail").is_err());
    }

    #[test]
    fn test_profile_upserted_on_repeat_sign_in() {
        let auth = InMemoryAuthenticator::new();
        auth.register_code("code-1", alice());
        let first = auth.exchange_code("code-1").unwrap();

        let renamed = User {
            email: "alice@work.example.com".to_string(),
            ..alice()
        };
        auth.register_code("code-2", renamed.clone());
        let second = auth.exchange_code("code-2").unwrap();

        assert_ne!(first.token, second.token);
        // Both sessions resolve to the latest profile
        assert_eq!(auth.current_user(&first.token), Some(renamed.clone()));
        assert_eq!(auth.current_user(&second.token), Some(renamed));
    }

    #[test]
    fn test_tokens_are_random() {
        let auth = InMemoryAuthenticator::new();
        let bob = User {
            id: "user-bob".to_string(),
            email: "bob@example.com".to_string(),
        };
        auth.register_code("code-alice", alice());
        auth.register_code("code-bob", bob);

        let first = auth.exchange_code("code-bob").unwrap();
        let second = auth.exchange_code("code-alice").unwrap();

        let first_id = Uuid::parse_str(&first.token).unwrap();
        let second_id = Uuid::parse_str(&second.token).unwrap();
        assert_eq!(first_id.get_version_num(), 4);
        assert_eq!(second_id.get_version_num(), 4);
        assert_ne!(first_id, second_id);

        // Neither the sign-in time nor a sequence number appears in the token
        let millis = first.created_at.timestamp_millis().to_string();
        assert!(!first.token.contains(&millis));
        for guess in [
            format!("sess-{}-1", millis),
            format!("sess-{}-2", second.created_at.timestamp_millis()),
        ] {
            assert_eq!(auth.current_user(&guess), None);
        }
        assert_eq!(auth.current_user(&first.token).map(|u| u.id), Some("user-bob".to_string()));
    }
}
