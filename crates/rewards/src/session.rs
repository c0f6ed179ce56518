//! Signed-in user gate for the reward queries

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// The authenticated member, as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Holds the current user, if any
#[derive(Debug, Default)]
pub struct Session {
    user: RwLock<Option<AuthUser>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: AuthUser) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub async fn current(&self) -> Option<AuthUser> {
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }

    pub async fn sign_in(&self, user: AuthUser) {
        *self.user.write().await = Some(user);
    }

    /// Clear the user, returning whoever was signed in
    pub async fn sign_out(&self) -> Option<AuthUser> {
        self.user.write().await.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let session = Session::new();
        assert!(!session.is_authenticated().await);

        session
            .sign_in(AuthUser {
                id: "u-1".to_string(),
                email: "guest@example.com".to_string(),
                display_name: None,
            })
            .await;
        assert!(session.is_authenticated().await);

        let previous = session.sign_out().await;
        assert_eq!(previous.map(|u| u.id).as_deref(), Some("u-1"));
        assert!(session.current().await.is_none());
    }
}
