//! Application state management

use chill_core::Result;
use chill_networking::ChillClient;
use chill_rewards::{AuthUser, ChillPointsProvider, ClientConfig, NotificationHandle};
use chill_views::Catalog;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything a command needs, built once from the configuration
#[derive(Clone)]
pub struct AppState {
    pub provider: ChillPointsProvider,
    pub notifications: NotificationHandle,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Wire the HTTP client, notification feed and store together
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let client = ChillClient::new(config.client_options()?)?;
        debug!("Rewards API at {}", client.base_url());

        let notifications = NotificationHandle::new(config.notifications.clone());
        let provider = ChillPointsProvider::new(
            Arc::new(client),
            Arc::new(notifications.clone()),
            config.stale_after(),
        );

        let catalog = match &config.display.catalog_path {
            Some(path) => Catalog::load(&config.display.locale, path)?,
            None => Catalog::empty(&config.display.locale),
        };
        info!(
            "Loaded {} translations for locale {}",
            catalog.len(),
            config.display.locale
        );

        // A configured token is the whole session; the server resolves the member
        provider.login(session_user()).await;

        Ok(Self {
            provider,
            notifications,
            catalog: Arc::new(catalog),
        })
    }
}

/// Id of the member behind a configured session token; the server never tells us
pub const TOKEN_USER_ID: &str = "token-holder";

fn session_user() -> AuthUser {
    AuthUser {
        id: TOKEN_USER_ID.to_string(),
        email: String::new(),
        display_name: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_user_is_neutral() {
        let user = session_user();
        assert_eq!(user.id, TOKEN_USER_ID);
        assert!(user.email.is_empty());
    }
}
