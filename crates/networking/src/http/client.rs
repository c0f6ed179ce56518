//! Rewards HTTP client with cookie-based session authentication

use reqwest::{
    cookie::Jar,
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    Client, Response, Url,
};
use chill_core::{
    ApiErrorBody, Error, ExpiringPoints, MutationResponse, RedeemRequest, Result,
    RewardTransaction, RewardsPointsState, TransferRequest,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::endpoints;

pub const DEFAULT_BASE_URL: &str = "https://chillstay.app";
pub const DEFAULT_SESSION_COOKIE: &str = "__session";
const USER_AGENT_VALUE: &str = concat!("chill-rewards-client/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`ChillClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Scheme and host of the booking platform, e.g. `https://chillstay.app`
    pub base_url: String,
    /// Name of the session cookie issued by the auth provider
    pub cookie_name: String,
    /// Session cookie value
    pub session_token: String,
    pub timeout: Duration,
    /// Sent as `Accept-Language` so server messages come back localized
    pub locale: String,
}

impl ClientOptions {
    pub fn new(session_token: &str) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            session_token: session_token.to_string(),
            timeout: Duration::from_secs(15),
            locale: "en".to_string(),
        }
    }
}

/// HTTP client for the rewards endpoints
///
/// The session cookie is attached to every request through the cookie
/// jar, the same way the browser sends it.
pub struct ChillClient {
    http: Client,
    base_url: Url,
}

impl ChillClient {
    /// Build a client for the given options
    pub fn new(options: ClientOptions) -> Result<Self> {
        let base_url = Url::parse(&options.base_url)
            .map_err(|e| Error::ConfigError(format!("invalid base URL '{}': {}", options.base_url, e)))?;

        let jar = Arc::new(Jar::default());
        jar.add_cookie_str(
            &format!("{}={}", options.cookie_name, options.session_token),
            &base_url,
        );

        let http = Client::builder()
            .cookie_provider(jar)
            .user_agent(USER_AGENT_VALUE)
            .default_headers(Self::default_headers(&options.locale))
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Headers sent with every request
    fn default_headers(locale: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(locale) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        headers
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::ConfigError(format!("invalid path '{}': {}", path, e)))
    }

    /// Check if response indicates authentication failure
    fn check_auth_error(response: &Response) -> Option<Error> {
        match response.status().as_u16() {
            401 => Some(Error::TokenExpired),
            403 => Some(Error::AuthenticationError("Access forbidden".to_string())),
            _ => None,
        }
    }

    /// Map a response to its decoded body or an error carrying the server message
    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
        debug!("{} -> HTTP {}", path, response.status());

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(ApiErrorBody::into_message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            error!("Request to {} failed: HTTP {} - {}", path, status, body);
            return Err(Error::ApiError(message));
        }

        let body_text = response.text().await.map_err(|e| {
            error!("Failed to read response body from {}: {}", path, e);
            Error::NetworkError(e.to_string())
        })?;

        serde_json::from_str(&body_text).map_err(|e| {
            error!(
                "Failed to parse {} response: {}. Body preview: {}",
                path,
                e,
                body_text.chars().take(500).collect::<String>()
            );
            Error::InvalidData(e.to_string())
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http.get(self.url(path)?).send().await?;
        Self::decode(path, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.http.post(self.url(path)?).json(body).send().await?;
        Self::decode(path, response).await
    }

    /// Current balance, tier and progress
    #[instrument(skip(self))]
    pub async fn get_points(&self) -> Result<RewardsPointsState> {
        let state: RewardsPointsState = self.get_json(endpoints::POINTS).await?;
        debug!("Points fetched: {} ({})", state.points, state.tier.name.as_str());
        Ok(state)
    }

    /// Transaction history in server order
    #[instrument(skip(self))]
    pub async fn get_transactions(&self) -> Result<Vec<RewardTransaction>> {
        let transactions: Vec<RewardTransaction> = self.get_json(endpoints::TRANSACTIONS).await?;
        debug!("Fetched {} reward transactions", transactions.len());
        Ok(transactions)
    }

    /// Points that will expire soon
    #[instrument(skip(self))]
    pub async fn get_expiring(&self) -> Result<ExpiringPoints> {
        let expiring: ExpiringPoints = self.get_json(endpoints::EXPIRING).await?;
        debug!("Expiring points: {}", expiring.total_expiring);
        Ok(expiring)
    }

    /// Redeem points
    #[instrument(skip(self))]
    pub async fn redeem(&self, request: &RedeemRequest) -> Result<MutationResponse> {
        debug!("Redeeming {} points", request.points);
        self.post_json(endpoints::REDEEM, request).await
    }

    /// Transfer points to another member by email
    #[instrument(skip(self), fields(recipient = %request.recipient_email))]
    pub async fn transfer(&self, request: &TransferRequest) -> Result<MutationResponse> {
        debug!("Transferring {} points", request.points);
        self.post_json(endpoints::TRANSFER, request).await
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}
