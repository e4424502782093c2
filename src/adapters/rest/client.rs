//! REST connector over reqwest.
//!
//! Performs the session initiation POSTs and status GETs against the identity
//! service and maps HTTP failures onto the semantic error taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::adapters::rest::protocol::{
    AuthenticationSessionRequest, CertificateChoiceSessionRequest, SessionResponse,
    SignatureSessionRequest,
};
use crate::adapters::rest::Connector;
use crate::domain::identity::IdentityRef;
use crate::domain::session::{SessionId, SessionStatus};
use crate::infra::config::ClientConfig;
use crate::infra::error::{RemoteIdError, RemoteIdResult};

/// HTTP connector to the identity service REST API.
pub struct RestConnector {
    base_url: String,
    http: reqwest::Client,
}

impl RestConnector {
    /// Create a connector from the client configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig) -> RemoteIdResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.network_timeout())
            .user_agent(concat!("remoteid-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteIdError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.service_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Connector with a custom base URL and pre-built reqwest client.
    #[must_use]
    pub fn with_http_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn initiate<B: Serialize + Sync>(
        &self,
        operation: &str,
        identity: &IdentityRef,
        body: &B,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse> {
        let url = format!(
            "{}/{}/{}/{}",
            self.base_url,
            operation,
            identity.path_kind(),
            identity.path_value()
        );
        log::debug!("Initiating {operation} session: POST {url}");

        let exchange = self.http.post(&url).json(body).send();
        let response = tokio::select! {
            response = exchange => response
                .map_err(|e| RemoteIdError::Network(format!("Failed to reach service: {e}")))?,
            () = cancel.cancelled() => {
                return Err(RemoteIdError::UnprocessableResponse(format!(
                    "{operation} initiation was cancelled"
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(map_initiation_status(status.as_u16()));
        }
        parse_json(response).await
    }
}

#[async_trait]
impl Connector for RestConnector {
    async fn initiate_certificate_choice(
        &self,
        identity: &IdentityRef,
        request: &CertificateChoiceSessionRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse> {
        self.initiate("certificatechoice", identity, request, cancel)
            .await
    }

    async fn initiate_signature(
        &self,
        identity: &IdentityRef,
        request: &SignatureSessionRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse> {
        self.initiate("signature", identity, request, cancel).await
    }

    async fn initiate_authentication(
        &self,
        identity: &IdentityRef,
        request: &AuthenticationSessionRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse> {
        self.initiate("authentication", identity, request, cancel)
            .await
    }

    async fn fetch_session_status(
        &self,
        session_id: &SessionId,
        long_poll_timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionStatus> {
        let mut url = format!("{}/session/{}", self.base_url, session_id);
        if let Some(timeout) = long_poll_timeout {
            url = format!("{url}?timeoutMs={}", timeout.as_millis());
        }
        log::debug!("Fetching session status: GET {url}");

        let exchange = self.http.get(&url).send();
        let response = tokio::select! {
            response = exchange => response
                .map_err(|e| RemoteIdError::Network(format!("Failed to reach service: {e}")))?,
            () = cancel.cancelled() => {
                return Err(RemoteIdError::UnprocessableResponse(
                    "session status fetch was cancelled".to_string(),
                ));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(map_session_fetch_status(status.as_u16()));
        }
        parse_json(response).await
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> RemoteIdResult<T> {
    response.json().await.map_err(|e| {
        RemoteIdError::UnprocessableResponse(format!("Failed to parse service response: {e}"))
    })
}

/// Map a non-success HTTP status of an initiation call onto the taxonomy.
fn map_initiation_status(status: u16) -> RemoteIdError {
    match status {
        400 => RemoteIdError::Configuration(
            "Service rejected the request as invalid (HTTP 400)".to_string(),
        ),
        401 | 403 => RemoteIdError::RelyingPartyConfiguration(format!(
            "Request rejected as unauthorized (HTTP {status}); check relying party UUID and name"
        )),
        404 => RemoteIdError::AccountNotFound,
        471 => RemoteIdError::NoSuitableAccount,
        472 => RemoteIdError::PersonShouldViewPortal,
        480 => RemoteIdError::UnsupportedClientVersion,
        580 => RemoteIdError::ServerMaintenance,
        _ => RemoteIdError::Network(format!("Unexpected HTTP status {status}")),
    }
}

/// Map a non-success HTTP status of a status fetch onto the taxonomy.
fn map_session_fetch_status(status: u16) -> RemoteIdError {
    match status {
        401 | 403 => RemoteIdError::RelyingPartyConfiguration(format!(
            "Request rejected as unauthorized (HTTP {status}); check relying party UUID and name"
        )),
        404 => RemoteIdError::SessionNotFound,
        480 => RemoteIdError::UnsupportedClientVersion,
        580 => RemoteIdError::ServerMaintenance,
        _ => RemoteIdError::Network(format!("Unexpected HTTP status {status}")),
    }
}
