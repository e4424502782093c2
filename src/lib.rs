//! Remote identity service client library
//!
//! A client-side protocol engine for a remote digital-identity service where
//! the end user confirms operations in an app on their mobile device. Three
//! operations are supported, each an asynchronous session: certificate
//! retrieval, document signing, and user authentication. The client initiates
//! a session, then long-polls the status endpoint until the user completes,
//! refuses, or times out the operation.
//!
//! ```no_run
//! use remoteid_client::{
//!     AuthenticationRequest, ClientConfig, Interaction, RemoteIdClient, SignableData,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new(
//!     "https://rp-api.example.com/v2",
//!     "00000000-0000-0000-0000-000000000000",
//!     "DEMO",
//! );
//! let client = RemoteIdClient::new(&config)?;
//!
//! let mut request = AuthenticationRequest::from_config(&config);
//! request.semantics_identifier = Some("PNOEE-31111111111".parse()?);
//! request.data = Some(SignableData::new(b"login challenge".to_vec()));
//! request.allowed_interactions_order =
//!     vec![Interaction::display_text_and_pin("Log in to DEMO?")];
//!
//! // Show this code to the user before they confirm on their device.
//! println!("Verification code: {}", request.verification_code()?);
//!
//! let cancel = CancellationToken::new();
//! let _response = client.authenticate(&request, &cancel).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Each operation also has a split path: `initiate_*` returns the session id,
//! and the matching `create_result`/`create_response` function in
//! [`services`] interprets a terminal status fetched out-of-band, so callers
//! can run their own polling policy or persist the session across restarts.

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub use adapters::rest::{Connector, RestConnector};
pub use domain::hash::{calculate_digest, HashAlgorithm, SignableData, SignableHash};
pub use domain::identity::{
    AuthenticationIdentity, IdentityRef, IdentityType, SemanticsIdentifier,
};
pub use domain::interaction::{Interaction, InteractionKind};
pub use domain::session::{
    CertificateLevel, SessionCertificate, SessionId, SessionResult, SessionSignature,
    SessionStatus,
};
pub use domain::verification;
pub use infra::config::ClientConfig;
pub use infra::error::{RefusalFlow, RemoteIdError, RemoteIdResult};
pub use services::authentication::{AuthenticationRequest, AuthenticationResponse};
pub use services::certificate::{CertificateChoiceRequest, CertificateChoiceResult};
pub use services::poller::SessionStatusPoller;
pub use services::signature::{SignatureRequest, SignatureResult};
pub use services::validator::AuthenticationResponseValidator;

/// High-level client tying a connector to the polling parameters.
///
/// Holds no per-session state: independent operations can run concurrently on
/// the same client.
pub struct RemoteIdClient<C = RestConnector> {
    connector: C,
    poll_interval: Duration,
    long_poll_timeout: Option<Duration>,
}

impl RemoteIdClient<RestConnector> {
    /// Client over the REST connector described by the configuration.
    ///
    /// # Errors
    /// Fails when the configuration is invalid or the HTTP client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig) -> RemoteIdResult<Self> {
        Ok(Self {
            connector: RestConnector::new(config)?,
            poll_interval: config.poll_interval(),
            long_poll_timeout: config.long_poll_timeout(),
        })
    }
}

impl<C: Connector> RemoteIdClient<C> {
    /// Client over a custom connector, with default polling parameters.
    #[must_use]
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            poll_interval: services::poller::DEFAULT_POLL_INTERVAL,
            long_poll_timeout: None,
        }
    }

    /// Override the sleep between consecutive status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Ask the service to hold each status response open for up to the given
    /// duration.
    #[must_use]
    pub fn with_long_poll_timeout(mut self, timeout: Duration) -> Self {
        self.long_poll_timeout = Some(timeout);
        self
    }

    /// The connector operations go through.
    #[must_use]
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// A poller configured with this client's polling parameters.
    #[must_use]
    pub fn poller(&self) -> SessionStatusPoller<'_, C> {
        let poller = SessionStatusPoller::new(&self.connector)
            .with_poll_interval(self.poll_interval);
        match self.long_poll_timeout {
            Some(timeout) => poller.with_long_poll_timeout(timeout),
            None => poller,
        }
    }

    /// Run a certificate-choice operation to completion.
    ///
    /// # Errors
    /// Propagates validation, transport, polling, and interpretation errors.
    pub async fn choose_certificate(
        &self,
        request: &CertificateChoiceRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<CertificateChoiceResult> {
        services::certificate::run(&self.poller(), request, cancel).await
    }

    /// Start a certificate-choice session without polling it.
    ///
    /// # Errors
    /// Fails on parameter validation or transport errors.
    pub async fn initiate_certificate_choice(
        &self,
        request: &CertificateChoiceRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionId> {
        services::certificate::initiate(&self.connector, request, cancel).await
    }

    /// Run a signature operation to completion.
    ///
    /// # Errors
    /// Propagates validation, transport, polling, and interpretation errors.
    pub async fn sign(
        &self,
        request: &SignatureRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SignatureResult> {
        services::signature::run(&self.poller(), request, cancel).await
    }

    /// Start a signature session without polling it.
    ///
    /// # Errors
    /// Fails on parameter validation or transport errors.
    pub async fn initiate_signature(
        &self,
        request: &SignatureRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionId> {
        services::signature::initiate(&self.connector, request, cancel).await
    }

    /// Run an authentication operation to completion.
    ///
    /// The returned response still needs to be passed through an
    /// [`AuthenticationResponseValidator`] before the user can be considered
    /// authenticated.
    ///
    /// # Errors
    /// Propagates validation, transport, polling, and interpretation errors.
    pub async fn authenticate(
        &self,
        request: &AuthenticationRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<AuthenticationResponse> {
        services::authentication::run(&self.poller(), request, cancel).await
    }

    /// Start an authentication session without polling it.
    ///
    /// # Errors
    /// Fails on parameter validation or transport errors.
    pub async fn initiate_authentication(
        &self,
        request: &AuthenticationRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionId> {
        services::authentication::initiate(&self.connector, request, cancel).await
    }
}
