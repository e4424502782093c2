//! REST transport adapter.
//!
//! [`Connector`] is the seam between the protocol engine and the transport:
//! the poller and the operation flows only ever talk to this trait, so tests
//! and alternative transports can substitute the real HTTP client.

pub mod client;
pub mod protocol;

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::identity::IdentityRef;
use crate::domain::session::{SessionId, SessionStatus};
use crate::infra::error::RemoteIdResult;
use self::protocol::{
    AuthenticationSessionRequest, CertificateChoiceSessionRequest, SessionResponse,
    SignatureSessionRequest,
};

pub use self::client::RestConnector;

/// Transport operations the protocol engine requires.
///
/// Implementations must map transport-level failures onto the semantic error
/// taxonomy: HTTP 404 on a status fetch is "session not found"; on initiation
/// 401/403 are relying-party configuration errors, 404 is account-not-found,
/// and the vendor codes 471/472/480/580 map to no-suitable-account /
/// view-portal / unsupported-client-version / server-maintenance.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Start a certificate-choice session for the given identity.
    async fn initiate_certificate_choice(
        &self,
        identity: &IdentityRef,
        request: &CertificateChoiceSessionRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse>;

    /// Start a signature session for the given identity.
    async fn initiate_signature(
        &self,
        identity: &IdentityRef,
        request: &SignatureSessionRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse>;

    /// Start an authentication session for the given identity.
    async fn initiate_authentication(
        &self,
        identity: &IdentityRef,
        request: &AuthenticationSessionRequest,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse>;

    /// Fetch the current status of a session.
    ///
    /// `long_poll_timeout` is forwarded to the service, which may hold the
    /// response open for up to that duration waiting for a state change; it is
    /// not interpreted by the caller.
    async fn fetch_session_status(
        &self,
        session_id: &SessionId,
        long_poll_timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionStatus>;
}
