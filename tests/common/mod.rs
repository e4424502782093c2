//! Shared test support: a scripted connector standing in for the REST
//! transport.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use remoteid_client::adapters::rest::protocol::{
    AuthenticationSessionRequest, CertificateChoiceSessionRequest, SessionResponse,
    SignatureSessionRequest,
};
use remoteid_client::domain::session::{SessionCertificate, SessionResult, SessionSignature};
use remoteid_client::{
    Connector, IdentityRef, RemoteIdError, RemoteIdResult, SessionId, SessionStatus,
};
use tokio_util::sync::CancellationToken;

pub const TEST_SESSION_ID: &str = "de305d54-75b4-431b-adb2-eb6b9e546014";
pub const TEST_DOCUMENT_NUMBER: &str = "PNOEE-31111111111-MOCK-Q";

/// Connector that replays a scripted sequence of session statuses and counts
/// the calls it receives.
pub struct ScriptedConnector {
    statuses: Mutex<VecDeque<SessionStatus>>,
    fallback: Option<SessionStatus>,
    initiate_count: AtomicUsize,
    fetch_count: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new(statuses: Vec<SessionStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            fallback: None,
            initiate_count: AtomicUsize::new(0),
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// Connector that reports `RUNNING` forever.
    pub fn endless_running() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            fallback: Some(running()),
            initiate_count: AtomicUsize::new(0),
            fetch_count: AtomicUsize::new(0),
        }
    }

    pub fn initiations(&self) -> usize {
        self.initiate_count.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> RemoteIdResult<SessionResponse> {
        self.initiate_count.fetch_add(1, Ordering::SeqCst);
        Ok(SessionResponse {
            session_id: TEST_SESSION_ID.to_string(),
        })
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn initiate_certificate_choice(
        &self,
        _identity: &IdentityRef,
        _request: &CertificateChoiceSessionRequest,
        _cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse> {
        self.next_response()
    }

    async fn initiate_signature(
        &self,
        _identity: &IdentityRef,
        _request: &SignatureSessionRequest,
        _cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse> {
        self.next_response()
    }

    async fn initiate_authentication(
        &self,
        _identity: &IdentityRef,
        _request: &AuthenticationSessionRequest,
        _cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionResponse> {
        self.next_response()
    }

    async fn fetch_session_status(
        &self,
        _session_id: &SessionId,
        _long_poll_timeout: Option<Duration>,
        _cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionStatus> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        match next.or_else(|| self.fallback.clone()) {
            Some(status) => Ok(status),
            None => Err(RemoteIdError::SessionNotFound),
        }
    }
}

pub fn running() -> SessionStatus {
    SessionStatus {
        state: "RUNNING".into(),
        ..Default::default()
    }
}

pub fn unknown_state(state: &str) -> SessionStatus {
    SessionStatus {
        state: state.into(),
        ..Default::default()
    }
}

/// Completed session carrying an OK result with certificate and signature.
pub fn complete_ok() -> SessionStatus {
    SessionStatus {
        state: "COMPLETE".into(),
        result: Some(SessionResult {
            end_result: "OK".into(),
            document_number: Some(TEST_DOCUMENT_NUMBER.into()),
        }),
        cert: Some(SessionCertificate {
            value: base64::engine::general_purpose::STANDARD.encode(b"certificate-der"),
            certificate_level: "QUALIFIED".into(),
        }),
        signature: Some(SessionSignature {
            value: base64::engine::general_purpose::STANDARD.encode(b"signature-bytes"),
            algorithm: "sha512WithRSAEncryption".into(),
        }),
        interaction_flow_used: Some("displayTextAndPIN".into()),
        device_ip_address: Some("192.0.2.7".into()),
        ..Default::default()
    }
}

pub fn complete_with_end_result(end_result: &str) -> SessionStatus {
    SessionStatus {
        state: "COMPLETE".into(),
        result: Some(SessionResult {
            end_result: end_result.into(),
            document_number: None,
        }),
        ..Default::default()
    }
}
