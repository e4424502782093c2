//! Certificate-choice operation.
//!
//! Retrieves the signing certificate of a chosen user account. The request is
//! a plain configuration value validated once at the dispatch boundary; the
//! flow is initiate, poll to a terminal status, interpret.

use tokio_util::sync::CancellationToken;

use crate::adapters::rest::protocol::{CertificateChoiceSessionRequest, RequestProperties};
use crate::adapters::rest::Connector;
use crate::domain::identity::{IdentityRef, SemanticsIdentifier};
use crate::domain::session::{
    interpret_end_result, CertificateLevel, SessionId, SessionStatus,
};
use crate::infra::config::ClientConfig;
use crate::infra::error::{RemoteIdError, RemoteIdResult};
use crate::services::poller::SessionStatusPoller;
use crate::services::{resolve_identity, validate_nonce, validate_relying_party};

/// Parameters of a certificate-choice operation
#[derive(Debug, Clone, Default)]
pub struct CertificateChoiceRequest {
    /// Relying-party UUID.
    pub relying_party_uuid: String,
    /// Relying-party display name.
    pub relying_party_name: String,
    /// Document number addressing a specific enrolment.
    pub document_number: Option<String>,
    /// Semantics identifier addressing a person.
    pub semantics_identifier: Option<SemanticsIdentifier>,
    /// Minimum certificate level to return.
    pub certificate_level: CertificateLevel,
    /// Relying-party supplied nonce, up to 30 characters.
    pub nonce: Option<String>,
    /// Capability hints for account selection.
    pub capabilities: Vec<String>,
    /// Ask the service to report the confirming device's IP address.
    pub share_device_ip: bool,
}

impl CertificateChoiceRequest {
    /// Request with the relying-party identity filled in.
    #[must_use]
    pub fn new(
        relying_party_uuid: impl Into<String>,
        relying_party_name: impl Into<String>,
    ) -> Self {
        Self {
            relying_party_uuid: relying_party_uuid.into(),
            relying_party_name: relying_party_name.into(),
            ..Self::default()
        }
    }

    /// Request with the relying-party identity taken from the configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.relying_party_uuid, &config.relying_party_name)
    }

    /// Validate all parameters and resolve the identity target.
    ///
    /// # Errors
    /// Fails with a configuration error naming the first violated rule.
    pub fn validate(&self) -> RemoteIdResult<IdentityRef> {
        validate_relying_party(&self.relying_party_uuid, &self.relying_party_name)?;
        let identity = resolve_identity(&self.document_number, &self.semantics_identifier)?;
        validate_nonce(&self.nonce)?;
        Ok(identity)
    }

    fn to_session_request(&self) -> CertificateChoiceSessionRequest {
        CertificateChoiceSessionRequest {
            relying_party_uuid: self.relying_party_uuid.clone(),
            relying_party_name: self.relying_party_name.clone(),
            certificate_level: self.certificate_level.as_str().to_string(),
            nonce: self.nonce.clone(),
            capabilities: self.capabilities.clone(),
            request_properties: self.share_device_ip.then(|| RequestProperties {
                share_md_client_ip_address: true,
            }),
        }
    }
}

/// Outcome of a completed certificate-choice operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateChoiceResult {
    /// DER-encoded certificate of the chosen account.
    pub certificate_der: Vec<u8>,
    /// Level reported for the certificate.
    pub certificate_level: String,
    /// Document number of the chosen account.
    pub document_number: String,
    /// IP address of the confirming device, when shared.
    pub device_ip_address: Option<String>,
}

/// Validate the request and start a certificate-choice session.
///
/// # Errors
/// Fails on parameter validation or transport errors; no network call is made
/// when validation fails.
pub async fn initiate<C: Connector + ?Sized>(
    connector: &C,
    request: &CertificateChoiceRequest,
    cancel: &CancellationToken,
) -> RemoteIdResult<SessionId> {
    let identity = request.validate()?;
    let response = connector
        .initiate_certificate_choice(&identity, &request.to_session_request(), cancel)
        .await?;
    log::info!("Certificate choice session started: {}", response.session_id);
    Ok(SessionId::new(response.session_id))
}

/// Interpret a terminal session status as a certificate-choice result.
///
/// # Errors
/// Maps non-`OK` end results to their semantic kinds; a missing result block,
/// certificate, or document number is an unprocessable response.
pub fn create_result(status: &SessionStatus) -> RemoteIdResult<CertificateChoiceResult> {
    let result = status.result.as_ref().ok_or_else(|| {
        RemoteIdError::UnprocessableResponse(
            "result is missing in the session status".to_string(),
        )
    })?;
    interpret_end_result(&result.end_result)?;

    let document_number = result
        .document_number
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            RemoteIdError::UnprocessableResponse(
                "document number is missing in the session result".to_string(),
            )
        })?;

    let cert = status
        .cert
        .as_ref()
        .filter(|c| !c.value.is_empty())
        .ok_or_else(|| {
            RemoteIdError::UnprocessableResponse(
                "certificate is missing in the session status".to_string(),
            )
        })?;

    Ok(CertificateChoiceResult {
        certificate_der: cert.decode_value()?,
        certificate_level: cert.certificate_level.clone(),
        document_number: document_number.to_string(),
        device_ip_address: status.device_ip_address.clone(),
    })
}

/// One-call convenience path: validate, initiate, poll, interpret.
///
/// # Errors
/// Propagates validation, transport, polling, and interpretation errors.
pub async fn run<C: Connector + ?Sized>(
    poller: &SessionStatusPoller<'_, C>,
    request: &CertificateChoiceRequest,
    cancel: &CancellationToken,
) -> RemoteIdResult<CertificateChoiceResult> {
    let session_id = initiate(poller.connector(), request, cancel).await?;
    let status = poller.fetch_final_status(&session_id, cancel).await?;
    create_result(&status)
}

#[cfg(test)]
mod tests {
    use base64::Engine;

    use super::*;
    use crate::domain::session::{SessionCertificate, SessionResult};

    fn completed_status() -> SessionStatus {
        SessionStatus {
            state: "COMPLETE".into(),
            result: Some(SessionResult {
                end_result: "OK".into(),
                document_number: Some("PNOEE-31111111111-MOCK-Q".into()),
            }),
            cert: Some(SessionCertificate {
                value: base64::engine::general_purpose::STANDARD.encode(b"certificate-der"),
                certificate_level: "QUALIFIED".into(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn result_from_completed_status() {
        let result = create_result(&completed_status()).unwrap();
        assert_eq!(result.certificate_der, b"certificate-der");
        assert_eq!(result.certificate_level, "QUALIFIED");
        assert_eq!(result.document_number, "PNOEE-31111111111-MOCK-Q");
    }

    #[test]
    fn missing_result_block_is_unprocessable() {
        let status = SessionStatus {
            state: "COMPLETE".into(),
            ..Default::default()
        };
        assert!(matches!(
            create_result(&status),
            Err(RemoteIdError::UnprocessableResponse(_))
        ));
    }

    #[test]
    fn missing_certificate_is_unprocessable() {
        let mut status = completed_status();
        status.cert = None;
        let err = create_result(&status).unwrap_err();
        assert!(err.to_string().contains("certificate is missing"));
    }

    #[test]
    fn missing_document_number_is_unprocessable() {
        let mut status = completed_status();
        status.result.as_mut().unwrap().document_number = None;
        let err = create_result(&status).unwrap_err();
        assert!(err.to_string().contains("document number is missing"));
    }

    #[test]
    fn refusal_maps_before_presence_checks() {
        let mut status = completed_status();
        status.result.as_mut().unwrap().end_result = "USER_REFUSED_CERT_CHOICE".into();
        status.cert = None;
        assert!(matches!(
            create_result(&status),
            Err(RemoteIdError::UserRefused(_))
        ));
    }

    #[test]
    fn request_properties_only_sent_when_asked() {
        let mut request = CertificateChoiceRequest::new("uuid", "name");
        assert!(request.to_session_request().request_properties.is_none());
        request.share_device_ip = true;
        assert!(request
            .to_session_request()
            .request_properties
            .is_some_and(|p| p.share_md_client_ip_address));
    }
}
