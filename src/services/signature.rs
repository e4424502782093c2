//! Signature operation.
//!
//! Asks the user's device to sign a hash after the user confirms on screen.
//! The hash is either supplied pre-computed or derived from raw signable
//! data; the interaction order tells the app what to display.

use base64::Engine;
use tokio_util::sync::CancellationToken;

use crate::adapters::rest::protocol::{RequestProperties, SignatureSessionRequest};
use crate::adapters::rest::Connector;
use crate::domain::hash::{HashAlgorithm, SignableData, SignableHash};
use crate::domain::identity::{IdentityRef, SemanticsIdentifier};
use crate::domain::interaction::Interaction;
use crate::domain::session::{
    interpret_end_result, CertificateLevel, SessionId, SessionStatus,
};
use crate::domain::verification;
use crate::infra::config::ClientConfig;
use crate::infra::error::{RemoteIdError, RemoteIdResult};
use crate::services::poller::SessionStatusPoller;
use crate::services::{
    resolve_hash, resolve_identity, validate_interactions, validate_nonce,
    validate_relying_party,
};

/// Parameters of a signature operation
#[derive(Debug, Clone, Default)]
pub struct SignatureRequest {
    /// Relying-party UUID.
    pub relying_party_uuid: String,
    /// Relying-party display name.
    pub relying_party_name: String,
    /// Document number addressing a specific enrolment.
    pub document_number: Option<String>,
    /// Semantics identifier addressing a person.
    pub semantics_identifier: Option<SemanticsIdentifier>,
    /// Minimum certificate level for the signing key.
    pub certificate_level: CertificateLevel,
    /// Pre-computed hash to sign.
    pub hash: Option<SignableHash>,
    /// Raw data to digest client-side when no complete hash is given.
    pub data: Option<SignableData>,
    /// Interaction preference order for the user's app.
    pub allowed_interactions_order: Vec<Interaction>,
    /// Relying-party supplied nonce, up to 30 characters.
    pub nonce: Option<String>,
    /// Capability hints for account selection.
    pub capabilities: Vec<String>,
    /// Ask the service to report the confirming device's IP address.
    pub share_device_ip: bool,
}

impl SignatureRequest {
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

    /// Validate all parameters, resolving the identity target and the hash
    /// that will be submitted.
    ///
    /// # Errors
    /// Fails with a configuration error naming the first violated rule.
    pub fn validate(&self) -> RemoteIdResult<(IdentityRef, String, HashAlgorithm)> {
        validate_relying_party(&self.relying_party_uuid, &self.relying_party_name)?;
        let identity = resolve_identity(&self.document_number, &self.semantics_identifier)?;
        validate_nonce(&self.nonce)?;
        let (hash_in_base64, algorithm) = resolve_hash(&self.hash, &self.data)?;
        validate_interactions(&self.allowed_interactions_order)?;
        Ok((identity, hash_in_base64, algorithm))
    }

    /// The 4-digit code to display to the end user for this request.
    ///
    /// # Errors
    /// Fails when neither a complete hash nor signable data is set.
    pub fn verification_code(&self) -> RemoteIdResult<String> {
        let (hash_in_base64, _) = resolve_hash(&self.hash, &self.data)?;
        let hash = base64::engine::general_purpose::STANDARD
            .decode(hash_in_base64)
            .expect("hash round-trips through base64");
        Ok(verification::calculate(&hash))
    }

    fn to_session_request(
        &self,
        hash_in_base64: String,
        algorithm: HashAlgorithm,
    ) -> SignatureSessionRequest {
        SignatureSessionRequest {
            relying_party_uuid: self.relying_party_uuid.clone(),
            relying_party_name: self.relying_party_name.clone(),
            certificate_level: self.certificate_level.as_str().to_string(),
            hash: hash_in_base64,
            hash_type: algorithm.as_str().to_string(),
            allowed_interactions_order: self.allowed_interactions_order.clone(),
            nonce: self.nonce.clone(),
            capabilities: self.capabilities.clone(),
            request_properties: self.share_device_ip.then(|| RequestProperties {
                share_md_client_ip_address: true,
            }),
        }
    }
}

/// Outcome of a completed signature operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureResult {
    /// Base64-encoded signature value.
    pub value_in_base64: String,
    /// Signature algorithm name reported by the service.
    pub algorithm_name: String,
    /// Document number of the signing account.
    pub document_number: Option<String>,
    /// Interaction flow the app actually rendered.
    pub interaction_flow_used: Option<String>,
    /// IP address of the confirming device, when shared.
    pub device_ip_address: Option<String>,
}

/// Validate the request and start a signature session.
///
/// # Errors
/// Fails on parameter validation or transport errors; no network call is made
/// when validation fails.
pub async fn initiate<C: Connector + ?Sized>(
    connector: &C,
    request: &SignatureRequest,
    cancel: &CancellationToken,
) -> RemoteIdResult<SessionId> {
    let (identity, hash_in_base64, algorithm) = request.validate()?;
    let response = connector
        .initiate_signature(
            &identity,
            &request.to_session_request(hash_in_base64, algorithm),
            cancel,
        )
        .await?;
    log::info!("Signature session started: {}", response.session_id);
    Ok(SessionId::new(response.session_id))
}

/// Interpret a terminal session status as a signature result.
///
/// # Errors
/// Maps non-`OK` end results to their semantic kinds; a missing result block
/// or signature value is an unprocessable response.
pub fn create_result(status: &SessionStatus) -> RemoteIdResult<SignatureResult> {
    let result = status.result.as_ref().ok_or_else(|| {
        RemoteIdError::UnprocessableResponse(
            "result is missing in the session status".to_string(),
        )
    })?;
    interpret_end_result(&result.end_result)?;

    let signature = status
        .signature
        .as_ref()
        .filter(|s| !s.value.is_empty())
        .ok_or_else(|| {
            RemoteIdError::UnprocessableResponse(
                "signature is missing in the session status".to_string(),
            )
        })?;

    Ok(SignatureResult {
        value_in_base64: signature.value.clone(),
        algorithm_name: signature.algorithm.clone(),
        document_number: result.document_number.clone(),
        interaction_flow_used: status.interaction_flow_used.clone(),
        device_ip_address: status.device_ip_address.clone(),
    })
}

/// One-call convenience path: validate, initiate, poll, interpret.
///
/// # Errors
/// Propagates validation, transport, polling, and interpretation errors.
pub async fn run<C: Connector + ?Sized>(
    poller: &SessionStatusPoller<'_, C>,
    request: &SignatureRequest,
    cancel: &CancellationToken,
) -> RemoteIdResult<SignatureResult> {
    let session_id = initiate(poller.connector(), request, cancel).await?;
    let status = poller.fetch_final_status(&session_id, cancel).await?;
    create_result(&status)
}
