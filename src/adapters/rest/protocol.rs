//! Protocol definitions for the identity service REST API.
//!
//! Defines the JSON request bodies sent on session initiation and the session
//! creation response. The session status response lives in
//! [`crate::domain::session`] because it is part of the public result model.

use serde::{Deserialize, Serialize};

use crate::domain::interaction::Interaction;

/// Optional request properties block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestProperties {
    /// Ask the service to report the confirming device's IP address.
    pub share_md_client_ip_address: bool,
}

/// Request body for initiating a certificate-choice session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateChoiceSessionRequest {
    /// Relying-party UUID issued by the service operator.
    #[serde(rename = "relyingPartyUUID")]
    pub relying_party_uuid: String,
    /// Relying-party display name.
    pub relying_party_name: String,
    /// Requested certificate level.
    pub certificate_level: String,
    /// Relying-party supplied nonce, up to 30 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Capability hints for account selection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    /// Optional request properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_properties: Option<RequestProperties>,
}

/// Request body for initiating a signature session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureSessionRequest {
    /// Relying-party UUID issued by the service operator.
    #[serde(rename = "relyingPartyUUID")]
    pub relying_party_uuid: String,
    /// Relying-party display name.
    pub relying_party_name: String,
    /// Requested certificate level.
    pub certificate_level: String,
    /// Base64-encoded hash to sign.
    pub hash: String,
    /// Algorithm that produced the hash, e.g. `SHA512`.
    pub hash_type: String,
    /// Interaction preference order for the user's app.
    pub allowed_interactions_order: Vec<Interaction>,
    /// Relying-party supplied nonce, up to 30 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Capability hints for account selection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    /// Optional request properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_properties: Option<RequestProperties>,
}

/// Request body for initiating an authentication session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationSessionRequest {
    /// Relying-party UUID issued by the service operator.
    #[serde(rename = "relyingPartyUUID")]
    pub relying_party_uuid: String,
    /// Relying-party display name.
    pub relying_party_name: String,
    /// Requested certificate level.
    pub certificate_level: String,
    /// Base64-encoded hash the device will confirm and sign.
    pub hash: String,
    /// Algorithm that produced the hash, e.g. `SHA512`.
    pub hash_type: String,
    /// Interaction preference order for the user's app.
    pub allowed_interactions_order: Vec<Interaction>,
    /// Relying-party supplied nonce, up to 30 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Capability hints for account selection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    /// Optional request properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_properties: Option<RequestProperties>,
}

/// Response to a successful session initiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Opaque id used for all subsequent status polls.
    #[serde(rename = "sessionID")]
    pub session_id: String,
}
