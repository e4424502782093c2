//! Session model.
//!
//! A session is one operation instance at the service: created by an
//! initiation call, identified by an opaque id, and polled until it reaches
//! the terminal `COMPLETE` state carrying an end-result code.

use std::fmt;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::infra::error::{RefusalFlow, RemoteIdError, RemoteIdResult};

/// Opaque session identifier returned by session initiation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw session id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal outcome block of a completed session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    /// End-result classifier, e.g. `OK` or `USER_REFUSED`.
    pub end_result: String,
    /// Document number of the account that completed the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
}

/// Certificate block of a completed session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCertificate {
    /// Base64-encoded DER certificate.
    pub value: String,
    /// Level reported for the certificate, e.g. `QUALIFIED`.
    #[serde(default)]
    pub certificate_level: String,
}

impl SessionCertificate {
    /// Decode the certificate value into DER bytes.
    ///
    /// # Errors
    /// Fails with an unprocessable-response error on invalid base64.
    pub fn decode_value(&self) -> RemoteIdResult<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.value)
            .map_err(|e| {
                RemoteIdError::UnprocessableResponse(format!(
                    "certificate value is not valid base64: {e}"
                ))
            })
    }
}

/// Signature block of a completed session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSignature {
    /// Base64-encoded signature value.
    pub value: String,
    /// Signature algorithm name, e.g. `sha512WithRSAEncryption`.
    #[serde(default)]
    pub algorithm: String,
}

impl SessionSignature {
    /// Decode the signature value into raw bytes.
    ///
    /// # Errors
    /// Fails with an unprocessable-response error on invalid base64.
    pub fn decode_value(&self) -> RemoteIdResult<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.value)
            .map_err(|e| {
                RemoteIdError::UnprocessableResponse(format!(
                    "signature value is not valid base64: {e}"
                ))
            })
    }
}

/// Snapshot of a session as returned by the status endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// `RUNNING` or `COMPLETE`; matched case-insensitively.
    pub state: String,
    /// Terminal outcome; present only when the session is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SessionResult>,
    /// Certificate; presence depends on the operation kind and end result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<SessionCertificate>,
    /// Signature; presence depends on the operation kind and end result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SessionSignature>,
    /// Interaction flow the app actually rendered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_flow_used: Option<String>,
    /// IP address of the confirming device, when sharing was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_ip_address: Option<String>,
    /// Request parameters the server reported it did not understand.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_properties: Vec<String>,
}

impl SessionStatus {
    /// Whether the session reached its terminal state.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.eq_ignore_ascii_case("COMPLETE")
    }

    /// Whether the session is still waiting for the end user.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.eq_ignore_ascii_case("RUNNING")
    }
}

/// Translate a terminal end-result code into success or a semantic error.
///
/// # Errors
/// Every non-`OK` code maps to its own error kind; codes this client does not
/// recognize are a protocol violation and map to an unprocessable-response
/// error rather than a generic refusal.
pub fn interpret_end_result(end_result: &str) -> RemoteIdResult<()> {
    match end_result.to_ascii_uppercase().as_str() {
        "OK" => Ok(()),
        "USER_REFUSED" => Err(RemoteIdError::UserRefused(RefusalFlow::Unspecified)),
        "USER_REFUSED_CERT_CHOICE" => {
            Err(RemoteIdError::UserRefused(RefusalFlow::CertificateChoice))
        }
        "USER_REFUSED_DISPLAYTEXTANDPIN" => {
            Err(RemoteIdError::UserRefused(RefusalFlow::PinScreen))
        }
        "USER_REFUSED_VC_CHOICE" => Err(RemoteIdError::UserRefused(
            RefusalFlow::VerificationCodeChoice,
        )),
        "USER_REFUSED_CONFIRMATIONMESSAGE" => Err(RemoteIdError::UserRefused(
            RefusalFlow::ConfirmationMessage,
        )),
        "USER_REFUSED_CONFIRMATIONMESSAGE_WITH_VC_CHOICE" => Err(RemoteIdError::UserRefused(
            RefusalFlow::ConfirmationMessageWithVerificationCodeChoice,
        )),
        "TIMEOUT" => Err(RemoteIdError::SessionTimedOut),
        "WRONG_VC" => Err(RemoteIdError::WrongVerificationCode),
        "REQUIRED_INTERACTION_NOT_SUPPORTED_BY_APP" => {
            Err(RemoteIdError::InteractionNotSupported)
        }
        "DOCUMENT_UNUSABLE" => Err(RemoteIdError::DocumentUnusable),
        _ => Err(RemoteIdError::UnprocessableResponse(format!(
            "end result code '{end_result}'"
        ))),
    }
}

/// Certificate trust tier a relying party can request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CertificateLevel {
    /// Advanced electronic signature level.
    Advanced,
    /// Qualified electronic signature level.
    #[default]
    Qualified,
}

impl CertificateLevel {
    /// Wire name of the level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateLevel::Advanced => "ADVANCED",
            CertificateLevel::Qualified => "QUALIFIED",
        }
    }
}

impl fmt::Display for CertificateLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordering rank of a reported level string; unrecognized levels rank lowest.
fn level_rank(level: &str) -> u8 {
    match level.to_ascii_uppercase().as_str() {
        "ADVANCED" => 1,
        "QUALIFIED" => 2,
        _ => 0,
    }
}

/// Whether a reported certificate level satisfies the requested one.
#[must_use]
pub fn is_level_equal_or_above(returned: &str, requested: CertificateLevel) -> bool {
    level_rank(returned) >= level_rank(requested.as_str())
}
