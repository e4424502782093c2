//! Error types for remote identity operations.
//! One variant per semantic failure kind; callers dispatch with `match`.

use std::fmt;

use thiserror::Error;

/// Result type for remote identity operations
pub type RemoteIdResult<T> = Result<T, RemoteIdError>;

/// Screen on which the end user refused the operation, as reported by the
/// service in the session end result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalFlow {
    /// The service reported a refusal without naming a screen.
    Unspecified,
    /// Refused while choosing the certificate.
    CertificateChoice,
    /// Refused on the PIN entry screen.
    PinScreen,
    /// Refused on the verification code choice screen.
    VerificationCodeChoice,
    /// Refused on the confirmation message screen.
    ConfirmationMessage,
    /// Refused on the combined confirmation message and verification code
    /// choice screen.
    ConfirmationMessageWithVerificationCodeChoice,
}

impl fmt::Display for RefusalFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RefusalFlow::Unspecified => "no specific screen reported",
            RefusalFlow::CertificateChoice => "certificate choice screen",
            RefusalFlow::PinScreen => "PIN entry screen",
            RefusalFlow::VerificationCodeChoice => "verification code choice screen",
            RefusalFlow::ConfirmationMessage => "confirmation message screen",
            RefusalFlow::ConfirmationMessageWithVerificationCodeChoice => {
                "confirmation message and verification code choice screen"
            }
        };
        write!(f, "{text}")
    }
}

/// Semantic error taxonomy for remote identity operations
#[derive(Error, Debug, miette::Diagnostic)]
pub enum RemoteIdError {
    /// Bad or missing request parameters, detected before any network call,
    /// or reported back by the service as an invalid request.
    #[error("client configuration error: {0}")]
    Configuration(String),

    /// The remote reply is malformed, incomplete, failed a security check, or
    /// carries an end-result code this client does not recognize.
    #[error("unprocessable response: {0}")]
    UnprocessableResponse(String),

    /// The end user refused the operation.
    #[error("user refused the operation ({0})")]
    UserRefused(RefusalFlow),

    /// The session reached the service-side timeout before the user acted.
    #[error("session timed out before the user completed the operation")]
    SessionTimedOut,

    /// The end user picked the wrong verification code on their device.
    #[error("user selected the wrong verification code")]
    WrongVerificationCode,

    /// None of the requested interactions can be displayed by the user's app.
    #[error("requested interaction is not supported by the user's app")]
    InteractionNotSupported,

    /// The user's identity document cannot be used for this operation.
    #[error("user's document is unusable")]
    DocumentUnusable,

    /// No account was found for the given identifier.
    #[error("user account not found")]
    AccountNotFound,

    /// An account exists but none of the requested type.
    #[error("no suitable account of requested type found")]
    NoSuitableAccount,

    /// The person must visit the identity provider's app or portal before the
    /// operation can proceed.
    #[error("person should view the identity provider's app or portal for details")]
    PersonShouldViewPortal,

    /// The returned certificate level is below the requested one.
    #[error("certificate level mismatch: certificate is '{returned}' but '{requested}' was requested")]
    CertificateLevelMismatch {
        /// Level the relying party asked for.
        requested: String,
        /// Level reported on the returned certificate.
        returned: String,
    },

    /// The relying party account is misconfigured or not authorized.
    #[error("relying party account configuration error: {0}")]
    RelyingPartyConfiguration(String),

    /// The session id is unknown to the service.
    #[error("session not found")]
    SessionNotFound,

    /// The service is temporarily down for maintenance.
    #[error("service is under maintenance, please retry later")]
    ServerMaintenance,

    /// The service no longer supports this client's API version.
    #[error("client API version is no longer supported by the service")]
    UnsupportedClientVersion,

    /// Transport-level failure with no semantic mapping.
    #[error("network error: {0}")]
    Network(String),
}
