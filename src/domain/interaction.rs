//! Allowed-interaction descriptors.
//!
//! An interaction tells the end user's app what to display while asking for
//! confirmation. The relying party submits an ordered preference list; the app
//! honors the first entry it is able to render.

use serde::{Deserialize, Serialize};

use crate::infra::error::{RemoteIdError, RemoteIdResult};

/// Maximum length of the short prompt text.
pub const SHORT_TEXT_MAX: usize = 60;
/// Maximum length of the long confirmation text.
pub const LONG_TEXT_MAX: usize = 200;

/// Interaction flow identifiers as the service names them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Short prompt with a PIN entry.
    #[serde(rename = "displayTextAndPIN")]
    DisplayTextAndPin,
    /// Short prompt with a verification code choice.
    #[serde(rename = "verificationCodeChoice")]
    VerificationCodeChoice,
    /// Long confirmation message.
    #[serde(rename = "confirmationMessage")]
    ConfirmationMessage,
    /// Long confirmation message followed by a verification code choice.
    #[serde(rename = "confirmationMessageAndVerificationCodeChoice")]
    ConfirmationMessageAndVerificationCodeChoice,
}

impl InteractionKind {
    /// Wire name of the interaction type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::DisplayTextAndPin => "displayTextAndPIN",
            InteractionKind::VerificationCodeChoice => "verificationCodeChoice",
            InteractionKind::ConfirmationMessage => "confirmationMessage",
            InteractionKind::ConfirmationMessageAndVerificationCodeChoice => {
                "confirmationMessageAndVerificationCodeChoice"
            }
        }
    }

    fn uses_short_text(&self) -> bool {
        matches!(
            self,
            InteractionKind::DisplayTextAndPin | InteractionKind::VerificationCodeChoice
        )
    }
}

/// One entry of the allowed-interactions order.
///
/// Wire-shaped: the type tag plus two optional text fields of which exactly
/// one must be populated, depending on the type. Use the factory constructors
/// to get the field placement right; [`Interaction::validate`] is the
/// enforcement point the request builders run before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Interaction flow requested from the app.
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    /// Short prompt, up to 60 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text_60: Option<String>,
    /// Long confirmation text, up to 200 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text_200: Option<String>,
}

impl Interaction {
    /// Short prompt shown together with the PIN entry.
    #[must_use]
    pub fn display_text_and_pin(text: impl Into<String>) -> Self {
        Self {
            kind: InteractionKind::DisplayTextAndPin,
            display_text_60: Some(text.into()),
            display_text_200: None,
        }
    }

    /// Short prompt shown together with a verification code choice.
    #[must_use]
    pub fn verification_code_choice(text: impl Into<String>) -> Self {
        Self {
            kind: InteractionKind::VerificationCodeChoice,
            display_text_60: Some(text.into()),
            display_text_200: None,
        }
    }

    /// Long confirmation message.
    #[must_use]
    pub fn confirmation_message(text: impl Into<String>) -> Self {
        Self {
            kind: InteractionKind::ConfirmationMessage,
            display_text_60: None,
            display_text_200: Some(text.into()),
        }
    }

    /// Long confirmation message followed by a verification code choice.
    #[must_use]
    pub fn confirmation_message_and_verification_code_choice(
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind: InteractionKind::ConfirmationMessageAndVerificationCodeChoice,
            display_text_60: None,
            display_text_200: Some(text.into()),
        }
    }

    /// Check the field placement and length rules for this interaction type.
    ///
    /// # Errors
    /// Returns a configuration error naming the violated constraint. The
    /// messages are part of the observable contract.
    pub fn validate(&self) -> RemoteIdResult<()> {
        let kind = self.kind.as_str();
        if self.kind.uses_short_text() {
            if self.display_text_60.is_none() {
                return Err(RemoteIdError::Configuration(format!(
                    "displayText60 cannot be null for interaction type {kind}"
                )));
            }
            if self
                .display_text_60
                .as_ref()
                .is_some_and(|t| t.chars().count() > SHORT_TEXT_MAX)
            {
                return Err(RemoteIdError::Configuration(format!(
                    "displayText60 must not be longer than {SHORT_TEXT_MAX} characters"
                )));
            }
            if self.display_text_200.is_some() {
                return Err(RemoteIdError::Configuration(format!(
                    "displayText200 must be null for interaction type {kind}"
                )));
            }
        } else {
            if self.display_text_200.is_none() {
                return Err(RemoteIdError::Configuration(format!(
                    "displayText200 cannot be null for interaction type {kind}"
                )));
            }
            if self
                .display_text_200
                .as_ref()
                .is_some_and(|t| t.chars().count() > LONG_TEXT_MAX)
            {
                return Err(RemoteIdError::Configuration(format!(
                    "displayText200 must not be longer than {LONG_TEXT_MAX} characters"
                )));
            }
            if self.display_text_60.is_some() {
                return Err(RemoteIdError::Configuration(format!(
                    "displayText60 must be null for interaction type {kind}"
                )));
            }
        }
        Ok(())
    }
}
