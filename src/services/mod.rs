//! Service layer: session polling, the three operations, and response
//! validation.

pub mod authentication;
pub mod certificate;
pub mod poller;
pub mod signature;
pub mod validator;

use base64::Engine;

use crate::domain::hash::{HashAlgorithm, SignableData, SignableHash};
use crate::domain::identity::{IdentityRef, SemanticsIdentifier};
use crate::domain::interaction::Interaction;
use crate::infra::error::{RemoteIdError, RemoteIdResult};

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Relying-party identity must be complete before anything goes on the wire.
pub(crate) fn validate_relying_party(uuid: &str, name: &str) -> RemoteIdResult<()> {
    if uuid.is_empty() {
        return Err(RemoteIdError::Configuration(
            "Parameter relyingPartyUUID must be set".to_string(),
        ));
    }
    if name.is_empty() {
        return Err(RemoteIdError::Configuration(
            "Parameter relyingPartyName must be set".to_string(),
        ));
    }
    Ok(())
}

/// Exactly one of document number and semantics identifier selects the user.
pub(crate) fn resolve_identity(
    document_number: &Option<String>,
    semantics_identifier: &Option<SemanticsIdentifier>,
) -> RemoteIdResult<IdentityRef> {
    match (is_set(document_number), semantics_identifier) {
        (true, Some(_)) => Err(RemoteIdError::Configuration(
            "Exactly one of documentNumber or semanticsIdentifier must be set".to_string(),
        )),
        (true, None) => Ok(IdentityRef::DocumentNumber(
            document_number.clone().unwrap_or_default(),
        )),
        (false, Some(semantics)) => Ok(IdentityRef::Semantics(semantics.clone())),
        (false, None) => Err(RemoteIdError::Configuration(
            "Either documentNumber or semanticsIdentifier must be set".to_string(),
        )),
    }
}

pub(crate) fn validate_nonce(nonce: &Option<String>) -> RemoteIdResult<()> {
    if nonce.as_deref().is_some_and(|n| n.chars().count() > 30) {
        return Err(RemoteIdError::Configuration(
            "Nonce cannot be longer than 30 characters".to_string(),
        ));
    }
    Ok(())
}

/// Resolve the hash to submit: a complete pre-computed hash wins, otherwise
/// raw signable data is digested (SHA-512 unless told otherwise).
pub(crate) fn resolve_hash(
    hash: &Option<SignableHash>,
    data: &Option<SignableData>,
) -> RemoteIdResult<(String, HashAlgorithm)> {
    if let Some(hash) = hash {
        if hash.is_complete() {
            let algorithm = hash
                .algorithm
                .expect("complete hash always carries an algorithm");
            return Ok((hash.hash_in_base64(), algorithm));
        }
    }
    if let Some(data) = data {
        let algorithm = data.hash_algorithm();
        let digest = data.calculate_hash();
        return Ok((
            base64::engine::general_purpose::STANDARD.encode(digest),
            algorithm,
        ));
    }
    Err(RemoteIdError::Configuration(
        "Either signableHash or signableData must be set".to_string(),
    ))
}

/// The interaction order must be non-empty and every entry valid.
pub(crate) fn validate_interactions(interactions: &[Interaction]) -> RemoteIdResult<()> {
    if interactions.is_empty() {
        return Err(RemoteIdError::Configuration(
            "Missing or empty mandatory parameter allowedInteractionsOrder".to_string(),
        ));
    }
    for interaction in interactions {
        interaction.validate()?;
    }
    Ok(())
}
