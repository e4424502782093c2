mod common;

use common::{complete_ok, ScriptedConnector};
use remoteid_client::{
    AuthenticationRequest, CertificateChoiceRequest, HashAlgorithm, Interaction, RemoteIdClient,
    RemoteIdError, SignableData, SignableHash, SignatureRequest,
};
use tokio_util::sync::CancellationToken;

const RP_UUID: &str = "00000000-0000-0000-0000-000000000000";
const RP_NAME: &str = "DEMO";

fn configuration_message(err: RemoteIdError) -> String {
    match err {
        RemoteIdError::Configuration(message) => message,
        other => panic!("expected configuration error, got {other:?}"),
    }
}

fn valid_authentication_request() -> AuthenticationRequest {
    let mut request = AuthenticationRequest::new(RP_UUID, RP_NAME);
    request.semantics_identifier = Some("PNOEE-31111111111".parse().unwrap());
    request.data = Some(SignableData::new(b"login challenge".to_vec()));
    request.allowed_interactions_order = vec![Interaction::display_text_and_pin("Log in?")];
    request
}

#[test]
fn missing_relying_party_uuid_is_reported_first() {
    // Everything else is wrong too; the UUID rule must win.
    let request = AuthenticationRequest::new("", "");
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Parameter relyingPartyUUID must be set"
    );
}

#[test]
fn missing_relying_party_name_is_reported_second() {
    let request = AuthenticationRequest::new(RP_UUID, "");
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Parameter relyingPartyName must be set"
    );
}

#[test]
fn missing_identity_reference() {
    let mut request = valid_authentication_request();
    request.semantics_identifier = None;
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Either documentNumber or semanticsIdentifier must be set"
    );
}

#[test]
fn ambiguous_identity_reference() {
    let mut request = valid_authentication_request();
    request.document_number = Some(common::TEST_DOCUMENT_NUMBER.into());
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Exactly one of documentNumber or semanticsIdentifier must be set"
    );
}

#[test]
fn over_long_nonce() {
    let mut request = valid_authentication_request();
    request.nonce = Some("a".repeat(31));
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Nonce cannot be longer than 30 characters"
    );
}

#[test]
fn identity_rule_trumps_nonce_rule() {
    let mut request = valid_authentication_request();
    request.semantics_identifier = None;
    request.nonce = Some("a".repeat(31));
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Either documentNumber or semanticsIdentifier must be set"
    );
}

#[test]
fn missing_hash_and_data() {
    let mut request = valid_authentication_request();
    request.data = None;
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Either signableHash or signableData must be set"
    );
}

#[test]
fn incomplete_hash_counts_as_missing() {
    let mut request = valid_authentication_request();
    request.data = None;
    request.hash = Some(SignableHash {
        hash: vec![0xAA; 16],
        algorithm: Some(HashAlgorithm::Sha256),
    });
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Either signableHash or signableData must be set"
    );
}

#[test]
fn empty_interaction_order() {
    let mut request = valid_authentication_request();
    request.allowed_interactions_order.clear();
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Missing or empty mandatory parameter allowedInteractionsOrder"
    );
}

#[test]
fn invalid_interaction_entry() {
    let mut request = valid_authentication_request();
    request.allowed_interactions_order =
        vec![Interaction::verification_code_choice("x".repeat(61))];
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "displayText60 must not be longer than 60 characters"
    );
}

#[test]
fn signature_request_shares_the_same_rules() {
    let mut request = SignatureRequest::new(RP_UUID, RP_NAME);
    request.document_number = Some(common::TEST_DOCUMENT_NUMBER.into());
    request.hash = Some(SignableHash::new(
        vec![0xAA; 64],
        HashAlgorithm::Sha512,
    ));
    assert_eq!(
        configuration_message(request.validate().unwrap_err()),
        "Missing or empty mandatory parameter allowedInteractionsOrder"
    );

    request.allowed_interactions_order =
        vec![Interaction::confirmation_message("Sign the agreement?")];
    assert!(request.validate().is_ok());
}

#[test]
fn certificate_choice_needs_no_hash_or_interactions() {
    let mut request = CertificateChoiceRequest::new(RP_UUID, RP_NAME);
    request.document_number = Some(common::TEST_DOCUMENT_NUMBER.into());
    assert!(request.validate().is_ok());
}

#[test]
fn validate_resolves_the_submitted_hash() {
    let request = valid_authentication_request();
    let (identity, hash_in_base64, algorithm) = request.validate().unwrap();
    assert_eq!(identity.path_kind(), "etsi");
    assert_eq!(algorithm, HashAlgorithm::Sha512);
    assert!(!hash_in_base64.is_empty());
}

#[tokio::test]
async fn validation_failure_never_reaches_the_network() {
    let connector = ScriptedConnector::new(vec![complete_ok()]);
    let client = RemoteIdClient::with_connector(connector);

    let request = AuthenticationRequest::new("", RP_NAME);
    let err = client
        .authenticate(&request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteIdError::Configuration(_)));
    assert_eq!(client.connector().initiations(), 0);
    assert_eq!(client.connector().fetches(), 0);
}
