//! End-to-end validation of authentication responses against generated
//! RSA certificates.

use base64::Engine;
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::{Padding, Rsa};
use openssl::x509::{X509NameBuilder, X509};
use remoteid_client::{
    AuthenticationResponse, AuthenticationResponseValidator, CertificateLevel, HashAlgorithm,
    RemoteIdError,
};
use time::macros::date;

/// DigestInfo prefix for a PKCS#1 v1.5 signature over a SHA-512 hash.
const SHA512_DIGEST_INFO_PREFIX: [u8; 19] = [
    0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03,
    0x05, 0x00, 0x04, 0x40,
];

struct TestAccount {
    pkey: PKey<Private>,
    certificate: X509,
}

fn base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn make_account(not_before: Asn1Time, not_after: Asn1Time) -> TestAccount {
    let rsa = Rsa::generate(2048).unwrap();
    let pkey = PKey::from_rsa(rsa).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COUNTRYNAME, "EE").unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, "TESTNUMBER,FORENAME")
        .unwrap();
    name.append_entry_by_nid(Nid::GIVENNAME, "FORENAME").unwrap();
    name.append_entry_by_nid(Nid::SURNAME, "TESTNUMBER").unwrap();
    name.append_entry_by_nid(Nid::SERIALNUMBER, "PNOEE-30303039914")
        .unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_not_before(&not_before).unwrap();
    builder.set_not_after(&not_after).unwrap();
    builder.set_pubkey(&pkey).unwrap();
    builder.sign(&pkey, MessageDigest::sha256()).unwrap();

    TestAccount {
        pkey,
        certificate: builder.build(),
    }
}

fn current_account() -> TestAccount {
    make_account(
        Asn1Time::days_from_now(0).unwrap(),
        Asn1Time::days_from_now(365).unwrap(),
    )
}

fn expired_account() -> TestAccount {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    make_account(
        Asn1Time::from_unix(now - 2 * 365 * 86_400).unwrap(),
        Asn1Time::from_unix(now - 86_400).unwrap(),
    )
}

/// Sign a hash the way the device does: PKCS#1 v1.5 over the DigestInfo.
fn sign_hash(account: &TestAccount, hash: &[u8]) -> Vec<u8> {
    let mut digest_info = SHA512_DIGEST_INFO_PREFIX.to_vec();
    digest_info.extend_from_slice(hash);

    let rsa = account.pkey.rsa().unwrap();
    let mut signature = vec![0u8; rsa.size() as usize];
    let length = rsa
        .private_encrypt(&digest_info, &mut signature, Padding::PKCS1)
        .unwrap();
    signature.truncate(length);
    signature
}

fn valid_response(account: &TestAccount) -> AuthenticationResponse {
    let hash = remoteid_client::calculate_digest(
        b"login challenge",
        Some(HashAlgorithm::Sha512),
    )
    .unwrap();
    let signature = sign_hash(account, &hash);

    AuthenticationResponse {
        end_result: "OK".into(),
        signed_hash_in_base64: base64(&hash),
        hash_algorithm: HashAlgorithm::Sha512,
        signature_value_in_base64: base64(&signature),
        algorithm_name: "sha512WithRSAEncryption".into(),
        certificate_der: account.certificate.to_der().unwrap(),
        certificate_level: "QUALIFIED".into(),
        requested_certificate_level: CertificateLevel::Qualified,
        document_number: Some("PNOEE-30303039914-MOCK-Q".into()),
        interaction_flow_used: Some("displayTextAndPIN".into()),
        device_ip_address: None,
    }
}

fn validator_trusting(account: &TestAccount) -> AuthenticationResponseValidator {
    AuthenticationResponseValidator::with_trusted_certificates(vec![account
        .certificate
        .clone()])
}

#[test]
fn valid_response_yields_the_identity() {
    let account = current_account();
    let identity = validator_trusting(&account)
        .validate(&valid_response(&account))
        .unwrap();

    assert_eq!(identity.given_name, "FORENAME");
    assert_eq!(identity.surname, "TESTNUMBER");
    assert_eq!(identity.identity_number, "30303039914");
    assert_eq!(identity.country, "EE");
    // Recovered from the national identity number: first digit 3 puts the
    // birth in the 1900s, digits 2-7 encode 03-03-03.
    assert_eq!(identity.date_of_birth, Some(date!(1903 - 03 - 03)));
}

#[test]
fn non_ok_end_result_is_rejected_first() {
    let account = current_account();
    let mut response = valid_response(&account);
    response.end_result = "TIMEOUT".into();

    let err = validator_trusting(&account).validate(&response).unwrap_err();
    match err {
        RemoteIdError::UnprocessableResponse(message) => {
            assert_eq!(message, "end result code 'TIMEOUT'");
        }
        other => panic!("expected unprocessable response, got {other:?}"),
    }
}

#[test]
fn missing_signature_is_rejected() {
    let account = current_account();
    let mut response = valid_response(&account);
    response.signature_value_in_base64 = String::new();

    let err = validator_trusting(&account).validate(&response).unwrap_err();
    assert!(err.to_string().contains("signature is missing"));
}

#[test]
fn missing_certificate_is_rejected() {
    let account = current_account();
    let mut response = valid_response(&account);
    response.certificate_der = Vec::new();

    let err = validator_trusting(&account).validate(&response).unwrap_err();
    assert!(err.to_string().contains("certificate is missing"));
}

#[test]
fn signature_over_a_different_hash_fails_verification() {
    let account = current_account();
    let mut response = valid_response(&account);
    let other_hash = remoteid_client::calculate_digest(
        b"some other challenge",
        Some(HashAlgorithm::Sha512),
    )
    .unwrap();
    response.signed_hash_in_base64 = base64(&other_hash);

    let err = validator_trusting(&account).validate(&response).unwrap_err();
    match err {
        RemoteIdError::UnprocessableResponse(message) => {
            assert_eq!(message, "signature verification failed");
        }
        other => panic!("expected unprocessable response, got {other:?}"),
    }
}

#[test]
fn garbage_signature_fails_verification() {
    let account = current_account();
    let mut response = valid_response(&account);
    response.signature_value_in_base64 = base64(&[0x55; 256]);

    let err = validator_trusting(&account).validate(&response).unwrap_err();
    assert!(err.to_string().contains("signature verification failed"));
}

#[test]
fn expired_certificate_is_rejected() {
    let account = expired_account();
    let response = valid_response(&account);

    let err = validator_trusting(&account).validate(&response).unwrap_err();
    assert!(err.to_string().contains("expired"));
}

#[test]
fn certificate_outside_the_trust_store_is_rejected() {
    let account = current_account();
    let other = current_account();
    let response = valid_response(&account);

    let err = validator_trusting(&other).validate(&response).unwrap_err();
    assert!(err.to_string().contains("not trusted"));
}

#[test]
fn empty_trust_store_rejects_everything() {
    let account = current_account();
    let validator = AuthenticationResponseValidator::new();

    let err = validator.validate(&valid_response(&account)).unwrap_err();
    assert!(err.to_string().contains("not trusted"));
}

#[test]
fn trust_anchor_can_be_added_at_runtime() {
    let account = current_account();
    let validator = AuthenticationResponseValidator::new();
    validator.add_trusted_certificate(account.certificate.clone());

    assert!(validator.validate(&valid_response(&account)).is_ok());
}

#[test]
fn advanced_certificate_fails_a_qualified_request() {
    let account = current_account();
    let mut response = valid_response(&account);
    response.certificate_level = "ADVANCED".into();

    let err = validator_trusting(&account).validate(&response).unwrap_err();
    match err {
        RemoteIdError::CertificateLevelMismatch {
            requested,
            returned,
        } => {
            assert_eq!(requested, "QUALIFIED");
            assert_eq!(returned, "ADVANCED");
        }
        other => panic!("expected certificate level mismatch, got {other:?}"),
    }
}

#[test]
fn advanced_certificate_satisfies_an_advanced_request() {
    let account = current_account();
    let mut response = valid_response(&account);
    response.certificate_level = "ADVANCED".into();
    response.requested_certificate_level = CertificateLevel::Advanced;

    assert!(validator_trusting(&account).validate(&response).is_ok());
}

#[test]
fn unrecognized_reported_level_ranks_below_every_request() {
    let account = current_account();
    let mut response = valid_response(&account);
    response.certificate_level = "SOMETHING_NEW".into();
    response.requested_certificate_level = CertificateLevel::Advanced;

    assert!(matches!(
        validator_trusting(&account).validate(&response).unwrap_err(),
        RemoteIdError::CertificateLevelMismatch { .. }
    ));
}

#[test]
fn pem_bundle_trust_store() {
    let account = current_account();
    let pem = account.certificate.to_pem().unwrap();
    let validator = AuthenticationResponseValidator::from_pem_bundle(&pem).unwrap();

    assert!(validator.validate(&valid_response(&account)).is_ok());
}
