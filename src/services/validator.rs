//! Authentication response validation.
//!
//! Runs the trust checks over a completed authentication response, in a fixed
//! order with a distinct failure per step, and extracts the subject's identity
//! from the validated certificate. Cryptography and chain building are
//! delegated to OpenSSL; only the policy lives here.

use std::sync::{PoisonError, RwLock};

use base64::Engine;
use der::asn1::GeneralizedTime;
use der::Decode;
use openssl::asn1::Asn1Time;
use openssl::nid::Nid;
use openssl::rsa::Padding;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::verify::X509VerifyFlags;
use openssl::x509::{X509StoreContext, X509};
use time::{Date, Month};

use crate::domain::hash::HashAlgorithm;
use crate::domain::identity::{date_of_birth_from_national_number, AuthenticationIdentity};
use crate::domain::session::is_level_equal_or_above;
use crate::infra::error::{RemoteIdError, RemoteIdResult};
use crate::services::authentication::AuthenticationResponse;

/// DigestInfo prefix for a PKCS#1 v1.5 signature over the given hash.
fn digest_info_prefix(algorithm: HashAlgorithm) -> &'static [u8] {
    match algorithm {
        HashAlgorithm::Sha256 => &[
            0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x01, 0x05, 0x00, 0x04, 0x20,
        ],
        HashAlgorithm::Sha384 => &[
            0x30, 0x41, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x02, 0x05, 0x00, 0x04, 0x30,
        ],
        HashAlgorithm::Sha512 => &[
            0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x03, 0x05, 0x00, 0x04, 0x40,
        ],
    }
}

fn crypto_error(e: openssl::error::ErrorStack) -> RemoteIdError {
    RemoteIdError::UnprocessableResponse(format!("cryptographic operation failed: {e}"))
}

/// Validates completed authentication responses against a trust store.
///
/// The trust list is read on every validation and mutated only by explicit
/// caller configuration, so it sits behind a read-write lock.
pub struct AuthenticationResponseValidator {
    trusted_certificates: RwLock<Vec<X509>>,
}

impl Default for AuthenticationResponseValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthenticationResponseValidator {
    /// Validator with an empty trust store; every chain check will fail until
    /// anchors are added.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trusted_certificates: RwLock::new(Vec::new()),
        }
    }

    /// Validator trusting the given root/intermediate certificates.
    #[must_use]
    pub fn with_trusted_certificates(certificates: Vec<X509>) -> Self {
        Self {
            trusted_certificates: RwLock::new(certificates),
        }
    }

    /// Validator trusting every certificate in a PEM bundle.
    ///
    /// # Errors
    /// Returns a configuration error if the bundle cannot be parsed.
    pub fn from_pem_bundle(pem: &[u8]) -> RemoteIdResult<Self> {
        let certificates = X509::stack_from_pem(pem).map_err(|e| {
            RemoteIdError::Configuration(format!("Failed to parse trusted certificates: {e}"))
        })?;
        Ok(Self::with_trusted_certificates(certificates))
    }

    /// Add a trust anchor.
    pub fn add_trusted_certificate(&self, certificate: X509) {
        self.trusted_certificates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(certificate);
    }

    /// Remove all trust anchors.
    pub fn clear_trusted_certificates(&self) {
        self.trusted_certificates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Validate a completed authentication response and extract the subject's
    /// identity.
    ///
    /// Checks run in order, stopping at the first failure: end result is `OK`,
    /// signature and certificate are present, the signature verifies over the
    /// submitted hash, the certificate is unexpired and chains to a configured
    /// trust anchor, and its level is at or above the requested one.
    ///
    /// # Errors
    /// Steps 1-6 fail with an unprocessable-response error naming the failed
    /// check; a too-low certificate level is a distinct
    /// [`RemoteIdError::CertificateLevelMismatch`].
    pub fn validate(
        &self,
        response: &AuthenticationResponse,
    ) -> RemoteIdResult<AuthenticationIdentity> {
        if !response.end_result.eq_ignore_ascii_case("OK") {
            return Err(RemoteIdError::UnprocessableResponse(format!(
                "end result code '{}'",
                response.end_result
            )));
        }

        if response.signature_value_in_base64.is_empty() {
            return Err(RemoteIdError::UnprocessableResponse(
                "signature is missing in the authentication response".to_string(),
            ));
        }

        if response.certificate_der.is_empty() {
            return Err(RemoteIdError::UnprocessableResponse(
                "certificate is missing in the authentication response".to_string(),
            ));
        }

        let certificate = X509::from_der(&response.certificate_der).map_err(|e| {
            RemoteIdError::UnprocessableResponse(format!("certificate cannot be parsed: {e}"))
        })?;

        let signature = base64::engine::general_purpose::STANDARD
            .decode(&response.signature_value_in_base64)
            .map_err(|e| {
                RemoteIdError::UnprocessableResponse(format!(
                    "signature value is not valid base64: {e}"
                ))
            })?;
        let hash = base64::engine::general_purpose::STANDARD
            .decode(&response.signed_hash_in_base64)
            .map_err(|e| {
                RemoteIdError::UnprocessableResponse(format!("hash is not valid base64: {e}"))
            })?;

        if !verify_signature(&certificate, &signature, &hash, response.hash_algorithm)? {
            return Err(RemoteIdError::UnprocessableResponse(
                "signature verification failed".to_string(),
            ));
        }

        let now = Asn1Time::days_from_now(0).map_err(crypto_error)?;
        if certificate.not_after() < now {
            return Err(RemoteIdError::UnprocessableResponse(
                "signer's certificate has expired".to_string(),
            ));
        }

        if !self.is_trusted(&certificate)? {
            return Err(RemoteIdError::UnprocessableResponse(
                "signer's certificate is not trusted".to_string(),
            ));
        }

        if !is_level_equal_or_above(
            &response.certificate_level,
            response.requested_certificate_level,
        ) {
            return Err(RemoteIdError::CertificateLevelMismatch {
                requested: response.requested_certificate_level.to_string(),
                returned: response.certificate_level.clone(),
            });
        }

        log::info!("Authentication response validated successfully");
        extract_identity(&certificate, &response.certificate_der)
    }

    /// Build a chain from the signer's certificate to a configured anchor.
    ///
    /// Unknown intermediates are tolerated (`PARTIAL_CHAIN`) and revocation is
    /// not checked: trust is anchored purely by presence in the store.
    fn is_trusted(&self, certificate: &X509) -> RemoteIdResult<bool> {
        let trusted = self
            .trusted_certificates
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if trusted.is_empty() {
            return Ok(false);
        }

        let mut store_builder = X509StoreBuilder::new().map_err(crypto_error)?;
        for anchor in trusted.iter() {
            store_builder.add_cert(anchor.clone()).map_err(crypto_error)?;
        }
        store_builder
            .set_flags(X509VerifyFlags::PARTIAL_CHAIN)
            .map_err(crypto_error)?;
        let store = store_builder.build();

        let untrusted = Stack::<X509>::new().map_err(crypto_error)?;
        let mut context = X509StoreContext::new().map_err(crypto_error)?;
        let (verified, error) = context
            .init(&store, certificate, &untrusted, |ctx| {
                let verified = ctx.verify_cert()?;
                Ok((verified, ctx.error()))
            })
            .map_err(crypto_error)?;
        if !verified {
            log::warn!(
                "Certificate chain building failed: {}",
                error.error_string()
            );
        }
        Ok(verified)
    }
}

/// Verify a PKCS#1 v1.5 RSA signature over the submitted hash.
///
/// The device signs the DigestInfo of the hash directly, so the check recovers
/// the padded structure with a public-key decrypt and compares it against the
/// expected algorithm prefix plus hash.
fn verify_signature(
    certificate: &X509,
    signature: &[u8],
    hash: &[u8],
    algorithm: HashAlgorithm,
) -> RemoteIdResult<bool> {
    let public_key = certificate.public_key().map_err(crypto_error)?;
    let rsa = public_key.rsa().map_err(|_| {
        RemoteIdError::UnprocessableResponse(
            "signer's certificate does not carry an RSA public key".to_string(),
        )
    })?;

    let mut recovered = vec![0u8; rsa.size() as usize];
    let length = match rsa.public_decrypt(signature, &mut recovered, Padding::PKCS1) {
        Ok(length) => length,
        // A malformed signature fails the decrypt; that is a verification
        // failure, not a protocol error.
        Err(_) => return Ok(false),
    };
    recovered.truncate(length);

    let mut expected = digest_info_prefix(algorithm).to_vec();
    expected.extend_from_slice(hash);
    Ok(recovered == expected)
}

fn subject_entry(certificate: &X509, nid: Nid) -> Option<String> {
    certificate
        .subject_name()
        .entries_by_nid(nid)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|value| value.to_string())
}

fn extract_identity(
    certificate: &X509,
    certificate_der: &[u8],
) -> RemoteIdResult<AuthenticationIdentity> {
    let missing = |attribute: &str| {
        RemoteIdError::UnprocessableResponse(format!(
            "certificate subject is missing the {attribute} attribute"
        ))
    };

    let given_name = subject_entry(certificate, Nid::GIVENNAME).ok_or_else(|| missing("givenName"))?;
    let surname = subject_entry(certificate, Nid::SURNAME).ok_or_else(|| missing("surname"))?;
    let serial_number =
        subject_entry(certificate, Nid::SERIALNUMBER).ok_or_else(|| missing("serialNumber"))?;
    let country =
        subject_entry(certificate, Nid::COUNTRYNAME).ok_or_else(|| missing("countryName"))?;

    let identity_number = strip_semantics_prefix(&serial_number);
    let date_of_birth = date_of_birth_from_certificate(certificate_der)
        .or_else(|| date_of_birth_from_national_number(&country, &identity_number));

    Ok(AuthenticationIdentity {
        given_name,
        surname,
        identity_number,
        country,
        date_of_birth,
    })
}

/// Strip a `TYPECC-` semantics prefix from a subject serial number.
fn strip_semantics_prefix(serial_number: &str) -> String {
    let bytes = serial_number.as_bytes();
    if bytes.len() > 6
        && bytes[..5].iter().all(u8::is_ascii_alphabetic)
        && bytes[5] == b'-'
    {
        serial_number[6..].to_string()
    } else {
        serial_number.to_string()
    }
}

/// Read the date of birth from the subject-directory-attributes extension,
/// when the issuer included one.
fn date_of_birth_from_certificate(certificate_der: &[u8]) -> Option<Date> {
    let certificate = x509_cert::Certificate::from_der(certificate_der).ok()?;
    let extensions = certificate.tbs_certificate.extensions.as_ref()?;
    for extension in extensions {
        if extension.extn_id.to_string() == "2.5.29.9" {
            return parse_subject_directory_attributes(extension.extn_value.as_bytes());
        }
    }
    None
}

fn parse_subject_directory_attributes(value: &[u8]) -> Option<Date> {
    let attributes: Vec<x509_cert::attr::Attribute> = Vec::from_der(value).ok()?;
    for attribute in attributes {
        if attribute.oid.to_string() != "1.3.6.1.5.5.7.9.1" {
            continue;
        }
        let birth_time = attribute.values.iter().next()?;
        let birth_time = birth_time.decode_as::<GeneralizedTime>().ok()?;
        let date_time = birth_time.to_date_time();
        let month = Month::try_from(date_time.month()).ok()?;
        return Date::from_calendar_date(i32::from(date_time.year()), month, date_time.day())
            .ok();
    }
    None
}
