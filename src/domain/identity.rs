//! Identity references and attributes.
//!
//! A signer or authenticator is addressed either by the document number the
//! service assigned to their enrolment, or by an ETSI semantics identifier
//! built from an identity document type, a country, and a national identity
//! number. After successful authentication the subject's attributes are
//! returned as an [`AuthenticationIdentity`].

use std::fmt;
use std::str::FromStr;

use time::{Date, Month};

use crate::infra::error::{RemoteIdError, RemoteIdResult};

/// Identity document type of a semantics identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityType {
    /// Passport number
    Pas,
    /// National ID-card number
    Idc,
    /// Personal identification number
    Pno,
}

impl IdentityType {
    /// Three-letter wire prefix.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityType::Pas => "PAS",
            IdentityType::Idc => "IDC",
            IdentityType::Pno => "PNO",
        }
    }
}

impl FromStr for IdentityType {
    type Err = RemoteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PAS" => Ok(IdentityType::Pas),
            "IDC" => Ok(IdentityType::Idc),
            "PNO" => Ok(IdentityType::Pno),
            _ => Err(RemoteIdError::Configuration(format!(
                "Unknown identity type: {s}"
            ))),
        }
    }
}

/// Structured identity reference of the form `TYPE` + `COUNTRY` + `-` + number,
/// e.g. `PNOEE-31111111111`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticsIdentifier {
    identity_type: IdentityType,
    country: String,
    identifier: String,
}

impl SemanticsIdentifier {
    /// Create a semantics identifier from its parts.
    ///
    /// # Errors
    /// Returns a configuration error if the country is not a two-letter code
    /// or the identifier part is empty.
    pub fn new(
        identity_type: IdentityType,
        country: impl AsRef<str>,
        identifier: impl Into<String>,
    ) -> RemoteIdResult<Self> {
        let country = country.as_ref();
        if country.len() != 2 || !country.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(RemoteIdError::Configuration(format!(
                "Country must be a two-letter code, got: {country}"
            )));
        }
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(RemoteIdError::Configuration(
                "Identifier part of a semantics identifier must not be empty".to_string(),
            ));
        }
        Ok(Self {
            identity_type,
            country: country.to_ascii_uppercase(),
            identifier,
        })
    }

    /// The identity document type.
    #[must_use]
    pub fn identity_type(&self) -> IdentityType {
        self.identity_type
    }

    /// Two-letter country code.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// National identifier part.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Wire form, e.g. `PNOEE-31111111111`.
    #[must_use]
    pub fn as_string(&self) -> String {
        format!(
            "{}{}-{}",
            self.identity_type.as_str(),
            self.country,
            self.identifier
        )
    }
}

impl FromStr for SemanticsIdentifier {
    type Err = RemoteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            RemoteIdError::Configuration(format!(
                "Semantics identifier must have the form TYPECC-number, got: {s}"
            ))
        };
        if s.len() < 7 || s.as_bytes().get(5) != Some(&b'-') {
            return Err(malformed());
        }
        let identity_type = s[0..3].parse::<IdentityType>().map_err(|_| malformed())?;
        Self::new(identity_type, &s[3..5], &s[6..])
    }
}

impl fmt::Display for SemanticsIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// Resolved target of a session initiation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRef {
    /// Service-assigned document number, e.g. `PNOEE-31111111111-MOCK-Q`.
    DocumentNumber(String),
    /// ETSI semantics identifier.
    Semantics(SemanticsIdentifier),
}

impl IdentityRef {
    /// URL path segment selecting the addressing scheme.
    #[must_use]
    pub fn path_kind(&self) -> &'static str {
        match self {
            IdentityRef::DocumentNumber(_) => "document",
            IdentityRef::Semantics(_) => "etsi",
        }
    }

    /// URL path segment carrying the identifier value.
    #[must_use]
    pub fn path_value(&self) -> String {
        match self {
            IdentityRef::DocumentNumber(number) => number.clone(),
            IdentityRef::Semantics(semantics) => semantics.as_string(),
        }
    }
}

/// Subject attributes extracted from a validated authentication certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationIdentity {
    /// Given name from the certificate subject.
    pub given_name: String,
    /// Surname from the certificate subject.
    pub surname: String,
    /// National identity number with the semantics prefix stripped.
    pub identity_number: String,
    /// Two-letter country code from the certificate subject.
    pub country: String,
    /// Date of birth, when recoverable from the certificate or the national
    /// identity number.
    pub date_of_birth: Option<Date>,
}

/// Derive the date of birth from a national identity number using
/// country-specific rules.
///
/// Estonia and Lithuania encode century and sex in the first digit and
/// `YYMMDD` in digits 2-7. Latvia encodes `DDMMYY` in the first six digits
/// with a separate century digit; newer-format Latvian numbers (prefix `32`)
/// carry no birth date at all and yield `None`.
#[must_use]
pub fn date_of_birth_from_national_number(country: &str, identity_number: &str) -> Option<Date> {
    match country.to_ascii_uppercase().as_str() {
        "EE" | "LT" => date_of_birth_ee_lt(identity_number),
        "LV" => date_of_birth_lv(identity_number),
        _ => None,
    }
}

fn date_of_birth_ee_lt(identity_number: &str) -> Option<Date> {
    if identity_number.len() < 7
        || !identity_number.bytes().take(7).all(|b| b.is_ascii_digit())
    {
        log::warn!("Unparseable national identity number");
        return None;
    }
    let century = match identity_number.as_bytes()[0] {
        b'1' | b'2' => 1800,
        b'3' | b'4' => 1900,
        b'5' | b'6' => 2000,
        _ => return None,
    };
    build_date(
        century,
        &identity_number[1..3],
        &identity_number[3..5],
        &identity_number[5..7],
    )
}

fn date_of_birth_lv(identity_number: &str) -> Option<Date> {
    // Newer-format Latvian codes are opaque and encode no birth date.
    if identity_number.starts_with("32") {
        return None;
    }
    if identity_number.len() < 7
        || !identity_number.bytes().take(6).all(|b| b.is_ascii_digit())
    {
        log::warn!("Unparseable national identity number");
        return None;
    }
    let century_index = if identity_number.as_bytes().get(6) == Some(&b'-') {
        7
    } else {
        6
    };
    let century = match identity_number.as_bytes().get(century_index)? {
        b'0' => 1800,
        b'1' => 1900,
        b'2' => 2000,
        _ => return None,
    };
    build_date(
        century,
        &identity_number[4..6],
        &identity_number[2..4],
        &identity_number[0..2],
    )
}

fn build_date(century: i32, yy: &str, mm: &str, dd: &str) -> Option<Date> {
    let year = century + yy.parse::<i32>().ok()?;
    let month = Month::try_from(mm.parse::<u8>().ok()?).ok()?;
    let day = dd.parse::<u8>().ok()?;
    match Date::from_calendar_date(year, month, day) {
        Ok(date) => Some(date),
        Err(_) => {
            log::warn!("National identity number encodes an invalid calendar date");
            None
        }
    }
}
