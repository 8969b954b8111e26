//! Submission-ready credential shapes.

use serde::Serialize;

use super::rules::{PhoneFormatter, Validator};

/// The classified form of an identifier.
///
/// Exactly one shape is produced per submission. Serializes to the fields the
/// login endpoint expects (`email`, or `countryCallCd` + `phone`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Credentials {
    Email {
        email: String,
    },
    Phone {
        #[serde(rename = "phone")]
        phone_number: String,
        #[serde(rename = "countryCallCd")]
        country_code: String,
    },
}

impl Credentials {
    /// Classifies a raw identifier.
    ///
    /// Phone-shaped identifiers lose their country prefix and carry
    /// `country_code`; anything else is passed through unmodified as an email.
    pub fn classify(
        identifier: &str,
        validator: &dyn Validator,
        formatter: &dyn PhoneFormatter,
        country_code: &str,
    ) -> Self {
        if validator.is_phone_format(identifier) {
            Credentials::Phone {
                phone_number: formatter.strip_country_code(identifier),
                country_code: country_code.to_string(),
            }
        } else {
            Credentials::Email {
                email: identifier.to_string(),
            }
        }
    }

    pub fn is_phone(&self) -> bool {
        matches!(self, Credentials::Phone { .. })
    }

    /// Short description safe for logs (no full phone number or email).
    pub fn redacted(&self) -> String {
        match self {
            Credentials::Email { email } => {
                let domain = email.rsplit_once('@').map_or("?", |(_, d)| d);
                format!("email@{domain}")
            }
            Credentials::Phone {
                phone_number,
                country_code,
            } => {
                let tail: String = phone_number
                    .chars()
                    .rev()
                    .take(3)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("phone +{country_code} ***{tail}")
            }
        }
    }
}
