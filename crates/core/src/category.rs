//! PII categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PiiError;

/// The closed set of PII categories the classifier can emit.
///
/// Declaration order is the enumeration order used when scanning key
/// alias tables. Regex fallback uses its own priority list, see
/// [`DEFAULT_REGEX_PRIORITY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    Name,
    Address,
    PhoneNumber,
    EmailAddress,
    NationalId,
    DateOfBirth,
    Gender,
}

/// Order in which categories are tried when matching free text against
/// regex patterns. Most specific shapes first so that the permissive
/// address and name patterns only see what nothing else claimed.
pub const DEFAULT_REGEX_PRIORITY: [PiiCategory; 7] = [
    PiiCategory::EmailAddress,
    PiiCategory::NationalId,
    PiiCategory::PhoneNumber,
    PiiCategory::DateOfBirth,
    PiiCategory::Gender,
    PiiCategory::Address,
    PiiCategory::Name,
];

impl PiiCategory {
    pub const ALL: [PiiCategory; 7] = [
        PiiCategory::Name,
        PiiCategory::Address,
        PiiCategory::PhoneNumber,
        PiiCategory::EmailAddress,
        PiiCategory::NationalId,
        PiiCategory::DateOfBirth,
        PiiCategory::Gender,
    ];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            PiiCategory::Name => "Name",
            PiiCategory::Address => "Address",
            PiiCategory::PhoneNumber => "Phone Number",
            PiiCategory::EmailAddress => "Email Address",
            PiiCategory::NationalId => "Aadhaar Number",
            PiiCategory::DateOfBirth => "Date of Birth",
            PiiCategory::Gender => "Gender",
        }
    }

    /// Snake-case identifier, as used in rule files.
    pub fn as_str(self) -> &'static str {
        match self {
            PiiCategory::Name => "name",
            PiiCategory::Address => "address",
            PiiCategory::PhoneNumber => "phone_number",
            PiiCategory::EmailAddress => "email_address",
            PiiCategory::NationalId => "national_id",
            PiiCategory::DateOfBirth => "date_of_birth",
            PiiCategory::Gender => "gender",
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PiiCategory {
    type Err = PiiError;

    /// Accepts either the snake-case identifier or the label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PiiCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PiiError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_both_spellings() {
        assert_eq!("phone_number".parse::<PiiCategory>().unwrap(), PiiCategory::PhoneNumber);
        assert_eq!("Date of Birth".parse::<PiiCategory>().unwrap(), PiiCategory::DateOfBirth);
        assert!("passport".parse::<PiiCategory>().is_err());
    }

    #[test]
    fn test_priority_covers_every_category() {
        for category in PiiCategory::ALL {
            assert!(DEFAULT_REGEX_PRIORITY.contains(&category), "{category} missing");
        }
    }
}
