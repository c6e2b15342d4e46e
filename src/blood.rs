//! Blood group vocabulary shared across users, requests, and facilities.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The eight ABO/Rh blood groups.
///
/// The wire form is the conventional short notation ("A+", "O-", "AB+", ...),
/// both in JSON bodies and in query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodType {
    /// Every blood group, in a stable order.
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::OPositive,
        BloodType::ONegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
    ];

    /// Returns the short notation for this blood group.
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
        }
    }
}

impl Display for BloodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown blood group string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodTypeParseError {
    invalid: String,
}

impl BloodTypeParseError {
    /// Returns the string that failed to parse.
    pub fn invalid(&self) -> &str {
        &self.invalid
    }
}

impl Display for BloodTypeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Unknown blood type {:?}. Expected one of A+, A-, B+, B-, O+, O-, AB+, AB-",
            self.invalid
        )
    }
}

impl std::error::Error for BloodTypeParseError {}

impl FromStr for BloodType {
    type Err = BloodTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for bt in BloodType::ALL {
            if bt.as_str() == s {
                return Ok(bt);
            }
        }
        Err(BloodTypeParseError {
            invalid: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_groups_round_trip() {
        for bt in BloodType::ALL {
            let parsed: BloodType = bt.as_str().parse().unwrap();
            assert_eq!(parsed, bt);
        }
    }

    #[test]
    fn unknown_group_rejected() {
        let err = "C+".parse::<BloodType>().unwrap_err();
        assert_eq!(err.invalid(), "C+");
    }

    #[test]
    fn lowercase_rejected() {
        assert!("a+".parse::<BloodType>().is_err());
    }

    #[test]
    fn serde_uses_short_notation() {
        let json = serde_json::to_string(&BloodType::AbNegative).unwrap();
        assert_eq!(json, "\"AB-\"");
        let back: BloodType = serde_json::from_str("\"O+\"").unwrap();
        assert_eq!(back, BloodType::OPositive);
    }
}
