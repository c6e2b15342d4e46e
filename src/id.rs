use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs::File;
use std::io::Read;
use std::str::FromStr;

use serde::Deserialize;

///////////////////////////////////// URL-Safe Base64 Encoding ////////////////////////////////////

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Length of the encoded form of a 16-byte identifier (no padding).
const ENCODED_LEN: usize = 22;

fn encode_base64_url_safe(input: &[u8]) -> String {
    let mut result = String::new();
    let mut i = 0;

    while i < input.len() {
        let b1 = input[i];
        let b2 = if i + 1 < input.len() { input[i + 1] } else { 0 };
        let b3 = if i + 2 < input.len() { input[i + 2] } else { 0 };

        let combined = ((b1 as u32) << 16) | ((b2 as u32) << 8) | (b3 as u32);

        let c1 = BASE64_CHARS[((combined >> 18) & 0x3F) as usize] as char;
        let c2 = BASE64_CHARS[((combined >> 12) & 0x3F) as usize] as char;

        result.push(c1);
        result.push(c2);

        if i + 1 < input.len() {
            let c3 = BASE64_CHARS[((combined >> 6) & 0x3F) as usize] as char;
            result.push(c3);
        }

        if i + 2 < input.len() {
            let c4 = BASE64_CHARS[(combined & 0x3F) as usize] as char;
            result.push(c4);
        }

        i += 3;
    }

    result
}

fn decode_base64_url_safe(input: &str) -> Result<Vec<u8>, &'static str> {
    let mut chars: Vec<char> = input.chars().collect();

    // Add padding if needed
    while !chars.len().is_multiple_of(4) {
        chars.push('=');
    }

    let mut result = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c1 = chars[i];
        let c2 = chars[i + 1];
        let c3 = chars[i + 2];
        let c4 = chars[i + 3];

        let v1 = char_to_base64_value(c1)?;
        let v2 = char_to_base64_value(c2)?;
        let v3 = if c3 == '=' {
            0
        } else {
            char_to_base64_value(c3)?
        };
        let v4 = if c4 == '=' {
            0
        } else {
            char_to_base64_value(c4)?
        };

        let combined = (v1 << 18) | (v2 << 12) | (v3 << 6) | v4;

        result.push((combined >> 16) as u8);
        if c3 != '=' {
            result.push((combined >> 8) as u8);
        }
        if c4 != '=' {
            result.push(combined as u8);
        }

        i += 4;
    }

    Ok(result)
}

fn char_to_base64_value(c: char) -> Result<u32, &'static str> {
    match c {
        'A'..='Z' => Ok((c as u32) - ('A' as u32)),
        'a'..='z' => Ok((c as u32) - ('a' as u32) + 26),
        '0'..='9' => Ok((c as u32) - ('0' as u32) + 52),
        '-' => Ok(62),
        '_' => Ok(63),
        '=' => Ok(0), // Padding
        _ => Err("Invalid base64 character"),
    }
}

fn random_bytes() -> std::io::Result<[u8; 16]> {
    let mut bytes = [0u8; 16];
    let mut file = File::open("/dev/urandom")?;
    file.read_exact(&mut bytes)?;
    Ok(bytes)
}

////////////////////////////////////////// Identifier types ///////////////////////////////////////

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $error:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; 16]);

        impl $name {
            /// Creates an identifier from raw bytes.
            pub fn new(bytes: [u8; 16]) -> Self {
                $name(bytes)
            }

            /// Generates a fresh identifier from /dev/urandom.
            pub fn random() -> std::io::Result<Self> {
                Ok($name(random_bytes()?))
            }

            pub fn as_bytes(&self) -> &[u8; 16] {
                &self.0
            }

            pub fn into_bytes(self) -> [u8; 16] {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                let encoded = encode_base64_url_safe(&self.0);
                write!(f, "{}:{}", $prefix, encoded)
            }
        }

        impl FromStr for $name {
            type Err = $error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let base64_part = s.strip_prefix(concat!($prefix, ":"))
                    .ok_or($error::InvalidPrefix)?;

                if base64_part.len() != ENCODED_LEN {
                    return Err($error::InvalidFormat);
                }

                let decoded = decode_base64_url_safe(base64_part)
                    .map_err(|_| $error::InvalidBase64)?;

                if decoded.len() != 16 {
                    return Err($error::InvalidLength);
                }

                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(&decoded);
                Ok($name(bytes))
            }
        }

        /// Error returned when parsing an invalid identifier string.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $error {
            InvalidPrefix,
            InvalidFormat,
            InvalidBase64,
            InvalidLength,
        }

        impl Display for $error {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                match self {
                    $error::InvalidPrefix => {
                        write!(f, "Identifier must start with '{}:'", $prefix)
                    }
                    $error::InvalidFormat => write!(f, "Invalid identifier format"),
                    $error::InvalidBase64 => write!(f, "Invalid base64 encoding"),
                    $error::InvalidLength => write!(f, "Identifier must be exactly 16 bytes"),
                }
            }
        }

        impl std::error::Error for $error {}

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_id!(
    /// Identifies a registered user.
    UserId,
    UserIdParseError,
    "user"
);

define_id!(
    /// Identifies a blood request.
    RequestId,
    RequestIdParseError,
    "bloodreq"
);

define_id!(
    /// Identifies a medical facility.
    FacilityId,
    FacilityIdParseError,
    "facility"
);

define_id!(
    /// Identifies a recorded donation.
    DonationId,
    DonationIdParseError,
    "donation"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_new_and_accessors() {
        let bytes = [1u8; 16];
        let id = UserId::new(bytes);
        assert_eq!(id.as_bytes(), &bytes);
        assert_eq!(id.into_bytes(), bytes);
    }

    #[test]
    fn base64_encode_decode_round_trip() {
        let input = b"sixteen byte str";
        let encoded = encode_base64_url_safe(input);
        let decoded = decode_base64_url_safe(&encoded).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn base64_encode_16_bytes() {
        let input = [0u8; 16];
        let encoded = encode_base64_url_safe(&input);
        assert_eq!(encoded.len(), ENCODED_LEN);
        assert_eq!(encoded, "AAAAAAAAAAAAAAAAAAAAAA");
    }

    #[test]
    fn user_id_display_format() {
        let id = UserId::new([0u8; 16]);
        let display = format!("{}", id);
        assert_eq!(display, "user:AAAAAAAAAAAAAAAAAAAAAA");
    }

    #[test]
    fn prefixes_differ_per_type() {
        let bytes = [7u8; 16];
        assert!(RequestId::new(bytes).to_string().starts_with("bloodreq:"));
        assert!(FacilityId::new(bytes).to_string().starts_with("facility:"));
        assert!(DonationId::new(bytes).to_string().starts_with("donation:"));
    }

    #[test]
    fn user_id_from_str_valid() {
        let id = UserId::from_str("user:AAAAAAAAAAAAAAAAAAAAAA").unwrap();
        assert_eq!(id.as_bytes(), &[0u8; 16]);
    }

    #[test]
    fn user_id_from_str_invalid_prefix() {
        let result = UserId::from_str("facility:AAAAAAAAAAAAAAAAAAAAAA");
        assert_eq!(result, Err(UserIdParseError::InvalidPrefix));
    }

    #[test]
    fn user_id_from_str_invalid_length() {
        let result = UserId::from_str("user:ABC");
        assert_eq!(result, Err(UserIdParseError::InvalidFormat));
    }

    #[test]
    fn user_id_from_str_invalid_base64() {
        let result = UserId::from_str("user:AAAAAAAAAAAAAAAAAAAA!A");
        assert_eq!(result, Err(UserIdParseError::InvalidBase64));
    }

    #[test]
    fn round_trip_display_fromstr() {
        let bytes = [
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ];
        let id = RequestId::new(bytes);
        let parsed = RequestId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn multiple_round_trips() {
        for i in 0..=255u8 {
            let mut bytes = [0u8; 16];
            bytes[0] = i;
            bytes[15] = 255 - i;

            let id = DonationId::new(bytes);
            let parsed = DonationId::from_str(&id.to_string()).unwrap();
            assert_eq!(id, parsed);
        }
    }

    #[test]
    fn random_ids_are_distinct() {
        let a = UserId::random().expect("/dev/urandom should be available");
        let b = UserId::random().expect("/dev/urandom should be available");
        assert_ne!(a, b);
    }

    #[test]
    fn serde_round_trip_as_string() {
        let id = FacilityId::new([9u8; 16]);
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.starts_with("\"facility:"));
        let back: FacilityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn display_is_url_safe() {
        let id = UserId::new([0xFF; 16]);
        let display = id.to_string();
        let base64_part = &display[5..];
        for c in base64_part.chars() {
            assert!(c.is_ascii_alphanumeric() || c == '-' || c == '_');
        }
    }
}
