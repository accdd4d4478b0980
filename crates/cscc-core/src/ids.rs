use core::fmt;
use core::str::FromStr;

use crate::CoreError;

/// Reserved code of the world-total row.
pub const WORLD_CODE: CountryCode = CountryCode(*b"WLD");

/// ISO3 country code (or a reserved aggregate code such as `WLD`).
///
/// - stored inline as three uppercase ASCII letters, so it is `Copy`
/// - ordering is lexicographic on the letters
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode([u8; 3]);

impl CountryCode {
    /// Parse a code, trimming whitespace and upper-casing ASCII letters.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let trimmed = value.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(CoreError::InvalidCountryCode {
                value: value.to_string(),
            });
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        // Constructed only from ASCII letters.
        core::str::from_utf8(&self.0).unwrap_or("???")
    }

    pub fn is_world(&self) -> bool {
        *self == WORLD_CODE
    }
}

impl FromStr for CountryCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountryCode({})", self.as_str())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CountryCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CountryCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CountryCode::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let code = CountryCode::parse(" usa ").unwrap();
        assert_eq!(code.as_str(), "USA");
        assert_eq!(code.to_string(), "USA");
    }

    #[test]
    fn parse_rejects_wrong_length_and_digits() {
        assert!(CountryCode::parse("US").is_err());
        assert!(CountryCode::parse("USAA").is_err());
        assert!(CountryCode::parse("U5A").is_err());
        assert!(CountryCode::parse("").is_err());
    }

    #[test]
    fn world_code_is_reserved() {
        assert!(CountryCode::parse("wld").unwrap().is_world());
        assert!(!CountryCode::parse("USA").unwrap().is_world());
    }

    #[test]
    fn code_is_small() {
        assert_eq!(core::mem::size_of::<CountryCode>(), 3);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn parse_display_roundtrip(raw in "[A-Za-z]{3}", pad in " {0,2}") {
            let code = CountryCode::parse(&format!("{pad}{raw}{pad}")).unwrap();
            prop_assert_eq!(code.as_str(), raw.to_ascii_uppercase());
            prop_assert_eq!(CountryCode::parse(&code.to_string()).unwrap(), code);
        }

        #[test]
        fn non_letters_are_rejected(raw in "[A-Z]{0,2}[0-9_ .-][A-Z]{0,2}") {
            prop_assert!(CountryCode::parse(&raw).is_err());
        }
    }
}
