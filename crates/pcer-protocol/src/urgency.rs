//! Urgency classification carried per packet.
//!
//! Wire form is a single unsigned byte: `0` Critical, `1` Standard,
//! `2` Bulk. Decoding never fails; anything unrecognized, including a
//! missing tag, is treated as Standard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PcerError;
use crate::types::DEFAULT_URGENCY_TAG;

/// Urgency class of a packet. Categorical, not ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum UrgencyClass {
    /// Low latency: delay dominates, energy ignored.
    Critical,
    /// Balanced delay and energy.
    #[default]
    Standard,
    /// Energy efficient: energy dominates, delay ignored.
    Bulk,
}

impl UrgencyClass {
    pub const ALL: [UrgencyClass; 3] = [
        UrgencyClass::Critical,
        UrgencyClass::Standard,
        UrgencyClass::Bulk,
    ];

    /// Decode a tag byte. Unknown values normalize to `Standard`.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => UrgencyClass::Critical,
            2 => UrgencyClass::Bulk,
            _ => UrgencyClass::Standard,
        }
    }

    /// Decode an optional tag; a packet without one is `Standard`.
    pub fn from_tag_opt(tag: Option<u8>) -> Self {
        Self::from_tag(tag.unwrap_or(DEFAULT_URGENCY_TAG))
    }

    /// Encode as the wire tag byte.
    pub fn tag(self) -> u8 {
        match self {
            UrgencyClass::Critical => 0,
            UrgencyClass::Standard => 1,
            UrgencyClass::Bulk => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UrgencyClass::Critical => "Critical",
            UrgencyClass::Standard => "Standard",
            UrgencyClass::Bulk => "Bulk",
        }
    }
}

impl From<u8> for UrgencyClass {
    fn from(tag: u8) -> Self {
        Self::from_tag(tag)
    }
}

impl From<UrgencyClass> for u8 {
    fn from(class: UrgencyClass) -> Self {
        class.tag()
    }
}

impl fmt::Display for UrgencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a class name (case-insensitive) or a tag number.
///
/// Unlike wire decoding this is strict: operator input that matches
/// nothing is reported rather than silently becoming Standard.
impl FromStr for UrgencyClass {
    type Err = PcerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(tag) = s.parse::<u8>() {
            return Ok(Self::from_tag(tag));
        }
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(UrgencyClass::Critical),
            "standard" => Ok(UrgencyClass::Standard),
            "bulk" => Ok(UrgencyClass::Bulk),
            _ => Err(PcerError::UnknownUrgency(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_decode() {
        assert_eq!(UrgencyClass::from_tag(0), UrgencyClass::Critical);
        assert_eq!(UrgencyClass::from_tag(1), UrgencyClass::Standard);
        assert_eq!(UrgencyClass::from_tag(2), UrgencyClass::Bulk);
    }

    #[test]
    fn unknown_tags_normalize_to_standard() {
        for tag in [3u8, 7, 128, 255] {
            assert_eq!(UrgencyClass::from_tag(tag), UrgencyClass::Standard);
        }
    }

    #[test]
    fn missing_tag_is_standard() {
        assert_eq!(UrgencyClass::from_tag_opt(None), UrgencyClass::Standard);
        assert_eq!(UrgencyClass::default(), UrgencyClass::Standard);
        assert_eq!(
            UrgencyClass::from_tag_opt(Some(0)),
            UrgencyClass::Critical
        );
    }

    #[test]
    fn encode_is_inverse_of_decode() {
        for class in UrgencyClass::ALL {
            assert_eq!(UrgencyClass::from_tag(class.tag()), class);
        }
    }

    #[test]
    fn msgpack_tag_is_single_byte() {
        let bytes = rmp_serde::to_vec(&UrgencyClass::Bulk).unwrap();
        assert_eq!(bytes, vec![2]);
        let decoded: UrgencyClass = rmp_serde::from_slice(&[9]).unwrap();
        assert_eq!(decoded, UrgencyClass::Standard);
    }

    #[test]
    fn parse_names_and_digits() {
        assert_eq!("critical".parse::<UrgencyClass>().unwrap(), UrgencyClass::Critical);
        assert_eq!("BULK".parse::<UrgencyClass>().unwrap(), UrgencyClass::Bulk);
        assert_eq!("0".parse::<UrgencyClass>().unwrap(), UrgencyClass::Critical);
        assert!(matches!(
            "urgent".parse::<UrgencyClass>(),
            Err(PcerError::UnknownUrgency(_))
        ));
    }

    #[test]
    fn display_uses_names() {
        assert_eq!(UrgencyClass::Critical.to_string(), "Critical");
        assert_eq!(UrgencyClass::Bulk.to_string(), "Bulk");
    }
}
