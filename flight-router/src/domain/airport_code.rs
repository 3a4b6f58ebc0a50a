//! Airport code types.

use std::fmt;

/// Error returned when parsing an invalid airport code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid airport code {input:?}: {reason}")]
pub struct InvalidAirportCode {
    input: String,
    reason: &'static str,
}

/// A valid 3-letter IATA-style airport code.
///
/// Codes are case-insensitive on input and always stored upper-case, so
/// `"del"`, `"Del"` and `"DEL"` all name the same graph node.
///
/// # Examples
///
/// ```
/// use flight_router::domain::AirportCode;
///
/// let del = AirportCode::parse("DEL").unwrap();
/// assert_eq!(del.as_str(), "DEL");
///
/// // Lowercase is normalized
/// assert_eq!(AirportCode::parse("del").unwrap(), del);
///
/// // Wrong length is rejected
/// assert!(AirportCode::parse("DE").is_err());
/// assert!(AirportCode::parse("DELH").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AirportCode([u8; 3]);

impl AirportCode {
    /// Parse an airport code, normalizing to upper-case.
    ///
    /// Surrounding whitespace is ignored. The remaining input must be exactly
    /// 3 ASCII letters.
    pub fn parse(s: &str) -> Result<Self, InvalidAirportCode> {
        let trimmed = s.trim();
        let bytes = trimmed.as_bytes();

        if bytes.len() != 3 {
            return Err(InvalidAirportCode {
                input: s.to_string(),
                reason: "must be exactly 3 characters",
            });
        }

        let mut code = [0u8; 3];
        for (slot, &b) in code.iter_mut().zip(bytes) {
            if !b.is_ascii_alphabetic() {
                return Err(InvalidAirportCode {
                    input: s.to_string(),
                    reason: "must be ASCII letters A-Z",
                });
            }
            *slot = b.to_ascii_uppercase();
        }

        Ok(AirportCode(code))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored
        std::str::from_utf8(&self.0).expect("airport code bytes are ASCII")
    }
}

impl fmt::Debug for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AirportCode({})", self.as_str())
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(AirportCode::parse("DEL").is_ok());
        assert!(AirportCode::parse("BOM").is_ok());
        assert!(AirportCode::parse("AAA").is_ok());
        assert!(AirportCode::parse("ZZZ").is_ok());
    }

    #[test]
    fn lowercase_is_normalized() {
        let upper = AirportCode::parse("BLR").unwrap();
        assert_eq!(AirportCode::parse("blr").unwrap(), upper);
        assert_eq!(AirportCode::parse("Blr").unwrap(), upper);
        assert_eq!(AirportCode::parse(" blr ").unwrap(), upper);
    }

    #[test]
    fn reject_wrong_length() {
        assert!(AirportCode::parse("").is_err());
        assert!(AirportCode::parse("D").is_err());
        assert!(AirportCode::parse("DE").is_err());
        assert!(AirportCode::parse("DELH").is_err());
    }

    #[test]
    fn reject_non_letters() {
        assert!(AirportCode::parse("D1L").is_err());
        assert!(AirportCode::parse("D-L").is_err());
        assert!(AirportCode::parse("D L").is_err());
        assert!(AirportCode::parse("DÖL").is_err());
    }

    #[test]
    fn error_mentions_input() {
        let err = AirportCode::parse("XY").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid airport code \"XY\": must be exactly 3 characters"
        );
    }

    #[test]
    fn display_and_debug() {
        let code = AirportCode::parse("maa").unwrap();
        assert_eq!(format!("{}", code), "MAA");
        assert_eq!(format!("{:?}", code), "AirportCode(MAA)");
    }

    #[test]
    fn ordering_is_alphabetical() {
        let mut codes = vec![
            AirportCode::parse("DEL").unwrap(),
            AirportCode::parse("BLR").unwrap(),
            AirportCode::parse("BOM").unwrap(),
        ];
        codes.sort();
        let names: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["BLR", "BOM", "DEL"]);
    }
}
