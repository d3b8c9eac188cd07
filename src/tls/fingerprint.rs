//! Browser fingerprint catalog.
//!
//! Each variant names a ClientHello profile the fabricator can reproduce:
//! the exact cipher-suite order, extension set and extension order that
//! browser puts on the wire. Selection happens here; the profile contents
//! live with the fabricator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A supported browser ClientHello profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
    Safari,
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Browser::Chrome => write!(f, "chrome"),
            Browser::Firefox => write!(f, "firefox"),
            Browser::Safari => write!(f, "safari"),
        }
    }
}

impl FromStr for Browser {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            "safari" => Ok(Browser::Safari),
            other => Err(Error::config(format!("unknown browser profile: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Chrome".parse::<Browser>().unwrap(), Browser::Chrome);
        assert_eq!("FIREFOX".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("safari".parse::<Browser>().unwrap(), Browser::Safari);
        assert!("edge".parse::<Browser>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for b in [Browser::Chrome, Browser::Firefox, Browser::Safari] {
            assert_eq!(b.to_string().parse::<Browser>().unwrap(), b);
        }
    }
}
