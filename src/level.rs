//! Syslog severities carried by GELF messages.
//!
//! The numeric value doubles as the delivery priority: lower values are more
//! severe and leave the outbound buffer first.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum GelfLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    #[default]
    Informational = 6,
    Debug = 7,
}

impl GelfLevel {
    /// Numeric syslog severity.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Map a numeric severity back to a level, if in range.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Informational),
            7 => Some(Self::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for GelfLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GelfLevel::Emergency => "EMERGENCY",
            GelfLevel::Alert => "ALERT",
            GelfLevel::Critical => "CRITICAL",
            GelfLevel::Error => "ERROR",
            GelfLevel::Warning => "WARNING",
            GelfLevel::Notice => "NOTICE",
            GelfLevel::Informational => "INFO",
            GelfLevel::Debug => "DEBUG",
        };
        f.write_str(s)
    }
}

impl FromStr for GelfLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EMERG" | "EMERGENCY" => Ok(Self::Emergency),
            "ALERT" => Ok(Self::Alert),
            "CRIT" | "CRITICAL" => Ok(Self::Critical),
            "ERR" | "ERROR" => Ok(Self::Error),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "NOTICE" => Ok(Self::Notice),
            "INFO" | "INFORMATIONAL" => Ok(Self::Informational),
            "DEBUG" | "TRACE" => Ok(Self::Debug),
            other => other.parse::<u8>().ok().and_then(Self::from_u8).ok_or(()),
        }
    }
}

impl Serialize for GelfLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("warn", GelfLevel::Warning)]
    #[case("ERROR", GelfLevel::Error)]
    #[case("info", GelfLevel::Informational)]
    #[case("trace", GelfLevel::Debug)]
    #[case("0", GelfLevel::Emergency)]
    fn parses_names_and_numbers(#[case] input: &str, #[case] expected: GelfLevel) {
        assert_eq!(input.parse::<GelfLevel>(), Ok(expected));
    }

    #[rstest]
    fn rejects_out_of_range_numbers() {
        assert!("8".parse::<GelfLevel>().is_err());
        assert!("bogus".parse::<GelfLevel>().is_err());
    }

    #[rstest]
    fn more_severe_levels_sort_first() {
        assert!(GelfLevel::Alert < GelfLevel::Debug);
        assert_eq!(serde_json::to_string(&GelfLevel::Error).expect("serialise"), "3");
    }
}
