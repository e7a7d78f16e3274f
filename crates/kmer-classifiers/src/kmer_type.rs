//! The three k-mer classes and their integer label codes.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// Integer class code as stored in the `type` column of training files.
pub type Label = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KmerType {
    Repeat,
    Trusted,
    Untrusted,
}

impl KmerType {
    /// All label codes in ascending order.
    pub const CODES: [Label; 3] = [0, 1, 2];

    pub fn code(self) -> Label {
        match self {
            KmerType::Repeat => 0,
            KmerType::Trusted => 1,
            KmerType::Untrusted => 2,
        }
    }

    pub fn from_code(code: Label) -> Result<Self, ClassifierError> {
        match code {
            0 => Ok(KmerType::Repeat),
            1 => Ok(KmerType::Trusted),
            2 => Ok(KmerType::Untrusted),
            _ => Err(ClassifierError::InvalidData(format!(
                "Invalid KmerType number: {}",
                code
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KmerType::Repeat => "REPEAT",
            KmerType::Trusted => "TRUSTED",
            KmerType::Untrusted => "UNTRUSTED",
        }
    }
}

impl fmt::Display for KmerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KmerType {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REPEAT" => Ok(KmerType::Repeat),
            "TRUSTED" => Ok(KmerType::Trusted),
            "UNTRUSTED" => Ok(KmerType::Untrusted),
            _ => Err(ClassifierError::InvalidData(format!(
                "{} is not a valid KmerType!",
                s
            ))),
        }
    }
}

impl From<KmerType> for Label {
    fn from(value: KmerType) -> Self {
        value.code()
    }
}

impl TryFrom<Label> for KmerType {
    type Error = ClassifierError;

    fn try_from(value: Label) -> Result<Self, Self::Error> {
        KmerType::from_code(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_label_convention() {
        assert_eq!(KmerType::Repeat.code(), 0);
        assert_eq!(KmerType::Trusted.code(), 1);
        assert_eq!(KmerType::Untrusted.code(), 2);
        for code in KmerType::CODES {
            assert_eq!(KmerType::from_code(code).unwrap().code(), code);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(KmerType::from_code(3).is_err());
        assert!(KmerType::try_from(-1).is_err());
    }

    #[test]
    fn parses_display_names() {
        let parsed: KmerType = "UNTRUSTED".parse().unwrap();
        assert_eq!(parsed, KmerType::Untrusted);
        assert_eq!(KmerType::Repeat.to_string(), "REPEAT");
        assert!("repeat".parse::<KmerType>().is_err());
    }
}
