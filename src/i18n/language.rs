use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::GuichetError;

/// Interface languages offered by the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French, the default
    Fr,
    /// Arabic
    Ar,
    /// Tamazight, written in Tifinagh
    Am,
    /// English
    En,
}

impl Default for Language {
    fn default() -> Self {
        Self::Fr
    }
}

impl Language {
    pub const ALL: [Language; 4] = [Self::Fr, Self::Ar, Self::Am, Self::En];

    /// Parse a language code, rejecting anything outside the fixed set
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "fr" => Some(Self::Fr),
            "ar" => Some(Self::Ar),
            "am" => Some(Self::Am),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Wire code sent to the server
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::Ar => "ar",
            Self::Am => "am",
            Self::En => "en",
        }
    }

    /// Name of the language in its own script
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::Fr => "Français",
            Self::Ar => "العربية",
            Self::Am => "ⵜⴰⵎⴰⵣⵉⵖⵜ",
            Self::En => "English",
        }
    }

    /// Whether the presentation layer should mirror its layout
    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::Ar | Self::Am)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = GuichetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| GuichetError::InvalidLanguage(s.to_string()))
    }
}
