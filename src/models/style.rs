use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const STUDIO_PROMPT: &str = "a professional photo of a fashion model wearing this. full body shot in a clean, bright studio with a plain white background. e-commerce, hyperrealistic, high detail.";

pub const STREET_PROMPT: &str = "a candid lifestyle photo of a fashion model wearing this on a beautiful street in Ho Chi Minh City. sunny day, blurred background, looking natural and happy.";

pub const INVALID_STYLE_MESSAGE: &str = "Invalid style. Please choose 'studio' or 'street'.";

/// Photo setting requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Studio,
    Street,
}

impl Style {
    /// Parses the raw `style` parameter; absent and unknown values are rejected alike.
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        raw.ok_or_else(|| ApiError::InvalidArgument(INVALID_STYLE_MESSAGE.to_string()))?
            .parse()
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Style::Studio => STUDIO_PROMPT,
            Style::Street => STREET_PROMPT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Studio => "studio",
            Style::Street => "street",
        }
    }
}

impl FromStr for Style {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "studio" => Ok(Style::Studio),
            "street" => Ok(Style::Street),
            _ => Err(ApiError::InvalidArgument(INVALID_STYLE_MESSAGE.to_string())),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
