use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// UI color scheme stored on the user's profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            _ => Err(AppError::InvalidInput("Invalid theme preference".to_string())),
        }
    }
}

/// Body of `PUT /api/user/theme`. The value is kept loose so that a wrong
/// type is reported as an invalid preference rather than a malformed body.
#[derive(Debug, Deserialize)]
pub struct ThemeUpdateRequest {
    #[serde(default)]
    pub theme: Option<serde_json::Value>,
}

impl ThemeUpdateRequest {
    pub fn preference(&self) -> Result<ThemePreference, AppError> {
        self.theme
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::InvalidInput("Invalid theme preference".to_string()))?
            .parse()
    }
}
