//! Widget configuration.
//!
//! Every limit and threshold the widgets use lives here and is handed to
//! each component at construction. Two named profiles mirror the two page
//! variants the store has shipped: [`Profile::Simple`] (any image URL, no
//! gallery cap, six character passwords) and [`Profile::Strict`].

use core::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Image extensions accepted by the strict gallery.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Symbols that satisfy the strict password policy.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

/// A named configuration bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    Simple,
    #[default]
    Strict,
}

impl Profile {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`Profile`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown profile {0:?} (expected \"simple\" or \"strict\")")]
pub struct ParseProfileError(String);

impl FromStr for Profile {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "strict" => Ok(Self::Strict),
            _ => Err(ParseProfileError(s.to_owned())),
        }
    }
}

/// Full widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub gallery: GalleryConfig,
    pub validation: ValidationConfig,
    pub notices: NoticeConfig,
}

impl StoreConfig {
    /// Configuration for a named profile.
    #[must_use]
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Simple => Self::simple(),
            Profile::Strict => Self::strict(),
        }
    }

    #[must_use]
    pub fn simple() -> Self {
        Self {
            gallery: GalleryConfig::simple(),
            validation: ValidationConfig::simple(),
            notices: NoticeConfig::default(),
        }
    }

    #[must_use]
    pub fn strict() -> Self {
        Self {
            gallery: GalleryConfig::strict(),
            validation: ValidationConfig::strict(),
            notices: NoticeConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::for_profile(Profile::default())
    }
}

/// Gallery limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Maximum number of images, `None` for unbounded.
    pub max_images: Option<usize>,
    /// Accepted path extensions (lowercase, with the dot), `None` to accept
    /// any non-blank URL.
    pub allowed_extensions: Option<Vec<String>>,
}

impl GalleryConfig {
    #[must_use]
    pub const fn simple() -> Self {
        Self {
            max_images: None,
            allowed_extensions: None,
        }
    }

    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_images: Some(12),
            allowed_extensions: Some(IMAGE_EXTENSIONS.iter().map(|ext| (*ext).to_owned()).collect()),
        }
    }
}

/// Password policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    /// Minimum length only.
    Length { min_length: usize },
    /// Minimum length plus at least one digit and one of [`PASSWORD_SYMBOLS`].
    Strong { min_length: usize },
}

impl PasswordPolicy {
    #[must_use]
    pub const fn min_length(self) -> usize {
        match self {
            Self::Length { min_length } | Self::Strong { min_length } => min_length,
        }
    }
}

/// Registration form thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    pub min_name_length: usize,
    pub min_age: u32,
    pub password: PasswordPolicy,
}

impl ValidationConfig {
    #[must_use]
    pub const fn simple() -> Self {
        Self {
            min_name_length: 3,
            min_age: 18,
            password: PasswordPolicy::Length { min_length: 6 },
        }
    }

    #[must_use]
    pub const fn strict() -> Self {
        Self {
            min_name_length: 3,
            min_age: 18,
            password: PasswordPolicy::Strong { min_length: 8 },
        }
    }
}

/// Notification banner behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeConfig {
    /// How long a banner stays up before it dismisses itself.
    pub dismiss_after: Duration,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            dismiss_after: Duration::from_secs(3),
        }
    }
}
