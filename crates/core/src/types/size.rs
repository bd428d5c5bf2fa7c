//! Garment sizes offered in the catalog.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Garment size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Size {
    S,
    #[default]
    M,
    L,
    XL,
}

impl Size {
    /// Every size, smallest first.
    pub const ALL: [Self; 4] = [Self::S, Self::M, Self::L, Self::XL];

    /// Label shown on the product card.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::XL => "XL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a string names no known [`Size`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown size: {0}")]
pub struct ParseSizeError(String);

impl std::str::FromStr for Size {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSizeError(s.to_owned()))
    }
}
