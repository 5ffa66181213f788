//! Enumerated settings shared by the renderer and the reconciler.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for setting values parsed from strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Unknown theme name.
    #[error("invalid theme: {value} (expected \"classic\" or \"dark\")")]
    InvalidTheme { value: String },

    /// Unknown merge strategy name.
    #[error("invalid merge strategy: {value} (expected \"positional\" or \"keyed\")")]
    InvalidMergeStrategy { value: String },
}

/// Google Calendar event colors, keyed by the API's `colorId`.
///
/// Missing or unknown ids fall back to [`EventColor::Lavender`], the calendar's
/// own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventColor {
    #[default]
    Lavender,
    Sage,
    Grape,
    Flamingo,
    Banana,
    Tangerine,
    Peacock,
    Graphite,
    Blueberry,
    Basil,
    Tomato,
}

impl EventColor {
    /// Every color, in `colorId` order.
    pub const ALL: [Self; 11] = [
        Self::Lavender,
        Self::Sage,
        Self::Grape,
        Self::Flamingo,
        Self::Banana,
        Self::Tangerine,
        Self::Peacock,
        Self::Graphite,
        Self::Blueberry,
        Self::Basil,
        Self::Tomato,
    ];

    /// Looks up a color by its API id (`"1"` through `"11"`).
    pub fn from_id(id: &str) -> Option<Self> {
        let index: usize = id.trim().parse().ok()?;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Resolves an optional color id, falling back to the default color.
    pub fn from_id_or_default(id: Option<&str>) -> Self {
        id.and_then(Self::from_id).unwrap_or_default()
    }

    /// The API id for this color.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Lavender => "1",
            Self::Sage => "2",
            Self::Grape => "3",
            Self::Flamingo => "4",
            Self::Banana => "5",
            Self::Tangerine => "6",
            Self::Peacock => "7",
            Self::Graphite => "8",
            Self::Blueberry => "9",
            Self::Basil => "10",
            Self::Tomato => "11",
        }
    }

    /// Human-readable color name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lavender => "lavender",
            Self::Sage => "sage",
            Self::Grape => "grape",
            Self::Flamingo => "flamingo",
            Self::Banana => "banana",
            Self::Tangerine => "tangerine",
            Self::Peacock => "peacock",
            Self::Graphite => "graphite",
            Self::Blueberry => "blueberry",
            Self::Basil => "basil",
            Self::Tomato => "tomato",
        }
    }
}

impl fmt::Display for EventColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Swatch palette used when rendering event lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// The calendar's original light palette.
    Classic,
    /// Darker palette that reads well on dark note themes.
    #[default]
    Dark,
}

impl Theme {
    /// String representation used in config files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Dark => "dark",
        }
    }

    /// Hex color for an event color under this theme.
    #[must_use]
    pub const fn hex(self, color: EventColor) -> &'static str {
        match self {
            Self::Classic => match color {
                EventColor::Lavender => "#a4bdfc",
                EventColor::Sage => "#7ae7bf",
                EventColor::Grape => "#dbadff",
                EventColor::Flamingo => "#ff887c",
                EventColor::Banana => "#fbd75b",
                EventColor::Tangerine => "#ffb878",
                EventColor::Peacock => "#46d6db",
                EventColor::Graphite => "#e1e1e1",
                EventColor::Blueberry => "#5484ed",
                EventColor::Basil => "#51b749",
                EventColor::Tomato => "#dc2127",
            },
            Self::Dark => match color {
                EventColor::Lavender => "#828bc2",
                EventColor::Sage => "#33b679",
                EventColor::Grape => "#9e69af",
                EventColor::Flamingo => "#e67c73",
                EventColor::Banana => "#f6bf26",
                EventColor::Tangerine => "#f4511e",
                EventColor::Peacock => "#039be5",
                EventColor::Graphite => "#616161",
                EventColor::Blueberry => "#3f51b5",
                EventColor::Basil => "#0b8043",
                EventColor::Tomato => "#d50000",
            },
        }
    }

    /// Hex color for the synthetic "Wake Up" and "Sleep" markers.
    #[must_use]
    pub const fn boundary_hex(self) -> &'static str {
        match self {
            Self::Classic => "#e1e1e1",
            Self::Dark => "#7c7c7c",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classic" => Ok(Self::Classic),
            "dark" => Ok(Self::Dark),
            _ => Err(ValidationError::InvalidTheme {
                value: s.to_string(),
            }),
        }
    }
}

/// How freshly rendered lines are merged into an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Replace event lines slot by slot, deleting or inserting to match the new count.
    #[default]
    Positional,
    /// Replace event lines whose time and title match; leave the rest alone.
    Keyed,
}

impl MergeStrategy {
    /// String representation used in config files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positional => "positional",
            Self::Keyed => "keyed",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MergeStrategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positional" => Ok(Self::Positional),
            "keyed" => Ok(Self::Keyed),
            _ => Err(ValidationError::InvalidMergeStrategy {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_ids_map_in_order() {
        for (index, color) in EventColor::ALL.iter().enumerate() {
            let id = (index + 1).to_string();
            assert_eq!(color.id(), id);
            assert_eq!(EventColor::from_id(&id), Some(*color));
        }
    }

    #[test]
    fn unknown_color_ids_fall_back_to_lavender() {
        assert_eq!(EventColor::from_id("0"), None);
        assert_eq!(EventColor::from_id("12"), None);
        assert_eq!(EventColor::from_id("blue"), None);
        assert_eq!(
            EventColor::from_id_or_default(Some("12")),
            EventColor::Lavender
        );
        assert_eq!(EventColor::from_id_or_default(None), EventColor::Lavender);
        assert_eq!(
            EventColor::from_id_or_default(Some("11")),
            EventColor::Tomato
        );
    }

    #[test]
    fn themes_differ_for_every_color() {
        for color in EventColor::ALL {
            assert_ne!(Theme::Classic.hex(color), Theme::Dark.hex(color));
        }
    }

    #[test]
    fn theme_parses_and_displays() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("classic".parse::<Theme>().unwrap(), Theme::Classic);
        assert_eq!(Theme::Dark.to_string(), "dark");
        let err = "neon".parse::<Theme>().unwrap_err();
        assert!(err.to_string().contains("invalid theme: neon"));
    }

    #[test]
    fn merge_strategy_parses_and_serializes() {
        assert_eq!(
            "keyed".parse::<MergeStrategy>().unwrap(),
            MergeStrategy::Keyed
        );
        assert!("merge".parse::<MergeStrategy>().is_err());
        let json = serde_json::to_string(&MergeStrategy::Positional).unwrap();
        assert_eq!(json, r#""positional""#);
        let parsed: MergeStrategy = serde_json::from_str(r#""keyed""#).unwrap();
        assert_eq!(parsed, MergeStrategy::Keyed);
    }
}
