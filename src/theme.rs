use crate::storage::Storage;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

pub const THEME_SLOT: &str = "filmflux_theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colors the views draw with.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub rating: Color,
    pub saved: Color,
    pub error: Color,
}

impl Theme {
    /// Saved theme, or the default when nothing usable is stored.
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.read(THEME_SLOT) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring unreadable theme setting");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read theme setting");
                Theme::default()
            }
        }
    }

    pub fn save(self, storage: &dyn Storage) -> Result<(), crate::storage::StorageError> {
        storage.write(THEME_SLOT, &serde_json::to_string(&self)?)
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Dark => Palette {
                accent: Color::Cyan,
                text: Color::White,
                muted: Color::DarkGray,
                border: Color::DarkGray,
                highlight_fg: Color::White,
                highlight_bg: Color::DarkGray,
                rating: Color::Yellow,
                saved: Color::Green,
                error: Color::Red,
            },
            Self::Light => Palette {
                accent: Color::Blue,
                text: Color::Black,
                muted: Color::Gray,
                border: Color::Gray,
                highlight_fg: Color::Black,
                highlight_bg: Color::LightBlue,
                rating: Color::Rgb(181, 137, 0),
                saved: Color::Rgb(0, 135, 0),
                error: Color::Red,
            },
        }
    }
}
