//! Host theme kind and the query used by the controller.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Host color theme kind, carried on the wire as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ThemeKind {
    #[default]
    Light,
    Dark,
    HighContrast,
    HighContrastLight,
}

impl ThemeKind {
    pub fn code(self) -> u8 {
        match self {
            ThemeKind::Light => 1,
            ThemeKind::Dark => 2,
            ThemeKind::HighContrast => 3,
            ThemeKind::HighContrastLight => 4,
        }
    }

    /// Only the plain dark theme switches the surface to its dark style.
    pub fn is_dark(self) -> bool {
        self == ThemeKind::Dark
    }
}

/// Unknown codes fall back to light.
impl From<u8> for ThemeKind {
    fn from(code: u8) -> Self {
        match code {
            2 => ThemeKind::Dark,
            3 => ThemeKind::HighContrast,
            4 => ThemeKind::HighContrastLight,
            _ => ThemeKind::Light,
        }
    }
}

impl From<ThemeKind> for u8 {
    fn from(kind: ThemeKind) -> Self {
        kind.code()
    }
}

impl std::str::FromStr for ThemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" | "1" => Ok(ThemeKind::Light),
            "dark" | "2" => Ok(ThemeKind::Dark),
            "high-contrast" | "3" => Ok(ThemeKind::HighContrast),
            "high-contrast-light" | "4" => Ok(ThemeKind::HighContrastLight),
            _ => Err(format!("Invalid theme: {}", s)),
        }
    }
}

/// Query for the host's current theme.
pub trait ThemeSource {
    fn current_theme(&self) -> ThemeKind;
}

impl ThemeSource for ThemeKind {
    fn current_theme(&self) -> ThemeKind {
        *self
    }
}

/// Theme cell shared between the panel manager (writer) and a live controller (reader).
#[derive(Debug, Clone, Default)]
pub struct SharedTheme(Arc<RwLock<ThemeKind>>);

impl SharedTheme {
    pub fn new(kind: ThemeKind) -> Self {
        Self(Arc::new(RwLock::new(kind)))
    }

    pub fn set(&self, kind: ThemeKind) {
        match self.0.write() {
            Ok(mut guard) => *guard = kind,
            Err(poisoned) => *poisoned.into_inner() = kind,
        }
    }
}

impl ThemeSource for SharedTheme {
    fn current_theme(&self) -> ThemeKind {
        match self.0.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
