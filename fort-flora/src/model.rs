//! Records shared by the gateway, the seed dataset and the pages.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A fort row (`forts` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fort {
    pub id: i64,
    pub name: String,
    pub district: String,
    /// Metres above sea level; 0 for sea forts.
    #[serde(default)]
    pub height: i32,
    #[serde(default)]
    pub best_time: String,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Fort {
    pub fn is_sea_fort(&self) -> bool {
        self.height <= 0
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// A plant row (`flora` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flora {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub scientific_name: String,
    #[serde(default)]
    pub fort_id: Option<i64>,
    #[serde(default)]
    pub medicinal_use: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

/// A saved fort (`bookmarks` collection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(default)]
    pub id: Option<i64>,
    pub user_id: String,
    pub fort_id: i64,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Insert/update payload for a fort.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewFort {
    pub name: String,
    pub district: String,
    pub height: i32,
    pub best_time: String,
    pub history: String,
    pub image_url: String,
}

impl NewFort {
    pub const DEFAULT_IMAGE: &'static str =
        "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=600&q=80";

    /// The row this payload would become under `id`.
    pub fn with_id(&self, id: i64) -> Fort {
        Fort {
            id,
            name: self.name.clone(),
            district: self.district.clone(),
            height: self.height,
            best_time: self.best_time.clone(),
            history: self.history.clone(),
            image_url: self.image_url.clone(),
            latitude: None,
            longitude: None,
        }
    }
}

impl From<&Fort> for NewFort {
    fn from(fort: &Fort) -> Self {
        Self {
            name: fort.name.clone(),
            district: fort.district.clone(),
            height: fort.height,
            best_time: fort.best_time.clone(),
            history: fort.history.clone(),
            image_url: fort.image_url.clone(),
        }
    }
}

/// Insert/update payload for a plant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewFlora {
    pub name: String,
    pub scientific_name: String,
    pub fort_id: Option<i64>,
    pub medicinal_use: String,
    pub description: String,
    pub image_url: String,
}

impl NewFlora {
    pub const DEFAULT_IMAGE: &'static str =
        "https://images.unsplash.com/photo-1502082553048-f009c37129b9?w=600&q=80";

    pub fn with_id(&self, id: i64) -> Flora {
        Flora {
            id,
            name: self.name.clone(),
            scientific_name: self.scientific_name.clone(),
            fort_id: self.fort_id,
            medicinal_use: self.medicinal_use.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

impl From<&Flora> for NewFlora {
    fn from(plant: &Flora) -> Self {
        Self {
            name: plant.name.clone(),
            scientific_name: plant.scientific_name.clone(),
            fort_id: plant.fort_id,
            medicinal_use: plant.medicinal_use.clone(),
            description: plant.description.clone(),
            image_url: plant.image_url.clone(),
        }
    }
}

/// Color theme, persisted between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colors a page draws with.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub background: Color,
    pub highlight: Color,
    pub success: Color,
    pub error: Color,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Unknown values fall back to dark.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                accent: Color::Rgb(232, 168, 56),
                text: Color::Rgb(230, 236, 232),
                muted: Color::Rgb(155, 181, 168),
                background: Color::Rgb(15, 26, 21),
                highlight: Color::Rgb(76, 175, 120),
                success: Color::Green,
                error: Color::LightRed,
            },
            Theme::Light => Palette {
                accent: Color::Rgb(176, 104, 16),
                text: Color::Rgb(28, 36, 32),
                muted: Color::Rgb(90, 110, 100),
                background: Color::Rgb(246, 243, 236),
                highlight: Color::Rgb(46, 125, 80),
                success: Color::Rgb(30, 120, 60),
                error: Color::Red,
            },
        }
    }
}
