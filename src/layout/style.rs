use serde::{Deserialize, Serialize};

use crate::config::CanvasProfile;
use crate::foundation::color::Color;
use crate::layout::anchor::Anchor;
use crate::layout::text::TextStyle;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogoStyle {
    pub diameter: u32,
    pub anchor: Anchor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLayerStyle {
    pub text: TextStyle,
    pub anchor: Anchor,
    /// Prepended to the layer content ("- " for the author credit).
    #[serde(default)]
    pub prefix: String,
}

impl TextLayerStyle {
    fn new(text: TextStyle, anchor: Anchor) -> Self {
        Self {
            text,
            anchor,
            prefix: String::new(),
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            text: self.text.scaled(factor),
            anchor: self.anchor.scaled(factor),
            prefix: self.prefix,
        }
    }
}

/// Overlay stack geometry authored for the full 1080x1920 canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub logo: LogoStyle,
    pub header: TextLayerStyle,
    pub subtitle: TextLayerStyle,
    pub body: TextLayerStyle,
    /// Stills carry no author credit.
    pub author: Option<TextLayerStyle>,
}

impl LayerStyle {
    pub fn video() -> Self {
        Self {
            logo: LogoStyle {
                diameter: 144,
                anchor: Anchor::absolute(40.0, 80.0),
            },
            header: TextLayerStyle::new(
                TextStyle::new(72.0, Color::WHITE).wrapped(22),
                Anchor::absolute(200.0, 90.0),
            ),
            subtitle: TextLayerStyle::new(
                TextStyle::new(43.0, Color::GRAY).wrapped(34),
                Anchor::absolute(200.0, 162.0),
            ),
            body: TextLayerStyle::new(
                TextStyle::new(90.0, Color::WHITE).wrapped(20).centered(),
                Anchor::center(),
            ),
            author: Some(TextLayerStyle {
                prefix: "- ".to_owned(),
                ..TextLayerStyle::new(
                    TextStyle::new(50.0, Color::GRAY).wrapped(30),
                    Anchor::absolute(100.0, 1750.0),
                )
            }),
        }
    }

    pub fn image() -> Self {
        Self {
            logo: LogoStyle {
                diameter: 96,
                anchor: Anchor::absolute(30.0, 60.0),
            },
            header: TextLayerStyle::new(
                TextStyle::new(54.0, Color::WHITE).wrapped(28),
                Anchor::absolute(150.0, 67.0),
            ),
            subtitle: TextLayerStyle::new(
                TextStyle::new(22.0, Color::GRAY).wrapped(60),
                Anchor::absolute(150.0, 121.0),
            ),
            body: TextLayerStyle::new(
                TextStyle::new(68.0, Color::WHITE).wrapped(24).centered(),
                Anchor::center(),
            ),
            author: None,
        }
    }

    /// Scale sizes and offsets to `profile`; wrap widths are character counts and stay as is.
    pub fn scaled(self, profile: CanvasProfile) -> Self {
        if matches!(profile, CanvasProfile::Full) {
            return self;
        }
        let f = profile.scale();
        Self {
            logo: LogoStyle {
                diameter: ((f64::from(self.logo.diameter) * f).round() as u32).max(1),
                anchor: self.logo.anchor.scaled(f),
            },
            header: self.header.scaled(f),
            subtitle: self.subtitle.scaled(f),
            body: self.body.scaled(f),
            author: self.author.map(|a| a.scaled(f)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/style.rs"]
mod tests;
