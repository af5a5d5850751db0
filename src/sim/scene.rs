//! TOML scene descriptions for the headless document.
//!
//! ```toml
//! scroll = [0.0, 120.0]
//!
//! [glyph]
//! width = 10.0
//! height = 20.0
//!
//! [[frames]]
//! rect = [40.0, 300.0, 200.0, 100.0]
//!
//! [[elements]]
//! kind = "text"
//! rect = [0.0, 0.0, 400.0, 40.0]
//! text = "hello world"
//!
//! [[elements]]
//! kind = "field"
//! frame = 0
//! rect = [0.0, 0.0, 150.0, 20.0]
//! text = "inside the frame"
//! direction = "rtl"
//! ```

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::dom::{ElementKind, TextDirection, UserSelect, WindowId};
use crate::model::geometry::{Point, Rect};

use super::document::{GlyphMetrics, SimDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    Text,
    Field,
    Button,
    Embed,
    Image,
    Media,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneDirection {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneGlyph {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneFrame {
    pub rect: [f64; 4],
    #[serde(default)]
    pub scroll: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneElement {
    pub kind: SceneKind,
    pub rect: [f64; 4],
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub direction: SceneDirection,
    #[serde(default)]
    pub unselectable: bool,
    /// Index into `frames`; absent for the top-level window.
    #[serde(default)]
    pub frame: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub scroll: [f64; 2],
    pub glyph: Option<SceneGlyph>,
    pub frames: Vec<SceneFrame>,
    pub elements: Vec<SceneElement>,
}

fn rect(r: [f64; 4]) -> Rect {
    Rect::new(r[0], r[1], r[2], r[3])
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("parsing scene {}", path.display()))
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn build(&self) -> Result<SimDocument> {
        let mut doc = SimDocument::new();
        if let Some(glyph) = &self.glyph {
            doc = doc.with_glyph(GlyphMetrics {
                width: glyph.width,
                height: glyph.height,
            });
        }

        let top = doc.top();
        doc.set_scroll(top, Point::new(self.scroll[0], self.scroll[1]));

        let frames: Vec<WindowId> = self
            .frames
            .iter()
            .map(|frame| {
                let (_, window) = doc.add_frame(top, rect(frame.rect));
                doc.set_scroll(window, Point::new(frame.scroll[0], frame.scroll[1]));
                window
            })
            .collect();

        for (idx, entry) in self.elements.iter().enumerate() {
            let window = match entry.frame {
                Some(frame) => match frames.get(frame) {
                    Some(window) => *window,
                    None => bail!("element {idx} refers to missing frame {frame}"),
                },
                None => top,
            };

            let bounds = rect(entry.rect);
            let element = match entry.kind {
                SceneKind::Text => doc.add_text(window, bounds, &entry.text),
                SceneKind::Field => doc.add_field(window, bounds, &entry.text),
                SceneKind::Button => doc.add_element(window, ElementKind::Button, bounds),
                SceneKind::Embed => doc.add_element(window, ElementKind::Embed, bounds),
                SceneKind::Image => doc.add_element(window, ElementKind::Image, bounds),
                SceneKind::Media => doc.add_element(window, ElementKind::Media, bounds),
            };

            if entry.direction == SceneDirection::Rtl {
                doc.set_direction(element, TextDirection::Rtl);
            }
            if entry.unselectable {
                doc.set_user_select(element, UserSelect::None);
            }
        }

        Ok(doc)
    }
}
