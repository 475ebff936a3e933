use std::{collections::BTreeSet, path::Path};

use anyhow::Context;

use crate::{
    foundation::error::StarcardResult,
    theme::controller::ThemeName,
};

/// The static content document, as authored. Every field is optional so a
/// partial document still builds whatever it can.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(default)]
    pub site: Site,
    #[serde(default)]
    pub beats: Vec<BeatRecord>,
    #[serde(default)]
    pub ending: Ending,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub music: Option<Music>,
    #[serde(default)]
    pub stickers: Option<Stickers>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Music {
    #[serde(default)]
    pub src: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stickers {
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub ordinal: Option<usize>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub sticker_left: Option<String>,
    #[serde(default)]
    pub sticker_right: Option<String>,
    #[serde(default)]
    pub time_label: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub lottie_animation: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ending {
    #[serde(default)]
    pub message: Option<String>,
}

/// Secondary per-card animation, rendered procedurally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecondaryEffect {
    Sparkle,
    Snowflake,
    HeartBeat,
}

impl SecondaryEffect {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "sparkle" => Some(Self::Sparkle),
            "snowflake" => Some(Self::Snowflake),
            "heart-beat" => Some(Self::HeartBeat),
            _ => None,
        }
    }
}

/// One validated timeline entry. Immutable once built.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Beat {
    pub id: String,
    pub ordinal: usize,
    pub photo: Option<String>,
    pub sticker_left: Option<String>,
    pub sticker_right: Option<String>,
    pub time_label: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub theme: ThemeName,
    pub secondary: Option<SecondaryEffect>,
}

/// Treats absent and blank strings alike.
fn present(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "null")
        .map(str::to_string)
}

impl Story {
    pub fn from_json_str(s: &str) -> StarcardResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> StarcardResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read story document {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Loads the document, or falls back to [`Story::builtin_default`] so the page
    /// never renders blank.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::from_path(path) {
            Ok(story) => story,
            Err(err) => {
                tracing::warn!(error = %err, "story document unavailable, using built-in default");
                Self::builtin_default()
            }
        }
    }

    pub fn builtin_default() -> Self {
        Self {
            site: Site {
                title: Some("Half-Year & Christmas".to_string()),
                subtitle: Some("A long letter written in starlight".to_string()),
                music: Some(Music {
                    src: Some("/assets/music/track.mp3".to_string()),
                }),
                stickers: None,
            },
            beats: Vec::new(),
            ending: Ending {
                message: Some(String::new()),
            },
        }
    }

    pub fn title(&self) -> Option<String> {
        present(&self.site.title)
    }

    pub fn subtitle(&self) -> Option<String> {
        present(&self.site.subtitle)
    }

    pub fn music_src(&self) -> Option<String> {
        self.site.music.as_ref().and_then(|m| present(&m.src))
    }

    pub fn ending_message(&self) -> Option<String> {
        present(&self.ending.message)
    }

    /// Validated beats ordered by ordinal (authored ordinal, then document
    /// order), renumbered `0..n`. Duplicate ids keep their first occurrence.
    pub fn beats(&self) -> Vec<Beat> {
        let mut indexed: Vec<(usize, usize, &BeatRecord)> = self
            .beats
            .iter()
            .enumerate()
            .map(|(idx, rec)| (rec.ordinal.unwrap_or(idx), idx, rec))
            .collect();
        indexed.sort_by_key(|(ordinal, idx, _)| (*ordinal, *idx));

        let mut seen = BTreeSet::new();
        let mut out = Vec::with_capacity(indexed.len());
        for (_, idx, rec) in indexed {
            let id = present(&rec.id).unwrap_or_else(|| format!("beat-{idx}"));
            if !seen.insert(id.clone()) {
                tracing::warn!(id = %id, "duplicate beat id skipped");
                continue;
            }

            let theme = match present(&rec.theme) {
                None => ThemeName::default(),
                Some(tag) => ThemeName::parse(&tag).unwrap_or_else(|| {
                    tracing::warn!(id = %id, tag = %tag, "unknown beat theme, using baseline");
                    ThemeName::default()
                }),
            };
            let secondary = present(&rec.lottie_animation).and_then(|tag| {
                let effect = SecondaryEffect::parse(&tag);
                if effect.is_none() {
                    tracing::warn!(id = %id, tag = %tag, "unknown secondary animation ignored");
                }
                effect
            });

            out.push(Beat {
                ordinal: out.len(),
                id,
                photo: present(&rec.photo),
                sticker_left: present(&rec.sticker_left),
                sticker_right: present(&rec.sticker_right),
                time_label: present(&rec.time_label),
                title: present(&rec.title),
                caption: present(&rec.caption),
                theme,
                secondary,
            });
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/story.rs"]
mod tests;
