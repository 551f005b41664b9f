//! Local media materials and the per-draft catalog that owns them.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::animation::SegmentAnimations;

/// Media kind of a track. Segments and replacement materials must match it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Audio,
    /// Text/decoration tracks are carried through drafts but never take part
    /// in material replacement.
    Text,
}

impl TrackKind {
    /// Parse the `type` tag of a track descriptor.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    /// Name used by the draft document for this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
        }
    }

    /// Whether a material of this kind may be placed on (or swapped into) a
    /// track of this kind. This is the gate the template engine consults
    /// before touching any timerange.
    pub fn accepts(self, material: &Material) -> bool {
        matches!(
            (self, material),
            (Self::Video, Material::Video(_)) | (Self::Audio, Material::Audio(_))
        )
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A local media file referenced by segments.
#[derive(Clone, Debug)]
pub enum Material {
    Video(VideoMaterial),
    Audio(AudioMaterial),
}

impl Material {
    /// Stable identity used by segment descriptors to reference this material.
    pub fn material_id(&self) -> &str {
        match self {
            Self::Video(m) => &m.material_id,
            Self::Audio(m) => &m.material_id,
        }
    }

    /// Natural duration of the media, microseconds.
    pub fn duration(&self) -> i64 {
        match self {
            Self::Video(m) => m.duration,
            Self::Audio(m) => m.duration,
        }
    }

    /// Kind name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Audio(_) => "audio",
        }
    }
}

/// A video or still-image source file.
#[derive(Clone, Debug)]
pub struct VideoMaterial {
    /// Generated uuid-hex identity.
    pub material_id: String,
    /// Path to the media file. Existence is not checked here.
    pub path: String,
    /// Display name, defaults to the file stem.
    pub name: String,
    /// Natural duration, microseconds. Still images use the host convention
    /// of a large fixed duration.
    pub duration: i64,
    pub width: u32,
    pub height: u32,
}

impl VideoMaterial {
    pub fn new(path: impl Into<String>, duration: i64, width: u32, height: u32) -> Self {
        let path = path.into();
        Self {
            material_id: uuid::Uuid::new_v4().simple().to_string(),
            name: file_stem(&path),
            path,
            duration,
            width,
            height,
        }
    }

    pub(crate) fn export_json(&self) -> Value {
        json!({
            "id": self.material_id,
            "material_name": self.name,
            "path": self.path,
            "duration": self.duration,
            "width": self.width,
            "height": self.height,
            "type": "video",
            "crop": {
                "lower_left_x": 0.0, "lower_left_y": 1.0,
                "lower_right_x": 1.0, "lower_right_y": 1.0,
                "upper_left_x": 0.0, "upper_left_y": 0.0,
                "upper_right_x": 1.0, "upper_right_y": 0.0
            },
            "crop_ratio": "free",
            "crop_scale": 1.0,
            "category_name": "local",
            "check_flag": 63
        })
    }
}

/// An audio source file.
#[derive(Clone, Debug)]
pub struct AudioMaterial {
    /// Generated uuid-hex identity.
    pub material_id: String,
    pub path: String,
    pub name: String,
    /// Natural duration, microseconds.
    pub duration: i64,
}

impl AudioMaterial {
    pub fn new(path: impl Into<String>, duration: i64) -> Self {
        let path = path.into();
        Self {
            material_id: uuid::Uuid::new_v4().simple().to_string(),
            name: file_stem(&path),
            path,
            duration,
        }
    }

    pub(crate) fn export_json(&self) -> Value {
        json!({
            "id": self.material_id,
            "name": self.name,
            "path": self.path,
            "duration": self.duration,
            "type": "extract_music",
            "app_id": 0,
            "category_name": "local",
            "check_flag": 1
        })
    }
}

fn file_stem(path: &str) -> String {
    std::path::Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// The `materials` block of a draft document.
///
/// Owns every material the draft references. The host schema wants a long
/// list of category arrays even when empty; `export_json` fills them in.
#[derive(Clone, Debug, Default)]
pub struct MaterialCatalog {
    pub videos: Vec<VideoMaterial>,
    pub audios: Vec<AudioMaterial>,
    pub animations: Vec<SegmentAnimations>,
    /// Text materials are emitted by their segments; stored here as raw JSON.
    pub texts: Vec<Value>,
}

impl MaterialCatalog {
    /// Whether a material with this id is already registered.
    pub fn contains_material(&self, material_id: &str) -> bool {
        self.videos.iter().any(|m| m.material_id == material_id)
            || self.audios.iter().any(|m| m.material_id == material_id)
    }

    /// Whether an animation group with this id is already registered.
    pub fn contains_animation(&self, animation_id: &str) -> bool {
        self.animations.iter().any(|a| a.animation_id == animation_id)
    }

    pub fn add(&mut self, material: Material) {
        match material {
            Material::Video(m) => self.videos.push(m),
            Material::Audio(m) => self.audios.push(m),
        }
    }

    pub(crate) fn export_json(&self) -> Value {
        json!({
            "ai_translates": [],
            "audio_balances": [],
            "audio_effects": [],
            "audio_fades": [],
            "audio_track_indexes": [],
            "audios": self.audios.iter().map(|m| m.export_json()).collect::<Vec<_>>(),
            "beats": [],
            "canvases": [],
            "chromas": [],
            "color_curves": [],
            "digital_humans": [],
            "drafts": [],
            "effects": [],
            "flowers": [],
            "green_screens": [],
            "handwrites": [],
            "hsl": [],
            "images": [],
            "log_color_wheels": [],
            "loudnesses": [],
            "manual_deformations": [],
            "masks": [],
            "material_animations": self.animations.iter().map(|a| a.export_json()).collect::<Vec<_>>(),
            "material_colors": [],
            "multi_language_refs": [],
            "placeholders": [],
            "plugin_effects": [],
            "primary_color_wheels": [],
            "realtime_denoises": [],
            "shapes": [],
            "smart_crops": [],
            "smart_relights": [],
            "sound_channel_mappings": [],
            "speeds": [],
            "stickers": [],
            "tail_leaders": [],
            "text_templates": [],
            "texts": self.texts.clone(),
            "time_marks": [],
            "transitions": [],
            "video_effects": [],
            "video_trackings": [],
            "videos": self.videos.iter().map(|m| m.export_json()).collect::<Vec<_>>(),
            "vocal_beautifys": [],
            "vocal_separations": []
        })
    }
}
