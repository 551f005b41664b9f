//! Linear keyframes attached to segment properties.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The property a keyframe list animates, tagged with the host's type string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyframeProperty {
    PositionX,
    PositionY,
    Rotation,
    /// X-axis scale on its own.
    ScaleX,
    /// Y-axis scale on its own.
    ScaleY,
    /// Both axes together; mutually exclusive with per-axis scale.
    UniformScale,
    Alpha,
    Saturation,
    Contrast,
    Brightness,
}

impl KeyframeProperty {
    pub(crate) fn host_tag(self) -> &'static str {
        match self {
            Self::PositionX => "KFTypePositionX",
            Self::PositionY => "KFTypePositionY",
            Self::Rotation => "KFTypeRotation",
            Self::ScaleX => "KFTypeScaleX",
            Self::ScaleY => "KFTypeScaleY",
            Self::UniformScale => "UNIFORM_SCALE",
            Self::Alpha => "KFTypeAlpha",
            Self::Saturation => "KFTypeSaturation",
            Self::Contrast => "KFTypeContrast",
            Self::Brightness => "KFTypeBrightness",
        }
    }
}

/// A single keyframe. Only linear interpolation is supported.
#[derive(Clone, Debug)]
pub struct Keyframe {
    /// Generated uuid-hex identity.
    pub kf_id: String,
    /// Offset from the segment's start, microseconds.
    pub time_offset: i64,
    /// Property values at this point; the host stores a list but in practice
    /// it holds a single element.
    pub values: Vec<f64>,
}

impl Keyframe {
    pub fn new(time_offset: i64, value: f64) -> Self {
        Self {
            kf_id: uuid::Uuid::new_v4().simple().to_string(),
            time_offset,
            values: vec![value],
        }
    }

    pub(crate) fn export_json(&self) -> Value {
        json!({
            "curveType": "Line",
            "graphID": "",
            "left_control": {"x": 0.0, "y": 0.0},
            "right_control": {"x": 0.0, "y": 0.0},
            "id": self.kf_id,
            "time_offset": self.time_offset,
            "values": self.values
        })
    }
}

/// All keyframes for one property of one segment, kept sorted by time offset.
#[derive(Clone, Debug)]
pub struct KeyframeList {
    /// Generated uuid-hex identity.
    pub list_id: String,
    pub property: KeyframeProperty,
    pub keyframes: Vec<Keyframe>,
}

impl KeyframeList {
    pub fn new(property: KeyframeProperty) -> Self {
        Self {
            list_id: uuid::Uuid::new_v4().simple().to_string(),
            property,
            keyframes: Vec::new(),
        }
    }

    /// Insert a keyframe, keeping the list ordered by time offset.
    pub fn add_keyframe(&mut self, time_offset: i64, value: f64) {
        self.keyframes.push(Keyframe::new(time_offset, value));
        self.keyframes.sort_by_key(|kf| kf.time_offset);
    }

    pub(crate) fn export_json(&self) -> Value {
        json!({
            "id": self.list_id,
            "keyframe_list": self.keyframes.iter().map(|kf| kf.export_json()).collect::<Vec<_>>(),
            "material_id": "",
            "property_type": self.property.host_tag()
        })
    }
}
