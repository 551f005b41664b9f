//! Per-segment image adjustment settings (the host `clip` block).

use serde_json::{Value, json};

/// Image adjustments applied to a video segment. The default is identity:
/// fully opaque, no flip, no rotation, unit scale, zero offset.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipSettings {
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Rotation in degrees, either sign.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Horizontal offset, host canvas units.
    pub transform_x: f64,
    /// Vertical offset, host canvas units.
    pub transform_y: f64,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            flip_horizontal: false,
            flip_vertical: false,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            transform_x: 0.0,
            transform_y: 0.0,
        }
    }
}

impl ClipSettings {
    pub(crate) fn export_json(&self) -> Value {
        json!({
            "alpha": self.alpha,
            "flip": {"horizontal": self.flip_horizontal, "vertical": self.flip_vertical},
            "rotation": self.rotation,
            "scale": {"x": self.scale_x, "y": self.scale_y},
            "transform": {"x": self.transform_x, "y": self.transform_y}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let v = ClipSettings::default().export_json();
        assert_eq!(v["alpha"], 1.0);
        assert_eq!(v["flip"]["horizontal"], false);
        assert_eq!(v["scale"]["x"], 1.0);
        assert_eq!(v["transform"]["y"], 0.0);
    }

    #[test]
    fn export_shape_is_nested_like_host_schema() {
        let settings = ClipSettings {
            rotation: -12.5,
            transform_x: 0.3,
            ..Default::default()
        };
        let v = settings.export_json();
        assert_eq!(v["rotation"], -12.5);
        assert_eq!(v["transform"]["x"], 0.3);
    }
}
