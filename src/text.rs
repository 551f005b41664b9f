//! Text segments and their font styling.

use serde_json::{Value, json};

use crate::time::Timerange;

/// Font styling for a text segment. Only the basics the host always reads.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// RGB in `[0, 1]` per channel.
    pub color: [f64; 3],
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// 0 left, 1 center, 2 right.
    pub align: u8,
    /// Vertical (top-to-bottom) layout.
    pub vertical: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 15.0,
            bold: false,
            italic: false,
            underline: false,
            color: [1.0, 1.0, 1.0],
            alpha: 1.0,
            align: 0,
            vertical: false,
        }
    }
}

/// A styled text segment placed on a text track.
///
/// Text has no separate media file; the segment and its implicit material are
/// exported together, the material carrying the rendered content.
#[derive(Clone, Debug)]
pub struct TextSegment {
    /// Generated uuid-hex identity shared between segment and material.
    pub material_id: String,
    /// Generated uuid-hex identity of the segment itself.
    pub segment_id: String,
    pub text: String,
    pub style: TextStyle,
    /// Where the segment sits on the track.
    pub target_timerange: Timerange,
    /// Ids of companion materials (animations, glow effects).
    pub extra_material_refs: Vec<String>,
}

impl TextSegment {
    pub fn new(text: impl Into<String>, timerange: Timerange, style: Option<TextStyle>) -> Self {
        Self {
            material_id: uuid::Uuid::new_v4().simple().to_string(),
            segment_id: uuid::Uuid::new_v4().simple().to_string(),
            text: text.into(),
            style: style.unwrap_or_default(),
            target_timerange: timerange,
            extra_material_refs: Vec::new(),
        }
    }

    /// Emit the text material tied to this segment. The host stores the
    /// styled content as a JSON string inside the `content` field.
    pub fn export_material(&self) -> Value {
        let content = json!({
            "styles": [
                {
                    "fill": {
                        "alpha": 1.0,
                        "content": {
                            "render_type": "solid",
                            "solid": {
                                "alpha": self.style.alpha,
                                "color": self.style.color
                            }
                        }
                    },
                    "range": [0, self.text.chars().count()],
                    "size": self.style.size,
                    "bold": self.style.bold,
                    "italic": self.style.italic,
                    "underline": self.style.underline
                }
            ],
            "text": self.text
        });

        json!({
            "add_type": 0,
            "typesetting": u8::from(self.style.vertical),
            "alignment": self.style.align,
            "base_content": "",
            "bold_width": 0.0,
            "check_flag": 7,
            "combo_info": {"text_templates": []},
            "content": content.to_string(),
            "fixed_height": -1.0,
            "fixed_width": -1.0,
            "force_apply_line_max_width": false,
            "group_id": "",
            "id": self.material_id,
            "initial_scale": 1.0,
            "inner_padding": -1.0,
            "is_rich_text": false,
            "italic_degree": 0,
            "ktv_color": "",
            "language": "",
            "layer_weight": 1,
            "letter_spacing": 0.0,
            "line_feed": 1,
            "line_max_width": 0.82,
            "line_spacing": 0.02,
            "multi_language_current": "none",
            "name": "",
            "original_size": [],
            "preset_category": "",
            "preset_category_id": "",
            "preset_has_set_alignment": false,
            "preset_id": "",
            "preset_index": 0,
            "preset_name": "",
            "recognize_task_id": "",
            "recognize_type": 0,
            "relevance_segment": [],
            "shape_clip_x": false,
            "shape_clip_y": false,
            "source_from": "",
            "style_name": "",
            "sub_type": 0,
            "subtitle_keywords": null,
            "subtitle_template_original_fontsize": 0.0,
            "text_to_audio_ids": [],
            "tts_auto_update": false,
            "type": "text",
            "underline_offset": 0.22,
            "underline_width": 0.05,
            "use_effect_default_color": true,
            "words": {"end_time": [], "start_time": [], "text": []}
        })
    }

    /// Emit the segment descriptor referencing the text material.
    pub fn export_json(&self) -> Value {
        json!({
            "id": self.segment_id,
            "material_id": self.material_id,
            "target_timerange": self.target_timerange,
            "source_timerange": null,
            "render_index": 0,
            "speed": 1.0,
            "volume": 1.0,
            "visible": true,
            "extra_material_refs": self.extra_material_refs,
            "common_keyframes": [],
            "keyframe_refs": []
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_content_embeds_style_as_json_string() {
        let seg = TextSegment::new(
            "你好",
            Timerange::new(0, 2_000_000),
            Some(TextStyle {
                bold: true,
                color: [1.0, 0.0, 0.0],
                ..Default::default()
            }),
        );
        let material = seg.export_material();
        assert_eq!(material["id"], seg.material_id.as_str());

        let content: Value =
            serde_json::from_str(material["content"].as_str().unwrap()).unwrap();
        assert_eq!(content["text"], "你好");
        assert_eq!(content["styles"][0]["bold"], true);
        // range counts characters, not bytes
        assert_eq!(content["styles"][0]["range"], json!([0, 2]));
    }

    #[test]
    fn segment_references_material_and_has_no_source_range() {
        let seg = TextSegment::new("title", Timerange::new(1_000, 5_000), None);
        let v = seg.export_json();
        assert_eq!(v["material_id"], seg.material_id.as_str());
        assert!(v["source_timerange"].is_null());
        assert_eq!(v["target_timerange"]["duration"], 5_000);
    }
}
