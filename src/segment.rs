//! Video segments built from scratch for new drafts.
//!
//! This is the construction side of the crate: a [`VideoSegment`] is created
//! from a local material plus a placement on the track, optionally decorated
//! with keyframes and animations, and exported as a full host segment
//! descriptor. Editing segments loaded from an existing draft lives in
//! [`crate::template`].

use serde_json::{Value, json};

use crate::animation::{Animation, AnimationKind, AnimationMeta, SegmentAnimations};
use crate::clip::ClipSettings;
use crate::error::{DraftError, DraftResult};
use crate::keyframe::{KeyframeList, KeyframeProperty};
use crate::material::VideoMaterial;
use crate::time::Timerange;

/// A video/image segment placed on a track.
#[derive(Clone, Debug)]
pub struct VideoSegment {
    /// Generated uuid-hex identity.
    pub segment_id: String,
    /// Id of the material this segment samples.
    pub material_id: String,
    /// The slice of the source media that is used.
    pub source_timerange: Timerange,
    /// Where the segment sits on the track.
    pub target_timerange: Timerange,

    /// Keyframe lists, one per animated property.
    pub common_keyframes: Vec<KeyframeList>,
    /// Ids of companion materials (animation groups etc).
    pub extra_material_refs: Vec<String>,
    pub clip_settings: ClipSettings,

    /// Whether X and Y scale are locked together. Cleared automatically when
    /// a per-axis scale keyframe is added.
    pub uniform_scale: bool,
    /// Animation group, created lazily on first use.
    pub animations: Option<SegmentAnimations>,
}

impl VideoSegment {
    /// Place `material` on the track at `target_timerange`.
    ///
    /// When `source_timerange` is `None`, the segment samples the material
    /// from its head for the same duration as the target range.
    pub fn new(
        material: &VideoMaterial,
        target_timerange: Timerange,
        source_timerange: Option<Timerange>,
        clip_settings: Option<ClipSettings>,
    ) -> Self {
        Self {
            segment_id: uuid::Uuid::new_v4().simple().to_string(),
            material_id: material.material_id.clone(),
            source_timerange: source_timerange
                .unwrap_or_else(|| Timerange::new(0, target_timerange.duration)),
            target_timerange,
            common_keyframes: Vec::new(),
            extra_material_refs: Vec::new(),
            clip_settings: clip_settings.unwrap_or_default(),
            uniform_scale: true,
            animations: None,
        }
    }

    /// Add an intro or outro animation. Outros are placed so they end exactly
    /// at the segment tail.
    pub fn add_animation(&mut self, kind: AnimationKind, meta: AnimationMeta) -> DraftResult<()> {
        let animation = match kind {
            AnimationKind::Intro => Animation::intro(meta, None),
            AnimationKind::Outro => {
                let start = self.target_timerange.duration - meta.duration;
                Animation::outro(meta, start, None)
            }
        };

        let group = self.animations.get_or_insert_with(|| {
            let group = SegmentAnimations::new();
            self.extra_material_refs.push(group.animation_id.clone());
            group
        });
        group.add_animation(animation)
    }

    /// Add a keyframe for `property`, creating the property's list on first
    /// use.
    ///
    /// Per-axis scale and uniform scale are mutually exclusive: the first
    /// per-axis keyframe silently unlocks the axes, while a uniform-scale
    /// keyframe after per-axis ones is an error. A uniform-scale keyframe on
    /// a still-locked segment is stored as an X-axis keyframe, matching the
    /// host's behavior.
    pub fn add_keyframe(
        &mut self,
        property: KeyframeProperty,
        time_offset: i64,
        value: f64,
    ) -> DraftResult<()> {
        let mut property = property;
        if matches!(property, KeyframeProperty::ScaleX | KeyframeProperty::ScaleY)
            && self.uniform_scale
        {
            self.uniform_scale = false;
        } else if property == KeyframeProperty::UniformScale {
            if !self.uniform_scale {
                return Err(DraftError::invalid_argument(
                    "cannot set uniform_scale when scale_x or scale_y keyframes already exist",
                ));
            }
            property = KeyframeProperty::ScaleX;
        }

        if let Some(list) = self
            .common_keyframes
            .iter_mut()
            .find(|list| list.property == property)
        {
            list.add_keyframe(time_offset, value);
            return Ok(());
        }
        let mut list = KeyframeList::new(property);
        list.add_keyframe(time_offset, value);
        self.common_keyframes.push(list);
        Ok(())
    }

    /// Emit the full host segment descriptor, fixed default fields included.
    pub fn export_json(&self) -> Value {
        json!({
            "caption_info": null,
            "cartoon": false,
            "enable_adjust": true,
            "enable_color_correct_adjust": false,
            "enable_color_curves": true,
            "enable_color_match_adjust": false,
            "enable_color_wheels": true,
            "enable_lut": true,
            "enable_smart_color_adjust": false,
            "group_id": "",
            "hdr_settings": {"intensity": 1.0, "mode": 1, "nits": 1000},
            "intensifies_audio": false,
            "is_placeholder": false,
            "is_tone_modify": false,
            "last_nonzero_volume": 1.0,
            "render_index": 0,
            "responsive_layout": {
                "enable": false,
                "horizontal_pos_layout": 0,
                "size_layout": 0,
                "vertical_pos_layout": 0,
                "target_follow": ""
            },
            "reverse": false,
            "speed": 1.0,
            "template_id": "",
            "template_scene": "default",
            "track_attribute": 0,
            "track_render_index": 0,
            "visible": true,
            "volume": 1.0,
            "id": self.segment_id,
            "material_id": self.material_id,
            "common_keyframes": self.common_keyframes.iter().map(|l| l.export_json()).collect::<Vec<_>>(),
            "extra_material_refs": self.extra_material_refs,
            "keyframe_refs": [],
            "source_timerange": self.source_timerange,
            "target_timerange": self.target_timerange,
            "clip": self.clip_settings.export_json(),
            "uniform_scale": {"on": self.uniform_scale, "value": 1.0}
        })
    }
}
