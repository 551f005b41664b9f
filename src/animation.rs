//! Intro/outro animations attached to video segments.
//!
//! The host application ships a large catalog of animation effects; this crate
//! does not enumerate it. Callers supply an [`AnimationMeta`] (title plus the
//! host-side effect and resource ids) obtained from whatever catalog source
//! they use, and this module handles placement and document emission.

use serde_json::{Value, json};

use crate::error::{DraftError, DraftResult};

/// Host-side identity of one animation effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationMeta {
    /// Display title of the effect.
    pub title: String,
    /// Effect id assigned by the host application.
    pub effect_id: String,
    /// Resource id assigned by the host application.
    pub resource_id: String,
    /// Default duration of the effect, microseconds.
    pub duration: i64,
}

impl AnimationMeta {
    pub fn new(
        title: impl Into<String>,
        effect_id: impl Into<String>,
        resource_id: impl Into<String>,
        duration: i64,
    ) -> Self {
        Self {
            title: title.into(),
            effect_id: effect_id.into(),
            resource_id: resource_id.into(),
            duration,
        }
    }
}

/// Whether an animation plays at the head or the tail of its segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationKind {
    Intro,
    Outro,
}

impl AnimationKind {
    fn type_tag(self) -> &'static str {
        match self {
            Self::Intro => "in",
            Self::Outro => "out",
        }
    }

    fn category_name(self) -> &'static str {
        // Host UI category labels, stored verbatim in the document.
        match self {
            Self::Intro => "入场",
            Self::Outro => "出场",
        }
    }
}

/// One animation instance placed on a segment.
#[derive(Clone, Debug)]
pub struct Animation {
    pub meta: AnimationMeta,
    pub kind: AnimationKind,
    /// Offset from the segment's start, microseconds.
    pub start: i64,
    /// Duration, microseconds.
    pub duration: i64,
}

impl Animation {
    /// An intro animation starting at the segment head, with the effect's
    /// default duration unless overridden.
    pub fn intro(meta: AnimationMeta, duration: Option<i64>) -> Self {
        let duration = duration.unwrap_or(meta.duration);
        Self {
            meta,
            kind: AnimationKind::Intro,
            start: 0,
            duration,
        }
    }

    /// An outro animation; `start` is relative to the segment head and must be
    /// supplied (it depends on the segment length).
    pub fn outro(meta: AnimationMeta, start: i64, duration: Option<i64>) -> Self {
        let duration = duration.unwrap_or(meta.duration);
        Self {
            meta,
            kind: AnimationKind::Outro,
            start,
            duration,
        }
    }

    pub(crate) fn export_json(&self) -> Value {
        json!({
            "anim_adjust_params": null,
            "platform": "all",
            "panel": "video",
            "material_type": "video",
            "name": self.meta.title,
            "id": self.meta.effect_id,
            "type": self.kind.type_tag(),
            "resource_id": self.meta.resource_id,
            "category_id": self.kind.type_tag(),
            "category_name": self.kind.category_name(),
            "start": self.start,
            "duration": self.duration
        })
    }
}

/// The group of animations attached to one segment. Emitted into the
/// `material_animations` block of the materials catalog and referenced from
/// the segment via `extra_material_refs`.
#[derive(Clone, Debug)]
pub struct SegmentAnimations {
    /// Generated uuid-hex identity.
    pub animation_id: String,
    /// Host tag; observed drafts always carry `sticker_animation`.
    pub animation_type: String,
    pub animations: Vec<Animation>,
}

impl Default for SegmentAnimations {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentAnimations {
    pub fn new() -> Self {
        Self {
            animation_id: uuid::Uuid::new_v4().simple().to_string(),
            animation_type: "sticker_animation".to_string(),
            animations: Vec::new(),
        }
    }

    /// Add an animation. At most one intro and one outro per segment.
    pub fn add_animation(&mut self, animation: Animation) -> DraftResult<()> {
        if self.animations.iter().any(|a| a.kind == animation.kind) {
            return Err(DraftError::invalid_argument(format!(
                "duplicate animation type '{}'",
                animation.kind.type_tag()
            )));
        }
        self.animations.push(animation);
        Ok(())
    }

    pub(crate) fn export_json(&self) -> Value {
        json!({
            "id": self.animation_id,
            "type": self.animation_type,
            "multi_language_current": "none",
            "animations": self.animations.iter().map(|a| a.export_json()).collect::<Vec<_>>()
        })
    }
}
