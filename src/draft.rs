//! The draft document: top-level container, loading, and emission.
//!
//! A [`Draft`] is either generated from scratch (construction path: materials
//! plus built segments over a default content template) or imported from an
//! existing document (template path: tracks are parsed for editing, everything
//! else is held opaquely and re-emitted unchanged). Importing, mutating
//! nothing, and exporting reproduces the original document value exactly.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use crate::error::{DraftError, DraftResult};
use crate::material::{Material, MaterialCatalog};
use crate::segment::VideoSegment;
use crate::template::{ExtendMode, ShrinkMode, Track};
use crate::text::TextSegment;

/// One entry of the document's `tracks` array.
///
/// Tracks whose type tag this crate does not model (stickers, filters,
/// effects, ...) are held as raw values and pass through untouched.
#[derive(Clone, Debug)]
enum TrackEntry {
    Parsed(Track),
    Opaque(Value),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DraftOrigin {
    Generated,
    Imported,
}

/// A draft project: canvas geometry, material catalog, and tracks.
///
/// Tracks are owned exclusively by their draft and never shared. All mutation
/// is synchronous; a draft (and each track in it) is a single-writer unit.
#[derive(Clone, Debug)]
pub struct Draft {
    /// Canvas width, pixels.
    pub width: u32,
    /// Canvas height, pixels.
    pub height: u32,
    /// Frame rate of the project.
    pub fps: u32,
    /// Overall duration, microseconds. Maintained by the construction path;
    /// read from the document on import.
    pub duration: i64,
    /// Typed materials registered through the construction path.
    pub materials: MaterialCatalog,

    content: Map<String, Value>,
    tracks: Vec<TrackEntry>,
    origin: DraftOrigin,
}

impl Draft {
    /// Start an empty draft with one video track, ready for the construction
    /// path (`add_material` / `add_segment`).
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            duration: 0,
            materials: MaterialCatalog::default(),
            content: default_content(width, height, fps),
            tracks: Vec::new(),
            origin: DraftOrigin::Generated,
        }
    }

    /// Import an existing draft document for template-mode editing.
    pub fn from_value(value: Value) -> DraftResult<Self> {
        let content = match value {
            Value::Object(map) => map,
            _ => return Err(DraftError::serde("draft document must be a JSON object")),
        };

        let mut tracks = Vec::new();
        if let Some(raw_tracks) = content.get("tracks").and_then(Value::as_array) {
            for raw in raw_tracks {
                match Track::from_value(raw) {
                    Ok(track) => tracks.push(TrackEntry::Parsed(track)),
                    Err(_) => tracks.push(TrackEntry::Opaque(raw.clone())),
                }
            }
        }
        debug!(
            total = tracks.len(),
            parsed = tracks
                .iter()
                .filter(|t| matches!(t, TrackEntry::Parsed(_)))
                .count(),
            "imported draft tracks"
        );

        let canvas = content.get("canvas_config");
        let width = read_u32(canvas, "width");
        let height = read_u32(canvas, "height");
        let fps = content.get("fps").and_then(Value::as_u64).unwrap_or(30) as u32;
        let duration = content
            .get("duration")
            .and_then(Value::as_i64)
            .unwrap_or(0);

        Ok(Self {
            width,
            height,
            fps,
            duration,
            materials: MaterialCatalog::default(),
            content,
            tracks,
            origin: DraftOrigin::Imported,
        })
    }

    /// Import a draft document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> DraftResult<Self> {
        let value: Value = serde_json::from_reader(r)
            .map_err(|e| DraftError::serde(format!("parse draft JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Import a draft document from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> DraftResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            DraftError::serde(format!("open draft JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Register a material with the draft's catalog.
    pub fn add_material(&mut self, material: Material) {
        self.materials.add(material);
    }

    /// Append a built video segment to the primary video track, extending the
    /// draft duration. Animation groups attached to the segment are
    /// registered with the catalog automatically.
    ///
    /// Construction only: fails with `InvalidArgument` on an imported draft,
    /// whose emission reproduces the loaded document and would drop the
    /// appended segment.
    pub fn add_segment(&mut self, segment: VideoSegment) -> DraftResult<()> {
        self.ensure_generated("add_segment")?;
        let end = segment.target_timerange.end();
        let exported = segment.export_json();

        let segments = self
            .content
            .get_mut("tracks")
            .and_then(Value::as_array_mut)
            .and_then(|tracks| tracks.first_mut())
            .and_then(|track| track.get_mut("segments"))
            .and_then(Value::as_array_mut)
            .ok_or_else(|| DraftError::serde("draft content has no primary track"))?;
        segments.push(exported);
        self.duration = self.duration.max(end);

        if let Some(animations) = segment.animations {
            if !self.materials.contains_animation(&animations.animation_id) {
                self.materials.animations.push(animations);
            }
        }
        Ok(())
    }

    /// Append a text segment, creating the draft's text track on first use.
    ///
    /// Construction only, like [`add_segment`](Self::add_segment).
    pub fn add_text_segment(&mut self, segment: TextSegment) -> DraftResult<()> {
        self.ensure_generated("add_text_segment")?;
        let end = segment.target_timerange.end();
        self.materials.texts.push(segment.export_material());
        let exported = segment.export_json();

        let tracks = self
            .content
            .get_mut("tracks")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| DraftError::serde("draft content has no tracks array"))?;
        let text_track = match tracks
            .iter_mut()
            .find(|t| t.get("type").and_then(Value::as_str) == Some("text"))
        {
            Some(track) => track,
            None => {
                tracks.push(json!({
                    "attribute": 0,
                    "flag": 0,
                    "id": new_document_id(),
                    "is_default_name": true,
                    "name": "",
                    "segments": [],
                    "type": "text"
                }));
                tracks.last_mut().expect("just pushed")
            }
        };
        text_track
            .get_mut("segments")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| DraftError::serde("text track has no segments array"))?
            .push(exported);

        self.duration = self.duration.max(end);
        Ok(())
    }

    fn ensure_generated(&self, op: &str) -> DraftResult<()> {
        match self.origin {
            DraftOrigin::Generated => Ok(()),
            DraftOrigin::Imported => Err(DraftError::invalid_argument(format!(
                "{op} is a construction operation; imported drafts only support template editing"
            ))),
        }
    }

    /// The imported tracks this crate can edit, in document order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter_map(|entry| match entry {
            TrackEntry::Parsed(track) => Some(track),
            TrackEntry::Opaque(_) => None,
        })
    }

    /// Look up an editable track by name.
    pub fn track_mut(&mut self, name: &str) -> DraftResult<&mut Track> {
        self.tracks
            .iter_mut()
            .find_map(|entry| match entry {
                TrackEntry::Parsed(track) if track.name == name => Some(track),
                _ => None,
            })
            .ok_or_else(|| {
                DraftError::invalid_argument(format!("no editable track named '{name}'"))
            })
    }

    /// Replace the material of one segment on a named track.
    ///
    /// Checks type compatibility first and fails without touching anything
    /// when the material's kind does not match the track's. On success the
    /// segment's timing is reconciled to the material's natural duration
    /// under the given policies, the segment references the new material, and
    /// the material is appended to the document's catalog block.
    ///
    /// The source range keeps its start offset; callers wanting to sample a
    /// different part of the new material set that separately.
    #[instrument(skip(self, material), fields(material_id = material.material_id()))]
    pub fn replace_material(
        &mut self,
        track_name: &str,
        seg_index: usize,
        material: Material,
        shrink: ShrinkMode,
        extend: &[ExtendMode],
    ) -> DraftResult<()> {
        let track = self.track_mut(track_name)?;
        if !track.kind.accepts(&material) {
            return Err(DraftError::TypeMismatch {
                track: track.kind.to_string(),
                material: material.kind_name().to_string(),
            });
        }

        track.replace_segment_duration(seg_index, material.duration(), shrink, extend)?;
        let segment = track.editable_segment_mut(seg_index)?;
        segment.material_id = material.material_id().to_string();
        // the engine leaves the segment alone when the duration is unchanged,
        // but the new material's natural length must land in the source range
        // either way
        segment.source_timerange.duration = material.duration();
        self.register_imported_material(material);
        Ok(())
    }

    /// Append a replacement material to the document's raw `materials` block
    /// so the edited draft stays self-consistent.
    fn register_imported_material(&mut self, material: Material) {
        let (key, exported) = match &material {
            Material::Video(m) => ("videos", m.export_json()),
            Material::Audio(m) => ("audios", m.export_json()),
        };
        let materials = match self.content.get_mut("materials") {
            Some(Value::Object(map)) => map,
            _ => {
                self.content
                    .insert("materials".to_string(), Value::Object(Map::new()));
                match self.content.get_mut("materials") {
                    Some(Value::Object(map)) => map,
                    _ => unreachable!("just inserted an object"),
                }
            }
        };
        match materials.get_mut(key) {
            Some(Value::Array(list)) => list.push(exported),
            _ => {
                materials.insert(key.to_string(), Value::Array(vec![exported]));
            }
        }
        self.materials.add(material);
    }

    /// Emit the complete draft document.
    ///
    /// Generated drafts write their canvas, fps, duration and materials over
    /// the content template. Imported drafts only re-merge the track list;
    /// every other field is reproduced exactly as loaded.
    pub fn to_value(&self) -> Value {
        let mut content = self.content.clone();

        match self.origin {
            DraftOrigin::Generated => {
                content.insert("fps".to_string(), json!(self.fps));
                content.insert("duration".to_string(), json!(self.duration));
                content.insert(
                    "canvas_config".to_string(),
                    json!({"width": self.width, "height": self.height, "ratio": "original"}),
                );
                content.insert("materials".to_string(), self.materials.export_json());
            }
            DraftOrigin::Imported => {
                // only re-merge what was parsed; a document without a tracks
                // array is reproduced as-is
                if matches!(content.get("tracks"), Some(Value::Array(_))) {
                    let tracks: Vec<Value> = self
                        .tracks
                        .iter()
                        .map(|entry| match entry {
                            TrackEntry::Parsed(track) => track.export_json(),
                            TrackEntry::Opaque(raw) => raw.clone(),
                        })
                        .collect();
                    content.insert("tracks".to_string(), Value::Array(tracks));
                }
            }
        }

        Value::Object(content)
    }

    /// Serialize the draft document as pretty-printed JSON.
    pub fn dumps(&self) -> DraftResult<String> {
        serde_json::to_string_pretty(&self.to_value())
            .map_err(|e| DraftError::serde(format!("emit draft JSON: {e}")))
    }
}

fn read_u32(obj: Option<&Value>, key: &str) -> u32 {
    obj.and_then(|v| v.get(key))
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

/// Document-level ids use the host's uppercase hyphenated form, unlike the
/// bare hex used for material ids.
fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string().to_uppercase()
}

fn default_content(width: u32, height: u32, fps: u32) -> Map<String, Value> {
    let content = json!({
        "canvas_config": {"width": width, "height": height, "ratio": "original"},
        "color_space": 0,
        "config": {
            "adjust_max_index": 1,
            "attachment_info": [],
            "combination_max_index": 1,
            "export_range": null,
            "extract_audio_last_index": 1,
            "lyrics_recognition_id": "",
            "lyrics_sync": true,
            "lyrics_taskinfo": [],
            "maintrack_adsorb": true,
            "material_save_mode": 0,
            "original_sound_last_index": 1,
            "record_audio_last_index": 1,
            "sticker_max_index": 1,
            "subtitle_recognition_id": "",
            "subtitle_sync": true,
            "subtitle_taskinfo": [],
            "system_font_list": [],
            "video_mute": false,
            "zoom_info_params": null
        },
        "cover": null,
        "create_time": 0,
        "duration": 0,
        "extra_info": null,
        "fps": fps,
        "free_render_index_mode_on": false,
        "group_container": null,
        "id": new_document_id(),
        "keyframe_graph_list": [],
        "keyframes": {
            "adjusts": [],
            "audios": [],
            "effects": [],
            "filters": [],
            "handwrites": [],
            "stickers": [],
            "texts": [],
            "videos": []
        },
        "last_modified_platform": {},
        "materials": {},
        "mutable_config": null,
        "name": "",
        "new_version": "110.0.0",
        "relationships": [],
        "render_index_track_mode_on": false,
        "retouch_cover": null,
        "source": "default",
        "static_cover_image_path": "",
        "tracks": [
            {
                "attribute": 0,
                "flag": 0,
                "id": new_document_id(),
                "is_default_name": true,
                "name": "",
                "segments": [],
                "type": "video"
            }
        ],
        "update_time": 0,
        "version": 360000
    });
    match content {
        Value::Object(map) => map,
        _ => unreachable!("template literal is an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{AudioMaterial, VideoMaterial};
    use crate::time::Timerange;

    fn imported_draft() -> Draft {
        Draft::from_value(json!({
            "fps": 30,
            "duration": 10_000_000,
            "canvas_config": {"width": 1920, "height": 1080, "ratio": "original"},
            "unknown_top_level": {"keep": "me"},
            "materials": {"videos": [], "audios": []},
            "tracks": [
                {
                    "type": "video",
                    "name": "main",
                    "id": "T0",
                    "segments": [
                        {
                            "id": "s0",
                            "material_id": "m0",
                            "source_timerange": {"start": 0, "duration": 5_000_000},
                            "target_timerange": {"start": 0, "duration": 5_000_000},
                            "render_index": 0
                        },
                        {
                            "id": "s1",
                            "material_id": "m1",
                            "source_timerange": {"start": 0, "duration": 5_000_000},
                            "target_timerange": {"start": 5_000_000, "duration": 5_000_000},
                            "render_index": 0
                        }
                    ]
                },
                {"type": "sticker", "name": "fx", "id": "T1", "stuff": [1, 2]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn import_reads_geometry_and_parses_known_tracks() {
        let draft = imported_draft();
        assert_eq!((draft.width, draft.height, draft.fps), (1920, 1080, 30));
        assert_eq!(draft.duration, 10_000_000);
        assert_eq!(draft.tracks().count(), 1);
    }

    #[test]
    fn unknown_track_kinds_pass_through() {
        let draft = imported_draft();
        let v = draft.to_value();
        assert_eq!(v["tracks"][1]["type"], "sticker");
        assert_eq!(v["tracks"][1]["stuff"], json!([1, 2]));
    }

    #[test]
    fn replace_material_rejects_kind_mismatch_without_mutation() {
        let mut draft = imported_draft();
        let before = draft.to_value();
        let audio = Material::Audio(AudioMaterial::new("voice.mp3", 3_000_000));
        let err = draft
            .replace_material("main", 0, audio, ShrinkMode::CutTail, &[])
            .unwrap_err();
        assert!(matches!(err, DraftError::TypeMismatch { .. }));
        assert_eq!(draft.to_value(), before);
    }

    #[test]
    fn replace_material_updates_segment_and_catalog() {
        let mut draft = imported_draft();
        let material = VideoMaterial::new("new.mp4", 3_000_000, 1920, 1080);
        let id = material.material_id.clone();
        draft
            .replace_material("main", 0, Material::Video(material), ShrinkMode::CutTail, &[])
            .unwrap();

        let v = draft.to_value();
        assert_eq!(v["tracks"][0]["segments"][0]["material_id"], id.as_str());
        assert_eq!(
            v["tracks"][0]["segments"][0]["target_timerange"]["duration"],
            3_000_000
        );
        assert_eq!(v["materials"]["videos"][0]["id"], id.as_str());
        assert!(draft.materials.contains_material(&id));
    }

    #[test]
    fn replace_material_rewrites_source_duration_when_target_is_unchanged() {
        // segment 0 plays a 10s source slice in a 5s target window; the
        // replacement's natural duration equals the target, so the timeline
        // engine has nothing to do, but the source range must still follow
        // the new material
        let mut draft = Draft::from_value(json!({
            "tracks": [{
                "type": "video",
                "name": "main",
                "id": "T0",
                "segments": [{
                    "id": "s0",
                    "material_id": "m0",
                    "source_timerange": {"start": 0, "duration": 10_000_000},
                    "target_timerange": {"start": 0, "duration": 5_000_000},
                    "render_index": 0
                }]
            }]
        }))
        .unwrap();

        let material = VideoMaterial::new("same_length.mp4", 5_000_000, 1920, 1080);
        let id = material.material_id.clone();
        draft
            .replace_material("main", 0, Material::Video(material), ShrinkMode::CutTail, &[])
            .unwrap();

        let v = draft.to_value();
        let seg = &v["tracks"][0]["segments"][0];
        assert_eq!(seg["material_id"], id.as_str());
        assert_eq!(seg["source_timerange"]["duration"], 5_000_000);
        assert_eq!(seg["target_timerange"]["duration"], 5_000_000);
    }

    #[test]
    fn construction_calls_are_rejected_on_imported_drafts() {
        let mut draft = imported_draft();
        let before = draft.to_value();

        let material = VideoMaterial::new("clip.mp4", 1_000_000, 1920, 1080);
        let seg = VideoSegment::new(&material, Timerange::new(0, 1_000_000), None, None);
        let err = draft.add_segment(seg).unwrap_err();
        assert!(matches!(err, DraftError::InvalidArgument(_)));

        let text = TextSegment::new("hi", Timerange::new(0, 1_000_000), None);
        let err = draft.add_text_segment(text).unwrap_err();
        assert!(matches!(err, DraftError::InvalidArgument(_)));

        assert_eq!(draft.to_value(), before);
    }

    #[test]
    fn replace_material_on_unknown_track_is_invalid_argument() {
        let mut draft = imported_draft();
        let material = Material::Video(VideoMaterial::new("a.mp4", 1, 1, 1));
        let err = draft
            .replace_material("absent", 0, material, ShrinkMode::CutTail, &[])
            .unwrap_err();
        assert!(matches!(err, DraftError::InvalidArgument(_)));
    }

    #[test]
    fn generated_draft_emits_segments_and_materials() {
        let mut draft = Draft::new(1080, 1920, 30);
        let material = VideoMaterial::new("clip.mp4", 5_000_000, 1080, 1920);
        let seg = VideoSegment::new(&material, Timerange::new(0, 5_000_000), None, None);
        let seg_id = seg.segment_id.clone();
        let material_id = material.material_id.clone();

        draft.add_material(Material::Video(material));
        draft.add_segment(seg).unwrap();

        assert_eq!(draft.duration, 5_000_000);
        let v = draft.to_value();
        assert_eq!(v["duration"], 5_000_000);
        assert_eq!(v["canvas_config"]["width"], 1080);
        assert_eq!(v["tracks"][0]["segments"][0]["id"], seg_id.as_str());
        assert_eq!(v["materials"]["videos"][0]["id"], material_id.as_str());
    }

    #[test]
    fn text_segments_get_their_own_track_and_material() {
        let mut draft = Draft::new(1080, 1920, 30);
        draft
            .add_text_segment(TextSegment::new("hello", Timerange::new(0, 2_000_000), None))
            .unwrap();
        draft
            .add_text_segment(TextSegment::new("world", Timerange::new(2_000_000, 2_000_000), None))
            .unwrap();

        let v = draft.to_value();
        let tracks = v["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1]["type"], "text");
        assert_eq!(tracks[1]["segments"].as_array().unwrap().len(), 2);
        assert_eq!(v["materials"]["texts"].as_array().unwrap().len(), 2);
        assert_eq!(draft.duration, 4_000_000);
    }

    #[test]
    fn dumps_is_valid_json() {
        let draft = Draft::new(640, 360, 25);
        let s = draft.dumps().unwrap();
        let v: Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["fps"], 25);
    }
}
