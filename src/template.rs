//! Template-mode editing of tracks loaded from an existing draft.
//!
//! A draft produced by the host application can be reopened and used as a
//! template: segments keep their decorations (animations, keyframes, effects,
//! whatever else the document carries) while the underlying material is
//! swapped for media of a different natural duration. The work happens here:
//! [`Track::replace_segment_duration`] reconciles the duration change against
//! a shrink or extend policy and the positions of the neighboring segments.
//!
//! Every descriptor loaded from the document keeps its full raw payload; only
//! the typed fields this module understands are re-merged at export time, so
//! fields we do not model survive a round-trip untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{DraftError, DraftResult};
use crate::material::TrackKind;
use crate::time::Timerange;

/// How to absorb a reduction in a segment's duration.
///
/// Shrinking only frees space, so every mode always succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShrinkMode {
    /// Trim the head: move the start point later, keep the end fixed.
    CutHead,
    /// Trim the tail: keep the start fixed, end earlier.
    CutTail,
    /// Trim the tail and close the gap this would open: every following
    /// segment moves earlier by the same amount.
    CutTailAlign,
    /// Keep the midpoint (approximately) fixed and pull both ends in. The
    /// delta is split with integer floor division, so the extra microsecond
    /// of an odd delta lands on the trailing side.
    Shrink,
}

/// How to accommodate an increase in a segment's duration.
///
/// Extending can collide with fixed neighbors; callers pass an ordered
/// preference list and the first mode that succeeds wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendMode {
    /// Move the start point earlier. Fails when it would run into the
    /// previous segment (or before time zero).
    ExtendHead,
    /// Move the end point later. Fails when it would run into the next
    /// segment.
    ExtendTail,
    /// Move the end point later and, when necessary, push every following
    /// segment later by the overlap. Always succeeds.
    PushTail,
}

/// A segment whose timing the template engine may rewrite.
#[derive(Clone, Debug, PartialEq)]
pub struct EditableSegment {
    /// Full original descriptor; unknown fields round-trip through here.
    raw: Map<String, Value>,
    /// Id of the material this segment samples.
    pub material_id: String,
    /// The slice of the source media that is used.
    pub source_timerange: Timerange,
    /// Where the segment sits on the track.
    pub target_timerange: Timerange,
}

impl EditableSegment {
    /// Parse a segment descriptor, keeping the raw payload for round-trip.
    pub fn from_value(value: &Value) -> DraftResult<Self> {
        let raw = value
            .as_object()
            .ok_or_else(|| DraftError::serde("segment descriptor must be an object"))?
            .clone();
        let material_id = raw
            .get("material_id")
            .and_then(Value::as_str)
            .ok_or_else(|| DraftError::serde("segment descriptor missing material_id"))?
            .to_string();
        let source_timerange = parse_timerange(&raw, "source_timerange")?;
        let target_timerange = parse_timerange(&raw, "target_timerange")?;
        Ok(Self {
            raw,
            material_id,
            source_timerange,
            target_timerange,
        })
    }

    /// Segment start on the track, microseconds.
    pub fn start(&self) -> i64 {
        self.target_timerange.start
    }

    /// Segment duration on the track, microseconds.
    pub fn duration(&self) -> i64 {
        self.target_timerange.duration
    }

    /// Segment end on the track, microseconds.
    pub fn end(&self) -> i64 {
        self.target_timerange.end()
    }

    /// Re-emit the descriptor: the raw payload with the typed fields merged
    /// back over it.
    pub fn export_json(&self) -> Value {
        let mut out = self.raw.clone();
        out.insert(
            "material_id".to_string(),
            Value::String(self.material_id.clone()),
        );
        // serialization of Timerange is infallible
        out.insert(
            "source_timerange".to_string(),
            serde_json::to_value(self.source_timerange).unwrap_or(Value::Null),
        );
        out.insert(
            "target_timerange".to_string(),
            serde_json::to_value(self.target_timerange).unwrap_or(Value::Null),
        );
        Value::Object(out)
    }

    fn raw_render_index(&self) -> i64 {
        render_index_of(&self.raw)
    }
}

fn parse_timerange(raw: &Map<String, Value>, key: &str) -> DraftResult<Timerange> {
    let value = raw
        .get(key)
        .ok_or_else(|| DraftError::serde(format!("segment descriptor missing {key}")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| DraftError::serde(format!("segment {key}: {e}")))
}

fn render_index_of(raw: &Map<String, Value>) -> i64 {
    match raw.get("render_index") {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        // some drafts store render_index as a string
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// A segment the engine must not touch: exported back byte-for-byte, but its
/// placement still participates in adjacency checks for editable neighbors.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticSegment {
    raw: Map<String, Value>,
    target_timerange: Timerange,
}

impl StaticSegment {
    fn from_value(value: &Value) -> DraftResult<Self> {
        let raw = value
            .as_object()
            .ok_or_else(|| DraftError::serde("segment descriptor must be an object"))?
            .clone();
        let target_timerange = parse_timerange(&raw, "target_timerange")?;
        Ok(Self {
            raw,
            target_timerange,
        })
    }

    /// The original descriptor, unchanged.
    pub fn export_json(&self) -> Value {
        Value::Object(self.raw.clone())
    }
}

/// A segment on a loaded track.
///
/// Descriptors that carry a material reference and both timeranges load as
/// [`Editable`](Segment::Editable); everything else (text segments with a
/// null source range, placeholder stickers, ...) loads as
/// [`Static`](Segment::Static) and passes through unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Editable(EditableSegment),
    Static(StaticSegment),
}

impl Segment {
    /// Parse a descriptor, deciding the variant from its shape.
    pub fn from_value(value: &Value) -> DraftResult<Self> {
        match EditableSegment::from_value(value) {
            Ok(seg) => Ok(Self::Editable(seg)),
            Err(_) => Ok(Self::Static(StaticSegment::from_value(value)?)),
        }
    }

    /// The segment's placement on the track, used for ordering and adjacency
    /// regardless of variant.
    pub fn target(&self) -> Timerange {
        match self {
            Self::Editable(seg) => seg.target_timerange,
            Self::Static(seg) => seg.target_timerange,
        }
    }

    /// The editable payload, when this segment has one.
    pub fn as_editable(&self) -> Option<&EditableSegment> {
        match self {
            Self::Editable(seg) => Some(seg),
            Self::Static(_) => None,
        }
    }

    pub fn export_json(&self) -> Value {
        match self {
            Self::Editable(seg) => seg.export_json(),
            Self::Static(seg) => seg.export_json(),
        }
    }

    fn raw_render_index(&self) -> i64 {
        match self {
            Self::Editable(seg) => seg.raw_render_index(),
            Self::Static(seg) => render_index_of(&seg.raw),
        }
    }
}

/// The timing rewrite chosen for one replacement, computed in full against an
/// immutable view of the track before anything is mutated. Applying a plan
/// cannot fail, which is what makes failed calls leave the track untouched.
#[derive(Clone, Copy, Debug)]
struct ResolutionPlan {
    /// New target range for the addressed segment.
    target: Timerange,
    /// Shift applied to every segment after the addressed one. Zero for most
    /// modes; negative for `cut_tail_align`, positive for a colliding
    /// `push_tail`.
    follower_shift: i64,
}

/// An ordered run of segments of one media kind, loaded from a draft.
#[derive(Clone, Debug)]
pub struct Track {
    pub kind: TrackKind,
    pub name: String,
    pub id: String,
    segments: Vec<Segment>,
    /// Full original track descriptor for round-trip.
    raw: Map<String, Value>,
}

impl Track {
    /// Parse a track descriptor of the shape
    /// `{type, name, id, segments: [...]}`.
    pub fn from_value(value: &Value) -> DraftResult<Self> {
        let raw = value
            .as_object()
            .ok_or_else(|| DraftError::serde("track descriptor must be an object"))?
            .clone();
        let type_tag = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DraftError::serde("track descriptor missing type"))?;
        let kind = TrackKind::from_name(type_tag).ok_or_else(|| {
            DraftError::serde(format!("unrecognized track type '{type_tag}'"))
        })?;
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let segments = raw
            .get("segments")
            .and_then(Value::as_array)
            .ok_or_else(|| DraftError::serde("track descriptor missing segments"))?
            .iter()
            .map(Segment::from_value)
            .collect::<DraftResult<Vec<_>>>()?;

        Ok(Self {
            kind,
            name,
            id,
            segments,
            raw,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Track start time: the first segment's start, or 0 when empty.
    pub fn start(&self) -> i64 {
        self.segments.first().map_or(0, |seg| seg.target().start)
    }

    /// Track end time: the last segment's end, or 0 when empty.
    pub fn end(&self) -> i64 {
        self.segments.last().map_or(0, |seg| seg.target().end())
    }

    /// Render order of this track, derived as the maximum over its segments'
    /// own render indices. Read-only; never written back.
    pub fn render_index(&self) -> i64 {
        self.segments
            .iter()
            .map(Segment::raw_render_index)
            .max()
            .unwrap_or(0)
    }

    /// The editable segment at `index`, or an error naming what was found.
    pub fn editable_segment_mut(&mut self, index: usize) -> DraftResult<&mut EditableSegment> {
        let len = self.segments.len();
        match self.segments.get_mut(index) {
            Some(Segment::Editable(seg)) => Ok(seg),
            Some(Segment::Static(_)) => Err(DraftError::invalid_argument(format!(
                "segment {index} of track '{}' is static and cannot be edited",
                self.name
            ))),
            None => Err(DraftError::invalid_argument(format!(
                "segment index {index} out of range for track '{}' with {len} segments",
                self.name
            ))),
        }
    }

    /// Resize the editable segment at `index` to `new_duration` microseconds,
    /// reconciling the change with its neighbors.
    ///
    /// Shrinking applies the single `shrink` mode and always succeeds.
    /// Extending tries the `extend` modes in the order given and commits to
    /// the first that fits; [`ExtendMode::PushTail`] always fits, so placing
    /// it first pre-empts the rest. When no listed mode fits the call fails
    /// with [`DraftError::ExtensionFailed`] and the track is left exactly as
    /// it was.
    ///
    /// On success the addressed segment's `target_timerange` is rewritten and
    /// its `source_timerange` duration is matched to the new length (its
    /// start is never touched). The aligning/pushing modes additionally shift
    /// every following segment's start by the planned amount. Segments
    /// before `index` are never modified.
    pub fn replace_segment_duration(
        &mut self,
        index: usize,
        new_duration: i64,
        shrink: ShrinkMode,
        extend: &[ExtendMode],
    ) -> DraftResult<()> {
        if let Some(plan) = self.plan_resolution(index, new_duration, shrink, extend)? {
            self.apply_plan(index, new_duration, plan);
        }
        Ok(())
    }

    /// Compute the full rewrite without mutating anything. `None` means the
    /// requested duration already holds and nothing is to be done.
    fn plan_resolution(
        &self,
        index: usize,
        new_duration: i64,
        shrink: ShrinkMode,
        extend: &[ExtendMode],
    ) -> DraftResult<Option<ResolutionPlan>> {
        if new_duration < 0 {
            return Err(DraftError::invalid_argument(format!(
                "new_duration must be non-negative, got {new_duration}"
            )));
        }
        let len = self.segments.len();
        let seg = match self.segments.get(index) {
            Some(Segment::Editable(seg)) => seg,
            Some(Segment::Static(_)) => {
                return Err(DraftError::invalid_argument(format!(
                    "segment {index} of track '{}' is static and cannot be edited",
                    self.name
                )));
            }
            None => {
                return Err(DraftError::invalid_argument(format!(
                    "segment index {index} out of range for track '{}' with {len} segments",
                    self.name
                )));
            }
        };

        let current = seg.target_timerange;
        let delta = (new_duration - current.duration).abs();

        if new_duration == current.duration {
            return Ok(None);
        }
        let plan = if new_duration < current.duration {
            self.plan_shrink(current, delta, shrink)
        } else {
            self.plan_extend(index, current, new_duration, delta, extend)?
        };

        if plan.follower_shift != 0 {
            self.ensure_followers_editable(index)?;
        }
        Ok(Some(plan))
    }

    fn plan_shrink(&self, current: Timerange, delta: i64, shrink: ShrinkMode) -> ResolutionPlan {
        debug!(mode = ?shrink, delta, "shrinking segment");
        match shrink {
            ShrinkMode::CutHead => ResolutionPlan {
                target: Timerange::new(current.start + delta, current.duration - delta),
                follower_shift: 0,
            },
            ShrinkMode::CutTail => ResolutionPlan {
                target: Timerange::new(current.start, current.duration - delta),
                follower_shift: 0,
            },
            ShrinkMode::CutTailAlign => ResolutionPlan {
                target: Timerange::new(current.start, current.duration - delta),
                follower_shift: -delta,
            },
            // Floor division: the odd microsecond stays on the trailing side.
            ShrinkMode::Shrink => ResolutionPlan {
                target: Timerange::new(current.start + delta / 2, current.duration - delta),
                follower_shift: 0,
            },
        }
    }

    fn plan_extend(
        &self,
        index: usize,
        current: Timerange,
        new_duration: i64,
        delta: i64,
        extend: &[ExtendMode],
    ) -> DraftResult<ResolutionPlan> {
        let prev_end = if index == 0 {
            0
        } else {
            self.segments[index - 1].target().end()
        };
        let next_start = if index == self.segments.len() - 1 {
            None
        } else {
            Some(self.segments[index + 1].target().start)
        };

        for &mode in extend {
            match mode {
                ExtendMode::ExtendHead => {
                    if current.start - delta >= prev_end {
                        debug!(mode = ?mode, delta, "extending segment");
                        return Ok(ResolutionPlan {
                            target: Timerange::new(current.start - delta, current.duration + delta),
                            follower_shift: 0,
                        });
                    }
                }
                ExtendMode::ExtendTail => {
                    if next_start.is_none_or(|ns| current.end() + delta <= ns) {
                        debug!(mode = ?mode, delta, "extending segment");
                        return Ok(ResolutionPlan {
                            target: Timerange::new(current.start, current.duration + delta),
                            follower_shift: 0,
                        });
                    }
                }
                ExtendMode::PushTail => {
                    let shift = next_start
                        .map_or(0, |ns| (current.end() + delta - ns).max(0));
                    debug!(mode = ?mode, delta, shift, "extending segment");
                    return Ok(ResolutionPlan {
                        target: Timerange::new(current.start, current.duration + delta),
                        follower_shift: shift,
                    });
                }
            }
        }

        Err(DraftError::ExtensionFailed {
            requested: new_duration,
            attempted: extend.to_vec(),
        })
    }

    /// A non-zero follower shift must not touch static segments.
    fn ensure_followers_editable(&self, index: usize) -> DraftResult<()> {
        for (offset, seg) in self.segments[index + 1..].iter().enumerate() {
            if matches!(seg, Segment::Static(_)) {
                return Err(DraftError::invalid_argument(format!(
                    "segment {} of track '{}' is static and cannot be shifted",
                    index + 1 + offset,
                    self.name
                )));
            }
        }
        Ok(())
    }

    fn apply_plan(&mut self, index: usize, new_duration: i64, plan: ResolutionPlan) {
        if let Segment::Editable(seg) = &mut self.segments[index] {
            seg.target_timerange = plan.target;
            seg.source_timerange.duration = new_duration;
        }
        if plan.follower_shift != 0 {
            for seg in &mut self.segments[index + 1..] {
                if let Segment::Editable(follower) = seg {
                    follower.target_timerange.start += plan.follower_shift;
                }
            }
        }
    }

    /// Re-emit the track descriptor with the current segment list merged over
    /// the raw payload; every other field passes through unchanged.
    pub fn export_json(&self) -> Value {
        let mut out = self.raw.clone();
        out.insert(
            "segments".to_string(),
            Value::Array(self.segments.iter().map(Segment::export_json).collect()),
        );
        Value::Object(out)
    }
}
