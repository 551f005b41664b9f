//! Capdraft builds and edits JianYing/CapCut draft documents programmatically.
//!
//! Two workflows share one crate:
//!
//! - **Construction**: start a [`Draft`], register [`Material`]s, place
//!   [`VideoSegment`]s and [`TextSegment`]s, and emit the document.
//! - **Template editing**: import an existing draft, locate a [`Track`], and
//!   swap a segment's material for media of a different natural duration;
//!   [`Track::replace_segment_duration`] reconciles the timeline under a
//!   [`ShrinkMode`] or an ordered list of [`ExtendMode`]s, failing atomically
//!   when no listed mode fits. Fields the crate does not model round-trip
//!   through untouched.
//!
//! All times are microseconds. The crate performs no media I/O: referenced
//! files are never opened or validated.
#![forbid(unsafe_code)]
// the host document shape is emitted as large json! literals
#![recursion_limit = "256"]

pub mod animation;
pub mod clip;
pub mod draft;
pub mod error;
pub mod keyframe;
pub mod material;
pub mod segment;
pub mod template;
pub mod text;
pub mod time;

pub use animation::{Animation, AnimationKind, AnimationMeta, SegmentAnimations};
pub use clip::ClipSettings;
pub use draft::Draft;
pub use error::{DraftError, DraftResult};
pub use keyframe::{Keyframe, KeyframeList, KeyframeProperty};
pub use material::{AudioMaterial, Material, MaterialCatalog, TrackKind, VideoMaterial};
pub use segment::VideoSegment;
pub use template::{EditableSegment, ExtendMode, Segment, ShrinkMode, StaticSegment, Track};
pub use text::{TextSegment, TextStyle};
pub use time::{SEC, Timerange};
