//! reelsmith lays out narrated vertical videos on a timeline.
//!
//! Two kinds of content are supported:
//!
//! - quiz items: a narrated question with four alternatives, a countdown and an answer reveal
//! - narrated slideshows: one narration spread over crossfading, slowly zooming images
//!
//! The timeline core is pure: given decoded assets and a [`ReelConfig`] it produces an
//! immutable [`ProgramTimeline`]. Fetching images, synthesizing speech and encoding
//! video happen behind the [`AssetProvider`], [`SpeechSynthesizer`] and [`MediaEncoder`]
//! traits.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod assets;
pub(crate) mod composition;
pub(crate) mod config;
pub(crate) mod render;
pub(crate) mod script;
pub(crate) mod timeline;
pub(crate) mod timing;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Point, Size};
pub use crate::foundation::error::{ItemBuildError, ReelError, ReelResult};
pub use crate::foundation::math::{TIME_EPSILON, approx_eq, approx_le};

pub use crate::assets::media::{
    MediaAsset, MediaKind, is_ffprobe_on_path, probe_audio, probe_image,
};
pub use crate::assets::provider::{
    AssetProvider, CommandSynthesizer, DirectoryAssetProvider, ImageRequest, SpeechSynthesizer,
};
pub use crate::composition::composer::{
    ComposedLayers, LayerComposer, QuizContent, StaticOverlays, Z_ALTERNATIVES, Z_ANSWER,
    Z_BACKGROUND, Z_COUNTDOWN, Z_LOGO, Z_TITLE, alternatives_text, countdown_layers,
};
pub use crate::composition::crossfade::{CrossfadeSequencer, cover_fit};
pub use crate::composition::layer::{
    AudioLayer, CaptionRole, CoverFit, Fade, Fit, Placement, VisualContent, VisualLayer,
    ZoomCurve,
};
pub use crate::config::settings::{
    CaptionStyle, EncodeSettings, OptionalAssets, OutputConfig, OverlayLayout, ProgramConfig,
    QuizTiming, ReelConfig, SlideshowConfig, SpeechTemplates,
};
pub use crate::render::boundary::{
    InMemoryEncoder, ManifestAudio, ManifestContent, ManifestItem, ManifestVisual, MediaEncoder,
    RenderManifest, RenderTarget,
};
pub use crate::render::ffmpeg::{FfmpegEncoder, is_ffmpeg_on_path};
pub use crate::script::source::{QuizEntry, Script};
pub use crate::timeline::item::{
    ContentItem, ItemTimeline, ItemTimelineBuilder, NarrationItem, QuizItem, question_speech,
};
pub use crate::timeline::program::{
    ItemFailure, ItemOutcome, PlacedItem, ProgramSequencer, ProgramTimeline, assemble,
};
pub use crate::timing::duration::DurationResolver;
pub use crate::timing::phase::{
    Interval, Phase, PhaseKind, PhaseLength, PhaseSchedule, quiz_phases, schedule,
};
