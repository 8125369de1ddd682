use std::{fs::File, io::BufWriter, path::Path, path::PathBuf};

use crate::{
    composition::layer::{
        AudioLayer, CaptionRole, Fade, Fit, Placement, VisualContent, VisualLayer, ZoomCurve,
    },
    foundation::{
        core::{Canvas, Fps, FrameRange},
        error::{ReelError, ReelResult},
    },
    timeline::program::{ItemFailure, ProgramTimeline},
};

/// Where and how a program is encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTarget {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Output media file.
    pub out_path: PathBuf,
}

/// Consumer of a finished program at the edge of the timeline core.
///
/// Called once per run with the complete program; implementations own all pixel
/// and sample work.
pub trait MediaEncoder: Send {
    fn encode(&mut self, program: &ProgramTimeline, target: &RenderTarget) -> ReelResult<()>;
}

/// Encoder that only records what it was asked to encode. Used by tests and `--dry-run`.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    pub(crate) runs: Vec<(RenderTarget, ProgramTimeline)>,
}

impl InMemoryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow every captured `(target, program)` pair in call order.
    pub fn runs(&self) -> &[(RenderTarget, ProgramTimeline)] {
        &self.runs
    }
}

impl MediaEncoder for InMemoryEncoder {
    fn encode(&mut self, program: &ProgramTimeline, target: &RenderTarget) -> ReelResult<()> {
        self.runs.push((target.clone(), program.clone()));
        Ok(())
    }
}

/// Frame-quantized, serializable snapshot of a program.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderManifest {
    pub canvas: Canvas,
    pub fps: Fps,
    pub total_duration: f64,
    pub total_frames: u64,
    pub items: Vec<ManifestItem>,
    pub visual: Vec<ManifestVisual>,
    pub audio: Vec<ManifestAudio>,
    pub failures: Vec<ItemFailure>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ManifestItem {
    pub index: usize,
    pub label: String,
    pub offset: f64,
    pub duration: f64,
    pub frames: FrameRange,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ManifestContent {
    Image {
        source: PathBuf,
        blur_radius: f64,
        fit: Fit,
    },
    Caption {
        text: String,
        role: CaptionRole,
        #[serde(skip_serializing_if = "Option::is_none")]
        wrap_width: Option<f64>,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ManifestVisual {
    pub id: String,
    pub z: i32,
    pub start: f64,
    pub duration: f64,
    pub frames: FrameRange,
    pub content: ManifestContent,
    pub placement: Placement,
    pub zoom: ZoomCurve,
    pub fade: Fade,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ManifestAudio {
    pub id: String,
    pub source: PathBuf,
    pub start: f64,
    pub duration: f64,
    pub frames: FrameRange,
    pub volume: f64,
    pub looped: bool,
}

impl RenderManifest {
    pub fn from_program(program: &ProgramTimeline, canvas: Canvas, fps: Fps) -> Self {
        let items = program
            .items()
            .iter()
            .map(|p| ManifestItem {
                index: p.timeline.index(),
                label: p.timeline.label().to_string(),
                offset: p.offset,
                duration: p.timeline.total_duration(),
                frames: fps.span_to_frames(p.offset, p.timeline.total_duration()),
            })
            .collect();
        Self {
            canvas,
            fps,
            total_duration: program.total_duration(),
            total_frames: fps.secs_to_frames_round(program.total_duration()),
            items,
            visual: program
                .visual_layers()
                .iter()
                .map(|l| visual_entry(l, fps))
                .collect(),
            audio: program
                .audio_layers()
                .iter()
                .map(|l| audio_entry(l, fps))
                .collect(),
            failures: program.failures().to_vec(),
        }
    }

    pub fn to_json_pretty(&self) -> ReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> ReelResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            ReelError::render(format!("create manifest '{}': {e}", path.display()))
        })?;
        serde_json::to_writer_pretty(BufWriter::new(f), self)?;
        Ok(())
    }
}

fn visual_entry(layer: &VisualLayer, fps: Fps) -> ManifestVisual {
    let content = match &layer.content {
        VisualContent::Image {
            asset,
            blur_radius,
            fit,
        } => ManifestContent::Image {
            source: asset.source.clone(),
            blur_radius: *blur_radius,
            fit: *fit,
        },
        VisualContent::Caption {
            text,
            role,
            wrap_width,
        } => ManifestContent::Caption {
            text: text.clone(),
            role: *role,
            wrap_width: *wrap_width,
        },
    };
    ManifestVisual {
        id: layer.id.clone(),
        z: layer.z,
        start: layer.start,
        duration: layer.duration,
        frames: layer.frames(fps),
        content,
        placement: layer.placement,
        zoom: layer.zoom,
        fade: layer.fade,
    }
}

fn audio_entry(layer: &AudioLayer, fps: Fps) -> ManifestAudio {
    ManifestAudio {
        id: layer.id.clone(),
        source: layer.asset.source.clone(),
        start: layer.start,
        duration: layer.duration,
        frames: layer.frames(fps),
        volume: layer.volume,
        looped: layer.looped,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/boundary.rs"]
mod tests;
