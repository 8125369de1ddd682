use std::sync::Arc;

use crate::{
    assets::media::MediaAsset,
    foundation::core::{Fps, FrameRange, Point, Size},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Which caption slot a text layer fills; selects font size in the renderer.
pub enum CaptionRole {
    Title,
    Alternatives,
    Countdown,
    Answer,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Cover scaling of an image onto the output frame.
pub struct CoverFit {
    /// Image size after scaling; at least as large as the frame on both axes.
    pub scaled: Size,
    /// Top-left of the centered crop window inside the scaled image.
    pub crop_origin: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// How an image is sized before placement.
pub enum Fit {
    /// Fill the frame, cropping the overflowing edge.
    Cover(CoverFit),
    /// Resize to an exact box.
    Exact(Size),
}

#[derive(Clone, Debug, PartialEq)]
/// What a visual layer draws.
pub enum VisualContent {
    /// A still image.
    Image {
        asset: Arc<MediaAsset>,
        /// Gaussian blur radius in pixels (0 = sharp).
        blur_radius: f64,
        fit: Fit,
    },
    /// Outlined caption text.
    Caption {
        text: String,
        role: CaptionRole,
        /// Wrap width in pixels; `None` renders a single label line.
        wrap_width: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Where a visual layer sits on screen.
pub enum Placement {
    /// Covers the whole frame, centered.
    Fill,
    /// Horizontally centered, top edge at `y`.
    CenteredAt { y: f64 },
    /// Top-left corner at a fixed point.
    At(Point),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Continuous scale of a layer as a function of its local time.
pub enum ZoomCurve {
    #[default]
    None,
    /// `1 + rate * t`, unbounded.
    Linear { rate: f64 },
    /// From 1.0 at `t = 0` to `to` at `t = over`, linear, held afterwards.
    Ramp { to: f64, over: f64 },
}

impl ZoomCurve {
    pub fn scale_at(self, t: f64) -> f64 {
        match self {
            Self::None => 1.0,
            Self::Linear { rate } => 1.0 + rate * t.max(0.0),
            Self::Ramp { to, over } => {
                if over <= 0.0 {
                    return to;
                }
                1.0 + (to - 1.0) * (t / over).clamp(0.0, 1.0)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
/// Linear opacity ramps at both ends of a layer.
pub struct Fade {
    pub fade_in: f64,
    pub fade_out: f64,
}

impl Fade {
    pub fn symmetric(secs: f64) -> Self {
        Self {
            fade_in: secs,
            fade_out: secs,
        }
    }

    /// Opacity in `[0, 1]` at local time `t` of a layer lasting `duration`.
    pub fn opacity_at(self, t: f64, duration: f64) -> f64 {
        let mut alpha: f64 = 1.0;
        if self.fade_in > 0.0 {
            alpha = alpha.min(t / self.fade_in);
        }
        if self.fade_out > 0.0 {
            alpha = alpha.min((duration - t) / self.fade_out);
        }
        alpha.clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A visual element placed on a timeline.
pub struct VisualLayer {
    /// Stable identifier within an item (`"background"`, `"countdown-3"`, ...).
    pub id: String,
    pub content: VisualContent,
    /// Offset from the start of the owning timeline, in seconds.
    pub start: f64,
    pub duration: f64,
    /// Stacking order; higher draws on top.
    pub z: i32,
    pub placement: Placement,
    pub zoom: ZoomCurve,
    pub fade: Fade,
}

impl VisualLayer {
    pub fn new(id: impl Into<String>, content: VisualContent, start: f64, duration: f64) -> Self {
        Self {
            id: id.into(),
            content,
            start,
            duration,
            z: 0,
            placement: Placement::Fill,
            zoom: ZoomCurve::None,
            fade: Fade::default(),
        }
    }

    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_zoom(mut self, zoom: ZoomCurve) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_fade(mut self, fade: Fade) -> Self {
        self.fade = fade;
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Copy of this layer moved `offset` seconds later.
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            start: self.start + offset,
            ..self.clone()
        }
    }

    pub fn frames(&self, fps: Fps) -> FrameRange {
        fps.span_to_frames(self.start, self.duration)
    }

    /// Scale at absolute timeline time `t`.
    pub fn scale_at(&self, t: f64) -> f64 {
        self.zoom.scale_at(t - self.start)
    }

    /// Opacity at absolute timeline time `t`; zero outside the layer.
    pub fn opacity_at(&self, t: f64) -> f64 {
        if t < self.start || t >= self.end() {
            return 0.0;
        }
        self.fade.opacity_at(t - self.start, self.duration)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// An audio element placed on a timeline.
pub struct AudioLayer {
    pub id: String,
    pub asset: Arc<MediaAsset>,
    pub start: f64,
    /// Playing time on the timeline; shorter than the asset truncates it.
    pub duration: f64,
    /// Linear gain.
    pub volume: f64,
    /// Repeat the asset back to back until `duration` is filled.
    pub looped: bool,
}

impl AudioLayer {
    pub fn new(id: impl Into<String>, asset: Arc<MediaAsset>, start: f64, duration: f64) -> Self {
        Self {
            id: id.into(),
            asset,
            start,
            duration,
            volume: 1.0,
            looped: false,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            start: self.start + offset,
            ..self.clone()
        }
    }

    pub fn frames(&self, fps: Fps) -> FrameRange {
        fps.span_to_frames(self.start, self.duration)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/layer.rs"]
mod tests;
