use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Point, Size};

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` in output timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated frame rate; both parts must be non-zero.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::configuration("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::configuration("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Nearest frame boundary for a timeline position in seconds.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }

    /// Frame-accurate `[start, end)` range for a span given in seconds.
    ///
    /// Both edges are rounded independently so adjacent spans that share an edge in
    /// seconds also share it in frames.
    pub fn span_to_frames(self, start_secs: f64, duration_secs: f64) -> FrameRange {
        let start = self.secs_to_frames_round(start_secs);
        let end = self
            .secs_to_frames_round(start_secs + duration_secs)
            .max(start);
        FrameRange {
            start: FrameIndex(start),
            end: FrameIndex(end),
        }
    }
}

/// Output frame size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas size as a `kurbo` size.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}
