use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use crate::foundation::{
    core::{Canvas, Fps},
    error::{ReelError, ReelResult},
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Every tunable consumed by the timeline core, in one place.
///
/// Loaded from JSON (missing fields take their defaults) and checked with
/// [`ReelConfig::validate`] before any item is built.
pub struct ReelConfig {
    /// Output frame geometry and rate.
    pub output: OutputConfig,
    /// Quiz mode phase durations and background motion.
    pub quiz: QuizTiming,
    /// Slideshow mode crossfade and zoom.
    pub slideshow: SlideshowConfig,
    /// Caption typography handed to the renderer.
    pub style: CaptionStyle,
    /// Fixed on-screen coordinates of overlays.
    pub layout: OverlayLayout,
    /// Optional asset files (tick sound, logos).
    pub assets: OptionalAssets,
    /// Phrases used to build narrated and displayed text.
    pub speech: SpeechTemplates,
    /// Batch sequencing behaviour.
    pub program: ProgramConfig,
    /// Parameters handed to the ffmpeg encoder.
    pub encode: EncodeSettings,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Output resolution and frame rate.
pub struct OutputConfig {
    /// Frame width in pixels; must be even.
    pub width: u32,
    /// Frame height in pixels; must be even.
    pub height: u32,
    /// Frames per second of the encoded video.
    pub fps: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 24,
        }
    }
}

impl OutputConfig {
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn frame_rate(&self) -> ReelResult<Fps> {
        Fps::new(self.fps, 1)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Quiz item timing. All values in seconds unless noted.
pub struct QuizTiming {
    /// Silence appended after the question narration before the countdown.
    pub speech_pad_secs: f64,
    /// Countdown length; must be a whole number of seconds (one digit per second).
    pub countdown_secs: f64,
    /// Time the answer is shown while it is narrated.
    pub reveal_secs: f64,
    /// Hold after the reveal before the next item starts.
    pub pause_secs: f64,
    /// Background zoom growth per second: `scale(t) = 1 + zoom_rate * t`.
    pub zoom_rate: f64,
    /// Gaussian blur radius applied to the background image, in pixels.
    pub background_blur_radius: f64,
    /// Gain applied to the countdown tick sound.
    pub tick_volume: f64,
    /// Language tag passed to the speech synthesizer.
    pub language: String,
}

impl Default for QuizTiming {
    fn default() -> Self {
        Self {
            speech_pad_secs: 0.3,
            countdown_secs: 8.0,
            reveal_secs: 4.0,
            pause_secs: 5.0,
            zoom_rate: 0.015,
            background_blur_radius: 4.0,
            tick_volume: 0.6,
            language: "pt".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Slideshow (uniform crossfade) parameters.
pub struct SlideshowConfig {
    /// Fade-in/fade-out length of every image, which is also the overlap between neighbours.
    pub fade_secs: f64,
    /// Scale reached at the end of each image (zoom starts at 1.0).
    pub zoom_factor: f64,
    /// Silence appended to the narration length before splitting it across images.
    pub speech_pad_secs: f64,
    /// Language tag passed to the speech synthesizer.
    pub language: String,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            fade_secs: 1.5,
            zoom_factor: 1.5,
            speech_pad_secs: 0.0,
            language: "pt-br".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Caption typography. The core only forwards these to the renderer.
pub struct CaptionStyle {
    pub font: String,
    pub title_size_px: u32,
    pub alternatives_size_px: u32,
    pub timer_size_px: u32,
    pub answer_size_px: u32,
    pub color: String,
    pub stroke_color: String,
    pub stroke_width_px: u32,
    /// Horizontal margin on each side of wrapped captions.
    pub side_margin_px: u32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: "DejaVu-Sans".to_string(),
            title_size_px: 82,
            alternatives_size_px: 64,
            timer_size_px: 120,
            answer_size_px: 82,
            color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width_px: 2,
            side_margin_px: 80,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Screen coordinates (pixels from the top-left) of quiz overlays.
pub struct OverlayLayout {
    pub title_y: f64,
    pub alternatives_y: f64,
    pub answer_y: f64,
    /// Countdown digits sit this far above the bottom edge.
    pub timer_bottom_offset: f64,
    pub logo_size: f64,
    /// Gap between the two logos.
    pub logo_spacing: f64,
    /// Gap between the logos and the bottom edge.
    pub logo_margin_bottom: f64,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            title_y: 140.0,
            alternatives_y: 420.0,
            answer_y: 1000.0,
            timer_bottom_offset: 300.0,
            logo_size: 150.0,
            logo_spacing: 60.0,
            logo_margin_bottom: 40.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Optional asset files. Missing files silently drop the matching layer.
pub struct OptionalAssets {
    /// Looping tick sound played during the countdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<PathBuf>,
    /// Left and right footer logos; both must exist for either to show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logos: Option<[PathBuf; 2]>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Phrases wrapped around script text.
pub struct SpeechTemplates {
    pub question_prefix: String,
    pub alternatives_prefix: String,
    /// Spoken before the correct answer.
    pub answer_prefix: String,
    /// Shown before the correct answer on screen.
    pub answer_caption_prefix: String,
}

impl Default for SpeechTemplates {
    fn default() -> Self {
        Self {
            question_prefix: "Pergunta".to_string(),
            alternatives_prefix: "Alternativas".to_string(),
            answer_prefix: "A resposta correta é".to_string(),
            answer_caption_prefix: "Resposta".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Batch sequencing options.
pub struct ProgramConfig {
    /// Overlap between consecutive items (0 places them back to back).
    pub item_overlap_secs: f64,
    /// Build items on a rayon pool; output order is unchanged.
    pub parallel: bool,
    /// Worker count for the parallel pool (default: rayon's choice).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Video/audio encoder parameters.
pub struct EncodeSettings {
    /// Executable to invoke.
    pub ffmpeg: String,
    pub video_codec: String,
    pub preset: String,
    /// Constant rate factor (lower is better quality).
    pub crf: u8,
    pub pixel_format: String,
    pub audio_codec: String,
    pub threads: u32,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 18,
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            threads: 4,
            overwrite: true,
        }
    }
}

impl ReelConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse configuration JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::configuration(format!("open configuration '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Precondition check for impossible parameters.
    pub fn validate(&self) -> ReelResult<()> {
        let out = &self.output;
        if out.width == 0 || out.height == 0 {
            return Err(ReelError::configuration(
                "output width/height must be > 0",
            ));
        }
        if !out.width.is_multiple_of(2) || !out.height.is_multiple_of(2) {
            return Err(ReelError::configuration(
                "output width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        out.frame_rate()?;

        let q = &self.quiz;
        non_negative("quiz.speech_pad_secs", q.speech_pad_secs)?;
        positive("quiz.countdown_secs", q.countdown_secs)?;
        if q.countdown_secs.fract() != 0.0 {
            return Err(ReelError::configuration(format!(
                "quiz.countdown_secs must be a whole number of seconds, got {}",
                q.countdown_secs
            )));
        }
        positive("quiz.reveal_secs", q.reveal_secs)?;
        positive("quiz.pause_secs", q.pause_secs)?;
        non_negative("quiz.zoom_rate", q.zoom_rate)?;
        non_negative("quiz.background_blur_radius", q.background_blur_radius)?;
        non_negative("quiz.tick_volume", q.tick_volume)?;
        non_empty("quiz.language", &q.language)?;

        let s = &self.slideshow;
        non_negative("slideshow.fade_secs", s.fade_secs)?;
        if !s.zoom_factor.is_finite() || s.zoom_factor < 1.0 {
            return Err(ReelError::configuration(
                "slideshow.zoom_factor must be finite and >= 1",
            ));
        }
        non_negative("slideshow.speech_pad_secs", s.speech_pad_secs)?;
        non_empty("slideshow.language", &s.language)?;

        if u64::from(self.style.side_margin_px) * 2 >= u64::from(out.width) {
            return Err(ReelError::configuration(
                "style.side_margin_px leaves no room for captions",
            ));
        }

        let l = &self.layout;
        for (name, v) in [
            ("layout.title_y", l.title_y),
            ("layout.alternatives_y", l.alternatives_y),
            ("layout.answer_y", l.answer_y),
            ("layout.timer_bottom_offset", l.timer_bottom_offset),
            ("layout.logo_spacing", l.logo_spacing),
            ("layout.logo_margin_bottom", l.logo_margin_bottom),
        ] {
            non_negative(name, v)?;
        }
        positive("layout.logo_size", l.logo_size)?;
        if l.logo_size * 2.0 + l.logo_spacing > f64::from(out.width) {
            return Err(ReelError::configuration(
                "logo pair is wider than the output frame",
            ));
        }

        non_negative("program.item_overlap_secs", self.program.item_overlap_secs)?;
        if self.program.threads == Some(0) {
            return Err(ReelError::configuration(
                "program.threads must be >= 1 when set",
            ));
        }

        let e = &self.encode;
        non_empty("encode.ffmpeg", &e.ffmpeg)?;
        non_empty("encode.video_codec", &e.video_codec)?;
        non_empty("encode.audio_codec", &e.audio_codec)?;
        if e.crf > 51 {
            return Err(ReelError::configuration("encode.crf must be in 0..=51"));
        }
        Ok(())
    }
}

fn positive(field: &str, v: f64) -> ReelResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(ReelError::configuration(format!(
            "{field} must be finite and > 0"
        )));
    }
    Ok(())
}

fn non_negative(field: &str, v: f64) -> ReelResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(ReelError::configuration(format!(
            "{field} must be finite and >= 0"
        )));
    }
    Ok(())
}

fn non_empty(field: &str, v: &str) -> ReelResult<()> {
    if v.trim().is_empty() {
        return Err(ReelError::configuration(format!("{field} must be non-empty")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
