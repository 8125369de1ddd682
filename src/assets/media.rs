use std::path::{Path, PathBuf};

use crate::foundation::{
    core::Size,
    error::{ReelError, ReelResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Broad kind of a decoded media resource.
pub enum MediaKind {
    /// Still image.
    Image,
    /// Audio clip.
    Audio,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Handle to a decoded image or audio resource.
///
/// Assets are shared between layers through `Arc<MediaAsset>` and never change after
/// creation; the underlying file is only read again by the encoder.
pub struct MediaAsset {
    /// Image or audio.
    pub kind: MediaKind,
    /// File backing this asset.
    pub source: PathBuf,
    /// Play length in seconds (audio only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    /// Pixel dimensions (image only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_size: Option<Size>,
}

impl MediaAsset {
    /// Describe an already-decoded audio clip.
    pub fn audio(source: impl Into<PathBuf>, duration_secs: f64) -> Self {
        Self {
            kind: MediaKind::Audio,
            source: source.into(),
            duration_secs: Some(duration_secs),
            pixel_size: None,
        }
    }

    /// Describe an already-decoded image.
    pub fn image(source: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            kind: MediaKind::Image,
            source: source.into(),
            duration_secs: None,
            pixel_size: Some(Size::new(f64::from(width), f64::from(height))),
        }
    }

    pub fn is_audio(&self) -> bool {
        self.kind == MediaKind::Audio
    }

    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }
}

/// Read image dimensions without decoding the full pixel buffer.
pub fn probe_image(path: &Path) -> ReelResult<MediaAsset> {
    let (w, h) = image::image_dimensions(path).map_err(|e| {
        ReelError::asset_unavailable(format!("read image '{}': {e}", path.display()))
    })?;
    if w == 0 || h == 0 {
        return Err(ReelError::asset_unavailable(format!(
            "image '{}' has zero size",
            path.display()
        )));
    }
    Ok(MediaAsset::image(path, w, h))
}

/// Probe the play length of an audio file with the system `ffprobe`.
pub fn probe_audio(path: &Path) -> ReelResult<MediaAsset> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    if !path.is_file() {
        return Err(ReelError::asset_unavailable(format!(
            "audio file '{}' does not exist",
            path.display()
        )));
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| ReelError::asset_unavailable(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::asset_unavailable(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::serde(format!("ffprobe json parse failed: {e}")))?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            ReelError::asset_unavailable(format!(
                "ffprobe reported no duration for '{}'",
                path.display()
            ))
        })?;

    Ok(MediaAsset::audio(path, duration_secs))
}

pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
