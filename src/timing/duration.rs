use crate::{
    assets::media::MediaAsset,
    foundation::error::{ReelError, ReelResult},
};

/// Turns a narration asset into the length of the phase it drives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DurationResolver {
    pad_secs: f64,
}

impl Default for DurationResolver {
    fn default() -> Self {
        Self { pad_secs: 0.3 }
    }
}

impl DurationResolver {
    pub fn new(pad_secs: f64) -> Self {
        Self { pad_secs }
    }

    /// Play length of `asset` plus the trailing pad.
    pub fn resolve(&self, asset: &MediaAsset) -> ReelResult<f64> {
        if !asset.is_audio() {
            return Err(ReelError::asset_unavailable(format!(
                "'{}' is not an audio asset",
                asset.source.display()
            )));
        }
        let raw = asset.duration_secs.ok_or_else(|| {
            ReelError::invalid_duration(format!(
                "audio '{}' has no known duration",
                asset.source.display()
            ))
        })?;
        if !raw.is_finite() || raw <= 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "audio '{}' has non-positive duration {raw}",
                asset.source.display()
            )));
        }
        Ok(raw + self.pad_secs)
    }
}
