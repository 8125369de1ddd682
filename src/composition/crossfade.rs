use std::sync::Arc;

use crate::{
    assets::media::MediaAsset,
    composition::layer::{CoverFit, Fade, Fit, Placement, VisualContent, VisualLayer, ZoomCurve},
    foundation::{
        core::{Canvas, Point, Size},
        error::{ReelError, ReelResult},
    },
};

/// Scale `source` to cover `frame` without letterboxing and center the crop window.
///
/// Images wider than the frame's aspect ratio match its height; taller ones match its width.
pub fn cover_fit(source: Size, frame: Size) -> ReelResult<CoverFit> {
    if !(source.width > 0.0 && source.height > 0.0) {
        return Err(ReelError::asset_unavailable(format!(
            "image has unusable size {}x{}",
            source.width, source.height
        )));
    }
    let src_ratio = source.width / source.height;
    let frame_ratio = frame.width / frame.height;

    let scaled = if src_ratio > frame_ratio {
        Size::new((frame.height * src_ratio).floor().max(frame.width), frame.height)
    } else {
        Size::new(frame.width, (frame.width / src_ratio).floor().max(frame.height))
    };
    Ok(CoverFit {
        scaled,
        crop_origin: Point::new(
            ((scaled.width - frame.width) / 2.0).floor(),
            ((scaled.height - frame.height) / 2.0).floor(),
        ),
    })
}

/// Spreads one narration evenly over still images that cross-dissolve into each other.
///
/// Every image after the first starts `fade` seconds before its predecessor ends and
/// lasts `fade` seconds longer, so the fades overlap while the last image still ends
/// exactly when the narration does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossfadeSequencer {
    canvas: Canvas,
    fade: f64,
    zoom_factor: f64,
}

impl CrossfadeSequencer {
    pub fn new(canvas: Canvas, fade: f64, zoom_factor: f64) -> Self {
        Self {
            canvas,
            fade,
            zoom_factor,
        }
    }

    /// Share of the narration each image nominally owns.
    pub fn nominal_duration(&self, image_count: usize, narration: f64) -> ReelResult<f64> {
        if image_count == 0 {
            return Err(ReelError::configuration("slideshow needs at least one image"));
        }
        if !narration.is_finite() || narration <= 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "narration has non-positive duration {narration}"
            )));
        }
        Ok(narration / image_count as f64)
    }

    #[tracing::instrument(skip(self, images), fields(images = images.len()))]
    pub fn sequence(
        &self,
        images: &[Arc<MediaAsset>],
        narration: f64,
    ) -> ReelResult<Vec<VisualLayer>> {
        let nominal = self.nominal_duration(images.len(), narration)?;
        if !self.fade.is_finite() || self.fade < 0.0 {
            return Err(ReelError::configuration(format!(
                "fade must be finite and >= 0, got {}",
                self.fade
            )));
        }
        if !self.zoom_factor.is_finite() || self.zoom_factor < 1.0 {
            return Err(ReelError::configuration(format!(
                "zoom factor must be finite and >= 1, got {}",
                self.zoom_factor
            )));
        }
        if self.fade * 2.0 > nominal {
            return Err(ReelError::configuration(format!(
                "fades of {}s on both ends exceed the {nominal:.3}s share of each of {} images",
                self.fade,
                images.len()
            )));
        }

        let frame = self.canvas.size();
        let mut layers = Vec::with_capacity(images.len());
        let mut prev_end = 0.0;
        for (i, asset) in images.iter().enumerate() {
            let size = asset.pixel_size.ok_or_else(|| {
                ReelError::asset_unavailable(format!(
                    "'{}' is not a decoded image",
                    asset.source.display()
                ))
            })?;
            let (start, duration) = if i == 0 {
                (0.0, nominal)
            } else {
                (prev_end - self.fade, nominal + self.fade)
            };
            layers.push(
                VisualLayer::new(
                    format!("slide-{i}"),
                    VisualContent::Image {
                        asset: asset.clone(),
                        blur_radius: 0.0,
                        fit: Fit::Cover(cover_fit(size, frame)?),
                    },
                    start,
                    duration,
                )
                .with_z(i as i32)
                .with_placement(Placement::Fill)
                .with_zoom(ZoomCurve::Ramp {
                    to: self.zoom_factor,
                    over: duration,
                })
                .with_fade(Fade::symmetric(self.fade)),
            );
            prev_end = start + duration;
        }
        Ok(layers)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/crossfade.rs"]
mod tests;
