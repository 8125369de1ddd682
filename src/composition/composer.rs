use std::sync::Arc;

use crate::{
    assets::media::{self, MediaAsset},
    composition::{
        crossfade::cover_fit,
        layer::{
            AudioLayer, CaptionRole, Fit, Placement, VisualContent, VisualLayer, ZoomCurve,
        },
    },
    config::settings::{OptionalAssets, ReelConfig},
    foundation::{
        core::{Point, Size},
        error::{ReelError, ReelResult},
    },
    timing::{
        duration::DurationResolver,
        phase::{PhaseKind, PhaseSchedule},
    },
};

pub const Z_BACKGROUND: i32 = 0;
pub const Z_TITLE: i32 = 10;
pub const Z_ALTERNATIVES: i32 = 11;
pub const Z_COUNTDOWN: i32 = 20;
pub const Z_ANSWER: i32 = 30;
pub const Z_LOGO: i32 = 40;

/// Overlays shared by every quiz item. Each one is optional.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticOverlays {
    /// Left and right footer logos; only used when both loaded.
    pub logos: Option<[Arc<MediaAsset>; 2]>,
    /// Countdown tick sound.
    pub tick: Option<Arc<MediaAsset>>,
}

impl StaticOverlays {
    /// Load whatever optional assets exist; anything missing or unreadable is skipped.
    pub fn load(paths: &OptionalAssets) -> Self {
        let logos = paths.logos.as_ref().and_then(|[left, right]| {
            match (media::probe_image(left), media::probe_image(right)) {
                (Ok(l), Ok(r)) => Some([Arc::new(l), Arc::new(r)]),
                (l, r) => {
                    tracing::debug!(
                        left_ok = l.is_ok(),
                        right_ok = r.is_ok(),
                        "logo pair incomplete; logos omitted"
                    );
                    None
                }
            }
        });
        let tick = paths
            .tick
            .as_ref()
            .and_then(|p| match media::probe_audio(p) {
                Ok(a) => Some(Arc::new(a)),
                Err(e) => {
                    tracing::debug!(error = %e, "tick sound unavailable; omitted");
                    None
                }
            });
        Self { logos, tick }
    }
}

/// Per-item inputs to the quiz layer composer.
#[derive(Clone, Debug)]
pub struct QuizContent<'a> {
    pub question: &'a str,
    pub alternatives: &'a [String; 4],
    pub answer: &'a str,
    pub background: Arc<MediaAsset>,
    /// Narration of the question and alternatives (required).
    pub question_audio: Option<Arc<MediaAsset>>,
    /// Narration of the answer (required).
    pub answer_audio: Option<Arc<MediaAsset>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Visual and audio layers of one item, in z/insertion order.
pub struct ComposedLayers {
    pub visual: Vec<VisualLayer>,
    pub audio: Vec<AudioLayer>,
}

/// Maps a quiz phase schedule and overlays onto concrete layers.
pub struct LayerComposer<'a> {
    config: &'a ReelConfig,
}

impl<'a> LayerComposer<'a> {
    pub fn new(config: &'a ReelConfig) -> Self {
        Self { config }
    }

    pub fn compose(
        &self,
        schedule: &PhaseSchedule,
        overlays: &StaticOverlays,
        content: &QuizContent<'_>,
    ) -> ReelResult<ComposedLayers> {
        let question_audio = content
            .question_audio
            .clone()
            .ok_or_else(|| ReelError::asset_unavailable("question narration is missing"))?;
        let answer_audio = content
            .answer_audio
            .clone()
            .ok_or_else(|| ReelError::asset_unavailable("answer narration is missing"))?;

        let total = schedule.total_duration();
        let countdown = schedule.require(PhaseKind::Countdown)?;
        let reveal = schedule.require(PhaseKind::AnswerReveal)?;
        let answer_span = total - reveal.start;

        let cfg = self.config;
        let canvas = cfg.output.canvas();
        let layout = &cfg.layout;
        let wrap = Some(f64::from(canvas.width) - 2.0 * f64::from(cfg.style.side_margin_px));

        let mut visual = Vec::new();

        let bg_fit = match content.background.pixel_size {
            Some(size) => Fit::Cover(cover_fit(size, canvas.size())?),
            None => Fit::Exact(canvas.size()),
        };
        visual.push(
            VisualLayer::new(
                "background",
                VisualContent::Image {
                    asset: content.background.clone(),
                    blur_radius: cfg.quiz.background_blur_radius,
                    fit: bg_fit,
                },
                0.0,
                total,
            )
            .with_z(Z_BACKGROUND)
            .with_zoom(ZoomCurve::Linear {
                rate: cfg.quiz.zoom_rate,
            }),
        );

        visual.push(
            VisualLayer::new(
                "title",
                VisualContent::Caption {
                    text: content.question.to_string(),
                    role: CaptionRole::Title,
                    wrap_width: wrap,
                },
                0.0,
                total,
            )
            .with_z(Z_TITLE)
            .with_placement(Placement::CenteredAt { y: layout.title_y }),
        );

        visual.push(
            VisualLayer::new(
                "alternatives",
                VisualContent::Caption {
                    text: alternatives_text(content.alternatives),
                    role: CaptionRole::Alternatives,
                    wrap_width: wrap,
                },
                0.0,
                total,
            )
            .with_z(Z_ALTERNATIVES)
            .with_placement(Placement::CenteredAt {
                y: layout.alternatives_y,
            }),
        );

        let timer_y = f64::from(canvas.height) - layout.timer_bottom_offset;
        visual.extend(
            countdown_layers(countdown.duration, timer_y)?
                .iter()
                .map(|l| l.shifted(countdown.start)),
        );

        visual.push(
            VisualLayer::new(
                "answer",
                VisualContent::Caption {
                    text: format!("{}: {}", cfg.speech.answer_caption_prefix, content.answer),
                    role: CaptionRole::Answer,
                    wrap_width: wrap,
                },
                reveal.start,
                answer_span,
            )
            .with_z(Z_ANSWER)
            .with_placement(Placement::CenteredAt { y: layout.answer_y }),
        );

        match &overlays.logos {
            Some([left, right]) => {
                let size = layout.logo_size;
                let pair_width = size * 2.0 + layout.logo_spacing;
                let x0 = ((f64::from(canvas.width) - pair_width) / 2.0).floor();
                let y = f64::from(canvas.height) - size - layout.logo_margin_bottom;
                for (i, (asset, x)) in [(left, x0), (right, x0 + size + layout.logo_spacing)]
                    .into_iter()
                    .enumerate()
                {
                    visual.push(
                        VisualLayer::new(
                            format!("logo-{i}"),
                            VisualContent::Image {
                                asset: asset.clone(),
                                blur_radius: 0.0,
                                fit: Fit::Exact(Size::new(size, size)),
                            },
                            0.0,
                            total,
                        )
                        .with_z(Z_LOGO + i as i32)
                        .with_placement(Placement::At(Point::new(x, y))),
                    );
                }
            }
            None => tracing::debug!("no logo pair; footer omitted"),
        }

        let plain_len = DurationResolver::new(0.0);
        let mut audio = vec![AudioLayer::new(
            "question-speech",
            question_audio.clone(),
            0.0,
            plain_len.resolve(&question_audio)?.min(total),
        )];
        audio.push(AudioLayer::new(
            "answer-speech",
            answer_audio.clone(),
            reveal.start,
            plain_len.resolve(&answer_audio)?.min(answer_span),
        ));
        match &overlays.tick {
            Some(tick) => match tick.duration_secs {
                Some(len) if len.is_finite() && len > 0.0 => audio.push(
                    AudioLayer::new("tick", tick.clone(), countdown.start, countdown.duration)
                        .with_volume(cfg.quiz.tick_volume)
                        .looped(len < countdown.duration),
                ),
                _ => tracing::debug!("tick sound has no usable duration; omitted"),
            },
            None => tracing::debug!("no tick sound configured"),
        }

        Ok(ComposedLayers { visual, audio })
    }
}

/// One-second digit layers counting down from `duration` to 1, starting at 0.
pub fn countdown_layers(duration: f64, y: f64) -> ReelResult<Vec<VisualLayer>> {
    if !duration.is_finite() || duration < 1.0 || duration.fract() != 0.0 {
        return Err(ReelError::configuration(format!(
            "countdown must be a whole number of seconds >= 1, got {duration}"
        )));
    }
    let steps = duration as u32;
    Ok((1..=steps)
        .rev()
        .enumerate()
        .map(|(slot, digit)| {
            VisualLayer::new(
                format!("countdown-{digit}"),
                VisualContent::Caption {
                    text: digit.to_string(),
                    role: CaptionRole::Countdown,
                    wrap_width: None,
                },
                slot as f64,
                1.0,
            )
            .with_z(Z_COUNTDOWN)
            .with_placement(Placement::CenteredAt { y })
        })
        .collect())
}

pub fn alternatives_text(alternatives: &[String; 4]) -> String {
    alternatives
        .iter()
        .zip(['a', 'b', 'c', 'd'])
        .map(|(text, label)| format!("{label}) {text}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "../../tests/unit/composition/composer.rs"]
mod tests;
