use std::collections::BTreeMap;

use crate::{
    assets::provider::{AssetProvider, ImageRequest, SpeechSynthesizer},
    composition::{
        composer::{LayerComposer, QuizContent, StaticOverlays},
        crossfade::CrossfadeSequencer,
        layer::{AudioLayer, VisualLayer},
    },
    config::settings::ReelConfig,
    foundation::{
        error::{ItemBuildError, ReelError, ReelResult},
        math::approx_le,
    },
    timing::{
        duration::DurationResolver,
        phase::{PhaseKind, quiz_phases, schedule},
    },
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One quiz question with four alternatives.
pub struct QuizItem {
    pub question: String,
    /// Alternatives in display order (labeled a to d).
    pub alternatives: [String; 4],
    /// Text of the correct answer.
    pub answer: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A narration shown over a crossfading image slideshow.
pub struct NarrationItem {
    pub text: String,
    /// Number of images to spread the narration over.
    pub image_count: usize,
    /// Subject hint forwarded to the asset provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Unit of work for the item timeline builder.
pub enum ContentItem {
    Quiz(QuizItem),
    Narration(NarrationItem),
}

impl ContentItem {
    /// Short human-readable name used in diagnostics.
    pub fn label(&self) -> String {
        let text = match self {
            Self::Quiz(q) => &q.question,
            Self::Narration(n) => &n.text,
        };
        let mut label: String = text.chars().take(40).collect();
        if text.chars().count() > 40 {
            label.push('…');
        }
        label
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Complete, self-contained layout of one content item on its local time axis.
pub struct ItemTimeline {
    index: usize,
    label: String,
    visual: Vec<VisualLayer>,
    audio: Vec<AudioLayer>,
    total_duration: f64,
}

impl ItemTimeline {
    /// Assemble a timeline, checking that every layer fits inside `[0, total_duration]`.
    ///
    /// Visual layers are stably sorted by z so the first layer is painted first.
    pub fn new(
        index: usize,
        label: impl Into<String>,
        mut visual: Vec<VisualLayer>,
        audio: Vec<AudioLayer>,
        total_duration: f64,
    ) -> ReelResult<Self> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "item duration must be > 0, got {total_duration}"
            )));
        }
        let spans = visual
            .iter()
            .map(|l| (&l.id, l.start, l.end()))
            .chain(audio.iter().map(|l| (&l.id, l.start, l.end())));
        for (id, start, end) in spans {
            if start < 0.0 || !approx_le(end, total_duration) {
                return Err(ReelError::invalid_duration(format!(
                    "layer '{id}' spans [{start}, {end}) outside item of {total_duration}s"
                )));
            }
        }
        visual.sort_by_key(|l| l.z);
        Ok(Self {
            index,
            label: label.into(),
            visual,
            audio,
            total_duration,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn visual(&self) -> &[VisualLayer] {
        &self.visual
    }

    pub fn audio(&self) -> &[AudioLayer] {
        &self.audio
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }
}

/// Builds one [`ItemTimeline`] per content item, all-or-nothing.
#[derive(Clone, Copy)]
pub struct ItemTimelineBuilder<'a> {
    config: &'a ReelConfig,
    provider: &'a dyn AssetProvider,
    synthesizer: &'a dyn SpeechSynthesizer,
    overlays: &'a StaticOverlays,
}

impl<'a> ItemTimelineBuilder<'a> {
    pub fn new(
        config: &'a ReelConfig,
        provider: &'a dyn AssetProvider,
        synthesizer: &'a dyn SpeechSynthesizer,
        overlays: &'a StaticOverlays,
    ) -> Self {
        Self {
            config,
            provider,
            synthesizer,
            overlays,
        }
    }

    #[tracing::instrument(skip(self, item), fields(label = %item.label()))]
    pub fn build(&self, index: usize, item: &ContentItem) -> Result<ItemTimeline, ItemBuildError> {
        let built = match item {
            ContentItem::Quiz(quiz) => self.build_quiz(index, quiz, item.label()),
            ContentItem::Narration(narration) => {
                self.build_narration(index, narration, item.label())
            }
        };
        built.map_err(|cause| ItemBuildError::new(index, cause))
    }

    fn build_quiz(&self, index: usize, quiz: &QuizItem, label: String) -> ReelResult<ItemTimeline> {
        let cfg = self.config;
        let lang = &cfg.quiz.language;

        let question_audio = self
            .synthesizer
            .synthesize(&question_speech(cfg, quiz), lang)?;
        let background = self.provider.fetch_background(index)?;
        let answer_audio = self.synthesizer.synthesize(
            &format!("{}: {}", cfg.speech.answer_prefix, quiz.answer),
            lang,
        )?;

        let speech = DurationResolver::new(cfg.quiz.speech_pad_secs).resolve(&question_audio)?;
        let derived = BTreeMap::from([(PhaseKind::Speech, speech)]);
        let sched = schedule(&quiz_phases(&cfg.quiz), &derived)?;

        let content = QuizContent {
            question: &quiz.question,
            alternatives: &quiz.alternatives,
            answer: &quiz.answer,
            background,
            question_audio: Some(question_audio),
            answer_audio: Some(answer_audio),
        };
        let layers = LayerComposer::new(cfg).compose(&sched, self.overlays, &content)?;

        let timeline = ItemTimeline::new(
            index,
            label,
            layers.visual,
            layers.audio,
            sched.total_duration(),
        )?;
        tracing::info!(
            item = index,
            duration = timeline.total_duration(),
            "quiz item built"
        );
        Ok(timeline)
    }

    fn build_narration(
        &self,
        index: usize,
        narration: &NarrationItem,
        label: String,
    ) -> ReelResult<ItemTimeline> {
        let cfg = &self.config.slideshow;

        let audio = self.synthesizer.synthesize(&narration.text, &cfg.language)?;
        let images = (0..narration.image_count)
            .map(|i| {
                self.provider.fetch_image(&ImageRequest {
                    index: i,
                    query: narration.topic.clone(),
                })
            })
            .collect::<ReelResult<Vec<_>>>()?;

        let total = DurationResolver::new(cfg.speech_pad_secs).resolve(&audio)?;
        let visual = CrossfadeSequencer::new(
            self.config.output.canvas(),
            cfg.fade_secs,
            cfg.zoom_factor,
        )
        .sequence(&images, total)?;

        let spoken = DurationResolver::new(0.0).resolve(&audio)?.min(total);
        let narration_layer = AudioLayer::new("narration", audio, 0.0, spoken);

        let timeline = ItemTimeline::new(index, label, visual, vec![narration_layer], total)?;
        tracing::info!(
            item = index,
            images = narration.image_count,
            duration = total,
            "slideshow item built"
        );
        Ok(timeline)
    }
}

/// Narrated text for a quiz question: question followed by its labeled alternatives.
pub fn question_speech(config: &ReelConfig, quiz: &QuizItem) -> String {
    let alts = quiz
        .alternatives
        .iter()
        .zip(['a', 'b', 'c', 'd'])
        .map(|(text, label)| format!("{label}) {text}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}: {}. {}: {}.",
        config.speech.question_prefix, quiz.question, config.speech.alternatives_prefix, alts
    )
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/item.rs"]
mod tests;
