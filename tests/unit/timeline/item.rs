use super::*;
use crate::assets::media::MediaAsset;
use std::sync::{Arc, Mutex};

struct FixedSpeech {
    secs: f64,
    spoken: Mutex<Vec<(String, String)>>,
}

impl FixedSpeech {
    fn new(secs: f64) -> Self {
        Self {
            secs,
            spoken: Mutex::new(Vec::new()),
        }
    }
}

impl SpeechSynthesizer for FixedSpeech {
    fn synthesize(&self, text: &str, language: &str) -> ReelResult<Arc<MediaAsset>> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), language.to_string()));
        Ok(Arc::new(MediaAsset::audio("speech.wav", self.secs)))
    }
}

struct Images {
    fail_on: Option<usize>,
}

impl AssetProvider for Images {
    fn fetch_image(&self, request: &ImageRequest) -> ReelResult<Arc<MediaAsset>> {
        if self.fail_on == Some(request.index) {
            return Err(ReelError::asset_unavailable("image service returned 503"));
        }
        Ok(Arc::new(MediaAsset::image(
            format!("img_{}.jpg", request.index),
            1080,
            1920,
        )))
    }
}

fn quiz() -> ContentItem {
    ContentItem::Quiz(QuizItem {
        question: "Qual é o maior planeta?".to_string(),
        alternatives: ["Terra", "Júpiter", "Marte", "Vênus"].map(str::to_string),
        answer: "Júpiter".to_string(),
    })
}

#[test]
fn quiz_item_matches_worked_example() {
    let config = ReelConfig::default();
    let speech = FixedSpeech::new(6.2);
    let images = Images { fail_on: None };
    let overlays = StaticOverlays::default();
    let builder = ItemTimelineBuilder::new(&config, &images, &speech, &overlays);

    let timeline = builder.build(0, &quiz()).unwrap();
    assert!((timeline.total_duration() - 23.5).abs() < 1e-9);
    let answer = timeline.visual().iter().find(|l| l.id == "answer").unwrap();
    assert!((answer.start - 14.5).abs() < 1e-9);

    let zs: Vec<i32> = timeline.visual().iter().map(|l| l.z).collect();
    let mut sorted = zs.clone();
    sorted.sort();
    assert_eq!(zs, sorted);

    let spoken = speech.spoken.lock().unwrap();
    assert_eq!(spoken.len(), 2);
    assert_eq!(
        spoken[0].0,
        "Pergunta: Qual é o maior planeta?. Alternativas: a) Terra, b) Júpiter, c) Marte, d) Vênus."
    );
    assert_eq!(spoken[1].0, "A resposta correta é: Júpiter");
    assert_eq!(spoken[1].1, "pt");
}

#[test]
fn background_failure_is_wrapped_with_item_index() {
    let config = ReelConfig::default();
    let speech = FixedSpeech::new(3.0);
    let images = Images { fail_on: Some(4) };
    let overlays = StaticOverlays::default();
    let builder = ItemTimelineBuilder::new(&config, &images, &speech, &overlays);

    let err = builder.build(4, &quiz()).unwrap_err();
    assert_eq!(err.index, 4);
    assert!(matches!(*err.cause, ReelError::AssetUnavailable(_)));
    assert!(builder.build(3, &quiz()).is_ok());
}

#[test]
fn narration_item_is_a_crossfaded_slideshow() {
    let mut config = ReelConfig::default();
    config.slideshow.fade_secs = 2.0;
    let speech = FixedSpeech::new(30.0);
    let images = Images { fail_on: None };
    let overlays = StaticOverlays::default();
    let builder = ItemTimelineBuilder::new(&config, &images, &speech, &overlays);

    let item = ContentItem::Narration(NarrationItem {
        text: "Os gatos dormem muito.".to_string(),
        image_count: 3,
        topic: Some("gatos".to_string()),
    });
    let timeline = builder.build(0, &item).unwrap();
    assert_eq!(timeline.total_duration(), 30.0);
    let starts: Vec<f64> = timeline.visual().iter().map(|l| l.start).collect();
    assert_eq!(starts, [0.0, 8.0, 18.0]);
    assert_eq!(timeline.audio().len(), 1);
    assert_eq!(timeline.audio()[0].duration, 30.0);
    assert_eq!(speech.spoken.lock().unwrap()[0].1, "pt-br");
}

#[test]
fn slideshow_with_overlong_fade_fails_as_configuration() {
    let mut config = ReelConfig::default();
    config.slideshow.fade_secs = 6.0;
    let speech = FixedSpeech::new(30.0);
    let images = Images { fail_on: None };
    let overlays = StaticOverlays::default();
    let builder = ItemTimelineBuilder::new(&config, &images, &speech, &overlays);

    let item = ContentItem::Narration(NarrationItem {
        text: "texto".to_string(),
        image_count: 3,
        topic: None,
    });
    let err = builder.build(0, &item).unwrap_err();
    assert!(err.cause.is_configuration());
}

#[test]
fn timeline_rejects_layers_past_the_end() {
    let asset = Arc::new(MediaAsset::audio("a.wav", 5.0));
    let err = ItemTimeline::new(
        0,
        "x",
        vec![],
        vec![AudioLayer::new("a", asset.clone(), 1.0, 5.0)],
        5.5,
    )
    .unwrap_err();
    assert!(matches!(err, ReelError::InvalidDuration(_)));

    assert!(ItemTimeline::new(0, "x", vec![], vec![AudioLayer::new("a", asset, 0.5, 5.0)], 5.5).is_ok());
}

#[test]
fn labels_are_truncated_for_diagnostics() {
    let item = ContentItem::Narration(NarrationItem {
        text: "x".repeat(50),
        image_count: 1,
        topic: None,
    });
    let label = item.label();
    assert_eq!(label.chars().count(), 41);
    assert!(label.ends_with('…'));
    assert_eq!(quiz().label(), "Qual é o maior planeta?");
}
