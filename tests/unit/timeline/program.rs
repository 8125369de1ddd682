use super::*;
use crate::{
    assets::{
        media::MediaAsset,
        provider::{AssetProvider, ImageRequest, SpeechSynthesizer},
    },
    composition::composer::StaticOverlays,
    config::settings::ReelConfig,
    timeline::item::NarrationItem,
};
use std::sync::Arc;

/// Speaks for as many seconds as the text says; "fail" is unavailable.
struct NumericSpeech;

impl SpeechSynthesizer for NumericSpeech {
    fn synthesize(&self, text: &str, _language: &str) -> ReelResult<Arc<MediaAsset>> {
        let secs: f64 = text
            .parse()
            .map_err(|_| ReelError::asset_unavailable(format!("tts refused '{text}'")))?;
        Ok(Arc::new(MediaAsset::audio("n.wav", secs)))
    }
}

struct Images;

impl AssetProvider for Images {
    fn fetch_image(&self, request: &ImageRequest) -> ReelResult<Arc<MediaAsset>> {
        Ok(Arc::new(MediaAsset::image(
            format!("{}.png", request.index),
            1080,
            1920,
        )))
    }
}

fn narration(text: &str) -> ContentItem {
    ContentItem::Narration(NarrationItem {
        text: text.to_string(),
        image_count: 1,
        topic: None,
    })
}

fn run(config: &ReelConfig, items: &[ContentItem]) -> ReelResult<ProgramTimeline> {
    let overlays = StaticOverlays::default();
    let builder = ItemTimelineBuilder::new(config, &Images, &NumericSpeech, &overlays);
    ProgramSequencer::new(builder, &config.program).build_program(items)
}

#[test]
fn failed_item_is_skipped_and_order_kept() {
    let items = ["10", "12", "fail", "8", "6"].map(narration);
    let program = run(&ReelConfig::default(), &items).unwrap();

    let indices: Vec<usize> = program.items().iter().map(|p| p.timeline.index()).collect();
    assert_eq!(indices, [0, 1, 3, 4]);
    let offsets: Vec<f64> = program.items().iter().map(|p| p.offset).collect();
    assert_eq!(offsets, [0.0, 10.0, 22.0, 30.0]);
    assert_eq!(program.total_duration(), 36.0);

    assert_eq!(program.failures().len(), 1);
    assert_eq!(program.failures()[0].index, 2);
    assert!(program.failures()[0].cause.contains("tts refused"));
}

#[test]
fn all_items_failing_is_no_content() {
    let items = ["fail", "nope"].map(narration);
    let err = run(&ReelConfig::default(), &items).unwrap_err();
    assert!(matches!(err, ReelError::NoContent { attempted: 2 }));

    let err = run(&ReelConfig::default(), &[]).unwrap_err();
    assert!(matches!(err, ReelError::NoContent { attempted: 0 }));
}

#[test]
fn overlap_pulls_items_earlier() {
    let mut config = ReelConfig::default();
    config.program.item_overlap_secs = 1.0;
    let items = ["10", "12", "8"].map(narration);
    let program = run(&config, &items).unwrap();

    let offsets: Vec<f64> = program.items().iter().map(|p| p.offset).collect();
    assert_eq!(offsets, [0.0, 9.0, 20.0]);
    assert_eq!(program.total_duration(), 28.0);
    assert_eq!(program.overlap(), 1.0);
}

#[test]
fn overlap_longer_than_an_item_aborts() {
    let mut config = ReelConfig::default();
    config.program.item_overlap_secs = 9.0;
    let items = ["10", "8"].map(narration);
    let err = run(&config, &items).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn narration_too_short_for_its_fades_only_skips_that_item() {
    let mut config = ReelConfig::default();
    config.slideshow.fade_secs = 4.0;
    // 6s over one image cannot hold two 4s fades.
    let items = ["10", "6"].map(narration);
    let program = run(&config, &items).unwrap();
    assert_eq!(program.len(), 1);
    assert_eq!(program.items()[0].timeline.index(), 0);
    assert_eq!(program.failures()[0].index, 1);
    assert!(program.failures()[0].cause.starts_with("configuration error"));
}

#[test]
fn every_item_failing_on_fades_is_no_content() {
    let mut config = ReelConfig::default();
    config.slideshow.fade_secs = 4.0;
    let items = ["6", "5"].map(narration);
    let err = run(&config, &items).unwrap_err();
    assert!(matches!(err, ReelError::NoContent { attempted: 2 }));
}

#[test]
fn parallel_build_matches_sequential() {
    let items = ["3", "fail", "5", "7", "4", "9", "fail", "6"].map(narration);
    let sequential = run(&ReelConfig::default(), &items).unwrap();

    let mut config = ReelConfig::default();
    config.program.parallel = true;
    config.program.threads = Some(4);
    let parallel = run(&config, &items).unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(parallel.len(), 6);
}

#[test]
fn zero_threads_is_rejected() {
    let mut config = ReelConfig::default();
    config.program.parallel = true;
    config.program.threads = Some(0);
    let items = ["3", "4"].map(narration);
    assert!(run(&config, &items).unwrap_err().is_configuration());
}

#[test]
fn program_layers_are_shifted_to_item_offsets() {
    let items = ["10", "12"].map(narration);
    let program = run(&ReelConfig::default(), &items).unwrap();

    let audio = program.audio_layers();
    assert_eq!(audio.len(), 2);
    assert_eq!(audio[1].start, 10.0);
    let visual = program.visual_layers();
    assert_eq!(visual[1].start, 10.0);
    assert_eq!(visual[1].end(), 22.0);
}
