use super::*;
use crate::{
    assets::media::MediaAsset,
    timeline::{
        item::ItemTimeline,
        program::{ItemOutcome, assemble},
    },
};
use std::sync::Arc;

fn program() -> ProgramTimeline {
    let narration = Arc::new(MediaAsset::audio("n.wav", 2.0));
    let image = Arc::new(MediaAsset::image("bg.png", 1080, 1920));
    let timeline = |index: usize, secs: f64| {
        let bg = VisualLayer::new(
            "bg",
            VisualContent::Image {
                asset: image.clone(),
                blur_radius: 4.0,
                fit: Fit::Exact(image.pixel_size.unwrap_or_default()),
            },
            0.0,
            secs,
        );
        let caption = VisualLayer::new(
            "title",
            VisualContent::Caption {
                text: "Olá".to_string(),
                role: CaptionRole::Title,
                wrap_width: Some(920.0),
            },
            0.0,
            secs,
        )
        .with_z(10);
        let speech = AudioLayer::new("speech", narration.clone(), 0.0, 2.0);
        ItemTimeline::new(index, format!("item {index}"), vec![caption, bg], vec![speech], secs)
            .unwrap()
    };
    assemble(
        vec![
            ItemOutcome {
                index: 0,
                label: "item 0".to_string(),
                result: Ok(timeline(0, 2.5)),
            },
            ItemOutcome {
                index: 1,
                label: "item 1".to_string(),
                result: Ok(timeline(1, 3.0)),
            },
        ],
        0.0,
    )
    .unwrap()
}

fn target() -> RenderTarget {
    RenderTarget {
        canvas: Canvas {
            width: 1080,
            height: 1920,
        },
        fps: Fps::new(24, 1).unwrap(),
        out_path: PathBuf::from("out.mp4"),
    }
}

#[test]
fn in_memory_encoder_captures_runs() {
    let mut encoder = InMemoryEncoder::new();
    let program = program();
    encoder.encode(&program, &target()).unwrap();
    assert_eq!(encoder.runs().len(), 1);
    assert_eq!(encoder.runs()[0].1.total_duration(), 5.5);
    assert_eq!(encoder.runs()[0].0.out_path, PathBuf::from("out.mp4"));
}

#[test]
fn manifest_quantizes_layers_to_frames() {
    let t = target();
    let manifest = RenderManifest::from_program(&program(), t.canvas, t.fps);
    assert_eq!(manifest.total_frames, 132);
    assert_eq!(manifest.items.len(), 2);
    assert_eq!(manifest.items[1].frames.start.0, 60);
    assert_eq!(manifest.items[1].frames.end.0, 132);

    // z-sorted per item: background first.
    assert_eq!(manifest.visual[0].id, "bg");
    assert_eq!(manifest.visual[2].frames.start.0, 60);
    assert_eq!(manifest.audio[1].frames.len_frames(), 48);
}

#[test]
fn manifest_serializes_to_json() {
    let t = target();
    let json = RenderManifest::from_program(&program(), t.canvas, t.fps)
        .to_json_pretty()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["visual"][1]["content"]["type"], "caption");
    assert_eq!(value["visual"][1]["content"]["role"], "title");
    assert_eq!(value["audio"][0]["source"], "n.wav");
    assert_eq!(value["failures"].as_array().map(Vec::len), Some(0));
}
