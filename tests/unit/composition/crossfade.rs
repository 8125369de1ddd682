use super::*;
use proptest::prelude::*;

const FRAME: Canvas = Canvas {
    width: 1080,
    height: 1920,
};

fn images(n: usize) -> Vec<Arc<MediaAsset>> {
    (0..n)
        .map(|i| Arc::new(MediaAsset::image(format!("img_{i}.jpg"), 1920, 1080)))
        .collect()
}

#[test]
fn three_images_over_thirty_seconds() {
    let seq = CrossfadeSequencer::new(FRAME, 2.0, 1.5);
    let layers = seq.sequence(&images(3), 30.0).unwrap();

    let starts: Vec<f64> = layers.iter().map(|l| l.start).collect();
    assert_eq!(starts, [0.0, 8.0, 18.0]);
    assert_eq!(layers[0].end(), 10.0);
    assert_eq!(layers[1].end(), 20.0);
    assert_eq!(layers[2].end(), 30.0);
    for pair in layers.windows(2) {
        assert_eq!(pair[0].end() - pair[1].start, 2.0);
        assert!(pair[1].z > pair[0].z);
    }
}

#[test]
fn each_slide_zooms_from_one_to_factor_and_fades() {
    let seq = CrossfadeSequencer::new(FRAME, 1.5, 1.5);
    let layers = seq.sequence(&images(2), 20.0).unwrap();
    for l in &layers {
        assert_eq!(l.scale_at(l.start), 1.0);
        assert!((l.scale_at(l.end()) - 1.5).abs() < 1e-12);
        assert_eq!(l.opacity_at(l.start), 0.0);
        assert_eq!(l.fade, Fade::symmetric(1.5));
    }
    assert!((layers[1].opacity_at(10.0) - 1.0).abs() < 1e-12);
}

#[test]
fn overlong_fade_is_a_configuration_error() {
    let seq = CrossfadeSequencer::new(FRAME, 3.0, 1.5);
    let err = seq.sequence(&images(3), 15.0).unwrap_err();
    assert!(matches!(err, ReelError::Configuration(_)));

    let seq = CrossfadeSequencer::new(FRAME, 2.5, 1.5);
    assert!(seq.sequence(&images(3), 15.0).is_ok());
}

#[test]
fn empty_or_silent_input_is_rejected() {
    let seq = CrossfadeSequencer::new(FRAME, 1.0, 1.5);
    assert!(matches!(
        seq.sequence(&[], 10.0),
        Err(ReelError::Configuration(_))
    ));
    assert!(matches!(
        seq.sequence(&images(2), 0.0),
        Err(ReelError::InvalidDuration(_))
    ));
    let audio = vec![Arc::new(MediaAsset::audio("a.wav", 3.0))];
    assert!(matches!(
        seq.sequence(&audio, 10.0),
        Err(ReelError::AssetUnavailable(_))
    ));
}

#[test]
fn cover_fit_never_letterboxes() {
    let frame = FRAME.size();

    let wide = cover_fit(Size::new(1920.0, 1080.0), frame).unwrap();
    assert_eq!(wide.scaled.height, 1920.0);
    assert_eq!(wide.scaled.width, 3413.0);
    assert_eq!(wide.crop_origin, Point::new(1166.0, 0.0));

    let tall = cover_fit(Size::new(1000.0, 4000.0), frame).unwrap();
    assert_eq!(tall.scaled.width, 1080.0);
    assert_eq!(tall.scaled.height, 4320.0);
    assert_eq!(tall.crop_origin, Point::new(0.0, 1200.0));

    let exact = cover_fit(Size::new(540.0, 960.0), frame).unwrap();
    assert_eq!(exact.scaled, frame);
    assert_eq!(exact.crop_origin, Point::ZERO);

    assert!(cover_fit(Size::new(0.0, 10.0), frame).is_err());
}

proptest! {
    #[test]
    fn program_span_equals_narration(
        count in 1usize..12,
        narration in 1.0f64..600.0,
        fade_share in 0.0f64..0.5,
    ) {
        let nominal = narration / count as f64;
        let fade = nominal * fade_share;
        let seq = CrossfadeSequencer::new(FRAME, fade, 1.2);
        let layers = seq.sequence(&images(count), narration).unwrap();

        prop_assert_eq!(layers.len(), count);
        prop_assert_eq!(layers[0].start, 0.0);
        let last = &layers[count - 1];
        prop_assert!((last.end() - narration).abs() < 1e-6);
        for (i, pair) in layers.windows(2).enumerate() {
            prop_assert!((pair[0].end() - pair[1].start - fade).abs() < 1e-6);
            let expected = (i + 1) as f64 * nominal - fade;
            prop_assert!((pair[1].start - expected).abs() < 1e-6);
        }
    }
}
