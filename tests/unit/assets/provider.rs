use super::*;

fn fixture_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_provider").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn directory_provider_sorts_and_wraps() {
    let dir = fixture_dir("wrap");
    image::RgbImage::new(4, 8).save(dir.join("b.png")).unwrap();
    image::RgbImage::new(8, 4).save(dir.join("a.png")).unwrap();
    std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

    let provider = DirectoryAssetProvider::new(&dir).unwrap();
    assert_eq!(provider.len(), 2);

    let first = provider.fetch_background(0).unwrap();
    assert!(first.source.ends_with("a.png"));
    let wrapped = provider.fetch_background(2).unwrap();
    assert_eq!(wrapped.source, first.source);
    let second = provider
        .fetch_image(&ImageRequest {
            index: 1,
            query: Some("cats".to_string()),
        })
        .unwrap();
    assert!(second.source.ends_with("b.png"));
}

#[test]
fn empty_directory_fails_the_request() {
    let dir = fixture_dir("empty");
    let provider = DirectoryAssetProvider::new(&dir).unwrap();
    assert!(provider.is_empty());
    assert!(matches!(
        provider.fetch_background(0).unwrap_err(),
        ReelError::AssetUnavailable(_)
    ));
}

#[test]
fn synthesizer_template_substitutes_placeholders() {
    let synth = CommandSynthesizer::new("espeak-ng -v {lang} -w {out} {text}", "target/tts").unwrap();
    let out = synth.output_path("Olá mundo", "pt", 0);
    let args = synth.command_args("Olá mundo", "pt", &out);
    assert_eq!(args[0], "-v");
    assert_eq!(args[1], "pt");
    assert_eq!(args[3], out.to_string_lossy());
    assert_eq!(args[4], "Olá mundo");
}

#[test]
fn synthesizer_output_names_differ_per_call() {
    let synth = CommandSynthesizer::new("tts {text} {out}", "target/tts")
        .unwrap()
        .with_extension("mp3");
    let a = synth.output_path("hello", "en", 0);
    assert_eq!(a, synth.output_path("hello", "en", 0));
    assert_ne!(a, synth.output_path("hello", "pt", 0));
    assert_ne!(a, synth.output_path("hello", "en", 1));
    assert_eq!(a.extension().unwrap(), "mp3");
}

#[cfg(unix)]
#[test]
fn repeated_phrase_from_parallel_items_gets_separate_files() {
    use rayon::prelude::*;

    let dir = fixture_dir("parallel_tts");
    // `cp` stands in for a TTS engine: the text names the file to copy.
    let source = dir.join("phrase.txt");
    std::fs::write(&source, "audio").unwrap();
    let synth = CommandSynthesizer::new("cp {text} {out}", &dir).unwrap();
    let text = source.to_string_lossy().to_string();

    // The copies are not audio, so probing fails; only the written files matter here.
    (0..8).into_par_iter().for_each(|_| {
        let _ = synth.synthesize(&text, "pt");
    });

    let written = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("speech_"))
        .count();
    assert_eq!(written, 8);
}

#[test]
fn synthesizer_requires_output_placeholder() {
    assert!(CommandSynthesizer::new("", "target/tts").is_err());
    assert!(CommandSynthesizer::new("say {text}", "target/tts").is_err());
}
