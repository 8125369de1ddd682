use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "reelsmith", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a quiz reel from a quiz script.
    Quiz(BuildArgs),
    /// Build a narrated slideshow from a slideshow script.
    Slideshow(BuildArgs),
    /// Write the default configuration as JSON.
    Config {
        /// Destination file (stdout when omitted).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate a configuration file.
    Check {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Configuration JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of background / slideshow images.
    #[arg(long)]
    images: PathBuf,

    /// Speech command template with `{text}`, `{lang}` and `{out}` placeholders.
    #[arg(long, default_value = "espeak-ng -v {lang} -w {out} {text}")]
    tts_cmd: String,

    /// File extension the speech command writes.
    #[arg(long, default_value = "wav")]
    tts_ext: String,

    /// Scratch directory for synthesized speech.
    #[arg(long, default_value = "reelsmith-work")]
    work_dir: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Also write a frame-quantized JSON manifest of the program.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Build the timeline but skip encoding.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Quiz(args) => cmd_build(args, "quiz"),
        Command::Slideshow(args) => cmd_build(args, "slideshow"),
        Command::Config { out } => cmd_config(out.as_deref()),
        Command::Check { config } => cmd_check(&config),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<reelsmith::ReelConfig> {
    let config = match path {
        Some(p) => reelsmith::ReelConfig::from_path(p)
            .with_context(|| format!("load configuration '{}'", p.display()))?,
        None => reelsmith::ReelConfig::default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn cmd_build(args: BuildArgs, mode: &str) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let script = reelsmith::Script::from_path(&args.script)
        .with_context(|| format!("load script '{}'", args.script.display()))?;
    if script.mode_name() != mode {
        anyhow::bail!(
            "script '{}' is a {} script, expected {mode}",
            args.script.display(),
            script.mode_name()
        );
    }

    let provider = reelsmith::DirectoryAssetProvider::new(&args.images)?;
    let synthesizer = reelsmith::CommandSynthesizer::new(&args.tts_cmd, &args.work_dir)?
        .with_extension(args.tts_ext);
    let overlays = reelsmith::StaticOverlays::load(&config.assets);

    let builder =
        reelsmith::ItemTimelineBuilder::new(&config, &provider, &synthesizer, &overlays);
    let program = reelsmith::ProgramSequencer::new(builder, &config.program)
        .build_program(&script.into_items())?;

    let target = reelsmith::RenderTarget {
        canvas: config.output.canvas(),
        fps: config.output.frame_rate()?,
        out_path: args.out,
    };
    if let Some(path) = &args.manifest {
        reelsmith::RenderManifest::from_program(&program, target.canvas, target.fps)
            .write_json(path)?;
        tracing::info!(path = %path.display(), "wrote manifest");
    }

    let mut encoder: Box<dyn reelsmith::MediaEncoder> = if args.dry_run {
        Box::new(reelsmith::InMemoryEncoder::new())
    } else {
        Box::new(reelsmith::FfmpegEncoder::from_config(&config))
    };
    encoder.encode(&program, &target)?;

    println!(
        "{} items ({} skipped), {:.2}s{}",
        program.len(),
        program.failures().len(),
        program.total_duration(),
        if args.dry_run {
            String::new()
        } else {
            format!(" -> {}", target.out_path.display())
        }
    );
    Ok(())
}

fn cmd_config(out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&reelsmith::ReelConfig::default())?;
    match out {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("write configuration '{}'", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_check(path: &Path) -> anyhow::Result<()> {
    load_config(Some(path))?;
    println!("ok");
    Ok(())
}
