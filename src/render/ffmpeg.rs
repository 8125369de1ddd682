use std::path::Path;
use std::process::{Command, Stdio};

use crate::{
    composition::layer::{CaptionRole, Fade, Fit, Placement, VisualContent, VisualLayer, ZoomCurve},
    config::settings::{CaptionStyle, EncodeSettings, ReelConfig},
    foundation::{
        core::Canvas,
        error::{ReelError, ReelResult},
    },
    render::boundary::{MediaEncoder, RenderTarget},
    timeline::program::ProgramTimeline,
};

/// Average glyph advance as a fraction of the font size, used for caption wrapping.
const GLYPH_ADVANCE_EM: f64 = 0.55;

/// Encodes a program in a single `ffmpeg` run driven by one filtergraph.
///
/// Each image layer becomes a looped still input; captions are `drawtext` filters and
/// audio layers are delayed, trimmed and mixed with `amix`.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    settings: EncodeSettings,
    style: CaptionStyle,
}

impl FfmpegEncoder {
    pub fn new(settings: EncodeSettings, style: CaptionStyle) -> Self {
        Self { settings, style }
    }

    pub fn from_config(config: &ReelConfig) -> Self {
        Self::new(config.encode.clone(), config.style.clone())
    }

    /// Full `ffmpeg` argument list (without the program name) for `program`.
    pub fn build_args(
        &self,
        program: &ProgramTimeline,
        target: &RenderTarget,
    ) -> ReelResult<Vec<String>> {
        let Canvas { width, height } = target.canvas;
        if width == 0 || height == 0 || !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(ReelError::configuration(format!(
                "output {width}x{height} must be non-zero and even for {} output",
                self.settings.pixel_format
            )));
        }
        let total = program.total_duration();
        if !total.is_finite() || total <= 0.0 {
            return Err(ReelError::render("program has no duration to encode"));
        }

        let fps = format!("{}/{}", target.fps.num, target.fps.den);
        let mut args: Vec<String> = Vec::new();
        push(
            &mut args,
            &[
                if self.settings.overwrite { "-y" } else { "-n" },
                "-loglevel",
                "error",
            ],
        );

        let mut graph = vec![format!(
            "color=c=black:s={width}x{height}:r={fps}:d={}[base]",
            secs(total)
        )];
        let mut current = "base".to_string();
        let mut input = 0usize;

        for (k, layer) in program.visual_layers().iter().enumerate() {
            let filter = match &layer.content {
                VisualContent::Image {
                    asset,
                    blur_radius,
                    fit,
                } => {
                    push(
                        &mut args,
                        &[
                            "-loop",
                            "1",
                            "-framerate",
                            fps.as_str(),
                            "-t",
                            secs(layer.duration).as_str(),
                            "-i",
                        ],
                    );
                    args.push(asset.source.display().to_string());
                    graph.push(format!(
                        "[{input}:v]{},setpts=PTS-STARTPTS+{}/TB[v{k}]",
                        image_chain(layer, *blur_radius, fit, target.canvas),
                        secs(layer.start)
                    ));
                    input += 1;
                    let (x, y) = overlay_position(layer.placement);
                    format!(
                        "[{current}][v{k}]overlay=x={x}:y={y}:eof_action=pass:enable='{}'",
                        between(layer)
                    )
                }
                VisualContent::Caption {
                    text,
                    role,
                    wrap_width,
                } => format!(
                    "[{current}]{}",
                    self.drawtext(layer, text, *role, *wrap_width)
                ),
            };
            graph.push(format!("{filter}[o{k}]"));
            current = format!("o{k}");
        }
        graph.push(format!(
            "[{current}]format={}[vout]",
            self.settings.pixel_format
        ));

        let audio = program.audio_layers();
        let mut mix = String::new();
        for (k, layer) in audio.iter().enumerate() {
            if layer.looped {
                push(&mut args, &["-stream_loop", "-1"]);
            }
            args.push("-i".to_string());
            args.push(layer.asset.source.display().to_string());
            let delay_ms = (layer.start * 1000.0).round().max(0.0) as u64;
            graph.push(format!(
                "[{input}:a]atrim=end={},asetpts=PTS-STARTPTS,volume={:.3},adelay=delays={delay_ms}:all=1[a{k}]",
                secs(layer.duration),
                layer.volume
            ));
            mix.push_str(&format!("[a{k}]"));
            input += 1;
        }
        if !audio.is_empty() {
            graph.push(format!(
                "{mix}amix=inputs={}:duration=longest:normalize=0[aout]",
                audio.len()
            ));
        }

        args.push("-filter_complex".to_string());
        args.push(graph.join(";"));
        push(&mut args, &["-map", "[vout]"]);
        if audio.is_empty() {
            args.push("-an".to_string());
        } else {
            push(
                &mut args,
                &["-map", "[aout]", "-c:a", self.settings.audio_codec.as_str()],
            );
        }
        let crf = self.settings.crf.to_string();
        let threads = self.settings.threads.to_string();
        push(
            &mut args,
            &[
                "-c:v",
                self.settings.video_codec.as_str(),
                "-preset",
                self.settings.preset.as_str(),
                "-crf",
                crf.as_str(),
                "-pix_fmt",
                self.settings.pixel_format.as_str(),
                "-r",
                fps.as_str(),
                "-threads",
                threads.as_str(),
                "-t",
                secs(total).as_str(),
                "-movflags",
                "+faststart",
            ],
        );
        args.push(target.out_path.display().to_string());
        Ok(args)
    }

    fn font_size(&self, role: CaptionRole) -> u32 {
        match role {
            CaptionRole::Title => self.style.title_size_px,
            CaptionRole::Alternatives => self.style.alternatives_size_px,
            CaptionRole::Countdown => self.style.timer_size_px,
            CaptionRole::Answer => self.style.answer_size_px,
        }
    }

    fn drawtext(
        &self,
        layer: &VisualLayer,
        text: &str,
        role: CaptionRole,
        wrap_width: Option<f64>,
    ) -> String {
        let size = self.font_size(role);
        let text = match wrap_width {
            Some(w) => wrap_caption(text, w, f64::from(size)),
            None => text.to_string(),
        };
        let (x, y) = match layer.placement {
            Placement::CenteredAt { y } => ("(w-text_w)/2".to_string(), format!("{y:.0}")),
            Placement::At(p) => (format!("{:.0}", p.x), format!("{:.0}", p.y)),
            Placement::Fill => ("(w-text_w)/2".to_string(), "(h-text_h)/2".to_string()),
        };
        let mut filter = format!(
            "drawtext=font={}:text={}:expansion=none:fontsize={size}:fontcolor={}:borderw={}:bordercolor={}:x={x}:y={y}:enable='{}'",
            escape_filter_value(&self.style.font),
            escape_filter_value(&text),
            self.style.color,
            self.style.stroke_width_px,
            self.style.stroke_color,
            between(layer)
        );
        if let Some(alpha) = fade_alpha(layer) {
            filter.push_str(&format!(":alpha='{alpha}'"));
        }
        filter
    }
}

impl MediaEncoder for FfmpegEncoder {
    fn encode(&mut self, program: &ProgramTimeline, target: &RenderTarget) -> ReelResult<()> {
        let args = self.build_args(program, target)?;
        ensure_parent_dir(&target.out_path)?;
        if !self.settings.overwrite && target.out_path.exists() {
            return Err(ReelError::configuration(format!(
                "output file '{}' already exists",
                target.out_path.display()
            )));
        }

        tracing::info!(
            out = %target.out_path.display(),
            duration = program.total_duration(),
            "encoding with ffmpeg"
        );
        let output = Command::new(&self.settings.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ReelError::render(format!(
                    "failed to spawn {} (is it installed and on PATH?): {e}",
                    self.settings.ffmpeg
                ))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReelError::render(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

fn push(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| s.to_string()));
}

fn secs(v: f64) -> String {
    format!("{v:.3}")
}

/// Half-open `[start, end)` window, so back-to-back layers never share a frame.
fn between(layer: &VisualLayer) -> String {
    format!("gte(t,{})*lt(t,{})", secs(layer.start), secs(layer.end()))
}

fn image_chain(layer: &VisualLayer, blur_radius: f64, fit: &Fit, canvas: Canvas) -> String {
    let mut filters = Vec::new();
    match fit {
        Fit::Cover(c) => {
            filters.push(format!(
                "scale={:.0}:{:.0}",
                c.scaled.width, c.scaled.height
            ));
            filters.push(format!(
                "crop={}:{}:{:.0}:{:.0}",
                canvas.width, canvas.height, c.crop_origin.x, c.crop_origin.y
            ));
        }
        Fit::Exact(size) => filters.push(format!("scale={:.0}:{:.0}", size.width, size.height)),
    }
    if blur_radius > 0.0 {
        filters.push(format!("gblur=sigma={blur_radius}"));
    }
    let zoom = match layer.zoom {
        ZoomCurve::None => None,
        ZoomCurve::Linear { rate } => Some(format!("1+{rate}*t")),
        ZoomCurve::Ramp { to, over } if over > 0.0 => {
            Some(format!("1+{}*min(t/{},1)", to - 1.0, secs(over)))
        }
        ZoomCurve::Ramp { to, .. } => Some(format!("{to}")),
    };
    if let Some(scale) = zoom {
        let (w, h) = match fit {
            Fit::Cover(_) => (f64::from(canvas.width), f64::from(canvas.height)),
            Fit::Exact(size) => (size.width, size.height),
        };
        filters.push(format!(
            "scale=w='trunc({w:.0}*({scale})/2)*2':h='trunc({h:.0}*({scale})/2)*2':eval=frame"
        ));
        filters.push(format!("crop={w:.0}:{h:.0}"));
    }
    filters.push("format=rgba".to_string());
    if layer.fade.fade_in > 0.0 {
        filters.push(format!(
            "fade=t=in:st=0:d={}:alpha=1",
            secs(layer.fade.fade_in)
        ));
    }
    if layer.fade.fade_out > 0.0 {
        filters.push(format!(
            "fade=t=out:st={}:d={}:alpha=1",
            secs((layer.duration - layer.fade.fade_out).max(0.0)),
            secs(layer.fade.fade_out)
        ));
    }
    filters.join(",")
}

fn overlay_position(placement: Placement) -> (String, String) {
    match placement {
        Placement::Fill => ("0".to_string(), "0".to_string()),
        Placement::CenteredAt { y } => ("(main_w-overlay_w)/2".to_string(), format!("{y:.0}")),
        Placement::At(p) => (format!("{:.0}", p.x), format!("{:.0}", p.y)),
    }
}

/// `drawtext` alpha expression for a faded caption, in program time.
fn fade_alpha(layer: &VisualLayer) -> Option<String> {
    let Fade { fade_in, fade_out } = layer.fade;
    let rise = (fade_in > 0.0).then(|| format!("(t-{})/{}", secs(layer.start), secs(fade_in)));
    let fall = (fade_out > 0.0).then(|| format!("({}-t)/{}", secs(layer.end()), secs(fade_out)));
    let expr = match (rise, fall) {
        (None, None) => return None,
        (Some(a), Some(b)) => format!("min({a},{b})"),
        (Some(one), None) | (None, Some(one)) => one,
    };
    Some(format!("clip({expr},0,1)"))
}

/// Greedy word wrap using an estimated average glyph width.
///
/// Existing line breaks are kept; a single word longer than the line stays whole.
pub fn wrap_caption(text: &str, width_px: f64, font_size_px: f64) -> String {
    let max_chars = ((width_px / (font_size_px * GLYPH_ADVANCE_EM)).floor() as usize).max(1);
    text.lines()
        .map(|line| {
            let mut out: Vec<String> = Vec::new();
            let mut cur = String::new();
            for word in line.split_whitespace() {
                let needed = if cur.is_empty() {
                    word.chars().count()
                } else {
                    cur.chars().count() + 1 + word.chars().count()
                };
                if needed > max_chars && !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
                if !cur.is_empty() {
                    cur.push(' ');
                }
                cur.push_str(word);
            }
            out.push(cur);
            out.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape an unquoted filter option value for use inside `-filter_complex`.
///
/// ffmpeg unescapes the value twice: once when splitting the graph into filters and
/// once when splitting a filter's arguments into options. The option level is applied
/// first, then the graph level. `drawtext` values also need `expansion=none` so `%`
/// stays literal.
pub fn escape_filter_value(value: &str) -> String {
    escape_level(&escape_level(value, &['\\', '\'', ':']), &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_level(value: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if special.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/render/ffmpeg.rs"]
mod tests;
