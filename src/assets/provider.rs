use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    assets::media::{self, MediaAsset},
    foundation::{
        error::{ReelError, ReelResult},
        math::Fnv1a64,
    },
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// What kind of image an item asks the provider for.
pub struct ImageRequest {
    /// Position of the requested image (item index or slide index).
    pub index: usize,
    /// Optional topic hint for providers that search by subject.
    pub query: Option<String>,
}

/// Source of still images. Any failure is fatal to the requesting item only.
pub trait AssetProvider: Send + Sync {
    /// Fetch one image for `request`.
    fn fetch_image(&self, request: &ImageRequest) -> ReelResult<Arc<MediaAsset>>;

    /// Fetch the background image for the item at `index`.
    fn fetch_background(&self, index: usize) -> ReelResult<Arc<MediaAsset>> {
        self.fetch_image(&ImageRequest { index, query: None })
    }
}

/// Text-to-speech collaborator. Called once per narrated phrase, never retried.
pub trait SpeechSynthesizer: Send + Sync {
    /// Produce decoded narration audio for `text` in `language`.
    fn synthesize(&self, text: &str, language: &str) -> ReelResult<Arc<MediaAsset>>;
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// Serves images from a local directory, sorted by file name and picked by index
/// (wrapping around when there are fewer images than requests).
#[derive(Clone, Debug)]
pub struct DirectoryAssetProvider {
    images: Vec<PathBuf>,
}

impl DirectoryAssetProvider {
    pub fn new(dir: impl AsRef<Path>) -> ReelResult<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ReelError::asset_unavailable(format!("read image directory '{}': {e}", dir.display()))
        })?;

        let mut images = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| ReelError::asset_unavailable(format!("list '{}': {e}", dir.display())))?
                .path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && is_image {
                images.push(path);
            }
        }
        images.sort();
        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl AssetProvider for DirectoryAssetProvider {
    fn fetch_image(&self, request: &ImageRequest) -> ReelResult<Arc<MediaAsset>> {
        if self.images.is_empty() {
            return Err(ReelError::asset_unavailable(
                "image directory contains no images",
            ));
        }
        let path = &self.images[request.index % self.images.len()];
        Ok(Arc::new(media::probe_image(path)?))
    }
}

/// Runs an external text-to-speech command and probes the file it writes.
///
/// The template is split on whitespace; `{text}`, `{lang}` and `{out}` inside any
/// argument are substituted, so `espeak-ng -v {lang} -w {out} {text}` passes the
/// whole text as one argument.
///
/// Every call writes its own file, so concurrent items never share an output even
/// when they speak the same phrase.
#[derive(Clone, Debug)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
    extension: String,
    calls: Arc<AtomicU64>,
}

impl CommandSynthesizer {
    pub fn new(template: &str, work_dir: impl Into<PathBuf>) -> ReelResult<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| ReelError::configuration("speech command template is empty"))?;
        let args: Vec<String> = parts.collect();
        if !args.iter().any(|a| a.contains("{out}")) {
            return Err(ReelError::configuration(
                "speech command template must contain '{out}'",
            ));
        }
        Ok(Self {
            program,
            args,
            work_dir: work_dir.into(),
            extension: "wav".to_string(),
            calls: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Change the extension of produced files (default `wav`).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Output path for call number `call` of a phrase.
    ///
    /// The name hashes language and text and carries the process id and call number.
    pub fn output_path(&self, text: &str, language: &str, call: u64) -> PathBuf {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(language.as_bytes());
        h.write_u8(0);
        h.write_bytes(text.as_bytes());
        self.work_dir.join(format!(
            "speech_{:016x}_{}_{call}.{}",
            h.finish(),
            std::process::id(),
            self.extension
        ))
    }

    /// Argument list for one invocation, placeholders substituted.
    pub fn command_args(&self, text: &str, language: &str, out: &Path) -> Vec<String> {
        let out = out.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace("{lang}", language)
                    .replace("{out}", &out)
                    .replace("{text}", text)
            })
            .collect()
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(&self, text: &str, language: &str) -> ReelResult<Arc<MediaAsset>> {
        std::fs::create_dir_all(&self.work_dir).map_err(|e| {
            ReelError::asset_unavailable(format!(
                "create speech work dir '{}': {e}",
                self.work_dir.display()
            ))
        })?;
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        let out = self.output_path(text, language, call);

        let status = Command::new(&self.program)
            .args(self.command_args(text, language, &out))
            .stdout(std::process::Stdio::null())
            .status()
            .map_err(|e| {
                ReelError::asset_unavailable(format!("failed to run '{}': {e}", self.program))
            })?;
        if !status.success() {
            return Err(ReelError::asset_unavailable(format!(
                "speech command '{}' exited with {status}",
                self.program
            )));
        }

        tracing::debug!(path = %out.display(), language, "synthesized speech");
        Ok(Arc::new(media::probe_audio(&out)?))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/provider.rs"]
mod tests;
