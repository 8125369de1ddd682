use std::{fs::File, io::BufReader, path::Path};

use crate::{
    foundation::error::{ReelError, ReelResult},
    timeline::item::{ContentItem, NarrationItem, QuizItem},
};

/// One quiz row as written in a script file.
///
/// The spreadsheet column headers (`Pergunta`, `a)` .. `d)`, `Correta`) are accepted as
/// aliases, as are their lowercase forms.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuizEntry {
    #[serde(alias = "Pergunta", alias = "pergunta")]
    pub question: String,
    #[serde(alias = "a)")]
    pub a: String,
    #[serde(alias = "b)")]
    pub b: String,
    #[serde(alias = "c)")]
    pub c: String,
    #[serde(alias = "d)")]
    pub d: String,
    #[serde(alias = "Correta", alias = "correta")]
    pub answer: String,
}

/// A parsed script, either a list of quiz questions or a single narrated slideshow.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Script {
    Quiz {
        items: Vec<QuizEntry>,
    },
    Slideshow {
        narration: String,
        images: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
}

impl Script {
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let script: Self = serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse script JSON: {e}")))?;
        script.trimmed().validated()
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::configuration(format!("open script '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Quiz { .. } => "quiz",
            Self::Slideshow { .. } => "slideshow",
        }
    }

    /// Convert into the content items the timeline builder consumes.
    pub fn into_items(self) -> Vec<ContentItem> {
        match self {
            Self::Quiz { items } => items
                .into_iter()
                .map(|e| {
                    ContentItem::Quiz(QuizItem {
                        question: e.question,
                        alternatives: [e.a, e.b, e.c, e.d],
                        answer: e.answer,
                    })
                })
                .collect(),
            Self::Slideshow {
                narration,
                images,
                topic,
            } => vec![ContentItem::Narration(NarrationItem {
                text: narration,
                image_count: images,
                topic,
            })],
        }
    }

    fn trimmed(self) -> Self {
        let trim = |s: String| s.trim().to_string();
        match self {
            Self::Quiz { items } => Self::Quiz {
                items: items
                    .into_iter()
                    .map(|e| QuizEntry {
                        question: trim(e.question),
                        a: trim(e.a),
                        b: trim(e.b),
                        c: trim(e.c),
                        d: trim(e.d),
                        answer: trim(e.answer),
                    })
                    .collect(),
            },
            Self::Slideshow {
                narration,
                images,
                topic,
            } => Self::Slideshow {
                narration: trim(narration),
                images,
                topic: topic.map(trim).filter(|t| !t.is_empty()),
            },
        }
    }

    fn validated(self) -> ReelResult<Self> {
        match &self {
            Self::Quiz { items } => {
                if items.is_empty() {
                    return Err(ReelError::configuration("quiz script has no items"));
                }
                for (i, e) in items.iter().enumerate() {
                    let fields = [
                        ("question", &e.question),
                        ("a", &e.a),
                        ("b", &e.b),
                        ("c", &e.c),
                        ("d", &e.d),
                        ("answer", &e.answer),
                    ];
                    if let Some((name, _)) = fields.iter().find(|(_, v)| v.is_empty()) {
                        return Err(ReelError::configuration(format!(
                            "quiz item {i}: field '{name}' is empty"
                        )));
                    }
                }
            }
            Self::Slideshow {
                narration, images, ..
            } => {
                if narration.is_empty() {
                    return Err(ReelError::configuration("slideshow narration is empty"));
                }
                if *images == 0 {
                    return Err(ReelError::configuration(
                        "slideshow needs at least one image",
                    ));
                }
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/source.rs"]
mod tests;
