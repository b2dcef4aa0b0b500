//! Sentence catalog the practice prompts come from

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A practice sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub id: i64,
    pub text: String,
    /// 1 = Easy, 2 = Medium, 3 = Hard.
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default)]
    pub category: String,
}

fn default_difficulty() -> u8 {
    1
}

impl Sentence {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn difficulty_label(&self) -> &'static str {
        match self.difficulty {
            1 => "Easy",
            2 => "Medium",
            3 => "Hard",
            _ => "Unknown",
        }
    }
}

#[derive(Debug, Deserialize)]
struct LibraryFile {
    sentences: Vec<Sentence>,
}

/// Catalog of practice sentences with a deterministic cursor.
#[derive(Debug, Clone)]
pub struct SentenceLibrary {
    sentences: Vec<Sentence>,
    cursor: usize,
}

/// Sentences compiled into the binary, used when no library file is
/// configured or the configured one cannot be read.
const BUILTIN_LIBRARY: &str = include_str!("../resources/sentence_library.json");

impl SentenceLibrary {
    /// Load a library from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read sentence library {}", path.display()))?;
        let file: LibraryFile = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse sentence library {}", path.display()))?;

        info!(
            path = %path.display(),
            sentences = file.sentences.len(),
            "sentence library loaded"
        );
        Ok(Self {
            sentences: file.sentences,
            cursor: 0,
        })
    }

    /// Compiled-in default library.
    pub fn builtin() -> Self {
        let file: LibraryFile =
            serde_json::from_str(BUILTIN_LIBRARY).expect("builtin sentence library is valid JSON");
        Self {
            sentences: file.sentences,
            cursor: 0,
        }
    }

    /// Load from a file, falling back to the builtin catalog with a
    /// warning when the file is missing or malformed.
    pub fn load_or_builtin(path: &Path) -> Self {
        match Self::load(path) {
            Ok(library) => library,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "falling back to builtin sentence library");
                Self::builtin()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Sentence> {
        self.sentences.iter().find(|s| s.id == id)
    }

    pub fn by_difficulty(&self, level: u8) -> Vec<&Sentence> {
        self.sentences
            .iter()
            .filter(|s| s.difficulty == level)
            .collect()
    }

    /// Next sentence in catalog order, wrapping around. Deterministic:
    /// the same library always yields the same cycle.
    pub fn next(&mut self) -> Option<&Sentence> {
        if self.sentences.is_empty() {
            return None;
        }
        let index = self.cursor % self.sentences.len();
        self.cursor += 1;
        Some(&self.sentences[index])
    }
}
