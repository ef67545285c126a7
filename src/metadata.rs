//! Student and task labels carried in transcript file names,
//! e.g. `Conversation ID42 Task b.txt`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static STUDENT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ID(\d+)").unwrap());
static TASK_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Task\s*([ABC])").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    A,
    B,
    C,
}

impl TaskType {
    fn from_letter(letter: &str) -> Option<Self> {
        match letter.to_ascii_uppercase().as_str() {
            "A" => Some(TaskType::A),
            "B" => Some(TaskType::B),
            "C" => Some(TaskType::C),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptSource {
    pub file_name: String,
    pub student_id: Option<String>,
    pub task_type: Option<TaskType>,
}

impl TranscriptSource {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_file_name(&file_name)
    }

    pub fn from_file_name(file_name: &str) -> Self {
        let student_id = STUDENT_ID
            .captures(file_name)
            .map(|cap| cap[1].to_string());
        let task_type = TASK_TYPE
            .captures(file_name)
            .and_then(|cap| TaskType::from_letter(&cap[1]));

        TranscriptSource {
            file_name: file_name.to_string(),
            student_id,
            task_type,
        }
    }

    /// Numeric student id for ordering records; ids too long for `u64` sort as missing.
    pub fn numeric_id(&self) -> Option<u64> {
        self.student_id.as_deref().and_then(|id| id.parse().ok())
    }
}

/// Skip `._foo` resource-fork files left behind by macOS archives.
pub fn is_transcript_candidate(path: &Path) -> bool {
    match path.file_name() {
        Some(name) => !name.to_string_lossy().starts_with("._"),
        None => false,
    }
}
