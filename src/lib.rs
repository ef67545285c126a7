use serde::{Deserialize, Serialize};

pub mod answers;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod transcriptparser;

pub use answers::{merge_answers, read_answer, Answer};
pub use error::TranscriptError;
pub use metadata::{TaskType, TranscriptSource};
pub use transcriptparser::{parse_lines, read_paragraphs, ParserSettings};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    HumanMarker,
    AssistantMarker,
    Content,
}

/// A line after classification. Markers carry no text, except the assistant
/// half of a fused line, which carries what followed the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'src> {
    pub kind: LineKind,
    pub text: &'src str,
}

/// One human prompt paired with the assistant response that followed it.
///
/// `round` stays 0 until the turn passes through the round finalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "student_prompt")]
    pub human_text: String,
    #[serde(rename = "gpt_response")]
    pub assistant_text: String,
    pub round: usize,
}

impl Turn {
    pub fn is_empty(&self) -> bool {
        self.human_text.is_empty() && self.assistant_text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub student_id: Option<String>,
    pub task_type: Option<TaskType>,
    pub dialogue_history: Vec<Turn>,
    /// Last paragraph of the student's answer file, when one was supplied.
    #[serde(default)]
    pub final_submission: Option<String>,
}
