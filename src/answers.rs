//! Final answers handed in alongside each conversation.
//!
//! An answer file is matched to its transcript by the student id in the file
//! name; the submission is the file's last non-empty paragraph.

use std::path::Path;

use tracing::{debug, warn};

use crate::{read_paragraphs, TaskType, Transcript, TranscriptError, TranscriptSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub file_name: String,
    pub student_id: Option<String>,
    pub task_type: Option<TaskType>,
    pub final_submission: Option<String>,
}

pub fn read_answer(path: &Path) -> Result<Answer, TranscriptError> {
    let mut paragraphs = read_paragraphs(path)?;
    let source = TranscriptSource::from_path(path);

    Ok(Answer {
        file_name: source.file_name,
        student_id: source.student_id,
        task_type: source.task_type,
        final_submission: paragraphs.pop(),
    })
}

/// Attach answers to transcripts with the same student id. The answer's task
/// label wins over the transcript's. Returns how many answers were merged.
pub fn merge_answers(transcripts: &mut [Transcript], answers: Vec<Answer>) -> usize {
    let mut merged = 0;

    for answer in answers {
        let Some(id) = answer.student_id.as_deref() else {
            warn!("answer {} has no student id, skipping", answer.file_name);
            continue;
        };

        match transcripts
            .iter_mut()
            .find(|t| t.student_id.as_deref() == Some(id))
        {
            Some(transcript) => {
                debug!("answer {} -> ID {}", answer.file_name, id);
                if answer.task_type.is_some() {
                    transcript.task_type = answer.task_type;
                }
                transcript.final_submission = answer.final_submission;
                merged += 1;
            }
            None => warn!("found answer for ID {}, but no transcript has that id", id),
        }
    }

    merged
}
