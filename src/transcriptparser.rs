//! Recovers ordered (prompt, response) turns from copy-pasted chat text.
//!
//! Lines flow through four stages: junk filter, fused-marker splitter,
//! turn state machine, round finalizer. None of them can fail; only reading
//! the input file can.

use anyhow::{Context, Error};
use regex::Regex;
use std::{fs, path::Path};
use tracing::{debug, trace};

use crate::logging::truncate_text;
use crate::{ClassifiedLine, LineKind, Transcript, TranscriptError, TranscriptSource, Turn};

pub const DEFAULT_HUMAN_MARKER: &str = "You said:";
pub const DEFAULT_ASSISTANT_MARKER: &str = "ChatGPT said:";
pub const DEFAULT_JUNK_LINES: [&str; 3] = ["top of form", "bottom of form", "sources"];

const LINE_SEPARATOR: &str = "\n";


#[derive(Debug, Clone)]
pub struct ParserSettings {
    human_marker: Regex,
    assistant_marker: Regex,
    junk_lines: Vec<String>,
}

impl ParserSettings {
    pub fn new(human_marker: &str, assistant_marker: &str) -> Result<Self, TranscriptError> {
        Ok(ParserSettings {
            human_marker: marker_pattern(human_marker)?,
            assistant_marker: marker_pattern(assistant_marker)?,
            junk_lines: DEFAULT_JUNK_LINES.iter().map(|j| j.to_string()).collect(),
        })
    }

    /// Replace the junk list. Matching is case-insensitive on trimmed lines.
    pub fn with_junk_lines<I, S>(mut self, junk: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.junk_lines = junk
            .into_iter()
            .map(|j| j.as_ref().trim().to_lowercase())
            .filter(|j| !j.is_empty())
            .collect();
        self
    }

    pub fn is_junk(&self, line: &str) -> bool {
        let line = line.trim().to_lowercase();
        self.junk_lines.iter().any(|j| *j == line)
    }

    /// Start and end of the first assistant marker inside a line that opens
    /// with the human marker, i.e. where a fused line must be cut.
    pub fn fused_split_point(&self, line: &str) -> Option<(usize, usize)> {
        let human = leading_match(&self.human_marker, line)?;
        self.assistant_marker
            .find_at(line, human)
            .map(|m| (m.start(), m.end()))
    }

    /// A marker is the marker text alone on its line; anything longer is content.
    pub fn classify<'src>(&self, line: &'src str) -> ClassifiedLine<'src> {
        let kind = if is_whole_line(&self.human_marker, line) {
            LineKind::HumanMarker
        } else if is_whole_line(&self.assistant_marker, line) {
            LineKind::AssistantMarker
        } else {
            return ClassifiedLine {
                kind: LineKind::Content,
                text: line,
            };
        };
        ClassifiedLine { kind, text: "" }
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        ParserSettings::new(DEFAULT_HUMAN_MARKER, DEFAULT_ASSISTANT_MARKER)
            .expect("built-in markers are valid")
    }
}

fn marker_pattern(marker: &str) -> Result<Regex, TranscriptError> {
    let marker = marker.trim();
    if marker.is_empty() {
        return Err(TranscriptError::InvalidMarker {
            marker: marker.to_string(),
            reason: "marker text is empty".to_string(),
        });
    }
    Regex::new(&format!("(?i){}", regex::escape(marker))).map_err(|e| {
        TranscriptError::InvalidMarker {
            marker: marker.to_string(),
            reason: e.to_string(),
        }
    })
}

/// End offset of `re` when it matches at the very start of `line`.
fn leading_match(re: &Regex, line: &str) -> Option<usize> {
    re.find(line).filter(|m| m.start() == 0).map(|m| m.end())
}

fn is_whole_line(re: &Regex, line: &str) -> bool {
    let line = line.trim();
    leading_match(re, line) == Some(line.len())
}


/// Drop copy artefacts ("Top of Form", "Sources", ...). Everything else passes.
pub fn filter_junk<'src, S: AsRef<str>>(
    lines: &'src [S],
    settings: &ParserSettings,
) -> Vec<&'src str> {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !settings.is_junk(l))
        .collect()
}

/// Break "You said: ... ChatGPT said: ..." lines in two at the first
/// assistant marker and classify the result.
///
/// A fused line becomes a bare human marker followed by an assistant marker
/// carrying the text after it. Whatever sat between the two markers is not
/// kept. Every other line goes through `ParserSettings::classify`.
pub fn split_fused<'src>(
    lines: Vec<&'src str>,
    settings: &ParserSettings,
) -> Vec<ClassifiedLine<'src>> {
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        match settings.fused_split_point(line) {
            Some((start, end)) => {
                debug!(
                    head = %truncate_text(line[..start].trim(), 80),
                    "splitting fused marker line"
                );
                out.push(ClassifiedLine {
                    kind: LineKind::HumanMarker,
                    text: "",
                });
                out.push(ClassifiedLine {
                    kind: LineKind::AssistantMarker,
                    text: line[end..].trim(),
                });
            }
            None => out.push(settings.classify(line)),
        }
    }

    out
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Seeking,
    InHuman,
    InAssistant,
}

/// Accumulates classified lines into turns.
///
/// Content is never dropped once a turn has been opened: it goes to whichever
/// buffer is open. Text carried by a marker (only the tail of a fused line has
/// any) is appended after the marker's transition.
#[derive(Debug)]
pub struct TurnStateMachine<'src> {
    state: ParserState,
    human: Vec<&'src str>,
    assistant: Vec<&'src str>,
    turns: Vec<Turn>,
}

impl<'src> TurnStateMachine<'src> {
    pub fn new() -> Self {
        TurnStateMachine {
            state: ParserState::Seeking,
            human: Vec::new(),
            assistant: Vec::new(),
            turns: Vec::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn feed(&mut self, line: ClassifiedLine<'src>) {
        use LineKind::*;
        use ParserState::*;

        match (self.state, line.kind) {
            (Seeking, HumanMarker) => self.state = InHuman,
            // A response before any prompt: act as if a bare human marker preceded it.
            (Seeking, AssistantMarker) => self.open_response(),
            (Seeking, Content) => {
                trace!(line = line.text, "content before first marker ignored");
                return;
            }
            (InHuman, HumanMarker) => {
                if self.human.is_empty() {
                    trace!("duplicate human marker absorbed");
                } else {
                    debug!("repeated human marker closes a round without a response");
                    self.close_turn();
                }
            }
            (InHuman, AssistantMarker) => self.open_response(),
            (InAssistant, HumanMarker) => {
                self.close_turn();
                self.state = InHuman;
            }
            (InAssistant, AssistantMarker) => trace!("duplicate assistant marker absorbed"),
            (InHuman, Content) | (InAssistant, Content) => {}
        }

        self.push_text(line.text);
    }

    /// Flush whatever is still buffered and hand back the unnumbered turns.
    pub fn finish(mut self) -> Vec<Turn> {
        self.close_turn();
        self.turns
    }

    fn open_response(&mut self) {
        if self.human.is_empty() {
            // explicit empty prompt
            self.human.push("");
        }
        self.state = ParserState::InAssistant;
    }

    fn push_text(&mut self, text: &'src str) {
        if text.is_empty() {
            return;
        }
        match self.state {
            ParserState::InHuman => self.human.push(text),
            ParserState::InAssistant => self.assistant.push(text),
            ParserState::Seeking => {}
        }
    }

    fn close_turn(&mut self) {
        if self.human.is_empty() && self.assistant.is_empty() {
            return;
        }
        self.turns.push(Turn {
            human_text: self.human.join(LINE_SEPARATOR),
            assistant_text: self.assistant.join(LINE_SEPARATOR),
            round: 0,
        });
        self.human.clear();
        self.assistant.clear();
    }
}

impl Default for TurnStateMachine<'_> {
    fn default() -> Self {
        Self::new()
    }
}


/// Drop fully empty turns and number the rest 1, 2, 3, ...
pub fn finalize_rounds(turns: Vec<Turn>) -> Vec<Turn> {
    turns
        .into_iter()
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(i, turn)| Turn {
            round: i + 1,
            ..turn
        })
        .collect()
}

pub fn parse_lines<S: AsRef<str>>(lines: &[S], settings: &ParserSettings) -> Vec<Turn> {
    let kept = filter_junk(lines, settings);
    let kept_count = kept.len();
    let split = split_fused(kept, settings);

    let mut machine = TurnStateMachine::new();
    for line in split.iter().copied() {
        machine.feed(line);
    }
    let raw = machine.finish();
    let raw_count = raw.len();
    let turns = finalize_rounds(raw);

    debug!(
        input = lines.len(),
        junk = lines.len() - kept_count,
        split_lines = split.len(),
        raw_turns = raw_count,
        rounds = turns.len(),
        "parsed transcript"
    );

    turns
}


/// Read a plain-text export: one paragraph per line, trimmed, blanks dropped.
pub fn read_paragraphs(path: &Path) -> Result<Vec<String>, TranscriptError> {
    let raw = fs::read_to_string(path).map_err(|source| TranscriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(raw
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn parse_transcript_file(path: &Path, settings: &ParserSettings) -> Result<Transcript, Error> {
    let paragraphs = read_paragraphs(path)
        .with_context(|| format!("Unable to load transcript {}", path.display()))?;
    let source = TranscriptSource::from_path(path);

    Ok(Transcript {
        student_id: source.student_id,
        task_type: source.task_type,
        dialogue_history: parse_lines(&paragraphs, settings),
        final_submission: None,
    })
}
