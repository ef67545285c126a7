use anyhow::{Context, Error};
use chat_transcript_reader::metadata::{is_transcript_candidate, TranscriptSource};
use chat_transcript_reader::transcriptparser::{
    self, ParserSettings, DEFAULT_ASSISTANT_MARKER, DEFAULT_HUMAN_MARKER,
};
use chat_transcript_reader::{logging, merge_answers, read_answer, Transcript};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};


#[derive(Parser)]
#[command(
    name = "transcript-reader",
    version,
    about = "Recover prompt/response rounds from copy-pasted chat transcripts"
)]
struct Cli {
    /// Plain-text transcript exports, one paragraph per line
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Print raw paragraphs and parsed rounds instead of JSON
    #[arg(long)]
    debug: bool,
    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
    /// Line that opens a human prompt
    #[arg(long, default_value = DEFAULT_HUMAN_MARKER)]
    human_marker: String,
    /// Line that opens an assistant response
    #[arg(long, default_value = DEFAULT_ASSISTANT_MARKER)]
    assistant_marker: String,
    /// Answer file whose last paragraph is the student's final submission (repeatable)
    #[arg(long = "answers")]
    answers: Vec<PathBuf>,
    /// Copy artefact to drop (repeatable; replaces the built-in list)
    #[arg(long = "junk")]
    junk: Vec<String>,
    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}


fn main() -> Result<(), Error> {

    // $ transcript-reader "Conversation ID7 Task A.txt" > out.json

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut settings = ParserSettings::new(&cli.human_marker, &cli.assistant_marker)?;
    if !cli.junk.is_empty() {
        settings = settings.with_junk_lines(&cli.junk);
    }

    let files: Vec<&PathBuf> = cli
        .files
        .iter()
        .filter(|path| {
            let keep = is_transcript_candidate(path);
            if !keep {
                warn!("skipping {}", path.display());
            }
            keep
        })
        .collect();

    if cli.debug {
        for path in files {
            print_debug(path, &settings)?;
        }
        return Ok(());
    }

    let mut records: Vec<(TranscriptSource, Transcript)> = Vec::with_capacity(files.len());
    for path in files {
        debug!("read: {}", path.display());
        let source = TranscriptSource::from_path(path);
        let transcript = transcriptparser::parse_transcript_file(path, &settings)?;

        logging::log_transcript_parsed(
            &source.file_name,
            source.student_id.as_deref(),
            transcript.dialogue_history.len(),
        );
        records.push((source, transcript));
    }

    // numeric id order; files without an id go last
    records.sort_by_key(|(source, _)| {
        (
            source.numeric_id().is_none(),
            source.numeric_id(),
            source.file_name.clone(),
        )
    });

    let total_rounds = records
        .iter()
        .map(|(_, t)| t.dialogue_history.len())
        .sum();
    logging::log_run_complete(records.len(), total_rounds);

    let mut transcripts: Vec<Transcript> = records.into_iter().map(|(_, t)| t).collect();

    if !cli.answers.is_empty() {
        let mut answers = Vec::with_capacity(cli.answers.len());
        for path in cli.answers.iter().filter(|p| is_transcript_candidate(p)) {
            let answer = read_answer(path)
                .with_context(|| format!("Unable to load answer {}", path.display()))?;
            answers.push(answer);
        }
        let merged = merge_answers(&mut transcripts, answers);
        info!("Merged answers for {} students", merged);
    }

    let json = if cli.compact {
        serde_json::to_string(&transcripts)?
    } else {
        serde_json::to_string_pretty(&transcripts)?
    };
    println!("{}", json);

    Ok(())
}

fn print_debug(path: &Path, settings: &ParserSettings) -> Result<(), Error> {
    let paragraphs = transcriptparser::read_paragraphs(path)
        .with_context(|| format!("Unable to load transcript {}", path.display()))?;
    let turns = transcriptparser::parse_lines(&paragraphs, settings);
    let source = TranscriptSource::from_path(path);

    print!("{}", logging::debug_report(&source.file_name, &paragraphs, &turns));
    Ok(())
}
