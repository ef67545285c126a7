//! Log setup and helpers for printing transcripts.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::Turn;

/// Install the stderr subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// One-line summary per parsed transcript file.
pub fn log_transcript_parsed(file_name: &str, student_id: Option<&str>, rounds: usize) {
    info!(
        "✓ {} (ID {}): {} rounds",
        file_name,
        student_id.unwrap_or("?"),
        rounds
    );
}

pub fn log_run_complete(files: usize, rounds: usize) {
    info!("{}", "=".repeat(60));
    info!("📊 Parsed {} transcripts, {} rounds in total", files, rounds);
    info!("{}", "=".repeat(60));
}

/// Shorten long text for log display, counting chars rather than bytes.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// Numbered raw paragraphs followed by every parsed round, for eyeballing
/// a transcript the parser got wrong.
pub fn debug_report(title: &str, paragraphs: &[String], turns: &[Turn]) -> String {
    let mut out = format!("--- RAW PARAGRAPHS: {} ---\n", title);
    for (i, p) in paragraphs.iter().enumerate() {
        out.push_str(&format!("[{}]: {}\n", i + 1, p));
    }
    out.push_str(&format!("{}\n\n", "-".repeat(37)));

    if turns.is_empty() {
        out.push_str("No dialogue rounds were parsed.\n");
        return out;
    }

    for turn in turns {
        out.push_str(&format!(
            "*** ROUND {} ***\n[STUDENT]:\n{}\n{}\n[GPT]:\n{}\n\n{}\n\n",
            turn.round,
            turn.human_text,
            "-".repeat(17),
            turn.assistant_text,
            "=".repeat(33)
        ));
    }

    out
}
