//! Search results display
//!
//! One framed block per search: a header with the keyword, one row per
//! occurrence with its position and the snippet, the match highlighted.

use colored::Colorize;
use std::path::Path;

use super::theme::{BoxChars, Theme};
use crate::core::search::{Occurrence, SearchResult};

/// Display search results. `snippet_radius` locates the match inside each
/// snippet for highlighting.
pub fn display_results(result: &SearchResult, snippet_radius: usize) {
    let term_width = terminal_width();

    print_header(result, term_width);

    if result.occurrences.is_empty() {
        print_empty_state();
    } else {
        for occurrence in &result.occurrences {
            print_occurrence(occurrence, snippet_radius, term_width);
        }
    }

    print_footer(result, term_width);
}

fn print_header(result: &SearchResult, width: usize) {
    println!();

    let border = BoxChars::H_LINE.repeat(width.saturating_sub(2));
    println!(
        "{}{}{}",
        BoxChars::TL_CORNER.color(Theme::BORDER_ACCENT),
        border.color(Theme::BORDER),
        BoxChars::TR_CORNER.color(Theme::BORDER_ACCENT)
    );

    let title = format!(" {} {} ", BoxChars::DIAMOND, shorten_path(&result.file, 40));
    let keyword_display = format!("\"{}\"", truncate_chars(&result.keyword, 30));

    println!(
        "{} {}{}",
        BoxChars::V_LINE.color(Theme::BORDER_ACCENT),
        title.color(Theme::NEON_CYAN).bold(),
        keyword_display.color(Theme::NEON_MAGENTA),
    );

    println!(
        "{}{}{}",
        BoxChars::T_RIGHT.color(Theme::BORDER_ACCENT),
        BoxChars::H_LINE
            .repeat(width.saturating_sub(2))
            .color(Theme::BORDER),
        BoxChars::T_LEFT.color(Theme::BORDER_ACCENT)
    );
}

fn print_occurrence(occurrence: &Occurrence, snippet_radius: usize, width: usize) {
    let position = format!(
        "L{}:{}-{}",
        occurrence.line_number, occurrence.start, occurrence.end
    );

    let budget = width.saturating_sub(position.len() + 6);
    let (before, matched, after) = fit_snippet(occurrence, snippet_radius, budget);

    println!(
        "{} {:>14}  {}{}{}",
        BoxChars::V_LINE.color(Theme::BORDER),
        position.color(Theme::SUBTLE),
        before,
        matched.color(Theme::MATCH).bold(),
        after
    );
}

/// Split the snippet, cutting the trailing context to `budget` columns.
fn fit_snippet(
    occurrence: &Occurrence,
    snippet_radius: usize,
    budget: usize,
) -> (&str, &str, &str) {
    let (before, matched, after) = split_snippet(occurrence, snippet_radius);
    let used = before.chars().count() + matched.chars().count();
    (before, matched, truncate_chars(after, budget.saturating_sub(used)))
}

/// Split a snippet into the text before, inside and after the match.
fn split_snippet(occurrence: &Occurrence, snippet_radius: usize) -> (&str, &str, &str) {
    let snippet = occurrence.snippet.as_str();
    let lead = occurrence.start - occurrence.start.saturating_sub(snippet_radius);
    let len = occurrence.end - occurrence.start;

    let byte_at = |chars: usize| {
        snippet
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(snippet.len())
    };
    let from = byte_at(lead);
    let to = byte_at(lead + len);

    (&snippet[..from], &snippet[from..to], &snippet[to..])
}

fn print_empty_state() {
    println!(
        "{} {}",
        BoxChars::V_LINE.color(Theme::BORDER),
        "No matches found".color(Theme::EMPTY).italic()
    );
}

fn print_footer(result: &SearchResult, width: usize) {
    let border = BoxChars::H_LINE.repeat(width.saturating_sub(2));
    println!(
        "{}{}{}",
        BoxChars::BL_CORNER.color(Theme::BORDER_ACCENT),
        border.color(Theme::BORDER),
        BoxChars::BR_CORNER.color(Theme::BORDER_ACCENT)
    );

    let stats = format!(
        " {} Found {} occurrences {} kwsearch v{} ",
        BoxChars::CHECK,
        result.total_occurrences,
        BoxChars::BULLET,
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", stats.color(Theme::SUBTLE));
    println!();
}

/// Get terminal width, default to 80
fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
        .max(60)
}

/// Truncate to at most `max_chars` characters
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Shorten path for display
fn shorten_path(path: &str, max_len: usize) -> String {
    let p = Path::new(path);

    let filename = p.file_name().and_then(|f| f.to_str()).unwrap_or(path);

    let parent = p
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|f| f.to_str())
        .unwrap_or("");

    if parent.is_empty() {
        filename.to_string()
    } else {
        let short = format!("{}/{}", parent, filename);
        if short.len() > max_len {
            format!(".../{}", filename)
        } else {
            short
        }
    }
}
