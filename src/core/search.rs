use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::config::Config;
use super::error::SearchError;
use super::reader::FileReader;

/// Characters of context kept on each side of a match.
pub const DEFAULT_SNIPPET_RADIUS: usize = 40;

/// A validated `search_file` request. The keyword is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    keyword: String,
    path: String,
    case_sensitive: bool,
}

impl SearchRequest {
    pub fn new(
        keyword: &str,
        path: impl Into<String>,
        case_sensitive: bool,
    ) -> Result<Self, SearchError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SearchError::InvalidArgument(
                "Keyword cannot be empty or whitespace only.".to_string(),
            ));
        }

        Ok(Self {
            keyword: keyword.to_string(),
            path: path.into(),
            case_sensitive,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }
}

/// One literal match inside a single line. Offsets count characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub line_number: usize,
    pub start: usize,
    pub end: usize,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The path exactly as requested, not the resolved one.
    pub file: String,
    pub keyword: String,
    pub total_occurrences: usize,
    pub occurrences: Vec<Occurrence>,
}

pub struct KeywordSearcher {
    reader: FileReader,
    snippet_radius: usize,
}

impl Default for KeywordSearcher {
    fn default() -> Self {
        Self {
            reader: FileReader::default(),
            snippet_radius: DEFAULT_SNIPPET_RADIUS,
        }
    }
}

impl KeywordSearcher {
    pub fn new(reader: FileReader, snippet_radius: usize) -> Self {
        Self {
            reader,
            snippet_radius,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FileReader::new().with_max_file_size(config.effective_max_file_size()),
            config.effective_snippet_radius(),
        )
    }

    pub fn reader(&self) -> &FileReader {
        &self.reader
    }

    /// Load the requested file and collect every occurrence of the keyword.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let content = self.reader.read(request.path())?;
        let occurrences = self.scan(&content, request.keyword(), request.case_sensitive());

        log::info!(
            "Found {} occurrences of '{}' in {}",
            occurrences.len(),
            request.keyword(),
            request.path()
        );

        Ok(SearchResult {
            file: request.path().to_string(),
            keyword: request.keyword().to_string(),
            total_occurrences: occurrences.len(),
            occurrences,
        })
    }

    /// Scan already-loaded text. The keyword is matched literally.
    pub fn scan(
        &self,
        content: &str,
        keyword: &str,
        case_sensitive: bool,
    ) -> Vec<Occurrence> {
        let matcher = Matcher::new(keyword, case_sensitive);
        let mut occurrences = Vec::new();

        for (idx, line) in split_lines(content).enumerate() {
            // Byte offsets are converted to character offsets incrementally,
            // since matches arrive left to right.
            let mut last_byte = 0;
            let mut last_char = 0;

            for (m_start, m_end) in matcher.find_iter(line) {
                let start = last_char + line[last_byte..m_start].chars().count();
                let end = start + line[m_start..m_end].chars().count();
                last_byte = m_end;
                last_char = end;

                occurrences.push(Occurrence {
                    line_number: idx + 1,
                    start,
                    end,
                    snippet: snippet(line, m_start, m_end, self.snippet_radius).to_string(),
                });
            }
        }

        occurrences
    }
}

/// Literal keyword matcher yielding non-overlapping byte ranges.
enum Matcher {
    Exact(String),
    Pattern(Regex),
    /// Char-by-char case-insensitive comparison, for keywords too large to
    /// compile.
    Folded(Vec<char>),
}

impl Matcher {
    fn new(keyword: &str, case_sensitive: bool) -> Self {
        if case_sensitive {
            return Matcher::Exact(keyword.to_string());
        }

        // Compiled size grows with the keyword; scale the limits with it.
        let limit = keyword.len().saturating_mul(1 << 10).max(10 << 20);
        match RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .size_limit(limit)
            .dfa_size_limit(limit)
            .build()
        {
            Ok(regex) => Matcher::Pattern(regex),
            Err(e) => {
                log::debug!("Falling back to folded comparison: {}", e);
                Matcher::Folded(keyword.chars().collect())
            }
        }
    }

    fn find_iter<'a>(&'a self, line: &'a str) -> Box<dyn Iterator<Item = (usize, usize)> + 'a> {
        match self {
            Matcher::Exact(keyword) => Box::new(
                line.match_indices(keyword.as_str())
                    .map(|(i, m)| (i, i + m.len())),
            ),
            Matcher::Pattern(regex) => {
                Box::new(regex.find_iter(line).map(|m| (m.start(), m.end())))
            }
            Matcher::Folded(keyword) => Box::new(folded_matches(line, keyword).into_iter()),
        }
    }
}

fn folded_matches(line: &str, keyword: &[char]) -> Vec<(usize, usize)> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut found = Vec::new();
    let mut i = 0;

    while i + keyword.len() <= chars.len() {
        let window = &chars[i..i + keyword.len()];
        if window.iter().zip(keyword).all(|(&(_, a), &b)| chars_fold_eq(a, b)) {
            let end = chars
                .get(i + keyword.len())
                .map(|&(b, _)| b)
                .unwrap_or(line.len());
            found.push((chars[i].0, end));
            i += keyword.len();
        } else {
            i += 1;
        }
    }

    found
}

fn chars_fold_eq(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase()) || a.to_uppercase().eq(b.to_uppercase())
}

/// Context around the byte range `start..end`, up to `radius` characters on
/// each side, clipped to the line.
fn snippet(line: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = line[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);

    let to = line[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(line.len());

    &line[from..to]
}

/// Characters that end a line, besides `\r\n` which counts as one break.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Split on every line boundary (`\n`, `\r\n`, `\r`, vertical tab, form feed,
/// file/group/record separators, NEL, U+2028, U+2029), dropping terminators.
/// A trailing terminator does not start an extra empty line.
pub fn split_lines(text: &str) -> Lines<'_> {
    Lines { rest: text }
}

pub struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.char_indices().find(|(_, c)| LINE_BREAKS.contains(c)) {
            Some((i, c)) => {
                let line = &self.rest[..i];
                let skip = if self.rest[i..].starts_with("\r\n") {
                    2
                } else {
                    c.len_utf8()
                };
                self.rest = &self.rest[i + skip..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}
