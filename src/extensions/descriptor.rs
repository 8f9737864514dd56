//! Extension descriptor — the text format fetched from an extension URL.
//!
//! ```text
//! name: Dark Mode
//! author(s): Jane
//! applies-to: example\.com
//! ------
//! document.body.style.background='black';
//! ------
//! Inverts page colors.
//! ```
//!
//! Header lines are matched line-anchored and case-sensitive, and only before
//! the first delimiter line. The body is split on lines consisting of
//! `------`: the first section is the script, the second the description.
//! Anything after a third delimiter line is ignored.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use url::{Position, Url};

use crate::error::ParseError;

/// Name used when the `name:` line is present but blank.
pub const DEFAULT_EXTENSION_NAME: &str = "ABrowserExtension";

/// Line separating the header, code, and description sections.
pub const SECTION_DELIMITER: &str = "------";

const NAME_LABEL: &str = "name";
const AUTHOR_LABEL: &str = "author(s)";
const APPLIES_TO_LABEL: &str = "applies-to";

static NAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^name:[ \t]*(.*)$").expect("name regex"));
static AUTHOR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^author\(s\):[ \t]*(.*)$").expect("author regex"));
static APPLIES_TO_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^applies-to:[ \t]*(.*)$").expect("applies-to regex"));

/// A parsed extension: metadata plus the script to inject.
#[derive(Debug, Clone)]
pub struct ExtensionDescriptor {
    name: String,
    author: String,
    applies_to: Regex,
    code: String,
    description: String,
}

impl ExtensionDescriptor {
    /// Build a descriptor from its parts, compiling `applies_to`.
    ///
    /// Only values that survive [`to_text`](Self::to_text) unchanged are
    /// accepted: header fields are single trimmed lines (name non-empty,
    /// pattern non-blank), and code and description have no delimiter lines,
    /// no CRLF line endings, and no blank first or last line.
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        applies_to: &str,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let name = name.into();
        let author = author.into();
        let code = code.into();
        let description = description.into();

        if name.is_empty() {
            return Err(invalid(NAME_LABEL, "must not be empty"));
        }
        check_header_value(NAME_LABEL, &name)?;
        check_header_value(AUTHOR_LABEL, &author)?;
        if applies_to.trim().is_empty() {
            return Err(ParseError::MissingField(APPLIES_TO_LABEL));
        }
        check_header_value(APPLIES_TO_LABEL, applies_to)?;
        check_section("code", &code)?;
        check_section("description", &description)?;

        Ok(Self {
            name,
            author,
            applies_to: compile_pattern(applies_to)?,
            code,
            description,
        })
    }

    /// Parse descriptor text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let sections = split_sections(text);
        let header = &sections[0];

        let name = capture(&NAME_LINE, header).ok_or(ParseError::MissingField(NAME_LABEL))?;
        let author =
            capture(&AUTHOR_LINE, header).ok_or(ParseError::MissingField(AUTHOR_LABEL))?;
        let applies_to = capture(&APPLIES_TO_LINE, header)
            .filter(|pattern| !pattern.is_empty())
            .ok_or(ParseError::MissingField(APPLIES_TO_LABEL))?;

        if sections.len() < 3 {
            return Err(ParseError::MalformedBody {
                sections: sections.len(),
            });
        }

        let name = if name.is_empty() {
            DEFAULT_EXTENSION_NAME
        } else {
            name
        };

        Self::new(
            name,
            author,
            applies_to,
            sections[1].clone(),
            sections[2].clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Pattern describing which pages this extension targets.
    pub fn applies_to(&self) -> &Regex {
        &self.applies_to
    }

    /// Script body injected into the page.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the `applies-to` pattern matches `url`.
    ///
    /// The pattern is searched, unanchored, in the host, port, and path only
    /// (`example.com:8080/page`). Scheme, credentials, query, and fragment
    /// are left out, so a search for `example.com` does not count as a visit.
    /// An unescaped `.` in the pattern still matches any character.
    pub fn applies_to_url(&self, url: &Url) -> bool {
        self.applies_to
            .is_match(&url[Position::BeforeHost..Position::AfterPath])
    }

    /// Render back into descriptor text. Parsing the result gives an equal
    /// descriptor.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for ExtensionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.author == other.author
            && self.applies_to.as_str() == other.applies_to.as_str()
            && self.code == other.code
            && self.description == other.description
    }
}

impl Eq for ExtensionDescriptor {}

impl fmt::Display for ExtensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{NAME_LABEL}: {}", self.name)?;
        writeln!(f, "{AUTHOR_LABEL}: {}", self.author)?;
        writeln!(f, "{APPLIES_TO_LABEL}: {}", self.applies_to.as_str())?;
        writeln!(f, "{SECTION_DELIMITER}")?;
        writeln!(f, "{}", self.code)?;
        writeln!(f, "{SECTION_DELIMITER}")?;
        writeln!(f, "{}", self.description)
    }
}

impl FromStr for ExtensionDescriptor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(pattern).map_err(|source| ParseError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn invalid(field: &'static str, reason: &str) -> ParseError {
    ParseError::InvalidField {
        field,
        reason: reason.to_string(),
    }
}

/// Header values are written after `label: ` on one line and read back trimmed.
fn check_header_value(field: &'static str, value: &str) -> Result<(), ParseError> {
    if value.contains(['\r', '\n']) {
        return Err(invalid(field, "must be a single line"));
    }
    if value.trim() != value {
        return Err(invalid(field, "must not start or end with whitespace"));
    }
    Ok(())
}

/// Sections are read back line by line and edge-trimmed by [`join_trimmed`].
fn check_section(field: &'static str, text: &str) -> Result<(), ParseError> {
    if text.is_empty() {
        return Ok(());
    }

    let lines: Vec<&str> = text.split('\n').collect();
    if lines.iter().any(|l| l.ends_with('\r')) {
        return Err(invalid(field, "must use '\\n' line endings"));
    }
    if lines.iter().any(|l| l.trim() == SECTION_DELIMITER) {
        return Err(invalid(field, "must not contain a delimiter line"));
    }
    let blank_edge = |line: Option<&&str>| line.is_some_and(|l| l.trim().is_empty());
    if blank_edge(lines.first()) || blank_edge(lines.last()) {
        return Err(invalid(field, "must not start or end with a blank line"));
    }
    Ok(())
}

fn capture<'t>(line: &Regex, header: &'t str) -> Option<&'t str> {
    line.captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Split on delimiter lines. Always returns at least one section (the header).
fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim() == SECTION_DELIMITER {
            sections.push(join_trimmed(&current));
            current.clear();
        } else {
            current.push(line);
        }
    }
    sections.push(join_trimmed(&current));

    sections
}

/// Join lines, dropping leading and trailing blank lines.
fn join_trimmed(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}
