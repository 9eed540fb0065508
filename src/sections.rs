//! Splitting of generated text into titled sections.
//!
//! The content service is asked to prefix section headings with a repeated
//! marker character (`## Heading`).  [`split_sections`] walks the response
//! once, line by line, and accumulates every non-heading line into the body of
//! the section that is current at that point.

/// Title of the section that collects text appearing before the first heading.
pub const DEFAULT_SECTION_TITLE: &str = "Introduction";

/// Line prefix convention that marks a heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadingMarker {
    character: char,
    min_repeat: usize,
}

impl Default for HeadingMarker {
    fn default() -> Self {
        Self {
            character: '#',
            min_repeat: 2,
        }
    }
}

impl HeadingMarker {
    /// Creates a marker convention. A repeat count of zero is treated as one.
    pub fn new(character: char, min_repeat: usize) -> Self {
        Self {
            character,
            min_repeat: min_repeat.max(1),
        }
    }

    /// The prefix the content service is asked to emit, e.g. `##`.
    pub fn prefix(&self) -> String {
        std::iter::repeat(self.character)
            .take(self.min_repeat)
            .collect()
    }

    /// Returns the heading title if `line` is a heading line.
    ///
    /// Every marker character is removed from the line, not only the leading
    /// run, and the remainder is trimmed.
    pub fn heading_title(&self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        let run = trimmed.chars().take_while(|c| *c == self.character).count();
        if run < self.min_repeat {
            return None;
        }

        let title: String = trimmed.chars().filter(|c| *c != self.character).collect();
        Some(title.trim().to_owned())
    }
}

/// Ordered mapping of section title to accumulated body text.
///
/// Titles are unique and keep the order in which they first appeared.  The
/// [`DEFAULT_SECTION_TITLE`] entry always exists and is always first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(String, String)>,
}

impl Default for SectionMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionMap {
    /// Creates a map holding only the empty default section.
    pub fn new() -> Self {
        Self {
            entries: vec![(DEFAULT_SECTION_TITLE.to_owned(), String::new())],
        }
    }

    /// Returns the body of the section with the given title.
    pub fn get(&self, title: &str) -> Option<&str> {
        self.position(title).map(|index| self.entries[index].1.as_str())
    }

    /// Returns the number of sections, including the default one.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; the default section is never removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(title, body)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(title, body)| (title.as_str(), body.as_str()))
    }

    /// Iterates over the section titles in insertion order.
    pub fn titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(title, _)| title.as_str())
    }

    /// Concatenation of every body in insertion order.
    pub fn joined_bodies(&self) -> String {
        self.entries.iter().map(|(_, body)| body.as_str()).collect()
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == title)
    }

    /// Returns the index of `title`, inserting an empty section if it is new.
    fn ensure(&mut self, title: String) -> usize {
        match self.position(&title) {
            Some(index) => index,
            None => {
                self.entries.push((title, String::new()));
                self.entries.len() - 1
            }
        }
    }

    fn append_line(&mut self, index: usize, line: &str) {
        let body = &mut self.entries[index].1;
        body.push_str(line);
        body.push('\n');
    }
}

impl<'a> IntoIterator for &'a SectionMap {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Returns `true` for characters that end a line.
///
/// Besides `\n` and `\r` this covers vertical tab, form feed, the ASCII file,
/// group and record separators, NEL and the Unicode line and paragraph
/// separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Iterator over the lines of a text, see [`split_lines`].
#[derive(Clone, Debug)]
pub struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.char_indices().find(|(_, c)| is_line_break(*c)) {
            Some((index, c)) => {
                let line = &self.rest[..index];
                let mut end = index + c.len_utf8();
                if c == '\r' && self.rest[end..].starts_with('\n') {
                    end += 1;
                }
                self.rest = &self.rest[end..];
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

/// Splits `text` into lines without their terminators.
///
/// Unlike [`str::lines`], a lone `\r`, vertical tab, form feed, NEL and the
/// Unicode line and paragraph separators end a line too.  `\r\n` counts as
/// one break and a final terminator does not produce an empty trailing line.
pub fn split_lines(text: &str) -> Lines<'_> {
    Lines { rest: text }
}

/// Splits `response` into sections using the given heading convention.
///
/// Repeated headings append to the existing section instead of replacing it.
pub fn split_sections(response: &str, marker: HeadingMarker) -> SectionMap {
    let mut sections = SectionMap::new();
    let mut current = 0;

    for line in split_lines(response) {
        match marker.heading_title(line) {
            Some(title) => current = sections.ensure(title),
            None => sections.append_line(current, line),
        }
    }

    sections
}
