use std::ops::Range;

use crate::error::{AsmError, ErrorKind, Result};

pub const DATA_MARKER: &str = ".data";
pub const CODE_MARKER: &str = ".code";
pub const COMMENT: char = ';';

/// One line of source with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self { number, text: text.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Same line number, new text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self::new(self.number, text)
    }
}

/// Splits source text into numbered lines with `;` comments removed.
pub fn read_lines(src: &str) -> Vec<SourceLine> {
    src.lines()
        .enumerate()
        .map(|(idx, raw)| {
            let text = match raw.find(COMMENT) {
                Some(p) => &raw[..p],
                None => raw,
            };
            SourceLine::new(idx + 1, text.trim_end())
        })
        .collect()
}

/// Line ranges of the two segments. A missing segment is an empty range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments {
    pub data: Range<usize>,
    pub code: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Data,
    Code,
}

impl Marker {
    fn of(line: &SourceLine) -> Option<Self> {
        // markers are prefix matches at the very start of the line
        if line.text.starts_with(DATA_MARKER) {
            Some(Marker::Data)
        } else if line.text.starts_with(CODE_MARKER) {
            Some(Marker::Code)
        } else {
            None
        }
    }

    fn name(self) -> &'static str {
        match self {
            Marker::Data => DATA_MARKER,
            Marker::Code => CODE_MARKER,
        }
    }
}

impl Segments {
    /// Each segment runs from the line after its marker up to the next marker
    /// or the end of the file.
    pub fn split(lines: &[SourceLine]) -> Result<Self> {
        let markers: Vec<(usize, Marker)> = lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| Marker::of(line).map(|m| (idx, m)))
            .collect();

        let mut segments = Segments::default();
        let mut seen_data = false;
        let mut seen_code = false;
        for (pos, &(idx, marker)) in markers.iter().enumerate() {
            let end = markers.get(pos + 1).map_or(lines.len(), |&(next, _)| next);
            let seen = match marker {
                Marker::Data => &mut seen_data,
                Marker::Code => &mut seen_code,
            };
            if *seen {
                return Err(AsmError::new(
                    lines[idx].number,
                    ErrorKind::DuplicateSegment(marker.name()),
                ));
            }
            *seen = true;
            match marker {
                Marker::Data => segments.data = idx + 1..end,
                Marker::Code => segments.code = idx + 1..end,
            }
        }
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn comments_are_stripped() {
        let lines = read_lines("ADD A , B ; sum\n; whole line\nNOOP");
        assert_eq!(lines[0].text, "ADD A , B");
        assert!(lines[1].is_blank());
        assert_eq!(lines[2].number, 3);
    }

    #[test]
    fn split_finds_both_ranges() {
        let lines = read_lines(".data\nx BYTE 1\n\n.code\nNOOP\nNOOP\n");
        let seg = Segments::split(&lines).unwrap();
        assert_eq!(seg.data, 1..3);
        assert_eq!(seg.code, 4..6);
    }

    #[test]
    fn code_before_data_is_bounded() {
        let lines = read_lines(".code\nNOOP\n.data\nx BYTE 1\n");
        let seg = Segments::split(&lines).unwrap();
        assert_eq!(seg.code, 1..2);
        assert_eq!(seg.data, 3..4);
    }

    #[test]
    fn indented_marker_is_not_a_marker() {
        let lines = read_lines("  .code\nNOOP\n");
        let seg = Segments::split(&lines).unwrap();
        assert!(seg.code.is_empty());
    }

    #[test]
    fn repeated_marker_rejected() {
        let lines = read_lines(".code\nNOOP\n.code\n");
        let err = Segments::split(&lines).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.kind, ErrorKind::DuplicateSegment(".code"));
    }
}
