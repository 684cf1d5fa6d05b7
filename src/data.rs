use serde::Serialize;
use tracing::debug;

use crate::config::AsmConfig;
use crate::error::{AsmError, ErrorKind, Result};
use crate::literal::parse_number;
use crate::source::SourceLine;
use crate::symbols::check_label_name;

/// A named byte sequence placed in the data segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataLabel {
    pub name: String,
    /// Declared type token. Carried for re-rendering only.
    pub kind: String,
    pub bytes: Vec<u8>,
    pub start_address: u8,
    pub line: usize,
}

impl DataLabel {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Data labels in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataSegment {
    labels: Vec<DataLabel>,
}

/// `name TYPE values` with a non-empty value list, or `None`.
fn split_declaration(text: &str) -> Option<(&str, &str, &str)> {
    let (name, rest) = text.trim_start().split_once(char::is_whitespace)?;
    let (kind, values) = rest.trim_start().split_once(char::is_whitespace)?;
    let values = values.trim();
    (!values.is_empty()).then_some((name, kind, values))
}

fn parse_byte(token: &str) -> Result<u8, ErrorKind> {
    let value: i64 = parse_number(token).ok_or_else(|| ErrorKind::InvalidLiteral(token.to_string()))?;
    u8::try_from(value).map_err(|_| ErrorKind::ImmediateOutOfRange { value, bits: 8 })
}

impl DataSegment {
    /// Compiles the lines of a data segment. Lines that are not
    /// declarations are skipped.
    pub fn compile(lines: &[SourceLine], cfg: &AsmConfig) -> Result<Self> {
        let mut labels: Vec<DataLabel> = Vec::new();
        let mut offset = 0usize;

        for line in lines {
            let Some((name, kind, values)) = split_declaration(&line.text) else {
                continue;
            };
            let fail = |k| AsmError::new(line.number, k);

            check_label_name(name).map_err(fail)?;
            if let Some(prev) = labels.iter().find(|l| l.name == name) {
                return Err(fail(ErrorKind::DuplicateLabel { name: name.to_string(), first: prev.line }));
            }
            if labels.len() >= cfg.max_data_labels {
                return Err(fail(ErrorKind::TooManyLabels { kind: "data", limit: cfg.max_data_labels }));
            }

            let bytes = values
                .split(',')
                .map(|tok| parse_byte(tok.trim()))
                .collect::<Result<Vec<u8>, ErrorKind>>()
                .map_err(fail)?;

            let start = offset;
            offset += bytes.len();
            let overflow = ErrorKind::DataSegmentOverflow { used: offset, capacity: cfg.data_segment_size };
            if offset >= cfg.data_segment_size {
                return Err(fail(overflow));
            }
            let start_address = u8::try_from(start).map_err(|_| fail(overflow))?;

            debug!(label = name, start_address, len = bytes.len(), "data label");
            labels.push(DataLabel {
                name: name.to_string(),
                kind: kind.to_string(),
                bytes,
                start_address,
                line: line.number,
            });
        }

        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[DataLabel] {
        &self.labels
    }

    pub fn get(&self, name: &str) -> Option<&DataLabel> {
        self.labels.iter().find(|l| l.name == name)
    }

    /// Raw bytes of every label, in declaration order.
    pub fn image(&self) -> Vec<u8> {
        self.labels.iter().flat_map(|l| l.bytes.iter().copied()).collect()
    }

    /// Total declared bytes.
    pub fn len(&self) -> usize {
        self.labels.iter().map(DataLabel::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
