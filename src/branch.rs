//! Branch labels: `name:` prefixes become PC-relative offsets.
//!
//! A label's address is the index of the next instruction. A use at
//! instruction `U` of a label at `L` is replaced by `L - U - 1`, the offset
//! added to the program counter after fetch.

use tracing::debug;

use crate::config::AsmConfig;
use crate::data::DataSegment;
use crate::error::{AsmError, ErrorKind, Result};
use crate::source::SourceLine;
use crate::symbols::{check_label_name, substitute};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDest {
    pub name: String,
    /// Zero-based instruction index.
    pub address: usize,
    pub line: usize,
}

/// Instruction lines with every branch label resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    /// One entry per instruction, in program order.
    pub lines: Vec<SourceLine>,
    pub dest_count: usize,
}

/// Records and strips `name:` prefixes. Returns the remaining instruction
/// lines and the destinations found.
pub fn strip_labels(
    code: &[SourceLine],
    data: &DataSegment,
    cfg: &AsmConfig,
) -> Result<(Vec<SourceLine>, Vec<BranchDest>)> {
    let mut dests: Vec<BranchDest> = Vec::new();
    let mut lines = Vec::new();

    for line in code {
        let fail = |k| AsmError::new(line.number, k);
        let mut text = line.text.as_str();
        while let Some((head, rest)) = text.split_once(':') {
            let name = head.trim();
            check_label_name(name).map_err(fail)?;
            let first = dests
                .iter()
                .find(|d| d.name == name)
                .map(|d| d.line)
                .or_else(|| data.get(name).map(|l| l.line));
            if let Some(first) = first {
                return Err(fail(ErrorKind::DuplicateLabel { name: name.to_string(), first }));
            }
            if dests.len() >= cfg.max_branch_labels {
                return Err(fail(ErrorKind::TooManyLabels { kind: "branch", limit: cfg.max_branch_labels }));
            }
            debug!(label = name, address = lines.len(), "branch label");
            dests.push(BranchDest { name: name.to_string(), address: lines.len(), line: line.number });
            text = rest;
        }
        let stripped = line.with_text(text.trim());
        if !stripped.is_blank() {
            lines.push(stripped);
        }
    }

    Ok((lines, dests))
}

/// Replaces each use of a destination name with its PC-relative offset.
pub fn substitute_dests(lines: &[SourceLine], dests: &[BranchDest]) -> Result<Vec<SourceLine>> {
    lines
        .iter()
        .enumerate()
        .map(|(pc, line)| {
            let mut err = None;
            let text = substitute(&line.text, |w| {
                let dest = dests.iter().find(|d| d.name == w.text)?;
                let offset = dest.address as i64 - pc as i64 - 1;
                if i8::try_from(offset).is_err() {
                    err.get_or_insert(ErrorKind::BranchOutOfRange { name: dest.name.clone(), offset });
                }
                Some(offset.to_string())
            });
            match err {
                Some(kind) => Err(AsmError::new(line.number, kind)),
                None => Ok(line.with_text(text)),
            }
        })
        .collect()
}

/// Both passes over the data-rewritten code lines.
pub fn resolve_branches(code: &[SourceLine], data: &DataSegment, cfg: &AsmConfig) -> Result<Resolved> {
    let (lines, dests) = strip_labels(code, data, cfg)?;
    let lines = substitute_dests(&lines, &dests)?;
    Ok(Resolved { lines, dest_count: dests.len() })
}
