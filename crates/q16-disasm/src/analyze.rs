use std::collections::BTreeSet;

use serde::Serialize;

use q16asm::decoder::Decoder;
use q16asm::disasm::fmt_decoded;
use q16asm::isa::q16::Q16Decoder;

use crate::model::Image;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Fallthrough,
    Jump,
    Cond,
}

impl EdgeKind {
    pub fn short(self) -> &'static str {
        match self {
            EdgeKind::Fallthrough => "ft",
            EdgeKind::Jump => "br",
            EdgeKind::Cond => "cbr",
        }
    }
}

/// Instruction-level edge. `to` may lie outside the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: i64,
    pub kind: EdgeKind,
}

/// Half-open instruction range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub start: usize,
    pub end: usize,
    pub insns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub instructions: usize,
    pub blocks: Vec<Block>,
    pub edges: Vec<Edge>,
    /// Branches whose target falls outside the code segment.
    pub dangling: Vec<usize>,
    /// Words that decode to no instruction.
    pub undecodable: Vec<usize>,
}

pub fn analyze(img: &Image) -> Report {
    let dec = Q16Decoder::new();
    let n = img.code.len();
    let mut edges = Vec::new();
    let mut dangling = Vec::new();
    let mut undecodable = Vec::new();
    let mut leaders: BTreeSet<usize> = BTreeSet::new();
    if n > 0 {
        leaders.insert(0);
    }

    for (pc, &raw) in img.code.iter().enumerate() {
        let ft = pc + 1;
        let Some(d) = dec.decode(raw) else {
            undecodable.push(pc);
            continue;
        };
        if d.mnemonic.is_branch() {
            let to = pc as i64 + 1 + i64::from(d.pc_offset());
            let kind = if d.mnemonic.is_conditional() { EdgeKind::Cond } else { EdgeKind::Jump };
            edges.push(Edge { from: pc, to, kind });
            match d.target(pc).filter(|&t| t < n) {
                Some(t) => {
                    leaders.insert(t);
                }
                None => dangling.push(pc),
            }
            if ft < n {
                leaders.insert(ft);
            }
            if kind == EdgeKind::Jump {
                continue;
            }
        }
        if ft < n {
            edges.push(Edge { from: pc, to: ft as i64, kind: EdgeKind::Fallthrough });
        }
    }

    let starts: Vec<usize> = leaders.into_iter().collect();
    let blocks = starts
        .iter()
        .enumerate()
        .map(|(idx, &start)| {
            let end = starts.get(idx + 1).copied().unwrap_or(n);
            let insns = (start..end)
                .filter_map(|pc| img.opcode(pc))
                .map(|raw| match dec.decode(raw) {
                    Some(d) => fmt_decoded(&d),
                    None => format!(".word {raw:#06x}"),
                })
                .collect();
            Block { start, end, insns }
        })
        .collect();

    Report { instructions: n, blocks, edges, dangling, undecodable }
}
