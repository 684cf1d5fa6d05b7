//! Text artifact: grouped binary opcodes followed by the data image.

use anyhow::{bail, ensure, Context, Result};
use bitvec::prelude::*;

use crate::data::DataSegment;
use crate::encoder::ParsedInstruction;

pub const CODE_HEADER: &str = "-----MACHINE CODE-----";
pub const DATA_HEADER: &str = "-----DATA SEGMENT-----";

/// Field widths of the printed opcode, MSB first.
const GROUPS: [usize; 4] = [4, 2, 2, 8];

/// `0010_00_01_00000000` for `0x2100`.
pub fn fmt_opcode(opcode: u16) -> String {
    let bits = opcode.view_bits::<Msb0>();
    let mut out = String::with_capacity(19);
    let mut at = 0;
    for (idx, width) in GROUPS.into_iter().enumerate() {
        if idx > 0 {
            out.push('_');
        }
        out.extend(bits[at..at + width].iter().by_vals().map(|b| if b { '1' } else { '0' }));
        at += width;
    }
    out
}

pub fn emit(instrs: &[ParsedInstruction], data: &DataSegment) -> String {
    let mut out = String::new();
    out.push_str(CODE_HEADER);
    out.push('\n');
    for ins in instrs {
        out.push_str(&fmt_opcode(ins.opcode));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(DATA_HEADER);
    out.push('\n');
    if !data.is_empty() {
        let bytes: Vec<String> = data.image().iter().map(u8::to_string).collect();
        out.push_str(&format!("[{}]\n", bytes.join(", ")));
    }
    out
}

/// An emitted artifact read back from text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub opcodes: Vec<u16>,
    pub data: Vec<u8>,
}

fn parse_opcode(text: &str) -> Option<u16> {
    let groups: Vec<&str> = text.split('_').collect();
    let widths_ok = groups.len() == GROUPS.len() && groups.iter().zip(GROUPS).all(|(g, w)| g.len() == w);
    if !widths_ok {
        return None;
    }
    u16::from_str_radix(&groups.concat(), 2).ok()
}

fn parse_bytes(text: &str) -> Option<Vec<u8>> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    inner.split(',').map(|v| v.trim().parse::<u8>().ok()).collect()
}

impl Listing {
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate().map(|(idx, l)| (idx + 1, l.trim_end()));

        match lines.next() {
            Some((_, CODE_HEADER)) => {}
            Some((n, other)) => bail!("line {n}: expected `{CODE_HEADER}`, found `{other}`"),
            None => bail!("empty listing"),
        }

        let mut listing = Listing::default();
        let mut saw_data_header = false;
        for (n, line) in lines.by_ref() {
            if line.is_empty() {
                continue;
            }
            if line == DATA_HEADER {
                saw_data_header = true;
                break;
            }
            let opcode = parse_opcode(line).with_context(|| format!("line {n}: bad opcode `{line}`"))?;
            listing.opcodes.push(opcode);
        }
        ensure!(saw_data_header, "missing `{DATA_HEADER}`");

        if let Some((n, line)) = lines.find(|(_, l)| !l.is_empty()) {
            listing.data = parse_bytes(line).with_context(|| format!("line {n}: bad data list `{line}`"))?;
        }
        Ok(listing)
    }
}
