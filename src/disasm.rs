use crate::decoder::{Decoded, Decoder};
use crate::encoder::ParsedInstruction;
use crate::instructions::Grammar;
use crate::source::SourceLine;

/// Renders a decoded opcode in the syntax the encoder reads back.
pub fn fmt_decoded(d: &Decoded) -> String {
    let mn = d.mnemonic.name();
    match d.mnemonic.desc().grammar {
        Grammar::Bare => mn.to_string(),
        Grammar::Addr => format!("{mn} {}", d.low8),
        Grammar::RegAddr | Grammar::RegImm => format!("{mn} {} , {}", d.reg0, d.low8),
        Grammar::RegReg => format!("{mn} {} , {}", d.reg0, d.reg1),
        Grammar::Reg => format!("{mn} {}", d.reg0),
        Grammar::Load => format!("{mn} {} , [ {} ]", d.reg0, d.low8),
        Grammar::LoadIndexed => format!("{mn} {} , [ {} + {} ]", d.reg0, d.low8, d.reg1),
        Grammar::Store => format!("{mn} [ {} ] , {}", d.low8, d.reg0),
        Grammar::StoreIndexed => format!("{mn} [ {} + {} ] , {}", d.low8, d.reg1, d.reg0),
        Grammar::PcOffset => format!("{mn} {}", d.pc_offset()),
    }
}

/// One row per instruction: program counter, hex opcode, the resolved
/// source and the disassembly.
pub fn dump<D: Decoder>(dec: &D, instrs: &[ParsedInstruction], code: &[SourceLine]) -> String {
    let mut out = String::new();
    for (pc, (ins, line)) in instrs.iter().zip(code).enumerate() {
        let text = dec.decode(ins.opcode).map_or_else(|| "??".to_string(), |d| fmt_decoded(&d));
        out.push_str(&format!(
            "{pc:02}: {:04x}  {:<4} {:<28} {text}\n",
            ins.opcode,
            line.number,
            line.text.trim()
        ));
    }
    out
}
