//! Instruction encoder: one resolved code line in, one opcode out.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::AsmConfig;
use crate::error::{AsmError, ErrorKind, Result};
use crate::instructions::{self, Grammar, InstrDesc, Mnemonic, REG0_SHIFT, REG1_SHIFT};
use crate::isa::q16::Register;
use crate::literal::parse_number;
use crate::source::SourceLine;
use crate::symbols::{is_delimiter, is_identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParsedInstruction {
    pub mnemonic: Mnemonic,
    pub opcode: u16,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Punct(char),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::Punct(c) => write!(f, "{c}"),
        }
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, c) in text.char_indices() {
        if is_delimiter(c) {
            if let Some(s) = start.take() {
                out.push(Token::Word(&text[s..idx]));
            }
            if !c.is_whitespace() {
                out.push(Token::Punct(c));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        out.push(Token::Word(&text[s..]));
    }
    out
}

/// Cursor over the operand tokens of one instruction.
struct Operands<'a> {
    desc: &'static InstrDesc,
    tokens: std::vec::IntoIter<Token<'a>>,
}

impl<'a> Operands<'a> {
    fn missing(&self, operand: &'static str) -> ErrorKind {
        ErrorKind::MissingOperand { mnemonic: self.desc.name, operand }
    }

    fn next(&mut self, operand: &'static str) -> Result<Token<'a>, ErrorKind> {
        self.tokens.next().ok_or_else(|| self.missing(operand))
    }

    fn punct(&mut self, want: char, operand: &'static str) -> Result<(), ErrorKind> {
        match self.next(operand)? {
            Token::Punct(c) if c == want => Ok(()),
            other => Err(ErrorKind::UnexpectedToken(other.to_string())),
        }
    }

    fn register(&mut self) -> Result<Register, ErrorKind> {
        let tok = self.next("register")?;
        match tok {
            Token::Word(w) => Register::parse(w).ok_or_else(|| ErrorKind::InvalidRegister(w.to_string())),
            Token::Punct(_) => Err(ErrorKind::InvalidRegister(tok.to_string())),
        }
    }

    /// An unsigned literal, not yet range checked.
    fn literal(&mut self, operand: &'static str) -> Result<i64, ErrorKind> {
        match self.next(operand)? {
            Token::Word(w) => parse_number(w).ok_or_else(|| {
                if Register::parse(w).is_some() {
                    ErrorKind::UnexpectedToken(w.to_string())
                } else if is_identifier(w) {
                    ErrorKind::UnresolvedLabel(w.to_string())
                } else {
                    ErrorKind::InvalidLiteral(w.to_string())
                }
            }),
            tok @ Token::Punct(_) => Err(ErrorKind::UnexpectedToken(tok.to_string())),
        }
    }

    fn byte(&mut self, operand: &'static str) -> Result<u8, ErrorKind> {
        let value = self.literal(operand)?;
        fit_byte(value)
    }

    /// `-`? literal, as two's complement. Accepts -128..=255.
    fn pc_offset(&mut self) -> Result<u8, ErrorKind> {
        let negative = self.tokens.as_slice().first() == Some(&Token::Punct('-'));
        if negative {
            self.tokens.next();
        }
        let magnitude = self.literal("pc offset")?;
        let value = if negative { -magnitude } else { magnitude };
        if !(-128..=255).contains(&value) {
            return Err(ErrorKind::ImmediateOutOfRange { value, bits: 8 });
        }
        Ok(value as u8)
    }

    /// `[ base (+ R)? (op offset)? ]`, folded into one address.
    fn address(&mut self, indexed: bool) -> Result<(u8, Option<Register>), ErrorKind> {
        self.punct('[', "address")?;
        let mut addr = self.literal("address")?;

        let index = if indexed {
            match self.next("index register")? {
                Token::Punct('+') => Some(self.register()?),
                Token::Punct(']') => return Err(self.missing("index register")),
                other => return Err(ErrorKind::InvalidAddressingOperator(other.to_string())),
            }
        } else {
            None
        };

        match self.next("closing bracket")? {
            Token::Punct(']') => {}
            Token::Punct(op @ ('+' | '-')) => {
                let offset = self.literal("address offset")?;
                addr = if op == '+' { addr.saturating_add(offset) } else { addr.saturating_sub(offset) };
                self.punct(']', "closing bracket")?;
            }
            other => return Err(ErrorKind::InvalidAddressingOperator(other.to_string())),
        }

        Ok((fit_byte(addr)?, index))
    }

    fn finish(mut self) -> Result<(), ErrorKind> {
        match self.tokens.next() {
            Some(tok) => Err(ErrorKind::UnexpectedToken(tok.to_string())),
            None => Ok(()),
        }
    }
}

fn fit_byte(value: i64) -> Result<u8, ErrorKind> {
    u8::try_from(value).map_err(|_| ErrorKind::ImmediateOutOfRange { value, bits: 8 })
}

fn pack(desc: &InstrDesc, reg0: Option<Register>, reg1: Option<Register>, low8: u8) -> u16 {
    let reg0 = reg0.map_or(0, |r| r.code() << REG0_SHIFT);
    let reg1 = reg1.map_or(0, |r| r.code() << REG1_SHIFT);
    desc.base | reg0 | reg1 | u16::from(low8)
}

fn encode_operands(desc: &'static InstrDesc, ops: &mut Operands<'_>) -> Result<u16, ErrorKind> {
    let opcode = match desc.grammar {
        Grammar::Bare => pack(desc, None, None, 0),
        Grammar::Addr => {
            let addr = ops.byte("address")?;
            pack(desc, None, None, addr)
        }
        Grammar::RegAddr => {
            let r = ops.register()?;
            ops.punct(',', "address")?;
            let addr = ops.byte("address")?;
            pack(desc, Some(r), None, addr)
        }
        Grammar::RegReg => {
            let r0 = ops.register()?;
            ops.punct(',', "register")?;
            let r1 = ops.register()?;
            pack(desc, Some(r0), Some(r1), 0)
        }
        Grammar::RegImm => {
            let r = ops.register()?;
            ops.punct(',', "immediate")?;
            let imm = ops.byte("immediate")?;
            pack(desc, Some(r), None, imm)
        }
        Grammar::Reg => {
            let r = ops.register()?;
            pack(desc, Some(r), None, 0)
        }
        Grammar::Load => {
            let r = ops.register()?;
            ops.punct(',', "address")?;
            let (addr, _) = ops.address(false)?;
            pack(desc, Some(r), None, addr)
        }
        Grammar::LoadIndexed => {
            let r0 = ops.register()?;
            ops.punct(',', "address")?;
            let (addr, r1) = ops.address(true)?;
            pack(desc, Some(r0), r1, addr)
        }
        Grammar::Store => {
            let (addr, _) = ops.address(false)?;
            ops.punct(',', "register")?;
            let r = ops.register()?;
            pack(desc, Some(r), None, addr)
        }
        Grammar::StoreIndexed => {
            let (addr, r1) = ops.address(true)?;
            ops.punct(',', "register")?;
            let r0 = ops.register()?;
            pack(desc, Some(r0), r1, addr)
        }
        Grammar::PcOffset => {
            let off = ops.pc_offset()?;
            pack(desc, None, None, off)
        }
    };
    Ok(opcode)
}

/// Encodes one label-free instruction line.
pub fn encode_line(line: &SourceLine) -> Result<ParsedInstruction> {
    let fail = |k| AsmError::new(line.number, k);
    let mut tokens = tokenize(&line.text).into_iter();
    let desc = match tokens.next() {
        Some(Token::Word(w)) => instructions::lookup(w).ok_or_else(|| fail(ErrorKind::InvalidMnemonic(w.to_string())))?,
        Some(tok) => return Err(fail(ErrorKind::InvalidMnemonic(tok.to_string()))),
        None => return Err(fail(ErrorKind::InvalidMnemonic(String::new()))),
    };

    let mut ops = Operands { desc, tokens };
    let opcode = encode_operands(desc, &mut ops).map_err(fail)?;
    ops.finish().map_err(fail)?;

    debug!(line = line.number, mnemonic = desc.name, opcode = format_args!("{opcode:#06x}"), "encoded");
    Ok(ParsedInstruction { mnemonic: desc.mnemonic, opcode, line: line.number })
}

/// Encodes every instruction line in order.
pub fn encode_program(lines: &[SourceLine], cfg: &AsmConfig) -> Result<Vec<ParsedInstruction>> {
    if let Some(line) = lines.get(cfg.code_segment_size) {
        return Err(AsmError::new(
            line.number,
            ErrorKind::CodeSegmentOverflow { capacity: cfg.code_segment_size },
        ));
    }
    lines.iter().map(encode_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn enc(text: &str) -> std::result::Result<u16, ErrorKind> {
        encode_line(&SourceLine::new(1, text)).map(|p| p.opcode).map_err(|e| e.kind)
    }

    #[test]
    fn every_grammar() {
        assert_eq!(enc("NOOP"), Ok(0x0000));
        assert_eq!(enc("INPUTC 12"), Ok(0x100C));
        assert_eq!(enc("INPUTCF D , 0x10"), Ok(0x1D10));
        assert_eq!(enc("INPUTD 3"), Ok(0x1203));
        assert_eq!(enc("INPUTDF B , 3"), Ok(0x1703));
        assert_eq!(enc("MOVE A , B"), Ok(0x2100));
        assert_eq!(enc("LOADI C , 5"), Ok(0x3805));
        assert_eq!(enc("LOADP C , 5"), Ok(0x3805));
        assert_eq!(enc("ADD D , C"), Ok(0x4E00));
        assert_eq!(enc("SUBI A , 0b11"), Ok(0x7003));
        assert_eq!(enc("LOAD A , [ 4 + 3 ]"), Ok(0x8007));
        assert_eq!(enc("LOADF B , [ 7 + C ]"), Ok(0x9607));
        assert_eq!(enc("LOADF B , [7+C-2]"), Ok(0x9605));
        assert_eq!(enc("STORE [ 9 - 1 ] , D"), Ok(0xAC08));
        assert_eq!(enc("STOREF [ 7 + B ] , C"), Ok(0xB907));
        assert_eq!(enc("SHIFTL B"), Ok(0xC400));
        assert_eq!(enc("SHIFTR B"), Ok(0xC500));
        assert_eq!(enc("CMP A , D"), Ok(0xD300));
        assert_eq!(enc("JUMP -1"), Ok(0xE0FF));
        assert_eq!(enc("BRZ 2"), Ok(0xF002));
        assert_eq!(enc("BRNZ -128"), Ok(0xF180));
        assert_eq!(enc("BRGE 255"), Ok(0xF3FF));
    }

    #[test]
    fn register_errors() {
        assert_eq!(enc("MOVE E , B"), Err(ErrorKind::InvalidRegister("E".into())));
        assert_eq!(enc("SHIFTL a"), Err(ErrorKind::InvalidRegister("a".into())));
        assert_eq!(
            enc("MOVE A ,"),
            Err(ErrorKind::MissingOperand { mnemonic: "MOVE", operand: "register" })
        );
        assert_eq!(
            enc("SHIFTR"),
            Err(ErrorKind::MissingOperand { mnemonic: "SHIFTR", operand: "register" })
        );
    }

    #[test]
    fn literal_errors() {
        assert_eq!(enc("LOADI A , 256"), Err(ErrorKind::ImmediateOutOfRange { value: 256, bits: 8 }));
        assert_eq!(enc("LOADI A , 1x"), Err(ErrorKind::InvalidLiteral("1x".into())));
        assert_eq!(enc("JUMP nowhere"), Err(ErrorKind::UnresolvedLabel("nowhere".into())));
        assert_eq!(enc("JUMP -129"), Err(ErrorKind::ImmediateOutOfRange { value: -129, bits: 8 }));
        assert_eq!(enc("LOAD A , [ 250 + 10 ]"), Err(ErrorKind::ImmediateOutOfRange { value: 260, bits: 8 }));
        assert_eq!(enc("LOAD A , [ 2 - 3 ]"), Err(ErrorKind::ImmediateOutOfRange { value: -1, bits: 8 }));
        assert_eq!(
            enc("LOAD A , [ 9223372036854775807 + 1 ]"),
            Err(ErrorKind::ImmediateOutOfRange { value: i64::MAX, bits: 8 })
        );
        assert_eq!(
            enc("STORE [ 0 - 9223372036854775807 ] , A"),
            Err(ErrorKind::ImmediateOutOfRange { value: -i64::MAX, bits: 8 })
        );
    }

    #[test]
    fn addressing_errors() {
        assert_eq!(enc("LOAD A , [ 4 * 3 ]"), Err(ErrorKind::InvalidAddressingOperator("*".into())));
        assert_eq!(enc("LOADF A , [ 4 - B ]"), Err(ErrorKind::InvalidAddressingOperator("-".into())));
        assert_eq!(enc("LOADF A , [ 4 B ]"), Err(ErrorKind::InvalidAddressingOperator("B".into())));
        assert_eq!(
            enc("STOREF [ 4 ] , A"),
            Err(ErrorKind::MissingOperand { mnemonic: "STOREF", operand: "index register" })
        );
        assert_eq!(enc("LOAD A , [ 4 + B ]"), Err(ErrorKind::UnexpectedToken("B".into())));
    }

    #[test]
    fn mnemonic_and_trailing_errors() {
        assert_eq!(enc("HALT"), Err(ErrorKind::InvalidMnemonic("HALT".into())));
        assert_eq!(enc("move A , B"), Err(ErrorKind::InvalidMnemonic("move".into())));
        assert_eq!(enc("NOOP A"), Err(ErrorKind::UnexpectedToken("A".into())));
        assert_eq!(enc("MOVE A , B , C"), Err(ErrorKind::UnexpectedToken(",".into())));
    }

    #[test]
    fn code_segment_capacity() {
        let cfg = AsmConfig { code_segment_size: 2, ..AsmConfig::default() };
        let lines: Vec<SourceLine> = (1..=3).map(|n| SourceLine::new(n, "NOOP")).collect();
        let err = encode_program(&lines, &cfg).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.kind, ErrorKind::CodeSegmentOverflow { capacity: 2 });
        assert_eq!(encode_program(&lines[..2], &cfg).unwrap().len(), 2);
    }
}
