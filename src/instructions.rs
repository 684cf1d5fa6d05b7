use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Operand fields of an opcode word, as bit masks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Fields: u16 {
        const REG0 = 0b0000_1100_0000_0000; // bits 11-10
        const REG1 = 0b0000_0011_0000_0000; // bits 9-8
        const LOW8 = 0b0000_0000_1111_1111; // address, immediate or pc offset
    }
}

pub const REG0_SHIFT: u16 = 10;
pub const REG1_SHIFT: u16 = 8;

/// Operand grammar of an instruction line. One variant per encoding shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grammar {
    /// `NOOP`
    Bare,
    /// `INPUTC addr`
    Addr,
    /// `INPUTCF R , addr`
    RegAddr,
    /// `MOVE R0 , R1`
    RegReg,
    /// `LOADI R , imm`
    RegImm,
    /// `SHIFTL R`
    Reg,
    /// `LOAD R , [ addr (op off)? ]`
    Load,
    /// `LOADF R0 , [ addr + R1 (op off)? ]`
    LoadIndexed,
    /// `STORE [ addr (op off)? ] , R`
    Store,
    /// `STOREF [ addr + R1 (op off)? ] , R0`
    StoreIndexed,
    /// `JUMP offset`
    PcOffset,
}

impl Grammar {
    pub fn fields(self) -> Fields {
        match self {
            Grammar::Bare => Fields::empty(),
            Grammar::Addr | Grammar::PcOffset => Fields::LOW8,
            Grammar::Reg => Fields::REG0,
            Grammar::RegReg => Fields::REG0 | Fields::REG1,
            Grammar::RegAddr | Grammar::RegImm | Grammar::Load | Grammar::Store => {
                Fields::REG0 | Fields::LOW8
            }
            Grammar::LoadIndexed | Grammar::StoreIndexed => Fields::all(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mnemonic {
    Noop,
    Inputc,
    Inputcf,
    Inputd,
    Inputdf,
    Move,
    Loadi,
    Loadp,
    Add,
    Addi,
    Sub,
    Subi,
    Load,
    Loadf,
    Store,
    Storef,
    Shiftl,
    Shiftr,
    Cmp,
    Jump,
    Bre,
    Brz,
    Brne,
    Brnz,
    Brg,
    Brge,
}

impl Mnemonic {
    pub fn desc(self) -> &'static InstrDesc {
        &TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.desc().name
    }

    pub fn is_branch(self) -> bool {
        self.desc().grammar == Grammar::PcOffset
    }

    pub fn is_conditional(self) -> bool {
        self.is_branch() && self != Mnemonic::Jump
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub mnemonic: Mnemonic,
    pub name: &'static str,
    /// Family nibble and sub-code with every operand field zero.
    pub base: u16,
    pub grammar: Grammar,
    /// False for aliases sharing another entry's encoding.
    pub canonical: bool,
}

impl InstrDesc {
    /// True when every bit outside the operand fields equals the base opcode.
    pub fn matches(&self, raw: u16) -> bool {
        raw & !self.grammar.fields().bits() == self.base
    }
}

macro_rules! desc {
    ($m:ident, $name:literal, $base:literal, $g:ident) => {
        desc!($m, $name, $base, $g, true)
    };
    ($m:ident, $name:literal, $base:literal, $g:ident, $canonical:literal) => {
        InstrDesc {
            mnemonic: Mnemonic::$m,
            name: $name,
            base: $base,
            grammar: Grammar::$g,
            canonical: $canonical,
        }
    };
}

/// Indexed by `Mnemonic as usize`.
pub const TABLE: &[InstrDesc] = &[
    desc!(Noop, "NOOP", 0x0000, Bare),
    desc!(Inputc, "INPUTC", 0x1000, Addr),
    desc!(Inputcf, "INPUTCF", 0x1100, RegAddr),
    desc!(Inputd, "INPUTD", 0x1200, Addr),
    desc!(Inputdf, "INPUTDF", 0x1300, RegAddr),
    desc!(Move, "MOVE", 0x2000, RegReg),
    desc!(Loadi, "LOADI", 0x3000, RegImm),
    desc!(Loadp, "LOADP", 0x3000, RegImm, false),
    desc!(Add, "ADD", 0x4000, RegReg),
    desc!(Addi, "ADDI", 0x5000, RegImm),
    desc!(Sub, "SUB", 0x6000, RegReg),
    desc!(Subi, "SUBI", 0x7000, RegImm),
    desc!(Load, "LOAD", 0x8000, Load),
    desc!(Loadf, "LOADF", 0x9000, LoadIndexed),
    desc!(Store, "STORE", 0xA000, Store),
    desc!(Storef, "STOREF", 0xB000, StoreIndexed),
    desc!(Shiftl, "SHIFTL", 0xC000, Reg),
    desc!(Shiftr, "SHIFTR", 0xC100, Reg),
    desc!(Cmp, "CMP", 0xD000, RegReg),
    desc!(Jump, "JUMP", 0xE000, PcOffset),
    desc!(Bre, "BRE", 0xF000, PcOffset),
    desc!(Brz, "BRZ", 0xF000, PcOffset, false),
    desc!(Brne, "BRNE", 0xF100, PcOffset),
    desc!(Brnz, "BRNZ", 0xF100, PcOffset, false),
    desc!(Brg, "BRG", 0xF200, PcOffset),
    desc!(Brge, "BRGE", 0xF300, PcOffset),
];

/// Mnemonic tokens are matched case-sensitively.
pub fn lookup(name: &str) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.name == name)
}
