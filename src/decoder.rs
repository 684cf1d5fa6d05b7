use serde::{Deserialize, Serialize};

use crate::instructions::{Fields, Mnemonic, REG0_SHIFT, REG1_SHIFT};
use crate::isa::q16::Register;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub raw: u16,
    pub mnemonic: Mnemonic,
    pub reg0: Register, // bits 11-10
    pub reg1: Register, // bits 9-8
    pub low8: u8,
}

impl Decoded {
    pub fn from_raw(mnemonic: Mnemonic, raw: u16) -> Self {
        Self {
            raw,
            mnemonic,
            reg0: Register::from_code((raw & Fields::REG0.bits()) >> REG0_SHIFT),
            reg1: Register::from_code((raw & Fields::REG1.bits()) >> REG1_SHIFT),
            low8: (raw & Fields::LOW8.bits()) as u8,
        }
    }

    /// Signed view of the low byte, meaningful for jumps and branches.
    pub fn pc_offset(&self) -> i8 {
        self.low8 as i8
    }

    /// Destination instruction index of a jump or branch fetched from `pc`.
    pub fn target(&self, pc: usize) -> Option<usize> {
        if !self.mnemonic.is_branch() {
            return None;
        }
        let dest = pc as i64 + 1 + i64::from(self.pc_offset());
        usize::try_from(dest).ok()
    }
}

pub trait Decoder {
    fn decode(&self, raw: u16) -> Option<Decoded>;
}
