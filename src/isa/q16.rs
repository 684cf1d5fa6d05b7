use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decoder::{Decoded, Decoder};
use crate::instructions::TABLE;

/// The four general registers. Encoded as `letter - 'A'` in a 2-bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Register {
    A,
    B,
    C,
    D,
}

impl Register {
    pub const ALL: [Register; 4] = [Register::A, Register::B, Register::C, Register::D];

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Only the low two bits are used.
    pub fn from_code(code: u16) -> Self {
        Self::ALL[(code & 0b11) as usize]
    }

    pub fn letter(self) -> char {
        char::from(b'A' + self as u8)
    }

    /// A register token is exactly one upper-case letter `A`..=`D`.
    pub fn parse(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c @ 'A'..='D'), None) => Some(Self::ALL[(c as u8 - b'A') as usize]),
            _ => None,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Decodes Q16 opcodes using the shared instruction table.
pub struct Q16Decoder;

impl Q16Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Q16Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for Q16Decoder {
    fn decode(&self, raw: u16) -> Option<Decoded> {
        // aliases share their canonical entry's encoding
        TABLE
            .iter()
            .filter(|d| d.canonical)
            .find(|d| d.matches(raw))
            .map(|d| Decoded::from_raw(d.mnemonic, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::Mnemonic;

    #[test]
    fn register_letters_round_trip() {
        for reg in Register::ALL {
            assert_eq!(Register::parse(&reg.letter().to_string()), Some(reg));
            assert_eq!(Register::from_code(reg.code()), reg);
            assert_eq!(reg.code(), u16::from(reg.letter() as u8 - b'A'));
        }
    }

    #[test]
    fn register_rejects_other_tokens() {
        for tok in ["E", "a", "AB", "", "0"] {
            assert_eq!(Register::parse(tok), None, "{tok}");
        }
    }

    #[test]
    fn decode_uses_canonical_names() {
        let dec = Q16Decoder::new();
        assert_eq!(dec.decode(0x3805).map(|d| d.mnemonic), Some(Mnemonic::Loadi));
        assert_eq!(dec.decode(0xF0FF).map(|d| d.mnemonic), Some(Mnemonic::Bre));
        assert_eq!(dec.decode(0xF1FF).map(|d| d.mnemonic), Some(Mnemonic::Brne));
    }

    #[test]
    fn decode_rejects_stray_bits() {
        let dec = Q16Decoder::new();
        // NOOP carries no operands
        assert!(dec.decode(0x0001).is_none());
        // INPUTC has no register field
        assert!(dec.decode(0x1C05).is_none());
        // MOVE has no low byte
        assert!(dec.decode(0x2101).is_none());
    }

    #[test]
    fn decode_splits_fields() {
        let d = Q16Decoder::new().decode(0xB907).unwrap();
        assert_eq!(d.mnemonic, Mnemonic::Storef);
        assert_eq!(d.reg0, Register::C);
        assert_eq!(d.reg1, Register::B);
        assert_eq!(d.low8, 7);
    }
}
