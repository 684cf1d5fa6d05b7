pub mod assembler;
pub mod branch;
pub mod config;
pub mod data;
pub mod decoder;
pub mod disasm;
pub mod emit;
pub mod encoder;
pub mod error;
pub mod instructions;
pub mod literal;
pub mod rewrite;
pub mod source;
pub mod symbols;

pub mod isa {
    pub mod q16; // Q16 16-bit toy CPU
}

pub use assembler::{assemble, Assembler, Assembly};
pub use config::AsmConfig;
pub use decoder::{Decoded, Decoder};
pub use emit::Listing;
pub use error::{AsmError, ErrorKind};
pub use isa::q16::{Q16Decoder, Register};
