use anyhow::{Context, Result};
use std::path::Path;

use q16asm::Listing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: &'static str,
    pub base: usize,
    pub len: usize,
    pub unit: &'static str, // "word" or "byte"
}

/// Program image recovered from an emitted listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub code: Vec<u16>,
    pub data: Vec<u8>,
}

impl Image {
    pub fn from_listing(listing: Listing) -> Self {
        Self { code: listing.opcodes, data: listing.data }
    }

    pub fn opcode(&self, pc: usize) -> Option<u16> {
        self.code.get(pc).copied()
    }

    pub fn segments(&self) -> Vec<Segment> {
        vec![
            Segment { name: "code", base: 0, len: self.code.len(), unit: "word" },
            Segment { name: "data", base: 0, len: self.data.len(), unit: "byte" },
        ]
    }
}

pub fn load_listing(path: &Path) -> Result<Image> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let listing = Listing::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Image::from_listing(listing))
}
