use serde::Serialize;
use tracing::{debug, info};

use crate::branch::resolve_branches;
use crate::config::AsmConfig;
use crate::data::DataSegment;
use crate::disasm;
use crate::emit::emit;
use crate::encoder::{encode_program, ParsedInstruction};
use crate::error::Result;
use crate::isa::q16::Q16Decoder;
use crate::rewrite::rewrite_data_refs;
use crate::source::{read_lines, Segments, SourceLine, CODE_MARKER, DATA_MARKER};

/// Result of one assembler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assembly {
    pub data: DataSegment,
    /// Label-free instruction lines, one per instruction.
    #[serde(skip)]
    pub code: Vec<SourceLine>,
    pub instructions: Vec<ParsedInstruction>,
}

impl Assembly {
    pub fn opcodes(&self) -> Vec<u16> {
        self.instructions.iter().map(|i| i.opcode).collect()
    }

    /// The emitted text artifact.
    pub fn listing(&self) -> String {
        emit(&self.instructions, &self.data)
    }

    /// Per-instruction dump with disassembly.
    pub fn dump(&self) -> String {
        disasm::dump(&Q16Decoder::new(), &self.instructions, &self.code)
    }

    /// Source with every label use resolved. Assembles to the same opcodes.
    pub fn intermediate_source(&self) -> String {
        let mut out = String::new();
        out.push_str(DATA_MARKER);
        out.push('\n');
        for label in self.data.labels() {
            let values: Vec<String> = label.bytes.iter().map(u8::to_string).collect();
            out.push_str(&format!("{} {} {}\n", label.name, label.kind, values.join(", ")));
        }
        out.push_str(CODE_MARKER);
        out.push('\n');
        for line in &self.code {
            out.push_str(line.text.trim());
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct Assembler {
    cfg: AsmConfig,
}

impl Assembler {
    pub fn new(cfg: AsmConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &AsmConfig {
        &self.cfg
    }

    pub fn assemble(&self, src: &str) -> Result<Assembly> {
        let lines = read_lines(src);
        let segments = Segments::split(&lines)?;
        debug!(data = ?segments.data, code = ?segments.code, "segments");

        let data = DataSegment::compile(&lines[segments.data.clone()], &self.cfg)?;
        info!("Read {} labels ({} bytes) from data segment", data.labels().len(), data.len());

        let code = rewrite_data_refs(&lines[segments.code.clone()], &data);
        let resolved = resolve_branches(&code, &data, &self.cfg)?;
        info!("Parsed {} branch destinations", resolved.dest_count);

        let instructions = encode_program(&resolved.lines, &self.cfg)?;
        info!("Parsed {} instructions", instructions.len());

        Ok(Assembly { data, code: resolved.lines, instructions })
    }
}

/// Assembles with the default configuration.
pub fn assemble(src: &str) -> Result<Assembly> {
    Assembler::default().assemble(src)
}
