use thiserror::Error;

/// What went wrong while assembling. Every kind is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("invalid instruction `{0}`")]
    InvalidMnemonic(String),
    #[error("invalid register `{0}`, expected one of A, B, C, D")]
    InvalidRegister(String),
    #[error("missing {operand} for {mnemonic} instruction")]
    MissingOperand {
        mnemonic: &'static str,
        operand: &'static str,
    },
    #[error("value {value} does not fit in a {bits}-bit field")]
    ImmediateOutOfRange { value: i64, bits: u8 },
    #[error("invalid addressing operator `{0}`, expected `+` or `-`")]
    InvalidAddressingOperator(String),
    #[error("too many bytes in data segment ({used} declared, capacity {capacity})")]
    DataSegmentOverflow { used: usize, capacity: usize },
    #[error("too many instructions in code segment (capacity {capacity})")]
    CodeSegmentOverflow { capacity: usize },
    #[error("unresolved label `{0}`")]
    UnresolvedLabel(String),
    #[error("label `{name}` already defined on line {first}")]
    DuplicateLabel { name: String, first: usize },
    #[error("invalid label name `{0}`")]
    InvalidLabelName(String),
    #[error("too many {kind} labels (limit {limit})")]
    TooManyLabels { kind: &'static str, limit: usize },
    #[error("branch to `{name}` out of range (offset {offset})")]
    BranchOutOfRange { name: String, offset: i64 },
    #[error("invalid numeric literal `{0}`")]
    InvalidLiteral(String),
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),
    #[error("duplicate `{0}` segment marker")]
    DuplicateSegment(&'static str),
}

/// A fatal assembly error bound to its 1-based source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct AsmError {
    pub line: usize,
    pub kind: ErrorKind,
}

impl AsmError {
    pub fn new(line: usize, kind: ErrorKind) -> Self {
        Self { line, kind }
    }
}

pub type Result<T, E = AsmError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_line_and_token() {
        let e = AsmError::new(7, ErrorKind::InvalidRegister("E".into()));
        assert_eq!(
            e.to_string(),
            "line 7: invalid register `E`, expected one of A, B, C, D"
        );
    }
}
