//! Token-boundary helpers shared by the rewriting passes.
//!
//! A *word* is a maximal run of characters that are not delimiters. Names are
//! only ever matched against whole words, so `buf` never matches inside
//! `buffer` or `my_buf`.

use crate::error::ErrorKind;
use crate::instructions;
use crate::isa::q16::Register;

pub fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | ']' | ',' | '+' | '-')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub start: usize,
    /// Inside a `[ … ]` address expression.
    pub in_brackets: bool,
    /// First word after its `[`, the base of the address expression.
    pub is_base: bool,
}

pub fn words(text: &str) -> Vec<Word<'_>> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut base_pending = false;
    let mut start: Option<usize> = None;
    // a trailing sentinel flushes the last word
    for (idx, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        if is_delimiter(c) {
            if let Some(s) = start.take() {
                let in_brackets = depth > 0;
                out.push(Word { text: &text[s..idx], start: s, in_brackets, is_base: in_brackets && base_pending });
                base_pending = false;
            }
            match c {
                '[' => {
                    depth += 1;
                    base_pending = true;
                }
                ']' => depth = depth.saturating_sub(1),
                _ => {}
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    out
}

/// Rebuilds `text`, replacing every word for which `f` returns a value.
/// Everything between words is kept byte for byte.
pub fn substitute<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&Word<'_>) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for word in words(text) {
        if let Some(replacement) = f(&word) {
            out.push_str(&text[cursor..word.start]);
            out.push_str(&replacement);
            cursor = word.start + word.text.len();
        }
    }
    out.push_str(&text[cursor..]);
    out
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Label names must be identifiers that cannot be confused with a register
/// or a mnemonic once substituted.
pub fn check_label_name(name: &str) -> Result<(), ErrorKind> {
    if !is_identifier(name) || Register::parse(name).is_some() || instructions::lookup(name).is_some() {
        return Err(ErrorKind::InvalidLabelName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn words_track_brackets() {
        let ws = words("LOAD A , [ buf+3 ]");
        let got: Vec<(&str, bool, bool)> = ws.iter().map(|w| (w.text, w.in_brackets, w.is_base)).collect();
        assert_eq!(
            got,
            vec![("LOAD", false, false), ("A", false, false), ("buf", true, true), ("3", true, false)]
        );
        let bases: Vec<&str> = words("[a+b] , [ c ]").iter().filter(|w| w.is_base).map(|w| w.text).collect();
        assert_eq!(bases, vec!["a", "c"]);
    }

    #[test]
    fn substitute_respects_word_boundaries() {
        let out = substitute("JUMP loop2 ; loop", |w| (w.text == "loop").then(|| "-3".to_string()));
        assert_eq!(out, "JUMP loop2 ; -3");
        let out = substitute("LOAD A , [buf-1]", |w| (w.text == "buf").then(|| "4".to_string()));
        assert_eq!(out, "LOAD A , [4-1]");
    }

    #[test]
    fn reserved_label_names() {
        assert!(check_label_name("loop").is_ok());
        assert!(check_label_name("_tmp1").is_ok());
        for bad in ["A", "D", "JUMP", "1abc", "", "a.b"] {
            assert!(check_label_name(bad).is_err(), "{bad}");
        }
    }
}
