use tracing::debug;

use crate::data::DataSegment;
use crate::source::SourceLine;
use crate::symbols::substitute;

/// Replaces the data-label name at the base of each `[ … ]` with its start
/// address. Other words are left for the encoder, which accepts only numbers
/// after an addressing operator.
pub fn rewrite_data_refs(code: &[SourceLine], data: &DataSegment) -> Vec<SourceLine> {
    code.iter()
        .map(|line| {
            let text = substitute(&line.text, |w| {
                if !w.is_base {
                    return None;
                }
                data.get(w.text).map(|label| label.start_address.to_string())
            });
            if text != line.text {
                debug!(line = line.number, %text, "data refs");
            }
            line.with_text(text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AsmConfig;
    use crate::source::read_lines;
    use pretty_assertions::assert_eq;

    fn data(src: &str) -> DataSegment {
        DataSegment::compile(&read_lines(src), &AsmConfig::default()).unwrap()
    }

    #[test]
    fn only_bracketed_words_change() {
        let data = data("pad BYTE 0, 0, 0, 0\nbuf BYTE 1, 2\n");
        let code = read_lines("LOAD A , [ buf + 3 ]\nJUMP buf\nSTOREF [buf+B-1] , C\n");
        let out: Vec<String> = rewrite_data_refs(&code, &data).into_iter().map(|l| l.text).collect();
        assert_eq!(out, vec!["LOAD A , [ 4 + 3 ]", "JUMP buf", "STOREF [4+B-1] , C"]);
    }

    #[test]
    fn substring_names_are_distinct() {
        let data = data("a_ BYTE 9\nab BYTE 1, 2\na BYTE 3\n");
        let code = read_lines("LOAD B , [ ab ]\nLOAD B , [ a ]\n");
        let out: Vec<String> = rewrite_data_refs(&code, &data).into_iter().map(|l| l.text).collect();
        assert_eq!(out, vec!["LOAD B , [ 1 ]", "LOAD B , [ 3 ]"]);
    }

    #[test]
    fn offset_position_is_not_rewritten() {
        let data = data("a BYTE 1, 2\nb BYTE 3\n");
        let code = read_lines("LOAD A , [ a + b ]\nLOAD A , [ 1 + a ]\nSTORE [ a ] , [ b ]\n");
        let out: Vec<String> = rewrite_data_refs(&code, &data).into_iter().map(|l| l.text).collect();
        assert_eq!(out, vec!["LOAD A , [ 0 + b ]", "LOAD A , [ 1 + a ]", "STORE [ 0 ] , [ 2 ]"]);
    }
}
