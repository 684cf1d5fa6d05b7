use pretty_assertions::assert_eq;

use q16asm::{assemble, ErrorKind};

fn data_src(count: usize) -> String {
    let values: Vec<String> = (0..count).map(|v| v.to_string()).collect();
    format!(".data\nblob BYTE {}\n.code\nNOOP\n", values.join(", "))
}

#[test]
fn fifteen_bytes_fit() {
    let asm = assemble(&data_src(15)).unwrap();
    assert_eq!(asm.data.len(), 15);
}

#[test]
fn sixteen_bytes_overflow() {
    let err = assemble(&data_src(16)).unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.kind, ErrorKind::DataSegmentOverflow { used: 16, capacity: 16 });
}

#[test]
fn overflow_across_labels() {
    let src = ".data\na BYTE 1, 2, 3, 4, 5, 6, 7, 8\nb BYTE 1, 2, 3, 4, 5, 6, 7\nc BYTE 9\n";
    let err = assemble(src).unwrap_err();
    assert_eq!(err.line, 4);
}

#[test]
fn start_addresses_are_running_sums() {
    let src = ".data\na BYTE 1, 2\nb WORD 0x10, 0x20, 0x30\nc BYTE 0b1\n.code\n";
    let asm = assemble(src).unwrap();
    let starts: Vec<(&str, u8, usize)> =
        asm.data.labels().iter().map(|l| (l.name.as_str(), l.start_address, l.len())).collect();
    assert_eq!(starts, vec![("a", 0, 2), ("b", 2, 3), ("c", 5, 1)]);
    assert_eq!(asm.data.image(), vec![1, 2, 16, 32, 48, 1]);
}

#[test]
fn addressing_forms_fold_offsets() {
    let src = "\
.data
a BYTE 1, 2, 3
b BYTE 4, 5

.code
LOAD B , [ b ]
LOAD B , [ b - 1 ]
LOADF C , [ a + D ]
LOADF C , [ b + A + 1 ]
STORE [ a + 2 ] , D
STOREF [ b + B - 3 ] , A
";
    assert_eq!(
        assemble(src).unwrap().opcodes(),
        vec![0x8403, 0x8402, 0x9B00, 0x9804, 0xAC02, 0xB100]
    );
}

#[test]
fn data_names_outside_brackets_are_not_rewritten() {
    let err = assemble(".data\nn BYTE 4\n.code\nLOADI A , n\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnresolvedLabel("n".into()));
}

#[test]
fn unknown_name_in_brackets() {
    let err = assemble(".code\nLOAD A , [ missing ]\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.kind, ErrorKind::UnresolvedLabel("missing".into()));
}

#[test]
fn one_data_label_per_address_expression() {
    let src = ".data\na BYTE 1, 2\nb BYTE 3\n.code\nNOOP\nLOAD A , [ a + b ]\n";
    let err = assemble(src).unwrap_err();
    assert_eq!(err.line, 6);
    assert_eq!(err.kind, ErrorKind::UnresolvedLabel("b".into()));
    assert_eq!(assemble(".data\na BYTE 1, 2\nb BYTE 3\n.code\nLOAD A , [ b + 1 ]\n").unwrap().opcodes(), vec![0x8003]);
}
