use num_traits::Num;

/// Parses an unsigned numeric word: decimal, `0x` hex or `0b` binary.
/// Signs are separate tokens in the source grammar and are not accepted here.
pub fn parse_number<T: Num>(word: &str) -> Option<T> {
    let (digits, radix) = if let Some(hex) = word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(bin) = word.strip_prefix("0b").or_else(|| word.strip_prefix("0B")) {
        (bin, 2)
    } else {
        (word, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    T::from_str_radix(digits, radix).ok()
}
