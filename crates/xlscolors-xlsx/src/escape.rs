//! Text escaping shared by the reader and the writer
//!
//! Besides regular XML escaping, SpreadsheetML encodes characters that XML
//! 1.0 cannot carry as `_xHHHH_` sequences (e.g. `_x000D_` for CR). A literal
//! underscore that would otherwise start such a sequence is written as
//! `_x005F_`.

/// Escape text for use in XML content or attribute values
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Decode Excel's `_xHHHH_` escape sequences in strings.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match escape_code_at(candidate).and_then(char::from_u32) {
            Some(decoded) => {
                result.push(decoded);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Encode characters XML cannot carry, plus underscores that would be
/// mistaken for an escape sequence on the way back in.
pub(crate) fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for (i, c) in s.char_indices() {
        if c == '_' && escape_code_at(&s[i..]).is_some() {
            result.push_str("_x005F");
        } else if c.is_control() && c != '\t' && c != '\n' {
            result.push_str(&format!("_x{:04X}_", c as u32));
            continue;
        }
        result.push(c);
    }

    result
}

/// The code point of a `_xHHHH_` sequence at the start of `s`, if any
fn escape_code_at(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.len() < 7 || &bytes[..2] != b"_x" || bytes[6] != b'_' {
        return None;
    }
    let hex = &bytes[2..6];
    if !hex.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    // all four bytes are ASCII hex digits
    std::str::from_utf8(hex)
        .ok()
        .and_then(|h| u32::from_str_radix(h, 16).ok())
}
