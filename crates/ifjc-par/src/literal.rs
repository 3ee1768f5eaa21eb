//! Literal payload decoding.
//!
//! The scanner hands literals over as raw source text (strings keep their
//! quotes and escape sequences); the expression parser decodes them here
//! when it builds constant operands.

/// Decodes a string-literal lexeme into its value.
///
/// Triple-quoted literals are raw: everything between the quote fences,
/// newlines included, is kept verbatim. Single-line literals process the
/// `\" \\ \n \r \t \xHH` escapes. The scanner has already validated the
/// shape, so unknown escapes cannot occur.
pub(crate) fn decode_string_literal(lexeme: &str) -> String {
    if let Some(body) = lexeme
        .strip_prefix("\"\"\"")
        .and_then(|rest| rest.strip_suffix("\"\"\""))
    {
        return body.to_string();
    }

    let body = lexeme
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(lexeme);

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('x') => {
                let high = chars.next().unwrap_or('0');
                let low = chars.next().unwrap_or('0');
                let mut hex = String::new();
                hex.push(high);
                hex.push(low);
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    out.push(byte as char);
                }
            },
            Some(other) => out.push(other),
            None => {},
        }
    }
    out
}

/// Parses an integer-literal lexeme, decimal or `0x` hexadecimal.
pub(crate) fn parse_int_literal(lexeme: &str) -> Option<i64> {
    if let Some(hex) = lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        lexeme.parse().ok()
    }
}

/// Parses a float-literal lexeme (fraction and/or exponent forms).
pub(crate) fn parse_float_literal(lexeme: &str) -> Option<f64> {
    lexeme.parse().ok()
}
