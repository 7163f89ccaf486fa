//! Decoding of list values stored as text in flat reference files.
//!
//! Legacy CSVs keep list columns as a bracketed literal such as
//! `['Paracetamol', 'Rest']`. This is the only place that syntax is parsed.

/// Decode a stored cell into a list.
///
/// - blank cell: empty list
/// - value not starting with `[`: one-element list holding the value
/// - bracketed literal of quoted strings: its elements
/// - bracketed value that does not parse: one-element list holding the raw value
pub fn decode_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    if !raw.starts_with('[') {
        return vec![raw.to_string()];
    }
    parse_list_literal(raw).unwrap_or_else(|| vec![raw.to_string()])
}

/// Parse `[ 'a', "b", ]`: single- or double-quoted strings with backslash escapes,
/// optional trailing comma. Anything else (numbers, nesting, trailing text) is `None`.
pub fn parse_list_literal(raw: &str) -> Option<Vec<String>> {
    let mut chars = raw.trim().chars().peekable();
    if chars.next()? != '[' {
        return None;
    }
    let mut items = Vec::new();
    loop {
        skip_ws(&mut chars);
        match chars.next()? {
            ']' => break,
            q @ ('\'' | '"') => items.push(read_quoted(&mut chars, q)?),
            _ => return None,
        }
        skip_ws(&mut chars);
        match chars.next()? {
            ',' => continue,
            ']' => break,
            _ => return None,
        }
    }
    skip_ws(&mut chars);
    chars.next().is_none().then_some(items)
}

fn skip_ws(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn read_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, quote: char) -> Option<String> {
    let mut out = String::new();
    loop {
        match chars.next()? {
            c if c == quote => return Some(out),
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                c @ ('\\' | '\'' | '"') => out.push(c),
                c => {
                    out.push('\\');
                    out.push(c);
                }
            },
            c => out.push(c),
        }
    }
}
