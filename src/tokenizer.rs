//! Quote-aware splitting of a command line into argument tokens.

/// Split `input` on unquoted whitespace.
///
/// A double quote toggles quoted mode; inside it whitespace is kept and the
/// quote characters themselves are dropped. An unterminated quote runs to the
/// end of the input. Empty tokens are never produced, so `""` yields `[]`.
/// There is no escape syntax for an embedded quote.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
            }
            c => cur.push(c),
        }
    }

    if !cur.is_empty() {
        out.push(cur);
    }

    out
}
