//! r.mapcalc-style input.
//!
//! r.mapcalc writes one statement per line with no terminator, spells the
//! conditional function `if(...)` and the null value `null()`, and starts
//! comments with `#`. [`to_jiffle`] turns such text into a Jiffle script
//! with one statement per line.
//!
//! ```
//! let script = jiffle::mapcalc::to_jiffle("out = if(a > 0, a, null())\n");
//! assert_eq!(script, "out = con(a > 0, a, null);\n");
//! ```

/// Convert newline-delimited r.mapcalc statements to a Jiffle script.
///
/// Blank lines are dropped, whole-line `#` comments become `//` comments
/// and trailing `#` comments are removed.
pub fn to_jiffle(text: &str) -> String {
    let mut script = String::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            script.push_str("//");
            script.push_str(comment);
            script.push('\n');
            continue;
        }
        let statement = match line.find('#') {
            Some(at) => &line[..at],
            None => line,
        };
        let statement = statement.trim_end().trim_end_matches(';').trim_end();
        if statement.is_empty() {
            continue;
        }
        script.push_str(&rewrite_calls(statement));
        script.push_str(";\n");
    }
    script
}

/// `if(` → `con(` and `null()` → `null`, matching whole identifiers only.
fn rewrite_calls(statement: &str) -> String {
    let mut out = String::with_capacity(statement.len());
    let mut rest = statement;

    while let Some(start) = rest.find(is_ident_start) {
        let (before, from_ident) = rest.split_at(start);
        out.push_str(before);
        // an identifier continuing a number or a longer word is left alone
        let glued = before
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        let len = from_ident
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(from_ident.len());
        let (ident, after) = from_ident.split_at(len);
        let next = after.trim_start();

        if !glued && ident == "if" && next.starts_with('(') {
            out.push_str("con");
            rest = after;
        } else if !glued && ident == "null" && next.starts_with('(') {
            let inner = next[1..].trim_start();
            match inner.strip_prefix(')') {
                Some(remaining) => {
                    out.push_str("null");
                    rest = remaining;
                }
                None => {
                    out.push_str(ident);
                    rest = after;
                }
            }
        } else {
            out.push_str(ident);
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_statement_per_line() {
        let script = to_jiffle("a = 1\n\n  b = a + 2;  \nc = b * 3\n");
        assert_eq!(script, "a = 1;\nb = a + 2;\nc = b * 3;\n");
    }

    #[test]
    fn test_if_becomes_con() {
        assert_eq!(to_jiffle("x = if (a, 1, 2)"), "x = con (a, 1, 2);\n");
        assert_eq!(to_jiffle("x = elif(a)"), "x = elif(a);\n");
        assert_eq!(to_jiffle("x = if_(a)"), "x = if_(a);\n");
        assert_eq!(to_jiffle("x = if"), "x = if;\n");
    }

    #[test]
    fn test_null_and_comments() {
        assert_eq!(
            to_jiffle("# header\nx = null() # trailing\n"),
            "// header\nx = null;\n"
        );
        assert_eq!(to_jiffle("x = 2e3 + y"), "x = 2e3 + y;\n");
    }
}
