// the collection of utility functions mainly for bracket parsing and proceeding
//
// all scanners work on byte offsets (so the results can be used to slice the input) and
// skip everything inside single or double quotes: quoted text is an opaque label, its
// brackets and operators do not count.

/// walks the string and calls `visit(byte_index, char, depth)` for every char that is
/// outside quotes; `depth` is the bracket depth before the char is applied
fn scan_outside_quotes<F>(s: &str, mut visit: F)
where
    F: FnMut(usize, char, i32) -> bool,
{
    let mut depth = 0;
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            _ => {
                if !visit(i, c, depth) {
                    return;
                }
                match c {
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => depth -= 1,
                    _ => {}
                }
            }
        }
    }
}

/// true if every opened bracket is closed by a bracket of the same kind
pub fn has_balanced_brackets(s: &str) -> bool {
    let mut stack = Vec::new();
    let mut balanced = true;
    scan_outside_quotes(s, |_, c, _| {
        match c {
            '(' | '{' | '[' => stack.push(c),
            ')' => balanced = stack.pop() == Some('('),
            '}' => balanced = stack.pop() == Some('{'),
            ']' => balanced = stack.pop() == Some('['),
            _ => {}
        }
        balanced
    });
    balanced && stack.is_empty()
}

/// net count of opened minus closed brackets outside quotes, `f(a, [b` gives 2
pub fn bracket_depth(s: &str) -> i32 {
    let mut depth = 0;
    scan_outside_quotes(s, |_, c, d| {
        depth = match c {
            '(' | '[' | '{' => d + 1,
            ')' | ']' | '}' => d - 1,
            _ => d,
        };
        true
    });
    depth
}

/// byte positions of any of `targets` that are outside brackets and quotes
pub fn find_char_positions_outside_brackets(s: &str, targets: &[char]) -> Vec<usize> {
    let mut positions = Vec::new();
    scan_outside_quotes(s, |i, c, depth| {
        if depth == 0 && targets.contains(&c) {
            positions.push(i);
        }
        true
    });
    positions
}

/// position of the bracket closing the one opened at `bracket_start`
pub fn find_pair_to_this_bracket(input: &str, bracket_start: usize) -> Option<usize> {
    let open = input[bracket_start..].chars().next()?;
    let close = match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => return None,
    };
    let mut stack = 0;
    let mut bracket_end = None;
    let tail = &input[bracket_start..];
    scan_outside_quotes(tail, |i, c, _| {
        if c == open {
            stack += 1;
        } else if c == close {
            stack -= 1;
            if stack == 0 {
                bracket_end = Some(bracket_start + i);
                return false;
            }
        }
        true
    });
    bracket_end
}

/// true if the whole string is one bracketed group, e.g. "(a+b)" but not "(a)+(b)"
pub fn is_wrapped_in_brackets(s: &str, open: char) -> bool {
    let s_trimmed = s.trim();
    if !s_trimmed.starts_with(open) {
        return false;
    }
    let offset = s.len() - s.trim_start().len();
    match find_pair_to_this_bracket(s, offset) {
        Some(end) => s[end..].trim_end().len() == 1,
        None => false,
    }
}

/// splits on `sep` at bracket depth 0, outside quotes. Empty input gives an empty vector
pub fn split_outside_brackets(s: &str, sep: char) -> Vec<&str> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut last = 0;
    for pos in find_char_positions_outside_brackets(s, &[sep]) {
        parts.push(s[last..pos].trim());
        last = pos + sep.len_utf8();
    }
    parts.push(s[last..].trim());
    parts
}

/// splits text into (is_quoted, chunk) pieces. Quoted chunks keep their quote chars
pub fn split_by_quotes(s: &str) -> Vec<(bool, &str)> {
    let mut chunks = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => {
                let end = i + c.len_utf8();
                chunks.push((true, &s[start..end]));
                start = end;
                quote = None;
            }
            Some(_) => {}
            None if c == '"' || c == '\'' => {
                if start < i {
                    chunks.push((false, &s[start..i]));
                }
                start = i;
                quote = Some(c);
            }
            None => {}
        }
    }
    if start < s.len() {
        // an unterminated quote is left as a quoted chunk so it is never rewritten
        chunks.push((quote.is_some(), &s[start..]));
    }
    chunks
}

/// applies `f` to every part of the text that is outside quotes
pub fn map_outside_quotes<F>(s: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    split_by_quotes(s)
        .into_iter()
        .map(|(quoted, chunk)| if quoted { chunk.to_string() } else { f(chunk) })
        .collect()
}

/// splits on a keyword like `and` standing alone at bracket depth 0, outside quotes
pub fn scan_words<'a>(s: &'a str, word: &str) -> Vec<&'a str> {
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_' || c == '.';
    let mut cuts = Vec::new();
    scan_outside_quotes(s, |i, _, depth| {
        if depth == 0 && s[i..].starts_with(word) {
            let before_ok = s[..i].chars().last().map(|p| !is_word_char(p)).unwrap_or(true);
            let after_ok = s[i + word.len()..]
                .chars()
                .next()
                .map(|n| !is_word_char(n))
                .unwrap_or(true);
            if before_ok && after_ok {
                cuts.push(i);
            }
        }
        true
    });
    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut last = 0;
    for cut in cuts {
        if cut < last {
            continue;
        }
        parts.push(s[last..cut].trim());
        last = cut + word.len();
    }
    parts.push(s[last..].trim());
    parts
}

/// true for names like `x`, `q_k`, `beam.length`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.') && !s.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_skip_brackets_and_quotes() {
        let s = "a+(b+c)+Symbol(\"d+e\")";
        assert_eq!(find_char_positions_outside_brackets(s, &['+']), vec![1, 7]);
    }

    #[test]
    fn test_pair_bracket() {
        let s = "f(a, g(b), \")\")+1";
        assert_eq!(find_pair_to_this_bracket(s, 1), Some(14));
        assert_eq!(find_pair_to_this_bracket("(a", 0), None);
    }

    #[test]
    fn test_wrapped() {
        assert!(is_wrapped_in_brackets("(a+b)", '('));
        assert!(is_wrapped_in_brackets(" ((a)+(b)) ", '('));
        assert!(!is_wrapped_in_brackets("(a)+(b)", '('));
        assert!(is_wrapped_in_brackets("[1, 2]", '['));
    }

    #[test]
    fn test_split_outside_brackets() {
        assert_eq!(
            split_outside_brackets("a, f(b, c), [1, 2]", ','),
            vec!["a", "f(b, c)", "[1, 2]"]
        );
        assert!(split_outside_brackets("  ", ',').is_empty());
    }

    #[test]
    fn test_split_by_quotes() {
        let chunks = split_by_quotes("a*Symbol(\"x_1\")+b");
        assert_eq!(
            chunks,
            vec![(false, "a*Symbol("), (true, "\"x_1\""), (false, ")+b")]
        );
        let mapped = map_outside_quotes("x+\"x\"", |c| c.replace('x', "y"));
        assert_eq!(mapped, "y+\"x\"");
    }

    #[test]
    fn test_bracket_depth() {
        assert_eq!(bracket_depth("f(a, [b"), 2);
        assert_eq!(bracket_depth("x = (1 + \"(\")"), 0);
        assert_eq!(bracket_depth("c]"), -1);
    }

    #[test]
    fn test_balanced() {
        assert!(has_balanced_brackets("f([a], {b})"));
        assert!(!has_balanced_brackets("f([a)]"));
        assert!(has_balanced_brackets("\"(\""));
    }

    #[test]
    fn test_scan_words() {
        assert_eq!(scan_words("a > 1 and (b or c) and d", "and"), vec!["a > 1", "(b or c)", "d"]);
        assert_eq!(scan_words("brand and band", "and"), vec!["brand", "band"]);
        assert_eq!(scan_words("x", "or"), vec!["x"]);
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("q_k"));
        assert!(is_identifier("beam.length"));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("a+b"));
    }
}
