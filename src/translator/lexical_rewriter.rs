//! # Lexical Rewriter
//!
//! String-level normalisation of an expression before it is handed to the symbolic parser.
//! Four passes run in a fixed order, each on the text outside quotes only:
//!
//! 1. numeric-library calls: `np.sqrt(x)` → `sqrt(x)`, `np.dot(a, b)` → `(a)*(b)`
//! 2. unit-library syntax: `.magnitude`, `.m`, `.to(...)` and `ureg.` prefixes are removed
//! 3. special tokens inside identifiers: `diam_s` → `Symbol("\oslash_s", "diam_s")`
//! 4. unit names: `kN` → `Symbol("\mathrm{kN}", "kN")`
//!
//! Passes 1 and 2 remove prefixes that would hide identifiers from the word-boundary matching
//! of passes 3 and 4, so the order matters. Rewriting never fails: text no pass recognises is
//! passed through unchanged. Text wrapped by passes 3 and 4 sits inside quotes and is never
//! touched again, so rewriting already clean text is a no-op.

use crate::symbolic::utils::{find_pair_to_this_bracket, split_by_quotes, split_outside_brackets};
use crate::translator::units::UnitTable;
use log::{debug, warn};
use regex::{Captures, Regex};
use std::ops::Range;

/// numeric-library function -> name understood by the expression parser
const NUMERIC_FUNCTIONS: [(&str, &str); 18] = [
    ("sin", "sin"),
    ("cos", "cos"),
    ("tan", "tan"),
    ("arcsin", "asin"),
    ("asin", "asin"),
    ("arccos", "acos"),
    ("acos", "acos"),
    ("arctan", "atan"),
    ("atan", "atan"),
    ("exp", "exp"),
    ("log", "log"),
    ("log10", "log10"),
    ("sqrt", "sqrt"),
    ("abs", "Abs"),
    ("absolute", "Abs"),
    ("array", "Matrix"),
    ("matrix", "Matrix"),
    ("pi", "pi"),
];

/// numeric-library functions of two arguments that become an operator
const NUMERIC_OPERATORS: [(&str, &str); 4] = [
    ("dot", "*"),
    ("matmul", "*"),
    ("multiply", "*"),
    ("power", "^"),
];

/// unit-library calls whose arguments are dropped together with the call
const CONVERSION_CALLS: [&str; 5] = [
    "to",
    "m_as",
    "to_base_units",
    "to_reduced_units",
    "to_compact",
];

#[derive(Debug, Clone, PartialEq)]
pub struct RewriterConfig {
    /// names the numeric library is imported under
    pub numeric_aliases: Vec<String>,
    /// names the unit library is imported under
    pub unit_aliases: Vec<String>,
    pub units: UnitTable,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        RewriterConfig {
            numeric_aliases: vec!["np".to_string(), "numpy".to_string()],
            unit_aliases: vec![
                "ureg".to_string(),
                "un".to_string(),
                "engicalc".to_string(),
                "ec".to_string(),
            ],
            units: UnitTable::default(),
        }
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("rewrite pattern `{}` rejected: {}", pattern, e);
            None
        }
    }
}

fn alias_group(aliases: &[String]) -> Option<String> {
    if aliases.is_empty() {
        return None;
    }
    let escaped: Vec<String> = aliases.iter().map(|a| regex::escape(a)).collect();
    Some(format!("(?:{})", escaped.join("|")))
}

/// byte ranges of quoted text
fn quoted_ranges(s: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = 0;
    for (quoted, chunk) in split_by_quotes(s) {
        if quoted {
            ranges.push(offset..offset + chunk.len());
        }
        offset += chunk.len();
    }
    ranges
}

fn in_ranges(ranges: &[Range<usize>], pos: usize) -> bool {
    ranges.iter().any(|r| r.contains(&pos))
}

/// `Regex::replace_all` that leaves matches starting inside quotes alone
fn replace_outside_quotes<F>(re: &Regex, text: &str, mut replacement: F) -> String
where
    F: FnMut(&Captures) -> String,
{
    let quoted = quoted_ranges(text);
    re.replace_all(text, |caps: &Captures| {
        let whole = &caps[0];
        match caps.get(0) {
            Some(m) if !in_ranges(&quoted, m.start()) => replacement(caps),
            _ => whole.to_string(),
        }
    })
    .into_owned()
}

/// replaces `<match>(args)` calls found by `re` one by one, left to right.
/// `replacement` gets the captures and the split argument list and may refuse with `None`
fn replace_calls<F>(re: &Regex, text: &str, mut replacement: F) -> String
where
    F: FnMut(&Captures, &[&str]) -> Option<String>,
{
    let mut text = text.to_string();
    let mut search_from = 0;
    loop {
        let quoted = quoted_ranges(&text);
        let found = re
            .captures_iter(&text[search_from..])
            .filter_map(|caps| caps.get(0).map(|m| (m.start() + search_from, m.end() + search_from)))
            .find(|(start, _)| !in_ranges(&quoted, *start));
        let Some((start, end)) = found else {
            return text;
        };
        // the match ends with the opening bracket
        let open = end - 1;
        let Some(close) = find_pair_to_this_bracket(&text, open) else {
            return text;
        };
        let caps_text = text[start..end].to_string();
        let args_text = text[open + 1..close].to_string();
        let args = split_outside_brackets(&args_text, ',');
        let new_text = re
            .captures(&caps_text)
            .and_then(|caps| replacement(&caps, &args));
        match new_text {
            Some(new_text) => {
                text.replace_range(start..close + 1, &new_text);
                search_from = start;
            }
            None => search_from = end,
        }
    }
}

/// `Symbol("<label>", "<name>")` source text
fn symbol_text(label: &str, name: &str) -> String {
    format!("Symbol(\"{}\", \"{}\")", label, name)
}

/// splits trailing digits: "diam12" -> ("diam", "12")
fn split_digits(segment: &str) -> (&str, &str) {
    let digits = segment
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    segment.split_at(segment.len() - digits)
}

/// rewrites the reserved tokens inside one identifier; `None` if nothing changed
pub fn special_identifier(identifier: &str) -> Option<String> {
    let segments: Vec<&str> = identifier.split('_').collect();
    let mut result = String::new();
    let mut changed = false;
    let mut glue_next = false;
    let push = |result: &mut String, glue_next: &mut bool, piece: &str| {
        if piece.is_empty() {
            return;
        }
        if !result.is_empty() && !*glue_next {
            result.push('_');
        }
        result.push_str(piece);
        *glue_next = false;
    };
    let mut i = 0;
    while i < segments.len() {
        let segment = segments[i];
        let (token, digits) = split_digits(segment);
        match token {
            "diam" => {
                push(&mut result, &mut glue_next, &format!("\\oslash{}", digits));
                changed = true;
            }
            "sum" => {
                push(&mut result, &mut glue_next, &format!("\\sum{}", digits));
                changed = true;
            }
            "infty" => {
                push(&mut result, &mut glue_next, &format!("\\infty{}", digits));
                changed = true;
            }
            "eps" => {
                push(&mut result, &mut glue_next, &format!("varepsilon{}", digits));
                changed = true;
            }
            "prime" if !result.is_empty() => {
                result.push('\'');
                changed = true;
            }
            "comma" if !result.is_empty() && i + 1 < segments.len() => {
                result.push(',');
                glue_next = true;
                changed = true;
            }
            "txt" if i + 1 < segments.len() => {
                i += 1;
                push(
                    &mut result,
                    &mut glue_next,
                    &format!("\\text{{{}}}", segments[i]),
                );
                changed = true;
            }
            _ => push(&mut result, &mut glue_next, segment),
        }
        i += 1;
    }
    if changed { Some(result) } else { None }
}

/// applies the four rewriting passes
#[derive(Debug, Clone)]
pub struct LexicalRewriter {
    config: RewriterConfig,
    numeric_call: Option<Regex>,
    numeric_operator: Option<Regex>,
    conversion_call: Option<Regex>,
    magnitude: Option<Regex>,
    short_magnitude: Option<Regex>,
    unit_prefix: Option<Regex>,
    identifier: Option<Regex>,
}

impl Default for LexicalRewriter {
    fn default() -> Self {
        LexicalRewriter::new(RewriterConfig::default())
    }
}

impl LexicalRewriter {
    pub fn new(config: RewriterConfig) -> Self {
        let numeric = alias_group(&config.numeric_aliases);
        let units = alias_group(&config.unit_aliases);
        let operators: Vec<&str> = NUMERIC_OPERATORS.iter().map(|(f, _)| *f).collect();
        LexicalRewriter {
            numeric_call: numeric
                .as_ref()
                .and_then(|a| compile(&format!(r"\b{}\.([A-Za-z_][A-Za-z0-9_]*)\b", a))),
            numeric_operator: numeric.as_ref().and_then(|a| {
                compile(&format!(r"\b{}\.({})\s*\(", a, operators.join("|")))
            }),
            conversion_call: compile(&format!(r"\.({})\s*\(", CONVERSION_CALLS.join("|"))),
            magnitude: compile(r"\.magnitude\b"),
            short_magnitude: compile(r"([A-Za-z0-9_]*)\.m\b"),
            unit_prefix: units.and_then(|a| compile(&format!(r"\b{}\.", a))),
            identifier: compile(r"[A-Za-z_][A-Za-z0-9_]*"),
            config,
        }
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    pub fn units(&self) -> &UnitTable {
        &self.config.units
    }

    /// all four passes, in order
    pub fn rewrite(&self, expr: &str) -> String {
        let pass1 = self.numeric_functions(expr);
        let pass2 = self.strip_unit_calls(&pass1);
        let pass3 = self.special_tokens(&pass2);
        let pass4 = self.unit_names(&pass3);
        if pass4 != expr {
            debug!("rewrite: `{}` -> `{}`", expr, pass4);
        }
        pass4
    }

    /// typeset-ready name of an assignment target: only the special-token pass applies
    pub fn rewrite_target(&self, name: &str) -> String {
        special_identifier(name.trim()).unwrap_or_else(|| name.trim().to_string())
    }

    /// pass 1: `np.sin(x)` -> `sin(x)`, `np.dot(a, b)` -> `(a)*(b)`
    pub fn numeric_functions(&self, text: &str) -> String {
        let mut text = text.to_string();
        if let Some(re) = &self.numeric_operator {
            text = replace_calls(re, &text, |caps, args| {
                let op = NUMERIC_OPERATORS
                    .iter()
                    .find(|(f, _)| *f == &caps[1])
                    .map(|(_, op)| *op)?;
                if args.len() != 2 {
                    return None;
                }
                Some(format!("({}){}({})", args[0], op, args[1]))
            });
        }
        if let Some(re) = &self.numeric_call {
            text = replace_outside_quotes(re, &text, |caps| {
                match NUMERIC_FUNCTIONS.iter().find(|(f, _)| *f == &caps[1]) {
                    Some((_, mapped)) => mapped.to_string(),
                    None => caps[0].to_string(),
                }
            });
        }
        text
    }

    /// pass 2: drops `.magnitude`, `.m`, `.to(...)` and unit-library prefixes
    pub fn strip_unit_calls(&self, text: &str) -> String {
        let mut text = text.to_string();
        if let Some(re) = &self.magnitude {
            text = replace_outside_quotes(re, &text, |_| String::new());
        }
        if let Some(re) = &self.conversion_call {
            text = replace_calls(re, &text, |_, _| Some(String::new()));
        }
        if let Some(re) = &self.short_magnitude {
            let aliases = &self.config.unit_aliases;
            text = replace_outside_quotes(re, &text, |caps| {
                // `ureg.m` is the metre, not a magnitude accessor
                if aliases.iter().any(|a| a == &caps[1]) {
                    caps[0].to_string()
                } else {
                    caps[1].to_string()
                }
            });
        }
        if let Some(re) = &self.unit_prefix {
            text = replace_outside_quotes(re, &text, |_| String::new());
        }
        text
    }

    /// identifiers outside quotes that are neither attributes (`a.b`) nor called (`f(`)
    fn map_free_identifiers<F>(&self, text: &str, mut f: F) -> String
    where
        F: FnMut(&str) -> Option<String>,
    {
        let Some(re) = &self.identifier else {
            return text.to_string();
        };
        let quoted = quoted_ranges(text);
        re.replace_all(text, |caps: &Captures| {
            let m = match caps.get(0) {
                Some(m) => m,
                None => return String::new(),
            };
            let before = text[..m.start()].chars().last();
            let after = text[m.end()..].trim_start().chars().next();
            let attached = matches!(before, Some(c) if c == '.' || c.is_ascii_digit());
            if in_ranges(&quoted, m.start()) || attached || after == Some('(') || after == Some('.') {
                return m.as_str().to_string();
            }
            f(m.as_str()).unwrap_or_else(|| m.as_str().to_string())
        })
        .into_owned()
    }

    /// pass 3: reserved tokens inside identifiers
    pub fn special_tokens(&self, text: &str) -> String {
        self.map_free_identifiers(text, |ident| {
            special_identifier(ident).map(|label| symbol_text(&label, ident))
        })
    }

    /// pass 4: unit names become opaque symbols with their typeset label
    pub fn unit_names(&self, text: &str) -> String {
        let units = &self.config.units;
        self.map_free_identifiers(text, |ident| {
            units
                .names()
                .find(|name| *name == ident)
                .and_then(|name| units.label(name))
                .map(|label| symbol_text(label, ident))
        })
    }
}

/// rewrites with a one-off rewriter built from `config`
pub fn rewrite(expr: &str, config: &RewriterConfig) -> String {
    LexicalRewriter::new(config.clone()).rewrite(expr)
}

//___________________________________TESTS____________________________________
