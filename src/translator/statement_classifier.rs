//! # Statement Classifier
//!
//! Splits a block of notebook source into top-level statements and tags each one as a bare
//! name, an assignment, an `if/elif/else` conditional assignment or a function definition.
//! The classification is purely structural: expressions are kept as text for the builder.
//!
//! Statement headers (`def name(`, `if`, `elif`, `else`) are recognised with `nom`; the rest of the
//! line structure (indentation, bracket continuation) is handled by scanning.

use crate::symbolic::utils::{
    bracket_depth, find_char_positions_outside_brackets, find_pair_to_this_bracket,
    has_balanced_brackets, is_identifier, split_by_quotes, split_outside_brackets,
};
use crate::translator::errors::{CalcError, Result};
use log::debug;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, multispace0, multispace1, satisfy, space0},
    combinator::{not, recognize},
    multi::many0,
    sequence::{pair, terminated},
};
use strum_macros::{Display, EnumIter};

/// statements that are recognised but never translated
const UNSUPPORTED_KEYWORDS: [&str; 16] = [
    "import", "from", "for", "while", "with", "class", "try", "return", "pass", "del", "assert",
    "raise", "global", "nonlocal", "async", "lambda",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum StatementKind {
    Name,
    Assignment,
    Conditional,
    Function,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    If(String),
    Else,
}

/// one branch of a conditional; `body_text` is exactly one assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub guard: Guard,
    pub body_text: String,
}

/// function parameter with its default value kept as source text
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementDetail {
    Name(String),
    Assignment {
        target: String,
        expr: String,
    },
    Conditional {
        target: String,
        branches: Vec<Branch>,
    },
    Function {
        name: String,
        params: Vec<Param>,
        /// body statements without docstrings and without the final `return`
        body: Vec<String>,
        return_expr: Option<String>,
    },
}

/// a classified top-level statement
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStatement {
    pub kind: StatementKind,
    pub raw_text: String,
    pub detail: StatementDetail,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// a keyword not followed by an identifier char, with trailing whitespace dropped
fn keyword<'a>(kw: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(terminated(tag(kw), not(satisfy(is_ident_char))), multispace0)
}

/// `def name` ending before the parameter list
fn def_header(input: &str) -> IResult<&str, &str> {
    let (input, _) = (tag("def"), multispace1).parse(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = space0(input)?;
    Ok((input, name))
}

/// `if`, `elif` or `else` at the start of a branch header
fn branch_keyword(input: &str) -> IResult<&str, &str> {
    alt((keyword("elif"), keyword("if"), keyword("else"))).parse(input)
}

fn starts_with_keyword(text: &str, kw: &'static str) -> bool {
    keyword(kw).parse(text.trim_start()).is_ok()
}

fn indent_of(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// drops a `#` comment that is outside quotes
fn strip_comment(line: &str) -> &str {
    let mut offset = 0;
    for (quoted, chunk) in split_by_quotes(line) {
        if !quoted {
            if let Some(pos) = chunk.find('#') {
                return &line[..offset + pos];
            }
        }
        offset += chunk.len();
    }
    line
}

fn toggles_docstring(text: &str) -> bool {
    (text.matches("\"\"\"").count() + text.matches("'''").count()) % 2 == 1
}

/// physical lines folded into logical lines `(indent, text)`: bracket and backslash continuations
/// are joined, `;` separated statements are split, blank and comment lines are skipped
fn logical_lines(code: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;
    let mut depth = 0;
    let mut in_docstring = false;
    for raw in code.lines() {
        let line = if in_docstring { raw } else { strip_comment(raw) };
        let trimmed = line.trim();
        let (indent, mut text) = match current.take() {
            Some((indent, mut text)) => {
                if !trimmed.is_empty() {
                    text.push(' ');
                    text.push_str(trimmed);
                }
                (indent, text)
            }
            None => {
                if trimmed.is_empty() {
                    continue;
                }
                depth = 0;
                (indent_of(raw), trimmed.to_string())
            }
        };
        if toggles_docstring(trimmed) {
            in_docstring = !in_docstring;
        } else if !in_docstring {
            depth += bracket_depth(trimmed);
        }
        let continued = text.ends_with('\\');
        if continued {
            text.pop();
            text = text.trim_end().to_string();
        }
        if in_docstring || continued || depth > 0 {
            current = Some((indent, text));
            continue;
        }
        let separators = find_char_positions_outside_brackets(&text, &[';']);
        if separators.is_empty() {
            lines.push((indent, text));
        } else {
            for part in split_outside_brackets(&text, ';') {
                if !part.is_empty() {
                    lines.push((indent, part.to_string()));
                }
            }
        }
    }
    if let Some(unfinished) = current {
        lines.push(unfinished);
    }
    lines
}

/// splits a source block into top-level statements; indented lines and `elif`/`else` headers
/// stay with the statement they belong to. The block is dedented first
pub fn split_statements(code: &str) -> Vec<String> {
    let lines = logical_lines(code);
    let base = lines.iter().map(|(indent, _)| *indent).min().unwrap_or(0);
    let mut statements: Vec<Vec<String>> = Vec::new();
    for (indent, text) in lines {
        let relative = indent.saturating_sub(base);
        let continues_chain =
            starts_with_keyword(&text, "elif") || starts_with_keyword(&text, "else");
        if statements.is_empty() || (relative == 0 && !continues_chain) {
            statements.push(Vec::new());
        }
        if let Some(last) = statements.last_mut() {
            last.push(format!("{}{}", " ".repeat(relative), text));
        }
    }
    statements.into_iter().map(|lines| lines.join("\n")).collect()
}

/// splits `name = expr` at the first top-level assignment sign.
/// `Ok(None)` if the text has no assignment at all
pub fn split_assignment(text: &str) -> std::result::Result<Option<(String, String)>, String> {
    let positions: Vec<usize> = find_char_positions_outside_brackets(text, &['='])
        .into_iter()
        .filter(|&pos| {
            let prev = text[..pos].chars().last();
            let next = text[pos + 1..].chars().next();
            next != Some('=') && !matches!(prev, Some('=' | '<' | '>' | '!'))
        })
        .collect();
    let Some(&pos) = positions.first() else {
        return Ok(None);
    };
    if positions.len() > 1 {
        return Err("chained assignment is not supported".to_string());
    }
    let lhs = text[..pos].trim();
    let rhs = text[pos + 1..].trim();
    if lhs.ends_with(|c: char| "+-*/%@&|^".contains(c)) {
        return Err("augmented assignment is not supported".to_string());
    }
    if lhs.starts_with('(')
        || lhs.starts_with('[')
        || !find_char_positions_outside_brackets(lhs, &[',']).is_empty()
    {
        return Err("tuple targets are not supported".to_string());
    }
    // annotated assignment `x: float = 1`
    let lhs = lhs.split(':').next().unwrap_or(lhs).trim();
    if !is_identifier(lhs) || lhs.contains('.') {
        return Err(format!("target `{}` is not a plain name", lhs));
    }
    if rhs.is_empty() {
        return Err(format!("assignment to `{}` has no right-hand side", lhs));
    }
    Ok(Some((lhs.to_string(), rhs.to_string())))
}

fn is_string_literal(text: &str) -> bool {
    let text = text.trim();
    text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')))
}

fn looks_like_call(text: &str) -> bool {
    let Ok((rest, _)) = identifier(text) else {
        return false;
    };
    let rest = rest.trim_start_matches(|c: char| is_ident_char(c) || c == '.');
    rest.trim_start().starts_with('(') && text.ends_with(')')
}

/// classifies one top-level statement
pub fn classify(block: &str) -> Result<SourceStatement> {
    let statements = split_statements(block);
    let text = match statements.as_slice() {
        [] => return Err(CalcError::classification(block, "empty block")),
        [single] => single.clone(),
        many => {
            return Err(CalcError::classification(
                block,
                format!("{} statements found, expected one", many.len()),
            ));
        }
    };
    if !has_balanced_brackets(&text) {
        return Err(CalcError::classification(&text, "unbalanced brackets"));
    }
    let first_line = text.lines().next().unwrap_or("").trim();
    let statement = if starts_with_keyword(first_line, "def") {
        classify_function(&text)?
    } else if starts_with_keyword(first_line, "if") {
        classify_conditional(&text)?
    } else if let Some(kw) = UNSUPPORTED_KEYWORDS
        .into_iter()
        .find(|kw| starts_with_keyword(first_line, kw))
    {
        return Err(CalcError::classification(
            &text,
            format!("`{}` statements are not translated", kw),
        ));
    } else {
        match split_assignment(&text) {
            Ok(Some((target, expr))) => SourceStatement {
                kind: StatementKind::Assignment,
                raw_text: text.clone(),
                detail: StatementDetail::Assignment { target, expr },
            },
            Ok(None) if is_identifier(&text) => SourceStatement {
                kind: StatementKind::Name,
                raw_text: text.clone(),
                detail: StatementDetail::Name(text.clone()),
            },
            Ok(None) if looks_like_call(&text) => {
                return Err(CalcError::classification(
                    &text,
                    "call expressions are not translated",
                ));
            }
            Ok(None) => {
                return Err(CalcError::classification(
                    &text,
                    "not an assignment, conditional, function definition or name",
                ));
            }
            Err(reason) => return Err(CalcError::classification(&text, reason)),
        }
    };
    debug!("classified `{}` as {}", first_line, statement.kind);
    Ok(statement)
}

/// the text after a header keyword up to the first top-level `:` and the inline body after it
fn split_header(rest: &str) -> Option<(&str, &str)> {
    let colon = *find_char_positions_outside_brackets(rest, &[':']).first()?;
    Some((rest[..colon].trim(), rest[colon + 1..].trim()))
}

fn classify_conditional(text: &str) -> Result<SourceStatement> {
    let mut headers: Vec<(Guard, Vec<String>)> = Vec::new();
    for line in text.lines() {
        if indent_of(line) > 0 {
            match headers.last_mut() {
                Some((_, body)) => body.push(line.to_string()),
                None => return Err(CalcError::classification(text, "indented line before `if`")),
            }
            continue;
        }
        let (rest, kw) = branch_keyword(line.trim()).map_err(|_| {
            CalcError::classification(text, format!("unexpected line `{}` in conditional", line.trim()))
        })?;
        match (kw, headers.last()) {
            ("if", None) | ("elif", Some((Guard::If(_), _))) | ("else", Some((Guard::If(_), _))) => {}
            (_, Some((Guard::Else, _))) => {
                return Err(CalcError::classification(text, "`else` must be the last branch"));
            }
            _ => {
                return Err(CalcError::classification(
                    text,
                    format!("`{}` out of place in conditional", kw),
                ));
            }
        }
        let (guard, inline) = split_header(rest).ok_or_else(|| {
            CalcError::classification(text, format!("missing `:` after `{}`", kw))
        })?;
        let guard = match kw {
            "else" if guard.is_empty() => Guard::Else,
            "else" => return Err(CalcError::classification(text, "`else` takes no condition")),
            _ if guard.is_empty() => {
                return Err(CalcError::classification(text, format!("`{}` without condition", kw)));
            }
            _ => Guard::If(guard.to_string()),
        };
        let body = if inline.is_empty() {
            Vec::new()
        } else {
            vec![inline.to_string()]
        };
        headers.push((guard, body));
    }

    let mut branches = Vec::with_capacity(headers.len());
    let mut common_target: Option<String> = None;
    for (guard, body_lines) in headers {
        let body = body_lines.join("\n");
        let statements = split_statements(&body);
        let [statement] = statements.as_slice() else {
            return Err(CalcError::classification(
                text,
                format!(
                    "each branch must contain exactly one assignment, found {} statements",
                    statements.len()
                ),
            ));
        };
        let inner = classify(statement)?;
        let StatementDetail::Assignment { target, .. } = &inner.detail else {
            return Err(CalcError::classification(
                text,
                format!("branch body must be an assignment, found {}", inner.kind),
            ));
        };
        match &common_target {
            Some(common) if common != target => {
                return Err(CalcError::classification(
                    text,
                    format!("branches assign to different targets `{}` and `{}`", common, target),
                ));
            }
            Some(_) => {}
            None => common_target = Some(target.clone()),
        }
        branches.push(Branch {
            guard,
            body_text: inner.raw_text,
        });
    }
    let target = common_target.ok_or_else(|| CalcError::classification(text, "conditional without branches"))?;
    Ok(SourceStatement {
        kind: StatementKind::Conditional,
        raw_text: text.to_string(),
        detail: StatementDetail::Conditional { target, branches },
    })
}

fn parse_params(text: &str, block: &str) -> Result<Vec<Param>> {
    let mut params = Vec::new();
    for part in split_outside_brackets(text, ',') {
        if part.is_empty() || part == "/" {
            continue;
        }
        if part.starts_with('*') {
            return Err(CalcError::classification(
                block,
                format!("variadic parameter `{}` is not supported", part),
            ));
        }
        let (head, default) = match find_char_positions_outside_brackets(part, &['=']).first() {
            Some(&pos) => (&part[..pos], Some(part[pos + 1..].trim().to_string())),
            None => (part, None),
        };
        let name = head.split(':').next().unwrap_or(head).trim();
        if !is_identifier(name) || name.contains('.') {
            return Err(CalcError::classification(
                block,
                format!("parameter `{}` is not a plain name", name),
            ));
        }
        params.push(Param {
            name: name.to_string(),
            default,
        });
    }
    Ok(params)
}

fn classify_function(text: &str) -> Result<SourceStatement> {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or("").trim();
    let (after_name, name) = def_header(first)
        .map_err(|_| CalcError::classification(text, "malformed function header"))?;
    if !after_name.starts_with('(') {
        return Err(CalcError::classification(text, "missing parameter list"));
    }
    let close = find_pair_to_this_bracket(after_name, 0)
        .ok_or_else(|| CalcError::classification(text, "unclosed parameter list"))?;
    let params = parse_params(&after_name[1..close], text)?;

    let mut tail = after_name[close + 1..].trim();
    if let Some(annotation) = tail.strip_prefix("->") {
        let colon = find_char_positions_outside_brackets(annotation, &[':']);
        tail = match colon.first() {
            Some(&pos) => &annotation[pos..],
            None => "",
        };
    }
    let inline = tail
        .strip_prefix(':')
        .ok_or_else(|| CalcError::classification(text, "missing `:` after function header"))?
        .trim();

    let mut body_lines: Vec<&str> = Vec::new();
    if !inline.is_empty() {
        body_lines.push(inline);
    }
    body_lines.extend(lines);
    let statements: Vec<String> = split_statements(&body_lines.join("\n"))
        .into_iter()
        .filter(|statement| !is_string_literal(statement))
        .collect();

    let mut body = Vec::new();
    let mut return_expr = None;
    for (i, statement) in statements.iter().enumerate() {
        if starts_with_keyword(statement, "return") {
            if i + 1 != statements.len() {
                return Err(CalcError::classification(text, "statements after `return`"));
            }
            let expr = statement.trim_start()["return".len()..].trim();
            if !expr.is_empty() {
                return_expr = Some(expr.to_string());
            }
        } else {
            body.push(statement.clone());
        }
    }
    Ok(SourceStatement {
        kind: StatementKind::Function,
        raw_text: text.to_string(),
        detail: StatementDetail::Function {
            name: name.to_string(),
            params,
            body,
            return_expr,
        },
    })
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_kind_names() {
        let names: Vec<String> = StatementKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["name", "assignment", "conditional", "function"]);
    }

    #[test]
    fn test_split_statements() {
        let code = "x = 5  # width\n\n# comment\ny = (x +\n     2)\nz = a + \\\n    b\nif x > 0:\n    a = 1\nelse:\n    a = 2\nq";
        let statements = split_statements(code);
        assert_eq!(
            statements,
            vec![
                "x = 5",
                "y = (x + 2)",
                "z = a + b",
                "if x > 0:\n    a = 1\nelse:\n    a = 2",
                "q",
            ]
        );
    }

    #[test]
    fn test_split_statements_dedents_and_splits_semicolons() {
        let statements = split_statements("    a = 1; b = 2\n    c = \"#\"");
        assert_eq!(statements, vec!["a = 1", "b = 2", "c = \"#\""]);
    }

    #[test]
    fn test_classify_assignment_and_name() {
        let stmt = classify("q = 2*x + 3").unwrap();
        assert_eq!(stmt.kind, StatementKind::Assignment);
        assert_eq!(
            stmt.detail,
            StatementDetail::Assignment {
                target: "q".to_string(),
                expr: "2*x + 3".to_string()
            }
        );
        let stmt = classify("  q_k  ").unwrap();
        assert_eq!(stmt.kind, StatementKind::Name);
        assert_eq!(stmt.detail, StatementDetail::Name("q_k".to_string()));
        let stmt = classify("F: float = f(a=1, b=2)").unwrap();
        assert_eq!(
            stmt.detail,
            StatementDetail::Assignment {
                target: "F".to_string(),
                expr: "f(a=1, b=2)".to_string()
            }
        );
    }

    #[test]
    fn test_classify_conditional() {
        let stmt = classify("if x > 0:\n    a = x\nelif x < 0:\n    a = -x\nelse:\n    a = 0").unwrap();
        assert_eq!(stmt.kind, StatementKind::Conditional);
        let StatementDetail::Conditional { target, branches } = stmt.detail else {
            panic!("not a conditional");
        };
        assert_eq!(target, "a");
        assert_eq!(
            branches,
            vec![
                Branch { guard: Guard::If("x > 0".to_string()), body_text: "a = x".to_string() },
                Branch { guard: Guard::If("x < 0".to_string()), body_text: "a = -x".to_string() },
                Branch { guard: Guard::Else, body_text: "a = 0".to_string() },
            ]
        );
    }

    #[test]
    fn test_inline_conditional() {
        let stmt = classify("if (x == 1): b = 2\nelse: b = 3").unwrap();
        let StatementDetail::Conditional { branches, .. } = stmt.detail else {
            panic!("not a conditional");
        };
        assert_eq!(branches[0].guard, Guard::If("(x == 1)".to_string()));
        assert_eq!(branches[1].body_text, "b = 3");
    }

    #[test]
    fn test_conditional_errors() {
        let err = classify("if x > 0:\n    a = 1\nelse:\n    b = 2").unwrap_err();
        assert!(err.to_string().contains("different targets"), "{}", err);
        let err = classify("if x > 0:\n    a = 1\n    c = 2").unwrap_err();
        assert!(err.to_string().contains("exactly one assignment"), "{}", err);
        let err = classify("if x > 0:\n    a = 1\nelse:\n    a = 2\nelif y:\n    a = 3").unwrap_err();
        assert!(err.to_string().contains("last branch"), "{}", err);
        let err = classify("if x:\n    f(x)").unwrap_err();
        assert!(matches!(err, CalcError::Classification { .. }));
    }

    #[test]
    fn test_classify_function() {
        let code = "def M_Ed(q, l=6.0) -> float:\n    \"\"\"bending moment\n    of a beam\"\"\"\n    q_d = 1.35*q\n    return q_d*l**2/8";
        let stmt = classify(code).unwrap();
        assert_eq!(stmt.kind, StatementKind::Function);
        assert_eq!(
            stmt.detail,
            StatementDetail::Function {
                name: "M_Ed".to_string(),
                params: vec![
                    Param { name: "q".to_string(), default: None },
                    Param { name: "l".to_string(), default: Some("6.0".to_string()) },
                ],
                body: vec!["q_d = 1.35*q".to_string()],
                return_expr: Some("q_d*l**2/8".to_string()),
            }
        );
    }

    #[test]
    fn test_function_without_return_is_classified() {
        let stmt = classify("def f(x):\n    y = x").unwrap();
        let StatementDetail::Function { return_expr, body, .. } = stmt.detail else {
            panic!("not a function");
        };
        assert!(return_expr.is_none());
        assert_eq!(body, vec!["y = x"]);
        assert!(classify("def f(x):\n    return x\n    y = 1").is_err());
        assert!(classify("def f(*args):\n    return 1").is_err());
    }

    #[test]
    fn test_unsupported_statements() {
        for code in [
            "import numpy as np",
            "from math import pi",
            "for i in range(3):\n    x = i",
            "print(x)",
            "x += 1",
            "a, b = 1, 2",
            "a = b = 1",
            "beam.L = 5",
            "x == 1",
            "",
            "a = 1\nb = 2",
            "a = f(x]",
        ] {
            let err = classify(code).unwrap_err();
            assert!(
                matches!(err, CalcError::Classification { .. }),
                "{} gave {:?}",
                code,
                err
            );
        }
    }
}
