//! # Boolean conditions and piecewise expressions
//!
//! Guards of conditional assignments are parsed from Python-flavoured text into a `Condition`
//! tree: `and`/`or`/`not`, comparisons and chained comparisons (`0 < x <= 5`). A conditional
//! assignment becomes a `Piecewise` whose pieces are tried first-true-wins in declaration order.
//!
//! Evaluation is three-valued: a guard is `Some(true)`, `Some(false)` or `None` when the
//! available bindings cannot decide it. The comparison itself is delegated to a
//! `ConditionOracle`, so the caller decides what values exist and how they compare.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{find_pair_to_this_bracket, is_wrapped_in_brackets, scan_words};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// comparison operators of the host language, mapped one-to-one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum RelOp {
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
}

impl RelOp {
    pub fn from_token(token: &str) -> Option<RelOp> {
        RelOp::iter().find(|op| op.to_string() == token)
    }

    pub fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            RelOp::Lt => lhs < rhs,
            RelOp::Le => lhs <= rhs,
            RelOp::Gt => lhs > rhs,
            RelOp::Ge => lhs >= rhs,
            RelOp::Eq => lhs == rhs,
            RelOp::Ne => lhs != rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Rel(Expr, RelOp, Expr),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    /// literal `True`/`False`; the guard of an `else` branch is `Truth(true)`
    Truth(bool),
    /// bare expression used as a guard, true when non-zero
    Value(Expr),
    /// guard that could not be parsed, kept as source text; never decided
    Text(String),
}

/// decides comparisons for `Condition::evaluate`
pub trait ConditionOracle {
    fn compare(&self, lhs: &Expr, op: RelOp, rhs: &Expr) -> Option<bool>;
    fn truthy(&self, expr: &Expr) -> Option<bool>;
}

/// oracle for conditions that are already numerical: only constants compare
pub struct ConstantOracle;

impl ConditionOracle for ConstantOracle {
    fn compare(&self, lhs: &Expr, op: RelOp, rhs: &Expr) -> Option<bool> {
        let lhs = lhs.simplify_numbers().numeric_value()?;
        let rhs = rhs.simplify_numbers().numeric_value()?;
        Some(op.holds(lhs, rhs))
    }

    fn truthy(&self, expr: &Expr) -> Option<bool> {
        expr.simplify_numbers().numeric_value().map(|v| v != 0.0)
    }
}

impl Condition {
    pub fn is_always_true(&self) -> bool {
        matches!(self, Condition::Truth(true))
    }

    pub fn evaluate(&self, oracle: &dyn ConditionOracle) -> Option<bool> {
        match self {
            Condition::Rel(lhs, op, rhs) => oracle.compare(lhs, *op, rhs),
            Condition::Truth(value) => Some(*value),
            Condition::Value(expr) => oracle.truthy(expr),
            Condition::Text(_) => None,
            Condition::Not(inner) => inner.evaluate(oracle).map(|v| !v),
            Condition::And(parts) => {
                let mut undecided = false;
                for part in parts {
                    match part.evaluate(oracle) {
                        Some(false) => return Some(false),
                        None => undecided = true,
                        Some(true) => {}
                    }
                }
                if undecided { None } else { Some(true) }
            }
            Condition::Or(parts) => {
                let mut undecided = false;
                for part in parts {
                    match part.evaluate(oracle) {
                        Some(true) => return Some(true),
                        None => undecided = true,
                        Some(false) => {}
                    }
                }
                if undecided { None } else { Some(false) }
            }
        }
    }

    /// applies `f` to every expression in the condition
    pub fn map_exprs<F>(&self, f: &F) -> Condition
    where
        F: Fn(&Expr) -> Expr,
    {
        match self {
            Condition::Rel(lhs, op, rhs) => Condition::Rel(f(lhs), *op, f(rhs)),
            Condition::And(parts) => Condition::And(parts.iter().map(|p| p.map_exprs(f)).collect()),
            Condition::Or(parts) => Condition::Or(parts.iter().map(|p| p.map_exprs(f)).collect()),
            Condition::Not(inner) => Condition::Not(Box::new(inner.map_exprs(f))),
            Condition::Truth(value) => Condition::Truth(*value),
            Condition::Value(expr) => Condition::Value(f(expr)),
            Condition::Text(text) => Condition::Text(text.clone()),
        }
    }

    pub fn free_symbols(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.visit_exprs(&mut |e| names.extend(e.free_symbols()));
        names.sort();
        names.dedup();
        names
    }

    fn visit_exprs<F>(&self, f: &mut F)
    where
        F: FnMut(&Expr),
    {
        match self {
            Condition::Rel(lhs, _, rhs) => {
                f(lhs);
                f(rhs);
            }
            Condition::And(parts) | Condition::Or(parts) => {
                for part in parts {
                    part.visit_exprs(f);
                }
            }
            Condition::Not(inner) => inner.visit_exprs(f),
            Condition::Truth(_) | Condition::Text(_) => {}
            Condition::Value(expr) => f(expr),
        }
    }
}

/// ordered (expression, guard) pairs, first true guard wins
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Piecewise {
    pub pieces: Vec<(Expr, Condition)>,
}

impl Piecewise {
    pub fn new(pieces: Vec<(Expr, Condition)>) -> Self {
        Piecewise { pieces }
    }

    pub fn push(&mut self, expr: Expr, guard: Condition) {
        self.pieces.push((expr, guard));
    }

    /// true if the last piece is unconditional (an `else` branch)
    pub fn has_otherwise(&self) -> bool {
        self.pieces
            .last()
            .map(|(_, guard)| guard.is_always_true())
            .unwrap_or(false)
    }

    pub fn free_symbols(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .pieces
            .iter()
            .flat_map(|(expr, guard)| {
                let mut n = expr.free_symbols();
                n.extend(guard.free_symbols());
                n
            })
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn map_exprs<F>(&self, f: &F) -> Piecewise
    where
        F: Fn(&Expr) -> Expr,
    {
        Piecewise {
            pieces: self
                .pieces
                .iter()
                .map(|(expr, guard)| (f(expr), guard.map_exprs(f)))
                .collect(),
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////
//                  PARSING OF GUARDS
/////////////////////////////////////////////////////////////////////////////////

const COMPARISON_TOKENS: [&str; 6] = ["<=", ">=", "==", "!=", "<", ">"];

/// splits at comparison operators on bracket depth 0: "0 < x <= 5" -> [0, x, 5], [<, <=]
fn split_comparisons(text: &str) -> (Vec<&str>, Vec<RelOp>) {
    let mut operands = Vec::new();
    let mut ops = Vec::new();
    let mut last = 0;
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if depth == 0 && text.is_char_boundary(i) => {
                if let Some(token) = COMPARISON_TOKENS
                    .iter()
                    .find(|t| text[i..].starts_with(**t))
                {
                    if let Some(op) = RelOp::from_token(token) {
                        operands.push(text[last..i].trim());
                        ops.push(op);
                        i += token.len();
                        last = i;
                        continue;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    operands.push(text[last..].trim());
    (operands, ops)
}

/// parses a guard. `rewrite` is applied to every operand before it is parsed
pub fn parse_condition<F>(text: &str, rewrite: &F) -> Result<Condition, String>
where
    F: Fn(&str) -> String,
{
    let text = text.trim();
    if text.is_empty() {
        return Err("empty condition".to_string());
    }
    let alternatives = scan_words(text, "or");
    if alternatives.len() > 1 {
        return alternatives
            .iter()
            .map(|part| parse_condition(part, rewrite))
            .collect::<Result<Vec<_>, _>>()
            .map(Condition::Or);
    }
    let conjuncts = scan_words(text, "and");
    if conjuncts.len() > 1 {
        return conjuncts
            .iter()
            .map(|part| parse_condition(part, rewrite))
            .collect::<Result<Vec<_>, _>>()
            .map(Condition::And);
    }
    if let Some(rest) = text.strip_prefix("not") {
        if rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
            return Ok(Condition::Not(Box::new(parse_condition(rest, rewrite)?)));
        }
    }
    if is_wrapped_in_brackets(text, '(') {
        // "(a + b)" is an expression, "(x > 0 or y)" a grouped condition: both parse
        if let Some(end) = find_pair_to_this_bracket(text, 0) {
            return parse_condition(&text[1..end], rewrite);
        }
    }
    match text {
        "True" => return Ok(Condition::Truth(true)),
        "False" => return Ok(Condition::Truth(false)),
        _ => {}
    }
    let (operands, ops) = split_comparisons(text);
    let parsed = operands
        .iter()
        .map(|operand| Expr::parse_expression(&rewrite(operand)))
        .collect::<Result<Vec<Expr>, String>>()?;
    let mut relations: Vec<Condition> = ops
        .iter()
        .enumerate()
        .map(|(i, op)| Condition::Rel(parsed[i].clone(), *op, parsed[i + 1].clone()))
        .collect();
    Ok(match relations.len() {
        0 => Condition::Value(parsed[0].clone()),
        1 => relations.remove(0),
        _ => Condition::And(relations),
    })
}

//___________________________________TESTS____________________________________
