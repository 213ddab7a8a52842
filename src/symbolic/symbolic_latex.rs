//! # LaTeX printer
//!
//! Turns `Expr`, `Condition` and `Piecewise` trees into LaTeX math markup. The output follows
//! the conventions calculation reports are usually typeset with: products are juxtaposed with a
//! thin space (configurable), quotients are `\frac`, function arguments are wrapped in
//! `\left( \right)`, natural logarithms are `\ln`, and conditionals are `cases` blocks.
//!
//! Identifiers are typeset by `name_to_latex`: `q_k` → `q_{k}`, `alpha` → `\alpha`, `x1` → `x_{1}`,
//! `a__b` → `a^{b}`. Labels that already contain LaTeX (`\oslash_s`, `\mathrm{kN}`) pass through.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_logic::{Condition, Piecewise, RelOp};
use strum_macros::{Display, EnumIter, EnumString};

/// source text as `\text{...}`: TeX specials escaped, line breaks and indentation collapsed
pub fn text_to_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for (i, word) in text.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        for c in word.chars() {
            match c {
                '\\' => out.push_str("\\textbackslash{}"),
                '~' => out.push_str("\\textasciitilde{}"),
                '^' => out.push_str("\\textasciicircum{}"),
                '%' | '&' | '#' | '_' | '{' | '}' | '$' => {
                    out.push('\\');
                    out.push(c);
                }
                _ => out.push(c),
            }
        }
    }
    format!("\\text{{{}}}", out)
}

/// symbol printed between the factors of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum MulSymbol {
    #[default]
    Space,
    Dot,
    Times,
}

impl MulSymbol {
    pub fn latex(&self) -> &'static str {
        match self {
            MulSymbol::Space => " ",
            MulSymbol::Dot => " \\cdot ",
            MulSymbol::Times => " \\times ",
        }
    }
}

const GREEK: [&str; 35] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau",
    "upsilon", "phi", "varphi", "chi", "psi", "omega", "Gamma", "Delta", "Theta", "Lambda", "Xi",
    "Sigma", "Phi", "Psi", "Omega",
];

fn symbol_part_to_latex(part: &str) -> String {
    if part.contains('\\') || part.contains('{') || part.contains('^') {
        return part.to_string();
    }
    if GREEK.contains(&part) {
        return format!("\\{}", part);
    }
    // "x12" -> "x_{12}", "x" stays
    let digits = part.chars().rev().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && digits < part.chars().count() {
        let (stem, number) = part.split_at(part.len() - digits);
        return format!("{}_{{{}}}", symbol_part_to_latex(stem), number);
    }
    part.to_string()
}

/// typesets an identifier: `_` starts subscripts, `__` superscripts
pub fn name_to_latex(name: &str) -> String {
    // labels carrying LaTeX commands only get their top-level underscores braced
    let (main, supers) = match name.split_once("__") {
        Some((main, sup)) if !name.contains('\\') => (main, Some(sup)),
        _ => (name, None),
    };
    let mut parts = main.split('_').filter(|p| !p.is_empty());
    let head = parts.next().unwrap_or("");
    let subs: Vec<String> = parts.map(symbol_part_to_latex).collect();
    let mut out = symbol_part_to_latex(head);
    if !subs.is_empty() {
        if out.contains("_{") && !out.starts_with('\\') {
            // trailing digits already produced a subscript: "x1_a" -> "x_{1 a}"
            out.pop();
            out.push(' ');
        } else {
            out.push_str("_{");
        }
        out.push_str(&subs.join(" "));
        out.push('}');
    }
    if let Some(sup) = supers {
        out = format!("{}^{{{}}}", out, name_to_latex(sup));
    }
    out
}

/// shortest decimal representation: 13.0 -> "13", 0.5 -> "0.5", 1.5e-7 -> "1.5 \cdot 10^{-7}"
pub fn number_to_latex(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-4..1e15).contains(&magnitude) {
        let exponent = magnitude.log10().floor() as i32;
        let mantissa = value / 10f64.powi(exponent);
        let mantissa = (mantissa * 1e12).round() / 1e12;
        return format!("{} \\cdot 10^{{{}}}", mantissa, exponent);
    }
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// rounds half away from zero to `precision` decimals
pub fn round_to(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn relop_latex(op: RelOp) -> &'static str {
    match op {
        RelOp::Lt => "<",
        RelOp::Le => "\\leq",
        RelOp::Gt => ">",
        RelOp::Ge => "\\geq",
        RelOp::Eq => "=",
        RelOp::Ne => "\\neq",
    }
}

// binding strength used to decide about brackets
const PREC_ADD: u8 = 10;
const PREC_NEG: u8 = 15;
const PREC_MUL: u8 = 20;
const PREC_POW: u8 = 30;
const PREC_ATOM: u8 = 100;

/// LaTeX printer with rendering options
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatexPrinter {
    pub mul_symbol: MulSymbol,
    /// round numeric constants to this many decimals; `None` prints them as written
    pub precision: Option<usize>,
}

impl LatexPrinter {
    pub fn new(mul_symbol: MulSymbol) -> Self {
        LatexPrinter {
            mul_symbol,
            precision: None,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    fn number(&self, value: f64) -> String {
        match self.precision {
            Some(p) => number_to_latex(round_to(value, p)),
            None => number_to_latex(value),
        }
    }

    fn precedence(expr: &Expr) -> u8 {
        match expr {
            Expr::Add(..) | Expr::Sub(..) => PREC_ADD,
            Expr::Const(v) if *v < 0.0 => PREC_NEG,
            Expr::Mul(..) if expr.is_negation() => PREC_NEG,
            Expr::Mul(lhs, _) if Self::precedence(lhs) == PREC_NEG => PREC_NEG,
            Expr::Mul(..) => PREC_MUL,
            Expr::Pow(..) => PREC_POW,
            _ => PREC_ATOM,
        }
    }

    fn parens(&self, expr: &Expr) -> String {
        format!("\\left({}\\right)", self.expr(expr))
    }

    /// prints `expr`, in brackets if it binds weaker than `min_prec`
    fn operand(&self, expr: &Expr, min_prec: u8) -> String {
        if Self::precedence(expr) < min_prec {
            self.parens(expr)
        } else {
            self.expr(expr)
        }
    }

    fn function(&self, name: &str, arg: &Expr) -> String {
        format!("{}{{\\left({} \\right)}}", name, self.expr(arg))
    }

    pub fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Var(name) => name_to_latex(name),
            Expr::Symbol { label, .. } if label.starts_with("\\text{") => label.clone(),
            Expr::Symbol { label, .. } => name_to_latex(label),
            Expr::Const(value) => self.number(*value),
            Expr::Pi => "\\pi".to_string(),
            Expr::Add(lhs, rhs) => {
                let left = self.expr(lhs);
                match rhs.as_ref() {
                    Expr::Const(v) if *v < 0.0 => format!("{} - {}", left, self.number(-v)),
                    Expr::Mul(_, negated) if rhs.is_negation() => {
                        format!("{} - {}", left, self.operand(negated, PREC_MUL))
                    }
                    _ => format!("{} + {}", left, self.expr(rhs)),
                }
            }
            Expr::Sub(lhs, rhs) => format!(
                "{} - {}",
                self.expr(lhs),
                self.operand(rhs, PREC_MUL)
            ),
            Expr::Mul(_, rhs) if expr.is_negation() => {
                format!("- {}", self.operand(rhs, PREC_MUL))
            }
            Expr::Mul(lhs, rhs) => {
                let left = if Self::precedence(lhs) == PREC_NEG && matches!(**lhs, Expr::Const(_)) {
                    // leading negative factor needs no brackets: "-2 x"
                    self.expr(lhs)
                } else {
                    self.operand(lhs, PREC_MUL)
                };
                let right = self.operand(rhs, PREC_MUL);
                let right = if Self::precedence(rhs) == PREC_NEG && !right.starts_with("\\left(") {
                    self.parens(rhs)
                } else {
                    right
                };
                let separator = if self.mul_symbol == MulSymbol::Space
                    && right.starts_with(|c: char| c.is_ascii_digit())
                {
                    MulSymbol::Dot.latex()
                } else {
                    self.mul_symbol.latex()
                };
                format!("{}{}{}", left, separator, right)
            }
            Expr::Div(lhs, rhs) => format!("\\frac{{{}}}{{{}}}", self.expr(lhs), self.expr(rhs)),
            Expr::Pow(base, exp) => {
                if let Expr::Const(e) = exp.as_ref() {
                    if *e == 0.5 {
                        return format!("\\sqrt{{{}}}", self.expr(base));
                    }
                }
                let base_tex = if Self::precedence(base) <= PREC_POW || matches!(**base, Expr::Div(..)) {
                    self.parens(base)
                } else {
                    let tex = self.expr(base);
                    if tex.contains('^') { format!("{{{}}}", tex) } else { tex }
                };
                format!("{}^{{{}}}", base_tex, self.expr(exp))
            }
            Expr::Exp(arg) => format!("e^{{{}}}", self.expr(arg)),
            Expr::Ln(arg) => self.function("\\ln", arg),
            Expr::Log10(arg) => self.function("\\log_{10}", arg),
            Expr::Sqrt(arg) => format!("\\sqrt{{{}}}", self.expr(arg)),
            Expr::Abs(arg) => format!("\\left|{{{}}}\\right|", self.expr(arg)),
            Expr::sin(arg) => self.function("\\sin", arg),
            Expr::cos(arg) => self.function("\\cos", arg),
            Expr::tg(arg) => self.function("\\tan", arg),
            Expr::arcsin(arg) => self.function("\\arcsin", arg),
            Expr::arccos(arg) => self.function("\\arccos", arg),
            Expr::arctg(arg) => self.function("\\arctan", arg),
            Expr::Call(name, args) => {
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("{}{{\\left({} \\right)}}", name_to_latex(name), args.join(", "))
            }
            Expr::Matrix(rows) => self.matrix(
                &rows
                    .iter()
                    .map(|row| row.iter().map(|e| self.expr(e)).collect())
                    .collect::<Vec<Vec<String>>>(),
            ),
        }
    }

    /// `\left[\begin{matrix}a & b\\c & d\end{matrix}\right]` from already typeset cells
    pub fn matrix(&self, cells: &[Vec<String>]) -> String {
        let rows: Vec<String> = cells.iter().map(|row| row.join(" & ")).collect();
        format!(
            "\\left[\\begin{{matrix}}{}\\end{{matrix}}\\right]",
            rows.join("\\\\")
        )
    }

    pub fn condition(&self, condition: &Condition) -> String {
        match condition {
            Condition::Rel(lhs, op, rhs) => {
                format!("{} {} {}", self.expr(lhs), relop_latex(*op), self.expr(rhs))
            }
            Condition::And(parts) => parts
                .iter()
                .map(|p| match p {
                    Condition::Or(_) => format!("\\left({}\\right)", self.condition(p)),
                    _ => self.condition(p),
                })
                .collect::<Vec<_>>()
                .join(" \\wedge "),
            Condition::Or(parts) => parts
                .iter()
                .map(|p| self.condition(p))
                .collect::<Vec<_>>()
                .join(" \\vee "),
            Condition::Not(inner) => match inner.as_ref() {
                Condition::And(_) | Condition::Or(_) => {
                    format!("\\neg \\left({}\\right)", self.condition(inner))
                }
                _ => format!("\\neg {}", self.condition(inner)),
            },
            Condition::Truth(true) => "\\text{True}".to_string(),
            Condition::Truth(false) => "\\text{False}".to_string(),
            Condition::Value(expr) => self.expr(expr),
            Condition::Text(text) => text_to_latex(text),
        }
    }

    pub fn piecewise(&self, piecewise: &Piecewise) -> String {
        let pieces: Vec<String> = piecewise
            .pieces
            .iter()
            .map(|(expr, guard)| {
                if guard.is_always_true() {
                    format!("{} & \\text{{otherwise}}", self.expr(expr))
                } else {
                    format!("{} & \\text{{for}}\\: {}", self.expr(expr), self.condition(guard))
                }
            })
            .collect();
        format!("\\begin{{cases}} {} \\end{{cases}}", pieces.join(" \\\\"))
    }
}

impl Expr {
    /// LaTeX with default options
    pub fn to_latex(&self) -> String {
        LatexPrinter::default().expr(self)
    }
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn tex(s: &str) -> String {
        Expr::parse_expression(s).unwrap().to_latex()
    }

    #[test]
    fn test_names() {
        assert_eq!(name_to_latex("x"), "x");
        assert_eq!(name_to_latex("q_k"), "q_{k}");
        assert_eq!(name_to_latex("sigma_c_d"), "\\sigma_{c d}");
        assert_eq!(name_to_latex("x1"), "x_{1}");
        assert_eq!(name_to_latex("a__b"), "a^{b}");
        assert_eq!(name_to_latex("\\oslash_s"), "\\oslash_{s}");
        assert_eq!(name_to_latex("\\mathrm{kN}"), "\\mathrm{kN}");
        assert_eq!(name_to_latex("varepsilon_c"), "\\varepsilon_{c}");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(number_to_latex(13.0), "13");
        assert_eq!(number_to_latex(-2.5), "-2.5");
        assert_eq!(number_to_latex(1.5e-7), "1.5 \\cdot 10^{-7}");
        assert_eq!(round_to(2.346, 2), 2.35);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(-0.001, 2), 0.0);
    }

    #[test]
    fn test_sums_and_products() {
        assert_eq!(tex("2*x + 3"), "2 x + 3");
        assert_eq!(tex("x - (y + z)"), "x - \\left(y + z\\right)");
        assert_eq!(tex("(a + b)*c"), "\\left(a + b\\right) c");
        assert_eq!(tex("2*3"), "2 \\cdot 3");
        assert_eq!(tex("x + -3"), "x - 3");
        assert_eq!(tex("-x"), "- x");
        assert_eq!(tex("x*-2"), "x \\left(-2\\right)");
        assert_eq!(tex("-2*x"), "-2 x");
    }

    #[test]
    fn test_fractions_powers_functions() {
        assert_eq!(tex("a/b"), "\\frac{a}{b}");
        assert_eq!(tex("x**2"), "x^{2}");
        assert_eq!(tex("(a + b)**2"), "\\left(a + b\\right)^{2}");
        assert_eq!(tex("(a/b)**2"), "\\left(\\frac{a}{b}\\right)^{2}");
        assert_eq!(tex("sqrt(x)"), "\\sqrt{x}");
        assert_eq!(tex("exp(x)"), "e^{x}");
        assert_eq!(tex("log(x)"), "\\ln{\\left(x \\right)}");
        assert_eq!(tex("sin(alpha)"), "\\sin{\\left(\\alpha \\right)}");
        assert_eq!(tex("Abs(x)"), "\\left|{x}\\right|");
        assert_eq!(tex("f(x, y)"), "f{\\left(x, y \\right)}");
    }

    #[test]
    fn test_matrix() {
        assert_eq!(
            tex("Matrix([[1, 2], [3, 4]])"),
            "\\left[\\begin{matrix}1 & 2\\\\3 & 4\\end{matrix}\\right]"
        );
    }

    #[test]
    fn test_mul_symbol_option() {
        let expr = Expr::parse_expression("a*b").unwrap();
        let printer = LatexPrinter::new(MulSymbol::from_str("dot").unwrap());
        assert_eq!(printer.expr(&expr), "a \\cdot b");
        let printer = LatexPrinter::new(MulSymbol::Times);
        assert_eq!(printer.expr(&expr), "a \\times b");
    }

    #[test]
    fn test_precision() {
        let expr = Expr::parse_expression("3.14159*r").unwrap();
        let printer = LatexPrinter::default().with_precision(2);
        assert_eq!(printer.expr(&expr), "3.14 r");
    }

    #[test]
    fn test_piecewise() {
        let pw = Piecewise::new(vec![
            (
                Expr::var("x"),
                Condition::Rel(Expr::var("x"), RelOp::Gt, Expr::Const(0.0)),
            ),
            (Expr::Const(0.0), Condition::Truth(true)),
        ]);
        assert_eq!(
            LatexPrinter::default().piecewise(&pw),
            "\\begin{cases} x & \\text{for}\\: x > 0 \\\\0 & \\text{otherwise} \\end{cases}"
        );
    }

    #[test]
    fn test_conditions() {
        let printer = LatexPrinter::default();
        let cond = Condition::And(vec![
            Condition::Rel(Expr::var("x"), RelOp::Ge, Expr::Const(1.0)),
            Condition::Or(vec![
                Condition::Rel(Expr::var("y"), RelOp::Ne, Expr::Const(0.0)),
                Condition::Truth(false),
            ]),
        ]);
        assert_eq!(
            printer.condition(&cond),
            "x \\geq 1 \\wedge \\left(y \\neq 0 \\vee \\text{False}\\right)"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(text_to_latex("a % b"), "\\text{a \\% b}");
        assert_eq!(
            text_to_latex("x_1 & #2 {y}"),
            "\\text{x\\_1 \\& \\#2 \\{y\\}}"
        );
        assert_eq!(
            text_to_latex("a^2 ~ \\b"),
            "\\text{a\\textasciicircum{}2 \\textasciitilde{} \\textbackslash{}b}"
        );
        assert_eq!(text_to_latex("if a:\n    b = 1"), "\\text{if a: b = 1}");
        let kept = Expr::label(&text_to_latex("a_1 % b"));
        assert_eq!(LatexPrinter::default().expr(&kept), "\\text{a\\_1 \\% b}");
        let guard = Condition::Text("cls == 'C30'".to_string());
        assert_eq!(LatexPrinter::default().condition(&guard), "\\text{cls == 'C30'}");
    }
}
