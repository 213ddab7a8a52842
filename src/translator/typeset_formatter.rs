//! # Typeset Formatter
//!
//! Renders resolved values and symbolic equations as LaTeX and lays several equations out in
//! an `aligned` block.
//!
//! An equation is the `=`-joined sequence of the enabled segments, in this order:
//! name, symbolic expression, substituted expression, value. Segments that would only repeat
//! a neighbour are left out, so `a = 5` with `a` bound to 5 renders as `a = 5`, not `a = 5 = 5`.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_latex::{
    LatexPrinter, MulSymbol, name_to_latex, number_to_latex, round_to, text_to_latex,
};
use crate::translator::namespace::{Magnitude, Quantity, Value};
use crate::translator::numeric_resolver::ResolvedValue;
use crate::translator::symbolic_builder::{Scope, SymbolicEquation, SymbolicValue};
use crate::translator::units::UnitTable;
use itertools::Itertools;
use nalgebra::DMatrix;
use std::fmt;

/// which segments of an equation are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayToggles {
    pub show_name: bool,
    pub show_expression: bool,
    /// the expression with the namespace values put in
    pub show_substitution: bool,
    pub show_value: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        DisplayToggles {
            show_name: true,
            show_expression: true,
            show_substitution: false,
            show_value: true,
        }
    }
}

impl DisplayToggles {
    pub fn symbolic_only() -> Self {
        DisplayToggles {
            show_value: false,
            ..DisplayToggles::default()
        }
    }

    pub fn numeric_only() -> Self {
        DisplayToggles {
            show_expression: false,
            ..DisplayToggles::default()
        }
    }
}

/// typeset segments of one equation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EquationMarkup {
    pub segments: Vec<String>,
}

impl EquationMarkup {
    /// `lhs & = rhs`: one alignment point per equation
    pub fn aligned(&self) -> String {
        match self.segments.split_first() {
            Some((lhs, rest)) if !rest.is_empty() => format!("{} & = {}", lhs, rest.join(" = ")),
            Some((lhs, _)) => format!("{} &", lhs),
            None => "&".to_string(),
        }
    }

    /// `$$ ... $$` display math
    pub fn inline(&self) -> String {
        format!("$${}$$", self)
    }
}

impl fmt::Display for EquationMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(" = "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypesetFormatter {
    printer: LatexPrinter,
    precision: usize,
    units: UnitTable,
    deduplicate: bool,
    /// pandoc custom style wrapped around batches
    style: Option<String>,
}

impl Default for TypesetFormatter {
    fn default() -> Self {
        TypesetFormatter::new(2, MulSymbol::Space, UnitTable::default())
    }
}

impl TypesetFormatter {
    pub fn new(precision: usize, mul_symbol: MulSymbol, units: UnitTable) -> Self {
        TypesetFormatter {
            printer: LatexPrinter::new(mul_symbol),
            precision,
            units,
            deduplicate: true,
            style: None,
        }
    }

    pub fn with_deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style;
        self
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    fn number(&self, value: f64) -> String {
        number_to_latex(round_to(value, self.precision))
    }

    fn matrix(&self, m: &DMatrix<f64>) -> String {
        let cells: Vec<Vec<String>> = m
            .row_iter()
            .map(|row| row.iter().map(|x| self.number(*x)).collect())
            .collect();
        self.printer.matrix(&cells)
    }

    fn quantity(&self, q: &Quantity) -> String {
        let magnitude = match &q.magnitude {
            Magnitude::Scalar(x) => self.number(*x),
            Magnitude::Array(m) => self.matrix(m),
        };
        if q.is_dimensionless() {
            magnitude
        } else if UnitTable::is_degree(&q.unit) {
            format!("{}^{{\\circ}}", magnitude)
        } else {
            format!("{} \\ {}", magnitude, self.units.unit_markup(&q.unit))
        }
    }

    /// one resolved value at the formatter's precision
    pub fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Number(x) => self.number(*x),
            Value::Matrix(m) => self.matrix(m),
            Value::Quantity(q) => self.quantity(q),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(|v| self.format_value(v)).collect();
                format!("\\left[ {}\\right]", items.join(", \\  "))
            }
            Value::Null => "\\text{None}".to_string(),
        }
    }

    pub fn format_symbolic(&self, value: &SymbolicValue) -> String {
        match value {
            SymbolicValue::Expr(expr) => self.printer.expr(expr),
            SymbolicValue::Piecewise(piecewise) => self.printer.piecewise(piecewise),
            SymbolicValue::Raw(text) => text_to_latex(text),
        }
    }

    /// the left-hand side; a function signature shows its parameters with defaults
    pub fn format_target(&self, eq: &SymbolicEquation) -> String {
        let name = name_to_latex(&eq.label);
        match (&eq.target, &eq.scope) {
            (Expr::Call(..), Scope::Function { params, .. }) => {
                let params: Vec<String> = params
                    .iter()
                    .map(|p| match &p.default {
                        Some(default) => {
                            format!("{}={}", name_to_latex(&p.name), self.printer.expr(default))
                        }
                        None => name_to_latex(&p.name),
                    })
                    .collect();
                format!("{}{{\\left({} \\right)}}", name, params.join(", "))
            }
            _ => name,
        }
    }

    pub fn format_equation(
        &self,
        eq: &SymbolicEquation,
        resolved: &ResolvedValue,
        toggles: DisplayToggles,
    ) -> EquationMarkup {
        self.assemble(eq, resolved, None, toggles)
    }

    /// as `format_equation`, with `substituted` shown after the expression when enabled
    pub fn format_equation_substituted(
        &self,
        eq: &SymbolicEquation,
        resolved: &ResolvedValue,
        substituted: &Expr,
        toggles: DisplayToggles,
    ) -> EquationMarkup {
        self.assemble(eq, resolved, Some(substituted), toggles)
    }

    fn assemble(
        &self,
        eq: &SymbolicEquation,
        resolved: &ResolvedValue,
        substituted: Option<&Expr>,
        toggles: DisplayToggles,
    ) -> EquationMarkup {
        let name = self.format_target(eq);
        let expression = self.format_symbolic(&eq.value);
        let value = match resolved {
            ResolvedValue::Known(value) => Some(self.format_value(value)),
            ResolvedValue::Unresolved(_) => None,
        };
        let plain_number = eq
            .value
            .as_expr()
            .and_then(|e| e.as_number())
            .is_some();
        let value_shown = toggles.show_value && value.is_some();

        let mut segments = Vec::new();
        if toggles.show_name {
            segments.push(name.clone());
        }
        let expression_repeats = expression == name
            || value.as_ref() == Some(&expression)
            || (plain_number && value_shown);
        if toggles.show_expression && !(expression_repeats && toggles.show_name) {
            segments.push(expression.clone());
        }
        if toggles.show_substitution {
            if let Some(substituted) = substituted {
                let printed = self.printer.with_precision(self.precision).expr(substituted);
                if printed != expression && value.as_ref() != Some(&printed) {
                    segments.push(printed);
                }
            }
        }
        if let Some(value) = value.filter(|_| toggles.show_value) {
            segments.push(value);
        }
        EquationMarkup { segments }
    }

    /// lays equations out row-major in `columns` columns of an `aligned` block
    pub fn format_batch(&self, equations: &[EquationMarkup], columns: usize) -> String {
        let aligned = equations.iter().map(|e| e.aligned());
        let cells: Vec<String> = if self.deduplicate {
            aligned.unique().collect()
        } else {
            aligned.collect()
        };
        if cells.is_empty() {
            return String::new();
        }
        let columns = columns.clamp(1, cells.len());
        let rows: Vec<String> = cells
            .chunks(columns)
            .map(|row| {
                let mut text = row.join(" \\quad & ");
                for _ in row.len()..columns {
                    text.push_str(" \\quad & &");
                }
                text
            })
            .collect();
        let block = format!("$$\\begin{{aligned}}{}\\end{{aligned}}$$", rows.join(" \\\\ "));
        match &self.style {
            Some(style) => format!("::: {{custom-style=\"{}\"}}\n{}\n:::", style, block),
            None => block,
        }
    }
}

/// one value with default settings at the given precision
pub fn format_value(value: &Value, precision: usize) -> String {
    TypesetFormatter::new(precision, MulSymbol::Space, UnitTable::default()).format_value(value)
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::statement_classifier::{StatementKind, classify};
    use crate::translator::symbolic_builder::SymbolicBuilder;

    fn equation(code: &str) -> SymbolicEquation {
        SymbolicBuilder::default()
            .build(&classify(code).unwrap())
            .unwrap()
            .remove(0)
    }

    fn markup(segments: &[&str]) -> EquationMarkup {
        EquationMarkup {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_format_numbers() {
        assert_eq!(format_value(&Value::Number(13.0), 2), "13");
        assert_eq!(format_value(&Value::Number(2.345678), 2), "2.35");
        assert_eq!(format_value(&Value::Number(-4.0), 3), "-4");
        assert_eq!(format_value(&Value::Number(0.001), 2), "0");
    }

    #[test]
    fn test_number_round_trip() {
        for (value, precision) in [(3.14159, 2), (-12.3456, 1), (100.0, 0), (0.5, 3)] {
            let printed = format_value(&Value::Number(value), precision);
            let parsed: f64 = printed.parse().unwrap();
            assert_eq!(parsed, round_to(value, precision));
        }
    }

    #[test]
    fn test_format_quantities() {
        assert_eq!(format_value(&Value::quantity(12.345, "kN"), 1), "12.3 \\ \\mathrm{kN}");
        assert_eq!(format_value(&Value::quantity(30.0, "deg"), 2), "30^{\\circ}");
        assert_eq!(format_value(&Value::quantity(0.75, "dimensionless"), 2), "0.75");
        assert_eq!(
            format_value(&Value::quantity(4.0, "kN/m**2"), 2),
            "4 \\ \\mathrm{kN}/\\mathrm{m}^{2}"
        );
    }

    #[test]
    fn test_format_matrix_and_list() {
        assert_eq!(
            format_value(&Value::matrix(2, 2, &[1.0, 2.5, 3.0, 4.0]), 2),
            "\\left[\\begin{matrix}1 & 2.5\\\\3 & 4\\end{matrix}\\right]"
        );
        let list = Value::List(vec![Value::Number(1.0), Value::List(vec![Value::Null])]);
        assert_eq!(
            format_value(&list, 2),
            "\\left[ 1, \\  \\left[ \\text{None}\\right]\\right]"
        );
    }

    #[test]
    fn test_equation_segments() {
        let formatter = TypesetFormatter::default();
        let eq = equation("q = 2*x + 3");
        let known = ResolvedValue::Known(Value::Number(13.0));
        let full = formatter.format_equation(&eq, &known, DisplayToggles::default());
        assert_eq!(full.to_string(), "q = 2 x + 3 = 13");
        let symbolic = formatter.format_equation(&eq, &known, DisplayToggles::symbolic_only());
        assert_eq!(symbolic.to_string(), "q = 2 x + 3");
        let numeric = formatter.format_equation(&eq, &known, DisplayToggles::numeric_only());
        assert_eq!(numeric.to_string(), "q = 13");
    }

    #[test]
    fn test_literal_collapses() {
        let formatter = TypesetFormatter::default();
        let eq = equation("a = 5");
        let known = ResolvedValue::Known(Value::Number(5.0));
        assert_eq!(
            formatter.format_equation(&eq, &known, DisplayToggles::default()).to_string(),
            "a = 5"
        );
        // unresolved values are omitted, the literal stays
        let unresolved = ResolvedValue::Unresolved(eq.value.clone());
        assert_eq!(
            formatter.format_equation(&eq, &unresolved, DisplayToggles::default()).to_string(),
            "a = 5"
        );
        let name = equation("F_Ed");
        assert_eq!(name.kind, StatementKind::Name);
        let known = ResolvedValue::Known(Value::quantity(3.0, "kN"));
        assert_eq!(
            formatter.format_equation(&name, &known, DisplayToggles::default()).to_string(),
            "F_{Ed} = 3 \\ \\mathrm{kN}"
        );
    }

    #[test]
    fn test_substitution_segment() {
        let formatter = TypesetFormatter::default();
        let eq = equation("M = q*l**2/8");
        let substituted = Expr::parse_expression("12.5*6**2/8").unwrap();
        let toggles = DisplayToggles {
            show_substitution: true,
            ..DisplayToggles::default()
        };
        let known = ResolvedValue::Known(Value::Number(56.25));
        assert_eq!(
            formatter
                .format_equation_substituted(&eq, &known, &substituted, toggles)
                .to_string(),
            "M = \\frac{q l^{2}}{8} = \\frac{12.5 \\cdot 6^{2}}{8} = 56.25"
        );
    }

    #[test]
    fn test_function_target_and_piecewise() {
        let formatter = TypesetFormatter::default();
        let eqs = SymbolicBuilder::default()
            .build(&classify("def f(x, a=2):\n    return a*x").unwrap())
            .unwrap();
        assert_eq!(formatter.format_target(&eqs[0]), "f{\\left(x, a=2 \\right)}");
        let eq = equation("if x > 0:\n    a = x\nelse:\n    a = 0");
        assert_eq!(
            formatter.format_symbolic(&eq.value),
            "\\begin{cases} x & \\text{for}\\: x > 0 \\\\0 & \\text{otherwise} \\end{cases}"
        );
    }

    #[test]
    fn test_batch_layout_pads_short_rows() {
        let formatter = TypesetFormatter::default();
        let eqs: Vec<EquationMarkup> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| markup(&[n, "1"]))
            .collect();
        let batch = formatter.format_batch(&eqs, 3);
        assert_eq!(
            batch,
            "$$\\begin{aligned}a & = 1 \\quad & b & = 1 \\quad & c & = 1 \\\\ d & = 1 \\quad & & \\quad & &\\end{aligned}$$"
        );
        let rows: Vec<&str> = batch.split(" \\\\ ").collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].matches('&').count(), rows[1].matches('&').count());
    }

    #[test]
    fn test_batch_dedup_clamp_and_style() {
        let formatter = TypesetFormatter::default().with_style(Some("Equation".to_string()));
        let eqs = vec![markup(&["a", "1"]), markup(&["a", "1"]), markup(&["b", "2"])];
        assert_eq!(
            formatter.format_batch(&eqs, 10),
            "::: {custom-style=\"Equation\"}\n$$\\begin{aligned}a & = 1 \\quad & b & = 2\\end{aligned}$$\n:::"
        );
        let keep_all = TypesetFormatter::default().with_deduplicate(false);
        assert_eq!(
            keep_all.format_batch(&eqs, 0),
            "$$\\begin{aligned}a & = 1 \\\\ a & = 1 \\\\ b & = 2\\end{aligned}$$"
        );
        assert_eq!(formatter.format_batch(&[], 2), "");
    }
}
