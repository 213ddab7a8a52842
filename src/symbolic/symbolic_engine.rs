//! # Symbolic Engine Module
//!
//! Expression tree used by the calculation translator. A right-hand side of a calculation
//! statement is parsed into an `Expr`, substituted from the namespace, folded and typeset.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - free variables like "x", "q_k" that may be bound in the namespace
//! - **Opaque symbols**: `Symbol { label, name }` - atoms with a verbatim typeset label (units,
//!   names carrying special marks like `\oslash`); `name` keeps the source identifier when the
//!   symbol stands for a variable
//! - **Constants**: `Const(f64)`, `Pi`
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow`
//! - **Functions**: `Exp`, `Ln`, `Log10`, `Sqrt`, `Abs`, `sin`, `cos`, `tg`, `arcsin`, `arccos`, `arctg`
//! - **Calls**: `Call(name, args)` - user functions, never expanded
//! - **Matrices**: `Matrix(rows)` - array literals
//!
//! ### Key Methods
//! - `parse_expression(input)` - string to expression (see `parse_expr`)
//! - `free_symbols()` - sorted names the expression depends on
//! - `set_variable_from_map()`, `substitute_variable()`, `substitute_from_map()` - substitution
//! - `simplify_numbers()` - constant folding (see `symbolic_simplify`)
//! - `to_latex()` - typesetting (see `symbolic_latex`)

#![allow(non_camel_case_types)]

use std::collections::HashMap;
use std::fmt;

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedEngiCalc::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "F_Ed")
    Var(String),
    /// Opaque symbol: never interpreted, typeset from `label`.
    /// `name` is the namespace key the symbol stands for, if any
    Symbol {
        label: String,
        name: Option<String>,
    },
    /// Numerical constant value
    Const(f64),
    /// the number pi, kept symbolic
    Pi,
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    Log10(Box<Expr>),
    Sqrt(Box<Expr>),
    Abs(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    /// Arctangent function: arctan(x) - uses mathematical notation 'arctg'
    arctg(Box<Expr>),
    /// call of a function the engine knows nothing about: `f(x, 2)`
    Call(String, Vec<Expr>),
    /// array literal, row-major
    Matrix(Vec<Vec<Expr>>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Symbol { label, name: None } => write!(f, "Symbol(\"{}\")", label),
            Expr::Symbol {
                label,
                name: Some(name),
            } => write!(f, "Symbol(\"{}\", \"{}\")", label, name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Pi => write!(f, "pi"),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::Log10(expr) => write!(f, "log10({})", expr),
            Expr::Sqrt(expr) => write!(f, "sqrt({})", expr),
            Expr::Abs(expr) => write!(f, "Abs({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::Call(name, args) => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, args.join(", "))
            }
            Expr::Matrix(rows) => {
                let rows: Vec<String> = rows
                    .iter()
                    .map(|row| {
                        let row: Vec<String> = row.iter().map(|e| e.to_string()).collect();
                        format!("[{}]", row.join(", "))
                    })
                    .collect();
                write!(f, "Matrix([{}])", rows.join(", "))
            }
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    /// opaque symbol that stands for nothing in the namespace (e.g. a unit label)
    pub fn label(label: &str) -> Expr {
        Expr::Symbol {
            label: label.to_string(),
            name: None,
        }
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// numeric value of a constant leaf
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            Expr::Mul(lhs, rhs) => match (lhs.as_ref(), rhs.as_ref()) {
                (Expr::Const(a), Expr::Const(b)) if *a == -1.0 => Some(-b),
                _ => None,
            },
            _ => None,
        }
    }

    /// true for `Mul(Const(-1), x)`, the shape unary minus is parsed into
    pub fn is_negation(&self) -> bool {
        matches!(self, Expr::Mul(lhs, _) if **lhs == Expr::Const(-1.0))
    }

    /// name of the unary function node and its argument
    pub fn unary_parts(&self) -> Option<(&'static str, &Expr)> {
        let parts = match self {
            Expr::Exp(e) => ("exp", e),
            Expr::Ln(e) => ("ln", e),
            Expr::Log10(e) => ("log10", e),
            Expr::Sqrt(e) => ("sqrt", e),
            Expr::Abs(e) => ("Abs", e),
            Expr::sin(e) => ("sin", e),
            Expr::cos(e) => ("cos", e),
            Expr::tg(e) => ("tg", e),
            Expr::arcsin(e) => ("arcsin", e),
            Expr::arccos(e) => ("arccos", e),
            Expr::arctg(e) => ("arctg", e),
            _ => return None,
        };
        Some((parts.0, parts.1.as_ref()))
    }

    /// builds a unary function node by its name, `None` for unknown names
    pub fn unary_from_name(name: &str, arg: Expr) -> Option<Expr> {
        let arg = arg.boxed();
        let expr = match name {
            "exp" => Expr::Exp(arg),
            "ln" | "log" => Expr::Ln(arg),
            "log10" => Expr::Log10(arg),
            "sqrt" => Expr::Sqrt(arg),
            "Abs" | "abs" => Expr::Abs(arg),
            "sin" => Expr::sin(arg),
            "cos" => Expr::cos(arg),
            "tg" | "tan" => Expr::tg(arg),
            "arcsin" | "asin" => Expr::arcsin(arg),
            "arccos" | "acos" => Expr::arccos(arg),
            "arctg" | "arctan" | "atan" => Expr::arctg(arg),
            _ => return None,
        };
        Some(expr)
    }

    /// rebuilds the node with `f` applied to every direct child
    pub fn map_children<F>(&self, f: &mut F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Symbol { .. } | Expr::Const(_) | Expr::Pi => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Mul(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Div(lhs, rhs) => Expr::Div(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Pow(base, exp) => Expr::Pow(f(base).boxed(), f(exp).boxed()),
            Expr::Exp(e) => Expr::Exp(f(e).boxed()),
            Expr::Ln(e) => Expr::Ln(f(e).boxed()),
            Expr::Log10(e) => Expr::Log10(f(e).boxed()),
            Expr::Sqrt(e) => Expr::Sqrt(f(e).boxed()),
            Expr::Abs(e) => Expr::Abs(f(e).boxed()),
            Expr::sin(e) => Expr::sin(f(e).boxed()),
            Expr::cos(e) => Expr::cos(f(e).boxed()),
            Expr::tg(e) => Expr::tg(f(e).boxed()),
            Expr::arcsin(e) => Expr::arcsin(f(e).boxed()),
            Expr::arccos(e) => Expr::arccos(f(e).boxed()),
            Expr::arctg(e) => Expr::arctg(f(e).boxed()),
            Expr::Call(name, args) => Expr::Call(name.clone(), args.iter().map(|a| f(a)).collect()),
            Expr::Matrix(rows) => Expr::Matrix(
                rows.iter()
                    .map(|row| row.iter().map(|e| f(e)).collect())
                    .collect(),
            ),
        }
    }

    /// direct children of the node
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Symbol { .. } | Expr::Const(_) | Expr::Pi => Vec::new(),
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Call(_, args) => args.iter().collect(),
            Expr::Matrix(rows) => rows.iter().flatten().collect(),
            _ => self.unary_parts().map(|(_, e)| vec![e]).unwrap_or_default(),
        }
    }

    /// Substitutes multiple variables with constant values using a HashMap.
    ///
    /// Only variables present in the map are substituted. Opaque symbols that stand for a
    /// namespace name are substituted too.
    pub fn set_variable_from_map(&self, var_map: &HashMap<String, f64>) -> Expr {
        match self {
            Expr::Var(name) if var_map.contains_key(name) => Expr::Const(var_map[name]),
            Expr::Symbol {
                name: Some(name), ..
            } if var_map.contains_key(name) => Expr::Const(var_map[name]),
            _ => self.map_children(&mut |e| e.set_variable_from_map(var_map)),
        }
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            Expr::Symbol {
                name: Some(name), ..
            } if name == var => expr.clone(),
            _ => self.map_children(&mut |e| e.substitute_variable(var, expr)),
        }
    }

    /// substitute several variables at once, each with its own expression
    pub fn substitute_from_map(&self, var_map: &HashMap<String, Expr>) -> Expr {
        match self {
            Expr::Var(name) if var_map.contains_key(name) => var_map[name].clone(),
            Expr::Symbol {
                name: Some(name), ..
            } if var_map.contains_key(name) => var_map[name].clone(),
            _ => self.map_children(&mut |e| e.substitute_from_map(var_map)),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Symbol {
                name: Some(name), ..
            } => name == var_name,
            _ => self
                .children()
                .iter()
                .any(|child| child.contains_variable(var_name)),
        }
    }

    /// sorted, deduplicated names of all free variables (and named opaque symbols)
    pub fn free_symbols(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_symbols(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_symbols(&self, names: &mut Vec<String>) {
        match self {
            Expr::Var(name) => names.push(name.clone()),
            Expr::Symbol {
                name: Some(name), ..
            } => names.push(name.clone()),
            _ => {
                for child in self.children() {
                    child.collect_symbols(names);
                }
            }
        }
    }

    /// true if nothing in the tree needs a namespace binding
    pub fn is_literal(&self) -> bool {
        self.free_symbols().is_empty() && !self.contains_call()
    }

    pub fn contains_call(&self) -> bool {
        match self {
            Expr::Call(..) => true,
            _ => self.children().iter().any(|child| child.contains_call()),
        }
    }
}
