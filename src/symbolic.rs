/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedEngiCalc::symbolic::symbolic_engine::Expr;
/// let input = "2*x**2 + sqrt(F_Ed)/3";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) defines the expression tree of the calculation formulas
/// 2) substitutes variables by numbers or other expressions
/// 3) collects the free symbols a formula depends on
///# Example#
/// ```
/// use std::collections::HashMap;
/// use RustedEngiCalc::symbolic::symbolic_engine::Expr;
/// let expr = Expr::parse_expression("2*x + 3").unwrap();
/// let all = expr.free_symbols();
/// println!("all arguments are variables {:?}", all);
/// let values = HashMap::from([("x".to_string(), 5.0)]);
/// let substituted = expr.set_variable_from_map(&values).simplify_numbers();
/// assert_eq!(substituted, Expr::Const(13.0));
/// ```
pub mod symbolic_engine;
/// tests of parsing, substitution and typesetting working together
mod symbolic_engine_tests;
/// LaTeX printer for expressions, conditions and piecewise expressions
///# Example
/// ```
/// use RustedEngiCalc::symbolic::symbolic_engine::Expr;
/// let expr = Expr::parse_expression("q_k*l**2/8").unwrap();
/// assert_eq!(expr.to_latex(), "\\frac{q_{k} l^{2}}{8}");
/// ```
pub mod symbolic_latex;
/// boolean guards (and, or, not, comparisons) and piecewise expressions built from conditionals
pub mod symbolic_logic;
/// constant folding
pub mod symbolic_simplify;
/// bracket and quote aware scanning of expression strings
pub mod utils;
