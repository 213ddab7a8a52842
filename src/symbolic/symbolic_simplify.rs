//! # Constant Folding
//!
//! Evaluates arithmetic on numerical constants inside an expression tree. Used when the
//! calculation is rendered with `evaluate` switched on, and to reduce guards and substituted
//! expressions that have become purely numerical.
//!
//! - `Const(2) + Const(3)` → `Const(5)`
//! - `sqrt(Const(16))` → `Const(4)`
//! - `x + Const(2) + Const(3)` → unchanged (no reassociation)
//!
//! Operations whose result is not a finite number (`1/0`, `ln(-1)`) are left unfolded.

use crate::symbolic::symbolic_engine::Expr;

/// scalar value of a unary function, named as in `Expr::unary_parts`
pub fn apply_unary(name: &str, x: f64) -> f64 {
    match name {
        "exp" => x.exp(),
        "ln" => x.ln(),
        "log10" => x.log10(),
        "sqrt" => x.sqrt(),
        "Abs" => x.abs(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tg" => x.tan(),
        "arcsin" => x.asin(),
        "arccos" => x.acos(),
        "arctg" => x.atan(),
        _ => f64::NAN,
    }
}

fn finite(value: f64) -> Option<f64> {
    if value.is_finite() { Some(value) } else { None }
}

/// scalar result of a binary node over two constants
pub fn apply_binary(expr: &Expr, a: f64, b: f64) -> Option<f64> {
    let value = match expr {
        Expr::Add(..) => a + b,
        Expr::Sub(..) => a - b,
        Expr::Mul(..) => a * b,
        Expr::Div(..) => a / b,
        Expr::Pow(..) => a.powf(b),
        _ => return None,
    };
    finite(value)
}

impl Expr {
    /// Performs constant folding on numerical operations.
    ///
    /// Recursively evaluates arithmetic and elementary functions whose arguments are all
    /// constants. `Pi` is folded only when it takes part in an arithmetic operation with
    /// another constant, so a bare `pi` stays symbolic.
    ///
    /// # Returns
    /// Expression with all constant arithmetic operations evaluated
    pub fn simplify_numbers(&self) -> Expr {
        let folded = self.map_children(&mut |e| e.simplify_numbers());
        let value = match &folded {
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => match (lhs.numeric_value(), rhs.numeric_value()) {
                (Some(a), Some(b)) => apply_binary(&folded, a, b),
                _ => None,
            },
            _ => match folded.unary_parts() {
                Some((name, Expr::Const(x))) => finite(apply_unary(name, *x)),
                _ => None,
            },
        };
        value.map(Expr::Const).unwrap_or(folded)
    }

    /// value of a constant or of `pi`
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            Expr::Pi => Some(std::f64::consts::PI),
            _ => None,
        }
    }
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_engine::Expr;
    use approx::assert_relative_eq;

    #[test]
    fn test_fold_arithmetic() {
        let expr = Expr::Const(2.0) * Expr::Const(3.0) + Expr::Const(1.0);
        assert_eq!(expr.simplify_numbers(), Expr::Const(7.0));
    }

    #[test]
    fn test_fold_keeps_variables() {
        let x = Expr::var("x");
        let expr = x.clone() + Expr::Const(2.0) * Expr::Const(3.0);
        assert_eq!(expr.simplify_numbers(), x + Expr::Const(6.0));
    }

    #[test]
    fn test_fold_functions_and_pi() {
        let expr = Expr::Sqrt(Expr::Const(16.0).boxed());
        assert_eq!(expr.simplify_numbers(), Expr::Const(4.0));
        let circle = Expr::Pi * Expr::Const(2.0);
        match circle.simplify_numbers() {
            Expr::Const(v) => assert_relative_eq!(v, 2.0 * std::f64::consts::PI),
            other => panic!("not folded: {:?}", other),
        }
        assert_eq!(Expr::Pi.simplify_numbers(), Expr::Pi);
    }

    #[test]
    fn test_no_fold_on_division_by_zero() {
        let expr = Expr::Const(1.0) / Expr::Const(0.0);
        assert_eq!(expr.simplify_numbers(), expr);
    }
}
