//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::symbolic::symbolic_engine::Expr;
    use crate::symbolic::symbolic_latex::LatexPrinter;
    use crate::symbolic::symbolic_logic::{ConstantOracle, parse_condition};
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    #[test]
    fn test_operators_build_tree() {
        let x = Expr::var("x");
        let expr = x.clone() * Expr::Const(2.0) - Expr::Const(1.0);
        let expected = Expr::Sub(
            Box::new(Expr::Mul(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0)),
            )),
            Box::new(Expr::Const(1.0)),
        );
        assert_eq!(expr, expected);
        assert_eq!(-x.clone(), Expr::Mul(Expr::Const(-1.0).boxed(), x.boxed()));
    }

    #[test]
    fn test_display_round_trip() {
        let input = "2*x**2 - sqrt(y)/(1 + z) + f(a, 3)";
        let expr = Expr::parse_expression(input).unwrap();
        let printed = expr.to_string();
        let reparsed = Expr::parse_expression(&printed).unwrap();
        assert_eq!(expr, reparsed);
    }

    #[test]
    fn test_symbols_display_round_trip() {
        let expr = Expr::parse_expression("5*Symbol(\"\\mathrm{kN}\", \"kN\") + Symbol(\"\\oslash\")").unwrap();
        let reparsed = Expr::parse_expression(&expr.to_string()).unwrap();
        assert_eq!(expr, reparsed);
    }

    #[test]
    fn test_set_variable_from_map() {
        let expr = Expr::parse_expression("2*x + 3").unwrap();
        let values = HashMap::from([("x".to_string(), 5.0)]);
        let substituted = expr.set_variable_from_map(&values);
        assert!(substituted.free_symbols().is_empty());
        assert_eq!(substituted.simplify_numbers(), Expr::Const(13.0));
    }

    #[test]
    fn test_substitute_variable_by_expression() {
        let expr = Expr::parse_expression("a*b").unwrap();
        let b = Expr::parse_expression("c + 1").unwrap();
        let result = expr.substitute_variable("b", &b);
        assert_eq!(result.free_symbols(), vec!["a", "c"]);
        assert!(result.contains_variable("c"));
        assert!(!result.contains_variable("b"));
        let map = HashMap::from([("a".to_string(), Expr::Const(2.0))]);
        assert_eq!(result.substitute_from_map(&map).free_symbols(), vec!["c"]);
    }

    #[test]
    fn test_named_symbols_take_part_in_substitution() {
        let expr = Expr::parse_expression("Symbol(\"\\oslash_s\", \"diam_s\")**2*pi/4").unwrap();
        assert_eq!(expr.free_symbols(), vec!["diam_s"]);
        let values = HashMap::from([("diam_s".to_string(), 2.0)]);
        match expr.set_variable_from_map(&values).simplify_numbers() {
            Expr::Const(area) => assert_relative_eq!(area, std::f64::consts::PI),
            other => panic!("not folded: {:?}", other),
        }
    }

    #[test]
    fn test_literal_and_call_detection() {
        assert!(Expr::parse_expression("2*3 + pi").unwrap().is_literal());
        assert!(!Expr::parse_expression("2*x").unwrap().is_literal());
        assert!(!Expr::parse_expression("f(2)").unwrap().is_literal());
        assert!(Expr::parse_expression("1 + g(2)").unwrap().contains_call());
    }

    #[test]
    fn test_typeset_substituted_formula() {
        let expr = Expr::parse_expression("q*l**2/8").unwrap();
        let values = HashMap::from([("q".to_string(), 12.5), ("l".to_string(), 6.0)]);
        let printer = LatexPrinter::default().with_precision(2);
        assert_eq!(
            printer.expr(&expr.set_variable_from_map(&values)),
            "\\frac{12.5 \\cdot 6^{2}}{8}"
        );
    }

    #[test]
    fn test_guard_on_substituted_values() {
        let guard = parse_condition("x > 0 and x < 10", &|s: &str| s.to_string()).unwrap();
        let values = HashMap::from([("x".to_string(), 4.0)]);
        let bound = guard.map_exprs(&|e: &Expr| e.set_variable_from_map(&values));
        assert_eq!(bound.evaluate(&ConstantOracle), Some(true));
        assert_eq!(guard.evaluate(&ConstantOracle), None);
    }
}
