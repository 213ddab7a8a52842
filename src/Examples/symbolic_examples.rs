// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_latex::{LatexPrinter, MulSymbol};
use crate::symbolic::symbolic_logic::{Piecewise, parse_condition};
use std::collections::HashMap;
#[allow(dead_code)]
pub fn sym_examples(example: usize) {
    match example {
        0 => {
            // parse expression from string to symbolic expression
            let input = "q_k*l**2/8 + sqrt(F_Ed)/3";
            let parsed_expression = match Expr::parse_expression(input) {
                Ok(expr) => expr,
                Err(e) => {
                    println!("cannot parse {}: {}", input, e);
                    return;
                }
            };
            println!(" parsed_expression {}", parsed_expression);
            // free symbols the formula depends on
            println!("free symbols {:?}", parsed_expression.free_symbols());
            // put numbers in and fold the constants
            let values = HashMap::from([
                ("q_k".to_string(), 10.0),
                ("l".to_string(), 6.0),
                ("F_Ed".to_string(), 81.0),
            ]);
            let result = parsed_expression.set_variable_from_map(&values).simplify_numbers();
            println!("result {}", result);
            // typeset
            println!("latex {}", parsed_expression.to_latex());
        }
        1 => {
            // product symbol and rounding of constants are printer options
            let expr = Expr::parse_expression("3.14159*r**2*h").unwrap_or(Expr::Const(0.0));
            let printer = LatexPrinter::new(MulSymbol::Dot).with_precision(2);
            println!("{}", printer.expr(&expr));
        }
        2 => {
            // conditional as piecewise expression
            let keep = |s: &str| s.to_string();
            let pieces = vec![
                (Expr::var("x"), parse_condition("x > 0", &keep)),
                (Expr::Const(0.0), parse_condition("not x > 0", &keep)),
            ];
            let mut piecewise = Piecewise::default();
            for (expr, guard) in pieces {
                match guard {
                    Ok(guard) => piecewise.push(expr, guard),
                    Err(e) => println!("bad guard: {}", e),
                }
            }
            println!("{}", LatexPrinter::default().piecewise(&piecewise));
        }
        _ => {
            println!("no such example");
        }
    }
}
