//! a module turns a String expression into a symbolic expression
//!# Example
//! ```
//! use RustedEngiCalc::symbolic::symbolic_engine::Expr;
//! let input = "2*x**2 + sqrt(y)/3";
//! let parsed_expression = Expr::parse_expression(input).unwrap();
//! println!(" parsed_expression {}", parsed_expression);
//! assert_eq!(parsed_expression.free_symbols(), vec!["x", "y"]);
//! ```
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{
    find_char_positions_outside_brackets, find_pair_to_this_bracket, is_identifier,
    is_wrapped_in_brackets, map_outside_quotes, split_outside_brackets,
};
use log::trace;

//                  search recursion diagram
//                "y^2+exp(x)+log(x)/y-x^2.3"       |
//                |       left  | right             |
//                |_________________________________|
//                |   split by rightmost + or -     |
//                |_________________________________|
//                | y^2+exp(x)+log(x)/y |   x^2.3   |
//                |       |             |     |     |
//                |______\|/____________|____\|/____|
//                | split by rightmost +|  split ^  |
//                |_____________________|___________|
//                | y^2+exp(x)| log(x)/y|  x  | 2.3 |
//                |       |   |     |   |_____Ok____|
//                |______\|/__|____\|/__|
//                  etc...
//  the rightmost operator of the lowest precedence level becomes the root, so operators of
//  equal precedence associate to the left. '^' is split at its leftmost position and
//  associates to the right.

/// true if the '+'/'-' at `pos` joins two operands (not a sign, not an exponent of 1e-3)
fn is_binary_sign(input: &str, pos: usize) -> bool {
    let before = input[..pos].trim_end();
    match before.chars().last() {
        None => false,
        Some(c) if "+-*/^(,[=<>".contains(c) => false,
        Some('e') | Some('E') => !is_scientific_mantissa(&before[..before.len() - 1]),
        Some(_) => true,
    }
}

/// true if `stem` ends with a number literal like `1.5` (and not with an identifier like `x1`)
fn is_scientific_mantissa(stem: &str) -> bool {
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() || !digits.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let rest = &stem[..stem.len() - digits.len()];
    match rest.chars().last() {
        Some(c) => !(c.is_alphanumeric() || c == '_'),
        None => true,
    }
}

// function to find the rightmost occurrence of operators at the same precedence level,
fn find_rightmost_additive(input: &str) -> Option<(usize, char)> {
    find_char_positions_outside_brackets(input, &['+', '-'])
        .into_iter()
        .rev()
        .find(|pos| is_binary_sign(input, *pos))
        .map(|pos| (pos, input[pos..].chars().next().unwrap_or('+')))
}

fn find_rightmost_multiplicative(input: &str) -> Option<(usize, char)> {
    find_char_positions_outside_brackets(input, &['*', '/'])
        .last()
        .map(|pos| (*pos, input[*pos..].chars().next().unwrap_or('*')))
}

/// removes surrounding quotes of a string literal argument
fn unquote(arg: &str) -> Option<&str> {
    let arg = arg.trim();
    let first = arg.chars().next()?;
    if (first == '"' || first == '\'') && arg.len() >= 2 && arg.ends_with(first) {
        Some(&arg[1..arg.len() - 1])
    } else {
        None
    }
}

/// `[[a, b], [c, d]]` -> 2x2 matrix, `[a, b]` -> column
fn parse_list(input: &str) -> Result<Expr, String> {
    let inner = &input.trim()[1..input.trim().len() - 1];
    let items = split_outside_brackets(inner, ',');
    let nested = !items.is_empty() && items.iter().all(|item| is_wrapped_in_brackets(item, '['));
    let mut rows = Vec::with_capacity(items.len());
    for item in items.iter().filter(|item| !item.is_empty()) {
        if nested {
            let row_inner = &item[1..item.len() - 1];
            let row = split_outside_brackets(row_inner, ',')
                .into_iter()
                .filter(|e| !e.is_empty())
                .map(parse_expression_func)
                .collect::<Result<Vec<Expr>, String>>()?;
            rows.push(row);
        } else {
            rows.push(vec![parse_expression_func(item)?]);
        }
    }
    if nested {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != width) {
            return Err(format!("ragged matrix literal `{}`", input));
        }
    }
    Ok(Expr::Matrix(rows))
}

fn parse_call(name: &str, inner: &str, input: &str) -> Result<Expr, String> {
    let args = split_outside_brackets(inner, ',');
    match name {
        "Symbol" => {
            let label = args
                .first()
                .and_then(|a| unquote(a))
                .ok_or_else(|| format!("Symbol needs a quoted label: `{}`", input))?;
            let source_name = args.get(1).and_then(|a| unquote(a)).map(str::to_string);
            Ok(Expr::Symbol {
                label: label.to_string(),
                name: source_name,
            })
        }
        "Matrix" | "array" if args.len() == 1 && is_wrapped_in_brackets(args[0], '[') => {
            parse_list(args[0])
        }
        _ => {
            let parsed = args
                .iter()
                .map(|a| parse_expression_func(a))
                .collect::<Result<Vec<Expr>, String>>()?;
            if parsed.len() == 1 {
                if let Some(expr) = Expr::unary_from_name(name, parsed[0].clone()) {
                    return Ok(expr);
                }
            }
            if parsed.len() == 2 && (name == "pow" || name == "Pow") {
                return Ok(parsed[0].clone().pow(parsed[1].clone()));
            }
            Ok(Expr::Call(name.to_string(), parsed))
        }
    }
}

fn parse_atom(input: &str) -> Result<Expr, String> {
    if input.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return input
            .parse::<f64>()
            .map(Expr::Const)
            .map_err(|_| format!("invalid number `{}`", input));
    }
    match input {
        "True" => return Ok(Expr::Const(1.0)),
        "False" => return Ok(Expr::Const(0.0)),
        "pi" => return Ok(Expr::Pi),
        _ => {}
    }
    if let Some(open) = input.find('(') {
        let name = input[..open].trim();
        if is_identifier(name) {
            if let Some(close) = find_pair_to_this_bracket(input, open) {
                if close == input.len() - 1 {
                    trace!("call `{}` found in {}", name, input);
                    return parse_call(name, &input[open + 1..close], input);
                }
            }
        }
    }
    if is_identifier(input) {
        return Ok(Expr::Var(input.to_string()));
    }
    Err(format!("cannot parse `{}`", input))
}

/// recursive descent by splitting on the operator of the lowest precedence
pub fn parse_expression_func(input: &str) -> Result<Expr, String> {
    let input = input.trim();
    trace!("input: {}", input);
    if input.is_empty() {
        return Err("empty expression".to_string());
    }
    // Handling addition and subtraction
    if let Some((pos, op)) = find_rightmost_additive(input) {
        let left = parse_expression_func(&input[..pos])?;
        let right = parse_expression_func(&input[pos + 1..])?;
        trace!("SIGN '{}' found at position {}", op, pos);
        return Ok(if op == '+' {
            Expr::Add(left.boxed(), right.boxed())
        } else {
            Expr::Sub(left.boxed(), right.boxed())
        });
    }
    // Handling multiplication and division
    if let Some((pos, op)) = find_rightmost_multiplicative(input) {
        let left = parse_expression_func(&input[..pos])?;
        let right = parse_expression_func(&input[pos + 1..])?;
        trace!("SIGN '{}' found at position {}", op, pos);
        return Ok(if op == '*' {
            Expr::Mul(left.boxed(), right.boxed())
        } else {
            Expr::Div(left.boxed(), right.boxed())
        });
    }
    // unary signs bind weaker than '^': -x^2 is -(x^2)
    if let Some(rest) = input.strip_prefix('-') {
        return Ok(match parse_expression_func(rest)? {
            Expr::Const(val) => Expr::Const(-val),
            inner => -inner,
        });
    }
    if let Some(rest) = input.strip_prefix('+') {
        return parse_expression_func(rest);
    }
    // Handling exponentiation
    if let Some(pos) = find_char_positions_outside_brackets(input, &['^']).first() {
        let base = parse_expression_func(&input[..*pos])?;
        let exponent = parse_expression_func(&input[pos + 1..])?;
        return Ok(base.pow(exponent));
    }
    if is_wrapped_in_brackets(input, '(') {
        return parse_expression_func(&input[1..input.len() - 1]);
    }
    if is_wrapped_in_brackets(input, '[') {
        return parse_list(input);
    }
    parse_atom(input)
}

impl Expr {
    /// parses Python-flavoured expression text: `**` is a power, `[..]` a matrix literal,
    /// `Symbol("label")` an opaque symbol
    pub fn parse_expression(input: &str) -> Result<Expr, String> {
        let normalised = map_outside_quotes(input, |chunk| chunk.replace("**", "^"));
        parse_expression_func(&normalised)
    }
}

//___________________________________TESTS____________________________________
