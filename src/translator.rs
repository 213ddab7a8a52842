/// error type: blocks that cannot be classified or built
pub mod errors;
/// unit names, their typeset labels and unit algebra
pub mod units;
/// rewrites numeric-library and unit-library syntax into plain symbolic syntax
///# Example
/// ```
/// use RustedEngiCalc::translator::lexical_rewriter::LexicalRewriter;
/// let rewriter = LexicalRewriter::default();
/// assert_eq!(rewriter.rewrite("np.sqrt(x)"), "sqrt(x)");
/// assert_eq!(rewriter.rewrite("f.to(kN)"), "f");
/// ```
pub mod lexical_rewriter;
/// splits source text into statements and sorts them into names, assignments, conditionals and functions
pub mod statement_classifier;
/// builds symbolic equations (expression or piecewise) from classified statements
pub mod symbolic_builder;
/// values of the calculation session and the read-only namespace they are looked up in
pub mod namespace;
/// substitutes namespace values and reduces equations to numbers, matrices and quantities
pub mod numeric_resolver;
/// LaTeX for values, equations and aligned blocks of equations
pub mod typeset_formatter;
/// caller-owned memory of earlier equations
pub mod registry;
/// where source text comes from
pub mod source;
/// where rendered markup goes
pub mod sink;
/// ________________________________________________________________________________________________________________________________
/// # Translate and render
/// the complete call from source text to an aligned block of equations
///# Example
/// ```
/// use std::collections::HashMap;
/// use RustedEngiCalc::Utils::config::RenderConfig;
/// use RustedEngiCalc::translator::namespace::Value;
/// use RustedEngiCalc::translator::pipeline::Translator;
/// let namespace: HashMap<String, Value> = HashMap::from([("x".to_string(), Value::Number(5.0))]);
/// let mut translator = Translator::new(RenderConfig::default(), &namespace);
/// let markup = translator.render("q = 2*x + 3").unwrap();
/// assert_eq!(markup, "$$\\begin{aligned}q & = 2 x + 3 = 13\\end{aligned}$$");
/// ```
pub mod pipeline;
/// end-to-end scenarios
mod translator_tests;
