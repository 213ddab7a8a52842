//! # Symbolic Builder
//!
//! Turns a classified statement into symbolic equations:
//! - a bare name becomes `name = name`, resolved later only through the namespace
//! - an assignment becomes `target = <rewritten, parsed right-hand side>`
//! - a conditional becomes `target = Piecewise(...)`, pieces in branch order, `else` last
//! - a function becomes `f(params) = <return expression>` followed by its body equations,
//!   all of them carrying the function scope
//!
//! An expression the parser cannot read does not abort the block: the equation keeps the
//! rewritten text as `SymbolicValue::Raw` and is typeset as text. Inside a conditional only the
//! unreadable guard or branch value is kept as text, the other pieces stay symbolic.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_latex::text_to_latex;
use crate::symbolic::symbolic_logic::{Condition, Piecewise, parse_condition};
use crate::translator::errors::{CalcError, Result};
use crate::translator::lexical_rewriter::{LexicalRewriter, RewriterConfig};
use crate::translator::statement_classifier::{
    Guard, SourceStatement, StatementDetail, StatementKind, classify, split_assignment,
};
use log::{debug, warn};

/// right-hand side of an equation
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolicValue {
    Expr(Expr),
    Piecewise(Piecewise),
    /// text the symbolic parser could not read
    Raw(String),
}

impl SymbolicValue {
    pub fn free_symbols(&self) -> Vec<String> {
        match self {
            SymbolicValue::Expr(expr) => expr.free_symbols(),
            SymbolicValue::Piecewise(piecewise) => piecewise.free_symbols(),
            SymbolicValue::Raw(_) => Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SymbolicValue::Raw(_))
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            SymbolicValue::Expr(expr) => Some(expr),
            _ => None,
        }
    }
}

/// function parameter; the default is only shown, never substituted
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    Global,
    Function {
        name: String,
        params: Vec<Parameter>,
        /// assignment targets of the body
        locals: Vec<String>,
    },
}

impl Scope {
    /// names that belong to the scope and must not be read from the outer namespace
    pub fn hidden_names(&self) -> Vec<String> {
        match self {
            Scope::Global => Vec::new(),
            Scope::Function { params, locals, .. } => params
                .iter()
                .map(|p| p.name.clone())
                .chain(locals.iter().cloned())
                .collect(),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicEquation {
    pub kind: StatementKind,
    /// `Var(name)` or, for a function signature, `Call(name, params)`
    pub target: Expr,
    /// target name after the special-token rewriting, used for typesetting
    pub label: String,
    pub value: SymbolicValue,
    pub scope: Scope,
}

impl SymbolicEquation {
    /// source name of the target
    pub fn name(&self) -> &str {
        match &self.target {
            Expr::Var(name) | Expr::Call(name, _) => name,
            Expr::Symbol {
                name: Some(name), ..
            } => name,
            Expr::Symbol { label, .. } => label,
            _ => "",
        }
    }
}

/// builds equations, rewriting every expression on the way
#[derive(Debug, Clone, Default)]
pub struct SymbolicBuilder {
    rewriter: LexicalRewriter,
    /// fold constant sub-expressions of the built trees
    evaluate: bool,
}

impl SymbolicBuilder {
    pub fn new(rewriter: LexicalRewriter, evaluate: bool) -> Self {
        SymbolicBuilder { rewriter, evaluate }
    }

    pub fn rewriter(&self) -> &LexicalRewriter {
        &self.rewriter
    }

    /// rewrites and parses one expression; unreadable text degrades to `Raw`
    pub fn build_expression(&self, text: &str) -> SymbolicValue {
        let rewritten = self.rewriter.rewrite(text);
        match Expr::parse_expression(&rewritten) {
            Ok(expr) if self.evaluate => SymbolicValue::Expr(expr.simplify_numbers()),
            Ok(expr) => SymbolicValue::Expr(expr),
            Err(e) => {
                warn!("expression `{}` kept as text: {}", text.trim(), e);
                SymbolicValue::Raw(rewritten)
            }
        }
    }

    fn build_guard(&self, guard: &Guard) -> std::result::Result<Condition, String> {
        match guard {
            Guard::Else => Ok(Condition::Truth(true)),
            Guard::If(text) => parse_condition(text, &|operand: &str| self.rewriter.rewrite(operand)),
        }
    }

    /// all equations of one statement; a function yields its signature first
    pub fn build(&self, stmt: &SourceStatement) -> Result<Vec<SymbolicEquation>> {
        self.build_scoped(stmt, &Scope::Global)
    }

    fn build_scoped(&self, stmt: &SourceStatement, scope: &Scope) -> Result<Vec<SymbolicEquation>> {
        let equations = match &stmt.detail {
            StatementDetail::Name(name) => vec![self.build_name(name, scope)],
            StatementDetail::Assignment { target, expr } => vec![SymbolicEquation {
                kind: StatementKind::Assignment,
                target: Expr::var(target),
                label: self.rewriter.rewrite_target(target),
                value: self.build_expression(expr),
                scope: scope.clone(),
            }],
            StatementDetail::Conditional { target, branches } => {
                let mut piecewise = Piecewise::default();
                for branch in branches {
                    let (branch_target, expr) = split_assignment(&branch.body_text)
                        .ok()
                        .flatten()
                        .ok_or_else(|| {
                            CalcError::build(&stmt.raw_text, "branch body is not an assignment")
                        })?;
                    if &branch_target != target {
                        return Err(CalcError::classification(
                            &stmt.raw_text,
                            format!(
                                "branches assign to different targets `{}` and `{}`",
                                target, branch_target
                            ),
                        ));
                    }
                    let guard = self.build_guard(&branch.guard).unwrap_or_else(|e| {
                        warn!("guard of `{}` kept as text: {}", target, e);
                        match &branch.guard {
                            Guard::If(text) => Condition::Text(text.trim().to_string()),
                            Guard::Else => Condition::Truth(true),
                        }
                    });
                    let value = match self.build_expression(&expr) {
                        SymbolicValue::Expr(expr) => expr,
                        SymbolicValue::Piecewise(_) => Expr::label(&text_to_latex(expr.trim())),
                        SymbolicValue::Raw(text) => Expr::label(&text_to_latex(&text)),
                    };
                    piecewise.push(value, guard);
                }
                vec![SymbolicEquation {
                    kind: StatementKind::Conditional,
                    target: Expr::var(target),
                    label: self.rewriter.rewrite_target(target),
                    value: SymbolicValue::Piecewise(piecewise),
                    scope: scope.clone(),
                }]
            }
            StatementDetail::Function {
                name,
                params,
                body,
                return_expr,
            } => {
                if !scope.is_global() {
                    return Err(CalcError::build(
                        &stmt.raw_text,
                        "nested function definitions are not supported",
                    ));
                }
                let return_expr = return_expr.as_ref().ok_or_else(|| {
                    CalcError::build(
                        &stmt.raw_text,
                        format!("function `{}` has no return statement", name),
                    )
                })?;
                let body_statements = body
                    .iter()
                    .map(|text| classify(text))
                    .collect::<Result<Vec<_>>>()?;
                let locals = body_statements
                    .iter()
                    .filter_map(|s| match &s.detail {
                        StatementDetail::Assignment { target, .. }
                        | StatementDetail::Conditional { target, .. } => Some(target.clone()),
                        _ => None,
                    })
                    .collect();
                let parameters: Vec<Parameter> = params
                    .iter()
                    .map(|p| Parameter {
                        name: p.name.clone(),
                        default: p.default.as_ref().map(|d| match self.build_expression(d) {
                            SymbolicValue::Expr(expr) => expr,
                            _ => Expr::label(d),
                        }),
                    })
                    .collect();
                let function_scope = Scope::Function {
                    name: name.clone(),
                    params: parameters.clone(),
                    locals,
                };
                let mut equations = vec![SymbolicEquation {
                    kind: StatementKind::Function,
                    target: Expr::Call(
                        name.clone(),
                        parameters.iter().map(|p| Expr::var(&p.name)).collect(),
                    ),
                    label: self.rewriter.rewrite_target(name),
                    value: self.build_expression(return_expr),
                    scope: function_scope.clone(),
                }];
                for inner in &body_statements {
                    equations.extend(self.build_scoped(inner, &function_scope)?);
                }
                equations
            }
        };
        debug!(
            "built {} equation(s) from {} statement",
            equations.len(),
            stmt.kind
        );
        Ok(equations)
    }

    fn build_name(&self, name: &str, scope: &Scope) -> SymbolicEquation {
        let label = self.rewriter.rewrite_target(name);
        let value = if label == name {
            Expr::var(name)
        } else {
            Expr::Symbol {
                label: label.clone(),
                name: Some(name.to_string()),
            }
        };
        SymbolicEquation {
            kind: StatementKind::Name,
            target: Expr::var(name),
            label,
            value: SymbolicValue::Expr(value),
            scope: scope.clone(),
        }
    }
}

/// builds with a one-off builder using `config`, without constant folding
pub fn build(stmt: &SourceStatement, config: &RewriterConfig) -> Result<Vec<SymbolicEquation>> {
    SymbolicBuilder::new(LexicalRewriter::new(config.clone()), false).build(stmt)
}

//___________________________________TESTS____________________________________
