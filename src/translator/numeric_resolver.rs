//! # Numeric Resolver
//!
//! Substitutes namespace values into a symbolic equation and reduces it to a concrete value.
//!
//! Reduction works on numbers, matrices and quantities:
//! - sums and differences need identical units
//! - products and quotients combine units, `kN*m/m` gives `kN`
//! - `*` between conforming matrices is the matrix product (what `np.dot` rewrites to),
//!   two column vectors of equal length give their dot product
//! - powers need a plain-number exponent; matrices are raised elementwise
//! - trigonometric functions accept plain numbers, radians and degrees
//!
//! A unit name that is not bound in the namespace stands for one unit of itself, so `5*kN`
//! reduces to the quantity 5 kN. Whatever cannot be reduced falls back to the target's own
//! namespace value, and if there is none the substituted remainder is returned as unresolved.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_logic::{ConditionOracle, RelOp};
use crate::symbolic::symbolic_simplify::apply_unary;
use crate::translator::namespace::{Magnitude, Namespace, Quantity, ScopedNamespace, Value};
use crate::translator::symbolic_builder::{SymbolicEquation, SymbolicValue};
use crate::translator::units::{UnitFactors, UnitTable};
use log::{debug, warn};
use nalgebra::DMatrix;
use std::f64::consts::PI;

/// outcome of resolving one equation
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Known(Value),
    /// the value with everything known substituted
    Unresolved(SymbolicValue),
}

impl ResolvedValue {
    pub fn is_known(&self) -> bool {
        matches!(self, ResolvedValue::Known(_))
    }

    pub fn known(&self) -> Option<&Value> {
        match self {
            ResolvedValue::Known(value) => Some(value),
            ResolvedValue::Unresolved(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Numeric {
    Scalar(f64),
    Array(DMatrix<f64>),
}

impl Numeric {
    fn is_finite(&self) -> bool {
        match self {
            Numeric::Scalar(x) => x.is_finite(),
            Numeric::Array(m) => m.iter().all(|x| x.is_finite()),
        }
    }

    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Numeric {
        match self {
            Numeric::Scalar(x) => Numeric::Scalar(f(*x)),
            Numeric::Array(m) => Numeric::Array(m.map(f)),
        }
    }

    /// elementwise with scalar broadcasting
    fn zip<F: Fn(f64, f64) -> f64>(&self, other: &Numeric, f: F) -> Option<Numeric> {
        let result = match (self, other) {
            (Numeric::Scalar(a), Numeric::Scalar(b)) => Numeric::Scalar(f(*a, *b)),
            (Numeric::Scalar(a), Numeric::Array(m)) => Numeric::Array(m.map(|x| f(*a, x))),
            (Numeric::Array(m), Numeric::Scalar(b)) => Numeric::Array(m.map(|x| f(x, *b))),
            (Numeric::Array(m), Numeric::Array(n)) if m.shape() == n.shape() => {
                Numeric::Array(m.zip_map(n, f))
            }
            _ => return None,
        };
        Some(result)
    }

    fn product(&self, other: &Numeric) -> Option<Numeric> {
        match (self, other) {
            (Numeric::Array(m), Numeric::Array(n)) => {
                if m.ncols() == n.nrows() {
                    let p = m * n;
                    if p.shape() == (1, 1) {
                        Some(Numeric::Scalar(p[(0, 0)]))
                    } else {
                        Some(Numeric::Array(p))
                    }
                } else if m.ncols() == 1 && n.ncols() == 1 && m.nrows() == n.nrows() {
                    Some(Numeric::Scalar(m.dot(n)))
                } else {
                    None
                }
            }
            _ => self.zip(other, |a, b| a * b),
        }
    }
}

/// a number or array with its unit while an expression is reduced
#[derive(Debug, Clone, PartialEq)]
struct Reduced {
    num: Numeric,
    unit: UnitFactors,
}

impl Reduced {
    fn plain(num: Numeric) -> Self {
        Reduced {
            num,
            unit: UnitFactors::default(),
        }
    }

    fn scalar(&self) -> Option<f64> {
        match self.num {
            Numeric::Scalar(x) => Some(x),
            Numeric::Array(_) => None,
        }
    }

    fn lift(value: &Value) -> Option<Reduced> {
        match value {
            Value::Number(x) => Some(Reduced::plain(Numeric::Scalar(*x))),
            Value::Matrix(m) => Some(Reduced::plain(Numeric::Array(m.clone()))),
            Value::Quantity(q) => Some(Reduced {
                num: match &q.magnitude {
                    Magnitude::Scalar(x) => Numeric::Scalar(*x),
                    Magnitude::Array(m) => Numeric::Array(m.clone()),
                },
                unit: UnitFactors::parse(&q.unit),
            }),
            Value::List(items) => Reduced::lift_list(items),
            Value::Null => None,
        }
    }

    /// a list of scalars is a column vector, a list of equal-length lists a matrix
    fn lift_list(items: &[Value]) -> Option<Reduced> {
        let rows: Vec<Vec<Reduced>> = if items.iter().all(|v| matches!(v, Value::List(_))) {
            items
                .iter()
                .map(|row| match row {
                    Value::List(cells) => cells.iter().map(Reduced::lift).collect(),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()?
        } else {
            items
                .iter()
                .map(|item| Reduced::lift(item).map(|r| vec![r]))
                .collect::<Option<Vec<_>>>()?
        };
        Reduced::from_rows(rows)
    }

    fn from_rows(rows: Vec<Vec<Reduced>>) -> Option<Reduced> {
        let nrows = rows.len();
        let ncols = rows.first()?.len();
        if ncols == 0 || rows.iter().any(|row| row.len() != ncols) {
            return None;
        }
        let unit = rows[0][0].unit.clone();
        let mut values = Vec::with_capacity(nrows * ncols);
        for cell in rows.iter().flatten() {
            if !cell.unit.same_as(&unit) {
                return None;
            }
            values.push(cell.scalar()?);
        }
        Some(Reduced {
            num: Numeric::Array(DMatrix::from_row_slice(nrows, ncols, &values)),
            unit,
        })
    }

    fn lower(self) -> Value {
        match (self.num, self.unit.to_label()) {
            (Numeric::Scalar(x), None) => Value::Number(x),
            (Numeric::Array(m), None) => Value::Matrix(m),
            (Numeric::Scalar(x), Some(unit)) => Value::Quantity(Quantity::scalar(x, &unit)),
            (Numeric::Array(m), Some(unit)) => {
                Value::Quantity(Quantity::new(Magnitude::Array(m), &unit))
            }
        }
    }
}

/// reads the namespace, never writes it
pub struct NumericResolver<'a> {
    namespace: &'a dyn Namespace,
    units: &'a UnitTable,
}

impl<'a> NumericResolver<'a> {
    pub fn new(namespace: &'a dyn Namespace, units: &'a UnitTable) -> Self {
        NumericResolver { namespace, units }
    }

    /// resolves an equation; names of a function scope are hidden from the namespace
    pub fn resolve(&self, eq: &SymbolicEquation) -> ResolvedValue {
        let hidden = eq.scope.hidden_names();
        let resolved = if hidden.is_empty() {
            self.resolve_in_scope(eq)
        } else {
            let scoped = ScopedNamespace::new(self.namespace, hidden);
            NumericResolver::new(&scoped, self.units).resolve_in_scope(eq)
        };
        if !resolved.is_known() {
            warn!("`{}` left unresolved", eq.name());
        }
        resolved
    }

    fn resolve_in_scope(&self, eq: &SymbolicEquation) -> ResolvedValue {
        match &eq.value {
            SymbolicValue::Expr(expr) => self
                .evaluate_bound(expr)
                .or_else(|| self.target_value(eq))
                .map(ResolvedValue::Known)
                .unwrap_or_else(|| {
                    ResolvedValue::Unresolved(SymbolicValue::Expr(self.substitute(expr)))
                }),
            SymbolicValue::Piecewise(piecewise) => {
                for (i, (expr, guard)) in piecewise.pieces.iter().enumerate() {
                    match guard.evaluate(self) {
                        Some(true) => {
                            debug!("`{}`: piece {} selected", eq.name(), i);
                            return match self.evaluate(expr) {
                                Some(value) => ResolvedValue::Known(value),
                                None => ResolvedValue::Unresolved(SymbolicValue::Expr(
                                    self.substitute(expr),
                                )),
                            };
                        }
                        Some(false) => {}
                        None => break,
                    }
                }
                ResolvedValue::Unresolved(SymbolicValue::Piecewise(
                    piecewise.map_exprs(&|e: &Expr| self.substitute(e)),
                ))
            }
            SymbolicValue::Raw(_) => self
                .target_value(eq)
                .map(ResolvedValue::Known)
                .unwrap_or_else(|| ResolvedValue::Unresolved(eq.value.clone())),
        }
    }

    /// value of an expression that reads at least one bound name
    fn evaluate_bound(&self, expr: &Expr) -> Option<Value> {
        let reads_namespace = expr
            .free_symbols()
            .iter()
            .any(|name| self.namespace.contains(name));
        if reads_namespace {
            self.evaluate(expr)
        } else {
            None
        }
    }

    /// the namespace value of the target name
    fn target_value(&self, eq: &SymbolicEquation) -> Option<Value> {
        match &eq.target {
            Expr::Var(name) => self.namespace.get(name).cloned(),
            _ => None,
        }
    }

    /// reduces an expression to a value, `None` if anything is unbound or not reducible
    pub fn evaluate(&self, expr: &Expr) -> Option<Value> {
        self.reduce(expr).map(Reduced::lower)
    }

    fn lookup(&self, name: &str) -> Option<Reduced> {
        match self.namespace.get(name) {
            Some(value) => Reduced::lift(value),
            None if self.units.contains(name) => Some(Reduced {
                num: Numeric::Scalar(1.0),
                unit: UnitFactors::parse(name),
            }),
            None => None,
        }
    }

    fn reduce(&self, expr: &Expr) -> Option<Reduced> {
        let reduced = match expr {
            Expr::Const(x) => Reduced::plain(Numeric::Scalar(*x)),
            Expr::Pi => Reduced::plain(Numeric::Scalar(PI)),
            Expr::Var(name) => self.lookup(name)?,
            Expr::Symbol {
                name: Some(name), ..
            } => self.lookup(name)?,
            Expr::Symbol { name: None, .. } | Expr::Call(..) => return None,
            Expr::Add(lhs, rhs) | Expr::Sub(lhs, rhs) => {
                let (a, b) = (self.reduce(lhs)?, self.reduce(rhs)?);
                if !a.unit.same_as(&b.unit) {
                    return None;
                }
                let num = if matches!(expr, Expr::Add(..)) {
                    a.num.zip(&b.num, |x, y| x + y)?
                } else {
                    a.num.zip(&b.num, |x, y| x - y)?
                };
                Reduced { num, unit: a.unit }
            }
            Expr::Mul(lhs, rhs) => {
                let (a, b) = (self.reduce(lhs)?, self.reduce(rhs)?);
                Reduced {
                    num: a.num.product(&b.num)?,
                    unit: a.unit.mul(&b.unit),
                }
            }
            Expr::Div(lhs, rhs) => {
                let (a, b) = (self.reduce(lhs)?, self.reduce(rhs)?);
                Reduced {
                    num: a.num.zip(&b.num, |x, y| x / y)?,
                    unit: a.unit.div(&b.unit),
                }
            }
            Expr::Pow(base, exponent) => {
                let (a, e) = (self.reduce(base)?, self.reduce(exponent)?);
                if !e.unit.is_empty() {
                    return None;
                }
                let e = e.scalar()?;
                Reduced {
                    num: a.num.map(|x| x.powf(e)),
                    unit: a.unit.powf(e),
                }
            }
            Expr::Matrix(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| row.iter().map(|cell| self.reduce(cell)).collect())
                    .collect::<Option<Vec<Vec<Reduced>>>>()?;
                Reduced::from_rows(rows)?
            }
            _ => {
                let (name, arg) = expr.unary_parts()?;
                self.reduce_unary(name, self.reduce(arg)?)?
            }
        };
        if reduced.num.is_finite() {
            Some(reduced)
        } else {
            None
        }
    }

    fn reduce_unary(&self, name: &str, arg: Reduced) -> Option<Reduced> {
        let label = arg.unit.to_label();
        match name {
            "sqrt" => Some(Reduced {
                num: arg.num.map(f64::sqrt),
                unit: arg.unit.powf(0.5),
            }),
            "Abs" => Some(Reduced {
                num: arg.num.map(f64::abs),
                unit: arg.unit,
            }),
            "sin" | "cos" | "tg" => {
                let to_radians = match label.as_deref() {
                    None | Some("rad") => 1.0,
                    Some(unit) if UnitTable::is_degree(unit) => PI / 180.0,
                    Some(_) => return None,
                };
                Some(Reduced::plain(
                    arg.num.map(|x| apply_unary(name, x * to_radians)),
                ))
            }
            _ if label.is_none() => Some(Reduced::plain(arg.num.map(|x| apply_unary(name, x)))),
            _ => None,
        }
    }

    /// the equation's expression with bound values put in, `None` for piecewise and raw values
    pub fn substituted(&self, eq: &SymbolicEquation) -> Option<Expr> {
        let expr = eq.value.as_expr()?;
        let hidden = eq.scope.hidden_names();
        if hidden.is_empty() {
            Some(self.substitute(expr))
        } else {
            let scoped = ScopedNamespace::new(self.namespace, hidden);
            Some(NumericResolver::new(&scoped, self.units).substitute(expr))
        }
    }

    /// replaces bound scalar names by their numbers; a quantity becomes `magnitude * unit`
    pub fn substitute(&self, expr: &Expr) -> Expr {
        match expr {
            Expr::Var(name)
            | Expr::Symbol {
                name: Some(name), ..
            } => self
                .value_expr(name)
                .unwrap_or_else(|| expr.clone()),
            _ => expr.map_children(&mut |child| self.substitute(child)),
        }
    }

    fn value_expr(&self, name: &str) -> Option<Expr> {
        match self.namespace.get(name)? {
            Value::Number(x) => Some(Expr::Const(*x)),
            Value::Quantity(Quantity {
                magnitude: Magnitude::Scalar(x),
                unit,
            }) => {
                if UnitTable::is_dimensionless(unit) {
                    Some(Expr::Const(*x))
                } else {
                    Some(Expr::Mul(
                        Expr::Const(*x).boxed(),
                        Expr::label(&self.units.unit_markup(unit)).boxed(),
                    ))
                }
            }
            _ => None,
        }
    }
}

impl ConditionOracle for NumericResolver<'_> {
    fn compare(&self, lhs: &Expr, op: RelOp, rhs: &Expr) -> Option<bool> {
        let (a, b) = (self.reduce(lhs)?, self.reduce(rhs)?);
        let (x, y) = (a.scalar()?, b.scalar()?);
        // a quantity compares with a plain zero
        let comparable = a.unit.same_as(&b.unit)
            || (a.unit.is_empty() && x == 0.0)
            || (b.unit.is_empty() && y == 0.0);
        if comparable { Some(op.holds(x, y)) } else { None }
    }

    fn truthy(&self, expr: &Expr) -> Option<bool> {
        let value = self.reduce(expr)?;
        if !value.unit.is_empty() {
            return None;
        }
        value.scalar().map(|x| x != 0.0)
    }
}

/// resolves with the default unit table
pub fn resolve(eq: &SymbolicEquation, namespace: &dyn Namespace) -> ResolvedValue {
    let units = UnitTable::default();
    NumericResolver::new(namespace, &units).resolve(eq)
}

//___________________________________TESTS____________________________________
