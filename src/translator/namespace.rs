//! Values of the calculation session and the read-only lookup the resolver works against.
//!
//! The namespace is owned by the caller; the translator only ever reads it. `get` returning
//! `None` means the name is not bound at all, which is different from a name bound to
//! `Value::Null`.

use crate::translator::units::{DIMENSIONLESS, UnitTable};
use nalgebra::DMatrix;
use std::collections::{BTreeMap, HashMap, HashSet};

/// numeric part of a quantity
#[derive(Debug, Clone, PartialEq)]
pub enum Magnitude {
    Scalar(f64),
    Array(DMatrix<f64>),
}

/// a magnitude with a unit label; the label is never empty
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub magnitude: Magnitude,
    pub unit: String,
}

impl Quantity {
    pub fn new(magnitude: Magnitude, unit: &str) -> Self {
        let unit = unit.trim();
        Quantity {
            magnitude,
            unit: if unit.is_empty() {
                DIMENSIONLESS.to_string()
            } else {
                unit.to_string()
            },
        }
    }

    pub fn scalar(value: f64, unit: &str) -> Self {
        Quantity::new(Magnitude::Scalar(value), unit)
    }

    pub fn is_dimensionless(&self) -> bool {
        UnitTable::is_dimensionless(&self.unit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Matrix(DMatrix<f64>),
    Quantity(Quantity),
    List(Vec<Value>),
    Null,
}

impl Value {
    pub fn quantity(value: f64, unit: &str) -> Value {
        Value::Quantity(Quantity::scalar(value, unit))
    }

    /// column vector
    pub fn vector(values: &[f64]) -> Value {
        Value::Matrix(DMatrix::from_column_slice(values.len(), 1, values))
    }

    /// matrix from row-major values
    pub fn matrix(nrows: usize, ncols: usize, values: &[f64]) -> Value {
        Value::Matrix(DMatrix::from_row_slice(nrows, ncols, values))
    }

    /// plain number or the magnitude of a scalar quantity
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Quantity(Quantity {
                magnitude: Magnitude::Scalar(m),
                ..
            }) => Some(*m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<Quantity> for Value {
    fn from(value: Quantity) -> Self {
        Value::Quantity(value)
    }
}

impl From<DMatrix<f64>> for Value {
    fn from(value: DMatrix<f64>) -> Self {
        Value::Matrix(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

/// read-only name -> value lookup
pub trait Namespace {
    /// `None` if the name is not bound
    fn get(&self, name: &str) -> Option<&Value>;

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl Namespace for HashMap<String, Value> {
    fn get(&self, name: &str) -> Option<&Value> {
        HashMap::get(self, name)
    }
}

impl Namespace for BTreeMap<String, Value> {
    fn get(&self, name: &str) -> Option<&Value> {
        BTreeMap::get(self, name)
    }
}

impl<T: Namespace + ?Sized> Namespace for &T {
    fn get(&self, name: &str) -> Option<&Value> {
        (**self).get(name)
    }
}

/// hides names of a function scope (parameters, locals) from the outer namespace
pub struct ScopedNamespace<'a> {
    outer: &'a dyn Namespace,
    hidden: HashSet<String>,
}

impl<'a> ScopedNamespace<'a> {
    pub fn new<I>(outer: &'a dyn Namespace, hidden: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        ScopedNamespace {
            outer,
            hidden: hidden.into_iter().collect(),
        }
    }

    pub fn hides(&self, name: &str) -> bool {
        self.hidden.contains(name)
    }
}

impl Namespace for ScopedNamespace<'_> {
    fn get(&self, name: &str) -> Option<&Value> {
        if self.hides(name) {
            None
        } else {
            self.outer.get(name)
        }
    }
}
