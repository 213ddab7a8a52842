//! Static table of unit names and their typeset labels.
//!
//! The table serves two purposes: the lexical rewriter replaces identifiers that are unit names
//! by opaque symbols carrying the label, and the formatter typesets the unit label of a
//! quantity (`kN/m^2` → `\mathrm{kN}/\mathrm{m}^{2}`).

/// unit label of quantities without a unit
pub const DIMENSIONLESS: &str = "dimensionless";

const DEFAULT_UNITS: [&str; 18] = [
    "kg", "t", "mm", "cm", "dm", "m", "km", "N", "kN", "MN", "Pa", "kPa", "MPa", "GPa", "rad", "s",
    "deg", "percent",
];

/// label of a unit name not needing a special glyph
pub fn default_label(name: &str) -> String {
    format!("\\mathrm{{{}}}", name)
}

fn special_label(name: &str) -> Option<&'static str> {
    match name {
        "deg" | "degree" | "°" => Some("^{\\circ}"),
        "percent" | "%" => Some("\\%"),
        "los" => Some("\\mathrm{-}"),
        _ => None,
    }
}

/// unit name -> typeset label, kept sorted longest name first
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTable {
    entries: Vec<(String, String)>,
}

impl Default for UnitTable {
    fn default() -> Self {
        let mut table = UnitTable::new();
        for name in DEFAULT_UNITS {
            table.insert_default(name);
        }
        table.insert("los", "\\mathrm{-}");
        table
    }
}

impl UnitTable {
    /// empty table
    pub fn new() -> Self {
        UnitTable {
            entries: Vec::new(),
        }
    }

    /// adds a unit with its standard label (`\mathrm{name}` or the special glyph)
    pub fn insert_default(&mut self, name: &str) {
        let label = special_label(name)
            .map(str::to_string)
            .unwrap_or_else(|| default_label(name));
        self.insert(name, &label);
    }

    /// inserts or replaces a unit
    pub fn insert(&mut self, name: &str, label: &str) {
        self.entries.retain(|(n, _)| n != name);
        self.entries.push((name.to_string(), label.to_string()));
        self.entries
            .sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, label)| label.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.label(name).is_some()
    }

    /// unit names, longest first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dimensionless(unit: &str) -> bool {
        let unit = unit.trim();
        unit.is_empty() || unit == DIMENSIONLESS || unit == "los"
    }

    pub fn is_degree(unit: &str) -> bool {
        matches!(unit.trim(), "deg" | "degree" | "°")
    }

    fn factor_markup(&self, factor: &str) -> String {
        let (name, exponent) = match factor.split_once("**").or_else(|| factor.split_once('^')) {
            Some((name, exp)) => (name.trim(), Some(exp.trim().trim_matches(|c: char| c == '(' || c == ')'))),
            None => (factor.trim(), None),
        };
        let label = self
            .label(name)
            .map(str::to_string)
            .or_else(|| special_label(name).map(str::to_string))
            .unwrap_or_else(|| default_label(name));
        match exponent {
            Some(exp) => format!("{}^{{{}}}", label, exp),
            None => label,
        }
    }

    /// typesets a unit label like `kN`, `kN*m`, `kN/m**2`; dimensionless gives an empty string
    pub fn unit_markup(&self, unit: &str) -> String {
        if Self::is_dimensionless(unit) {
            return String::new();
        }
        let mut out = String::new();
        let mut factor = String::new();
        let mut pending_op: Option<char> = None;
        let mut chars = unit.trim().chars().peekable();
        let flush = |factor: &mut String, op: Option<char>, out: &mut String| {
            if factor.trim().is_empty() {
                return;
            }
            match op {
                Some('*') => out.push_str(" \\cdot "),
                Some('/') => out.push('/'),
                _ => {}
            }
            out.push_str(&self.factor_markup(factor));
            factor.clear();
        };
        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    factor.push_str("**");
                }
                '*' | '/' | '·' => {
                    flush(&mut factor, pending_op, &mut out);
                    pending_op = Some(if c == '/' { '/' } else { '*' });
                }
                ' ' => {}
                _ => factor.push(c),
            }
        }
        flush(&mut factor, pending_op, &mut out);
        out
    }
}

/// unit label as a product of factors with exponents: `kN*m/s**2` -> kN^1 m^1 s^-2
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnitFactors {
    factors: Vec<(String, f64)>,
}

fn format_exponent(exp: f64) -> String {
    if exp.fract() == 0.0 {
        format!("{}", exp as i64)
    } else {
        format!("{}", exp)
    }
}

impl UnitFactors {
    /// parses a unit label; dimensionless labels give no factors
    pub fn parse(unit: &str) -> Self {
        let mut factors = UnitFactors::default();
        if UnitTable::is_dimensionless(unit) {
            return factors;
        }
        let mut sign = 1.0;
        let mut current = String::new();
        let mut chars = unit.trim().chars().peekable();
        let flush = |current: &mut String, sign: f64, factors: &mut UnitFactors| {
            let text = current.trim().trim_matches(|c: char| c == '(' || c == ')');
            if !text.is_empty() && text != "1" {
                let (name, exp) = match text.split_once("**").or_else(|| text.split_once('^')) {
                    Some((name, exp)) => (
                        name.trim(),
                        exp.trim()
                            .trim_matches(|c: char| c == '(' || c == ')')
                            .parse::<f64>()
                            .unwrap_or(1.0),
                    ),
                    None => (text, 1.0),
                };
                factors.push(name, sign * exp);
            }
            current.clear();
        };
        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    current.push_str("**");
                }
                '*' | '·' => {
                    flush(&mut current, sign, &mut factors);
                    sign = 1.0;
                }
                '/' => {
                    flush(&mut current, sign, &mut factors);
                    sign = -1.0;
                }
                _ => current.push(c),
            }
        }
        flush(&mut current, sign, &mut factors);
        factors
    }

    fn push(&mut self, name: &str, exp: f64) {
        match self.factors.iter_mut().find(|(n, _)| n == name) {
            Some((_, e)) => *e += exp,
            None => self.factors.push((name.to_string(), exp)),
        }
        self.factors.retain(|(_, e)| e.abs() > 1e-12);
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn mul(&self, other: &UnitFactors) -> UnitFactors {
        let mut result = self.clone();
        for (name, exp) in &other.factors {
            result.push(name, *exp);
        }
        result
    }

    pub fn div(&self, other: &UnitFactors) -> UnitFactors {
        self.mul(&other.powf(-1.0))
    }

    pub fn powf(&self, exponent: f64) -> UnitFactors {
        UnitFactors {
            factors: self
                .factors
                .iter()
                .map(|(name, exp)| (name.clone(), exp * exponent))
                .collect(),
        }
    }

    /// same factors regardless of order
    pub fn same_as(&self, other: &UnitFactors) -> bool {
        self.factors.len() == other.factors.len()
            && self.factors.iter().all(|(name, exp)| {
                other
                    .factors
                    .iter()
                    .any(|(n, e)| n == name && (e - exp).abs() < 1e-12)
            })
    }

    /// label in the `kN*m/s**2` form, `None` when dimensionless
    pub fn to_label(&self) -> Option<String> {
        if self.factors.is_empty() {
            return None;
        }
        let render = |name: &str, exp: f64| {
            if exp == 1.0 {
                name.to_string()
            } else {
                format!("{}**{}", name, format_exponent(exp))
            }
        };
        let numerator: Vec<String> = self
            .factors
            .iter()
            .filter(|(_, e)| *e > 0.0)
            .map(|(n, e)| render(n, *e))
            .collect();
        let denominator: Vec<String> = self
            .factors
            .iter()
            .filter(|(_, e)| *e < 0.0)
            .map(|(n, e)| render(n, -e))
            .collect();
        Some(match (numerator.is_empty(), denominator.is_empty()) {
            (false, true) => numerator.join("*"),
            (false, false) => format!("{}/{}", numerator.join("*"), denominator.join("/")),
            _ => self
                .factors
                .iter()
                .map(|(n, e)| render(n, *e))
                .collect::<Vec<_>>()
                .join("*"),
        })
    }
}
