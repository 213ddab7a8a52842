//! Render settings and their loading from a settings document (see `task_parser`).
//!
//! ```text
//! render
//!   precision: 3
//!   columns: 2
//!   show_substitution: true
//!   mul_symbol: dot
//! rewriter
//!   numeric_aliases: np, numpy
//!   unit_aliases: ureg
//! units
//!   kNm: kNm
//! logging
//!   loglevel: warn
//! ```
//! Keys the document does not mention keep their defaults, unknown keys are ignored.

use crate::Utils::task_parser::{DocValue, DocumentMap, parse_document_as, template_of};
use crate::symbolic::symbolic_latex::MulSymbol;
use crate::translator::errors::{CalcError, Result};
use crate::translator::lexical_rewriter::{LexicalRewriter, RewriterConfig};
use crate::translator::symbolic_builder::SymbolicBuilder;
use crate::translator::typeset_formatter::{DisplayToggles, TypesetFormatter};
use log::debug;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const RENDER_KEYS: [&str; 10] = [
    "precision",
    "columns",
    "show_name",
    "show_expression",
    "show_substitution",
    "show_value",
    "mul_symbol",
    "evaluate",
    "deduplicate",
    "style",
];
const REWRITER_KEYS: [&str; 2] = ["numeric_aliases", "unit_aliases"];
const LOGGING_KEYS: [&str; 2] = ["loglevel", "log_file"];

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// decimals of numeric results
    pub precision: usize,
    pub toggles: DisplayToggles,
    /// equations per row of an aligned block
    pub columns: usize,
    pub mul_symbol: MulSymbol,
    /// fold constant subexpressions of built equations
    pub evaluate: bool,
    pub deduplicate: bool,
    /// pandoc custom style wrapped around rendered blocks
    pub style: Option<String>,
    /// `None` leaves logging alone
    pub loglevel: Option<String>,
    pub log_file: Option<String>,
    pub rewriter: RewriterConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            precision: 2,
            toggles: DisplayToggles::default(),
            columns: 1,
            mul_symbol: MulSymbol::Space,
            evaluate: false,
            deduplicate: true,
            style: None,
            loglevel: Some("info".to_string()),
            log_file: None,
            rewriter: RewriterConfig::default(),
        }
    }
}

fn config_error(section: &str, key: &str, expected: &str, values: &[DocValue]) -> CalcError {
    let found: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    CalcError::Config(format!(
        "{}.{}: expected {}, found `{}`",
        section,
        key,
        expected,
        found.join(", ")
    ))
}

/// the values of `section.key`, `None` when the key is absent
fn values<'a>(doc: &'a DocumentMap, section: &str, key: &str) -> Option<&'a Vec<DocValue>> {
    doc.get(section)?.get(key)?.as_ref()
}

fn single<'a>(doc: &'a DocumentMap, section: &str, key: &str) -> Option<&'a [DocValue]> {
    values(doc, section, key).map(|v| v.as_slice())
}

fn usize_value(doc: &DocumentMap, section: &str, key: &str) -> Result<Option<usize>> {
    match single(doc, section, key) {
        None => Ok(None),
        Some([DocValue::Integer(i)]) if *i >= 0 => Ok(Some(*i as usize)),
        Some(other) => Err(config_error(section, key, "a non-negative integer", other)),
    }
}

fn bool_value(doc: &DocumentMap, section: &str, key: &str) -> Result<Option<bool>> {
    match single(doc, section, key) {
        None => Ok(None),
        Some([DocValue::Boolean(b)]) => Ok(Some(*b)),
        Some(other) => Err(config_error(section, key, "true or false", other)),
    }
}

fn string_value(doc: &DocumentMap, section: &str, key: &str) -> Result<Option<String>> {
    match single(doc, section, key) {
        None => Ok(None),
        Some([value]) => Ok(Some(value.to_string())),
        Some(other) => Err(config_error(section, key, "a single value", other)),
    }
}

fn string_list(doc: &DocumentMap, section: &str, key: &str) -> Option<Vec<String>> {
    values(doc, section, key).map(|v| v.iter().map(|x| x.to_string()).collect())
}

impl RenderConfig {
    pub fn from_document(input: &str) -> Result<Self> {
        let template = template_of(&[
            ("render", &RENDER_KEYS[..]),
            ("rewriter", &REWRITER_KEYS[..]),
            ("logging", &LOGGING_KEYS[..]),
        ]);
        let doc = parse_document_as(input, Some(&template)).map_err(CalcError::Config)?;
        let mut config = RenderConfig::default();

        if let Some(p) = usize_value(&doc, "render", "precision")? {
            config.precision = p;
        }
        if let Some(c) = usize_value(&doc, "render", "columns")? {
            config.columns = c;
        }
        let toggles = &mut config.toggles;
        for (key, flag) in [
            ("show_name", &mut toggles.show_name),
            ("show_expression", &mut toggles.show_expression),
            ("show_substitution", &mut toggles.show_substitution),
            ("show_value", &mut toggles.show_value),
        ] {
            if let Some(b) = bool_value(&doc, "render", key)? {
                *flag = b;
            }
        }
        if let Some(symbol) = string_value(&doc, "render", "mul_symbol")? {
            config.mul_symbol = MulSymbol::from_str(&symbol).map_err(|_| {
                CalcError::Config(format!(
                    "render.mul_symbol: expected space, dot or times, found `{}`",
                    symbol
                ))
            })?;
        }
        if let Some(b) = bool_value(&doc, "render", "evaluate")? {
            config.evaluate = b;
        }
        if let Some(b) = bool_value(&doc, "render", "deduplicate")? {
            config.deduplicate = b;
        }
        if let Some(style) = string_value(&doc, "render", "style")? {
            config.style = Some(style);
        }

        if let Some(aliases) = string_list(&doc, "rewriter", "numeric_aliases") {
            config.rewriter.numeric_aliases = aliases;
        }
        if let Some(aliases) = string_list(&doc, "rewriter", "unit_aliases") {
            config.rewriter.unit_aliases = aliases;
        }
        if let Some(units) = doc.get("units") {
            for (name, label) in units {
                match label.as_deref() {
                    Some([DocValue::String(label)]) if label != name => {
                        config.rewriter.units.insert(name, label)
                    }
                    Some([]) | Some([DocValue::String(_)]) | None => {
                        config.rewriter.units.insert_default(name)
                    }
                    Some(other) => return Err(config_error("units", name, "a label", other)),
                }
            }
        }

        if let Some(level) = string_value(&doc, "logging", "loglevel")? {
            config.loglevel = Some(level);
        }
        if let Some(file) = string_value(&doc, "logging", "log_file")? {
            config.log_file = Some(file);
        }
        debug!("render config loaded: {:?}", config);
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_document(&content)
    }

    pub fn builder(&self) -> SymbolicBuilder {
        SymbolicBuilder::new(LexicalRewriter::new(self.rewriter.clone()), self.evaluate)
    }

    pub fn formatter(&self) -> TypesetFormatter {
        TypesetFormatter::new(self.precision, self.mul_symbol, self.rewriter.units.clone())
            .with_deduplicate(self.deduplicate)
            .with_style(self.style.clone())
    }
}

//___________________________________TESTS____________________________________
