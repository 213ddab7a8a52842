//! # Pipeline
//!
//! The translate-and-render call: source text is split into statements, each statement is
//! classified, built into symbolic equations, resolved against the namespace and typeset.
//! A block that cannot be classified or built aborts the whole call with an error naming the
//! block; expressions that cannot be parsed and values that cannot be resolved only degrade
//! the output. Registry updates of a call are staged and committed only when the whole call
//! succeeds, so a failed call leaves the registry as it was.
use crate::Utils::config::RenderConfig;
use crate::translator::errors::Result;
use crate::translator::namespace::Namespace;
use crate::translator::numeric_resolver::{NumericResolver, ResolvedValue};
use crate::translator::registry::{ExpressionRegistry, RegistryEntry};
use crate::translator::sink::DisplaySink;
use crate::translator::source::SourceProvider;
use crate::translator::statement_classifier::{StatementKind, classify, split_statements};
use crate::translator::symbolic_builder::{SymbolicBuilder, SymbolicEquation};
use crate::translator::typeset_formatter::{EquationMarkup, TypesetFormatter};
use log::{debug, info};

/// one equation through all stages
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedEquation {
    pub equation: SymbolicEquation,
    pub resolved: ResolvedValue,
    pub markup: EquationMarkup,
    pub name_markup: String,
    pub expression_markup: String,
    /// `None` when the value is unresolved
    pub value_markup: Option<String>,
}

pub struct Translator<'a> {
    config: RenderConfig,
    namespace: &'a dyn Namespace,
    builder: SymbolicBuilder,
    formatter: TypesetFormatter,
    registry: Option<&'a mut ExpressionRegistry>,
}

impl<'a> Translator<'a> {
    pub fn new(config: RenderConfig, namespace: &'a dyn Namespace) -> Self {
        Translator {
            builder: config.builder(),
            formatter: config.formatter(),
            config,
            namespace,
            registry: None,
        }
    }

    /// remembers every assignment, a later bare name shows what it was defined as
    pub fn with_registry(mut self, registry: &'a mut ExpressionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn translate(&mut self, code: &str) -> Result<Vec<TranslatedEquation>> {
        let mut equations = Vec::new();
        let mut staged: Vec<(String, RegistryEntry)> = Vec::new();
        for block in split_statements(code) {
            let stmt = classify(&block)?;
            debug!("{} statement: {}", stmt.kind, block.trim());
            for eq in self.builder.build(&stmt)? {
                equations.push(self.translate_equation(eq, &mut staged));
            }
        }
        if let Some(registry) = self.registry.as_deref_mut() {
            for (name, entry) in staged {
                registry.remember(&name, entry.value, entry.resolved);
            }
        }
        info!(
            "translated {} equations, {} resolved",
            equations.len(),
            equations.iter().filter(|e| e.resolved.is_known()).count()
        );
        Ok(equations)
    }

    fn translate_equation(
        &self,
        mut eq: SymbolicEquation,
        staged: &mut Vec<(String, RegistryEntry)>,
    ) -> TranslatedEquation {
        let units = &self.config.rewriter.units;
        let resolver = NumericResolver::new(self.namespace, units);
        let remembered = match (&self.registry, eq.kind) {
            (Some(registry), StatementKind::Name) => staged
                .iter()
                .rev()
                .find(|(name, _)| name == eq.name())
                .map(|(_, entry)| entry)
                .or_else(|| registry.get(eq.name()))
                .cloned(),
            _ => None,
        };
        if let Some(entry) = &remembered {
            eq.value = entry.value.clone();
        }
        let mut resolved = resolver.resolve(&eq);
        if let (ResolvedValue::Unresolved(_), Some(entry)) = (&resolved, &remembered) {
            resolved = entry.resolved.clone();
        }

        let toggles = self.config.toggles;
        let substituted = if toggles.show_substitution {
            resolver.substituted(&eq)
        } else {
            None
        };
        let markup = match substituted {
            Some(substituted) => self
                .formatter
                .format_equation_substituted(&eq, &resolved, &substituted, toggles),
            None => self.formatter.format_equation(&eq, &resolved, toggles),
        };
        let remember = matches!(eq.kind, StatementKind::Assignment | StatementKind::Conditional)
            && eq.scope.is_global();
        if remember && self.registry.is_some() {
            staged.push((
                eq.name().to_string(),
                RegistryEntry {
                    value: eq.value.clone(),
                    resolved: resolved.clone(),
                },
            ));
        }

        TranslatedEquation {
            name_markup: self.formatter.format_target(&eq),
            expression_markup: self.formatter.format_symbolic(&eq.value),
            value_markup: resolved.known().map(|v| self.formatter.format_value(v)),
            equation: eq,
            resolved,
            markup,
        }
    }

    /// the equations of `code` in one aligned block
    pub fn render(&mut self, code: &str) -> Result<String> {
        let equations = self.translate(code)?;
        let markups: Vec<EquationMarkup> = equations.into_iter().map(|e| e.markup).collect();
        Ok(self.formatter.format_batch(&markups, self.config.columns))
    }

    pub fn render_to(
        &mut self,
        source: &dyn SourceProvider,
        sink: &mut dyn DisplaySink,
    ) -> Result<()> {
        let code = source.current_block()?;
        let markup = self.render(&code)?;
        sink.display(&markup)
    }

    /// every block rendered on its own
    pub fn render_list(&mut self, blocks: &[&str]) -> Result<Vec<String>> {
        blocks.iter().map(|block| self.render(block)).collect()
    }
}
