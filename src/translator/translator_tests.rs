//___________________________________TESTS____________________________________
/*
end-to-end tests of the translate-and-render call:
the worked scenarios (assignment, conditional, aliases, conversions, batch layout)
properties every translation must keep
degradation and error reporting
function scope, registry, sources and sinks
*/

#[cfg(test)]
mod tests {
    use crate::Utils::config::RenderConfig;
    use crate::translator::errors::CalcError;
    use crate::translator::lexical_rewriter::{LexicalRewriter, rewrite};
    use crate::translator::namespace::Value;
    use crate::translator::numeric_resolver::{ResolvedValue, resolve};
    use crate::translator::pipeline::Translator;
    use crate::translator::registry::ExpressionRegistry;
    use crate::translator::sink::DisplaySink;
    use crate::translator::source::SourceFile;
    use crate::translator::statement_classifier::{StatementKind, classify};
    use crate::translator::symbolic_builder::SymbolicBuilder;
    use approx::assert_relative_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn ns(entries: &[(&str, Value)]) -> HashMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn known_number(resolved: &ResolvedValue) -> f64 {
        resolved
            .known()
            .and_then(|v| v.as_number())
            .unwrap_or_else(|| panic!("not a number: {:?}", resolved))
    }

    #[test]
    fn scenario_assignment_with_value() {
        let namespace = ns(&[("x", 5.0.into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate("q = 2*x + 3").unwrap();
        assert_eq!(equations.len(), 1);
        assert_eq!(known_number(&equations[0].resolved), 13.0);
        assert_eq!(equations[0].markup.to_string(), "q = 2 x + 3 = 13");
        assert_eq!(
            translator.render("q = 2*x + 3").unwrap(),
            "$$\\begin{aligned}q & = 2 x + 3 = 13\\end{aligned}$$"
        );
    }

    #[test]
    fn scenario_conditional_second_branch() {
        let code = "if x > 0:\n    a = x\nelif x < 0:\n    a = -x\nelse:\n    a = 0";
        let namespace = ns(&[("x", (-4.0).into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate(code).unwrap();
        assert_eq!(equations.len(), 1);
        assert_eq!(equations[0].equation.kind, StatementKind::Conditional);
        assert_eq!(known_number(&equations[0].resolved), 4.0);
        let markup = equations[0].markup.to_string();
        assert!(markup.starts_with("a = \\begin{cases}"));
        assert!(markup.ends_with("\\end{cases} = 4"));
    }

    #[test]
    fn scenario_numeric_alias() {
        assert_eq!(LexicalRewriter::default().rewrite("np.sqrt(x)"), "sqrt(x)");
    }

    #[test]
    fn scenario_conversion_is_stripped() {
        assert_eq!(LexicalRewriter::default().rewrite("f.to(kN)"), "f");
        let namespace = ns(&[("f", Value::quantity(12.0, "kN"))]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate("F = f.to(kN)").unwrap();
        assert_eq!(equations[0].markup.to_string(), "F = f = 12 \\ \\mathrm{kN}");
    }

    #[test]
    fn scenario_batch_of_four_in_three_columns() {
        let config = RenderConfig {
            columns: 3,
            ..RenderConfig::default()
        };
        let namespace = ns(&[("x", 2.0.into())]);
        let mut translator = Translator::new(config, &namespace);
        let markup = translator
            .render("a = x\nb = 2*x\nc = 3*x\nd = 4*x")
            .unwrap();
        assert!(markup.starts_with("$$\\begin{aligned}"));
        assert!(markup.ends_with("\\end{aligned}$$"));
        let body = markup
            .trim_start_matches("$$\\begin{aligned}")
            .trim_end_matches("\\end{aligned}$$");
        let rows: Vec<&str> = body.split(" \\\\ ").collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "a & = x = 2 \\quad & b & = 2 x = 4 \\quad & c & = 3 x = 6");
        assert!(rows[1].starts_with("d & = 4 x = 8"));
        // every row has the same alignment points
        assert_eq!(rows[0].matches('&').count(), rows[1].matches('&').count());
    }

    #[test]
    fn assignment_target_and_empty_namespace() {
        let builder = SymbolicBuilder::default();
        let empty: HashMap<String, Value> = HashMap::new();
        for (code, name) in [
            ("q = 2*x + 3", "q"),
            ("F_Ed = 1.35*G_k + 1.5*Q_k", "F_Ed"),
            ("sigma = F/A", "sigma"),
            ("M = np.dot(a, b)", "M"),
            ("n = 4", "n"),
        ] {
            let eqs = builder.build(&classify(code).unwrap()).unwrap();
            assert_eq!(eqs[0].target.to_string(), name);
            assert!(!resolve(&eqs[0], &empty).is_known(), "{}", code);
        }
    }

    #[test]
    fn first_declared_guard_wins() {
        let code = "if x > 0:\n    k = 1\nelif x > 2:\n    k = 2\nelse:\n    k = 3";
        let namespace = ns(&[("x", 5.0.into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate(code).unwrap();
        assert_eq!(known_number(&equations[0].resolved), 1.0);
    }

    #[test]
    fn no_satisfiable_guard_stays_unresolved() {
        let code = "if x > 10:\n    k = 1\nelif x < 0:\n    k = 2";
        let namespace = ns(&[("x", 5.0.into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate(code).unwrap();
        assert!(!equations[0].resolved.is_known());
        assert_eq!(equations[0].value_markup, None);
        assert!(!equations[0].markup.to_string().ends_with("= "));
    }

    #[test]
    fn rewriting_clean_expressions_is_a_no_op() {
        let config = RenderConfig::default().rewriter;
        for code in [
            "q_k*l**2/8 + sin(alpha)",
            "sqrt(F_Ed)/3",
            "Abs(x - y)",
            "2*x + 3",
        ] {
            let once = rewrite(code, &config);
            assert_eq!(rewrite(&once, &config), once);
        }
    }

    #[test]
    fn quantities_flow_through() {
        let namespace = ns(&[
            ("G_k", Value::quantity(10.0, "kN")),
            ("Q_k", Value::quantity(4.0, "kN")),
            ("A", Value::quantity(2.0, "m**2")),
        ]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator
            .translate("F_Ed = 1.35*G_k + 1.5*Q_k\nsigma = F_Ed/A")
            .unwrap();
        assert_eq!(
            equations[0].markup.to_string(),
            "F_{Ed} = 1.35 G_{k} + 1.5 Q_{k} = 19.5 \\ \\mathrm{kN}"
        );
        match equations[0].resolved.known() {
            Some(Value::Quantity(q)) => assert_eq!(q.unit, "kN"),
            other => panic!("not a quantity: {:?}", other),
        }
        // F_Ed is not bound, so sigma has nothing numeric to work with
        assert!(!equations[1].resolved.is_known());
    }

    #[test]
    fn substitution_segment_when_enabled() {
        let mut config = RenderConfig::default();
        config.toggles.show_substitution = true;
        let namespace = ns(&[("q", 12.5.into()), ("l", 6.0.into())]);
        let mut translator = Translator::new(config, &namespace);
        let equations = translator.translate("M = q*l**2/8").unwrap();
        assert_relative_eq!(known_number(&equations[0].resolved), 56.25, epsilon = 1e-12);
        assert_eq!(
            equations[0].markup.to_string(),
            "M = \\frac{q l^{2}}{8} = \\frac{12.5 \\cdot 6^{2}}{8} = 56.25"
        );
    }

    #[test]
    fn unparsable_expression_is_echoed() {
        let empty: HashMap<String, Value> = HashMap::new();
        let mut translator = Translator::new(RenderConfig::default(), &empty);
        let equations = translator.translate("s = \"text\" + @ x\nt = 2").unwrap();
        assert_eq!(equations.len(), 2);
        assert!(equations[0].equation.value.is_degraded());
        assert_eq!(equations[0].markup.to_string(), "s = \\text{\"text\" + @ x}");
    }

    #[test]
    fn degraded_text_does_not_swallow_following_equations() {
        let namespace = ns(&[("a", 7.0.into()), ("b", 3.0.into()), ("r", 1.0.into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let markup = translator.render("r = a % b\nc = 2*a").unwrap();
        assert_eq!(
            markup,
            "$$\\begin{aligned}r & = \\text{a \\% b} = 1 \\\\ c & = 2 a = 14\\end{aligned}$$"
        );
        // no unescaped comment sign left in the block
        assert!(!markup.replace("\\%", "").contains('%'));
    }

    #[test]
    fn unreadable_guard_keeps_other_branches() {
        let code = "if cls == 'C30':\n    f = 30\nelse:\n    f = 25\nc = 2*a";
        let namespace = ns(&[("a", 7.0.into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate(code).unwrap();
        assert_eq!(equations.len(), 2);
        assert!(!equations[0].equation.value.is_degraded());
        assert!(!equations[0].resolved.is_known());
        assert_eq!(
            equations[0].markup.to_string(),
            "f = \\begin{cases} 30 & \\text{for}\\: \\text{cls == 'C30'} \\\\25 & \\text{otherwise} \\end{cases}"
        );
        assert_eq!(equations[1].markup.to_string(), "c = 2 a = 14");

        let markup = translator.render(code).unwrap();
        assert!(!markup.contains('\n'));
        assert!(markup.ends_with("c & = 2 a = 14\\end{aligned}$$"));
    }

    #[test]
    fn unreadable_branch_value_is_kept_as_text() {
        let code = "if x > 0:\n    k = a % b\nelse:\n    k = 0";
        let namespace = ns(&[("x", (-1.0).into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate(code).unwrap();
        assert_eq!(known_number(&equations[0].resolved), 0.0);
        assert!(
            equations[0]
                .markup
                .to_string()
                .starts_with("k = \\begin{cases} \\text{a \\% b} & \\text{for}\\: x > 0")
        );
    }

    #[test]
    fn undecidable_guard_stops_before_later_true_guard() {
        let code = "if y > 0:\n    k = 1\nelif x > 0:\n    k = 2\nelse:\n    k = 3";
        let namespace = ns(&[("x", 3.0.into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate(code).unwrap();
        assert!(!equations[0].resolved.is_known());
        assert_eq!(equations[0].value_markup, None);

        // once y is bound the walk goes on to the elif branch
        let namespace = ns(&[("x", 3.0.into()), ("y", (-1.0).into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate(code).unwrap();
        assert_eq!(known_number(&equations[0].resolved), 2.0);
    }

    #[test]
    fn unclassifiable_block_names_the_block() {
        let empty: HashMap<String, Value> = HashMap::new();
        let mut translator = Translator::new(RenderConfig::default(), &empty);
        let err = translator
            .render("a = 1\nimport numpy as np")
            .unwrap_err();
        assert!(matches!(err, CalcError::Classification { .. }));
        assert_eq!(err.block(), Some("import numpy as np"));

        let err = translator
            .translate("if x > 0:\n    a = 1\nelse:\n    b = 2")
            .unwrap_err();
        assert!(err.block().is_some());
    }

    #[test]
    fn function_locals_do_not_see_outer_values() {
        let code = "def M_Ed(q, l=6):\n    q_d = 1.35*q\n    return q_d*l**2/8";
        let namespace = ns(&[("q", 100.0.into()), ("q_d", 1.0.into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let equations = translator.translate(code).unwrap();
        assert_eq!(equations.len(), 2);
        assert_eq!(equations[0].equation.kind, StatementKind::Function);
        assert!(equations[0].name_markup.starts_with("M_{Ed}{\\left(q, l=6"));
        assert!(!equations[0].resolved.is_known());
        assert_eq!(equations[1].equation.name(), "q_d");
        assert!(!equations[1].resolved.is_known());
    }

    #[test]
    fn registry_remembers_definitions() {
        let namespace = ns(&[("x", 5.0.into())]);
        let mut registry = ExpressionRegistry::new();
        {
            let mut translator =
                Translator::new(RenderConfig::default(), &namespace).with_registry(&mut registry);
            translator.translate("q = 2*x + 3").unwrap();
            let equations = translator.translate("q").unwrap();
            assert_eq!(equations[0].equation.kind, StatementKind::Name);
            assert_eq!(equations[0].markup.to_string(), "q = 2 x + 3 = 13");
        }
        assert_eq!(registry.len(), 1);
        assert!(registry.get("q").is_some());

        // a failed call commits nothing, a later name in the same call sees the earlier one
        {
            let mut translator =
                Translator::new(RenderConfig::default(), &namespace).with_registry(&mut registry);
            assert!(translator.translate("p = 3*x\nimport os").is_err());
            let equations = translator.translate("w = x + 1\nw").unwrap();
            assert_eq!(equations[1].markup.to_string(), "w = x + 1 = 6");
        }
        assert!(registry.get("p").is_none());
        assert_eq!(registry.names(), vec!["q", "w"]);

        // without a registry a bare name only shows its own value
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        assert_eq!(translator.translate("x").unwrap()[0].markup.to_string(), "x = 5");
    }

    #[test]
    fn render_list_and_render_to() {
        let namespace = ns(&[("x", 1.0.into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        let rendered = translator.render_list(&["a = x", "b = 2*x"]).unwrap();
        assert_eq!(
            rendered,
            vec![
                "$$\\begin{aligned}a & = x = 1\\end{aligned}$$",
                "$$\\begin{aligned}b & = 2 x = 2\\end{aligned}$$",
            ]
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "c = 3*x").unwrap();
        let mut sink: Vec<String> = Vec::new();
        translator
            .render_to(&SourceFile::new(file.path()), &mut sink)
            .unwrap();
        sink.display("done").unwrap();
        assert_eq!(
            sink,
            vec!["$$\\begin{aligned}c & = 3 x = 3\\end{aligned}$$", "done"]
        );
        translator.render_to(&"d = x", &mut sink).unwrap();
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn style_and_layout_from_settings() {
        let config = RenderConfig::from_document(
            "render\n  columns: 2\n  style: Formel\n  show_expression: false\n",
        )
        .unwrap();
        let namespace = ns(&[("x", 1.0.into())]);
        let mut translator = Translator::new(config, &namespace);
        assert_eq!(
            translator.render("a = x\nb = 2*x").unwrap(),
            "::: {custom-style=\"Formel\"}\n$$\\begin{aligned}a & = 1 \\quad & b & = 2\\end{aligned}$$\n:::"
        );
    }
}
