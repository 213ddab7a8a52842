// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::Utils::config::RenderConfig;
use crate::Utils::logger::{equations_to_markdown_table, init_logging, save_markup_to_file};
use crate::translator::namespace::Value;
use crate::translator::pipeline::Translator;
use crate::translator::registry::ExpressionRegistry;
use crate::translator::sink::StdoutSink;
use std::collections::HashMap;

fn session() -> HashMap<String, Value> {
    HashMap::from([
        ("x".to_string(), Value::Number(5.0)),
        ("G_k".to_string(), Value::quantity(12.0, "kN/m")),
        ("Q_k".to_string(), Value::quantity(5.0, "kN/m")),
        ("l".to_string(), Value::quantity(6.0, "m")),
        ("alpha".to_string(), Value::quantity(30.0, "deg")),
        ("f_yd".to_string(), Value::quantity(435.0, "MPa")),
        ("F".to_string(), Value::vector(&[3.0, 4.0])),
    ])
}

#[allow(dead_code)]
pub fn translator_examples(example: usize) {
    let namespace = session();
    match example {
        0 => {
            // one assignment, symbolic form and result
            let mut translator = Translator::new(RenderConfig::default(), &namespace);
            match translator.render("q = 2*x + 3") {
                Ok(markup) => println!("{}", markup),
                Err(e) => println!("{}", e),
            }
        }
        1 => {
            // a small load calculation in two columns, with substituted values
            let mut config = RenderConfig {
                columns: 2,
                precision: 1,
                ..RenderConfig::default()
            };
            config.toggles.show_substitution = true;
            let _ = init_logging("info", None);
            let code = "q_Ed = 1.35*G_k + 1.5*Q_k
M_Ed = q_Ed*l**2/8
V_Ed = q_Ed*l/2
h = l*np.sin(alpha)";
            let mut translator = Translator::new(config, &namespace);
            if let Err(e) = translator.render_to(&code, &mut StdoutSink) {
                println!("{}", e);
            }
        }
        2 => {
            // conditional assignment becomes a piecewise equation
            let code = "if x > 10:
    k = 1
elif x > 0:
    k = x/10
else:
    k = 0";
            let mut translator = Translator::new(RenderConfig::default(), &namespace);
            match translator.translate(code) {
                Ok(equations) => println!("{}", equations_to_markdown_table(&equations)),
                Err(e) => println!("{}", e),
            }
        }
        3 => {
            // functions: signature, body and scope
            let code = "def A_s(M, d, f=f_yd):
    z = 0.9*d
    return M/(z*f)";
            let mut translator = Translator::new(RenderConfig::default(), &namespace);
            match translator.render(code) {
                Ok(markup) => println!("{}", markup),
                Err(e) => println!("{}", e),
            }
        }
        4 => {
            // a registry keeps earlier definitions for later bare references
            let mut registry = ExpressionRegistry::new();
            let mut translator =
                Translator::new(RenderConfig::default(), &namespace).with_registry(&mut registry);
            for block in ["R = np.sqrt(np.dot(F, F))", "R"] {
                match translator.render(block) {
                    Ok(markup) => println!("{}", markup),
                    Err(e) => println!("{}", e),
                }
            }
        }
        5 => {
            // settings from a document, report written to a file
            let settings = "render
  precision: 3
  mul_symbol: dot
  style: Equation
logging
  loglevel: warn
";
            let config = match RenderConfig::from_document(settings) {
                Ok(config) => config,
                Err(e) => {
                    println!("{}", e);
                    return;
                }
            };
            let _ = init_logging(config.loglevel.as_deref().unwrap_or("off"), None);
            let mut translator = Translator::new(config, &namespace);
            let result = translator
                .render("sigma = f_yd/1.15")
                .and_then(|markup| save_markup_to_file(&markup, "report.md"));
            if let Err(e) = result {
                println!("{}", e);
            }
        }
        _ => {
            println!("no such example");
        }
    }
}
