#![allow(non_snake_case)]
use RustedEngiCalc::Examples::symbolic_examples::sym_examples;
use RustedEngiCalc::Examples::translator_examples::translator_examples;

fn main() {
    let example = 1;
    match example {
        0 => {
            // expression parsing, substitution and typesetting
            sym_examples(0);
        }
        1 => {
            // load calculation rendered in two columns
            translator_examples(1);
        }
        2 => {
            // conditional assignment
            translator_examples(2);
        }
        3 => {
            // function definition
            translator_examples(3);
        }
        4 => {
            // registry
            translator_examples(4);
        }
        5 => {
            // settings document and report file
            translator_examples(5);
        }
        _ => {
            println!("example not found");
        }
    }
}
