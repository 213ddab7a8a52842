//! examples of usage of RustedEngiCalc
/// Symbolic operations examples
pub mod symbolic_examples;
/// Translating calculation snippets into typeset equations
pub mod translator_examples;
