//! Receivers of rendered markup.

use crate::translator::errors::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// takes one piece of typeset markup per render call
pub trait DisplaySink {
    fn display(&mut self, markup: &str) -> Result<()>;
}

/// prints markup to standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl DisplaySink for StdoutSink {
    fn display(&mut self, markup: &str) -> Result<()> {
        println!("{}", markup);
        Ok(())
    }
}

impl DisplaySink for Vec<String> {
    fn display(&mut self, markup: &str) -> Result<()> {
        self.push(markup.to_string());
        Ok(())
    }
}

/// appends each markup as its own paragraph to a markdown file
#[derive(Debug, Clone)]
pub struct MarkdownFileSink {
    pub path: PathBuf,
}

impl MarkdownFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MarkdownFileSink { path: path.into() }
    }
}

impl DisplaySink for MarkdownFileSink {
    fn display(&mut self, markup: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}\n", markup)?;
        Ok(())
    }
}
