//! Where the text of the block being translated comes from.

use crate::translator::errors::Result;
use std::fs;
use std::path::PathBuf;

/// supplies the exact source text of the current block
pub trait SourceProvider {
    fn current_block(&self) -> Result<String>;
}

impl SourceProvider for &str {
    fn current_block(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl SourceProvider for String {
    fn current_block(&self) -> Result<String> {
        Ok(self.clone())
    }
}

/// a calculation script on disk, read whole on every call
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceFile { path: path.into() }
    }
}

impl SourceProvider for SourceFile {
    fn current_block(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }
}
