//! Diagnostic collection.
//!
//! Passes never stop at the first error. They push into a [`Diagnostics`]
//! and keep going; the driver checks [`Diagnostics::has_errors`] between
//! phases.

use std::fmt;

use tracing::debug;

use crate::{CompilationError, CompilationWarning};

/// A diagnostic tagged with the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    /// Source file, if known.
    pub file: Option<String>,
    pub item: T,
}

impl<T: fmt::Display> fmt::Display for Located<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{file}: {}", self.item),
            None => write!(f, "{}", self.item),
        }
    }
}

/// Errors and warnings reported during a compilation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    current_file: Option<String>,
    errors: Vec<Located<CompilationError>>,
    warnings: Vec<Located<CompilationWarning>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute subsequent diagnostics to a file. `None` clears it.
    pub fn set_file(&mut self, file: Option<String>) {
        self.current_file = file;
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    pub fn add_error(&mut self, error: CompilationError) {
        debug!(%error, "reported error");
        self.errors.push(Located {
            file: self.current_file.clone(),
            item: error,
        });
    }

    pub fn add_warning(&mut self, warning: CompilationWarning) {
        debug!(%warning, "reported warning");
        self.warnings.push(Located {
            file: self.current_file.clone(),
            item: warning,
        });
    }

    // === Query Methods ===

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn errors(&self) -> impl Iterator<Item = &CompilationError> {
        self.errors.iter().map(|e| &e.item)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CompilationWarning> {
        self.warnings.iter().map(|w| &w.item)
    }

    /// Errors with their file attribution.
    pub fn located_errors(&self) -> &[Located<CompilationError>] {
        &self.errors
    }

    /// Number of errors matching a predicate.
    pub fn count_errors(&self, pred: impl Fn(&CompilationError) -> bool) -> usize {
        self.errors().filter(|e| pred(e)).count()
    }

    /// Drain all errors, leaving warnings in place.
    pub fn take_errors(&mut self) -> Vec<CompilationError> {
        std::mem::take(&mut self.errors)
            .into_iter()
            .map(|e| e.item)
            .collect()
    }
}
