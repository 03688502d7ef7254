//! Non-fatal diagnostics collected during a render pass.
//!
//! Distinct from [`crate::error::RenderError`]: everything here is survivable, the
//! render still produces a complete line stream, and the driver decides whether to
//! treat warnings as failures (`RenderConfig::diagnostics::fail_on_warnings`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ir::TypeId;

/// Severity of a single diagnostic item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic raised while rendering a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub node: TypeId,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({:?})", self.severity, self.message, self.node)
    }
}

/// Collection of diagnostics accumulated over a render pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, node: TypeId, message: impl Into<String>) {
        self.items.push(Diagnostic {
            node,
            severity: Severity::Info,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, node: TypeId, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(node = ?node, "{message}");
        self.items.push(Diagnostic {
            node,
            severity: Severity::Warning,
            message,
        });
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.items
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TypeId;

    #[test]
    fn collects_and_filters_by_severity() {
        let mut diags = Diagnostics::new();
        diags.info(TypeId::new(0), "note");
        diags.warning(TypeId::new(1), "any-typed property");

        assert_eq!(diags.len(), 2);
        assert_eq!(diags.warnings().count(), 1);
        assert!(diags.has_warnings());
    }

    #[test]
    fn merge_concatenates_items() {
        let mut a = Diagnostics::new();
        a.info(TypeId::new(0), "a");
        let mut b = Diagnostics::new();
        b.info(TypeId::new(1), "b");
        a.merge(b);
        assert_eq!(a.len(), 2);
    }
}
