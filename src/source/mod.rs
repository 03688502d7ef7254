//! `Sourcelike` rope and indented emit engine.
//!
//! Emission is append-only. Fragments accumulate into an indentation-aware buffer
//! and are only flattened into concrete strings at flush time, after every
//! [`crate::naming::Namer`] referenced by a `Name` fragment has been sealed.

use crate::error::{RenderError, Result};
use crate::naming::{NameId, Namer};

/// One fragment of source. Cheaply cloneable; the whole tree is built before any
/// `Name` fragment is resolved.
#[derive(Debug, Clone)]
pub enum Sourcelike {
    Literal(String),
    /// A lazily-resolved reference into a specific namer's assignment table.
    Name { namespace: String, id: NameId },
    Sequence(Vec<Sourcelike>),
}

impl Sourcelike {
    pub fn lit(s: impl Into<String>) -> Self {
        Sourcelike::Literal(s.into())
    }

    pub fn name(namespace: impl Into<String>, id: NameId) -> Self {
        Sourcelike::Name { namespace: namespace.into(), id }
    }

    pub fn seq(parts: impl IntoIterator<Item = Sourcelike>) -> Self {
        Sourcelike::Sequence(parts.into_iter().collect())
    }
}

impl From<&str> for Sourcelike {
    fn from(s: &str) -> Self {
        Sourcelike::Literal(s.to_string())
    }
}

impl From<String> for Sourcelike {
    fn from(s: String) -> Self {
        Sourcelike::Literal(s)
    }
}

/// Resolves `Name` fragments against a set of namers, by namespace.
pub trait NameResolver {
    fn resolve(&self, namespace: &str, id: NameId) -> Result<String>;
}

/// The common case: resolve against a fixed list of sealed namers.
pub struct NamerSet<'a> {
    namers: Vec<&'a Namer>,
}

impl<'a> NamerSet<'a> {
    pub fn new(namers: Vec<&'a Namer>) -> Self {
        Self { namers }
    }
}

impl<'a> NameResolver for NamerSet<'a> {
    fn resolve(&self, namespace: &str, id: NameId) -> Result<String> {
        let namer = self
            .namers
            .iter()
            .find(|n| n.namespace() == namespace)
            .ok_or_else(|| RenderError::UnassignedName {
                node: crate::ir::TypeId::new(0),
                namespace: namespace.to_string(),
            })?;
        namer.resolve(id).map(|s| s.to_string())
    }
}

/// Test-only escape hatch so other modules' unit tests can assert on a rendered
/// `Sourcelike` without round-tripping through an `Emitter`.
#[cfg(test)]
pub(crate) fn flatten_for_test(frag: &Sourcelike, resolver: &dyn NameResolver, out: &mut String) -> Result<()> {
    flatten(frag, resolver, out)
}

fn flatten(frag: &Sourcelike, resolver: &dyn NameResolver, out: &mut String) -> Result<()> {
    match frag {
        Sourcelike::Literal(s) => out.push_str(s),
        Sourcelike::Name { namespace, id } => out.push_str(&resolver.resolve(namespace, *id)?),
        Sourcelike::Sequence(parts) => {
            for part in parts {
                flatten(part, resolver, out)?;
            }
        }
    }
    Ok(())
}

/// Blank-line policy between consecutive named-type emissions (4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankLinePolicy {
    None,
    Leading,
    LeadingAndInterposing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushState {
    Empty,
    Content,
    Flushed { blank: bool },
}

/// Indentation-stack-based emit engine. One instance per render pass.
pub struct Emitter {
    indent_unit: String,
    indent_stack: Vec<String>,
    lines: Vec<Vec<Sourcelike>>,
    current_line: Vec<Sourcelike>,
    state: FlushState,
}

impl Emitter {
    pub fn new(indent_unit: impl Into<String>) -> Self {
        Self {
            indent_unit: indent_unit.into(),
            indent_stack: Vec::new(),
            lines: Vec::new(),
            current_line: Vec::new(),
            state: FlushState::Empty,
        }
    }

    fn current_indent(&self) -> String {
        self.indent_stack.concat()
    }

    fn flush_current_line(&mut self) {
        let indent = self.current_indent();
        let mut parts = vec![Sourcelike::lit(indent)];
        parts.append(&mut self.current_line);
        self.lines.push(parts);
        self.current_line = Vec::new();
    }

    /// Concatenate fragments, prefix with current indentation, push as one line.
    pub fn emit_line(&mut self, frags: impl IntoIterator<Item = Sourcelike>) {
        self.current_line.extend(frags);
        self.flush_current_line();
        self.state = FlushState::Content;
    }

    /// Emit a raw blank line unconditionally.
    pub fn emit_blank(&mut self) {
        self.lines.push(vec![Sourcelike::lit(String::new())]);
        self.state = FlushState::Flushed { blank: true };
    }

    /// Emit a blank line unless the last emitted line is already blank.
    pub fn ensure_blank_line(&mut self) {
        if let FlushState::Flushed { blank: true } = self.state {
            return;
        }
        self.emit_blank();
    }

    /// Push one indentation unit, run `f`, pop it back off.
    pub fn indent(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent_stack.push(self.indent_unit.clone());
        f(self);
        self.indent_stack.pop();
    }

    /// Emit `header`, an indented block produced by `f`, then `footer`.
    pub fn emit_block(
        &mut self,
        header: impl IntoIterator<Item = Sourcelike>,
        footer: impl IntoIterator<Item = Sourcelike>,
        f: impl FnOnce(&mut Self),
    ) {
        self.emit_line(header);
        self.indent(f);
        self.emit_line(footer);
    }

    /// Emit a line-comment block in the target's own comment style.
    pub fn emit_comment_lines(&mut self, lines: &[String], prefix: &str) {
        for line in lines {
            self.emit_line([Sourcelike::lit(format!("{prefix}{line}"))]);
        }
    }

    /// Emit `rows` as columns aligned to the widest (post-resolution) cell per
    /// column. Alignment can only be computed after every `Name` in every cell is
    /// resolved, so each row is fully flattened here rather than deferred further.
    pub fn emit_table(&mut self, rows: Vec<Vec<Sourcelike>>, resolver: &dyn NameResolver) -> Result<()> {
        let mut resolved_rows: Vec<Vec<String>> = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut resolved_row = Vec::with_capacity(row.len());
            for cell in row {
                let mut s = String::new();
                flatten(cell, resolver, &mut s)?;
                resolved_row.push(s);
            }
            resolved_rows.push(resolved_row);
        }

        let columns = resolved_rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &resolved_rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        for row in resolved_rows {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                let is_last = i == row.len() - 1;
                if is_last {
                    line.push_str(cell);
                } else {
                    line.push_str(&format!("{cell:<width$}", width = widths[i]));
                }
            }
            self.emit_line([Sourcelike::lit(line)]);
        }

        Ok(())
    }

    /// Flatten the whole buffer into concrete lines, resolving every `Name`
    /// fragment against `resolver`. Must only be called once every namer the
    /// resolver can see has been sealed.
    pub fn finish(self, resolver: &dyn NameResolver) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let mut s = String::new();
            for frag in line {
                flatten(frag, resolver, &mut s)?;
            }
            out.push(s);
        }
        Ok(out)
    }
}
