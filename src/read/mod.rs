//! Source Reader
//!
//! Per-file extraction of namespace declarations (provide/module headers),
//! dependency declarations (require/forward-declare, plus implicit ones
//! inferred from documentation type annotations) and module export lists.
//! Results are collected into the run-owned [`graph::DependencyGraph`].

pub mod graph;
pub mod reader;

pub use graph::DependencyGraph;
pub use reader::ReaderPass;

/// How a file declares a namespace it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvideKind {
    /// `<root>.provide('a.b.C');` — members attached to the global namespace
    Provide,
    /// `<root>.module('a.b.C');` — module-scoped with an explicit export list
    Module,
}

/// An exported name with its file-internal binding. `external == internal`
/// when no aliasing is needed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExportEntry {
    // Ordered by internal name for deterministic export lists, so the
    // internal name is the first field.
    pub internal: String,
    pub external: String,
}

impl ExportEntry {
    pub fn new(name: &str) -> Self {
        Self {
            internal: name.trim().to_string(),
            external: name.trim().to_string(),
        }
    }

    pub fn aliased(external: &str, internal: &str) -> Self {
        Self {
            internal: internal.trim().to_string(),
            external: external.trim().to_string(),
        }
    }

    /// Fragment for an `export {...}` clause: `name` or `internal as external`.
    pub fn to_export_fragment(&self) -> String {
        if self.external == self.internal {
            self.internal.clone()
        } else {
            format!("{} as {}", self.internal, self.external)
        }
    }
}

/// One entry of a module-style file's export surface.
#[derive(Debug, Clone)]
pub struct ModuleExport {
    pub entity: ExportEntry,
    /// `exports.name = …` (inline) as opposed to a trailing `exports = {…}`
    /// list. The two convert to different ES6 shapes.
    pub inline: bool,
    /// Exact source span of the exports statement, used to replace it.
    pub matched_text: String,
}

/// A provide/module header declaration.
#[derive(Debug, Clone)]
pub struct ProvideDecl {
    pub namespace: String,
    pub kind: ProvideKind,
    pub exports: Vec<ModuleExport>,
    /// Exact matched source span. `None` means the namespace is already in
    /// target syntax and the rewriter must leave the file alone.
    pub matched_text: Option<String>,
}

impl ProvideDecl {
    pub fn is_module(&self) -> bool {
        self.kind == ProvideKind::Module
    }
}

/// The ways a dependency can be declared, with the data each shape carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequireKind {
    /// A written `require`/`requireType`/`forwardDeclare` statement.
    Explicit {
        /// `const alias = <root>.require(...)`
        alias: Option<String>,
        /// `const {member} = <root>.require(...)` — at most one entry;
        /// multi-member destructuring is rejected by the reader.
        members: Vec<ExportEntry>,
        /// forward-declare / type-only shapes
        forward: bool,
    },
    /// Synthesized by the pipeline; must resolve to a provider.
    ImplicitStrict { alias: Option<String> },
    /// Inferred from documentation type text; advisory only, silently
    /// dropped when no provider exists.
    ImplicitLenient,
}

/// A dependency declaration of one file on one namespace.
#[derive(Debug, Clone)]
pub struct RequireDecl {
    pub namespace: String,
    pub kind: RequireKind,
    /// Exact matched source span; absent for synthesized requires.
    pub matched_text: Option<String>,
}

impl RequireDecl {
    pub fn explicit(
        namespace: &str,
        alias: Option<String>,
        members: Vec<ExportEntry>,
        forward: bool,
        matched_text: &str,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: RequireKind::Explicit {
                alias,
                members,
                forward,
            },
            matched_text: Some(matched_text.to_string()),
        }
    }

    pub fn implicit_strict(namespace: &str, alias: Option<String>) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: RequireKind::ImplicitStrict { alias },
            matched_text: None,
        }
    }

    pub fn implicit_lenient(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: RequireKind::ImplicitLenient,
            matched_text: None,
        }
    }

    pub fn is_lenient(&self) -> bool {
        matches!(self.kind, RequireKind::ImplicitLenient)
    }

    /// The local alias fixed by the declaration itself, if any.
    pub fn alias(&self) -> Option<&str> {
        match &self.kind {
            RequireKind::Explicit { alias, .. } => alias.as_deref(),
            RequireKind::ImplicitStrict { alias } => alias.as_deref(),
            RequireKind::ImplicitLenient => None,
        }
    }

    /// Destructured members requested by the declaration.
    pub fn members(&self) -> &[ExportEntry] {
        match &self.kind {
            RequireKind::Explicit { members, .. } => members,
            _ => &[],
        }
    }
}
