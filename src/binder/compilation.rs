use crate::error::Result;
use crate::models::TypeRef;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A field declared on a compiled type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledField {
    pub name: String,
    /// Declared type as written, simple or qualified
    pub type_name: String,
}

impl CompiledField {
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }

    /// Whether a value of `type_ref` can be stored in this field
    pub fn accepts(&self, type_ref: &TypeRef) -> bool {
        if self.type_name.contains('.') {
            self.type_name == type_ref.qualified()
        } else {
            self.type_name == type_ref.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledType {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub fields: Vec<CompiledField>,
}

impl CompiledType {
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &str, type_name: &str) -> Self {
        self.fields.push(CompiledField::new(name, type_name));
        self
    }

    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn merge(&mut self, other: CompiledType) {
        for field in other.fields {
            if self.field(&field.name).is_none() {
                self.fields.push(field);
            }
        }
    }
}

/// `namespace` is one of `namespaces` or nested below one
pub fn within_namespaces(namespace: &str, namespaces: &[String]) -> bool {
    namespaces.iter().any(|ns| {
        namespace == ns
            || namespace
                .strip_prefix(ns.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// The environment that turns generated sources into loadable types.
///
/// Types inside `excluded` namespaces, or nested below one, are never candidates.
pub trait CompilationHost {
    /// Pick up whatever has been compiled since the last call
    fn refresh(&mut self) -> Result<()>;

    /// `name` may be simple or namespace-qualified
    fn is_type_available(&self, name: &str, excluded: &[String]) -> bool;

    /// Look up `namespace.name` first, then `name` alone. Both lookups ignore case.
    fn find_type(&self, name: &str, namespace: &str, excluded: &[String]) -> Option<CompiledType>;
}

fn candidates<'a>(
    types: &'a [CompiledType],
    excluded: &'a [String],
) -> impl Iterator<Item = &'a CompiledType> + Clone {
    types
        .iter()
        .filter(move |t| !within_namespaces(&t.type_ref.namespace, excluded))
}

fn lookup<'a>(
    types: &'a [CompiledType],
    name: &str,
    namespace: &str,
    excluded: &'a [String],
) -> Option<&'a CompiledType> {
    let qualified = TypeRef::new(namespace, name).qualified();
    let mut pool = candidates(types, excluded);
    pool.clone()
        .find(|t| t.type_ref.qualified().eq_ignore_ascii_case(&qualified))
        .or_else(|| pool.find(|t| t.type_ref.name.eq_ignore_ascii_case(name)))
}

fn is_available(types: &[CompiledType], name: &str, excluded: &[String]) -> bool {
    candidates(types, excluded).any(|t| t.type_ref.matches_name(name))
}

/// Host backed by a list of type definitions. Staged types become visible on the next
/// [`CompilationHost::refresh`], mimicking an asynchronous compile.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCompilation {
    available: Vec<CompiledType>,
    staged: Vec<CompiledType>,
    refreshes: usize,
}

impl InMemoryCompilation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, compiled: CompiledType) -> Self {
        self.define(compiled);
        self
    }

    /// Make a type available immediately, replacing any previous definition
    pub fn define(&mut self, compiled: CompiledType) {
        self.available.retain(|t| t.type_ref != compiled.type_ref);
        self.available.push(compiled);
    }

    /// Make a type available after the next refresh
    pub fn stage(&mut self, compiled: CompiledType) {
        self.staged.push(compiled);
    }

    /// Drop a field from an available type, as a recompile without it would
    pub fn remove_field(&mut self, type_name: &str, field: &str) -> bool {
        match self
            .available
            .iter_mut()
            .find(|t| t.type_ref.matches_name(type_name))
        {
            Some(compiled) => {
                let before = compiled.fields.len();
                compiled.fields.retain(|f| f.name != field);
                compiled.fields.len() != before
            }
            None => false,
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }
}

impl CompilationHost for InMemoryCompilation {
    fn refresh(&mut self) -> Result<()> {
        self.refreshes += 1;
        for compiled in std::mem::take(&mut self.staged) {
            self.define(compiled);
        }
        Ok(())
    }

    fn is_type_available(&self, name: &str, excluded: &[String]) -> bool {
        is_available(&self.available, name, excluded)
    }

    fn find_type(&self, name: &str, namespace: &str, excluded: &[String]) -> Option<CompiledType> {
        lookup(&self.available, name, namespace, excluded).cloned()
    }
}

struct SourcePatterns {
    namespace: Regex,
    class: Regex,
    field: Regex,
}

impl SourcePatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            namespace: Regex::new(r"(?m)^\s*namespace\s+([A-Za-z_][\w.]*)")?,
            class: Regex::new(r"(?m)^\s*(?:(?:public|internal|sealed|abstract|partial)\s+)*class\s+([A-Za-z_]\w*)")?,
            field: Regex::new(
                r"(?m)^\s*(?:\[SerializeField\]\s*(?:(?:private|protected|internal|public)\s+)?|public\s+)([A-Za-z_][\w.]*)\s+(@?[A-Za-z_]\w*)\s*;",
            )?,
        })
    }
}

/// Treats generated sources on disk as compiled: every class declaration and its
/// serialized fields become a [`CompiledType`]. Partial declarations spread over several
/// files are merged.
pub struct SourceScanner {
    root: PathBuf,
    extension: String,
    patterns: SourcePatterns,
    types: Vec<CompiledType>,
}

impl SourceScanner {
    pub fn new<P: AsRef<Path>>(root: P, extension: &str) -> Result<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
            patterns: SourcePatterns::new()?,
            types: Vec::new(),
        })
    }

    pub fn types(&self) -> &[CompiledType] {
        &self.types
    }

    /// Extract the types declared in one source text
    pub fn scan_source(&self, source: &str) -> Vec<CompiledType> {
        let namespace = self
            .patterns
            .namespace
            .captures(source)
            .map(|c| c[1].to_string())
            .unwrap_or_default();

        let classes: Vec<(usize, String)> = self
            .patterns
            .class
            .captures_iter(source)
            .filter_map(|c| c.get(1).map(|m| (m.start(), m.as_str().to_string())))
            .collect();

        let mut types: Vec<CompiledType> = classes
            .iter()
            .map(|(_, name)| CompiledType::new(TypeRef::new(&namespace, name)))
            .collect();

        for captures in self.patterns.field.captures_iter(source) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            // a field belongs to the closest class declared before it
            let owner = classes.iter().rposition(|(start, _)| *start < whole.start());
            if let Some(owner) = owner {
                let name = captures[2].trim_start_matches('@');
                types[owner]
                    .fields
                    .push(CompiledField::new(name, &captures[1]));
            }
        }
        types
    }

    fn add(&mut self, compiled: CompiledType) {
        match self
            .types
            .iter_mut()
            .find(|t| t.type_ref == compiled.type_ref)
        {
            Some(existing) => existing.merge(compiled),
            None => self.types.push(compiled),
        }
    }
}

impl CompilationHost for SourceScanner {
    fn refresh(&mut self) -> Result<()> {
        self.types.clear();
        if !self.root.exists() {
            return Ok(());
        }

        let mut sources = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == self.extension.as_str())
            {
                sources.push(fs::read_to_string(path)?);
            }
        }

        for source in sources {
            for compiled in self.scan_source(&source) {
                self.add(compiled);
            }
        }
        Ok(())
    }

    fn is_type_available(&self, name: &str, excluded: &[String]) -> bool {
        is_available(&self.types, name, excluded)
    }

    fn find_type(&self, name: &str, namespace: &str, excluded: &[String]) -> Option<CompiledType> {
        lookup(&self.types, name, namespace, excluded).cloned()
    }
}
