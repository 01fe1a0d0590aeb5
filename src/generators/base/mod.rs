pub mod file_writer;
pub mod regions;
pub mod template_context;
pub mod templates;

use crate::error::{Error, Result};
use crate::generators::request::{GeneratedFiles, GenerationRequest};
use crate::interface::config::GenerationConfig;
use file_writer::FileWriter;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// A file a generator wants written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub content: String,
}

/// Output of [`BaseBindingsGenerator::plan`]: what to write and what to report
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub files: Vec<PlannedFile>,
    pub result: GeneratedFiles,
}

/// Common trait for all generators
pub trait BaseBindingsGenerator {
    fn name(&self) -> &'static str;

    /// Render the files for one container. May read existing output it has to preserve,
    /// never writes.
    fn plan(&self, request: &GenerationRequest, config: &GenerationConfig)
        -> Result<GenerationPlan>;

    /// Validate, render and write one container's files. Nothing is written unless every
    /// file can be.
    fn generate(
        &self,
        request: &GenerationRequest,
        config: &GenerationConfig,
    ) -> Result<GeneratedFiles> {
        validate_request(request, config)?;
        let plan = self.plan(request, config)?;

        let mut writer = FileWriter::new();
        for file in &plan.files {
            writer.stage(&file.path, &file.content)?;
        }
        writer.commit()?;
        Ok(plan.result)
    }
}

/// Read a previously generated file, `None` when it does not exist
pub fn read_existing(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::GenerationIo {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn is_valid_identifier(name: &str) -> bool {
    let (verbatim, bare) = match name.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, name),
    };
    let mut chars = bare.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic());
    starts_ok
        && chars.all(|c| c == '_' || c.is_alphanumeric())
        && (verbatim || !CSHARP_KEYWORDS.contains(&bare))
}

pub fn validate_identifier(kind: &'static str, name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

/// Dotted name whose every segment is an identifier
pub fn validate_qualified(kind: &'static str, name: &str) -> Result<()> {
    if !name.is_empty() && name.split('.').all(is_valid_identifier) {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

/// Reject a request that would emit uncompilable source
pub fn validate_request(request: &GenerationRequest, config: &GenerationConfig) -> Result<()> {
    validate_identifier("class", &request.class_name)?;

    let namespace = config.namespace.trim();
    if !namespace.is_empty() {
        validate_qualified("namespace", namespace)?;
    }
    for parent in config.inheritance() {
        validate_qualified("base type", &parent)?;
    }

    let mut seen = HashSet::new();
    for field in &request.fields {
        validate_identifier("field", &field.name)?;
        if field.name == request.class_name {
            // a member may not share its enclosing type's name
            return Err(Error::InvalidIdentifier {
                kind: "field",
                name: field.name.clone(),
            });
        }
        if !seen.insert(field.name.as_str()) {
            return Err(Error::DuplicateField {
                class_name: request.class_name.clone(),
                field: field.name.clone(),
            });
        }
        validate_qualified("type", &field.type_ref.qualified())?;
    }
    Ok(())
}
