use serde::{ser::Serializer, Serialize};
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    #[error("Invalid {kind} identifier: '{name}'")]
    InvalidIdentifier { kind: &'static str, name: String },

    #[error("Duplicate field '{field}' in generated type '{class_name}'")]
    DuplicateField { class_name: String, field: String },

    #[error("Nothing to generate for '{0}': no valid bindings")]
    NoValidBindings(String),

    #[error("Failed to write {}: {source}", .path.display())]
    GenerationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has no manual code region; refusing to overwrite it", .path.display())]
    ManualRegionMissing { path: PathBuf },

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Compiled type '{0}' not found; has the generated code been compiled?")]
    CompiledTypeNotFound(String),

    #[error("Field '{field}' not found on generated type '{class_name}'")]
    FieldNotFound { class_name: String, field: String },

    #[error("Timed out waiting for compiled types: {}", .0.join(", "))]
    CompileTimeout(Vec<String>),

    #[error("Compilation failed: {0}")]
    CompileFailed(String),

    #[error("Invalid source pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Node #{0} does not exist in the scene")]
    NodeNotFound(usize),

    #[error("Node '{0}' is not a container")]
    NotAContainer(String),

    #[error("Container '{0}' already has a generate or bind operation in flight")]
    ContainerBusy(String),

    #[error("Container '{container}' does not allow {operation} bindings")]
    BindModeViolation {
        container: String,
        operation: &'static str,
    },

    #[error("Node '{node}' has no '{type_name}' capability")]
    CapabilityMissing { node: String, type_name: String },

    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("Scene serialization failed: {0}")]
    SceneFormat(#[from] serde_json::Error),
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
