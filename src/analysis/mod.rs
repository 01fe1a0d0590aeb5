//! Discovery side: which capability types exist, which names map to them, and which nodes a
//! container should bind.

pub mod naming;
pub mod resolver;
pub mod type_registry;

pub use naming::{derive_field_name, suggest_suffix, NamingConfig, SuffixRule};
pub use resolver::{BindingResolver, ResolveOutcome, UnmatchedNode, UnmatchedReason};
pub use type_registry::{
    builtin_ui_types, scene_types, LayeredTypeSource, StaticTypeSource, TypeInfo, TypeKind,
    TypeRegistry, TypeSource,
};
