pub mod partial;
pub mod single_file;
pub mod templates;

use crate::error::{Error, Result};
use crate::generators::base::template_context::ClassContext;
use crate::generators::base::templates::GlobalContext;
use tera::Context;

pub use partial::PartialClassGenerator;
pub use single_file::SingleFileGenerator;

pub const GENERATOR_NAME: &str = env!("CARGO_PKG_NAME");

/// Tera context shared by every C# template
pub(crate) fn class_context(class: &ClassContext, single_file: bool) -> Result<Context> {
    let mut context = Context::from_serialize(class)
        .map_err(|e| Error::Template(format!("Failed to build template context: {}", e)))?;
    context.insert("global", &GlobalContext::new(GENERATOR_NAME));
    context.insert("single_file", &single_file);
    Ok(context)
}
