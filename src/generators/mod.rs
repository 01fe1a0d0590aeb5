pub mod base;
pub mod csharp;
pub mod request;

use crate::error::Result;
use crate::interface::config::GenerationConfig;

pub use base::templates::GlobalContext;
pub use base::BaseBindingsGenerator as BindingsGenerator;
pub use csharp::{PartialClassGenerator, SingleFileGenerator};
pub use request::{FieldSpec, GeneratedFiles, GenerationRequest};

/// Factory function to create the generator matching the configured file layout
pub fn create_generator(config: &GenerationConfig) -> Result<Box<dyn BindingsGenerator>> {
    if config.use_partial_class {
        Ok(Box::new(PartialClassGenerator::new()?))
    } else {
        Ok(Box::new(SingleFileGenerator::new()?))
    }
}
