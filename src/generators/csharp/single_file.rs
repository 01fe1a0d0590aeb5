use crate::error::{Error, Result};
use crate::generators::base::regions::{
    extract_manual_code, replace_region, MANUAL_REGION_END, MANUAL_REGION_START,
};
use crate::generators::base::template_context::ClassContext;
use crate::generators::base::templates::render;
use crate::generators::base::{read_existing, BaseBindingsGenerator, GenerationPlan, PlannedFile};
use crate::generators::csharp::class_context;
use crate::generators::csharp::templates::create_template_engine;
use crate::generators::request::{GeneratedFiles, GenerationRequest};
use crate::interface::config::GenerationConfig;
use tera::Tera;

/// Emits one `<Class>.cs` holding an auto region and a manual region. The manual region of
/// an existing file is carried over byte for byte.
pub struct SingleFileGenerator {
    tera: Tera,
}

impl SingleFileGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tera: create_template_engine()?,
        })
    }

    /// Render with an empty manual region
    pub fn render(&self, class: &ClassContext) -> Result<String> {
        let context = class_context(class, true)?;
        render(&self.tera, "csharp/single.cs.tera", &context)
    }

    /// Render, then splice `manual_code` into the manual region
    pub fn render_with_manual_code(&self, class: &ClassContext, manual_code: &str) -> Result<String> {
        let fresh = self.render(class)?;
        replace_region(&fresh, MANUAL_REGION_START, MANUAL_REGION_END, manual_code).ok_or_else(
            || Error::Template("single-file template lost its manual region markers".to_string()),
        )
    }
}

impl BaseBindingsGenerator for SingleFileGenerator {
    fn name(&self) -> &'static str {
        "single-file"
    }

    fn plan(
        &self,
        request: &GenerationRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationPlan> {
        let class = ClassContext::from_request(request, config);
        let path = config.manual_file_path(&request.class_name);

        let content = match read_existing(&path)? {
            None => self.render(&class)?,
            Some(existing) => match extract_manual_code(&existing) {
                Some(code) => self.render_with_manual_code(&class, code)?,
                None => return Err(Error::ManualRegionMissing { path }),
            },
        };

        Ok(GenerationPlan {
            files: vec![PlannedFile {
                path: path.clone(),
                content,
            }],
            result: GeneratedFiles {
                class_name: request.class_name.clone(),
                auto_file: path,
                manual_file: None,
                manual_created: false,
            },
        })
    }
}
