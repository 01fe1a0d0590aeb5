use crate::error::Result;
use crate::generators::base::template_context::ClassContext;
use crate::generators::base::templates::render;
use crate::generators::base::{BaseBindingsGenerator, GenerationPlan, PlannedFile};
use crate::generators::csharp::class_context;
use crate::generators::csharp::templates::create_template_engine;
use crate::generators::request::{GeneratedFiles, GenerationRequest};
use crate::interface::config::GenerationConfig;
use tera::Tera;

/// Emits `<Class>.Auto.cs` on every run and `<Class>.cs` only when it does not exist yet
pub struct PartialClassGenerator {
    tera: Tera,
}

impl PartialClassGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tera: create_template_engine()?,
        })
    }

    pub fn render_auto(&self, class: &ClassContext) -> Result<String> {
        let context = class_context(class, false)?;
        render(&self.tera, "csharp/auto.cs.tera", &context)
    }

    pub fn render_manual(&self, class: &ClassContext, auto_file_name: &str) -> Result<String> {
        let mut context = class_context(class, false)?;
        context.insert("auto_file_name", auto_file_name);
        render(&self.tera, "csharp/manual.cs.tera", &context)
    }
}

impl BaseBindingsGenerator for PartialClassGenerator {
    fn name(&self) -> &'static str {
        "partial"
    }

    fn plan(
        &self,
        request: &GenerationRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationPlan> {
        let class = ClassContext::from_request(request, config);
        let auto_file = config.auto_file_path(&request.class_name);
        let manual_file = config.manual_file_path(&request.class_name);

        let mut files = vec![PlannedFile {
            path: auto_file.clone(),
            content: self.render_auto(&class)?,
        }];

        let manual_created = !manual_file.exists();
        if manual_created {
            let auto_file_name = auto_file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            files.push(PlannedFile {
                path: manual_file.clone(),
                content: self.render_manual(&class, &auto_file_name)?,
            });
        }

        Ok(GenerationPlan {
            files,
            result: GeneratedFiles {
                class_name: request.class_name.clone(),
                auto_file,
                manual_file: Some(manual_file),
                manual_created,
            },
        })
    }
}
