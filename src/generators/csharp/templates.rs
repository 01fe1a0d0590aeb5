use crate::error::{Error, Result};
use crate::generators::base::templates::{register_common_filters, register_common_templates};
use tera::Tera;

/// Create and configure a Tera template engine for the C# generators
pub fn create_template_engine() -> Result<Tera> {
    let mut tera = Tera::default();

    register_common_templates(&mut tera)?;
    register_templates(&mut tera)?;
    register_common_filters(&mut tera);

    Ok(tera)
}

/// Register C# templates from embedded strings
fn register_templates(tera: &mut Tera) -> Result<()> {
    macro_rules! template {
        ($name:expr, $path:expr) => {
            tera.add_raw_template($name, include_str!($path))
                .map_err(|e| Error::Template(format!("Failed to register {}: {}", $name, e)))?;
        };
    }

    // Partials first; the main templates include them
    template!(
        "csharp/partials/fields.tera",
        "templates/partials/fields.tera"
    );

    template!("csharp/auto.cs.tera", "templates/auto.cs.tera");
    template!("csharp/manual.cs.tera", "templates/manual.cs.tera");
    template!("csharp/single.cs.tera", "templates/single.cs.tera");

    Ok(())
}
