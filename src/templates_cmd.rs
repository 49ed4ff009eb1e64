//! The `templates` subcommand: load, optionally validate, and diagram the
//! template configuration.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::{SeqError, SeqResult, template};

pub fn run(template_file: Option<PathBuf>, output: PathBuf, check: bool) -> SeqResult<()> {
    let templates = template::load_templates(template_file.as_deref());

    if check {
        let validation = template::validate_templates(&templates);
        for error in &validation.errors {
            warn!("{error}");
        }
        if !validation.is_valid() {
            return Err(SeqError::Message(format!(
                "template validation failed with {} error(s)",
                validation.errors.len()
            )));
        }
    }

    let content = template::render_template_diagram(&templates);
    crate::write_atomic(&output, content.as_bytes())?;
    info!("template diagram exported to {}", output.display());

    println!(
        "templates: loaded={} diagram={}",
        templates.len(),
        output.display()
    );
    Ok(())
}
