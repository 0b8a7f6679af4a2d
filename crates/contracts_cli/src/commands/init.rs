use anyhow::{Context, Result, anyhow};
use contracts_parser::{template, templates};
use std::fs;
use tracing::info;

use crate::output;

pub fn execute(name: Option<&str>, list: bool, output_path: Option<&str>) -> Result<()> {
    if list {
        println!("Available templates:");
        for template in templates() {
            println!(
                "  {:<20} {:<14} {}",
                template.name, template.domain, template.description
            );
        }
        return Ok(());
    }

    let name = name.ok_or_else(|| anyhow!("A template name is required (see --list)"))?;
    let template = template(name).ok_or_else(|| {
        let known: Vec<&str> = templates().iter().map(|t| t.name).collect();
        anyhow!(
            "Unknown template: {}. Available templates: {}",
            name,
            known.join(", ")
        )
    })?;
    info!("Initializing contract from template: {}", template.name);

    if let Some(path) = output_path {
        fs::write(path, template.content)
            .with_context(|| format!("Failed to write to file: {}", path))?;
        output::print_success(&format!("Contract written to: {}", path));
    } else {
        print!("{}", template.content);
    }

    Ok(())
}
