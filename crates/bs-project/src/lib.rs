//! bs-project: project definition documents in YAML and JSON.

pub mod definition;
pub mod schema;

use std::path::Path;

use bs_sim::Project;

pub use definition::{read_definition, write_definition};
pub use schema::*;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a YAML definition file into `project`. Returns the check errors.
pub fn read_yaml(project: &mut Project, path: &Path) -> ProjectResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let def: ProjectDef = serde_yaml::from_str(&content)?;
    project.print(
        &format!("Reading project data from file: {}", path.display()),
        true,
    );
    Ok(read_definition(project, &def))
}

pub fn read_yaml_str(project: &mut Project, content: &str) -> ProjectResult<Vec<String>> {
    let def: ProjectDef = serde_yaml::from_str(content)?;
    project.print("Reading project data from YAML text", true);
    Ok(read_definition(project, &def))
}

/// Load a JSON definition file into `project`. Returns the check errors.
pub fn read_json(project: &mut Project, path: &Path) -> ProjectResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let def: ProjectDef = serde_json::from_str(&content)?;
    project.print(
        &format!("Reading project data from file: {}", path.display()),
        true,
    );
    Ok(read_definition(project, &def))
}

pub fn read_json_str(project: &mut Project, content: &str) -> ProjectResult<Vec<String>> {
    let def: ProjectDef = serde_json::from_str(content)?;
    project.print("Reading project data from JSON text", true);
    Ok(read_definition(project, &def))
}

pub fn write_yaml(project: &mut Project, path: &Path) -> ProjectResult<()> {
    let content = write_yaml_string(project)?;
    std::fs::write(path, content)?;
    project.print(
        &format!("Writing project data to file: {}", path.display()),
        true,
    );
    Ok(())
}

pub fn write_yaml_string(project: &Project) -> ProjectResult<String> {
    Ok(serde_yaml::to_string(&write_definition(project))?)
}

pub fn write_json(project: &mut Project, path: &Path) -> ProjectResult<()> {
    let content = write_json_string(project)?;
    std::fs::write(path, content)?;
    project.print(
        &format!("Writing project data to file: {}", path.display()),
        true,
    );
    Ok(())
}

pub fn write_json_string(project: &Project) -> ProjectResult<String> {
    Ok(serde_json::to_string_pretty(&write_definition(project))?)
}
