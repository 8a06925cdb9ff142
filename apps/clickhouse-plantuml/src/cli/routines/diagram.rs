use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use super::plantuml::{content_file_name, run_plantuml, sibling_file_name};
use super::{RoutineFailure, RoutineSuccess, NOTHING_FOUND_EXIT_CODE};
use crate::cli::commands::{DiagramArgs, PlantumlArgs};
use crate::cli::display::Message;
use crate::framework::plantuml::render_diagram;
use crate::framework::schema::{CatalogReader, CatalogScope, TableCollection};

/// Reads the tables of `scope`, writes the PlantUML source and optionally
/// renders it with plantuml.
pub async fn generate_diagram(
    reader: &dyn CatalogReader,
    scope: &CatalogScope,
    plantuml: &PlantumlArgs,
    output: &DiagramArgs,
) -> Result<RoutineSuccess, RoutineFailure> {
    let tables = TableCollection::load(reader, scope).await.map_err(|e| {
        RoutineFailure::new(
            Message::new(
                "Loading".to_string(),
                "Failed to read the tables from ClickHouse".to_string(),
            ),
            e,
        )
    })?;

    if tables.is_empty() {
        return Err(RoutineFailure::error(Message::new(
            "Loading".to_string(),
            "There are no tables with given parameters".to_string(),
        ))
        .with_exit_code(NOTHING_FOUND_EXIT_CODE));
    }
    debug!("Tables are: {:?}", tables.names().collect::<Vec<_>>());
    if let Some(first) = tables.get_index(0) {
        debug!("Columns of the first table are {:?}", first.columns);
    }

    let diagram = render_diagram(&tables).map_err(|e| {
        RoutineFailure::new(
            Message::new(
                "Rendering".to_string(),
                "Failed to render the diagram".to_string(),
            ),
            e,
        )
    })?;
    write_text(output, &diagram)?;

    let summary = format!("diagram of {} tables", tables.len());
    if !plantuml.run_plantuml {
        return Ok(RoutineSuccess::success(Message::new(
            "Generated".to_string(),
            summary,
        )));
    }

    let diagram_output = match &output.diagram_output {
        Some(path) => path.clone(),
        None if output.text_to_stdout() => {
            let path = content_file_name(&diagram, plantuml.plantuml_format);
            if path.exists() {
                info!("File {} exists, do not run plantuml", path.display());
                return Ok(RoutineSuccess::info(Message::new(
                    "Unchanged".to_string(),
                    format!("{} already exists", path.display()),
                )));
            }
            path
        }
        None => sibling_file_name(&output.text_output, plantuml.plantuml_format),
    };

    run_plantuml(
        &diagram,
        plantuml.plantuml_format,
        &plantuml.plantuml_arguments,
        &diagram_output,
    )
    .await?;

    Ok(RoutineSuccess::success(Message::new(
        "Generated".to_string(),
        format!("{summary} in {}", diagram_output.display()),
    )))
}

fn write_text(output: &DiagramArgs, diagram: &str) -> Result<(), RoutineFailure> {
    let result = if output.text_to_stdout() {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(diagram.as_bytes())
            .and_then(|_| stdout.flush())
    } else {
        write_file(&output.text_output, diagram)
    };

    result.map_err(|e| {
        RoutineFailure::new(
            Message::new(
                "Writing".to_string(),
                format!("Failed to write {}", output.text_output.display()),
            ),
            e,
        )
    })
}

fn write_file(path: &Path, diagram: &str) -> std::io::Result<()> {
    std::fs::write(path, diagram)
}
