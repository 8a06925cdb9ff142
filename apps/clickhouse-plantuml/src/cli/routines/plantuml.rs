//! Runs the `plantuml` binary over a generated diagram.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use clap::ValueEnum;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::cli::display::Message;
use crate::cli::routines::RoutineFailure;

pub const PLANTUML_BINARY: &str = "plantuml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlantumlFormat {
    Png,
    Svg,
    Eps,
    Pdf,
    Vdx,
    Xmi,
    Scxml,
    Html,
    Txt,
    Utxt,
    Latex,
    #[value(name = "latex:nopreamble")]
    LatexNopreamble,
}

impl PlantumlFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantumlFormat::Png => "png",
            PlantumlFormat::Svg => "svg",
            PlantumlFormat::Eps => "eps",
            PlantumlFormat::Pdf => "pdf",
            PlantumlFormat::Vdx => "vdx",
            PlantumlFormat::Xmi => "xmi",
            PlantumlFormat::Scxml => "scxml",
            PlantumlFormat::Html => "html",
            PlantumlFormat::Txt => "txt",
            PlantumlFormat::Utxt => "utxt",
            PlantumlFormat::Latex => "latex",
            PlantumlFormat::LatexNopreamble => "latex:nopreamble",
        }
    }
}

impl fmt::Display for PlantumlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SHA-256 of the diagram source with the format as extension
pub fn content_file_name(diagram: &str, format: PlantumlFormat) -> PathBuf {
    let digest = hex::encode(Sha256::digest(diagram.as_bytes()));
    PathBuf::from(format!("{digest}.{format}"))
}

/// The text output file with the format as extension
pub fn sibling_file_name(text_output: &Path, format: PlantumlFormat) -> PathBuf {
    text_output.with_extension(format.as_str())
}

fn plantuml_failure(details: String, error: std::io::Error) -> RoutineFailure {
    RoutineFailure::new(Message::new("PlantUML".to_string(), details), error)
}

/// Pipes `diagram` through `plantuml -p -t<format>` and stores the output
/// in `output`.
pub async fn run_plantuml(
    diagram: &str,
    format: PlantumlFormat,
    extra_arguments: &str,
    output: &Path,
) -> Result<(), RoutineFailure> {
    info!("Generating file {}", output.display());
    let mut command = Command::new(PLANTUML_BINARY);
    command
        .arg("-p")
        .arg(format!("-t{format}"))
        .args(extra_arguments.split_whitespace())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    debug!("Running {:?}", command);

    let mut child = command.spawn().map_err(|e| {
        plantuml_failure(format!("Failed to start {PLANTUML_BINARY}"), e)
    })?;

    let mut stdin = child.stdin.take().ok_or_else(|| {
        RoutineFailure::error(Message::new(
            "PlantUML".to_string(),
            "Failed to open the plantuml input".to_string(),
        ))
    })?;
    let input = diagram.as_bytes().to_vec();
    let write_input = async move {
        stdin.write_all(&input).await?;
        stdin.shutdown().await
    };

    let (written, finished) = tokio::join!(write_input, child.wait_with_output());
    let finished = finished
        .map_err(|e| plantuml_failure(format!("Failed to run {PLANTUML_BINARY}"), e))?;
    written.map_err(|e| plantuml_failure("Failed to pass the diagram to plantuml".to_string(), e))?;

    if !finished.status.success() {
        return Err(RoutineFailure::error(Message::new(
            "PlantUML".to_string(),
            format!("{PLANTUML_BINARY} exited with {}", finished.status),
        )));
    }

    tokio::fs::write(output, finished.stdout)
        .await
        .map_err(|e| plantuml_failure(format!("Failed to write {}", output.display()), e))
}
