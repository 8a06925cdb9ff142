#[macro_use]
pub(crate) mod display;

mod commands;
pub mod logger;
pub mod routines;
pub mod settings;

use clap::{ArgAction, Parser};
use tracing::info;

use commands::{ClickHouseArgs, DiagramArgs, PlantumlArgs};
use display::Message;
use routines::{diagram::generate_diagram, RoutineFailure, RoutineSuccess};
use settings::Settings;

use crate::framework::schema::CatalogScope;
use crate::infrastructure::olap::clickhouse::create_client;

/// Generates a PlantUML class diagram of ClickHouse tables
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, arg_required_else_help(false))]
pub struct Cli {
    /// Increase verbosity, can be repeated
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub clickhouse: ClickHouseArgs,

    #[command(flatten)]
    pub plantuml: PlantumlArgs,

    #[command(flatten)]
    pub diagram: DiagramArgs,
}

pub async fn top_command_handler(
    settings: Settings,
    cli: &Cli,
) -> Result<RoutineSuccess, RoutineFailure> {
    let clickhouse_config = cli
        .clickhouse
        .to_clickhouse_config(settings.clickhouse)
        .map_err(|e| {
            RoutineFailure::new(
                Message::new(
                    "Config".to_string(),
                    "Invalid ClickHouse connection parameters".to_string(),
                ),
                e,
            )
        })?;
    info!("Connecting to {}", clickhouse_config.display_url());

    let client = create_client(clickhouse_config);
    let scope = CatalogScope::new(
        cli.clickhouse.databases.clone(),
        cli.clickhouse.tables.clone(),
    );

    generate_diagram(&client, &scope, &cli.plantuml, &cli.diagram).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::routines::plantuml::PlantumlFormat;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["clickhouse-plantuml"]).unwrap();

        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.clickhouse.databases, vec!["default"]);
        assert!(cli.clickhouse.tables.is_empty());
        assert!(!cli.plantuml.run_plantuml);
        assert_eq!(cli.plantuml.plantuml_format, PlantumlFormat::Png);
        assert!(cli.diagram.text_to_stdout());
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "clickhouse-plantuml",
            "-vv",
            "-d",
            "logs",
            "-d",
            "stats",
            "-t",
            "events",
            "-P",
            "-F",
            "svg",
            "--plantuml-arguments",
            "-charset UTF-8",
            "-o",
            "schema.puml",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.clickhouse.databases, vec!["logs", "stats"]);
        assert_eq!(cli.clickhouse.tables, vec!["events"]);
        assert!(cli.plantuml.run_plantuml);
        assert_eq!(cli.plantuml.plantuml_format, PlantumlFormat::Svg);
        assert_eq!(cli.plantuml.plantuml_arguments, "-charset UTF-8");
        assert!(!cli.diagram.text_to_stdout());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_connecting() {
        let cli = Cli::try_parse_from(["clickhouse-plantuml", "--url", "ftp://host/db"]).unwrap();
        let failure = top_command_handler(Settings::default(), &cli)
            .await
            .unwrap_err();

        assert_eq!(failure.message.action, "Config");
        assert!(failure.error.is_some());
    }
}
