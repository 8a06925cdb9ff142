#[macro_use]
mod cli;
pub mod framework;
pub mod infrastructure;

use std::process::ExitCode;

use clap::Parser;

use cli::display::{Message, MessageType};
use cli::logger::setup_logging;
use cli::settings::read_settings;
use cli::{top_command_handler, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match read_settings() {
        Ok(settings) => settings,
        Err(e) => {
            show_message!(
                MessageType::Error,
                Message::new("Settings".to_string(), format!("Failed to read settings: {e}"))
            );
            return ExitCode::from(1);
        }
    };

    if let Err(e) = setup_logging(&settings.logger, cli.verbose) {
        eprintln!("Failed to set up logging: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            show_message!(
                MessageType::Error,
                Message::new("Runtime".to_string(), format!("Failed to start: {e}"))
            );
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(top_command_handler(settings, &cli)) {
        Ok(success) => {
            show_message!(success.message_type, success.message);
            ExitCode::from(0)
        }
        Err(failure) => {
            show_message!(failure.message_type, failure.message);
            if let Some(err) = failure.error {
                eprintln!("{err:?}");
            }
            ExitCode::from(failure.exit_code)
        }
    }
}
