use std::path::PathBuf;

use tokio::io::BufReader;
use tracing::info;
use twin_servos::{
    command_executor::bridge::{BridgeHandler, command_sender::BridgeCommandSender},
    config::{create_default_config, init_config, should_create_config},
    console::Console,
    logging,
};
use utilities::command_executor::CommandExecutor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    if should_create_config() {
        create_default_config(None::<PathBuf>)?;
    }

    let (config_manager, config) = init_config().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Run with CREATE_CONFIG=1 to create a default configuration file.");
        e
    })?;
    info!("Loaded configuration from {}", config_manager.path().display());

    let executor = CommandExecutor::new(BridgeHandler::from_config(&config.serial.for_console()));
    let sender = BridgeCommandSender::new(executor.sender());
    let executor_handle = executor.spawn();

    let mut console = Console::new(sender);
    let mut stdout = tokio::io::stdout();
    let result = console.run(BufReader::new(tokio::io::stdin()), &mut stdout).await;

    // Dropping the last sender lets the executor hand back the port.
    drop(console);
    executor_handle.await?.close();

    result?;
    Ok(())
}
