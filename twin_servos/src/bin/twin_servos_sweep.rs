use std::path::PathBuf;

use tracing::{info, warn};
use twin_servos::{
    command_executor::bridge::{BridgeHandler, command_sender::BridgeCommandSender},
    config::{create_default_config, init_config, should_create_config},
    controllers::sweep::SweepController,
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

    let mut controller = SweepController::from_config(&config.sweep)?;

    let executor = CommandExecutor::new(BridgeHandler::from_config(&config.serial));
    let mut sender = BridgeCommandSender::new(executor.sender());
    let executor_handle = executor.spawn();

    let result = tokio::select! {
        result = async {
            if config.sweep.home {
                controller.home(&mut sender).await?;
            }
            if config.sweep.prime {
                controller.prime(&mut sender).await?;
            }
            controller.run(&mut sender).await
        } => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
            Ok(())
        }
    };

    info!(
        "Stopped after {} ticks at x = {} ({:?})",
        controller.ticks(),
        controller.x().position,
        controller.x().direction
    );

    drop(sender);
    executor_handle.await?.close();

    result?;
    Ok(())
}
