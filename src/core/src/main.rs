use camsync::configuration::config::{CliArgs, Config};
use camsync::controller::controller_handler::Controller;
use camsync::session_management::session_controller::StopReason;
use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() {
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    println!(
        "
==============================================================================
                camsync v{} - periodic capture to session folders
==============================================================================
",
        env!("CARGO_PKG_VERSION")
    );

    let args = CliArgs::parse();

    info!("Importing configuration");
    let config = Config::from_args(&args).unwrap_or_else(|e| {
        error!("Unable to import configuration from file: {}", e);
        std::process::exit(1);
    });
    info!("Configuration imported successfully");

    let mut controller = Controller::new(config).unwrap_or_else(|e| {
        error!("Unable to create a controller instance: {}, exiting...", e);
        std::process::exit(1);
    });

    if let Some(name) = args.create_root.as_deref() {
        match controller.create_root_folder(name).await {
            Ok(id) => println!("{}", id),
            Err(e) => {
                error!("Unable to create root folder: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    match controller.run().await {
        Ok(report) => {
            if let StopReason::DeviceFailure(reason) = report.stop_reason {
                error!("Capture stopped by a device failure: {}", reason);
                std::process::exit(1);
            }
            info!("Session finished");
        }
        Err(e) => {
            error!("Error occured in the controller process: {}, exiting...", e);
            std::process::exit(1);
        }
    }
}
