//! CLI runner

use super::commands::Cli;
use crate::config::TargetConfig;
use crate::engine::TargetEngine;
use crate::error::{Error, Result};
use crate::output::Destination;
use std::fs::File;
use std::io::BufReader;
use tracing::info;

/// Wires CLI arguments into a configured engine run
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner from parsed arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the target to input exhaustion
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        let destination = Destination::parse(&config.hdfs_destination_path)?;
        info!(
            scheme = destination.scheme(),
            "Writing to {}", config.hdfs_destination_path
        );

        let stdout = std::io::stdout().lock();
        let mut engine = TargetEngine::new(config, destination, stdout)?;

        let stats = match &self.cli.input {
            Some(path) => {
                let file = File::open(path).map_err(|e| {
                    Error::config(format!("Failed to open input file {}: {e}", path.display()))
                })?;
                engine.run(BufReader::new(file)).await?
            }
            None => engine.run(std::io::stdin().lock()).await?,
        };

        info!("{}", stats.summary());
        Ok(())
    }

    fn load_config(&self) -> Result<TargetConfig> {
        match (&self.cli.config_json, &self.cli.config) {
            (Some(json), _) => TargetConfig::from_json(json),
            (None, Some(path)) => TargetConfig::from_file(path),
            (None, None) => Err(Error::config(
                "either --config or --config-json is required",
            )),
        }
    }
}
