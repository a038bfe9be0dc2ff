//! Serve command handler.

use clap::Args;
use jobs_core::{config::AppConfig, AppResult};

/// Run the HTTP service
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Bind address (overrides server.host)
    #[arg(long, env = "JOBS_HOST")]
    pub host: Option<String>,

    /// Listen port (overrides server.port)
    #[arg(long, env = "JOBS_PORT")]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(self, mut config: AppConfig) -> AppResult<()> {
        self.apply(&mut config);
        config.validate()?;
        jobs_server::start(config).await
    }

    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
