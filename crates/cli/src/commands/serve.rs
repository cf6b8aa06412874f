//! Serve command handler.

use clap::Args;
use office_rag_core::{config::AppConfig, AppResult};

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Bind address (overrides api_host)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides api_port)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let config = self.apply(config.clone());
        office_rag_server::serve(&config).await
    }

    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = &self.host {
            config.api_host = host.clone();
        }
        if let Some(port) = self.port {
            config.api_port = port;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_overrides() {
        let cmd = ServeCommand {
            host: Some("127.0.0.1".to_string()),
            port: None,
        };
        let config = cmd.apply(AppConfig::default());
        assert_eq!(config.api_host, "127.0.0.1");
        assert_eq!(config.api_port, 8000);
    }
}
