use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "medguard")]
#[command(about = "Medication label safety analysis service")]
pub struct Cli {
    /// Path to TOML configuration file (defaults to ./medguard.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Override server.host from config
        #[arg(long)]
        host: Option<String>,

        /// Override server.port from config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify label text offline and print the verdict as JSON
    Classify {
        /// Label text; read from stdin when omitted
        text: Option<String>,
    },
}

impl Cli {
    /// 沒有子命令時預設啟動伺服器
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            host: None,
            port: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["medguard", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command(), Command::Serve { port: None, .. }));
    }

    #[test]
    fn test_classify_with_text() {
        let cli = Cli::parse_from(["medguard", "classify", "Avoid alcohol", "--json-logs"]);
        assert!(cli.json_logs);
        match cli.command() {
            Command::Classify { text } => assert_eq!(text.as_deref(), Some("Avoid alcohol")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::parse_from(["medguard", "--config", "custom.toml", "serve", "-p", "8081"]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        assert!(matches!(cli.command(), Command::Serve { port: Some(8081), .. }));
    }
}
