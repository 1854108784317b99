//! Command-line interface definition for chatai
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot prompts, and the
//! login/registration forms.

use clap::{Parser, Subcommand};

/// chatai - terminal chat client for a streaming AI backend
#[derive(Parser, Debug, Clone)]
#[command(name = "chatai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL from config
    #[arg(long)]
    pub base_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for chatai
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Send a single prompt and stream the reply to stdout
    Ask {
        /// Prompt text to send
        #[arg(short, long)]
        prompt: String,
    },

    /// Log in to the backend
    Login {
        /// Account user name
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long, env = "CHATAI_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Register a new account
    Register {
        /// User name for the new account
        #[arg(short, long)]
        username: String,

        /// Email address for the new account
        #[arg(short, long)]
        email: String,

        /// Password for the new account (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Password confirmation; must match --password
        #[arg(long)]
        confirm_password: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            base_url: None,
            command: Commands::Chat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.base_url.is_none());
        assert!(matches!(cli.command, Commands::Chat));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["chatai", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat));
    }

    #[test]
    fn test_cli_parse_ask_with_prompt() {
        let cli = Cli::try_parse_from(["chatai", "ask", "--prompt", "Hello world"]).unwrap();
        if let Commands::Ask { prompt } = cli.command {
            assert_eq!(prompt, "Hello world");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_ask_requires_prompt() {
        assert!(Cli::try_parse_from(["chatai", "ask"]).is_err());
    }

    #[test]
    fn test_cli_parse_login() {
        let cli =
            Cli::try_parse_from(["chatai", "login", "-u", "alice", "-p", "secret1"]).unwrap();
        if let Commands::Login { username, password } = cli.command {
            assert_eq!(username, "alice");
            assert_eq!(password, "secret1");
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_cli_parse_register() {
        let cli = Cli::try_parse_from([
            "chatai",
            "register",
            "--username",
            "bob",
            "--email",
            "bob@example.com",
            "--password",
            "hunter22",
            "--confirm-password",
            "hunter22",
        ])
        .unwrap();
        if let Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } = cli.command
        {
            assert_eq!(username, "bob");
            assert_eq!(email, "bob@example.com");
            assert_eq!(password, confirm_password);
        } else {
            panic!("Expected Register command");
        }
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "chatai",
            "--verbose",
            "--base-url",
            "http://localhost:9000",
            "chat",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000"));
    }
}
