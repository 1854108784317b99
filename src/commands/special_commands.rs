//! Special commands parser for interactive chat mode
//!
//! Special commands are handled by the client instead of being sent to the
//! backend. They are prefixed with `/` and the command word is
//! case-insensitive; arguments keep their case.

use thiserror::Error;

const LOGIN_USAGE: &str = "/login <username> <password>";

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Command was given more arguments than it accepts
    #[error("Command {command} takes no extra arguments: {extra}\n\nUsage: {usage}")]
    UnexpectedArgument {
        command: String,
        extra: String,
        usage: String,
    },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear the conversation and show the welcome message again
    NewChat,

    /// Log in with the given credentials
    Login { username: String, password: String },

    /// Show session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input as a prompt
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns [`CommandError::UnknownCommand`] for an unrecognized `/` command,
/// [`CommandError::MissingArgument`] when `/login` lacks credentials, and
/// [`CommandError::UnexpectedArgument`] when it is given more than two words.
///
/// # Examples
///
/// ```
/// use chatai::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/NEW").unwrap(), SpecialCommand::NewChat);
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or_default().to_lowercase();

    match command.as_str() {
        "/new" | "/clear" => Ok(SpecialCommand::NewChat),
        "/login" => {
            let username = parts.next();
            let password = parts.next();
            let extra: Vec<&str> = parts.collect();
            match (username, password) {
                (Some(_), Some(_)) if !extra.is_empty() => Err(CommandError::UnexpectedArgument {
                    command: "/login".to_string(),
                    extra: extra.join(" "),
                    usage: LOGIN_USAGE.to_string(),
                }),
                (Some(username), Some(password)) => Ok(SpecialCommand::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                }),
                _ => Err(CommandError::MissingArgument {
                    command: "/login".to_string(),
                    usage: LOGIN_USAGE.to_string(),
                }),
            }
        }
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help for the special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

CONVERSATION:
  /new                      - Start a new chat (clears the conversation)
  /clear                    - Same as /new

ACCOUNT:
  /login <user> <password>  - Log in; the session cookie is used for chat requests

SESSION INFORMATION:
  /status                   - Show server and session status
  /help                     - Show this help message

EXIT:
  /exit, /quit, exit, quit  - Leave the chat

Press Enter to send a message. Input is disabled while a reply is streaming.
"#
    );
}
