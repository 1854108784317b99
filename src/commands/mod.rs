/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`     - Interactive chat mode
- `ask`      - Send a single prompt
- `login`    - Log in to the backend
- `register` - Register a new account

The handlers are thin: they build the HTTP client, transport, and session
from the configuration and drive them with a terminal renderer.
*/

use crate::auth::{ApiResponse, AuthClient};
use crate::config::Config;
use crate::error::Result;
use crate::session::ChatSession;
use crate::transport::http::{build_http_client, HttpChatTransport};

// Special commands parser for interactive chat
pub mod special_commands;

/// Chat session and auth client sharing one HTTP client (and cookie jar)
fn build_clients(config: &Config) -> Result<(ChatSession<HttpChatTransport>, AuthClient)> {
    let http = build_http_client(&config.server)?;
    let transport = HttpChatTransport::new(http.clone(), &config.server);
    let session = ChatSession::new(transport, config.stream.clone());
    let auth = AuthClient::new(http, &config.server);
    Ok((session, auth))
}

/// Print the backend's reply to a login or registration
///
/// Returns whether the backend reported success.
fn print_auth_reply(reply: &ApiResponse) -> bool {
    use colored::Colorize;

    if reply.is_success() {
        println!("{}", reply.message.green());
    } else {
        println!("{}", reply.message.red());
    }
    reply.is_success()
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop: each line is either a special command or a
    //! prompt sent through the [`ChatSession`], whose reply streams into a
    //! [`TerminalRenderer`]. The loop does not read the next line until the
    //! reply has finished, which is the terminal's "disabled input".

    use super::*;
    use crate::auth::LoginForm;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::render::{Renderer, TerminalRenderer};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or line editor cannot be created.
    /// Chat failures are rendered inline and do not end the loop.
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let (session, auth) = build_clients(&config)?;
        let mut renderer = TerminalRenderer::stdout(&config.render);
        let mut rl = DefaultEditor::new()?;

        renderer.welcome();

        loop {
            let prompt = format!("{} ", ">".green().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::NewChat) => {
                            session.new_chat(&mut renderer);
                            continue;
                        }
                        Ok(SpecialCommand::Login { username, password }) => {
                            let form = LoginForm { username, password };
                            match auth.login(&form).await {
                                Ok(reply) => {
                                    print_auth_reply(&reply);
                                }
                                Err(e) => eprintln!("{}", format!("Login failed: {}", e).red()),
                            }
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status(&config, &session);
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)?;
                    let outcome = session.send(trimmed, &mut renderer).await;
                    tracing::debug!(?outcome, "Send finished");
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_status(config: &Config, session: &ChatSession<HttpChatTransport>) {
        println!();
        println!("Server:     {}", config.server.base_url);
        println!(
            "Chat:       {}",
            config.server.endpoint(&config.server.chat_path)
        );
        println!("Messages:   {}", session.transcript().len());
        println!(
            "Streaming:  {}",
            if session.is_active() { "yes" } else { "no" }
        );
        println!();
    }
}

// One-shot prompt handler
pub mod ask {
    //! Send a single prompt and stream the reply to stdout.

    use super::*;
    use crate::error::ChataiError;
    use crate::render::TerminalRenderer;
    use crate::session::SendOutcome;
    use crate::stream::Termination;

    /// Send `prompt` once and stream the reply
    ///
    /// # Errors
    ///
    /// Returns an error when the prompt is blank, the request fails before
    /// streaming, or the stream is interrupted.
    pub async fn run_ask(config: Config, prompt: String) -> Result<()> {
        let (session, _auth) = build_clients(&config)?;
        let mut renderer = TerminalRenderer::stdout(&config.render);

        match session.send(&prompt, &mut renderer).await {
            SendOutcome::Completed(outcome) => match outcome.termination {
                Termination::TransportError(message) => Err(ChataiError::Transport(message).into()),
                Termination::Sentinel | Termination::EndOfStream => Ok(()),
            },
            SendOutcome::RequestFailed(message) => Err(anyhow::anyhow!(message)),
            SendOutcome::Ignored => {
                Err(ChataiError::Config("Prompt cannot be empty".to_string()).into())
            }
            // A fresh session has nothing in flight.
            SendOutcome::Busy => Ok(()),
        }
    }
}

// Login handler
pub mod login {
    //! Log in from the command line.

    use super::*;
    use crate::auth::LoginForm;
    use crate::error::ChataiError;

    /// Validate the credentials and log in
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or an auth error
    /// carrying the backend's message when login is rejected.
    pub async fn run_login(config: Config, username: String, password: String) -> Result<()> {
        let form = LoginForm { username, password };
        form.validate()?;

        let (_session, auth) = build_clients(&config)?;
        let reply = auth.login(&form).await?;
        if print_auth_reply(&reply) {
            Ok(())
        } else {
            Err(ChataiError::Auth(reply.message).into())
        }
    }
}

// Registration handler
pub mod register {
    //! Register an account from the command line.

    use super::*;
    use crate::auth::RegisterForm;
    use crate::error::ChataiError;

    /// Validate the form and register
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or an auth error
    /// carrying the backend's message when registration is rejected.
    pub async fn run_register(config: Config, form: RegisterForm) -> Result<()> {
        form.validate()?;

        let (_session, auth) = build_clients(&config)?;
        let reply = auth.register(&form).await?;
        if print_auth_reply(&reply) {
            Ok(())
        } else {
            Err(ChataiError::Auth(reply.message).into())
        }
    }
}
