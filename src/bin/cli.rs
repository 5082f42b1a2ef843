//! servctl CLI Client
//!
//! Operator client: an interactive menu by default, or one-shot start/stop
//! subcommands for scripts.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use servctl::client::{Console, LineSource, StdConsole, StdinLines};
use servctl::protocol::Command;
use servctl::{ClientSession, Config, Result, ServctlError};
use tracing_subscriber::{fmt, EnvFilter};

/// servctl CLI
#[derive(Parser, Debug)]
#[command(name = "servctl-cli")]
#[command(about = "Start and stop a remote server over the servctl protocol")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Seconds to wait for each reply (0 waits forever)
    #[arg(short = 't', long, default_value = "10")]
    reply_timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive menu (default)
    Interactive,

    /// Authenticate and start the remote server
    Start {
        /// Server password
        #[arg(short, long)]
        password: String,
    },

    /// Authenticate and stop the remote server
    Stop {
        /// Server password
        #[arg(short, long)]
        password: String,
    },
}

/// Interactive menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Connect,
    Authenticate,
    Start,
    Stop,
    Exit,
}

impl MenuChoice {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "1" => Some(MenuChoice::Connect),
            "2" => Some(MenuChoice::Authenticate),
            "3" => Some(MenuChoice::Start),
            "4" => Some(MenuChoice::Stop),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

const MENU: &str = "\
1. Connect to server
2. Enter password
3. Start the server
4. Stop the server
5. Exit the program";

fn main() {
    // Logs go to stderr so they do not interleave with the menu
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,servctl=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .server_addr(&args.server)
        .reply_timeout_ms(args.reply_timeout * 1000)
        .build();

    let console: Arc<dyn Console> = Arc::new(StdConsole);
    let mut session = ClientSession::new(config, Arc::clone(&console));

    let result = match args.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => interactive(&mut session, &mut StdinLines::new(), console.as_ref()),
        Commands::Start { password } => one_shot(&mut session, &password, Command::Start),
        Commands::Stop { password } => one_shot(&mut session, &password, Command::Stop),
    };

    session.exit();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Connect, authenticate, run one command
fn one_shot(session: &mut ClientSession, password: &str, command: Command) -> Result<()> {
    session.connect()?;
    session.authenticate(password)?;
    session.issue(command)?;
    println!("OK");
    Ok(())
}

fn interactive(
    session: &mut ClientSession,
    input: &mut dyn LineSource,
    console: &dyn Console,
) -> Result<()> {
    console.notice("--- servctl: Server Manager ---");
    connect(session, console);

    loop {
        console.notice(MENU);
        let Some(line) = input.read_line("Enter your choice: ")? else {
            break;
        };

        match MenuChoice::parse(&line) {
            Some(MenuChoice::Connect) => connect(session, console),
            Some(MenuChoice::Authenticate) => {
                let Some(password) = input.read_line("Enter the password for the server: ")? else {
                    break;
                };
                match session.authenticate(&password) {
                    Ok(()) => console.notice(
                        "-- Password accepted. You may send commands to start/stop the server. --",
                    ),
                    Err(ServctlError::AuthenticationRejected(_)) => console
                        .notice("-- Password rejected. Please enter the right credentials. --"),
                    Err(e) => console.notice(&format!("-- {} --", e)),
                }
            }
            Some(MenuChoice::Start) => match session.start() {
                Ok(()) => console.notice(
                    "-- Server started. Server will be accepting incoming client connections. --",
                ),
                Err(e) => console.notice(&format!("-- Server failed to start: {} --", e)),
            },
            Some(MenuChoice::Stop) => match session.stop() {
                Ok(()) => console.notice(
                    "-- Server stopped. Server will not be accepting incoming client connections. --",
                ),
                Err(e) => console.notice(&format!("-- Server failed to stop: {} --", e)),
            },
            Some(MenuChoice::Exit) => break,
            None => console.notice("Invalid choice"),
        }
    }

    console.notice("Exiting the program...");
    session.exit();
    console.notice("-- Cleanup is complete. --");
    Ok(())
}

fn connect(session: &mut ClientSession, console: &dyn Console) {
    match session.connect() {
        Ok(()) => console.notice(&format!("Connected to {}", session.server_addr())),
        Err(e) => console.notice(&format!("Connection failed: {}", e)),
    }
}
