//! carolink console
//!
//! Interactive operator console for a carolink game board: arm a marker
//! category, tap cells to place or clear markers under the per-category
//! quotas, commit the layout to the board server, and drive the
//! run/retry lifecycle. While a run is active every control is locked
//! until the retry confirmation releases it.

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carolink_client::link::LinkManager;
use carolink_core::{FileSettings, RunPhase, SessionController};
use carolink_protocol::{Category, CellId, GRID_ROWS};

type Console = SessionController<LinkManager, FileSettings>;

#[derive(Parser)]
#[command(name = "carolink")]
#[command(author, version, about = "Remote operator console for a carolink game board")]
struct Cli {
    /// Board server address, e.g. 192.168.1.20:8765
    #[arg(short, long)]
    address: Option<String>,

    /// Connect to the board server at startup
    #[arg(short, long)]
    connect: bool,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut session = SessionController::new(LinkManager::new(), FileSettings::new());

    if let Some(address) = &cli.address {
        session.edit_address(address);
    }
    if cli.connect {
        session.connect();
    }

    print_help();
    print_board(&session);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    print_prompt(&session);
    while let Some(line) = lines.next_line().await? {
        if !dispatch(&mut session, line.trim()) {
            break;
        }
        print_prompt(&session);
    }

    session.shutdown();
    Ok(())
}

/// Handle one console line; returns false when the operator quits
fn dispatch(session: &mut Console, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return true;
    };

    match word {
        "arm" => {
            if locked_notice(session) {
                return true;
            }
            match parts.next().map(str::parse::<Category>) {
                Some(Ok(category)) => {
                    session.arm(category);
                    println!(
                        "Armed {} ({} left)",
                        category,
                        session.remaining(category)
                    );
                }
                _ => println!("Usage: arm <r1|fake|real>"),
            }
        }

        "tap" => {
            if locked_notice(session) {
                return true;
            }
            match parts.next().map(str::parse::<CellId>) {
                Some(Ok(cell)) => {
                    if session.armed().is_none() {
                        println!("Arm a category first");
                        return true;
                    }
                    session.tap_cell(cell);
                    print_board(session);
                }
                _ => println!("Usage: tap <1..12>"),
            }
        }

        "board" => print_board(session),

        "addr" => match parts.next() {
            Some(address) => {
                if locked_notice(session) {
                    return true;
                }
                session.edit_address(address);
                println!("Address: {}", session.address());
            }
            None => println!(
                "Address: {} (saved: {})",
                session.address(),
                session.saved_address().unwrap_or("none")
            ),
        },

        "save" => {
            if locked_notice(session) {
                return true;
            }
            session.save_address();
            println!("Saved: {}", session.saved_address().unwrap_or("none"));
        }

        "connect" => {
            if locked_notice(session) {
                return true;
            }
            session.connect();
            println!("Connecting... (check with status)");
        }

        "status" => print_status(session),

        "start" => {
            session.press_primary();
            print_status(session);
        }

        "yes" => session.confirm_retry(true),
        "no" => session.confirm_retry(false),

        "reset" => {
            if locked_notice(session) {
                return true;
            }
            session.reset_board();
            print_board(session);
        }

        "help" => print_help(),
        "quit" | "exit" => return false,

        other => println!("Unknown command: {} (try help)", other),
    }

    true
}

/// Print a notice when controls are locked; true when they are
fn locked_notice(session: &Console) -> bool {
    if session.locked() {
        println!("Controls are locked while a run is active");
        true
    } else {
        false
    }
}

fn print_board(session: &Console) {
    println!();
    for row in GRID_ROWS {
        let cells: Vec<String> = row
            .iter()
            .map(|&cell| match session.board().get(cell) {
                Some(category) => format!("[{:>2} {:<4}]", cell.as_u8(), category.as_str()),
                None => format!("[{:>2}     ]", cell.as_u8()),
            })
            .collect();
        println!("  {}", cells.join(" "));
    }
    print!(" ");
    for category in Category::ALL {
        print!("  {}: {} left", category, session.remaining(category));
    }
    println!();
}

fn print_status(session: &Console) {
    let phase = match session.phase() {
        RunPhase::Idle => "idle",
        RunPhase::Running => "running",
        RunPhase::RetryPending => "awaiting retry confirmation",
    };
    println!("Link: {}  Run: {}", session.link_status(), phase);
}

fn print_help() {
    println!("Commands:");
    println!("  arm <r1|fake|real>   arm a category for placement");
    println!("  tap <1..12>          toggle the armed category on a cell");
    println!("  board                show the grid and remaining counts");
    println!("  addr [host:port]     show or edit the server address (port 8765 by default on the server)");
    println!("  save                 remember the address for next time");
    println!("  connect              open the link to the board server");
    println!("  status               show link and run state");
    println!("  start                commit the layout and start a run / ask to retry");
    println!("  yes | no             answer the retry confirmation");
    println!("  reset                clear the whole board");
    println!("  quit                 leave the console");
}

fn print_prompt(session: &Console) {
    if session.retry_prompt() {
        print!("retry? (yes/no) > ");
    } else {
        print!("> ");
    }
    let _ = std::io::stdout().flush();
}
