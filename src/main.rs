use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use burnbox::autofill::LogAutofill;
use burnbox::config::Config;
use burnbox::notify::Event;
use burnbox::protocol::{DeleteResponse, GenerateResponse, Notification, StateResponse};
use burnbox::provider::HttpMailProvider;
use burnbox::sanitize;
use burnbox::session::{ManagerDeps, SessionHandle, SessionManager};
use burnbox::store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("  export BURNBOX_API_BASE=https://mail.example.com");
            eprintln!("  export BURNBOX_API_KEY=...");
            std::process::exit(1);
        }
    };

    eprintln!("📬 burnbox v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Provider: {}", config.api_base);
    eprintln!("   Snapshot: {}", config.state_path.display());
    eprintln!("   Commands: generate, show, read, fill, copy, delete, quit\n");

    let deps = ManagerDeps {
        provider: Arc::new(HttpMailProvider::new(
            config.api_base.clone(),
            config.api_key.clone(),
        )),
        store: Arc::new(JsonFileStore::new(config.state_path.clone())),
        autofill: Arc::new(LogAutofill),
        poll_interval: config.poll_interval,
        session_ttl: config.session_ttl,
    };
    let handle = SessionManager::spawn(deps).await;

    // Notification printer — the panel's one-way message feed.
    let mut events = handle.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(Event::Inbox { messages }) => {
                    let note = Notification::AllMessages { data: messages };
                    match serde_json::to_string(&note) {
                        Ok(json) => println!("{json}"),
                        Err(e) => tracing::warn!(error = %e, "Failed to encode notification"),
                    }
                    eprint!("> ");
                }
                Ok(Event::SessionCreated { address }) => {
                    eprintln!("✉️  {address} is live");
                }
                Ok(Event::SessionCleared) => {
                    eprintln!("🗑  session cleared");
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    run_panel(handle).await;
    Ok(())
}

/// stdin/stdout panel — the CLI equivalent of the popup surface.
async fn run_panel(handle: SessionHandle) {
    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    eprint!("> ");
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => break, // EOF
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                break;
            }
        };

        match line.as_str() {
            "" => {}
            "generate" | "g" => {
                let response = match handle.generate().await {
                    Ok(email) => GenerateResponse::ok(email),
                    Err(e) => GenerateResponse::err(e),
                };
                print_json(&response);
            }
            "show" | "s" => match handle.state().await {
                Ok(snapshot) => print_json(&StateResponse::from(snapshot)),
                Err(e) => eprintln!("Error: {e}"),
            },
            "read" | "r" => match handle.state().await {
                Ok(snapshot) => {
                    if snapshot.messages.is_empty() {
                        println!("No messages yet");
                    }
                    for msg in &snapshot.messages {
                        println!("From: {}", msg.sender);
                        println!("Subject: {}", msg.subject);
                        println!("{}\n", sanitize::render_body(msg));
                    }
                }
                Err(e) => eprintln!("Error: {e}"),
            },
            "fill" | "f" => match handle.fill_address().await {
                Ok(true) => println!("Fill requested"),
                Ok(false) => println!("No address to fill"),
                Err(e) => eprintln!("Error: {e}"),
            },
            "copy" | "c" => match handle.state().await {
                Ok(snapshot) => match snapshot.address {
                    Some(address) => println!("{address}"),
                    None => println!("No address"),
                },
                Err(e) => eprintln!("Error: {e}"),
            },
            "delete" | "d" => {
                let response = match handle.delete().await {
                    Ok(()) => DeleteResponse { success: true },
                    Err(e) => {
                        eprintln!("Error: {e}");
                        DeleteResponse { success: false }
                    }
                };
                print_json(&response);
            }
            "quit" | "q" | "exit" => break,
            other => {
                eprintln!("Unknown command: {other}");
                eprintln!("Commands: generate, show, read, fill, copy, delete, quit");
            }
        }
        eprint!("> ");
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error encoding response: {e}"),
    }
}
