use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use missive::cli::{Cli, Commands};
use missive::config::Config;
use missive::events::LoggingHandler;
use missive::service::{CreateMessage, MessageService};
use missive::state::AppState;
use missive_core::events::EventKind;
use missive_core::message::Message;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "missive=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(ttl) = cli.ttl {
        config.cache_ttl_seconds = ttl;
    }
    if let Some(path) = cli.sqlite_path {
        config.sqlite_path = path;
    }

    let state = AppState::new(&config).await?;
    for kind in EventKind::ALL {
        state
            .event_bus
            .subscribe(kind, Arc::new(LoggingHandler))
            .await?;
    }
    let service = state.service();

    match cli.command {
        Commands::Create {
            sender,
            recipient,
            chat,
            text,
            id,
        } => {
            let message = service
                .create(CreateMessage {
                    id,
                    sender_id: sender,
                    recipient_id: recipient,
                    chat_id: chat,
                    text,
                })
                .await?;
            print_message(&message)?;
        }
        Commands::Get { id } => print_message(&service.get_by_id(id).await?)?,
        Commands::Edit { id, text } => print_message(&service.edit_text(id, &text).await?)?,
        Commands::Read { id } => print_message(&service.mark_as_read(id).await?)?,
        Commands::Delete { id } => {
            service.delete(id).await?;
            println!("Deleted message {}", id);
        }
        Commands::Demo => run_demo(&service).await?,
    }

    Ok(())
}

fn print_message(message: &Message) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&message.to_record())?);
    Ok(())
}

/// Walks one message through its lifecycle, printing every step.
async fn run_demo(service: &MessageService) -> Result<()> {
    let sender = Uuid::new_v4();
    let recipient = Uuid::new_v4();
    let chat = Uuid::new_v4();

    println!("==> create");
    let created = service
        .create(CreateMessage {
            id: None,
            sender_id: sender,
            recipient_id: recipient,
            chat_id: chat,
            text: "hi".to_string(),
        })
        .await?;
    print_message(&created)?;
    let id = created.id();

    println!("==> get");
    print_message(&service.get_by_id(id).await?)?;

    println!("==> edit");
    print_message(&service.edit_text(id, "hello").await?)?;

    println!("==> read");
    print_message(&service.mark_as_read(id).await?)?;

    println!("==> read again");
    print_message(&service.mark_as_read(id).await?)?;

    println!("==> delete");
    service.delete(id).await?;

    println!("==> get after delete");
    match service.get_by_id(id).await {
        Ok(message) => print_message(&message)?,
        Err(err) => println!("{}", err),
    }

    Ok(())
}
