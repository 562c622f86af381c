use super::App;
use crate::output;
use anyhow::Result;
use taskdeck_application::chat_context;
use taskdeck_core::chat::{ChatMessage, Sender};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Sends one message, or reads messages from stdin until `/quit` or EOF.
pub async fn run(app: &App, message: Option<String>) -> Result<()> {
    app.require_user().await?;

    match message {
        Some(message) => {
            let context = load_context(app).await;
            let reply = app.chat.send(&message, Some(context)).await;
            if app.json {
                return output::print_json(&app.chat.messages().await);
            }
            if let Some(last) = app.chat.messages().await.last() {
                print_message(last);
            }
            reply?;
            Ok(())
        }
        None => repl(app).await,
    }
}

async fn repl(app: &App) -> Result<()> {
    for message in app.chat.messages().await {
        print_message(&message);
    }
    println!("(type /clear to start over, /quit to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                app.chat.clear().await;
                for message in app.chat.messages().await {
                    print_message(&message);
                }
            }
            input => {
                let context = load_context(app).await;
                match app.chat.send(input, Some(context)).await {
                    Ok(Some(reply)) => print_message(&reply),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::debug!("Chat error: {}", e);
                        if let Some(last) = app.chat.messages().await.last() {
                            print_message(last);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Snapshot of the user's data for the assistant. Fetch failures only
/// shrink the snapshot.
async fn load_context(app: &App) -> serde_json::Value {
    if let Err(e) = app.store.refresh().await {
        tracing::warn!("Sending chat without fresh data: {}", e);
    }
    chat_context(&app.store.projects().await, &app.store.tasks().await)
}

fn print_message(message: &ChatMessage) {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Bot => "assistant",
    };
    println!("{}: {}", who, message.text);
}
