//! The `eduplatform mentor` chat loop.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use eduplatform_core::chat::{MentorChat, QUICK_QUESTIONS};
use eduplatform_core::session::Route;
use eduplatform_report::write_transcript;

use super::App;

pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let mut app = App::signed_in(config_path, Route::Mentor).await?;
    let mut chat = MentorChat::new(&app.session);

    if let Some(greeting) = chat.messages().first() {
        println!("Mentor: {}\n", greeting.content);
    }
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };
        let input = line.trim();

        match input.split_once(' ').map_or((input, ""), |(c, rest)| (c, rest.trim())) {
            ("/quit" | "/exit", _) => break,
            ("/help", _) => print_help(),
            ("/clear", _) => {
                chat.clear();
                if let Some(greeting) = chat.messages().first() {
                    println!("Mentor: {}\n", greeting.content);
                }
            }
            ("/export", dir) => {
                let dir = if dir.is_empty() {
                    PathBuf::from(".")
                } else {
                    PathBuf::from(dir)
                };
                let today = chrono::Local::now().date_naive();
                let path = write_transcript(chat.transcript(), &dir, today)?;
                println!("Conversation saved to {}", path.display());
            }
            ("/ask", n) => {
                let picked = n
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| QUICK_QUESTIONS.get(i));
                match picked {
                    Some(question) => {
                        println!("You: {question}");
                        send(&mut chat, question).await;
                        app.require(Route::Mentor)?;
                    }
                    None => println!("Pick a suggestion between 1 and {}.", QUICK_QUESTIONS.len()),
                }
            }
            (command, _) if command.starts_with('/') => {
                println!("Unknown command {command}. Type /help for the list.");
            }
            _ => {
                send(&mut chat, input).await;
                // A rejected token ends the conversation.
                app.require(Route::Mentor)?;
            }
        }
    }

    Ok(())
}

async fn send(chat: &mut MentorChat, text: &str) {
    if !chat.send(text).await {
        return;
    }
    if let Some(reply) = chat.messages().last() {
        println!("Mentor: {}\n", reply.content);
    }
}

fn print_help() {
    println!("Suggestions:");
    for (i, question) in QUICK_QUESTIONS.iter().enumerate() {
        println!("  /ask {}  {question}", i + 1);
    }
    println!("Commands: /clear, /export [dir], /help, /quit\n");
}
