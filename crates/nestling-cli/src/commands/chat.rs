//! Interactive streaming chat.

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use futures::StreamExt;

use nestling_client::ChatEvent;
use nestling_models::chat::ChatMessageRequest;

use super::{Context, prompt};
use crate::cli::ChatArgs;

pub async fn run(ctx: &Context, args: ChatArgs) -> Result<()> {
    let chat = ctx.chat();
    let mut session_id = args.session_id;

    println!(
        "Chatting about baby {} (empty line to quit).",
        args.baby_id.bold()
    );

    loop {
        let line = prompt("you")?;
        if line.is_empty() {
            break;
        }

        let request = ChatMessageRequest {
            baby_id: args.baby_id.clone(),
            message: line,
            session_id: session_id.clone(),
        };

        let mut events = chat.send_message_stream(request);
        while let Some(event) = events.next().await {
            match event {
                ChatEvent::Fragment(text) => {
                    print!("{text}");
                    std::io::stdout().flush()?;
                }
                ChatEvent::Complete(completion) => {
                    println!();
                    if completion.is_emergency {
                        println!(
                            "{}",
                            "This may be an emergency. Contact a doctor or emergency services."
                                .red()
                                .bold()
                        );
                    }
                    let sources: Vec<&str> = completion
                        .rag_sources
                        .iter()
                        .chain(completion.qna_sources.iter())
                        .map(|source| source.filename.as_str())
                        .collect();
                    if !sources.is_empty() {
                        println!("{} {}", "sources:".dimmed(), sources.join(", ").dimmed());
                    }
                    session_id = Some(completion.session_id);
                }
                ChatEvent::Error(message) => {
                    println!();
                    eprintln!("{} {}", "error:".red(), message);
                }
            }
        }
    }

    Ok(())
}
