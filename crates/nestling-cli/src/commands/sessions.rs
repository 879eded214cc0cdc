//! Chat session listing.

use anyhow::Result;
use comfy_table::Table;

use super::Context;
use crate::cli::SessionsArgs;

pub async fn run(ctx: &Context, args: SessionsArgs) -> Result<()> {
    let sessions = ctx.chat().sessions(args.baby_id.as_deref()).await?;
    if sessions.is_empty() {
        println!("No sessions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Started", "Messages"]);
    for session in sessions {
        table.add_row(vec![
            session.id,
            session
                .title
                .unwrap_or_else(|| "(untitled)".to_string()),
            session.started_at.format("%Y-%m-%d %H:%M").to_string(),
            session
                .message_count
                .map(|count| count.to_string())
                .unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}
