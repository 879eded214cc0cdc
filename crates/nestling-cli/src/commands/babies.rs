//! Baby profile listing.

use anyhow::Result;
use comfy_table::Table;

use super::Context;

pub async fn run(ctx: &Context) -> Result<()> {
    let babies = ctx.babies().list().await?;
    if babies.is_empty() {
        println!("No baby profiles. Create one from the app first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Born", "Gender", "Birth weight (kg)"]);
    for baby in babies {
        table.add_row(vec![
            baby.id,
            baby.name,
            baby.birth_date.to_string(),
            baby.gender.unwrap_or_default(),
            format!("{:.2}", baby.birth_weight),
        ]);
    }
    println!("{table}");
    Ok(())
}
