use crate::domain::models::{JsonOut, RenderedPage, TileIcon};
use serde::Serialize;
use std::io::Write;

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

pub fn print_page(json: bool, page: &RenderedPage) -> anyhow::Result<()> {
    if json {
        return print_one(true, page, |_| String::new());
    }
    println!("{} (page {}/{})", page.title, page.page_number, page.last_page);
    for placed in &page.tiles {
        let icon = match placed.tile.icon() {
            TileIcon::Static { icon } => icon.clone(),
            TileIcon::Skin { url, .. } => url.clone(),
        };
        let lore = placed.tile.description_lines();
        if lore.is_empty() {
            println!("{}\t{}\t{}", placed.slot, placed.tile.display_name(), icon);
        } else {
            println!(
                "{}\t{}\t{}\t{}",
                placed.slot,
                placed.tile.display_name(),
                icon,
                lore.join(" / ")
            );
        }
    }
    Ok(())
}

/// One compact JSON object per line, flushed immediately (session protocol).
pub fn write_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
