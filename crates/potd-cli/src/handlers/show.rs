//! Show command handler.

use anyhow::Result;
use potd_core::Picture;

use crate::commands::ShowArgs;

pub async fn execute(args: &ShowArgs) -> Result<()> {
    let ctx = potd_axum::bootstrap(&args.service.server_config()).await?;

    let picture = match args.date {
        Some(date) => ctx.pictures.by_date(date).await?,
        None => ctx.pictures.today_or_latest().await?,
    };

    let Some(picture) = picture else {
        match args.date {
            Some(date) => println!("No picture stored for {date}"),
            None => println!("No pictures stored yet. Run `potd scrape` first."),
        }
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&picture.to_dto())?);
    } else {
        print!("{}", render(&picture));
    }
    Ok(())
}

fn render(picture: &Picture) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let size = |bytes: &Option<Vec<u8>>| {
        bytes
            .as_ref()
            .map_or_else(|| "missing".to_string(), |b| format!("{} bytes", b.len()))
    };

    format!(
        "Date:        {}\nSummary:     {}\nCredit:      {}\nImage URL:   {}\nOriginal:    {}\nDithered:    {}\n\n{}\n",
        picture.date,
        field(&picture.short_description),
        field(&picture.credit),
        field(&picture.image_url),
        size(&picture.original_image),
        size(&picture.dithered_image),
        field(&picture.description),
    )
}
