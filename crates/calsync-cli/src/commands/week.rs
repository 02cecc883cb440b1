use calsync_core::{compute_window, describe_window};
use chrono::Datelike;
use clap::Args;

#[derive(Args)]
pub struct WeekArgs {
    /// Week number (1-52)
    #[arg(long)]
    pub week: u32,
    /// Year (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: WeekArgs) -> Result<(), Box<dyn std::error::Error>> {
    let year = args.year.unwrap_or_else(|| chrono::Local::now().year());
    let window = compute_window(year, args.week)?;

    if args.json {
        let value = serde_json::json!({
            "year": year,
            "week": args.week,
            "start": window.start().to_string(),
            "end": window.end().to_string(),
            "label": describe_window(&window),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Week {} of {year}: {}", args.week, describe_window(&window));
        println!("{} .. {}", window.start(), window.end());
    }
    Ok(())
}
