use calsync_core::{
    compute_window, describe_window, last_seven_days, Config, SyncOrchestrator, SyncSummary,
    SyncTarget, Window,
};
use chrono::{Datelike, NaiveDate};
use clap::{Args, ValueEnum};
use inquire::{Confirm, Select, Text};

#[derive(Clone, Copy, ValueEnum)]
pub enum TargetArg {
    Personal,
    Work,
    Exercise,
    Sleep,
    All,
}

impl TargetArg {
    const CHOICES: [TargetArg; 5] = [
        TargetArg::Personal,
        TargetArg::Work,
        TargetArg::Exercise,
        TargetArg::Sleep,
        TargetArg::All,
    ];

    fn targets(self) -> Vec<SyncTarget> {
        match self {
            TargetArg::Personal => vec![SyncTarget::PersonalActivity],
            TargetArg::Work => vec![SyncTarget::WorkActivity],
            TargetArg::Exercise => vec![SyncTarget::Exercise],
            TargetArg::Sleep => vec![SyncTarget::Sleep],
            TargetArg::All => SyncTarget::ALL.to_vec(),
        }
    }

    fn label(self) -> &'static str {
        match self.targets().as_slice() {
            [one] => one.label(),
            _ => "All",
        }
    }
}

impl std::fmt::Display for TargetArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Args)]
pub struct SyncArgs {
    /// What to sync (prompted for when omitted)
    #[arg(long, value_enum)]
    pub target: Option<TargetArg>,
    /// A single day (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from", "week", "last_7_days"])]
    pub date: Option<NaiveDate>,
    /// First day of a range (YYYY-MM-DD)
    #[arg(long, requires = "to", conflicts_with_all = ["week", "last_7_days"])]
    pub from: Option<NaiveDate>,
    /// Last day of a range (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
    /// Week number (1-52)
    #[arg(long, conflicts_with = "last_7_days")]
    pub week: Option<u32>,
    /// Year for --week (defaults to the current year)
    #[arg(long, requires = "week")]
    pub year: Option<i32>,
    /// The seven days ending today
    #[arg(long)]
    pub last_7_days: bool,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
    /// Output summaries as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy)]
enum WindowChoice {
    SingleDate,
    DateRange,
    WeekNumber,
    LastSevenDays,
}

impl std::fmt::Display for WindowChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            WindowChoice::SingleDate => "Single date",
            WindowChoice::DateRange => "Date range",
            WindowChoice::WeekNumber => "Week number",
            WindowChoice::LastSevenDays => "Last 7 days",
        })
    }
}

pub async fn run(args: SyncArgs) -> Result<(), Box<dyn std::error::Error>> {
    let target = match args.target {
        Some(t) => t,
        None => Select::new("What do you want to sync?", TargetArg::CHOICES.to_vec()).prompt()?,
    };
    let targets = target.targets();

    let config = Config::load_resolved()?;
    config.validate_for(&targets)?;

    let window = select_window(&args)?;
    tracing::debug!(start = %window.start(), end = %window.end(), "window selected");

    println!("Target:     {target}");
    println!(
        "Date range: {} ({} to {})",
        describe_window(&window),
        window.start(),
        window.end()
    );
    println!("Total days: {}", window.days());

    if !args.yes && !Confirm::new("Proceed?").with_default(true).prompt()? {
        println!("Sync cancelled");
        return Ok(());
    }

    let zone = config.time_zone()?;
    let clients = crate::common::build_clients(&config)?;
    let orchestrator = SyncOrchestrator::new(&clients.notion, &clients.google, zone);

    let summaries = if targets.len() == 1 {
        vec![orchestrator.run_sync(targets[0], &window).await?]
    } else {
        orchestrator.run_all(&targets, &window).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            print_summary(summary);
        }
    }
    Ok(())
}

fn select_window(args: &SyncArgs) -> Result<Window, Box<dyn std::error::Error>> {
    if let Some(date) = args.date {
        return Ok(Window::single_day(date));
    }
    if let (Some(from), Some(to)) = (args.from, args.to) {
        return Ok(Window::new(from, to)?);
    }
    if let Some(week) = args.week {
        let year = args.year.unwrap_or_else(current_year);
        return Ok(compute_window(year, week)?);
    }
    if args.last_7_days {
        return Ok(last_seven_days(today())?);
    }

    let choices = vec![
        WindowChoice::SingleDate,
        WindowChoice::DateRange,
        WindowChoice::WeekNumber,
        WindowChoice::LastSevenDays,
    ];
    let window = match Select::new("Which dates?", choices).prompt()? {
        WindowChoice::SingleDate => Window::single_day(prompt_date("Date (YYYY-MM-DD):")?),
        WindowChoice::DateRange => {
            let from = prompt_date("From (YYYY-MM-DD):")?;
            let to = prompt_date("To (YYYY-MM-DD):")?;
            Window::new(from, to)?
        }
        WindowChoice::WeekNumber => {
            let text = Text::new("Week number (1-52):").prompt()?;
            let week: u32 = text
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not a week number", text.trim()))?;
            compute_window(current_year(), week)?
        }
        WindowChoice::LastSevenDays => last_seven_days(today())?,
    };
    Ok(window)
}

fn prompt_date(message: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    let text = Text::new(message)
        .with_default(&today().to_string())
        .prompt()?;
    let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {e}", text.trim()))?;
    Ok(date)
}

fn print_summary(summary: &SyncSummary) {
    println!("{}", summary.summary_line());
    for failure in &summary.failed {
        println!("  failed: {} ({}): {}", failure.label, failure.stage, failure.reason);
    }
    for id in &summary.unmarked {
        println!("  warning: event created for {id} but it could not be marked processed");
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn current_year() -> i32 {
    today().year()
}
