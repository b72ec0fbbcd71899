use clap::{Parser, ValueEnum};
use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use study_schedule::{
    Allocation, ScheduleError, ScheduleRequest, write_allocation_csv, write_allocation_json,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Ics,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "cli",
    about = "Turn a class list into a calendar of study blocks",
    version,
    args_override_self = true
)]
struct Cli {
    /// JSON file holding a schedule request; flags below override its fields
    #[arg(long)]
    request: Option<PathBuf>,

    /// First day that may receive study time (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// Study weekdays, 1=Monday .. 7=Sunday, comma separated
    #[arg(long)]
    study_days: Option<String>,

    /// Wall-clock start of each study block (HH:MM)
    #[arg(long)]
    start_time: Option<String>,

    /// Daily study limit in whole hours
    #[arg(long = "hours", allow_hyphen_values = true)]
    daily_study_limit_hours: Option<String>,

    /// Factor applied to every class duration (defaults to 1)
    #[arg(long, allow_hyphen_values = true)]
    multiplier: Option<String>,

    /// Class list file, or `-` for stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// IANA timezone for the calendar events
    #[arg(long)]
    timezone: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Ics)]
    format: OutputFormat,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn build_request(&self) -> Result<ScheduleRequest, Box<dyn Error>> {
        let mut request = match &self.request {
            Some(path) => serde_json::from_str::<ScheduleRequest>(&fs::read_to_string(path)?)?,
            None => ScheduleRequest::default(),
        };

        override_field(&mut request.start_date, &self.start_date);
        override_field(&mut request.study_days, &self.study_days);
        override_field(&mut request.start_time, &self.start_time);
        override_field(
            &mut request.daily_study_limit_hours,
            &self.daily_study_limit_hours,
        );
        override_field(&mut request.multiplier, &self.multiplier);
        if request.multiplier.trim().is_empty() {
            request.multiplier = "1".to_string();
        }
        if let Some(tz) = &self.timezone {
            request.timezone = Some(tz.clone());
        }

        match self.input.as_deref() {
            Some(path) if path.as_os_str() == "-" => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                request.class_input = text;
            }
            Some(path) => request.class_input = fs::read_to_string(path)?,
            None => {}
        }

        Ok(request)
    }
}

fn override_field(field: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *field = value.clone();
    }
}

fn print_summary(allocation: &Allocation) {
    if allocation.is_empty() {
        eprintln!("No study time was scheduled.");
        return;
    }
    for (date, fragments) in allocation.days() {
        let subjects: Vec<&str> = fragments.iter().map(|f| f.subject.as_str()).collect();
        eprintln!(
            "{} {:>7.1} min  {}",
            date.format("%Y-%m-%d %a"),
            allocation.minutes_on(date),
            subjects.join(", ")
        );
    }
    eprintln!(
        "{} study days, {:.1} minutes in total.",
        allocation.day_count(),
        allocation.total_minutes()
    );
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let plan = cli.build_request()?.validate()?;
    let allocation = plan.allocate()?;
    tracing::debug!(
        items = plan.items.len(),
        week = %plan.study_week,
        "schedule computed"
    );

    let bytes = match cli.format {
        OutputFormat::Ics => plan.render_calendar(&allocation, Utc::now())?,
        OutputFormat::Json => {
            let mut buffer = Vec::new();
            write_allocation_json(&allocation, &mut buffer)?;
            buffer
        }
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            write_allocation_csv(&allocation, &mut buffer)?;
            buffer
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &bytes)?;
            eprintln!("Schedule written to {}.", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    print_summary(&allocation);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ScheduleError>() {
                Some(schedule_err) if schedule_err.field().is_some() => {
                    eprintln!("Invalid input: {schedule_err}");
                }
                Some(schedule_err) => eprintln!("Cannot build a schedule: {schedule_err}"),
                None => eprintln!("Error: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}
