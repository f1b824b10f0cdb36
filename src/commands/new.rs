use std::collections::BTreeSet;

use anyhow::{Result, anyhow, bail};
use chrono::Duration;
use opcal_core::coordinator::Coordinator;
use opcal_core::record::AppointmentDraft;
use opcal_core::recurrence::{Frequency, RecurrenceRule, Termination};
use opcal_core::time::local_day_end;
use opcal_core::transport::ProviderRemote;
use owo_colors::OwoColorize;

use super::parse_datetime;

pub struct NewArgs {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub every: Option<String>,
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<String>,
    pub on: Option<String>,
}

pub async fn run(remote: ProviderRemote, args: NewArgs) -> Result<()> {
    let start_at = parse_datetime(&args.start)?;
    let all_day = !args.start.contains('T');
    let end_at = args.end.as_deref().map(parse_datetime).transpose()?;

    let draft = AppointmentDraft {
        title: args.title.clone(),
        description: args.description.clone(),
        location: args.location.clone(),
        start_at,
        end_at,
        all_day,
        color: args.color.clone(),
    };

    let mut coordinator = Coordinator::new(remote);

    match args.every.as_deref() {
        None => {
            let entry = coordinator.create(draft).await?;
            println!("{} {}", "Created".green(), entry.title);
        }
        Some(freq) => {
            let rule = build_rule(freq, &args)?;
            let entries = coordinator.create_recurring(draft, &rule).await?;
            println!(
                "{} {} occurrences of {}",
                "Created".green(),
                entries.len(),
                args.title,
            );
        }
    }

    Ok(())
}

fn build_rule(freq: &str, args: &NewArgs) -> Result<RecurrenceRule> {
    let freq = match freq {
        "daily" => Frequency::Daily,
        "weekly" => Frequency::Weekly,
        "monthly" => Frequency::Monthly,
        other => bail!("Unknown frequency '{other}'. Expected daily, weekly, or monthly"),
    };

    let termination = match (args.count, args.until.as_deref()) {
        (Some(count), None) => Termination::Count(count),
        (None, Some(until)) => {
            // The named day is the last possible occurrence date
            let day_end = local_day_end(
                chrono::NaiveDate::parse_from_str(until, "%Y-%m-%d")
                    .map_err(|_| anyhow!("Invalid --until date '{until}'. Expected YYYY-MM-DD"))?,
            );
            Termination::Until(day_end - Duration::seconds(1))
        }
        (None, None) => bail!("A recurring appointment needs --count or --until"),
        (Some(_), Some(_)) => unreachable!("clap enforces the conflict"),
    };

    Ok(RecurrenceRule {
        freq,
        interval: args.interval,
        termination,
        by_weekday: args.on.as_deref().map(parse_weekdays).transpose()?.unwrap_or_default(),
    })
}

fn parse_weekdays(s: &str) -> Result<BTreeSet<u8>> {
    s.split(',')
        .map(|day| match day.trim().to_lowercase().as_str() {
            "sun" => Ok(0),
            "mon" => Ok(1),
            "tue" => Ok(2),
            "wed" => Ok(3),
            "thu" => Ok(4),
            "fri" => Ok(5),
            "sat" => Ok(6),
            other => Err(anyhow!("Unknown weekday '{other}'")),
        })
        .collect()
}
