use anyhow::Result;
use opcal_core::coordinator::{Coordinator, MutationOutcome};
use opcal_core::range::DateRange;
use opcal_core::transport::ProviderRemote;
use owo_colors::OwoColorize;

use super::parse_datetime;

pub async fn run(
    remote: ProviderRemote,
    id: &str,
    start: &str,
    end: Option<&str>,
    all_day: bool,
) -> Result<()> {
    let start_at = parse_datetime(start)?;
    let end_at = end.map(parse_datetime).transpose()?;

    let mut coordinator = Coordinator::new(remote);
    coordinator.load(DateRange::default()).await?;

    match coordinator.move_entry(id, start_at, end_at, all_day).await {
        Ok(MutationOutcome::Applied(entry)) => {
            println!("{} {}", "Moved".green(), entry.title);
            Ok(())
        }
        Ok(MutationOutcome::Ignored) => {
            println!("{}", "Entry is not editable, nothing changed".dimmed());
            Ok(())
        }
        Err(e) => {
            // The coordinator already reloaded ground truth
            eprintln!("{} {}", "Move rejected:".red(), e);
            eprintln!("{}", "The calendar was reloaded from the remote".dimmed());
            Err(e.into())
        }
    }
}
