use anyhow::Result;
use opcal_core::coordinator::{Coordinator, MutationOutcome};
use opcal_core::range::DateRange;
use opcal_core::transport::ProviderRemote;
use owo_colors::OwoColorize;

pub async fn run(remote: ProviderRemote, id: &str) -> Result<()> {
    let mut coordinator = Coordinator::new(remote);
    coordinator.load(DateRange::default()).await?;

    match coordinator.delete(id).await? {
        MutationOutcome::Applied(entry) => {
            println!("{} {}", "Deleted".red(), entry.title);
        }
        MutationOutcome::Ignored => {
            println!("{}", "Entry is not editable, nothing changed".dimmed());
        }
    }
    Ok(())
}
