use anyhow::{Result, anyhow};
use chrono::Utc;
use opcal_core::agenda::{self, AgendaFilter, SortDirection};
use opcal_core::coordinator::Coordinator;
use opcal_core::range::DateRange;
use opcal_core::settings::SharedSettings;
use opcal_core::transport::ProviderRemote;
use owo_colors::OwoColorize;

use crate::render;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    remote: ProviderRemote,
    from: Option<&str>,
    to: Option<&str>,
    query: String,
    only_all_day: bool,
    only_with_location: bool,
    no_activations: bool,
    descending: bool,
) -> Result<()> {
    let range = DateRange::from_args(from, to).map_err(|e| anyhow!(e))?;
    let settings = SharedSettings::load()?;
    let privacy = settings.current().privacy_mode;

    let mut coordinator = Coordinator::new(remote);
    coordinator.load(range).await?;

    let filter = AgendaFilter {
        query,
        only_all_day,
        only_with_location,
        show_activations: !no_activations,
    };
    let visible = agenda::filter(coordinator.entries(), &filter);

    if visible.is_empty() {
        println!("{}", "No entries found".dimmed());
        return Ok(());
    }

    let now = Utc::now();
    println!("{}", render::rollup_line(&agenda::rollup(&visible, now)));
    println!();

    let direction = if descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };

    let groups = agenda::group_by_day(&visible);
    let days: Vec<_> = match direction {
        SortDirection::Ascending => groups.iter().collect(),
        SortDirection::Descending => groups.iter().rev().collect(),
    };

    for (i, (day, entries)) in days.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let label = render::date_label(**day);
        if entries.iter().all(|e| e.is_past(now)) {
            println!("{}", label.dimmed());
        } else {
            println!("{}", label.bold());
        }
        for entry in *entries {
            println!("{}", render::entry_line(entry, privacy));
        }
    }

    Ok(())
}
