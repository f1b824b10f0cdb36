use anyhow::Result;
use chrono::Utc;
use opcal_core::notify::NotificationCenter;
use opcal_core::remote::RemoteCalendar;
use opcal_core::settings::SharedSettings;
use opcal_core::transport::ProviderRemote;
use owo_colors::OwoColorize;

use crate::render;

const PAGE_SIZE: u32 = 50;

pub async fn run(
    remote: ProviderRemote,
    mark_read: Option<&str>,
    mark_all_read: bool,
) -> Result<()> {
    if let Some(id) = mark_read {
        remote.mark_notification_read(id).await?;
    }
    if mark_all_read {
        remote.mark_all_notifications_read().await?;
    }

    let settings = SharedSettings::load()?;
    let privacy = settings.current().privacy_mode;

    let mut center = NotificationCenter::new();
    center.ingest_remote(remote.list_notifications(1, PAGE_SIZE).await?);
    center.prune(Utc::now());

    if center.records().is_empty() {
        println!("{}", "Inbox is empty".dimmed());
        return Ok(());
    }

    println!("{} unread", center.unread_count().bold());
    println!();
    for record in center.records() {
        let line = render::notification_line(record, privacy);
        if record.is_read {
            println!("{}", line.dimmed());
        } else {
            println!("{line}");
        }
    }

    Ok(())
}
