use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use opcal_core::constants::PRUNE_TICK_SECONDS;
use opcal_core::coordinator::Coordinator;
use opcal_core::notify::NotificationCenter;
use opcal_core::range::DateRange;
use opcal_core::reminder::{ReminderConfig, ReminderScheduler};
use opcal_core::settings::SharedSettings;
use opcal_core::transport::ProviderRemote;
use owo_colors::OwoColorize;
use tokio::sync::mpsc;
use tracing::warn;

use crate::alert;
use crate::render;

/// Long-running reminder loop: parks on the reminder sink and a periodic
/// tick. Every tick prunes the notification list, re-reads the settings
/// store (so a privacy toggle in another process reaches this view) and
/// reloads the window, rebuilding the reminder timers against the fresh
/// entry set (cancel-then-reschedule, so no timers leak across the
/// rebuild).
pub async fn run(remote: ProviderRemote, remind: &str, system_alerts: bool) -> Result<()> {
    let minutes_before = parse_lead_times(remind);
    let config = ReminderConfig {
        minutes_before,
        allow_system_alert: system_alerts,
    };

    let settings = SharedSettings::load()?;
    let mut settings_rx = settings.subscribe();

    let mut coordinator = Coordinator::new(remote);
    coordinator.load(DateRange::default()).await?;

    let scheduler = ReminderScheduler::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut guard = scheduler.schedule(coordinator.entries(), &tx, &config);
    let mut center = NotificationCenter::new();

    println!(
        "{} {} entries loaded, reminding {} min ahead",
        "Watching:".bold(),
        coordinator.entries().len(),
        config
            .minutes_before
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("/"),
    );

    let mut tick = tokio::time::interval(Duration::from_secs(PRUNE_TICK_SECONDS));
    tick.tick().await; // first tick completes immediately

    loop {
        tokio::select! {
            Some(record) = rx.recv() => {
                let privacy = settings_rx.borrow_and_update().privacy_mode;
                println!("{}", render::notification_line(&record, privacy));
                if config.allow_system_alert {
                    alert::deliver(&record, privacy);
                }
                center.push_local(record);
            }
            _ = tick.tick() => {
                center.prune(Utc::now());
                if let Err(e) = settings.refresh() {
                    warn!("settings refresh failed, keeping last known state: {e}");
                }
                match coordinator.reload().await {
                    Ok(()) => {
                        guard.cancel();
                        guard = scheduler.schedule(coordinator.entries(), &tx, &config);
                    }
                    Err(e) => warn!("window reload failed, keeping current timers: {e}"),
                }
            }
        }
    }
}

/// Parse "15,5" into lead times; unparseable items are dropped rather
/// than failing the loop.
fn parse_lead_times(s: &str) -> Vec<i64> {
    s.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lead_times_drops_garbage() {
        assert_eq!(parse_lead_times("15, 5"), vec![15, 5]);
        assert_eq!(parse_lead_times("15,soon,5"), vec![15, 5]);
        assert!(parse_lead_times("").is_empty());
    }
}
