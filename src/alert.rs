//! Desktop alert delivery for fired reminders.
//!
//! A reminder always lands in the in-app notification list; when the
//! operator opts in, it additionally surfaces as a desktop notification
//! so a firing is noticed even while the terminal is in the background.
//! A failed delivery degrades to the terminal bell.

use notify_rust::Notification;
use opcal_core::notify::NotificationRecord;
use tracing::debug;

pub fn deliver(record: &NotificationRecord, privacy: bool) {
    let body = alert_body(record, privacy);
    let shown = Notification::new()
        .appname("opcal")
        .summary(&record.title)
        .body(&body)
        .show();
    if let Err(e) = shown {
        debug!("desktop notification failed, ringing terminal bell instead: {e}");
        print!("\x07");
    }
}

/// Privacy mode masks the alert body the same way rendered output is
/// masked; the title stays visible so the alert is still actionable.
fn alert_body(record: &NotificationRecord, privacy: bool) -> String {
    if privacy {
        crate::render::mask(&record.message)
    } else {
        record.message.clone()
    }
}
