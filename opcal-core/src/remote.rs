//! Remote system-of-record surface.
//!
//! The engine consumes whatever transport the surrounding application
//! provides; this trait is that opaque request/response boundary. The
//! production implementation is [`crate::transport::ProviderRemote`];
//! tests substitute in-memory fakes.

use std::future::Future;

use crate::error::OpcalResult;
use crate::range::DateRange;
use crate::record::{AppointmentDraft, AppointmentRecord, InboxRecord, RangeSnapshot};

/// Minimum required surface of the remote system of record.
///
/// Failures reject with a human-readable reason string, which the
/// mutation coordinator treats as authoritative.
pub trait RemoteCalendar {
    /// Appointments and activations overlapping `[from, to)`.
    fn range_query(
        &self,
        range: &DateRange,
    ) -> impl Future<Output = OpcalResult<RangeSnapshot>> + Send;

    fn create_appointment(
        &self,
        draft: &AppointmentDraft,
    ) -> impl Future<Output = OpcalResult<AppointmentRecord>> + Send;

    fn update_appointment(
        &self,
        id: &str,
        draft: &AppointmentDraft,
    ) -> impl Future<Output = OpcalResult<AppointmentRecord>> + Send;

    fn delete_appointment(&self, id: &str) -> impl Future<Output = OpcalResult<()>> + Send;

    /// One page of the remote notification inbox.
    fn list_notifications(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = OpcalResult<Vec<InboxRecord>>> + Send;

    fn mark_notification_read(&self, id: &str) -> impl Future<Output = OpcalResult<()>> + Send;

    fn mark_all_notifications_read(&self) -> impl Future<Output = OpcalResult<()>> + Send;
}
