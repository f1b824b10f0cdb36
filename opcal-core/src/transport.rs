//! Subprocess transport to the remote system of record.
//!
//! Speaks JSON over stdin/stdout with an external transport binary
//! (e.g. `opcal-remote-crm`). The protocol is language-agnostic: any
//! executable that answers these commands can back the calendar. The
//! binary manages its own credentials and sessions; the engine only
//! passes request parameters through.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as ProcessCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::constants::TRANSPORT_TIMEOUT_SECONDS;
use crate::error::{OpcalError, OpcalResult};
use crate::range::DateRange;
use crate::record::{AppointmentDraft, AppointmentRecord, InboxRecord, RangeSnapshot};
use crate::remote::RemoteCalendar;

/// Commands a transport binary must implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    RangeQuery,
    CreateAppointment,
    UpdateAppointment,
    DeleteAppointment,
    ListNotifications,
    MarkNotificationRead,
    MarkAllNotificationsRead,
}

/// Request sent from the engine to the transport binary.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from the transport binary to the engine.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// Remote calendar backed by an external transport binary found in PATH.
#[derive(Clone)]
pub struct ProviderRemote {
    name: String,
}

impl ProviderRemote {
    pub fn from_name(name: &str) -> Self {
        ProviderRemote {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn binary_path(&self) -> OpcalResult<std::path::PathBuf> {
        let binary_name = format!("opcal-remote-{}", self.name);
        which::which(&binary_name)
            .map_err(|_| OpcalError::TransportNotInstalled(binary_name))
    }

    async fn call<R: DeserializeOwned>(
        &self,
        command: Command,
        params: serde_json::Value,
    ) -> OpcalResult<R> {
        let limit = Duration::from_secs(TRANSPORT_TIMEOUT_SECONDS);
        timeout(limit, self.call_inner(command, params))
            .await
            .map_err(|_| OpcalError::TransportTimeout(TRANSPORT_TIMEOUT_SECONDS))?
    }

    async fn call_inner<R: DeserializeOwned>(
        &self,
        command: Command,
        params: serde_json::Value,
    ) -> OpcalResult<R> {
        let binary_path = self.binary_path()?;
        let mut payload = serde_json::to_vec(&Request { command, params })
            .map_err(|e| OpcalError::Serialization(e.to_string()))?;
        payload.push(b'\n');

        debug!(binary = %binary_path.display(), ?command, "calling remote transport");

        let mut child = ProcessCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|e| {
                OpcalError::Transport(format!("Could not spawn {}: {e}", binary_path.display()))
            })?;

        // The request goes out over stdin; closing it signals the
        // binary that the line is complete.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(OpcalError::Transport(format!(
                "Transport exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        decode_response(&output.stdout)
    }
}

fn decode_response<R: DeserializeOwned>(stdout: &[u8]) -> OpcalResult<R> {
    if stdout.is_empty() {
        return Err(OpcalError::Transport("Transport returned no response".into()));
    }
    let response: Response<R> = serde_json::from_slice(stdout)
        .map_err(|e| OpcalError::Transport(format!("Unparseable transport response: {e}")))?;
    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error } => Err(OpcalError::Transport(error)),
    }
}

impl RemoteCalendar for ProviderRemote {
    async fn range_query(&self, range: &DateRange) -> OpcalResult<RangeSnapshot> {
        self.call(
            Command::RangeQuery,
            serde_json::json!({
                "from": range.from_rfc3339(),
                "to": range.to_rfc3339(),
            }),
        )
        .await
    }

    async fn create_appointment(&self, draft: &AppointmentDraft) -> OpcalResult<AppointmentRecord> {
        let params = serde_json::json!({ "appointment": to_value(draft)? });
        self.call(Command::CreateAppointment, params).await
    }

    async fn update_appointment(
        &self,
        id: &str,
        draft: &AppointmentDraft,
    ) -> OpcalResult<AppointmentRecord> {
        let params = serde_json::json!({ "id": id, "appointment": to_value(draft)? });
        self.call(Command::UpdateAppointment, params).await
    }

    async fn delete_appointment(&self, id: &str) -> OpcalResult<()> {
        self.call(Command::DeleteAppointment, serde_json::json!({ "id": id }))
            .await
    }

    async fn list_notifications(&self, page: u32, page_size: u32) -> OpcalResult<Vec<InboxRecord>> {
        self.call(
            Command::ListNotifications,
            serde_json::json!({ "page": page, "pageSize": page_size }),
        )
        .await
    }

    async fn mark_notification_read(&self, id: &str) -> OpcalResult<()> {
        self.call(Command::MarkNotificationRead, serde_json::json!({ "id": id }))
            .await
    }

    async fn mark_all_notifications_read(&self) -> OpcalResult<()> {
        self.call(Command::MarkAllNotificationsRead, serde_json::json!({}))
            .await
    }
}

fn to_value<T: Serialize>(value: &T) -> OpcalResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| OpcalError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parses_success_and_error() {
        let ok: Response<Vec<String>> =
            serde_json::from_str(r#"{"status": "success", "data": ["a"]}"#).unwrap();
        assert!(matches!(ok, Response::Success { data } if data == vec!["a"]));

        let err: Response<Vec<String>> =
            serde_json::from_str(r#"{"status": "error", "error": "no session"}"#).unwrap();
        assert!(matches!(err, Response::Error { error } if error == "no session"));
    }

    #[test]
    fn test_decode_response_rejects_empty_and_garbage_output() {
        let empty = decode_response::<Vec<String>>(b"");
        assert!(matches!(empty, Err(OpcalError::Transport(_))));

        let garbage = decode_response::<Vec<String>>(b"not json");
        assert!(matches!(garbage, Err(OpcalError::Transport(_))));

        // A trailing newline from the binary is tolerated.
        let data: Vec<String> = decode_response(b"{\"status\": \"success\", \"data\": []}\n").unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_request_serializes_snake_case_command() {
        let request = Request {
            command: Command::RangeQuery,
            params: serde_json::json!({ "from": "2026-03-02T00:00:00Z" }),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""command":"range_query""#));
    }
}
