use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    pub message: String,
    pub online: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a local collection changed; clients re-fetch it.
pub struct CollectionChangedEvent {
    pub collection: String,
    pub revision: u64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the connectivity gate flips.
pub struct ConnectivityEvent {
    pub online: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Human-readable sync problem worth showing to the user.
pub struct SyncNoticeEvent {
    pub collection: String,
    pub message: String,
}
