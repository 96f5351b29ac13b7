use serde::Serialize;
use std::fmt::Display;

/// `event:` name of notification frames.
pub const NOTIFICATION_EVENT: &str = "notification";

/// Comment frame sent while idle; clients ignore it.
pub const HEARTBEAT_FRAME: &str = ": keep-alive\n\n";

pub const CONTENT_TYPE: &str = "text/event-stream";

/// Render one event-stream frame:
///
/// ```text
/// id: <id>
/// event: notification
/// data: <json>
///
/// ```
pub fn encode<T: Serialize>(id: impl Display, payload: &T) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string(payload)?;
    Ok(format!(
        "id: {}\nevent: {}\ndata: {}\n\n",
        id, NOTIFICATION_EVENT, data
    ))
}
