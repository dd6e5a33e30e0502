//! Session identifiers for log and payload correlation

use time::macros::format_description;
use time::OffsetDateTime;
use uuid::Uuid;

/// `session_YYYYMMDD_HHMMSS_<8 hex>` from the current UTC time
pub fn generate_session_id() -> String {
    session_id_at(OffsetDateTime::now_utc(), Uuid::new_v4())
}

pub fn session_id_at(started: OffsetDateTime, nonce: Uuid) -> String {
    let format = format_description!("[year][month][day]_[hour][minute][second]");
    let stamp = started
        .format(&format)
        .unwrap_or_else(|_| String::from("00000000_000000"));
    let hex = nonce.simple().to_string();
    format!("session_{}_{}", stamp, &hex[..8])
}
