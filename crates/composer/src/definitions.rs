//! Metric names recorded when the `metrics` feature is enabled.

/// Delivered messages, labelled by `kind`.
pub const MESSAGES_SENT_TOTAL: &str = "courier_messages_sent_total";
/// Failed compose-and-send calls, labelled by `kind` and `stage`.
pub const SEND_FAILURES_TOTAL: &str = "courier_send_failures_total";
/// Thumbnails that failed and were dropped from the message.
pub const THUMBNAIL_FAILURES_TOTAL: &str = "courier_thumbnail_failures_total";
/// Wall time of a compose-and-send call in seconds.
pub const SEND_DURATION_SECONDS: &str = "courier_send_duration_seconds";
/// Bytes handed to the transport for upload, labelled by `kind`.
pub const UPLOAD_BYTES_TOTAL: &str = "courier_upload_bytes_total";

/// Common label keys.
pub mod labels {
    pub const KIND: &str = "kind";
    pub const STAGE: &str = "stage";
}
