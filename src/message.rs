//! GELF message representation.
//!
//! `GelfMessage` is the default record type delivered by the sender. It
//! captures a timestamp at construction, carries the GELF 1.1 core fields, and
//! serialises to JSON with additional fields flattened as `_name` keys.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::SenderError,
    framing::{DEFAULT_MAX_FRAME_SIZE, FrameFormat},
    level::GelfLevel,
    record::GelfRecord,
};

const GELF_VERSION: &str = "1.1";

#[derive(Clone, Debug, Serialize)]
pub struct GelfMessage {
    version: &'static str,
    /// Name of the host, source, or application that sent the message.
    pub host: String,
    /// Short descriptive message.
    pub short_message: String,
    /// Long message, e.g. a backtrace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_message: Option<String>,
    /// Seconds since the UNIX epoch with millisecond precision.
    pub timestamp: f64,
    /// Syslog severity, also used as the delivery priority.
    pub level: GelfLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(flatten)]
    additional: BTreeMap<String, Value>,
    #[serde(skip)]
    framing: FrameFormat,
    #[serde(skip)]
    max_frame_size: usize,
}

fn now_timestamp() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

impl GelfMessage {
    /// Construct a message from `host`, `level`, and `short_message`.
    pub fn new(host: &str, level: GelfLevel, short_message: &str) -> Self {
        Self {
            version: GELF_VERSION,
            host: host.to_owned(),
            short_message: short_message.to_owned(),
            full_message: None,
            timestamp: now_timestamp(),
            level,
            facility: None,
            file: None,
            line: None,
            additional: BTreeMap::new(),
            framing: FrameFormat::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    pub fn with_full_message(mut self, full_message: impl Into<String>) -> Self {
        self.full_message = Some(full_message.into());
        self
    }

    pub fn with_facility(mut self, facility: impl Into<String>) -> Self {
        self.facility = Some(facility.into());
        self
    }

    /// Attach the source location of the log call.
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Attach an additional field. A leading underscore is added if missing.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        let key = if key.starts_with('_') {
            key.to_owned()
        } else {
            format!("_{key}")
        };
        self.additional.insert(key, value.into());
        self
    }

    /// Select the frame delimiter used by [`GelfRecord::to_frame`].
    pub fn with_framing(mut self, framing: FrameFormat) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Additional `_`-prefixed fields attached to the message.
    pub fn additional_fields(&self) -> &BTreeMap<String, Value> {
        &self.additional
    }

    /// Serialise the message into a GELF JSON payload.
    pub fn to_json(&self) -> Result<Vec<u8>, SenderError> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl GelfRecord for GelfMessage {
    fn priority(&self) -> u32 {
        u32::from(self.level.as_u8())
    }

    fn is_valid(&self) -> bool {
        !self.host.trim().is_empty()
            && !self.short_message.trim().is_empty()
            && !self.additional.contains_key("_id")
    }

    fn to_frame(&self) -> Result<Vec<u8>, SenderError> {
        let payload = self.to_json()?;
        self.framing.frame(&payload, self.max_frame_size)
    }
}

impl fmt::Display for GelfMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.host, self.level, self.short_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn decode(frame: &[u8]) -> Value {
        let (terminator, payload) = frame.split_last().expect("frame not empty");
        assert_eq!(*terminator, 0);
        serde_json::from_slice(payload).expect("decode payload")
    }

    #[rstest]
    fn frame_carries_core_fields() {
        let message = GelfMessage::new("web-1", GelfLevel::Error, "disk full")
            .with_full_message("no space left on /var")
            .with_location("src/disk.rs", 42);
        let json = decode(&message.to_frame().expect("frame"));
        assert_eq!(json["version"], "1.1");
        assert_eq!(json["host"], "web-1");
        assert_eq!(json["short_message"], "disk full");
        assert_eq!(json["full_message"], "no space left on /var");
        assert_eq!(json["level"], 3);
        assert_eq!(json["line"], 42);
        assert!(json["timestamp"].as_f64().expect("numeric timestamp") > 0.0);
        assert!(json.get("facility").is_none());
    }

    #[rstest]
    fn additional_fields_are_prefixed_and_flattened() {
        let message = GelfMessage::new("web-1", GelfLevel::Notice, "login")
            .with_field("user", "ada")
            .with_field("_attempts", 3);
        let json = decode(&message.to_frame().expect("frame"));
        assert_eq!(json["_user"], "ada");
        assert_eq!(json["_attempts"], 3);
    }

    #[rstest]
    #[case("", "msg")]
    #[case("host", "   ")]
    fn blank_core_fields_are_invalid(#[case] host: &str, #[case] short: &str) {
        assert!(!GelfMessage::new(host, GelfLevel::Informational, short).is_valid());
    }

    #[rstest]
    fn reserved_id_field_is_invalid() {
        let message = GelfMessage::new("h", GelfLevel::Informational, "m").with_field("id", 1);
        assert!(!message.is_valid());
    }

    #[rstest]
    fn priority_follows_level() {
        let message = GelfMessage::new("h", GelfLevel::Alert, "m");
        assert_eq!(message.priority(), 1);
    }

    #[rstest]
    fn length_prefixed_framing_is_selectable() {
        let message = GelfMessage::new("h", GelfLevel::Debug, "m")
            .with_framing(FrameFormat::LengthPrefixed);
        let frame = message.to_frame().expect("frame");
        let len = u32::from_be_bytes(frame[..4].try_into().expect("prefix")) as usize;
        assert_eq!(len, frame.len() - 4);
    }

    #[rstest]
    fn oversized_message_is_rejected() {
        let message = GelfMessage::new("h", GelfLevel::Debug, &"x".repeat(64))
            .with_max_frame_size(16);
        assert!(matches!(
            message.to_frame(),
            Err(SenderError::FrameTooLarge { max: 16, .. })
        ));
    }
}
