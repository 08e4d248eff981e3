//! Inbound envelope and outbound command models.

use leptos::logging::warn;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::tree::{is_truthy, loosely_equals, scalar_text};

/// JSON mapping used for every keyed section.
pub type JsonMap = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// One message exchanged over the control channel.
///
/// Sections whose shape does not match are dropped on their own; only malformed JSON fails the
/// whole frame.
pub struct Envelope {
    /// Nested values applied to the view tree.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub data: Option<JsonMap>,
    /// `data-id` attribute value → display string.
    #[serde(
        rename = "data-id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub data_id: Option<JsonMap>,
    /// Session configuration values.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub js: Option<JsonMap>,
    /// Handler payload (`JS.listdir` for directory listings).
    #[serde(
        rename = "JS",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub payload: Option<JsonMap>,
    /// Transient user notification.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub response: Option<ResponseNotice>,
    /// Routing metadata.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub cmd: Option<Command>,
    /// Unknown sections, passed through to handlers.
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl Envelope {
    /// Parses a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed frames.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Whether `cmd.highlight` was requested.
    pub fn highlight(&self) -> bool {
        self.cmd
            .as_ref()
            .and_then(|cmd| cmd.highlight)
            .unwrap_or(false)
    }

    /// `cmd.callbackFn`, if any.
    pub fn callback_name(&self) -> Option<&str> {
        self.cmd.as_ref().and_then(|cmd| cmd.callback_fn.as_deref())
    }

    /// Reads one entry of the `JS` section.
    pub fn payload_entry(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|payload| payload.get(key))
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(section) => Ok(Some(section)),
        Err(err) => {
            warn!("ignoring envelope section: {err}");
            Ok(None)
        }
    }
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Value::deserialize(deserializer).map(|value| Some(is_truthy(&value)))
}

fn display_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|value| match value {
        Value::Null => String::new(),
        other => scalar_text(&other),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// `{status, text}` notification carried by an envelope.
pub struct ResponseNotice {
    /// `1` for success, `0` for error, compared loosely (`"1"` and `true` count as `1`).
    #[serde(default)]
    pub status: Value,
    /// Message shown to the user.
    #[serde(default, deserialize_with = "display_text")]
    pub text: String,
}

impl ResponseNotice {
    /// `Some(true)` for a success status, `Some(false)` for an error status, `None` when the
    /// status is neither and no notice should be shown.
    pub fn outcome(&self) -> Option<bool> {
        if loosely_equals(&self.status, 1.0) {
            Some(true)
        } else if loosely_equals(&self.status, 0.0) {
            Some(false)
        } else {
            None
        }
    }

    /// Whether the notice reports success.
    pub fn is_ok(&self) -> bool {
        self.outcome() == Some(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// `cmd` section. Absent fields are omitted from serialized output.
pub struct Command {
    /// Top-level action, e.g. `handlefiles`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Action detail, e.g. `listDir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subaction: Option<String>,
    /// Response handler name echoed back by the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_fn: Option<String>,
    /// Highlight request for the response. Any truthy value enables it.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "truthy")]
    pub highlight: Option<bool>,
    /// Directory a listing starts at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startpath: Option<String>,
    /// File operated on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Folder operated on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foldername: Option<String>,
    /// Any other field.
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl Command {
    /// Starts a command with `action` and `subaction`.
    pub fn new(action: impl Into<String>, subaction: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            subaction: Some(subaction.into()),
            ..Self::default()
        }
    }

    /// Names the handler the response should be routed to.
    pub fn with_callback(mut self, kind: ResponseKind) -> Self {
        self.callback_fn = Some(kind.callback_name().to_string());
        self
    }

    /// Sets `startpath`.
    pub fn with_startpath(mut self, path: impl Into<String>) -> Self {
        self.startpath = Some(path.into());
        self
    }

    /// Sets `filename`.
    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }

    /// Sets `foldername`.
    pub fn with_foldername(mut self, name: impl Into<String>) -> Self {
        self.foldername = Some(name.into());
        self
    }

    /// Wraps the command as an outbound `{cmd: ...}` message.
    pub fn into_message(self) -> OutboundMessage {
        OutboundMessage { cmd: self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Outbound `{cmd}` frame.
pub struct OutboundMessage {
    /// Command body.
    pub cmd: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Closed set of response handlers a `callbackFn` may name.
pub enum ResponseKind {
    /// Directory listing for the file manager.
    Files,
}

impl ResponseKind {
    /// Every known kind.
    pub const ALL: [ResponseKind; 1] = [ResponseKind::Files];

    /// Wire name used in `cmd.callbackFn`.
    pub const fn callback_name(self) -> &'static str {
        match self {
            Self::Files => "files_Callback",
        }
    }

    /// Looks up a kind by its wire name.
    pub fn from_callback_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.callback_name() == name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_parses_every_section_and_keeps_unknown_ones() {
        let raw = json!({
            "data": {"a": 1},
            "data-id": {"InverterSN.value": "1234"},
            "js": {"gpio": [1, 2]},
            "JS": {"listdir": []},
            "response": {"status": 1, "text": "ok"},
            "cmd": {"action": "handlefiles", "callbackFn": "files_Callback", "highlight": true},
            "custom": {"x": 1}
        })
        .to_string();

        let envelope = Envelope::parse(&raw).expect("parse");
        assert_eq!(envelope.data_id.as_ref().map(|m| m.len()), Some(1));
        assert!(envelope.highlight());
        assert_eq!(envelope.callback_name(), Some("files_Callback"));
        assert_eq!(envelope.payload_entry("listdir"), Some(&json!([])));
        assert_eq!(envelope.extra.get("custom"), Some(&json!({"x": 1})));
        assert!(envelope.response.as_ref().is_some_and(ResponseNotice::is_ok));
    }

    #[test]
    fn off_type_fields_are_read_loosely() {
        let envelope = Envelope::parse(
            r#"{"cmd":{"highlight":1},"response":{"status":"1","text":42}}"#,
        )
        .expect("parse");
        assert!(envelope.highlight());
        let response = envelope.response.expect("response");
        assert_eq!(response.outcome(), Some(true));
        assert_eq!(response.text, "42");

        let envelope = Envelope::parse(r#"{"cmd":{"highlight":""},"response":{"text":"ok"}}"#)
            .expect("parse");
        assert!(!envelope.highlight());
        assert_eq!(envelope.response.and_then(|r| r.outcome()), None);

        let envelope = Envelope::parse(r#"{"response":{"status":"0"}}"#).expect("parse");
        assert_eq!(envelope.response.and_then(|r| r.outcome()), Some(false));
    }

    #[test]
    fn mismatched_sections_are_dropped_alone() {
        let envelope = Envelope::parse(
            r#"{"data":{"a":1},"response":"done","cmd":{"callbackFn":7},"js":[1]}"#,
        )
        .expect("parse");
        assert_eq!(envelope.data.map(|data| data.len()), Some(1));
        assert_eq!(envelope.response, None);
        assert_eq!(envelope.cmd, None);
        assert_eq!(envelope.js, None);
    }

    #[test]
    fn outbound_command_omits_absent_fields() {
        let message = Command::new("handlefiles", "listDir")
            .with_startpath("/")
            .with_callback(ResponseKind::Files)
            .into_message();
        assert_eq!(
            serde_json::to_value(&message).expect("serialize"),
            json!({"cmd": {
                "action": "handlefiles",
                "subaction": "listDir",
                "callbackFn": "files_Callback",
                "startpath": "/"
            }})
        );

        let bare = Command::new("handlefiles", "deleteFile").with_filename("/a.txt");
        assert_eq!(
            serde_json::to_value(&bare).expect("serialize"),
            json!({"action": "handlefiles", "subaction": "deleteFile", "filename": "/a.txt"})
        );
    }

    #[test]
    fn response_kinds_round_trip_by_name() {
        assert_eq!(
            ResponseKind::from_callback_name("files_Callback"),
            Some(ResponseKind::Files)
        );
        assert_eq!(ResponseKind::from_callback_name("unknown_Callback"), None);
    }
}
