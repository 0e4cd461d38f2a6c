// Wire models for the firewall REST API
//
// The appliance is loose with types: booleans arrive as "1"/"0" strings or
// as numbers, option fields arrive as `{key: {value, selected}}` maps, and
// a missing object is often an empty array. Everything here is normalized
// at parse time so nothing above this module branches on raw JSON.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

// ── Tri-state enabled flag ──────────────────────────────────────────

/// Enabled state of a remote object.
///
/// `Unknown` covers an absent object, a missing field, and any value that
/// is not one of the recognized boolean encodings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleState {
    Enabled,
    Disabled,
    #[default]
    Unknown,
}

impl RuleState {
    /// Normalize the appliance's boolean encodings.
    ///
    /// Accepts `"1"`, `"0"`, `1`, `0`, `true` and `false`. Everything else,
    /// including an absent field, is `Unknown`.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => match s.trim() {
                "1" => Self::Enabled,
                "0" => Self::Disabled,
                _ => Self::Unknown,
            },
            Some(Value::Number(n)) => match n.as_u64() {
                Some(1) => Self::Enabled,
                Some(0) => Self::Disabled,
                _ => Self::Unknown,
            },
            Some(Value::Bool(true)) => Self::Enabled,
            Some(Value::Bool(false)) => Self::Disabled,
            _ => Self::Unknown,
        }
    }

    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::Enabled } else { Self::Disabled }
    }
}

impl<'de> Deserialize<'de> for RuleState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(Self::from_json(value.as_ref()))
    }
}

/// Accept strings, numbers, booleans and null as a `String`.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(flatten_field).unwrap_or_default())
}

// ── Search envelope ─────────────────────────────────────────────────

/// Paged search response (`searchRule`, `searchItem`).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage<T> {
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
    #[serde(default, rename = "rowCount")]
    pub row_count: i64,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub current: i64,
}

// ── Filter rules ────────────────────────────────────────────────────

/// One row of `GET /api/firewall/filter/searchRule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRule {
    pub uuid: String,
    #[serde(default)]
    pub enabled: RuleState,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
}

/// The `rule` object of `GET /api/firewall/filter/getRule/{uuid}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDetail {
    pub state: RuleState,
    pub description: Option<String>,
}

impl RuleDetail {
    /// Extract the rule from a detail response.
    ///
    /// Returns `None` when the body has no `rule` object, which is how the
    /// appliance answers for a uuid that no longer exists.
    pub fn from_response(body: &Value) -> Option<Self> {
        let rule = body.get("rule")?.as_object()?;
        Some(Self {
            state: RuleState::from_json(rule.get("enabled")),
            description: rule
                .get("description")
                .map(flatten_field)
                .filter(|d| !d.is_empty()),
        })
    }
}

// ── Mutation responses ──────────────────────────────────────────────

/// Outcome reported in the body of a mutating call.
///
/// `toggleRule` answers `{"result":"Enabled","changed":true}`, `apply` and
/// `reconfigure` answer `{"status":"ok"}`, `set*` answers
/// `{"result":"saved"}` or `{"result":"failed","validations":{...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionStatus {
    pub result: Option<String>,
    pub status: Option<String>,
    pub changed: Option<bool>,
    pub validations: Option<String>,
}

impl ActionStatus {
    pub fn from_json(body: &Value) -> Self {
        let text = |key: &str| {
            body.get(key)
                .map(flatten_field)
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
        };

        let validations = body
            .get("validations")
            .and_then(Value::as_object)
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.iter()
                    .map(|(field, msg)| format!("{field}: {}", flatten_field(msg)))
                    .collect::<Vec<_>>()
                    .join("; ")
            });

        Self {
            result: text("result"),
            status: text("status"),
            changed: body.get("changed").and_then(Value::as_bool),
            validations,
        }
    }

    /// Whether the appliance reported that the call did not take effect.
    pub fn is_failure(&self) -> bool {
        let failed = |v: &Option<String>| {
            v.as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("failed") || s.eq_ignore_ascii_case("error"))
        };
        self.validations.is_some() || failed(&self.result) || failed(&self.status)
    }

    /// Short human-readable summary for diagnostics.
    pub fn summary(&self) -> String {
        if let Some(ref v) = self.validations {
            return format!("validation failed: {v}");
        }
        self.result
            .clone()
            .or_else(|| self.status.clone())
            .unwrap_or_else(|| "no status reported".into())
    }
}

// ── WireGuard ───────────────────────────────────────────────────────

/// Body for `POST /api/wireguard/general/set`.
pub fn wireguard_general_payload(enabled: bool) -> Value {
    json!({ "general": { "enabled": if enabled { "1" } else { "0" } } })
}

// ── Aliases ─────────────────────────────────────────────────────────

/// One row of `GET /api/firewall/alias/searchItem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSummary {
    pub uuid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub alias_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default)]
    pub enabled: RuleState,
}

/// Entry of `GET /api/firewall/alias/listNetworkAliases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkAlias {
    pub name: String,
    pub description: String,
}

impl NetworkAlias {
    /// The endpoint answers an object keyed by alias name.
    pub fn list_from_response(body: &Value) -> Vec<Self> {
        let Some(map) = body.as_object() else {
            return Vec::new();
        };
        map.iter()
            .map(|(key, entry)| Self {
                name: entry
                    .get("name")
                    .map(flatten_field)
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| key.clone()),
                description: entry.get("description").map(flatten_field).unwrap_or_default(),
            })
            .collect()
    }
}

/// Full alias definition as returned by `getItem` and sent to `setItem`.
///
/// `metadata` keeps every other field of the remote object (type, proto,
/// enabled, update frequency, ...) flattened to the plain values `setItem`
/// expects, so a write replaces the alias without losing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alias {
    pub uuid: String,
    pub name: String,
    pub content: Vec<String>,
    pub description: String,
    pub metadata: Map<String, Value>,
}

impl Alias {
    /// Parse a `getItem` response. `None` if the body carries no alias.
    pub fn from_item(uuid: &str, body: &Value) -> Option<Self> {
        let item = body.get("alias")?.as_object()?;

        let mut name = String::new();
        let mut content = Vec::new();
        let mut description = String::new();
        let mut metadata = Map::new();

        for (key, value) in item {
            match key.as_str() {
                "name" => name = flatten_field(value),
                "content" => content = content_entries(value),
                "description" => description = flatten_field(value),
                _ => {
                    metadata.insert(key.clone(), Value::String(flatten_field(value)));
                }
            }
        }

        // An unknown uuid yields the blank template rather than an error.
        if name.is_empty() {
            return None;
        }

        Some(Self {
            uuid: uuid.to_owned(),
            name,
            content,
            description,
            metadata,
        })
    }

    /// Build the full-replace `setItem` body.
    pub fn to_payload(&self) -> Value {
        let mut item = self.metadata.clone();
        item.insert("name".into(), Value::String(self.name.clone()));
        item.insert("content".into(), Value::String(self.content.join("\n")));
        item.insert("description".into(), Value::String(self.description.clone()));
        json!({ "alias": item })
    }
}

/// Flatten a remote field to the plain string form `setItem` accepts.
///
/// Option maps (`{key: {value, selected}}`) collapse to their selected keys,
/// comma-joined.
pub(crate) fn flatten_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(flatten_field)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(options) => options
            .iter()
            .filter(|(_, opt)| is_selected(opt))
            .map(|(key, _)| key.as_str())
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// Alias members in remote order.
///
/// The content field is either a separator-joined string or an option map
/// of members.
fn content_entries(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(['\n', ','])
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_owned)
            .collect(),
        Value::Array(items) => items.iter().flat_map(content_entries).collect(),
        Value::Object(options) => options
            .iter()
            .filter(|(_, opt)| opt.get("selected").is_none() || is_selected(opt))
            .map(|(key, _)| key.clone())
            .filter(|k| !k.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn is_selected(option: &Value) -> bool {
    match option.get("selected") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        Some(Value::String(s)) => s == "1",
        _ => false,
    }
}

// ── Diagnostics ─────────────────────────────────────────────────────

/// One row of `GET /api/diagnostics/interface/getArp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArpEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hostname: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mac: String,
    #[serde(default, rename = "intf", deserialize_with = "lenient_string")]
    pub interface: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub intf_description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub manufacturer: String,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub permanent: bool,
}

/// Addresses removed by `POST /api/diagnostics/interface/flushArp`.
///
/// The endpoint answers with the textual output of the flush, one deleted
/// entry per line. Lines whose first token is not an IP address are noise.
pub fn parse_flushed_addresses(body: &str) -> Vec<String> {
    // Some firmware wraps the output in a JSON string.
    let text = serde_json::from_str::<String>(body).unwrap_or_else(|_| body.to_owned());
    text.lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|token| token.parse::<std::net::IpAddr>().is_ok())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rule_state_accepts_strings_and_numbers() {
        assert_eq!(RuleState::from_json(Some(&json!("1"))), RuleState::Enabled);
        assert_eq!(RuleState::from_json(Some(&json!("0"))), RuleState::Disabled);
        assert_eq!(RuleState::from_json(Some(&json!(1))), RuleState::Enabled);
        assert_eq!(RuleState::from_json(Some(&json!(0))), RuleState::Disabled);
        assert_eq!(RuleState::from_json(Some(&json!(true))), RuleState::Enabled);
    }

    #[test]
    fn rule_state_unknown_for_absent_or_malformed() {
        assert_eq!(RuleState::from_json(None), RuleState::Unknown);
        assert_eq!(RuleState::from_json(Some(&json!("yes"))), RuleState::Unknown);
        assert_eq!(RuleState::from_json(Some(&json!(2))), RuleState::Unknown);
        assert_eq!(RuleState::from_json(Some(&Value::Null)), RuleState::Unknown);
    }

    #[test]
    fn rule_detail_missing_rule_object() {
        assert!(RuleDetail::from_response(&json!({})).is_none());
        assert!(RuleDetail::from_response(&json!([])).is_none());
        assert!(RuleDetail::from_response(&json!({ "rule": [] })).is_none());
    }

    #[test]
    fn rule_detail_without_enabled_field_is_unknown() {
        let detail = RuleDetail::from_response(&json!({ "rule": { "description": "x" } }));
        assert_eq!(
            detail,
            Some(RuleDetail {
                state: RuleState::Unknown,
                description: Some("x".into()),
            })
        );
    }

    #[test]
    fn search_rows_deserialize_loosely() {
        let page: SearchPage<RemoteRule> = serde_json::from_value(json!({
            "rows": [
                { "uuid": "a", "enabled": "1", "description": "WAN block" },
                { "uuid": "b", "enabled": 0, "description": 12 },
                { "uuid": "c" }
            ],
            "rowCount": 3,
            "total": 3,
            "current": 1
        }))
        .unwrap();

        assert_eq!(page.rows.len(), 3);
        assert_eq!(page.rows[0].enabled, RuleState::Enabled);
        assert_eq!(page.rows[1].enabled, RuleState::Disabled);
        assert_eq!(page.rows[1].description, "12");
        assert_eq!(page.rows[2].enabled, RuleState::Unknown);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn action_status_failure_detection() {
        assert!(!ActionStatus::from_json(&json!({ "status": "OK\n\n" })).is_failure());
        assert!(!ActionStatus::from_json(&json!({ "result": "Disabled", "changed": true })).is_failure());
        assert!(!ActionStatus::from_json(&Value::Null).is_failure());
        assert!(ActionStatus::from_json(&json!({ "result": "failed" })).is_failure());

        let invalid = ActionStatus::from_json(&json!({
            "result": "failed",
            "validations": { "alias.content": "Entry is not a valid address" }
        }));
        assert!(invalid.is_failure());
        assert!(invalid.summary().contains("alias.content"));
    }

    #[test]
    fn alias_from_option_maps_flattens_metadata() {
        let body = json!({
            "alias": {
                "enabled": "1",
                "name": "blocklist",
                "type": {
                    "host": { "value": "Host(s)", "selected": 1 },
                    "network": { "value": "Network(s)", "selected": 0 }
                },
                "proto": {
                    "IPv4": { "value": "IPv4", "selected": 0 },
                    "IPv6": { "value": "IPv6", "selected": 0 }
                },
                "content": {
                    "10.0.0.5": { "value": "10.0.0.5", "selected": 1 },
                    "10.0.0.0/24": { "value": "10.0.0.0/24", "selected": 1 }
                },
                "description": "bad hosts",
                "counters": "0"
            }
        });

        let alias = Alias::from_item("u-1", &body).unwrap();
        assert_eq!(alias.name, "blocklist");
        assert_eq!(alias.content, vec!["10.0.0.5", "10.0.0.0/24"]);
        assert_eq!(alias.metadata["type"], json!("host"));
        assert_eq!(alias.metadata["proto"], json!(""));
        assert_eq!(alias.metadata["enabled"], json!("1"));

        let payload = alias.to_payload();
        assert_eq!(payload["alias"]["content"], json!("10.0.0.5\n10.0.0.0/24"));
        assert_eq!(payload["alias"]["type"], json!("host"));
        assert_eq!(payload["alias"]["counters"], json!("0"));
    }

    #[test]
    fn alias_string_content_keeps_duplicates() {
        let body = json!({ "alias": { "name": "a", "content": "1.1.1.1\n1.1.1.1,2.2.2.2" } });
        let alias = Alias::from_item("u", &body).unwrap();
        assert_eq!(alias.content, vec!["1.1.1.1", "1.1.1.1", "2.2.2.2"]);
    }

    #[test]
    fn blank_alias_template_is_absent() {
        assert!(Alias::from_item("u", &json!({ "alias": { "name": "" } })).is_none());
        assert!(Alias::from_item("u", &json!([])).is_none());
    }

    #[test]
    fn flushed_addresses_skip_noise() {
        let body = "192.168.1.10 (192.168.1.10) deleted\n\nfe80::1%em0 deleted\nsomething else\n10.0.0.2 deleted";
        assert_eq!(parse_flushed_addresses(body), vec!["192.168.1.10", "10.0.0.2"]);
    }

    #[test]
    fn network_aliases_keyed_by_name() {
        let list = NetworkAlias::list_from_response(&json!({
            "lan_hosts": { "name": "lan_hosts", "description": "LAN" },
            "bogons": {}
        }));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].name, "bogons");
        assert_eq!(list[0].description, "LAN");
    }
}
