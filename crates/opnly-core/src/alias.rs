// ── Alias editing ──
//
// The appliance only supports replacing a whole alias, so every edit reads
// the current definition, changes the member list in memory and writes
// the full object back. Two writers racing on one alias lose one edit;
// within a process the controller serializes alias writes.

use tracing::info;

use opnly_api::FirewallClient;

use crate::error::CoreError;
use crate::model::Alias;

/// Check and normalize an alias member (address, network or host name).
pub fn validate_entry(entry: &str) -> Result<&str, CoreError> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Err(CoreError::validation("alias entry must not be empty"));
    }
    if entry.chars().any(|c| c.is_whitespace() || c == ',') {
        return Err(CoreError::validation(format!(
            "alias entry {entry:?} must not contain whitespace or commas"
        )));
    }
    Ok(entry)
}

/// Append `entry`. Duplicates are kept.
pub fn with_entry_added(content: &[String], entry: &str) -> Vec<String> {
    let mut next = content.to_vec();
    next.push(entry.to_owned());
    next
}

/// Remove every occurrence of `entry`. `None` if it is not a member.
pub fn with_entry_removed(content: &[String], entry: &str) -> Option<Vec<String>> {
    let next: Vec<String> = content.iter().filter(|e| *e != entry).cloned().collect();
    (next.len() != content.len()).then_some(next)
}

/// Add a member to an alias. Returns the definition as written.
pub async fn add_entry(client: &FirewallClient, uuid: &str, entry: &str) -> Result<Alias, CoreError> {
    let entry = validate_entry(entry)?;
    let mut alias = load(client, uuid).await?;
    alias.content = with_entry_added(&alias.content, entry);
    write(client, alias, "Add alias entry").await
}

/// Remove a member from an alias. Nothing is written when the entry is
/// not present.
pub async fn remove_entry(
    client: &FirewallClient,
    uuid: &str,
    entry: &str,
) -> Result<Alias, CoreError> {
    let entry = validate_entry(entry)?;
    let mut alias = load(client, uuid).await?;
    alias.content = with_entry_removed(&alias.content, entry).ok_or_else(|| {
        CoreError::validation(format!("{entry} is not a member of alias {}", alias.name))
    })?;
    write(client, alias, "Remove alias entry").await
}

/// Full alias definition.
pub async fn load(client: &FirewallClient, uuid: &str) -> Result<Alias, CoreError> {
    client
        .get_alias(uuid)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Alias".into(),
            identifier: uuid.to_owned(),
        })
}

async fn write(client: &FirewallClient, alias: Alias, operation: &str) -> Result<Alias, CoreError> {
    let status = client.set_alias(&alias).await?;
    if status.is_failure() {
        return Err(CoreError::MutationFailed {
            operation: operation.into(),
            message: status.summary(),
        });
    }
    info!(alias = %alias.name, members = alias.content.len(), "{operation}");
    Ok(alias)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn content(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn entries_are_trimmed_and_checked() {
        assert_eq!(validate_entry(" 10.0.0.1 ").unwrap(), "10.0.0.1");
        assert_eq!(validate_entry("10.0.0.0/24").unwrap(), "10.0.0.0/24");
        assert!(validate_entry("").is_err());
        assert!(validate_entry("   ").is_err());
        assert!(validate_entry("10.0.0.1,10.0.0.2").is_err());
        assert!(validate_entry("10.0.0.1 10.0.0.2").is_err());
    }

    #[test]
    fn add_keeps_order_and_duplicates() {
        let next = with_entry_added(&content(&["a", "b"]), "a");
        assert_eq!(next, content(&["a", "b", "a"]));
    }

    #[test]
    fn remove_drops_every_occurrence() {
        let next = with_entry_removed(&content(&["a", "b", "a", "c"]), "a").unwrap();
        assert_eq!(next, content(&["b", "c"]));
    }

    #[test]
    fn remove_absent_entry_is_none() {
        assert!(with_entry_removed(&content(&["a", "b"]), "z").is_none());
        assert!(with_entry_removed(&[], "z").is_none());
    }
}
