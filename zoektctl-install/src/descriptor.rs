//! Shared `mcpServers` documents.
//!
//! `mcp.descriptor_path` may point at an MCP host's own config that lists
//! other servers. zoektctl owns exactly one key in that document: apply
//! merges it in, pruning and uninstall take it back out, and every other
//! entry is left as found.

use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};

use zoektctl_renderer::{ArtifactKind, RenderedFile};

use crate::error::{io_err, InstallError};
use crate::manifest::{self, FileHashes};
use crate::writer::{self, WriteResult};

const SERVERS_KEY: &str = "mcpServers";

type Document = Map<String, Value>;

/// The file apply installs for `file`.
///
/// Non-descriptor files pass through. A descriptor is merged into the
/// document already on disk; `replaced` is a key zoektctl owned there before
/// (the server was renamed) and is dropped.
pub fn effective(
    file: &RenderedFile,
    replaced: Option<&str>,
) -> Result<RenderedFile, InstallError> {
    if file.kind != ArtifactKind::McpDescriptor {
        return Ok(file.clone());
    }
    let content = merge(&file.path, read_document(&file.path)?, &file.content, replaced)?;
    Ok(RenderedFile {
        content,
        ..file.clone()
    })
}

/// Merge the rendered descriptor's servers into `existing`.
///
/// With nothing on disk the rendered text is used verbatim.
pub fn merge(
    path: &Path,
    existing: Option<Document>,
    rendered: &str,
    replaced: Option<&str>,
) -> Result<String, InstallError> {
    let Some(mut doc) = existing else {
        return Ok(rendered.to_string());
    };
    let ours: Value = serde_json::from_str(rendered)?;
    let entries = match ours.get(SERVERS_KEY) {
        Some(Value::Object(entries)) => entries.clone(),
        _ => Map::new(),
    };

    let servers = servers_mut(path, &mut doc)?;
    if let Some(old) = replaced.filter(|old| !entries.contains_key(*old)) {
        servers.remove(old);
    }
    for (name, entry) in entries {
        servers.insert(name, entry);
    }
    to_text(&doc)
}

/// What remains at `path` once `server` is removed; `None` when nothing does.
pub fn remaining(path: &Path, server: &str) -> Result<Option<String>, InstallError> {
    let Some(mut doc) = read_document(path)? else {
        return Ok(None);
    };
    let servers = servers_mut(path, &mut doc)?;
    servers.remove(server);
    let no_servers = servers.is_empty();
    if no_servers {
        doc.remove(SERVERS_KEY);
    }
    if doc.is_empty() {
        return Ok(None);
    }
    to_text(&doc).map(Some)
}

/// Take `server` back out of the document at `path`.
///
/// The file is deleted when nothing else is left in it.
pub fn withdraw(
    path: &Path,
    server: &str,
    hashes: &mut FileHashes,
    dry_run: bool,
) -> Result<WriteResult, InstallError> {
    let Some(content) = remaining(path, server)? else {
        return writer::remove(path, hashes, dry_run);
    };
    let rest = RenderedFile {
        kind: ArtifactKind::McpDescriptor,
        path: path.to_path_buf(),
        content,
        executable: false,
    };
    let result = writer::atomic_write(&rest, hashes, dry_run)?;
    hashes.remove(&manifest::key(path));
    tracing::info!("withdrew `{server}` from {}", path.display());
    Ok(result)
}

fn read_document(path: &Path) -> Result<Option<Document>, InstallError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(path, e)),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(doc)) => Ok(Some(doc)),
        Ok(_) => Err(shared_err(path, "top level is not a JSON object")),
        Err(e) => Err(shared_err(path, e)),
    }
}

fn servers_mut<'a>(
    path: &Path,
    doc: &'a mut Document,
) -> Result<&'a mut Document, InstallError> {
    match doc
        .entry(SERVERS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(servers) => Ok(servers),
        _ => Err(shared_err(path, "`mcpServers` is not an object")),
    }
}

fn to_text(doc: &Document) -> Result<String, InstallError> {
    let mut text = serde_json::to_string_pretty(doc)?;
    text.push('\n');
    Ok(text)
}

fn shared_err(path: &Path, reason: impl ToString) -> InstallError {
    InstallError::SharedDocument {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const OURS: &str = r#"{
  "mcpServers": {
    "zoekt": {
      "command": "/usr/local/bin/zoekt-mcp",
      "env": {
        "ZOEKT_URL": "http://localhost:6070"
      }
    }
  }
}
"#;

    fn descriptor(path: &Path) -> RenderedFile {
        RenderedFile {
            kind: ArtifactKind::McpDescriptor,
            path: path.to_path_buf(),
            content: OURS.to_string(),
            executable: false,
        }
    }

    #[test]
    fn fresh_path_uses_rendered_text() {
        let tmp = TempDir::new().unwrap();
        let file = descriptor(&tmp.path().join("mcp.json"));
        assert_eq!(effective(&file, None).unwrap().content, OURS);
    }

    #[test]
    fn own_previous_output_is_stable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mcp.json");
        fs::write(&path, OURS).unwrap();
        assert_eq!(effective(&descriptor(&path), Some("zoekt")).unwrap().content, OURS);
    }

    #[test]
    fn other_servers_and_keys_survive_merge() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mcp.json");
        fs::write(
            &path,
            r#"{"theme":"dark","mcpServers":{"github":{"command":"gh-mcp"}}}"#,
        )
        .unwrap();

        let merged = effective(&descriptor(&path), None).unwrap().content;
        let doc: Value = serde_json::from_str(&merged).unwrap();
        assert_eq!(doc["theme"], "dark");
        assert_eq!(doc["mcpServers"]["github"]["command"], "gh-mcp");
        assert_eq!(
            doc["mcpServers"]["zoekt"]["env"]["ZOEKT_URL"],
            "http://localhost:6070"
        );
    }

    #[test]
    fn renamed_server_replaces_old_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mcp.json");
        fs::write(&path, r#"{"mcpServers":{"code-search":{},"github":{}}}"#).unwrap();

        let merged = effective(&descriptor(&path), Some("code-search")).unwrap().content;
        let doc: Value = serde_json::from_str(&merged).unwrap();
        let servers = doc["mcpServers"].as_object().unwrap();
        assert!(servers.contains_key("zoekt"));
        assert!(servers.contains_key("github"));
        assert!(!servers.contains_key("code-search"));
    }

    #[test]
    fn unparseable_document_is_refused() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mcp.json");
        fs::write(&path, "{ // hand-written\n").unwrap();
        assert!(matches!(
            effective(&descriptor(&path), None),
            Err(InstallError::SharedDocument { .. })
        ));

        fs::write(&path, r#"{"mcpServers":[]}"#).unwrap();
        assert!(matches!(
            effective(&descriptor(&path), None),
            Err(InstallError::SharedDocument { .. })
        ));
    }

    #[test]
    fn withdraw_keeps_other_servers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mcp.json");
        fs::write(&path, r#"{"mcpServers":{"github":{"command":"gh-mcp"},"zoekt":{}}}"#).unwrap();
        let mut hashes = FileHashes::new();
        hashes.insert(manifest::key(&path), "old".into());

        let result = withdraw(&path, "zoekt", &mut hashes, false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(doc["mcpServers"].get("zoekt").is_none());
        assert_eq!(doc["mcpServers"]["github"]["command"], "gh-mcp");
        assert!(hashes.is_empty());
    }

    #[test]
    fn withdraw_deletes_file_left_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mcp.json");
        fs::write(&path, OURS).unwrap();

        let result = withdraw(&path, "zoekt", &mut FileHashes::new(), false).unwrap();
        assert!(matches!(result, WriteResult::Removed { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn other_kinds_pass_through() {
        let file = RenderedFile {
            kind: ArtifactKind::SystemdTimer,
            path: "/tmp/zoekt-indexer.timer".into(),
            content: "[Timer]\n".into(),
            executable: false,
        };
        assert_eq!(effective(&file, None).unwrap(), file);
    }
}
