//! `server.properties` reading and in-place editing.
//!
//! Edits keep every line they do not touch byte-for-byte, including
//! comments, blank lines, ordering and line endings.

use crate::error::InstallError;
use indexmap::IndexMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const FILE_NAME: &str = "server.properties";

const HEADER: &str = "# Minecraft server properties";

pub type Properties = IndexMap<String, String>;

pub fn path_in(server_dir: &Path) -> PathBuf {
    server_dir.join(FILE_NAME)
}

/// Key of a `key=value` line, or `None` for comments and blank lines.
fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(trimmed.split_once('=').map_or(trimmed, |(k, _)| k).trim())
}

/// Parse properties text into an ordered map. Later duplicates win.
pub fn parse(content: &str) -> Properties {
    let mut props = Properties::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.split_once('=') {
            Some((key, value)) => {
                props.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => tracing::debug!("Ignoring malformed properties line: {}", trimmed),
        }
    }
    props
}

/// Read the properties of the server in `server_dir`; `None` when the file
/// does not exist.
pub fn read(server_dir: &Path) -> Result<Option<Properties>, InstallError> {
    let path = path_in(server_dir);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(Some(parse(&content)))
}

/// Merge `updates` into `content`. Existing keys are rewritten in place,
/// keys not yet present are appended in map order.
pub fn merge(content: &str, updates: &Properties) -> String {
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(content.len());
    let mut written: Vec<&str> = Vec::new();

    for line in content.split_inclusive('\n') {
        let update = line_key(line).and_then(|key| updates.get_key_value(key));
        match update {
            Some((key, value)) => {
                let ending = if line.ends_with("\r\n") {
                    "\r\n"
                } else if line.ends_with('\n') {
                    "\n"
                } else {
                    ""
                };
                out.push_str(&format!("{}={}{}", key, value, ending));
                written.push(key.as_str());
            }
            None => out.push_str(line),
        }
    }

    let mut missing = updates.iter().filter(|(k, _)| !written.contains(&k.as_str())).peekable();
    if missing.peek().is_some() && !out.is_empty() && !out.ends_with('\n') {
        out.push_str(newline);
    }
    for (key, value) in missing {
        out.push_str(&format!("{}={}{}", key, value, newline));
    }

    out
}

/// Apply `updates` to the server's properties file, creating it if needed.
pub fn write(server_dir: &Path, updates: &Properties) -> Result<(), InstallError> {
    let path = path_in(server_dir);
    let content = if path.exists() {
        std::fs::read_to_string(&path)?
    } else {
        String::new()
    };

    let merged = merge(&content, updates);
    if path.exists() && merged == content {
        return Ok(());
    }

    let mut temp = tempfile::NamedTempFile::new_in(server_dir)?;
    temp.write_all(merged.as_bytes())?;
    temp.persist(&path).map_err(|e| InstallError::Io(e.error))?;
    Ok(())
}

/// Write a fresh properties file with `defaults`, unless one already exists.
/// Returns whether a file was written.
pub fn write_defaults_if_absent(server_dir: &Path, defaults: &Properties) -> Result<bool, InstallError> {
    let path = path_in(server_dir);
    if path.exists() {
        return Ok(false);
    }

    let mut content = format!("{}\n", HEADER);
    for (key, value) in defaults {
        content.push_str(&format!("{}={}\n", key, value));
    }
    std::fs::write(&path, content)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "#Minecraft server properties\r\n#Mon Jan 01 00:00:00 UTC 2024\r\n\r\nserver-port=25565\r\nmotd=A Minecraft Server\r\ndifficulty = easy\r\n";

    fn updates(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_skips_comments_and_trims() {
        let props = parse(SAMPLE);
        assert_eq!(props.len(), 3);
        assert_eq!(props["server-port"], "25565");
        assert_eq!(props["difficulty"], "easy");
        assert_eq!(props.get_index(0).unwrap().0, "server-port");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let props = parse("motd=a=b\n");
        assert_eq!(props["motd"], "a=b");
    }

    #[test]
    fn test_empty_update_is_byte_identical() {
        assert_eq!(merge(SAMPLE, &Properties::new()), SAMPLE);

        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(path_in(tmp.path()), SAMPLE).unwrap();
        write(tmp.path(), &Properties::new()).unwrap();
        assert_eq!(std::fs::read_to_string(path_in(tmp.path())).unwrap(), SAMPLE);
    }

    #[test]
    fn test_update_changes_only_that_line() {
        let merged = merge(SAMPLE, &updates(&[("server-port", "25570")]));
        let before: Vec<&str> = SAMPLE.split_inclusive('\n').collect();
        let after: Vec<&str> = merged.split_inclusive('\n').collect();

        assert_eq!(before.len(), after.len());
        for (i, (b, a)) in before.iter().zip(&after).enumerate() {
            if i == 3 {
                assert_eq!(*a, "server-port=25570\r\n");
            } else {
                assert_eq!(b, a);
            }
        }
    }

    #[test]
    fn test_new_keys_appended_in_order() {
        let merged = merge("pvp=true", &updates(&[("motd", "hi"), ("pvp", "false"), ("max-players", "5")]));
        assert_eq!(merged, "pvp=false\nmotd=hi\nmax-players=5\n");

        let merged = merge("a=1", &updates(&[("b", "2")]));
        assert_eq!(merged, "a=1\nb=2\n");
    }

    #[test]
    fn test_read_missing_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read(tmp.path()).unwrap().is_none());
    }

    #[test]
    fn test_defaults_only_when_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults = updates(&[("server-port", "25565"), ("pvp", "true")]);

        assert!(write_defaults_if_absent(tmp.path(), &defaults).unwrap());
        assert_eq!(
            std::fs::read_to_string(path_in(tmp.path())).unwrap(),
            "# Minecraft server properties\nserver-port=25565\npvp=true\n"
        );

        write(tmp.path(), &updates(&[("server-port", "30000")])).unwrap();
        assert!(!write_defaults_if_absent(tmp.path(), &defaults).unwrap());
        assert_eq!(read(tmp.path()).unwrap().unwrap()["server-port"], "30000");
    }
}
