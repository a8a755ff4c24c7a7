use crate::network::NetworkFragment;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::{json, Value};

/// Path of the hostname file injected into every node
pub const HOSTNAME_PATH: &str = "/etc/hostname";

/// Decimal 420 is octal 0644
const FILE_MODE: u32 = 420;

/// Encode raw content as a self-describing data URI: a text/plain
/// MIME-and-charset prefix followed by standard base64 of the bytes,
/// unwrapped and with padding retained
pub fn data_url(content: &str) -> String {
    format!(
        "data:text/plain;charset=utf-8;base64,{}",
        STANDARD.encode(content.as_bytes())
    )
}

/// Build one ignition storage file entry
fn file_entry(path: &str, content: &str) -> Value {
    json!({
        "path": path,
        "mode": FILE_MODE,
        "contents": {
            "source": data_url(content),
            "verification": {},
        },
        "filesystem": "root",
    })
}

/// Append the hostname entry and one entry per network fragment to the
/// document's storage file list.
///
/// Pre-existing file entries are always preserved. Appending is not
/// idempotent: callers must start from a pristine role template, never
/// from a previously generated document, or entries will be duplicated.
pub fn append_node_files(
    document: &mut Value,
    hostname: &str,
    fragments: &[NetworkFragment],
) -> Result<()> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| eyre!("ignition template is not a JSON object"))?;
    let storage = root
        .entry("storage")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| eyre!("ignition 'storage' field is not a JSON object"))?;
    let files = storage
        .entry("files")
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .ok_or_else(|| eyre!("ignition 'storage.files' field is not a JSON array"))?;

    files.push(file_entry(HOSTNAME_PATH, &format!("{}\n", hostname)));
    for fragment in fragments {
        files.push(file_entry(&fragment.path, &fragment.content));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_entry(entry: &Value) -> String {
        let source = entry["contents"]["source"].as_str().unwrap();
        let payload = source
            .strip_prefix("data:text/plain;charset=utf-8;base64,")
            .expect("data-URI prefix missing");
        String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap()
    }

    fn sample_fragment() -> NetworkFragment {
        NetworkFragment {
            name: "ifcfg-bond0".to_string(),
            path: "/etc/sysconfig/network-scripts/ifcfg-bond0".to_string(),
            content: "NAME=bond0\nDEVICE=bond0\nMTU=1500\n".to_string(),
        }
    }

    #[test]
    fn test_data_url_round_trip() {
        let content = "NAME=bond0\nMTU=1500\n";
        let url = data_url(content);
        assert_eq!(decode_entry(&json!({"contents": {"source": url}})), content);
    }

    #[test]
    fn test_file_entry_shape() {
        let entry = file_entry("/etc/hostname", "cluster-master-0\n");
        assert_eq!(entry["path"], "/etc/hostname");
        assert_eq!(entry["mode"], 420);
        assert_eq!(entry["filesystem"], "root");
        assert_eq!(entry["contents"]["verification"], json!({}));
        assert_eq!(decode_entry(&entry), "cluster-master-0\n");
    }

    #[test]
    fn test_append_creates_missing_storage() {
        let mut document = json!({"ignition": {"version": "2.2.0"}});
        append_node_files(&mut document, "cluster-master-0", &[sample_fragment()]).unwrap();

        let files = document["storage"]["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["path"], HOSTNAME_PATH);
        assert_eq!(decode_entry(&files[0]), "cluster-master-0\n");
        assert_eq!(files[1]["path"], "/etc/sysconfig/network-scripts/ifcfg-bond0");
        assert_eq!(decode_entry(&files[1]), "NAME=bond0\nDEVICE=bond0\nMTU=1500\n");
    }

    #[test]
    fn test_append_preserves_existing_entries_and_fields() {
        let existing = json!({
            "path": "/etc/motd",
            "mode": 420,
            "contents": {"source": "data:,hello", "verification": {}},
            "filesystem": "root",
        });
        let mut document = json!({
            "ignition": {"version": "2.2.0"},
            "passwd": {"users": [{"name": "core"}]},
            "storage": {"files": [existing.clone()]},
        });
        append_node_files(&mut document, "cluster-bootstrap", &[]).unwrap();

        let files = document["storage"]["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0], existing);
        // Unrelated top-level fields survive untouched
        assert_eq!(document["ignition"]["version"], "2.2.0");
        assert_eq!(document["passwd"]["users"][0]["name"], "core");
    }

    #[test]
    fn test_mutating_mutated_document_appends_duplicates() {
        // Documented non-idempotent behavior: callers must start from a
        // pristine template
        let mut document = json!({"ignition": {"version": "2.2.0"}});
        append_node_files(&mut document, "cluster-worker-0", &[sample_fragment()]).unwrap();
        append_node_files(&mut document, "cluster-worker-0", &[sample_fragment()]).unwrap();

        let files = document["storage"]["files"].as_array().unwrap();
        assert_eq!(files.len(), 4);
        assert_eq!(files[0], files[2]);
        assert_eq!(files[1], files[3]);
    }

    #[test]
    fn test_mutation_is_deterministic() {
        let template = json!({"ignition": {"version": "2.2.0"}});
        let fragments = [sample_fragment()];

        let mut first = template.clone();
        append_node_files(&mut first, "cluster-master-1", &fragments).unwrap();
        let mut second = template.clone();
        append_node_files(&mut second, "cluster-master-1", &fragments).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_non_object_template_rejected() {
        let mut document = json!([1, 2, 3]);
        assert!(append_node_files(&mut document, "cluster-master-0", &[]).is_err());

        let mut document = json!({"storage": "not-an-object"});
        assert!(append_node_files(&mut document, "cluster-master-0", &[]).is_err());

        let mut document = json!({"storage": {"files": "not-an-array"}});
        assert!(append_node_files(&mut document, "cluster-master-0", &[]).is_err());
    }
}
