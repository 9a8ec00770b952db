//! Scenario manifest (XML) loader
//!
//! Lets operators ship additional scenario catalogs next to the skill
//! without a code change. One manifest file can declare several scenarios:
//!
//! ```xml
//! <scenarios>
//!   <scenario name="volcano">
//!     <event name="LavaSurge" min-rank="2" team="true"
//!            path="events/lava_surge_r{rank}_t{team}.mp3"/>
//!   </scenario>
//! </scenarios>
//! ```

use super::{CatalogSet, ScenarioCatalog};
use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load every `.xml` manifest under `dir` into the catalog set
///
/// Returns the number of scenarios added. Malformed manifests abort the
/// load; this runs at startup only, never on the playback path.
pub fn load_manifest_dir(set: &mut CatalogSet, dir: &Path) -> Result<usize> {
    let mut added = 0;

    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan manifest dir: {:?}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("xml") {
            continue;
        }

        for catalog in parse_manifest(entry.path())? {
            log::info!(
                "Loaded scenario `{}` ({} events) from {:?}",
                catalog.name(),
                catalog.len(),
                entry.path()
            );
            set.insert(catalog)
                .with_context(|| format!("Rejected manifest: {:?}", entry.path()))?;
            added += 1;
        }
    }

    Ok(added)
}

/// Parse a single manifest file into scenario catalogs
pub fn parse_manifest(path: &Path) -> Result<Vec<ScenarioCatalog>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open manifest: {:?}", path))?;

    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.config_mut().trim_text(true);

    let mut catalogs = Vec::new();
    let mut current: Option<ScenarioCatalog> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"scenario" => {
                    if let Some(name) = attr_value(&e, b"name") {
                        current = Some(ScenarioCatalog::new(name));
                    } else {
                        log::warn!("Skipping <scenario> without a name in {:?}", path);
                        current = None;
                    }
                }
                b"event" => {
                    // Non-self-closing event elements carry the same attributes
                    if let Some(ref mut catalog) = current {
                        push_event(catalog, &e, path);
                    }
                }
                _ => {}
            },

            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"event" {
                    if let Some(ref mut catalog) = current {
                        push_event(catalog, &e, path);
                    }
                }
            }

            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"scenario" {
                    if let Some(catalog) = current.take() {
                        catalogs.push(catalog);
                    }
                }
            }

            Ok(Event::Eof) => break,
            Err(e) => {
                anyhow::bail!(
                    "XML error in manifest {:?} at position {}: {:?}",
                    path,
                    reader.buffer_position(),
                    e
                );
            }
            _ => {}
        }

        buf.clear();
    }

    Ok(catalogs)
}

/// Append one `<event>` element to the catalog, skipping incomplete entries
fn push_event(catalog: &mut ScenarioCatalog, element: &BytesStart<'_>, path: &Path) {
    let name = attr_value(element, b"name");
    let asset = attr_value(element, b"path");

    let (name, asset) = match (name, asset) {
        (Some(n), Some(a)) => (n, a),
        _ => {
            log::warn!(
                "Skipping <event> without name/path in scenario `{}` ({:?})",
                catalog.name(),
                path
            );
            return;
        }
    };

    let min_rank = attr_value(element, b"min-rank")
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(0);
    let needs_team = attr_value(element, b"team")
        .map(|v| v == "true")
        .unwrap_or(false);

    catalog.add_event(name, min_rank, needs_team, asset);
}

/// Read one attribute as an owned string
fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    for attr in element.attributes() {
        if let Ok(attr) = attr {
            if attr.key.as_ref() == key {
                return attr
                    .unescape_value()
                    .ok()
                    .map(|v| v.into_owned());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0"?>
<scenarios>
  <scenario name="volcano">
    <event name="LavaSurge" min-rank="2" team="true"
           path="events/lava_surge_r{rank}_t{team}.mp3"/>
    <event name="AshCloud" path="events/ash_cloud_r{rank}.mp3"/>
  </scenario>
</scenarios>
"#;

    #[test]
    fn test_parse_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volcano.xml");
        std::fs::write(&path, MANIFEST).unwrap();

        let catalogs = parse_manifest(&path).unwrap();
        assert_eq!(catalogs.len(), 1);

        let volcano = &catalogs[0];
        assert_eq!(volcano.name(), "volcano");
        assert_eq!(volcano.len(), 2);

        let lava = volcano.template("LavaSurge").unwrap();
        assert_eq!(lava.index, 1);
        assert_eq!(lava.min_rank, 2);
        assert!(lava.needs_team);

        // Defaults for omitted attributes
        let ash = volcano.template("AshCloud").unwrap();
        assert_eq!(ash.min_rank, 0);
        assert!(!ash.needs_team);
    }

    #[test]
    fn test_load_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("volcano.xml"), MANIFEST).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a manifest").unwrap();

        let mut set = CatalogSet::builtin();
        let added = load_manifest_dir(&mut set, dir.path()).unwrap();

        assert_eq!(added, 1);
        assert!(set.scenario("volcano").is_some());
        assert_eq!(set.lookup_event("LavaSurge").unwrap().0.name(), "volcano");
    }

    #[test]
    fn test_skips_incomplete_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xml");
        std::fs::write(
            &path,
            r#"<scenarios><scenario name="sparse">
                 <event name="NoPath"/>
                 <event name="Kept" path="events/kept_r{rank}.mp3"/>
               </scenario></scenarios>"#,
        )
        .unwrap();

        let catalogs = parse_manifest(&path).unwrap();
        assert_eq!(catalogs[0].len(), 1);
        assert!(catalogs[0].template("Kept").is_some());
    }

    #[test]
    fn test_duplicate_event_name_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("clash.xml"),
            r#"<scenarios><scenario name="copycat">
                 <event name="Yeti" path="events/yeti_r{rank}.mp3"/>
               </scenario></scenarios>"#,
        )
        .unwrap();

        let mut set = CatalogSet::builtin();
        assert!(load_manifest_dir(&mut set, dir.path()).is_err());
    }
}
