//! Target-list input.
//!
//! One community URL per line. Lines are normalized to a canonical
//! `https://vk.com/<name>` form before auditing so that duplicates collapse
//! and API identifiers extract cleanly.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use url::Url;

/// Read, clean, and dedupe the target file, keeping first-seen order.
pub fn read_targets(path: &str) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read target file {path}"))?;

    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    for line in raw.lines() {
        if let Some(url) = clean_target(line) {
            if seen.insert(url.clone()) {
                targets.push(url);
            }
        }
    }

    if targets.is_empty() {
        bail!("no community urls found in {path}");
    }
    Ok(targets)
}

/// Normalize one target line.
///
/// Strips BOM and surrounding whitespace, tolerates a missing scheme,
/// forces `https` and the `vk.com` host, and drops query and fragment.
/// Returns `None` for blank or unusable lines.
pub fn clean_target(line: &str) -> Option<String> {
    let s = line.trim_matches('\u{feff}').trim();
    if s.is_empty() {
        return None;
    }

    let with_scheme = if s.contains("://") {
        s.to_string()
    } else {
        format!("https://{s}")
    };

    let url = Url::parse(&with_scheme).ok()?;
    let path = url.path().trim_end_matches('/');
    if path.is_empty() {
        return None;
    }

    Some(format!("https://vk.com{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn forces_scheme_and_host() {
        assert_eq!(
            clean_target("http://VK.com/club1?from=mail#top"),
            Some("https://vk.com/club1".to_string())
        );
        assert_eq!(
            clean_target("vk.com/some_group/"),
            Some("https://vk.com/some_group".to_string())
        );
    }

    #[test]
    fn strips_bom_and_whitespace() {
        assert_eq!(
            clean_target("\u{feff}  https://vk.com/club2  "),
            Some("https://vk.com/club2".to_string())
        );
    }

    #[test]
    fn blank_and_bare_host_lines_are_dropped() {
        assert_eq!(clean_target(""), None);
        assert_eq!(clean_target("   "), None);
        assert_eq!(clean_target("https://vk.com/"), None);
    }

    #[test]
    fn read_targets_dedupes_keeping_order() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "https://vk.com/b").unwrap();
        writeln!(f, "vk.com/a").unwrap();
        writeln!(f, "http://vk.com/b/").unwrap();
        writeln!(f).unwrap();

        let targets = read_targets(f.path().to_str().unwrap()).unwrap();
        assert_eq!(targets, ["https://vk.com/b", "https://vk.com/a"]);
    }

    #[test]
    fn empty_file_is_an_error() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert!(read_targets(f.path().to_str().unwrap()).is_err());
    }
}
