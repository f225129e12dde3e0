//! JAR manifest parsing: continuation-line folding for the main section.
//!
//! Grounded on `nova-classpath/src/module_name.rs`'s `manifest_main_attribute`,
//! kept verbatim (it already handles exactly the folding rule this domain
//! needs) and generalized to read any key, not just
//! `Automatic-Module-Name`/`Class-Path`.

pub(crate) const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

pub(crate) fn manifest_main_attribute(manifest: &str, key: &str) -> Option<String> {
    let mut current_key: Option<&str> = None;
    let mut current_value = String::new();

    for line in manifest.lines() {
        let line = line.trim_end_matches('\r');

        // The first empty line terminates the main attributes section.
        if line.is_empty() {
            break;
        }

        if let Some(rest) = line.strip_prefix(' ') {
            if current_key.is_some() {
                current_value.push_str(rest);
            }
            continue;
        }

        if let Some(k) = current_key.take() {
            if k.trim().eq_ignore_ascii_case(key) {
                return Some(current_value.trim().to_string());
            }
        }
        current_value.clear();

        let Some((k, v)) = line.split_once(':') else {
            continue;
        };
        current_key = Some(k);
        current_value.push_str(v.trim_start());
    }

    if let Some(k) = current_key {
        if k.trim().eq_ignore_ascii_case(key) {
            return Some(current_value.trim().to_string());
        }
    }

    None
}
