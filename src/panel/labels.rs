//! Per-key, per-layer user labels

use tracing::debug;

use crate::prefs::{Preferences, USER_LABEL_PREFIX};

use super::keys::KeyId;

fn label_key(key: KeyId, layer: usize) -> String {
    format!("{}Layer{}.{}", USER_LABEL_PREFIX, layer, key.label_suffix())
}

/// Label shown when no override is set: the last character of the key name
/// for primary keys (A, B, C), empty otherwise
pub fn default_label(key: KeyId) -> String {
    if !key.is_primary() {
        return String::new();
    }

    label_key(key, 1)
        .chars()
        .last()
        .map(String::from)
        .unwrap_or_default()
}

/// Label for a key on a layer
pub fn user_label(prefs: &Preferences, key: KeyId, layer: usize) -> String {
    match prefs.string(&label_key(key, layer)) {
        Some(label) if !label.is_empty() => label,
        _ => default_label(key),
    }
}

/// Set a label override.
///
/// An empty label or one equal to the default clears the override.
pub fn set_user_label(prefs: &mut Preferences, key: KeyId, layer: usize, label: &str) {
    let label = if label.is_empty() || label == default_label(key) {
        None
    } else {
        Some(label)
    };

    debug!("Label for {} on layer {}: {:?}", key, layer, label);
    prefs.set_string(&label_key(key, layer), label);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        assert_eq!(default_label(KeyId::SourceA), "A");
        assert_eq!(default_label(KeyId::SourceB), "B");
        assert_eq!(default_label(KeyId::SourceC), "C");
        assert_eq!(default_label(KeyId::Talkback), "");
        assert_eq!(default_label(KeyId::External), "");
    }

    #[test]
    fn test_label_round_trip() {
        let mut prefs = Preferences::in_memory();
        set_user_label(&mut prefs, KeyId::Dim, 2, "Quiet");
        assert_eq!(user_label(&prefs, KeyId::Dim, 2), "Quiet");

        // Other layers keep their own label
        assert_eq!(user_label(&prefs, KeyId::Dim, 1), "");
    }

    #[test]
    fn test_setting_default_clears_override() {
        let mut prefs = Preferences::in_memory();
        set_user_label(&mut prefs, KeyId::SourceA, 1, "Nearfield");
        assert_eq!(user_label(&prefs, KeyId::SourceA, 1), "Nearfield");

        set_user_label(&mut prefs, KeyId::SourceA, 1, "A");
        assert_eq!(user_label(&prefs, KeyId::SourceA, 1), "A");
        assert!(prefs.keys().is_empty());
    }

    #[test]
    fn test_empty_label_clears_override() {
        let mut prefs = Preferences::in_memory();
        set_user_label(&mut prefs, KeyId::SourceB, 3, "Mains");
        set_user_label(&mut prefs, KeyId::SourceB, 3, "");
        assert_eq!(user_label(&prefs, KeyId::SourceB, 3), "B");
        assert!(prefs.keys().is_empty());
    }

    #[test]
    fn test_stored_empty_string_falls_back() {
        let mut prefs = Preferences::in_memory();
        prefs.set_string("userLabel.Layer1.SourceC", Some(""));
        assert_eq!(user_label(&prefs, KeyId::SourceC, 1), "C");
    }
}
