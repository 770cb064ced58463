use serde::{Deserialize, Serialize};

/// How `<head>` children are reconciled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadStyle {
    /// Keep matching elements, add new ones, drop ones missing from the new head.
    #[default]
    Merge,
    /// Never remove, only add.
    Append,
    /// Treat the head like any other element.
    Morph,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadConfig {
    pub style: HeadStyle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    /// Leave the focused element (and its subtree) completely alone.
    pub ignore_active: bool,
    /// Leave the focused element's `value` and children alone, still syncing other attributes.
    pub ignore_active_value: bool,
    /// Attributes never written or removed by attribute sync.
    pub preserved_attributes: Vec<String>,
    pub head: HeadConfig,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            ignore_active: false,
            ignore_active_value: true,
            preserved_attributes: Vec::new(),
            head: HeadConfig::default(),
        }
    }
}

impl MorphConfig {
    pub fn is_preserved(&self, name: &str) -> bool {
        self.preserved_attributes
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_toml() {
        let cfg: MorphConfig = toml::from_str(
            r#"
            preserved_attributes = ["data-anim"]
            [head]
            style = "append"
            "#,
        )
        .expect("config");
        assert!(cfg.ignore_active_value);
        assert!(!cfg.ignore_active);
        assert!(cfg.is_preserved("DATA-ANIM"));
        assert_eq!(cfg.head.style, HeadStyle::Append);
    }
}
