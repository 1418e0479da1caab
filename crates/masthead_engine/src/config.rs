//! Configuration
//!
//! The page carries its settings as a JSON object inside the `#bsh-config`
//! data island (or the host supplies a fallback value). Decoding is lenient
//! per field: a key with the wrong JSON type is treated as absent and falls
//! back to its default, so a half-broken configuration still yields a usable
//! [`Configuration`]. Only a document that is not a JSON object at all is
//! rejected.

use masthead_dom::{split_selector_list, Document, Rgba};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Id of the data island element holding the configuration JSON
pub const CONFIG_ISLAND_ID: &str = "bsh-config";

/// Selector list used when the configuration names none
pub const DEFAULT_SELECTOR: &str =
    "header.wp-block-template-part, .wp-site-blocks > header, .wp-site-blocks header";

const DEFAULT_Z_INDEX: f64 = 999.0;
const DEFAULT_TRANSITION_MS: f64 = 300.0;
const DEFAULT_BG_OPACITY: f32 = 0.98;
const DEFAULT_BLUR_PX: f64 = 10.0;
const DEFAULT_MOBILE_BREAKPOINT: f32 = 782.0;
const DEFAULT_HIDE_SENSITIVITY: f32 = 10.0;
const DEFAULT_HIDE_DELAY_MS: f64 = 150.0;

/// Background treatment of the pinned header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundStyle {
    /// Leave the header background alone
    #[default]
    None,
    /// Fixed color from `sticky_bg_color`
    Solid,
    /// Translucent color plus backdrop blur
    Blur,
    /// Follow the color of the content scrolling underneath
    Chameleon,
}

impl BackgroundStyle {
    /// Parse a style name; unknown names map to [`BackgroundStyle::None`]
    pub fn from_name(name: &str) -> Self {
        match name {
            "solid" => BackgroundStyle::Solid,
            "blur" => BackgroundStyle::Blur,
            "chameleon" => BackgroundStyle::Chameleon,
            _ => BackgroundStyle::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundStyle::None => "none",
            BackgroundStyle::Solid => "solid",
            BackgroundStyle::Blur => "blur",
            BackgroundStyle::Chameleon => "chameleon",
        }
    }
}

/// Resolved, typed engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub enabled: bool,
    /// Header selectors in priority order
    pub selectors: Vec<String>,
    /// Offset the pinned header by the admin toolbar height
    pub admin_bar_offset: bool,
    pub z_index: f64,
    pub transition_speed_ms: f64,
    pub background_style: BackgroundStyle,
    pub sticky_bg_color: Option<Rgba>,
    /// Background alpha in 0.0..=1.0
    pub sticky_bg_opacity: f32,
    pub blur_amount_px: f64,
    pub mobile_breakpoint_px: f32,
    pub disable_mobile: bool,
    pub hide_on_scroll_down: bool,
    pub reveal_on_scroll_up: bool,
    /// Minimum scroll delta that counts as a direction change (>= 1)
    pub hide_sensitivity_px: f32,
    /// Debounce before hiding; 0 hides immediately
    pub hide_delay_ms: f64,
    pub push_content_down: bool,
    pub overlay_content: bool,
    /// Explicit setting, or the platform preference when unset
    pub reduced_motion: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from_raw(RawConfig::default(), false)
    }
}

impl Configuration {
    /// Apply defaults and clamps to a decoded configuration
    ///
    /// `platform_reduced_motion` is used when the configuration does not set
    /// `reduced_motion` itself.
    pub fn from_raw(raw: RawConfig, platform_reduced_motion: bool) -> Self {
        let selectors = match raw.selector {
            Some(SelectorField::Many(list)) => list
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(SelectorField::One(text)) if !text.trim().is_empty() => {
                split_selector_list(&text)
            }
            _ => split_selector_list(DEFAULT_SELECTOR),
        };

        let sticky_bg_color = raw
            .sticky_bg_color
            .filter(|hex| !hex.is_empty())
            .and_then(|hex| match Rgba::from_hex(&hex) {
                Ok(color) => Some(color),
                Err(e) => {
                    debug!("Ignoring sticky background color: {}", e);
                    None
                }
            });

        Self {
            enabled: raw.enabled.unwrap_or(false),
            selectors,
            admin_bar_offset: raw.admin_bar_offset.unwrap_or(false),
            z_index: raw.z_index.unwrap_or(DEFAULT_Z_INDEX),
            transition_speed_ms: raw.transition_speed_ms.unwrap_or(DEFAULT_TRANSITION_MS),
            background_style: raw
                .background_style
                .as_deref()
                .map(BackgroundStyle::from_name)
                .unwrap_or_default(),
            sticky_bg_color,
            sticky_bg_opacity: raw
                .sticky_bg_opacity
                .filter(|o| !o.is_nan())
                .unwrap_or(DEFAULT_BG_OPACITY)
                .clamp(0.0, 1.0),
            blur_amount_px: raw
                .blur_amount_px
                .filter(|&b| b != 0.0)
                .unwrap_or(DEFAULT_BLUR_PX),
            mobile_breakpoint_px: raw.mobile_breakpoint_px.unwrap_or(DEFAULT_MOBILE_BREAKPOINT),
            disable_mobile: raw.disable_mobile.unwrap_or(false),
            hide_on_scroll_down: raw.hide_on_scroll_down.unwrap_or(false),
            reveal_on_scroll_up: raw.reveal_on_scroll_up.unwrap_or(false),
            hide_sensitivity_px: raw
                .hide_sensitivity_px
                .filter(|&s| s != 0.0)
                .unwrap_or(DEFAULT_HIDE_SENSITIVITY)
                .max(1.0),
            hide_delay_ms: raw.hide_delay_ms.unwrap_or(DEFAULT_HIDE_DELAY_MS).max(0.0),
            push_content_down: raw.push_content_down.unwrap_or(false),
            overlay_content: raw.overlay_content.unwrap_or(false),
            reduced_motion: raw.reduced_motion.unwrap_or(platform_reduced_motion),
        }
    }

    /// Decode a JSON value; anything but an object is malformed
    pub fn from_json(value: &serde_json::Value, platform_reduced_motion: bool) -> Result<Self> {
        if !value.is_object() {
            return Err(ConfigError::Malformed(format!(
                "expected a JSON object, found {}",
                json_kind(value)
            )));
        }
        let raw = RawConfig::deserialize(value)
            .map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Ok(Self::from_raw(raw, platform_reduced_motion))
    }

    /// Parse JSON text and decode it
    pub fn from_json_str(text: &str, platform_reduced_motion: bool) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Self::from_json(&value, platform_reduced_motion)
    }
}

/// Read the configuration for a page
///
/// The data island wins when it has text; a broken island does not fall back
/// to `fallback`. Reduced motion defaults to the document's preference.
pub fn resolve_configuration<D: Document>(
    doc: &D,
    fallback: Option<&serde_json::Value>,
) -> Result<Configuration> {
    let platform_reduced_motion = doc.prefers_reduced_motion();

    let island_text = doc
        .element_by_id(CONFIG_ISLAND_ID)
        .map(|island| doc.text_content(island))
        .filter(|text| !text.is_empty());

    match (island_text, fallback) {
        (Some(text), _) => Configuration::from_json_str(&text, platform_reduced_motion),
        (None, Some(value)) => Configuration::from_json(value, platform_reduced_motion),
        (None, None) => Err(ConfigError::Absent),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// `selector` accepts a comma separated string or an array of selectors
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SelectorField {
    One(String),
    Many(Vec<String>),
}

/// Configuration as it appears on the wire; every field optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub selector: Option<SelectorField>,
    #[serde(default, deserialize_with = "lenient")]
    pub admin_bar_offset: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub z_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub transition_speed_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub background_style: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sticky_bg_color: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sticky_bg_opacity: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    pub blur_amount_px: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub mobile_breakpoint_px: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    pub disable_mobile: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub hide_on_scroll_down: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub reveal_on_scroll_up: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub hide_sensitivity_px: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    pub hide_delay_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub push_content_down: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub overlay_content: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub reduced_motion: Option<bool>,
}

/// Decode a field, treating a value of the wrong type as absent
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use masthead_dom::prelude::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Configuration {
        Configuration::from_json(&value, false).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = decode(json!({}));
        assert!(!config.enabled);
        assert_eq!(
            config.selectors,
            vec![
                "header.wp-block-template-part",
                ".wp-site-blocks > header",
                ".wp-site-blocks header"
            ]
        );
        assert_eq!(config.z_index, 999.0);
        assert_eq!(config.transition_speed_ms, 300.0);
        assert_eq!(config.background_style, BackgroundStyle::None);
        assert_eq!(config.sticky_bg_opacity, 0.98);
        assert_eq!(config.blur_amount_px, 10.0);
        assert_eq!(config.mobile_breakpoint_px, 782.0);
        assert_eq!(config.hide_sensitivity_px, 10.0);
        assert_eq!(config.hide_delay_ms, 150.0);
        assert!(!config.reduced_motion);
    }

    #[test]
    fn test_wrong_types_fall_back_to_defaults() {
        let config = decode(json!({
            "enabled": "yes",
            "z_index": "10",
            "sticky_bg_opacity": null,
            "background_style": 3,
            "hide_on_scroll_down": true
        }));
        assert!(!config.enabled);
        assert_eq!(config.z_index, 999.0);
        assert_eq!(config.sticky_bg_opacity, 0.98);
        assert_eq!(config.background_style, BackgroundStyle::None);
        assert!(config.hide_on_scroll_down);
    }

    #[test]
    fn test_clamps_and_zero_handling() {
        let config = decode(json!({
            "sticky_bg_opacity": 4.0,
            "blur_amount_px": 0,
            "hide_sensitivity_px": 0,
            "hide_delay_ms": -20
        }));
        assert_eq!(config.sticky_bg_opacity, 1.0);
        assert_eq!(config.blur_amount_px, 10.0);
        assert_eq!(config.hide_sensitivity_px, 10.0);
        assert_eq!(config.hide_delay_ms, 0.0);

        let config = decode(json!({ "hide_sensitivity_px": 0.25, "hide_delay_ms": 0 }));
        assert_eq!(config.hide_sensitivity_px, 1.0);
        assert_eq!(config.hide_delay_ms, 0.0);
    }

    #[test]
    fn test_selector_forms() {
        let config = decode(json!({ "selector": "section.x, [data-a=\"b,c\"] , header.y" }));
        assert_eq!(config.selectors, vec!["section.x", "[data-a=\"b,c\"]", "header.y"]);

        let config = decode(json!({ "selector": ["#top", " ", "header"] }));
        assert_eq!(config.selectors, vec!["#top", "header"]);

        let config = decode(json!({ "selector": "   " }));
        assert_eq!(config.selectors.len(), 3);
    }

    #[test]
    fn test_background_color_and_style() {
        let config = decode(json!({
            "background_style": "blur",
            "sticky_bg_color": "#336699"
        }));
        assert_eq!(config.background_style, BackgroundStyle::Blur);
        assert_eq!(config.sticky_bg_color, Some(Rgba::rgb(0x33, 0x66, 0x99)));

        let config = decode(json!({ "background_style": "glass", "sticky_bg_color": "nope" }));
        assert_eq!(config.background_style, BackgroundStyle::None);
        assert_eq!(config.sticky_bg_color, None);
    }

    #[test]
    fn test_reduced_motion_resolution() {
        let value = json!({ "enabled": true });
        assert!(Configuration::from_json(&value, true).unwrap().reduced_motion);

        let value = json!({ "enabled": true, "reduced_motion": false });
        assert!(!Configuration::from_json(&value, true).unwrap().reduced_motion);
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(matches!(
            Configuration::from_json(&json!([1, 2]), false),
            Err(ConfigError::Malformed(_))
        ));
        assert!(matches!(
            Configuration::from_json_str("{not json", false),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn test_resolve_prefers_island() {
        let mut doc = MemoryDocument::default();
        doc.set_reduced_motion(true);
        doc.append_to_body(
            el("script")
                .id(CONFIG_ISLAND_ID)
                .text(r#"{"enabled": true, "z_index": 5}"#),
        );
        let fallback = json!({ "enabled": false });

        let config = resolve_configuration(&doc, Some(&fallback)).unwrap();
        assert!(config.enabled);
        assert_eq!(config.z_index, 5.0);
        assert!(config.reduced_motion);
    }

    #[test]
    fn test_resolve_fallback_and_absent() {
        let doc = MemoryDocument::default();
        assert_eq!(resolve_configuration(&doc, None), Err(ConfigError::Absent));

        let fallback = json!({ "enabled": true });
        assert!(resolve_configuration(&doc, Some(&fallback)).unwrap().enabled);
    }

    #[test]
    fn test_broken_island_does_not_fall_back() {
        let mut doc = MemoryDocument::default();
        doc.append_to_body(el("script").id(CONFIG_ISLAND_ID).text("{oops"));
        let fallback = json!({ "enabled": true });
        assert!(matches!(
            resolve_configuration(&doc, Some(&fallback)),
            Err(ConfigError::Malformed(_))
        ));
    }
}
