use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_ENABLED: bool = true;
pub const DEFAULT_GUIDELINE_COLOR: &str = "#00FF00";
pub const DEFAULT_GUIDELINE_OPACITY: f64 = 0.6;
pub const DEFAULT_GUIDELINE_WIDTH: f64 = 2.0;
pub const DEFAULT_ACTIVATION_KEY: &str = "Shift";
pub const DEFAULT_ACTIVE_SITES: [&str; 3] = ["discord.com", "*pool*", "*billiard*"];

pub const GUIDELINE_OPACITY_MIN: f64 = 0.0;
pub const GUIDELINE_OPACITY_MAX: f64 = 1.0;

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_GUIDELINE_COLOR: &str = "guidelineColor";
pub const KEY_GUIDELINE_OPACITY: &str = "guidelineOpacity";
pub const KEY_GUIDELINE_WIDTH: &str = "guidelineWidth";
pub const KEY_ACTIVATION_KEY: &str = "activationKey";
pub const KEY_ACTIVE_SITES: &str = "activeSites";
pub const KEY_ALLOW_ANY_WEBSITE: &str = "allowAnyWebsite";
pub const KEY_MANUAL_MODE: &str = "manualMode";
pub const KEY_SHOW_BALL_MARKERS: &str = "showBallMarkers";

pub const ALL_KEYS: &[&str] = &[
    KEY_ENABLED,
    KEY_GUIDELINE_COLOR,
    KEY_GUIDELINE_OPACITY,
    KEY_GUIDELINE_WIDTH,
    KEY_ACTIVATION_KEY,
    KEY_ACTIVE_SITES,
    KEY_ALLOW_ANY_WEBSITE,
    KEY_MANUAL_MODE,
    KEY_SHOW_BALL_MARKERS,
];

/// Process-wide overlay settings as held by the extension store.
///
/// Every field is always in range: values only enter through [`Settings::apply`],
/// which coerces them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub enabled: bool,
    pub guideline_color: String,
    pub guideline_opacity: f64,
    pub guideline_width: f64,
    pub activation_key: String,
    pub active_sites: Vec<String>,
    pub allow_any_website: bool,
    pub manual_mode: bool,
    pub show_ball_markers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_ENABLED,
            guideline_color: DEFAULT_GUIDELINE_COLOR.to_string(),
            guideline_opacity: DEFAULT_GUIDELINE_OPACITY,
            guideline_width: DEFAULT_GUIDELINE_WIDTH,
            activation_key: DEFAULT_ACTIVATION_KEY.to_string(),
            active_sites: DEFAULT_ACTIVE_SITES.iter().map(|s| s.to_string()).collect(),
            allow_any_website: false,
            manual_mode: false,
            show_ball_markers: false,
        }
    }
}

impl Settings {
    /// Decodes a stored settings object. Missing or mistyped fields keep their defaults.
    pub fn from_value(value: &Value) -> Self {
        let mut settings = Self::default();
        settings.apply(&SettingsPatch::from_value(value));
        settings
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(color) = patch.guideline_color.as_deref() {
            self.guideline_color = coerce_color(color);
        }
        if let Some(opacity) = patch.guideline_opacity {
            self.guideline_opacity = coerce_opacity(opacity);
        }
        if let Some(width) = patch.guideline_width {
            self.guideline_width = coerce_width(width);
        }
        if let Some(key) = patch.activation_key.as_deref() {
            self.activation_key = coerce_activation_key(key);
        }
        if let Some(sites) = patch.active_sites.as_ref() {
            self.active_sites = normalize_sites(sites);
        }
        if let Some(allow) = patch.allow_any_website {
            self.allow_any_website = allow;
        }
        if let Some(manual) = patch.manual_mode {
            self.manual_mode = manual;
        }
        if let Some(markers) = patch.show_ball_markers {
            self.show_ball_markers = markers;
        }
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Partial settings as written by `set` / `updateSettings` and pushed to instances.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guideline_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guideline_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guideline_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_sites: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_any_website: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_ball_markers: Option<bool>,
}

impl SettingsPatch {
    /// Reads each known key independently; anything unreadable is left unset.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        Self {
            enabled: read_bool(map, KEY_ENABLED),
            guideline_color: read_string(map, KEY_GUIDELINE_COLOR),
            guideline_opacity: read_number(map, KEY_GUIDELINE_OPACITY),
            guideline_width: read_number(map, KEY_GUIDELINE_WIDTH),
            activation_key: read_string(map, KEY_ACTIVATION_KEY),
            active_sites: read_sites(map, KEY_ACTIVE_SITES),
            allow_any_website: read_bool(map, KEY_ALLOW_ANY_WEBSITE),
            manual_mode: read_bool(map, KEY_MANUAL_MODE),
            show_ball_markers: read_bool(map, KEY_SHOW_BALL_MARKERS),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layers `other` over `self`; fields set in `other` win.
    pub fn merge(&mut self, other: &SettingsPatch) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.guideline_color.is_some() {
            self.guideline_color = other.guideline_color.clone();
        }
        if other.guideline_opacity.is_some() {
            self.guideline_opacity = other.guideline_opacity;
        }
        if other.guideline_width.is_some() {
            self.guideline_width = other.guideline_width;
        }
        if other.activation_key.is_some() {
            self.activation_key = other.activation_key.clone();
        }
        if other.active_sites.is_some() {
            self.active_sites = other.active_sites.clone();
        }
        if other.allow_any_website.is_some() {
            self.allow_any_website = other.allow_any_website;
        }
        if other.manual_mode.is_some() {
            self.manual_mode = other.manual_mode;
        }
        if other.show_ball_markers.is_some() {
            self.show_ball_markers = other.show_ball_markers;
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn manual_mode(manual_mode: bool) -> Self {
        Self {
            manual_mode: Some(manual_mode),
            ..Self::default()
        }
    }
}

impl<'de> Deserialize<'de> for SettingsPatch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

pub fn coerce_opacity(value: f64) -> f64 {
    if !value.is_finite() {
        return DEFAULT_GUIDELINE_OPACITY;
    }
    value.clamp(GUIDELINE_OPACITY_MIN, GUIDELINE_OPACITY_MAX)
}

pub fn coerce_width(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        DEFAULT_GUIDELINE_WIDTH
    }
}

pub fn coerce_color(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        DEFAULT_GUIDELINE_COLOR.to_string()
    } else {
        trimmed.to_string()
    }
}

// Not trimmed: " " is the key value reported for the space bar.
pub fn coerce_activation_key(value: &str) -> String {
    if value.is_empty() {
        DEFAULT_ACTIVATION_KEY.to_string()
    } else {
        value.to_string()
    }
}

pub fn normalize_sites(sites: &[String]) -> Vec<String> {
    sites
        .iter()
        .map(|site| site.trim())
        .filter(|site| !site.is_empty())
        .map(|site| site.to_string())
        .collect()
}

/// Splits the one-pattern-per-line text form of the site list.
pub fn parse_site_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

fn read_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn read_number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn read_sites(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match map.get(key)? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        Value::String(text) => Some(parse_site_list(text)),
        _ => None,
    }
}
