use serde_json::{Map, Value};

use crate::settings::{Settings, SettingsPatch};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
    #[error("settings store rejected the write: {0}")]
    Rejected(String),
}

/// Key/value settings store. `get(None)` returns the whole object, `get(Some(key))`
/// an object holding just that key (empty when absent).
pub trait SettingsStore {
    fn get(&self, key: Option<&str>) -> Result<Value, StoreError>;
    fn set(&mut self, patch: &SettingsPatch) -> Result<(), StoreError>;
}

pub fn load_settings<S: SettingsStore + ?Sized>(store: &S) -> Result<Settings, StoreError> {
    Ok(Settings::from_value(&store.get(None)?))
}

/// Writes defaults for every key the store does not hold yet. Returns what was written.
pub fn install_defaults<S: SettingsStore + ?Sized>(
    store: &mut S,
) -> Result<SettingsPatch, StoreError> {
    let existing = store.get(None)?;
    let mut missing = Map::new();
    if let Value::Object(defaults) = Settings::default().to_value() {
        for (key, value) in defaults {
            if existing.get(&key).is_none() {
                missing.insert(key, value);
            }
        }
    }
    let patch = SettingsPatch::from_value(&Value::Object(missing));
    if !patch.is_empty() {
        store.set(&patch)?;
    }
    Ok(patch)
}

/// Copies the fields present in `patch` into a raw store map.
pub fn write_patch(map: &mut Map<String, Value>, patch: &SettingsPatch) {
    if let Value::Object(fields) = patch.to_value() {
        for (key, value) in fields {
            map.insert(key, value);
        }
    }
}

pub fn select_key(map: &Map<String, Value>, key: Option<&str>) -> Value {
    match key {
        None => Value::Object(map.clone()),
        Some(key) => {
            let mut selected = Map::new();
            if let Some(value) = map.get(key) {
                selected.insert(key.to_string(), value.clone());
            }
            Value::Object(selected)
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: Map<String, Value>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Value) -> Self {
        Self {
            values: values.as_object().cloned().unwrap_or_default(),
            unavailable: false,
        }
    }

    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: Option<&str>) -> Result<Value, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(select_key(&self.values, key))
    }

    fn set(&mut self, patch: &SettingsPatch) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        write_patch(&mut self.values, patch);
        Ok(())
    }
}
