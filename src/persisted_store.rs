use std::cell::RefCell;

use gloo::console;
use serde_json::{Map, Value};
use wasm_bindgen_futures::spawn_local;

use crate::chrome;
use pool_guideline_core::store::{select_key, write_patch};
use pool_guideline_core::{SettingsPatch, SettingsStore, StoreError};

thread_local! {
    static SETTINGS_CACHE: RefCell<Option<Map<String, Value>>> = RefCell::new(None);
}

/// Fills the cache from `chrome.storage.sync` once; later calls return immediately.
pub(crate) async fn bootstrap() -> Result<(), String> {
    if is_loaded() {
        return Ok(());
    }
    let items = chrome::storage_get().await.map_err(chrome::js_err)?;
    let values = items.as_object().cloned().unwrap_or_default();
    SETTINGS_CACHE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            *slot = Some(values);
        }
    });
    Ok(())
}

pub(crate) fn is_loaded() -> bool {
    SETTINGS_CACHE.with(|slot| slot.borrow().is_some())
}

/// Mirrors writes made outside this context, e.g. by the settings page.
pub(crate) fn apply_external_changes(changes: &Value) {
    let Some(changes) = changes.as_object() else {
        return;
    };
    SETTINGS_CACHE.with(|slot| {
        let mut slot = slot.borrow_mut();
        let Some(values) = slot.as_mut() else {
            return;
        };
        for (key, change) in changes {
            match change.get("newValue") {
                Some(value) => {
                    values.insert(key.clone(), value.clone());
                }
                None => {
                    values.remove(key);
                }
            }
        }
    });
}

/// `chrome.storage.sync` seen through the cache filled by [`bootstrap`]. Writes land
/// in the cache at once and reach the browser store in the background.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SyncStore;

impl SettingsStore for SyncStore {
    fn get(&self, key: Option<&str>) -> Result<Value, StoreError> {
        SETTINGS_CACHE
            .with(|slot| slot.borrow().as_ref().map(|values| select_key(values, key)))
            .ok_or_else(|| StoreError::Unavailable("settings not loaded yet".to_string()))
    }

    fn set(&mut self, patch: &SettingsPatch) -> Result<(), StoreError> {
        let cached = SETTINGS_CACHE.with(|slot| {
            let mut slot = slot.borrow_mut();
            let Some(values) = slot.as_mut() else {
                return false;
            };
            write_patch(values, patch);
            true
        });
        if !cached {
            return Err(StoreError::Unavailable("settings not loaded yet".to_string()));
        }
        let items = patch.to_value();
        spawn_local(async move {
            if let Err(err) = chrome::storage_set(&items).await {
                console::warn!("pool guideline: settings write failed", chrome::js_err(err));
            }
        });
        Ok(())
    }
}
