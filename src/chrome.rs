use js_sys::{Array, Function, Object, Promise, Reflect};
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use pool_guideline_core::{decode, encode};

const RUNTIME: &[&str] = &["chrome", "runtime"];
const ON_MESSAGE: &[&str] = &["chrome", "runtime", "onMessage"];
const ON_INSTALLED: &[&str] = &["chrome", "runtime", "onInstalled"];
const STORAGE_SYNC: &[&str] = &["chrome", "storage", "sync"];
const STORAGE_ON_CHANGED: &[&str] = &["chrome", "storage", "onChanged"];
const TABS: &[&str] = &["chrome", "tabs"];

/// A message received on `chrome.runtime.onMessage`.
pub(crate) struct IncomingMessage {
    pub(crate) message: Value,
    pub(crate) sender_tab: Option<i64>,
    send_response: Function,
}

impl IncomingMessage {
    pub(crate) fn reply(&self, response: &Value) {
        let Ok(value) = to_js(response) else {
            return;
        };
        let _ = self.send_response.call1(&JsValue::NULL, &value);
    }
}

pub(crate) fn js_err(error: JsValue) -> String {
    if let Some(value) = error.as_string() {
        return value;
    }
    if let Some(message) = Reflect::get(&error, &JsValue::from_str("message"))
        .ok()
        .and_then(|value| value.as_string())
    {
        return message;
    }
    if let Ok(json) = js_sys::JSON::stringify(&error) {
        if let Some(value) = json.as_string() {
            return value;
        }
    }
    "js error".to_string()
}

pub(crate) fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    let text = encode(value).ok_or_else(|| JsValue::from_str("unencodable message"))?;
    js_sys::JSON::parse(&text)
}

pub(crate) fn from_js(value: &JsValue) -> Value {
    if value.is_undefined() {
        return Value::Null;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|json| json.as_string())
        .and_then(|json| decode::<Value>(&json))
        .unwrap_or(Value::Null)
}

fn namespace(path: &[&str]) -> Result<Object, JsValue> {
    let mut current: JsValue = js_sys::global().into();
    for segment in path {
        current = Reflect::get(&current, &JsValue::from_str(segment))?;
        if current.is_null() || current.is_undefined() {
            return Err(JsValue::from_str(&format!("{} unavailable", path.join("."))));
        }
    }
    current.dyn_into::<Object>()
}

fn call(target: &Object, method: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let func = Reflect::get(target, &JsValue::from_str(method))?.dyn_into::<Function>()?;
    let array = Array::new();
    for arg in args {
        array.push(arg);
    }
    func.apply(target, &array)
}

async fn call_async(path: &[&str], method: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let target = namespace(path)?;
    let result = call(&target, method, args)?;
    match result.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await,
        Err(value) => Ok(value),
    }
}

fn add_listener(path: &[&str], listener: &JsValue) -> Result<(), JsValue> {
    let event = namespace(path)?;
    call(&event, "addListener", &[listener.clone()])?;
    Ok(())
}

pub(crate) async fn send_message(message: &Value) -> Result<Value, JsValue> {
    let reply = call_async(RUNTIME, "sendMessage", &[to_js(message)?]).await?;
    Ok(from_js(&reply))
}

pub(crate) async fn storage_get() -> Result<Value, JsValue> {
    let items = call_async(STORAGE_SYNC, "get", &[JsValue::NULL]).await?;
    Ok(from_js(&items))
}

pub(crate) async fn storage_set(items: &Value) -> Result<(), JsValue> {
    call_async(STORAGE_SYNC, "set", &[to_js(items)?]).await?;
    Ok(())
}

pub(crate) async fn tab_ids() -> Result<Vec<i64>, JsValue> {
    let tabs = call_async(TABS, "query", &[Object::new().into()]).await?;
    let Value::Array(tabs) = from_js(&tabs) else {
        return Ok(Vec::new());
    };
    Ok(tabs
        .iter()
        .filter_map(|tab| tab.get("id").and_then(Value::as_i64))
        .collect())
}

pub(crate) async fn send_to_tab(tab_id: i64, message: &Value) -> Result<(), JsValue> {
    call_async(
        TABS,
        "sendMessage",
        &[JsValue::from_f64(tab_id as f64), to_js(message)?],
    )
    .await?;
    Ok(())
}

/// Registers `handler` for the page lifetime. The handler returns `true` when it will
/// reply after returning, which keeps the response channel open.
pub(crate) fn on_message<F>(mut handler: F) -> Result<(), JsValue>
where
    F: FnMut(IncomingMessage) -> bool + 'static,
{
    let listener = Closure::wrap(Box::new(
        move |message: JsValue, sender: JsValue, send_response: JsValue| -> JsValue {
            let Ok(send_response) = send_response.dyn_into::<Function>() else {
                return JsValue::FALSE;
            };
            let sender_tab = Reflect::get(&sender, &JsValue::from_str("tab"))
                .ok()
                .filter(JsValue::is_object)
                .and_then(|tab| Reflect::get(&tab, &JsValue::from_str("id")).ok())
                .and_then(|id| id.as_f64())
                .map(|id| id as i64);
            let keep_open = handler(IncomingMessage {
                message: from_js(&message),
                sender_tab,
                send_response,
            });
            JsValue::from_bool(keep_open)
        },
    ) as Box<dyn FnMut(JsValue, JsValue, JsValue) -> JsValue>);
    add_listener(ON_MESSAGE, listener.as_ref())?;
    listener.forget();
    Ok(())
}

pub(crate) fn on_installed<F>(mut handler: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    let listener = Closure::wrap(Box::new(move |_details: JsValue| {
        handler();
    }) as Box<dyn FnMut(JsValue)>);
    add_listener(ON_INSTALLED, listener.as_ref())?;
    listener.forget();
    Ok(())
}

/// Calls `handler` with the `{ key: { oldValue, newValue } }` map of every sync-area change.
pub(crate) fn on_storage_changed<F>(mut handler: F) -> Result<(), JsValue>
where
    F: FnMut(Value) + 'static,
{
    let listener = Closure::wrap(Box::new(move |changes: JsValue, area: JsValue| {
        if area.as_string().as_deref() != Some("sync") {
            return;
        }
        handler(from_js(&changes));
    }) as Box<dyn FnMut(JsValue, JsValue)>);
    add_listener(STORAGE_ON_CHANGED, listener.as_ref())?;
    listener.forget();
    Ok(())
}
