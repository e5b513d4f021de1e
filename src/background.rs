use std::cell::RefCell;

use gloo::console;
use wasm_bindgen_futures::spawn_local;

use crate::chrome::{self, IncomingMessage};
use crate::persisted_store::{self, SyncStore};
use pool_guideline_core::{
    decode_request, encode_request, encode_response, Broadcast, Coordinator, CoordinatorError,
    InstanceId, Request,
};

thread_local! {
    static COORDINATOR: RefCell<Option<Coordinator<SyncStore, TabBroadcast>>> = RefCell::new(None);
}

/// Pushes requests to every open tab's overlay instance.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TabBroadcast;

impl Broadcast for TabBroadcast {
    fn publish(&self, request: &Request, except: Option<InstanceId>) {
        let message = encode_request(request);
        spawn_local(async move {
            let tabs = match chrome::tab_ids().await {
                Ok(tabs) => tabs,
                Err(err) => {
                    console::warn!("pool guideline: tab query failed", chrome::js_err(err));
                    return;
                }
            };
            for tab in tabs.into_iter().filter(|tab| Some(*tab) != except) {
                // Tabs without an overlay instance reject the message.
                let _ = chrome::send_to_tab(tab, &message).await;
            }
        });
    }
}

fn with_coordinator<R>(
    f: impl FnOnce(&mut Coordinator<SyncStore, TabBroadcast>) -> R,
) -> Option<R> {
    COORDINATOR.with(|slot| slot.borrow_mut().as_mut().map(f))
}

pub(crate) fn start() {
    COORDINATOR.with(|slot| {
        *slot.borrow_mut() = Some(Coordinator::new(SyncStore, TabBroadcast));
    });
    if let Err(err) = chrome::on_installed(|| spawn_local(install_defaults())) {
        console::warn!("pool guideline: install hook unavailable", chrome::js_err(err));
    }
    if let Err(err) = chrome::on_message(handle_message) {
        console::warn!("pool guideline: message hook unavailable", chrome::js_err(err));
    }
    if let Err(err) = chrome::on_storage_changed(|changes| {
        persisted_store::apply_external_changes(&changes)
    }) {
        console::warn!("pool guideline: storage hook unavailable", chrome::js_err(err));
    }
    console::log!("pool guideline: background started");
}

async fn install_defaults() {
    if let Err(err) = persisted_store::bootstrap().await {
        console::warn!("pool guideline: settings load failed", err);
        return;
    }
    match with_coordinator(|coordinator| coordinator.install()) {
        Some(Ok(written)) if !written.is_empty() => {
            console::log!("pool guideline: defaults installed", written.to_value().to_string());
        }
        Some(Err(err)) => console::warn!("pool guideline: defaults not installed", err.to_string()),
        _ => {}
    }
}

fn handle_message(incoming: IncomingMessage) -> bool {
    let request = match decode_request(&incoming.message) {
        Ok(request) => request,
        Err(err) => {
            console::warn!("pool guideline: ignored message", err.to_string());
            return false;
        }
    };
    if request == Request::GetDetectionStatus {
        return false;
    }
    spawn_local(async move {
        if let Err(err) = persisted_store::bootstrap().await {
            console::warn!("pool guideline: settings load failed", err);
        }
        let action = request.action();
        let Some(result) =
            with_coordinator(|coordinator| coordinator.handle(request, incoming.sender_tab))
        else {
            return;
        };
        match result {
            Ok(response) => incoming.reply(&encode_response(&response)),
            Err(CoordinatorError::NotHandled(_)) => {}
            Err(err) => console::warn!("pool guideline: request failed", action, err.to_string()),
        }
    });
    true
}
