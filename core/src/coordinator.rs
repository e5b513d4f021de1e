use crate::protocol::{Request, Response, ACTION_GET_DETECTION_STATUS};
use crate::settings::{Settings, SettingsPatch};
use crate::store::{install_defaults, load_settings, SettingsStore, StoreError};

/// Identifies one page instance (a browser tab).
pub type InstanceId = i64;

/// Push channel to every live page instance. Delivery is best effort; instances that
/// are gone are skipped silently.
pub trait Broadcast {
    fn publish(&self, request: &Request, except: Option<InstanceId>);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("`{0}` is answered by the page instance")]
    NotHandled(&'static str),
}

/// Background side of the extension: owns the settings store and fans changes out.
pub struct Coordinator<S, B> {
    store: S,
    broadcast: B,
}

impl<S: SettingsStore, B: Broadcast> Coordinator<S, B> {
    pub fn new(store: S, broadcast: B) -> Self {
        Self { store, broadcast }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn broadcast(&self) -> &B {
        &self.broadcast
    }

    pub fn install(&mut self) -> Result<SettingsPatch, StoreError> {
        install_defaults(&mut self.store)
    }

    pub fn settings(&self) -> Result<Settings, StoreError> {
        load_settings(&self.store)
    }

    pub fn handle(
        &mut self,
        request: Request,
        sender: Option<InstanceId>,
    ) -> Result<Response, CoordinatorError> {
        match request {
            Request::GetSettings => Ok(Response::Settings {
                settings: self.settings()?,
            }),
            Request::ToggleEnabled => {
                let enabled = !self.settings()?.enabled;
                self.write(SettingsPatch::enabled(enabled), sender)?;
                Ok(Response::Enabled { enabled })
            }
            Request::UpdateSettings { settings } => {
                let success = self.write(settings, sender).is_ok();
                Ok(Response::Success { success })
            }
            Request::ToggleManualMode => {
                let manual_mode = !self.settings()?.manual_mode;
                self.write(SettingsPatch::manual_mode(manual_mode), sender)?;
                Ok(Response::ManualMode { manual_mode })
            }
            Request::GetDetectionStatus => {
                Err(CoordinatorError::NotHandled(ACTION_GET_DETECTION_STATUS))
            }
        }
    }

    fn write(
        &mut self,
        patch: SettingsPatch,
        sender: Option<InstanceId>,
    ) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }
        self.store.set(&patch)?;
        self.broadcast
            .publish(&Request::UpdateSettings { settings: patch }, sender);
        Ok(())
    }
}
