use crate::error::AppError;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Initializing,
    Running,
    Stopping,
    Stopped,
}

pub struct StateManager {
    state: Arc<RwLock<AppState>>,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(AppState::Initializing)),
        }
    }

    pub fn transition(&self, new_state: AppState) -> Result<(), AppError> {
        let mut current = self.state.write();

        let valid = matches!(
            (&*current, &new_state),
            (AppState::Initializing, AppState::Running)
                | (AppState::Running, AppState::Stopping)
                | (AppState::Stopping, AppState::Stopped)
        );

        if !valid {
            return Err(AppError::Fatal(format!(
                "Invalid state transition: {:?} -> {:?}",
                *current, new_state
            )));
        }

        tracing::info!("State transition: {:?} -> {:?}", *current, new_state);
        *current = new_state;
        Ok(())
    }

    pub fn current(&self) -> AppState {
        self.state.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_lifecycle_is_valid() {
        let mgr = StateManager::new();
        assert_eq!(mgr.current(), AppState::Initializing);
        mgr.transition(AppState::Running).unwrap();
        mgr.transition(AppState::Stopping).unwrap();
        mgr.transition(AppState::Stopped).unwrap();
        assert_eq!(mgr.current(), AppState::Stopped);
    }

    #[test]
    fn skipping_states_is_rejected() {
        let mgr = StateManager::new();
        assert!(mgr.transition(AppState::Stopped).is_err());
        assert_eq!(mgr.current(), AppState::Initializing);
    }
}
