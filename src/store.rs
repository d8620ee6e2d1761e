use serde::{Deserialize, Serialize};

use crate::memo::TableObject;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    SetPlayerId(u32),
    SetDataObject(TableObject),
}

/// Application-wide state shared between pages and persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedStore {
    #[serde(rename = "playerId", default)]
    player_id: Option<u32>,
    #[serde(rename = "dataObject", default)]
    data_object: Option<TableObject>,
    #[serde(skip)]
    revision: u64,
}

impl SharedStore {
    pub fn dispatch(&mut self, action: StoreAction) {
        match action {
            StoreAction::SetPlayerId(id) => self.player_id = Some(id),
            StoreAction::SetDataObject(table) => self.data_object = Some(table),
        }
        self.revision += 1;
    }

    pub fn player_id(&self) -> Option<u32> {
        self.player_id
    }

    pub fn data_object(&self) -> Option<&TableObject> {
        self.data_object.as_ref()
    }

    /// Number of dispatches since load; zero means nothing to persist.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_bumps_revision() {
        let mut store = SharedStore::default();
        assert_eq!(store.revision(), 0);
        store.dispatch(StoreAction::SetPlayerId(42));
        store.dispatch(StoreAction::SetDataObject(TableObject::default()));
        assert_eq!(store.player_id(), Some(42));
        assert!(store.data_object().is_some());
        assert_eq!(store.revision(), 2);
    }
}
