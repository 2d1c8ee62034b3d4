//! In-memory menu store.
//!
//! A bounded map from menu id to [`MenuRecord`], shared process-wide via
//! `AppState` and substitutable with a fresh instance per test run. When the
//! store is full the oldest insertion is evicted; eviction drops only the
//! in-memory entry, never the files on disk.
//!
//! Concurrent parse calls against the same id are not ordered — the last
//! writer to the pages field wins.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use uuid::Uuid;

use crate::models::menu::{MenuRecord, PageOutcome};

pub struct MenuStore {
    inner: RwLock<StoreInner>,
    capacity: usize,
}

struct StoreInner {
    entries: HashMap<Uuid, MenuRecord>,
    // Insertion order, oldest at the front.
    order: VecDeque<Uuid>,
}

impl MenuStore {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "store capacity must be positive");
        MenuStore {
            inner: RwLock::new(StoreInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity,
        }
    }

    /// Registers a freshly uploaded menu, evicting the oldest entry if the
    /// store is at capacity.
    pub fn insert(&self, record: MenuRecord) {
        let mut inner = self.inner.write().expect("menu store lock poisoned");
        if inner.entries.len() >= self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.entries.remove(&evicted);
                tracing::debug!("Evicted menu {evicted} from store");
            }
        }
        inner.order.push_back(record.menu_id);
        inner.entries.insert(record.menu_id, record);
    }

    pub fn get(&self, menu_id: &Uuid) -> Option<MenuRecord> {
        self.inner
            .read()
            .expect("menu store lock poisoned")
            .entries
            .get(menu_id)
            .cloned()
    }

    /// Transitions a menu from `created` to `parsed` by attaching its page
    /// outcomes. Returns false if the menu is no longer in the store.
    pub fn attach_pages(&self, menu_id: &Uuid, pages: Vec<PageOutcome>) -> bool {
        let mut inner = self.inner.write().expect("menu store lock poisoned");
        match inner.entries.get_mut(menu_id) {
            Some(record) => {
                record.pages = Some(pages);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("menu store lock poisoned")
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
