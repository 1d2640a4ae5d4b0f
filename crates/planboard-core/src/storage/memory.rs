//! In-process activity store.

use std::cell::RefCell;

use crate::activity::Activity;
use crate::error::StoreError;

use super::ActivityStore;

/// Keeps records in memory, in insertion order. Replacing a record keeps its
/// position.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<Vec<Activity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Activity>) -> Self {
        Self {
            records: RefCell::new(records),
        }
    }

    pub fn get(&self, id: &str) -> Option<Activity> {
        self.records.borrow().iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl ActivityStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Activity>, StoreError> {
        Ok(self.records.borrow().clone())
    }

    fn save(&self, activity: &Activity) -> Result<(), StoreError> {
        let mut records = self.records.borrow_mut();
        match records.iter_mut().find(|a| a.id == activity.id) {
            Some(existing) => *existing = activity.clone(),
            None => records.push(activity.clone()),
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.records.borrow_mut().retain(|a| a.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::date::parse_date;
    use crate::activity::{ActivityDraft, Board, Status};

    #[test]
    fn save_replaces_in_place() {
        let day = parse_date("startDate", "2024-04-01").unwrap();
        let store = MemoryStore::new();
        let first = ActivityDraft::new("One", day, day, Board::Excel, Status::House)
            .into_activity("a".into());
        let second = ActivityDraft::new("Two", day, day, Board::Excel, Status::House)
            .into_activity("b".into());
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        let mut renamed = first.clone();
        renamed.activity_name = "Uno".into();
        store.save(&renamed).unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].activity_name, "Uno");

        store.delete("a").unwrap();
        store.delete("missing").unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("a").is_none());
    }
}
