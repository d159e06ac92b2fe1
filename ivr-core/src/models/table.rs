use serde::Serialize;

use crate::error::IvrError;
use crate::models::call::CallRecord;

/// The whole record set, keyed by Call_ID.
///
/// Rows keep the order they were added in so the spreadsheet stays readable
/// for humans; lookups are linear. Every constructor and mutator keeps
/// Call_ID unique, so any `CallTable` handed to a store is valid to persist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CallTable {
    rows: Vec<CallRecord>,
}

impl CallTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows read out of a store, rejecting repeated ids.
    pub fn from_records(records: Vec<CallRecord>) -> Result<Self, IvrError> {
        let mut table = Self::new();
        for record in records {
            table.insert(record)?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, call_id: i64) -> bool {
        self.get(call_id).is_some()
    }

    pub fn get(&self, call_id: i64) -> Option<&CallRecord> {
        self.rows.iter().find(|r| r.call_id == call_id)
    }

    pub fn get_mut(&mut self, call_id: i64) -> Option<&mut CallRecord> {
        self.rows.iter_mut().find(|r| r.call_id == call_id)
    }

    /// Append a record whose id is not yet present.
    pub fn insert(&mut self, record: CallRecord) -> Result<(), IvrError> {
        if self.contains(record.call_id) {
            return Err(IvrError::DuplicateCallId(record.call_id));
        }
        self.rows.push(record);
        Ok(())
    }

    /// Drop any row with the same id, then append. Returns the replaced row.
    pub fn upsert(&mut self, record: CallRecord) -> Option<CallRecord> {
        let previous = self.remove(record.call_id);
        self.rows.push(record);
        previous
    }

    pub fn remove(&mut self, call_id: i64) -> Option<CallRecord> {
        let idx = self.rows.iter().position(|r| r.call_id == call_id)?;
        Some(self.rows.remove(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CallRecord> {
        self.rows.iter()
    }

    pub fn into_records(self) -> Vec<CallRecord> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a CallTable {
    type Item = &'a CallRecord;
    type IntoIter = std::slice::Iter<'a, CallRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::call::sample;

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut table = CallTable::new();
        table.insert(sample(1)).unwrap();

        let mut second = sample(1);
        second.customer_name = "B".to_string();
        let err = table.insert(second).unwrap_err();
        assert!(matches!(err, IvrError::DuplicateCallId(1)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1).unwrap().customer_name, "A");
    }

    #[test]
    fn test_from_records_rejects_duplicates() {
        let result = CallTable::from_records(vec![sample(1), sample(2), sample(1)]);
        assert!(matches!(result, Err(IvrError::DuplicateCallId(1))));
    }

    #[test]
    fn test_upsert_replaces_and_moves_to_end() {
        let mut table = CallTable::from_records(vec![sample(1), sample(2)]).unwrap();
        let mut replacement = sample(1);
        replacement.call_status = "closed".to_string();

        let previous = table.upsert(replacement.clone());
        assert_eq!(previous, Some(sample(1)));
        assert_eq!(table.len(), 2);

        let ids: Vec<i64> = table.iter().map(|r| r.call_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(table.get(1), Some(&replacement));
    }

    #[test]
    fn test_upsert_new_id_appends() {
        let mut table = CallTable::new();
        assert!(table.upsert(sample(5)).is_none());
        assert_eq!(table.get(5), Some(&sample(5)));
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut table = CallTable::from_records(vec![sample(1)]).unwrap();
        assert!(table.remove(9).is_none());
        assert_eq!(table.remove(1), Some(sample(1)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let table = CallTable::from_records(vec![sample(3)]).unwrap();
        let value = serde_json::to_value(&table).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["Call_ID"], 3);
    }
}
