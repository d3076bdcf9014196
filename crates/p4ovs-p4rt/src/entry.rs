//! Table-entry descriptors and request shapes.
//!
//! A [`TableEntry`] is one row to insert, delete, or read in a forwarding
//! table: resolved table id, match-field values in the table's declared
//! key order, and, for inserts only, the action with its parameters in
//! declared order. Delete and read requests are match-only templates.
//!
//! Entries are built fresh per call and consumed immediately by the
//! session; nothing is reused across tables or calls.

use serde::{Deserialize, Serialize};

/// Insert/delete intent of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryOp {
    Insert,
    Delete,
}

impl EntryOp {
    /// Returns true for the insert intent.
    pub fn is_insert(&self) -> bool {
        matches!(self, EntryOp::Insert)
    }
}

/// A match-field value: exact or ternary-with-mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchValue {
    Exact(Vec<u8>),
    Ternary { value: Vec<u8>, mask: Vec<u8> },
}

/// One resolved match field of a table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub field_id: u32,
    pub value: MatchValue,
}

/// One resolved action parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParam {
    pub param_id: u32,
    pub value: Vec<u8>,
}

/// A resolved action with its parameters in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub action_id: u32,
    pub params: Vec<ActionParam>,
}

/// One row to program. `action` is `None` for deletes and read templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub table_id: u32,
    /// Entry priority; required by tables with ternary keys.
    pub priority: Option<i32>,
    pub matches: Vec<FieldMatch>,
    pub action: Option<ActionSpec>,
}

impl TableEntry {
    /// Creates an empty entry for the given table id.
    pub fn new(table_id: u32) -> Self {
        Self {
            table_id,
            ..Default::default()
        }
    }

    /// Appends an exact match field.
    pub fn match_exact(&mut self, field_id: u32, value: Vec<u8>) -> &mut Self {
        self.matches.push(FieldMatch {
            field_id,
            value: MatchValue::Exact(value),
        });
        self
    }

    /// Appends a ternary match field with mask.
    pub fn match_ternary(&mut self, field_id: u32, value: Vec<u8>, mask: Vec<u8>) -> &mut Self {
        self.matches.push(FieldMatch {
            field_id,
            value: MatchValue::Ternary { value, mask },
        });
        self
    }

    /// Sets the action, replacing any previous one.
    pub fn set_action(&mut self, action_id: u32) -> &mut ActionSpec {
        self.action = Some(ActionSpec {
            action_id,
            params: Vec::new(),
        });
        self.action.as_mut().unwrap()
    }

    /// Looks up an action parameter value by parameter id.
    pub fn param_value(&self, param_id: u32) -> Option<&[u8]> {
        self.action
            .as_ref()?
            .params
            .iter()
            .find(|p| p.param_id == param_id)
            .map(|p| p.value.as_slice())
    }
}

impl ActionSpec {
    /// Appends a parameter in declared order.
    pub fn param(&mut self, param_id: u32, value: Vec<u8>) -> &mut Self {
        self.params.push(ActionParam { param_id, value });
        self
    }
}

/// One write against the device: an entry plus the insert/delete intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    pub op: EntryOp,
    pub entry: TableEntry,
}

impl WriteRequest {
    pub fn new(op: EntryOp, entry: TableEntry) -> Self {
        Self { op, entry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_preserves_match_order() {
        let mut entry = TableEntry::new(7);
        entry.match_exact(3, vec![0xaa]);
        entry.match_ternary(1, vec![0x12, 0x34], vec![0xff, 0xff]);

        assert_eq!(entry.matches.len(), 2);
        assert_eq!(entry.matches[0].field_id, 3);
        assert_eq!(entry.matches[1].field_id, 1);
    }

    #[test]
    fn test_action_params_in_declared_order() {
        let mut entry = TableEntry::new(1);
        let action = entry.set_action(42);
        action.param(2, vec![1]).param(1, vec![2]);

        let spec = entry.action.as_ref().unwrap();
        assert_eq!(spec.action_id, 42);
        assert_eq!(spec.params[0].param_id, 2);
        assert_eq!(spec.params[1].param_id, 1);
        assert_eq!(entry.param_value(1), Some(&[2u8][..]));
        assert_eq!(entry.param_value(9), None);
    }

    #[test]
    fn test_delete_template_has_no_action() {
        let mut entry = TableEntry::new(5);
        entry.match_exact(1, vec![0x01]);
        assert!(entry.action.is_none());
        assert_eq!(entry.param_value(1), None);
    }
}
