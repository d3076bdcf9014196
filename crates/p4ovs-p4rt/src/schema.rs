//! Pipeline schema document and name resolution.
//!
//! The schema is the pipeline's declarative self-description, fetched once
//! per session from the device and passed by reference into every entry
//! builder. Lookups are linear scans over the descriptor lists; schemas
//! are small (tens of tables) and resolved names are not cached.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};

/// Match algorithm declared for a table key field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Ternary,
    Lpm,
    Optional,
}

/// One match-field descriptor inside a table descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFieldSchema {
    pub name: String,
    pub id: u32,
    pub kind: MatchKind,
}

/// One table descriptor: name, numeric id, and its declared match fields
/// in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub id: u32,
    pub match_fields: Vec<MatchFieldSchema>,
}

/// One action parameter descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParamSchema {
    pub name: String,
    pub id: u32,
}

/// One action descriptor: name, numeric id, and its parameters in
/// declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSchema {
    pub name: String,
    pub id: u32,
    pub params: Vec<ActionParamSchema>,
}

/// The pipeline schema: every table and action the target pipeline
/// exposes. Immutable once obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSchema {
    pub tables: Vec<TableSchema>,
    pub actions: Vec<ActionSchema>,
}

impl PipelineSchema {
    /// Resolves a table name to its numeric id.
    pub fn table_id(&self, name: &str) -> Result<u32, SchemaError> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.id)
            .ok_or_else(|| SchemaError::TableNotFound(name.to_string()))
    }

    /// Resolves an action name to its numeric id.
    pub fn action_id(&self, name: &str) -> Result<u32, SchemaError> {
        self.actions
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.id)
            .ok_or_else(|| SchemaError::ActionNotFound(name.to_string()))
    }

    /// Resolves a match-field name within a table to its numeric id.
    pub fn match_field_id(&self, table: &str, field: &str) -> Result<u32, SchemaError> {
        let t = self
            .tables
            .iter()
            .find(|t| t.name == table)
            .ok_or_else(|| SchemaError::TableNotFound(table.to_string()))?;
        t.match_fields
            .iter()
            .find(|mf| mf.name == field)
            .map(|mf| mf.id)
            .ok_or_else(|| SchemaError::MatchFieldNotFound {
                table: table.to_string(),
                field: field.to_string(),
            })
    }

    /// Resolves a parameter name within an action to its numeric id.
    pub fn param_id(&self, action: &str, param: &str) -> Result<u32, SchemaError> {
        let a = self
            .actions
            .iter()
            .find(|a| a.name == action)
            .ok_or_else(|| SchemaError::ActionNotFound(action.to_string()))?;
        a.params
            .iter()
            .find(|p| p.name == param)
            .map(|p| p.id)
            .ok_or_else(|| SchemaError::ParamNotFound {
                action: action.to_string(),
                param: param.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_schema() -> PipelineSchema {
        PipelineSchema {
            tables: vec![TableSchema {
                name: "ingress.l2_fwd".to_string(),
                id: 40001,
                match_fields: vec![
                    MatchFieldSchema {
                        name: "dst_mac".to_string(),
                        id: 1,
                        kind: MatchKind::Exact,
                    },
                    MatchFieldSchema {
                        name: "bridge_id".to_string(),
                        id: 2,
                        kind: MatchKind::Exact,
                    },
                ],
            }],
            actions: vec![ActionSchema {
                name: "ingress.l2_fwd.fwd".to_string(),
                id: 20001,
                params: vec![ActionParamSchema {
                    name: "port".to_string(),
                    id: 1,
                }],
            }],
        }
    }

    #[test]
    fn test_resolve_table_and_action() {
        let schema = sample_schema();
        assert_eq!(schema.table_id("ingress.l2_fwd").unwrap(), 40001);
        assert_eq!(schema.action_id("ingress.l2_fwd.fwd").unwrap(), 20001);
    }

    #[test]
    fn test_resolve_match_field_and_param() {
        let schema = sample_schema();
        assert_eq!(schema.match_field_id("ingress.l2_fwd", "bridge_id").unwrap(), 2);
        assert_eq!(schema.param_id("ingress.l2_fwd.fwd", "port").unwrap(), 1);
    }

    #[test]
    fn test_table_not_found() {
        let schema = sample_schema();
        assert_eq!(
            schema.table_id("ingress.missing"),
            Err(SchemaError::TableNotFound("ingress.missing".to_string()))
        );
    }

    #[test]
    fn test_field_not_found_in_existing_table() {
        let schema = sample_schema();
        let err = schema.match_field_id("ingress.l2_fwd", "vni").unwrap_err();
        assert!(matches!(err, SchemaError::MatchFieldNotFound { .. }));
    }

    #[test]
    fn test_param_not_found_in_existing_action() {
        let schema = sample_schema();
        let err = schema.param_id("ingress.l2_fwd.fwd", "vlan").unwrap_err();
        assert!(matches!(err, SchemaError::ParamNotFound { .. }));
    }

    #[test]
    fn test_deserialize_schema_document() {
        let doc = r#"{
            "tables": [{
                "name": "ingress.l2_fwd",
                "id": 40001,
                "match_fields": [
                    {"name": "dst_mac", "id": 1, "kind": "exact"},
                    {"name": "vid", "id": 2, "kind": "ternary"}
                ]
            }],
            "actions": [{
                "name": "ingress.l2_fwd.fwd",
                "id": 20001,
                "params": [{"name": "port", "id": 1}]
            }]
        }"#;
        let schema: PipelineSchema = serde_json::from_str(doc).unwrap();
        assert_eq!(schema.table_id("ingress.l2_fwd").unwrap(), 40001);
        assert_eq!(
            schema.tables[0].match_fields[1].kind,
            MatchKind::Ternary
        );
    }
}
