//! Generic server-backed entity record.

use crate::coerce::{self, CoercionMode};
use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use serde_json::{Map, Value};

/// Fields the server adds to responses that must never round-trip back.
const SERVER_ONLY_FIELDS: &[&str] = &["rdf_mapping"];

/// One server-side record of a configured entity variant.
///
/// The attribute map holds the canonical in-memory representation: every
/// field listed in the variant's integer/boolean sets is coerced on each
/// write, so wire format quirks never leak past [`Entity::set`].
#[derive(Debug, Clone)]
pub struct Entity {
    kind: &'static EntityKind,
    mode: CoercionMode,
    attrs: Map<String, Value>,
}

impl Entity {
    /// Create an empty, unsaved entity of the given variant.
    pub fn new(kind: &'static EntityKind) -> Self {
        Self::with_mode(kind, CoercionMode::default())
    }

    /// Create an empty, unsaved entity with an explicit coercion mode.
    pub fn with_mode(kind: &'static EntityKind, mode: CoercionMode) -> Self {
        Self {
            kind,
            mode,
            attrs: Map::new(),
        }
    }

    /// Hydrate an entity from a wire record, coercing every configured field.
    pub fn from_wire(kind: &'static EntityKind, record: Value) -> ModelResult<Self> {
        Self::from_wire_with_mode(kind, record, CoercionMode::default())
    }

    /// [`Entity::from_wire`] with an explicit coercion mode.
    pub fn from_wire_with_mode(
        kind: &'static EntityKind,
        record: Value,
        mode: CoercionMode,
    ) -> ModelResult<Self> {
        let mut entity = Self::with_mode(kind, mode);
        entity.merge_wire(record)?;
        Ok(entity)
    }

    /// The variant configuration this entity was built with.
    pub fn kind(&self) -> &'static EntityKind {
        self.kind
    }

    /// Current attribute value, canonical form.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attrs.get(field)
    }

    /// The identity assigned by the server, if any.
    pub fn id(&self) -> Option<i64> {
        self.attrs.get(self.kind.id_key).map(coerce::coerce_integer)
    }

    /// Whether this record has never been saved (no server identity).
    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Value of the variant's display field.
    pub fn label(&self) -> Option<&str> {
        self.attrs.get(self.kind.label_key).and_then(Value::as_str)
    }

    /// Value of the variant's sub-type field, if the variant has one.
    pub fn bundle(&self) -> Option<&str> {
        let key = self.kind.bundle_key?;
        self.attrs.get(key).and_then(Value::as_str)
    }

    fn coerce_field(&self, field: &str, value: Value) -> ModelResult<Value> {
        if self.kind.is_integer_field(field) {
            Ok(Value::from(self.mode.integer(field, &value)?))
        } else if self.kind.is_boolean_field(field) {
            Ok(Value::Bool(self.mode.boolean(field, &value)?))
        } else {
            Ok(value)
        }
    }

    /// Set one field, coercing it per the variant configuration.
    ///
    /// The identity field is always integer-coerced, even when the variant
    /// does not list it.
    pub fn set(&mut self, field: &str, value: Value) -> ModelResult<()> {
        let coerced = self.coerce_field(field, value)?;
        self.attrs.insert(field.to_string(), coerced);
        Ok(())
    }

    /// Set a batch of fields, each coerced as in [`Entity::set`].
    ///
    /// The batch commits atomically: every field is coerced into a staging
    /// map first, so a strict-mode failure leaves the entity untouched
    /// instead of half-merged.
    pub fn set_many(&mut self, fields: Map<String, Value>) -> ModelResult<()> {
        let mut staged = Map::with_capacity(fields.len());
        for (field, value) in fields {
            let coerced = self.coerce_field(&field, value)?;
            staged.insert(field, coerced);
        }
        self.attrs.extend(staged);
        Ok(())
    }

    /// Merge a wire record into this entity, coercing every field.
    pub fn merge_wire(&mut self, record: Value) -> ModelResult<()> {
        match record {
            Value::Object(fields) => self.set_many(fields),
            other => Err(ModelError::NotARecord(other.to_string())),
        }
    }

    /// Raw attribute map. Mutations bypass coercion; [`Entity::serialize`]
    /// re-applies it defensively.
    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    /// Mutable raw attribute map.
    pub fn attrs_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attrs
    }

    /// Resource path without the variant's fetch query.
    ///
    /// Writes (create/update) go here; the payload-suppression parameters
    /// only make sense on reads.
    pub fn write_path(&self) -> String {
        match self.id() {
            None => format!("/{}", self.kind.entity_type),
            Some(id) => format!("/{}/{}", self.kind.entity_type, id),
        }
    }

    /// Network resource path for this record.
    ///
    /// `/{entity_type}` while unsaved; `/{entity_type}/{id}` once saved, with
    /// the variant's fetch query appended when it has one.
    pub fn resource_path(&self) -> String {
        let Some(id) = self.id() else {
            return format!("/{}", self.kind.entity_type);
        };
        let mut path = format!("/{}/{}", self.kind.entity_type, id);
        if !self.kind.fetch_query.is_empty() {
            let query: Vec<String> = self
                .kind
                .fetch_query
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            path.push('?');
            path.push_str(&query.join("&"));
        }
        path
    }

    /// Produce the wire record for this entity.
    ///
    /// Integer fields are re-coerced, boolean fields follow the true-or-absent
    /// output rule, and server-only fields (`rdf_mapping`) are stripped. The
    /// re-coercion is deliberately lenient in every mode so a serialize can
    /// never fail on attributes mutated through [`Entity::attrs_mut`].
    pub fn serialize(&self) -> Value {
        let mut record = Map::with_capacity(self.attrs.len());
        for (field, value) in &self.attrs {
            if SERVER_ONLY_FIELDS.contains(&field.as_str()) {
                continue;
            }
            if self.kind.is_integer_field(field) {
                record.insert(field.clone(), Value::from(coerce::coerce_integer(value)));
            } else if self.kind.is_boolean_field(field) {
                if let Some(true) = coerce::coerce_bool_output(value) {
                    record.insert(field.clone(), Value::Bool(true));
                }
            } else {
                record.insert(field.clone(), value.clone());
            }
        }
        Value::Object(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_new_entity_is_unsaved() {
        let node = Entity::new(&kind::NODE);
        assert!(node.is_new());
        assert_eq!(node.id(), None);
        assert_eq!(node.resource_path(), "/node");
    }

    #[test]
    fn test_resource_path_after_identity_assigned() {
        let mut node = Entity::new(&kind::NODE);
        node.set("nid", json!(42)).unwrap();
        assert_eq!(node.resource_path(), "/node/42");
    }

    #[test]
    fn test_file_resource_path_suppresses_payload_fields() {
        let mut file = Entity::new(&kind::FILE);
        file.set("fid", json!(7)).unwrap();
        assert_eq!(
            file.resource_path(),
            "/file/7?file_contents=0&image_styles=0"
        );
    }

    #[test]
    fn test_unsaved_file_resource_path_has_no_query() {
        let file = Entity::new(&kind::FILE);
        assert_eq!(file.resource_path(), "/file");
    }

    #[test]
    fn test_set_coerces_identity_from_string() {
        let mut node = Entity::new(&kind::NODE);
        node.set("nid", json!("42")).unwrap();
        assert_eq!(node.id(), Some(42));
        assert_eq!(node.get("nid"), Some(&json!(42)));
    }

    #[test]
    fn test_set_coerces_boolean_fields() {
        let mut node = Entity::new(&kind::NODE);
        node.set("status", json!("1")).unwrap();
        node.set("sticky", json!(0)).unwrap();
        assert_eq!(node.get("status"), Some(&json!(true)));
        assert_eq!(node.get("sticky"), Some(&json!(false)));
    }

    #[test]
    fn test_set_leaves_unconfigured_fields_alone() {
        let mut node = Entity::new(&kind::NODE);
        node.set("title", json!("Hello")).unwrap();
        assert_eq!(node.get("title"), Some(&json!("Hello")));
    }

    #[test]
    fn test_from_wire_hydrates_and_coerces() {
        let node = Entity::from_wire(
            &kind::NODE,
            json!({
                "nid": "12",
                "uid": "3",
                "status": "1",
                "title": "First post",
                "type": "article"
            }),
        )
        .unwrap();
        assert_eq!(node.id(), Some(12));
        assert_eq!(node.get("uid"), Some(&json!(3)));
        assert_eq!(node.get("status"), Some(&json!(true)));
        assert_eq!(node.label(), Some("First post"));
        assert_eq!(node.bundle(), Some("article"));
    }

    #[test]
    fn test_from_wire_rejects_non_object() {
        let err = Entity::from_wire(&kind::NODE, json!([1, 2])).unwrap_err();
        assert!(matches!(err, ModelError::NotARecord(_)));
    }

    #[test]
    fn test_bundle_is_none_without_bundle_key() {
        let mut user = Entity::new(&kind::USER);
        user.set("name", json!("admin")).unwrap();
        assert_eq!(user.bundle(), None);
        assert_eq!(user.label(), Some("admin"));
    }

    #[test]
    fn test_serialize_strips_rdf_mapping() {
        let node = Entity::from_wire(
            &kind::NODE,
            json!({"nid": 1, "title": "x", "rdf_mapping": {"rdftype": ["sioc:Item"]}}),
        )
        .unwrap();
        let record = object(node.serialize());
        assert!(!record.contains_key("rdf_mapping"));
        assert!(record.contains_key("title"));
    }

    #[test]
    fn test_serialize_boolean_true_or_absent() {
        let mut node = Entity::new(&kind::NODE);
        node.set("status", json!(1)).unwrap();
        node.set("promote", json!(0)).unwrap();
        node.set("sticky", json!(false)).unwrap();
        let record = object(node.serialize());
        assert_eq!(record.get("status"), Some(&json!(true)));
        assert!(!record.contains_key("promote"));
        assert!(!record.contains_key("sticky"));
    }

    #[test]
    fn test_serialize_recoerces_out_of_band_mutations() {
        let mut node = Entity::new(&kind::NODE);
        node.attrs_mut().insert("uid".to_string(), json!("7"));
        node.attrs_mut().insert("status".to_string(), json!("1"));
        let record = object(node.serialize());
        assert_eq!(record.get("uid"), Some(&json!(7)));
        assert_eq!(record.get("status"), Some(&json!(true)));
    }

    #[test]
    fn test_file_write_path_has_no_fetch_query() {
        let mut file = Entity::new(&kind::FILE);
        file.set("fid", json!(7)).unwrap();
        assert_eq!(file.write_path(), "/file/7");
        assert_eq!(Entity::new(&kind::FILE).write_path(), "/file");
    }

    #[test]
    fn test_write_path_matches_resource_path_without_fetch_query() {
        let mut node = Entity::new(&kind::NODE);
        node.set("nid", json!(42)).unwrap();
        assert_eq!(node.write_path(), node.resource_path());
    }

    #[test]
    fn test_strict_merge_failure_leaves_entity_unchanged() {
        let mut node = Entity::with_mode(&kind::NODE, CoercionMode::Strict);
        node.set("title", json!("old title")).unwrap();

        let err = node
            .merge_wire(json!({"title": "new title", "uid": "not-a-number"}))
            .unwrap_err();
        assert!(matches!(err, ModelError::Coercion { .. }));

        // The failed merge committed nothing, not even the fields that
        // coerced cleanly before the bad one
        assert_eq!(node.get("title"), Some(&json!("old title")));
        assert!(node.get("uid").is_none());
    }

    #[test]
    fn test_strict_mode_surfaces_coercion_errors() {
        let mut node = Entity::with_mode(&kind::NODE, CoercionMode::Strict);
        let err = node.set("uid", json!("not-a-number")).unwrap_err();
        assert!(matches!(err, ModelError::Coercion { .. }));
        assert!(node.get("uid").is_none());
    }

    #[test]
    fn test_lenient_mode_degrades_silently() {
        let mut node = Entity::new(&kind::NODE);
        node.set("uid", json!("not-a-number")).unwrap();
        assert_eq!(node.get("uid"), Some(&json!(0)));
    }
}
