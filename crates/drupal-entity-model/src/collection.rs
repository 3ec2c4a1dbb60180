//! Ordered collections of one entity variant.

use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;

/// Ordered sequence of [`Entity`] records sharing one variant.
///
/// The collection indexes members by their identity field but owns no
/// network state of its own; its resource path is derived from the member
/// variant's configuration.
#[derive(Debug, Clone)]
pub struct EntityCollection {
    kind: &'static EntityKind,
    models: Vec<Entity>,
}

impl EntityCollection {
    /// Create an empty collection of the given variant.
    pub fn new(kind: &'static EntityKind) -> Self {
        Self {
            kind,
            models: Vec::new(),
        }
    }

    /// The member variant configuration.
    pub fn kind(&self) -> &'static EntityKind {
        self.kind
    }

    /// Network resource path, derived from the member variant.
    pub fn resource_path(&self) -> String {
        format!("/{}", self.kind.entity_type)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Members in order.
    pub fn models(&self) -> &[Entity] {
        &self.models
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.models.iter()
    }

    /// Member with the given identity, if present.
    pub fn get(&self, id: i64) -> Option<&Entity> {
        self.models.iter().find(|m| m.id() == Some(id))
    }

    /// Mutable member with the given identity, if present.
    pub fn get_mut(&mut self, id: i64) -> Option<&mut Entity> {
        self.models.iter_mut().find(|m| m.id() == Some(id))
    }

    /// Append one member. Fails when the variant does not match.
    pub fn push(&mut self, entity: Entity) -> ModelResult<()> {
        self.check_kind(&entity)?;
        self.models.push(entity);
        Ok(())
    }

    /// Remove the member with the given identity.
    pub fn remove(&mut self, id: i64) -> Option<Entity> {
        let index = self.models.iter().position(|m| m.id() == Some(id))?;
        Some(self.models.remove(index))
    }

    /// Merge fetched records into the collection.
    ///
    /// With `remove` set the incoming sequence replaces the members
    /// wholesale. Otherwise records are upserted by identity: existing
    /// members are updated in place (order preserved) and unseen records are
    /// appended in their incoming order.
    pub fn merge(&mut self, incoming: Vec<Entity>, remove: bool) -> ModelResult<()> {
        for entity in &incoming {
            self.check_kind(entity)?;
        }
        if remove {
            self.models = incoming;
            return Ok(());
        }
        for entity in incoming {
            match entity.id().and_then(|id| {
                self.models.iter().position(|m| m.id() == Some(id))
            }) {
                Some(index) => self.models[index] = entity,
                None => self.models.push(entity),
            }
        }
        Ok(())
    }

    fn check_kind(&self, entity: &Entity) -> ModelResult<()> {
        if entity.kind() != self.kind {
            return Err(ModelError::KindMismatch {
                expected: self.kind.name,
                actual: entity.kind().name,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind;
    use serde_json::json;

    fn node(id: i64, title: &str) -> Entity {
        Entity::from_wire(&kind::NODE, json!({"nid": id, "title": title})).unwrap()
    }

    #[test]
    fn test_resource_path_from_member_variant() {
        assert_eq!(EntityCollection::new(&kind::NODE).resource_path(), "/node");
        assert_eq!(
            EntityCollection::new(&kind::TAXONOMY_TERM).resource_path(),
            "/taxonomy_term"
        );
    }

    #[test]
    fn test_push_and_lookup_by_id() {
        let mut collection = EntityCollection::new(&kind::NODE);
        collection.push(node(1, "a")).unwrap();
        collection.push(node(2, "b")).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(2).and_then(Entity::label), Some("b"));
        assert!(collection.get(3).is_none());
    }

    #[test]
    fn test_push_rejects_kind_mismatch() {
        let mut collection = EntityCollection::new(&kind::NODE);
        let user = Entity::new(&kind::USER);
        let err = collection.push(user).unwrap_err();
        assert!(matches!(err, ModelError::KindMismatch { .. }));
    }

    #[test]
    fn test_merge_replace() {
        let mut collection = EntityCollection::new(&kind::NODE);
        collection.push(node(1, "a")).unwrap();
        collection.merge(vec![node(2, "b"), node(3, "c")], true).unwrap();
        assert_eq!(collection.len(), 2);
        assert!(collection.get(1).is_none());
        assert_eq!(collection.models()[0].id(), Some(2));
    }

    #[test]
    fn test_merge_upsert_preserves_order() {
        let mut collection = EntityCollection::new(&kind::NODE);
        collection.push(node(1, "a")).unwrap();
        collection.push(node(2, "b")).unwrap();
        collection
            .merge(vec![node(2, "b-updated"), node(4, "d")], false)
            .unwrap();
        assert_eq!(collection.len(), 3);
        let ids: Vec<_> = collection.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(4)]);
        assert_eq!(collection.get(2).and_then(Entity::label), Some("b-updated"));
    }

    #[test]
    fn test_merge_appends_unsaved_records() {
        let mut collection = EntityCollection::new(&kind::NODE);
        let draft = Entity::new(&kind::NODE);
        collection.merge(vec![draft], false).unwrap();
        assert_eq!(collection.len(), 1);
        assert!(collection.models()[0].is_new());
    }

    #[test]
    fn test_remove_by_id() {
        let mut collection = EntityCollection::new(&kind::NODE);
        collection.push(node(1, "a")).unwrap();
        collection.push(node(2, "b")).unwrap();
        let removed = collection.remove(1);
        assert_eq!(removed.and_then(|e| e.id()), Some(1));
        assert_eq!(collection.len(), 1);
        assert!(collection.remove(9).is_none());
    }
}
