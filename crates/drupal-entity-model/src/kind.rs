//! Per-variant entity configuration.
//!
//! Each entity variant exposed by the Services dialect is described by one
//! static [`EntityKind`] record: which field carries the identity, which REST
//! path segment the variant lives under, and which fields need integer or
//! boolean coercion on the wire. Models select a kind at construction time
//! instead of subclassing anything.

/// Configuration for one entity variant.
#[derive(Debug)]
pub struct EntityKind {
    /// Variant name (stable, used for diagnostics and lookup)
    pub name: &'static str,
    /// Name of the identifying field (e.g. `nid`)
    pub id_key: &'static str,
    /// REST resource path segment (e.g. `node`)
    pub entity_type: &'static str,
    /// Name of the sub-type field, if the variant has a bundle concept
    pub bundle_key: Option<&'static str>,
    /// Name of the human-readable display field
    pub label_key: &'static str,
    /// Fields coerced with the boolean rules
    pub boolean_fields: &'static [&'static str],
    /// Fields coerced to canonical integers
    pub integer_fields: &'static [&'static str],
    /// Query parameters appended to non-new resource paths
    pub fetch_query: &'static [(&'static str, &'static str)],
}

impl EntityKind {
    /// Whether `field` is integer-coerced for this variant.
    ///
    /// The identity field is always integer-coerced, regardless of the
    /// configured list.
    pub fn is_integer_field(&self, field: &str) -> bool {
        field == self.id_key || self.integer_fields.contains(&field)
    }

    /// Whether `field` is boolean-coerced for this variant.
    pub fn is_boolean_field(&self, field: &str) -> bool {
        self.boolean_fields.contains(&field)
    }

    /// Look up a variant by its name.
    pub fn by_name(name: &str) -> Option<&'static EntityKind> {
        ALL.iter().copied().find(|k| k.name == name)
    }
}

impl PartialEq for EntityKind {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EntityKind {}

/// Content item.
pub static NODE: EntityKind = EntityKind {
    name: "node",
    id_key: "nid",
    entity_type: "node",
    bundle_key: Some("type"),
    label_key: "title",
    boolean_fields: &["status", "promote", "sticky"],
    integer_fields: &["uid", "created", "changed", "comment"],
    fetch_query: &[],
};

/// Managed file. Fetches suppress the expensive payload fields.
pub static FILE: EntityKind = EntityKind {
    name: "file",
    id_key: "fid",
    entity_type: "file",
    bundle_key: Some("type"),
    label_key: "filename",
    boolean_fields: &["status"],
    integer_fields: &["uid", "filesize", "timestamp"],
    fetch_query: &[("file_contents", "0"), ("image_styles", "0")],
};

/// Taxonomy term.
pub static TAXONOMY_TERM: EntityKind = EntityKind {
    name: "taxonomy_term",
    id_key: "tid",
    entity_type: "taxonomy_term",
    bundle_key: Some("vocabulary_machine_name"),
    label_key: "name",
    boolean_fields: &[],
    integer_fields: &["vid", "weight"],
    fetch_query: &[],
};

/// Taxonomy vocabulary. No bundle concept.
pub static TAXONOMY_VOCABULARY: EntityKind = EntityKind {
    name: "taxonomy_vocabulary",
    id_key: "vid",
    entity_type: "taxonomy_vocabulary",
    bundle_key: None,
    label_key: "name",
    boolean_fields: &[],
    integer_fields: &["weight", "hierarchy"],
    fetch_query: &[],
};

/// User account. No bundle concept.
pub static USER: EntityKind = EntityKind {
    name: "user",
    id_key: "uid",
    entity_type: "user",
    bundle_key: None,
    label_key: "name",
    boolean_fields: &["status"],
    integer_fields: &["created", "access", "login"],
    fetch_query: &[],
};

/// All known variants.
pub static ALL: &[&EntityKind] = &[&NODE, &FILE, &TAXONOMY_TERM, &TAXONOMY_VOCABULARY, &USER];
