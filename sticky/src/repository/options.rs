use crate::common::{DEFAULT_ALIAS, ID_FIELD};
use crate::schema::SchemaDescriptor;

/// Per-repository configuration.
///
/// Anything left unset falls back to the entity's descriptor and then to
/// the defaults: the `"default"` connection alias and the `["id"]`
/// primary key.
///
/// ```rust,ignore
/// let foos = sticky.repository_with::<Foo>(
///     RepositoryOptions::new().primary_key(&["bar", "baz"]),
/// )?;
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepositoryOptions {
    alias: Option<String>,
    primary_key: Option<Vec<String>>,
    collection_name: Option<String>,
}

impl RepositoryOptions {
    pub fn new() -> Self {
        RepositoryOptions::default()
    }

    /// Selects the connection alias whose database stores the entity.
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Sets the fields identifying a stored document on save.
    ///
    /// Only saves through this repository use it. Entities of the same type
    /// saved as references of another entity are keyed by their descriptor's
    /// primary key, or `["id"]`.
    pub fn primary_key(mut self, fields: &[&str]) -> Self {
        self.primary_key = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Overrides the collection the entity is stored in.
    ///
    /// References always live in the descriptor's collection: entities of
    /// this type saved or loaded as references of another entity ignore the
    /// override, so a repository with an overridden collection does not see
    /// them.
    pub fn collection_name(mut self, name: &str) -> Self {
        self.collection_name = Some(name.to_string());
        self
    }

    pub(crate) fn resolved_alias(&self) -> String {
        self.alias.clone().unwrap_or_else(|| DEFAULT_ALIAS.to_string())
    }

    pub(crate) fn resolved_primary_key(&self, schema: &SchemaDescriptor) -> Vec<String> {
        match (&self.primary_key, schema.default_primary_key()) {
            (Some(fields), _) if !fields.is_empty() => fields.clone(),
            (_, Some(fields)) if !fields.is_empty() => fields.to_vec(),
            _ => vec![ID_FIELD.to_string()],
        }
    }

    pub(crate) fn resolved_collection_name(&self, schema: &SchemaDescriptor) -> String {
        self.collection_name
            .clone()
            .unwrap_or_else(|| schema.collection_name())
    }
}
