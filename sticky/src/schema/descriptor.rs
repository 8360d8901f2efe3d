use crate::collection::Document;
use crate::common::{ID_FIELD, SCHEMA_SUFFIX, TYPE_FIELD};
use crate::errors::{ErrorKind, StickyError, StickyResult};
use heck::ToSnakeCase;
use std::fmt::{Debug, Formatter};

/// Lazily resolved reference to another schema's descriptor.
///
/// Schemas may reference each other in cycles, so fields point at their
/// target through a function rather than holding the descriptor itself.
pub type SchemaRef = fn() -> &'static SchemaDescriptor;

/// How a field is stored.
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// A plain value: string, number, date, embedded map and so on.
    Scalar,
    /// A value described by another schema, optionally a list of them.
    Nested { schema: SchemaRef, many: bool },
}

impl Debug for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Scalar => write!(f, "Scalar"),
            FieldKind::Nested { schema, many } => {
                write!(f, "Nested({}, many: {})", schema().name(), many)
            }
        }
    }
}

/// A declared field of a schema.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
}

impl FieldDescriptor {
    pub fn scalar(name: &str) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            kind: FieldKind::Scalar,
        }
    }

    pub fn nested(name: &str, schema: SchemaRef, many: bool) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            kind: FieldKind::Nested { schema, many },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Target schema of a nested field.
    pub fn target(&self) -> Option<&'static SchemaDescriptor> {
        match self.kind {
            FieldKind::Nested { schema, .. } => Some(schema()),
            FieldKind::Scalar => None,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self.kind, FieldKind::Nested { many: true, .. })
    }
}

/// Type-tag dispatch table of a polymorphic schema.
#[derive(Clone)]
pub struct OneOf {
    type_field: String,
    variants: Vec<(String, SchemaRef)>,
}

impl Debug for OneOf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneOf")
            .field("type_field", &self.type_field)
            .field("tags", &self.tags().collect::<Vec<_>>())
            .finish()
    }
}

impl OneOf {
    pub fn type_field(&self) -> &str {
        &self.type_field
    }

    /// Registered type tags in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(tag, _)| tag.as_str())
    }

    pub fn variant(&self, tag: &str) -> Option<&'static SchemaDescriptor> {
        self.variants
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, schema)| schema())
    }
}

/// Describes how an entity is stored: its fields, references and collection.
///
/// Descriptors are built once per entity type, usually by
/// `#[derive(Schema)]`, and live for the whole program.
///
/// # Examples
///
/// ```rust,ignore
/// static BOOK: LazyLock<SchemaDescriptor> = LazyLock::new(|| {
///     SchemaDescriptor::new("BookSchema")
///         .field("id")
///         .field("title")
///         .nested("author", Author::descriptor, false)
/// });
///
/// assert_eq!(BOOK.collection_name(), "book");
/// ```
#[derive(Clone, Debug)]
pub struct SchemaDescriptor {
    name: String,
    collection: Option<String>,
    primary_key: Option<Vec<String>>,
    fields: Vec<FieldDescriptor>,
    one_of: Option<OneOf>,
}

impl SchemaDescriptor {
    /// Starts a descriptor for a plain schema.
    pub fn new(name: &str) -> Self {
        SchemaDescriptor {
            name: name.to_string(),
            collection: None,
            primary_key: None,
            fields: Vec::new(),
            one_of: None,
        }
    }

    /// Starts a descriptor for a polymorphic schema dispatching on `type_field`.
    pub fn one_of(name: &str, type_field: &str) -> Self {
        let mut descriptor = SchemaDescriptor::new(name);
        descriptor.one_of = Some(OneOf {
            type_field: if type_field.is_empty() {
                TYPE_FIELD.to_string()
            } else {
                type_field.to_string()
            },
            variants: Vec::new(),
        });
        descriptor
    }

    /// Overrides the collection name.
    pub fn collection(mut self, name: &str) -> Self {
        self.collection = Some(name.to_string());
        self
    }

    /// Sets the default primary key used by repositories of this schema.
    pub fn primary_key(mut self, fields: &[&str]) -> Self {
        self.primary_key = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Declares a scalar field.
    pub fn field(mut self, name: &str) -> Self {
        self.fields.push(FieldDescriptor::scalar(name));
        self
    }

    /// Declares a field holding one (or, with `many`, a list of) `schema` values.
    pub fn nested(mut self, name: &str, schema: SchemaRef, many: bool) -> Self {
        self.fields.push(FieldDescriptor::nested(name, schema, many));
        self
    }

    /// Registers a concrete schema for a type tag of a polymorphic schema.
    pub fn variant(mut self, tag: &str, schema: SchemaRef) -> Self {
        match self.one_of.as_mut() {
            Some(one_of) => one_of.variants.push((tag.to_string(), schema)),
            None => log::warn!(
                "Ignoring variant {} on schema {}, it is not polymorphic",
                tag,
                self.name
            ),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection storing documents of this schema.
    ///
    /// The override when one is configured, otherwise the snake-cased schema
    /// name without its `Schema` suffix: `BookSchema` is stored in `book`.
    pub fn collection_name(&self) -> String {
        if let Some(collection) = &self.collection {
            return collection.clone();
        }
        let base = match self.name.strip_suffix(SCHEMA_SUFFIX) {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => self.name.as_str(),
        };
        base.to_snake_case()
    }

    pub fn default_primary_key(&self) -> Option<&[String]> {
        self.primary_key.as_deref()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.field_descriptor(name).is_some()
    }

    /// Whether the schema names a separately stored entity.
    pub fn has_id(&self) -> bool {
        self.declares(ID_FIELD)
    }

    pub fn is_polymorphic(&self) -> bool {
        self.one_of.is_some()
    }

    pub fn one_of_table(&self) -> Option<&OneOf> {
        self.one_of.as_ref()
    }

    /// Resolves the concrete schema describing `document`.
    ///
    /// Plain schemas resolve to themselves. Polymorphic schemas read the type
    /// tag from the document and fail with [ErrorKind::UnknownType] when it is
    /// missing or not registered.
    pub fn resolve(&'static self, document: &Document) -> StickyResult<&'static SchemaDescriptor> {
        let one_of = match &self.one_of {
            Some(one_of) => one_of,
            None => return Ok(self),
        };

        let tag = document.get(one_of.type_field())?;
        let tag = match tag.as_string() {
            Some(tag) => tag,
            None => {
                log::error!(
                    "Document for {} has no {} tag: {}",
                    self.name,
                    one_of.type_field(),
                    document
                );
                return Err(StickyError::new(
                    &format!("Missing type tag '{}' for {}", one_of.type_field(), self.name),
                    ErrorKind::UnknownType(tag.to_string()),
                ));
            }
        };

        match one_of.variant(tag) {
            // a variant may itself dispatch further
            Some(concrete) => concrete.resolve(document),
            None => {
                log::error!("Unknown type tag {} for {}", tag, self.name);
                Err(StickyError::new(
                    &format!("Unknown type '{}' for {}", tag, self.name),
                    ErrorKind::UnknownType(tag.clone()),
                ))
            }
        }
    }
}
