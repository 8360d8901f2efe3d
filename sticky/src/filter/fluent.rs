use crate::common::Value;

use super::Filter;

/// Creates a fluent filter builder for the specified field name.
///
/// The field name may be dotted to address an embedded document field.
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for an equality criterion on one field.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Creates a filter that matches documents where the field equals the specified value.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new().with(&self.field_name, value)
    }

    /// Creates a filter that matches documents where the field is null or missing.
    #[inline]
    pub fn is_null(self) -> Filter {
        Filter::new().with(&self.field_name, Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn eq_builds_single_criterion() {
        let filter = field("title").eq("1984");
        assert_eq!(filter.criteria().len(), 1);
        assert_eq!(filter.get("title"), Some(&Value::from("1984")));
    }

    #[test]
    fn is_null_matches_missing() {
        assert!(field("author").is_null().matches(&doc! { title: "x" }));
    }
}
