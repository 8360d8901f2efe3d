use syn::{Attribute, GenericArgument, LitStr, PathArguments, Result, Type, Variant};

/// Container options read from `#[schema(...)]` on a struct or enum.
#[derive(Default)]
pub(crate) struct SchemaAttributes {
    pub name: Option<String>,
    pub collection: Option<String>,
    pub primary_key: Vec<String>,
    pub type_field: Option<String>,
    pub present: bool,
}

impl SchemaAttributes {
    pub fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut parsed = SchemaAttributes::default();
        for attr in attrs {
            if attr.path().is_ident("schema") {
                parsed.present = true;
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        let s: LitStr = meta.value()?.parse()?;
                        parsed.name = Some(s.value());
                        Ok(())
                    } else if meta.path.is_ident("collection") {
                        let s: LitStr = meta.value()?.parse()?;
                        parsed.collection = Some(s.value());
                        Ok(())
                    } else if meta.path.is_ident("primary_key") {
                        let s: LitStr = meta.value()?.parse()?;
                        parsed.primary_key = split_list(&s.value());
                        Ok(())
                    } else if meta.path.is_ident("type_field") {
                        let s: LitStr = meta.value()?.parse()?;
                        parsed.type_field = Some(s.value());
                        Ok(())
                    } else {
                        Err(meta.error("Unknown schema attribute"))
                    }
                })?;
            }
        }
        Ok(parsed)
    }

    pub fn type_field(&self) -> String {
        self.type_field.clone().unwrap_or_else(|| "type".to_string())
    }
}

/// Field options read from `#[schema(...)]` on a named field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub nested: bool,
}

impl FieldAttributes {
    pub fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut parsed = FieldAttributes::default();
        for attr in attrs {
            if attr.path().is_ident("schema") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("nested") {
                        parsed.nested = true;
                        Ok(())
                    } else {
                        Err(meta.error("Unknown schema field attribute"))
                    }
                })?;
            }
        }
        Ok(parsed)
    }
}

/// The type tag of a one-of variant: `#[schema(tag = "...")]`, else the lowercased variant name.
pub(crate) fn variant_tag(variant: &Variant) -> Result<String> {
    let mut tag = variant.ident.to_string().to_lowercase();
    for attr in &variant.attrs {
        if attr.path().is_ident("schema") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("tag") {
                    let s: LitStr = meta.value()?.parse()?;
                    tag = s.value();
                    Ok(())
                } else {
                    Err(meta.error("Unknown schema variant attribute"))
                }
            })?;
        }
    }
    Ok(tag)
}

/// Field names listed in `#[converter(ignored = "a, b")]`.
pub(crate) fn ignored_fields(attrs: &[Attribute]) -> Result<Vec<String>> {
    let mut ignored = vec![];
    for attr in attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let s: LitStr = meta.value()?.parse()?;
                    ignored.extend(split_list(&s.value()));
                    Ok(())
                } else {
                    Err(meta.error("Unknown converter attribute"))
                }
            })?;
        }
    }
    Ok(ignored)
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Strips `Option`, `Box` and `Vec` wrappers, reporting whether a `Vec` was seen.
pub(crate) fn entity_type(ty: &Type) -> (&Type, bool) {
    let mut current = ty;
    let mut many = false;
    while let Some((wrapper, inner)) = single_generic(current) {
        match wrapper.as_str() {
            "Vec" => many = true,
            "Option" | "Box" => {}
            _ => break,
        }
        current = inner;
    }
    (current, many)
}

fn single_generic(ty: &Type) -> Option<(String, &Type)> {
    let path = match ty {
        Type::Path(type_path) if type_path.qself.is_none() => &type_path.path,
        _ => return None,
    };
    let segment = path.segments.last()?;
    let args = match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => args,
        _ => return None,
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some((segment.ident.to_string(), inner)),
        _ => None,
    }
}
