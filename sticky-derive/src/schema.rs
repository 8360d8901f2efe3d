use crate::attributes::{entity_type, variant_tag, FieldAttributes, SchemaAttributes};
use proc_macro::TokenStream;
use quote::quote;
use syn::{DataEnum, DataStruct, DeriveInput, Fields, Result};

pub(crate) fn generate_schema_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    reject_generics(ast)?;
    let attributes = SchemaAttributes::parse(&ast.attrs)?;
    if attributes.type_field.is_some() {
        return Err(syn::Error::new_spanned(
            ast,
            "type_field is only supported on one-of enums",
        ));
    }

    let fields = match &data.fields {
        Fields::Named(fields) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only structs with named fields are supported",
            ))
        }
    };

    let mut field_builders = Vec::with_capacity(fields.len());
    for field in fields {
        let field_name = match &field.ident {
            Some(ident) => ident.to_string(),
            None => continue,
        };
        let field_attributes = FieldAttributes::parse(&field.attrs)?;
        if field_attributes.nested {
            let (target, many) = entity_type(&field.ty);
            field_builders.push(quote! {
                .nested(#field_name, <#target as sticky::schema::Schema>::descriptor, #many)
            });
        } else {
            field_builders.push(quote! { .field(#field_name) });
        }
    }

    let name = &ast.ident;
    let schema_name = attributes.name.clone().unwrap_or_else(|| name.to_string());
    let collection = collection_builder(&attributes);
    let primary_key = primary_key_builder(&attributes);

    let gen = quote! {
        impl sticky::schema::Schema for #name {
            fn descriptor() -> &'static sticky::schema::SchemaDescriptor {
                static DESCRIPTOR: std::sync::LazyLock<sticky::schema::SchemaDescriptor> =
                    std::sync::LazyLock::new(|| {
                        sticky::schema::SchemaDescriptor::new(#schema_name)
                            #(#field_builders)*
                            #collection
                            #primary_key
                    });
                &DESCRIPTOR
            }
        }
    };

    Ok(TokenStream::from(gen))
}

pub(crate) fn generate_schema_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    reject_generics(ast)?;
    let attributes = SchemaAttributes::parse(&ast.attrs)?;
    if attributes.type_field.is_none() {
        return Err(syn::Error::new_spanned(
            ast,
            "one-of enums need #[schema(type_field = \"...\")]",
        ));
    }
    if !attributes.primary_key.is_empty() {
        return Err(syn::Error::new_spanned(
            ast,
            "primary_key is not supported on one-of enums",
        ));
    }

    let mut variant_builders = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        let inner = match &variant.fields {
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed[0].ty,
            _ => {
                return Err(syn::Error::new_spanned(
                    variant,
                    "one-of variants must wrap exactly one entity type",
                ))
            }
        };
        let tag = variant_tag(variant)?;
        variant_builders.push(quote! {
            .variant(#tag, <#inner as sticky::schema::Schema>::descriptor)
        });
    }

    let name = &ast.ident;
    let schema_name = attributes.name.clone().unwrap_or_else(|| name.to_string());
    let type_field = attributes.type_field();
    let collection = collection_builder(&attributes);

    let gen = quote! {
        impl sticky::schema::Schema for #name {
            fn descriptor() -> &'static sticky::schema::SchemaDescriptor {
                static DESCRIPTOR: std::sync::LazyLock<sticky::schema::SchemaDescriptor> =
                    std::sync::LazyLock::new(|| {
                        sticky::schema::SchemaDescriptor::one_of(#schema_name, #type_field)
                            #(#variant_builders)*
                            #collection
                    });
                &DESCRIPTOR
            }
        }
    };

    Ok(TokenStream::from(gen))
}

fn collection_builder(attributes: &SchemaAttributes) -> proc_macro2::TokenStream {
    match &attributes.collection {
        Some(collection) => quote! { .collection(#collection) },
        None => quote! {},
    }
}

fn primary_key_builder(attributes: &SchemaAttributes) -> proc_macro2::TokenStream {
    if attributes.primary_key.is_empty() {
        quote! {}
    } else {
        let fields = &attributes.primary_key;
        quote! { .primary_key(&[#(#fields),*]) }
    }
}

// descriptors live in a per-type static
fn reject_generics(ast: &DeriveInput) -> Result<()> {
    if ast.generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &ast.generics,
            "generic types cannot derive Schema",
        ))
    }
}
