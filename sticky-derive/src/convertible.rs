use crate::attributes::{ignored_fields, variant_tag, SchemaAttributes};
use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::quote;
use syn::{DataEnum, DataStruct, DeriveInput, Field, Fields, Result, Type};

pub(crate) fn generate_convertible_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let ignored = ignored_fields(&ast.attrs)?;

    let fields: Vec<&Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only structs with named fields are supported",
            ))
        }
    };

    let name = &ast.ident;
    let type_name = name.to_string();

    let stored: Vec<&Field> = fields
        .iter()
        .filter(|f| {
            f.ident
                .as_ref()
                .is_some_and(|ident| !ignored.contains(&ident.to_string()))
        })
        .copied()
        .collect();
    let stored_idents: Vec<&Ident> = stored.iter().filter_map(|f| f.ident.as_ref()).collect();
    let stored_names: Vec<String> = stored_idents.iter().map(|i| i.to_string()).collect();

    let initializers: Vec<proc_macro2::TokenStream> = fields
        .iter()
        .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
        .map(|(ident, ty)| {
            let field_name = ident.to_string();
            if ignored.contains(&field_name) {
                quote! { #ident: Default::default() }
            } else {
                quote! { #ident: sticky::schema::read_field::<#ty>(doc, #field_name, #type_name)? }
            }
        })
        .collect();

    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics sticky::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> sticky::errors::StickyResult<sticky::common::Value> {
                let mut doc = sticky::collection::Document::new();
                #(doc.put(#stored_names, sticky::common::Convertible::to_value(&self.#stored_idents)?)?;)*
                Ok(sticky::common::Value::Document(doc))
            }

            fn from_value(value: &sticky::common::Value) -> sticky::errors::StickyResult<Self::Output> {
                let doc = sticky::schema::expect_document(value, #type_name)?;
                sticky::schema::check_unknown_fields(doc, &[#(#stored_names),*], #type_name)?;
                Ok(#name {
                    #(#initializers,)*
                })
            }
        }
    };

    Ok(TokenStream::from(gen))
}

pub(crate) fn generate_convertible_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let attributes = SchemaAttributes::parse(&ast.attrs)?;
    if attributes.present {
        generate_tagged_enum(ast, data, &attributes)
    } else {
        generate_variant_enum(ast, data)
    }
}

/// One-of entities: each newtype variant stores its inner document plus a type tag.
fn generate_tagged_enum(ast: &DeriveInput, data: &DataEnum, attributes: &SchemaAttributes) -> Result<TokenStream> {
    let name = &ast.ident;
    let type_name = name.to_string();
    let type_field = attributes.type_field();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut to_value_variants = Vec::with_capacity(data.variants.len());
    let mut from_value_variants = Vec::with_capacity(data.variants.len());

    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let inner_type = newtype_field(variant)?;
        let tag = variant_tag(variant)?;

        to_value_variants.push(quote! {
            #name::#variant_ident(inner) => {
                let value = sticky::common::Convertible::to_value(inner)?;
                let mut doc = sticky::schema::expect_document(&value, #type_name)?.clone();
                doc.put(#type_field, #tag)?;
                Ok(sticky::common::Value::Document(doc))
            }
        });

        from_value_variants.push(quote! {
            Some(#tag) => Ok(#name::#variant_ident(
                sticky::common::from_value::<#inner_type>(&sticky::common::Value::Document(doc))?
            ))
        });
    }

    let gen = quote! {
        impl #impl_generics sticky::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> sticky::errors::StickyResult<sticky::common::Value> {
                match self {
                    #(#to_value_variants),*
                }
            }

            fn from_value(value: &sticky::common::Value) -> sticky::errors::StickyResult<Self::Output> {
                let mut doc = sticky::schema::expect_document(value, #type_name)?.clone();
                let tag = doc.remove(#type_field).unwrap_or_default();
                match tag.as_string().map(|s| s.as_str()) {
                    #(#from_value_variants,)*
                    other => Err(sticky::errors::StickyError::new(
                        &format!("Unknown {} tag {} for {}", #type_field, tag, #type_name),
                        sticky::errors::ErrorKind::UnknownType(
                            other.map(|s| s.to_string()).unwrap_or_else(|| tag.to_string()),
                        ),
                    )),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}

fn newtype_field(variant: &syn::Variant) -> Result<&Type> {
    match &variant.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => Ok(&fields.unnamed[0].ty),
        _ => Err(syn::Error::new_spanned(
            variant,
            "one-of variants must wrap exactly one entity type",
        )),
    }
}

/// Plain enums: `{ variant: "Name", value: ... }`.
fn generate_variant_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut to_value_variants = Vec::with_capacity(data.variants.len());
    let mut from_value_variants = Vec::with_capacity(data.variants.len());

    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.to_string();

        match &variant.fields {
            Fields::Named(fields) => {
                let field_idents: Vec<&Ident> = fields.named.iter().filter_map(|f| f.ident.as_ref()).collect();
                let field_names: Vec<String> = field_idents.iter().map(|i| i.to_string()).collect();
                let field_types: Vec<&Type> = fields.named.iter().map(|f| &f.ty).collect();

                to_value_variants.push(quote! {
                    #name::#variant_ident { #(#field_idents),* } => {
                        let mut data = sticky::collection::Document::new();
                        #(data.put(#field_names, sticky::common::Convertible::to_value(#field_idents)?)?;)*
                        let mut doc = sticky::collection::Document::new();
                        doc.put("variant", #variant_name)?;
                        doc.put("value", data)?;
                        Ok(sticky::common::Value::Document(doc))
                    }
                });

                from_value_variants.push(quote! {
                    Some(#variant_name) => {
                        let data = sticky::schema::expect_document(&value, #type_name)?;
                        sticky::schema::check_unknown_fields(data, &[#(#field_names),*], #variant_name)?;
                        Ok(#name::#variant_ident {
                            #(#field_idents: sticky::schema::read_field::<#field_types>(data, #field_names, #variant_name)?,)*
                        })
                    }
                });
            }
            Fields::Unnamed(fields) => {
                let field_count = fields.unnamed.len();
                let field_idents: Vec<Ident> = (0..field_count)
                    .map(|i| Ident::new(&format!("field_{}", i), Span::call_site()))
                    .collect();
                let field_indices: Vec<usize> = (0..field_count).collect();
                let field_types: Vec<&Type> = fields.unnamed.iter().map(|f| &f.ty).collect();

                to_value_variants.push(quote! {
                    #name::#variant_ident(#(#field_idents),*) => {
                        let mut array = Vec::with_capacity(#field_count);
                        #(array.push(sticky::common::Convertible::to_value(#field_idents)?);)*
                        let mut doc = sticky::collection::Document::new();
                        doc.put("variant", #variant_name)?;
                        doc.put("value", sticky::common::Value::Array(array))?;
                        Ok(sticky::common::Value::Document(doc))
                    }
                });

                from_value_variants.push(quote! {
                    Some(#variant_name) => {
                        let data = match value.as_array() {
                            Some(data) if data.len() == #field_count => data,
                            _ => return Err(sticky::errors::StickyError::new(
                                &format!("Value {} is not a {}-tuple for {}", value, #field_count, #variant_name),
                                sticky::errors::ErrorKind::ValidationError,
                            )),
                        };
                        Ok(#name::#variant_ident(
                            #(sticky::common::from_value::<#field_types>(&data[#field_indices])?,)*
                        ))
                    }
                });
            }
            Fields::Unit => {
                to_value_variants.push(quote! {
                    #name::#variant_ident => {
                        let mut doc = sticky::collection::Document::new();
                        doc.put("variant", #variant_name)?;
                        doc.put("value", sticky::common::Value::Null)?;
                        Ok(sticky::common::Value::Document(doc))
                    }
                });

                from_value_variants.push(quote! {
                    Some(#variant_name) => Ok(#name::#variant_ident)
                });
            }
        }
    }

    let gen = quote! {
        impl #impl_generics sticky::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> sticky::errors::StickyResult<sticky::common::Value> {
                match self {
                    #(#to_value_variants),*
                }
            }

            fn from_value(value: &sticky::common::Value) -> sticky::errors::StickyResult<Self::Output> {
                let doc = sticky::schema::expect_document(value, #type_name)?;
                let variant = doc.get("variant")?;
                let value = doc.get("value")?;
                match variant.as_string().map(|s| s.as_str()) {
                    #(#from_value_variants,)*
                    _ => Err(sticky::errors::StickyError::new(
                        &format!("Value {} is not a variant of {}", variant, #type_name),
                        sticky::errors::ErrorKind::ValidationError,
                    )),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
