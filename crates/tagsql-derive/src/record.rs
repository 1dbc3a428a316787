use darling::{FromDeriveInput, FromField, ast::Data, util::Ignored};
use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{
    Attribute, DeriveInput, Error, GenericArgument, Generics, Ident, LitStr, PathArguments, Type,
    Visibility,
};

///
/// RecordInput
///

#[derive(FromDeriveInput)]
#[darling(attributes(record), supports(struct_named))]
struct RecordInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, RecordField>,
}

///
/// RecordField
///

#[derive(FromField)]
#[darling(attributes(record), forward_attrs(tag))]
struct RecordField {
    ident: Option<Ident>,
    ty: Type,
    vis: Visibility,
    attrs: Vec<Attribute>,

    #[darling(default)]
    embed: bool,

    #[darling(default)]
    skip: bool,
}

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let input = match RecordInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };

    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &RecordInput) -> Result<TokenStream, Error> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(fields) = &input.data else {
        return Err(Error::new_spanned(
            ident,
            "Record can only be derived for structs with named fields",
        ));
    };

    let mut decls = Vec::new();
    let mut read_arms = Vec::new();
    let mut write_arms = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        if field.skip {
            continue;
        }

        let Some(field_ident) = field.ident.as_ref() else {
            return Err(Error::new_spanned(&field.ty, "expected a named field"));
        };
        let index = u16::try_from(index)
            .map(Literal::u16_unsuffixed)
            .map_err(|_| Error::new_spanned(field_ident, "too many fields"))?;

        let field_name = field_ident.to_string();
        let public = matches!(field.vis, Visibility::Public(_));
        let tags = parse_tags(&field.attrs)?
            .into_iter()
            .map(|(key, raw)| quote!((#key, #raw)));

        let kind = if field.embed {
            let (inner, optional) = embed_target(&field.ty);
            quote! {
                ::tagsql::record::FieldKind::Embedded {
                    fields: <#inner as ::tagsql::record::Record>::FIELDS,
                    optional: #optional,
                }
            }
        } else {
            quote!(::tagsql::record::FieldKind::Leaf)
        };

        decls.push(quote! {
            ::tagsql::record::FieldDecl {
                name: #field_name,
                index: #index,
                public: #public,
                tags: &[#(#tags),*],
                kind: #kind,
            }
        });

        // only public fields are addressable
        if !public {
            continue;
        }

        let (read, write) = if field.embed {
            embedded_arms(field_ident, &field.ty, &index)
        } else {
            leaf_arms(field_ident, &field_name, &field.ty, &index)
        };
        read_arms.push(read);
        write_arms.push(write);
    }

    Ok(quote! {
        impl #impl_generics ::tagsql::record::Record for #ident #ty_generics #where_clause {
            const FIELDS: &'static [::tagsql::record::FieldDecl] = &[#(#decls),*];

            fn read_field(&self, path: &[u16]) -> ::core::option::Option<::tagsql::value::Value> {
                #[allow(unused_imports)]
                use ::tagsql::record::Record as _;

                match path {
                    #(#read_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn write_field(
                &mut self,
                path: &[u16],
                value: ::tagsql::value::Value,
            ) -> ::core::result::Result<(), ::tagsql::error::BindError> {
                #[allow(unused_imports)]
                use ::tagsql::record::Record as _;

                match path {
                    #(#write_arms)*
                    _ => ::core::result::Result::Err(::tagsql::error::BindError::Unaddressable {
                        path: path.to_vec(),
                    }),
                }
            }
        }
    })
}

fn leaf_arms(
    ident: &Ident,
    name: &str,
    ty: &Type,
    index: &Literal,
) -> (TokenStream, TokenStream) {
    let read = quote! {
        [#index] => ::core::option::Option::Some(
            ::tagsql::value::FieldValue::to_value(&self.#ident)
        ),
    };

    let write = quote! {
        [#index] => {
            self.#ident = <#ty as ::tagsql::value::FieldValue>::from_value(&value)
                .ok_or_else(|| ::tagsql::error::BindError::mismatch(#name, &value))?;
            ::core::result::Result::Ok(())
        }
    };

    (read, write)
}

fn embedded_arms(ident: &Ident, ty: &Type, index: &Literal) -> (TokenStream, TokenStream) {
    let (inner, optional) = embed_target(ty);

    if !optional {
        return (
            quote!([#index, rest @ ..] => self.#ident.read_field(rest),),
            quote!([#index, rest @ ..] => self.#ident.write_field(rest, value),),
        );
    }

    let read = quote! {
        [#index, rest @ ..] => match self.#ident.as_ref() {
            ::core::option::Option::Some(inner) => inner.read_field(rest),
            ::core::option::Option::None => {
                let zero: #inner = ::core::default::Default::default();
                zero.read_field(rest)
            }
        },
    };

    let write = quote! {
        [#index, rest @ ..] => self
            .#ident
            .get_or_insert_with(::core::default::Default::default)
            .write_field(rest, value),
    };

    (read, write)
}

/// Parse `#[tag(key = "raw", ...)]` attributes into (key, raw) pairs.
fn parse_tags(attrs: &[Attribute]) -> Result<Vec<(String, String)>, Error> {
    let mut tags = Vec::new();

    for attr in attrs.iter().filter(|a| a.path().is_ident("tag")) {
        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .ok_or_else(|| meta.error("expected a tag key"))?
                .to_string();
            let raw: LitStr = meta.value()?.parse()?;

            if tags.iter().any(|(k, _)| *k == key) {
                return Err(meta.error(format!("duplicate tag key '{key}'")));
            }
            tags.push((key, raw.value()));

            Ok(())
        })?;
    }

    Ok(tags)
}

/// Record type behind an embedded field and whether it is optional.
fn embed_target(ty: &Type) -> (&Type, bool) {
    match generic_arg(ty, "Option") {
        Some(inner) => (generic_arg(inner, "Box").unwrap_or(inner), true),
        None => (generic_arg(ty, "Box").unwrap_or(ty), false),
    }
}

fn generic_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}
