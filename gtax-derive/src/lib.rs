use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, LitStr, Meta, Token, Type};

/// Derive macro describing the CSV columns of an input record.
///
/// For each field that serde reads, extracts:
/// - Column name (respects `#[serde(rename = "...")]`)
/// - Required (false for `Option<T>` or `#[serde(default)]` fields)
/// - Description (from doc comments)
///
/// Fields marked `#[serde(skip)]` or `#[serde(skip_deserializing)]` are left
/// out. Generates `csv_schema() -> &'static [CsvField]` and
/// `csv_columns() -> &'static [&'static str]`; `CsvField` must be in scope.
#[proc_macro_derive(CsvSchema, attributes(serde))]
pub fn derive_csv_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "CsvSchema only supports structs with named fields",
                )
                .to_compile_error()
                .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "CsvSchema only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let columns: Vec<(String, bool, String)> = fields
        .iter()
        .filter_map(|field| {
            let serde = SerdeField::from_attrs(&field.attrs);
            if serde.skip {
                return None;
            }
            let field_name = field.ident.as_ref()?.to_string();
            let column = serde.rename.unwrap_or(field_name);
            let required = !serde.default && !is_option_type(&field.ty);
            Some((column, required, get_doc_comment(&field.attrs)))
        })
        .collect();

    let field_entries = columns.iter().map(|(name, required, desc)| {
        quote! {
            CsvField {
                name: #name,
                required: #required,
                description: #desc,
            }
        }
    });
    let column_names = columns.iter().map(|(name, _, _)| name);

    let expanded = quote! {
        impl #name {
            pub fn csv_schema() -> &'static [CsvField] {
                static SCHEMA: &[CsvField] = &[
                    #(#field_entries),*
                ];
                SCHEMA
            }

            pub fn csv_columns() -> &'static [&'static str] {
                static COLUMNS: &[&str] = &[#(#column_names),*];
                COLUMNS
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct SerdeField {
    rename: Option<String>,
    default: bool,
    skip: bool,
}

impl SerdeField {
    fn from_attrs(attrs: &[syn::Attribute]) -> Self {
        let mut field = SerdeField::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            // attributes this macro does not understand are left to serde
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    field.rename = Some(value.value());
                } else if meta.path.is_ident("default") {
                    field.default = true;
                    if meta.input.peek(Token![=]) {
                        let _: LitStr = meta.value()?.parse()?;
                    }
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing") {
                    field.skip = true;
                } else if meta.input.peek(Token![=]) {
                    let _: syn::Expr = meta.value()?.parse()?;
                }
                Ok(())
            });
        }
        field
    }
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
