use proc_macro::TokenStream;

mod record;

/// Implements `tagsql::record::Record` for a struct with named fields.
///
/// Field attributes:
/// - `#[tag(db = "pk,gen=serial")]` raw tag string per tag key
/// - `#[record(embed)]` flatten a nested record (`T`, `Box<T>`, `Option<T>`,
///   `Option<Box<T>>`)
/// - `#[record(skip)]` leave the field out of the record entirely
#[proc_macro_derive(Record, attributes(record, tag))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
