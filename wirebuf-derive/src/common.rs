use {
    darling::{
        ast::{Data, Fields, Style},
        FromDeriveInput, FromField, FromVariant,
    },
    proc_macro2::{Span, TokenStream},
    quote::{format_ident, quote, ToTokens},
    syn::{parse_quote, Generics, Ident, Index, Path, Type, WherePredicate},
};

#[derive(FromField)]
#[darling(attributes(wirebuf))]
pub(crate) struct Field {
    pub(crate) ident: Option<Ident>,
    pub(crate) ty: Type,
    /// Schema used in place of the field's own type.
    #[darling(default)]
    pub(crate) with: Option<Type>,
    /// Leave the field off the wire. Decoding fills it with `Default::default()`.
    #[darling(default)]
    pub(crate) skip: bool,
}

impl Field {
    /// The schema type that encodes and decodes this field.
    pub(crate) fn target(&self) -> &Type {
        self.with.as_ref().unwrap_or(&self.ty)
    }

    /// `self.name` for named fields, `self.0` for tuple fields.
    pub(crate) fn member(&self, index: usize) -> TokenStream {
        match &self.ident {
            Some(ident) => ident.to_token_stream(),
            None => Index::from(index).to_token_stream(),
        }
    }

    /// Local binding for the field inside a `match` arm.
    ///
    /// Prefixed so that it can never shadow the `buf` and `src` parameters.
    pub(crate) fn binding(index: usize) -> Ident {
        format_ident!("__field{}", index)
    }
}

#[derive(FromVariant)]
#[darling(attributes(wirebuf))]
pub(crate) struct Variant {
    pub(crate) ident: Ident,
    pub(crate) fields: Fields<Field>,
}

impl Variant {
    /// Pattern that binds every encoded field of the variant.
    pub(crate) fn pattern(&self) -> TokenStream {
        let ident = &self.ident;
        match self.fields.style {
            Style::Unit => quote! { Self::#ident },
            Style::Tuple => {
                let bindings = self.fields.iter().enumerate().map(|(i, field)| {
                    if field.skip {
                        quote! { _ }
                    } else {
                        Field::binding(i).to_token_stream()
                    }
                });
                quote! { Self::#ident(#(#bindings),*) }
            }
            Style::Struct => {
                let bindings = self
                    .fields
                    .iter()
                    .enumerate()
                    .filter(|(_, field)| !field.skip)
                    .map(|(i, field)| {
                        let name = &field.ident;
                        let binding = Field::binding(i);
                        quote! { #name: #binding }
                    });
                quote! { Self::#ident { #(#bindings,)* .. } }
            }
        }
    }
}

#[derive(FromDeriveInput)]
#[darling(attributes(wirebuf), supports(struct_any, enum_any))]
pub(crate) struct SchemaArgs {
    pub(crate) ident: Ident,
    pub(crate) generics: Generics,
    pub(crate) data: Data<Variant, Field>,
    /// Path to the `wirebuf` crate, for re-exports.
    #[darling(rename = "crate", default)]
    pub(crate) crate_path: Option<Path>,
    /// Generate `crate::` paths. Used by `wirebuf`'s own tests.
    #[darling(default)]
    pub(crate) internal: bool,
}

impl SchemaArgs {
    pub(crate) fn fields(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        match &self.data {
            Data::Struct(fields) => Box::new(fields.iter()),
            Data::Enum(variants) => Box::new(variants.iter().flat_map(|v| v.fields.iter())),
        }
    }
}

pub(crate) fn get_crate_name(args: &SchemaArgs) -> Path {
    if args.internal {
        return parse_quote!(crate);
    }
    match &args.crate_path {
        Some(path) => path.clone(),
        None => parse_quote!(::wirebuf),
    }
}

/// Add one predicate per field to the where clause of a generic type.
///
/// Non-generic types are left alone, since their field bounds either hold
/// trivially or fail with a clearer error at the field itself.
pub(crate) fn bounded_generics(
    args: &SchemaArgs,
    predicate: impl Fn(&Field) -> Option<WherePredicate>,
) -> Generics {
    let mut generics = args.generics.clone();
    if generics.type_params().next().is_none() {
        return generics;
    }
    let predicates: Vec<_> = args.fields().filter_map(predicate).collect();
    generics.make_where_clause().predicates.extend(predicates);
    generics
}

/// Sum a list of `Result<usize>` expressions with overflow checks.
pub(crate) fn checked_sum(
    crate_name: &Path,
    terms: impl Iterator<Item = TokenStream>,
) -> TokenStream {
    let total = Ident::new("__total", Span::call_site());
    quote! {{
        #[allow(unused_mut)]
        let mut #total = 0usize;
        #(
            #total = #total
                .checked_add(#terms?)
                .ok_or_else(#crate_name::error::size_of_overflow)?;
        )*
        Ok(#total)
    }}
}
