use {
    crate::common::{bounded_generics, get_crate_name, Field, SchemaArgs, Variant},
    darling::{
        ast::{Data, Fields, Style},
        FromDeriveInput, Result,
    },
    proc_macro2::TokenStream,
    quote::quote,
    syn::{parse_quote, DeriveInput, Path},
};

/// Expression that produces the value of one field.
fn read_field(crate_name: &Path, field: &Field) -> TokenStream {
    if field.skip {
        return quote! { ::core::default::Default::default() };
    }
    let target = field.target();
    quote! { <#target as #crate_name::Decode>::decode(buf)? }
}

/// Constructor for `path` with every field read in declaration order.
fn construct(crate_name: &Path, path: TokenStream, fields: &Fields<Field>) -> TokenStream {
    match fields.style {
        Style::Unit => path,
        Style::Tuple => {
            let values = fields.iter().map(|field| read_field(crate_name, field));
            quote! { #path(#(#values),*) }
        }
        Style::Struct => {
            let values = fields.iter().map(|field| {
                let name = &field.ident;
                let value = read_field(crate_name, field);
                quote! { #name: #value }
            });
            quote! { #path { #(#values),* } }
        }
    }
}

fn min_size(crate_name: &Path, fields: &Fields<Field>) -> TokenStream {
    let sizes = fields.iter().filter(|field| !field.skip).map(|field| {
        let target = field.target();
        quote! { <#target as #crate_name::Decode>::MIN_SIZE }
    });
    quote! { 0 #(+ #sizes)* }
}

fn impl_enum(crate_name: &Path, variants: &[Variant]) -> TokenStream {
    let arms = variants.iter().enumerate().map(|(index, variant)| {
        let tag = index as u64;
        let ident = &variant.ident;
        let value = construct(crate_name, quote! { Self::#ident }, &variant.fields);
        quote! { #tag => Ok(#value), }
    });
    quote! {
        let tag = buf.read_uvarint()?;
        match tag {
            #(#arms)*
            _ => Err(#crate_name::error::invalid_tag_encoding(tag)),
        }
    }
}

pub(crate) fn generate(input: DeriveInput) -> Result<TokenStream> {
    let args = SchemaArgs::from_derive_input(&input)?;
    let crate_name = get_crate_name(&args);
    let generics = bounded_generics(&args, |field| {
        let ty = &field.ty;
        if field.skip {
            return Some(parse_quote!(#ty: ::core::default::Default));
        }
        let target = field.target();
        Some(parse_quote!(#target: #crate_name::Decode<Dst = #ty>))
    });
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let ident = &args.ident;

    let (min_size, decode) = match &args.data {
        Data::Struct(fields) => {
            let value = construct(&crate_name, quote! { Self }, fields);
            (min_size(&crate_name, fields), quote! { Ok(#value) })
        }
        // The variant tag is at least one byte.
        Data::Enum(variants) => (quote! { 1 }, impl_enum(&crate_name, variants)),
    };

    Ok(quote! {
        impl #impl_generics #crate_name::Decode for #ident #ty_generics #where_clause {
            type Dst = Self;
            const MIN_SIZE: usize = #min_size;

            #[inline]
            fn decode(buf: &mut #crate_name::Buffer<'_>) -> #crate_name::Result<Self> {
                #decode
            }
        }
    })
}
