use {
    crate::common::{bounded_generics, checked_sum, get_crate_name, Field, SchemaArgs, Variant},
    darling::{
        ast::{Data, Fields},
        FromDeriveInput, Result,
    },
    proc_macro2::TokenStream,
    quote::quote,
    syn::{parse_quote, DeriveInput, Path},
};

fn impl_struct(crate_name: &Path, fields: &Fields<Field>) -> (TokenStream, TokenStream) {
    let encoded = || fields.iter().enumerate().filter(|(_, field)| !field.skip);

    let sizes = encoded().map(|(i, field)| {
        let target = field.target();
        let member = field.member(i);
        quote! { <#target as #crate_name::Encode>::size_of(&src.#member) }
    });
    let size_of = checked_sum(crate_name, sizes);

    let writes = encoded().map(|(i, field)| {
        let target = field.target();
        let member = field.member(i);
        quote! { <#target as #crate_name::Encode>::encode(buf, &src.#member)?; }
    });
    let encode = quote! {
        #(#writes)*
        Ok(())
    };

    (size_of, encode)
}

fn impl_enum(crate_name: &Path, variants: &[Variant]) -> (TokenStream, TokenStream) {
    if variants.is_empty() {
        return (quote! { match *src {} }, quote! { match *src {} });
    }

    let size_arms = variants.iter().enumerate().map(|(index, variant)| {
        let pattern = variant.pattern();
        let tag = index as u64;
        let tag_size = quote! {
            Ok::<usize, #crate_name::Error>(#crate_name::varint::unsigned_len(#tag))
        };
        let fields = variant
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.skip)
            .map(|(i, field)| {
                let target = field.target();
                let binding = Field::binding(i);
                quote! { <#target as #crate_name::Encode>::size_of(#binding) }
            });
        let sum = checked_sum(crate_name, core::iter::once(tag_size).chain(fields));
        quote! { #pattern => #sum }
    });

    let encode_arms = variants.iter().enumerate().map(|(index, variant)| {
        let pattern = variant.pattern();
        let tag = index as u64;
        let writes = variant
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.skip)
            .map(|(i, field)| {
                let target = field.target();
                let binding = Field::binding(i);
                quote! { <#target as #crate_name::Encode>::encode(buf, #binding)?; }
            });
        quote! {
            #pattern => {
                buf.write_uvarint(#tag)?;
                #(#writes)*
                Ok(())
            }
        }
    });

    (
        quote! { match src { #(#size_arms)* } },
        quote! { match src { #(#encode_arms)* } },
    )
}

pub(crate) fn generate(input: DeriveInput) -> Result<TokenStream> {
    let args = SchemaArgs::from_derive_input(&input)?;
    let crate_name = get_crate_name(&args);
    let generics = bounded_generics(&args, |field| {
        if field.skip {
            return None;
        }
        let target = field.target();
        let ty = &field.ty;
        Some(parse_quote!(#target: #crate_name::Encode<Src = #ty>))
    });
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let ident = &args.ident;

    let (size_of, encode) = match &args.data {
        Data::Struct(fields) => impl_struct(&crate_name, fields),
        Data::Enum(variants) => impl_enum(&crate_name, variants),
    };

    Ok(quote! {
        impl #impl_generics #crate_name::Encode for #ident #ty_generics #where_clause {
            type Src = Self;

            #[inline]
            fn size_of(src: &Self) -> #crate_name::Result<usize> {
                #size_of
            }

            #[inline]
            fn encode(buf: &mut #crate_name::Buffer<'_>, src: &Self) -> #crate_name::Result<()> {
                #encode
            }
        }
    })
}
