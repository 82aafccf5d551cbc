use convert_case::Case;
use convert_case::Casing;
use proc_macro2::Ident;
use quote::format_ident;
use syn::ExprPath;
use syn::ItemEnum;

/// Everything the derives need to know about one method variant.
pub(crate) struct MethodVariant {
    pub(crate) variant: Ident,
    pub(crate) name: String,
    pub(crate) permission: ExprPath,
    pub(crate) req_type: Ident,
    pub(crate) res_type: Ident,
    pub(crate) call_fn: Ident,
}

pub(crate) fn method_variants(enum_item: &ItemEnum) -> syn::Result<Vec<MethodVariant>> {
    enum_item
        .variants
        .iter()
        .map(|variant| {
            let variant_name = &variant.ident;
            let variant_str = variant_name.to_string();

            let attr = variant
                .attrs
                .iter()
                .find(|attr| attr.path().is_ident("permission"))
                .ok_or_else(|| {
                    syn::Error::new_spanned(
                        variant_name,
                        "each method variant must have #[permission(...)]",
                    )
                })?;
            let permission = attr.parse_args::<ExprPath>()?;

            Ok(MethodVariant {
                variant: variant_name.clone(),
                name: variant_str.clone(),
                permission,
                req_type: format_ident!("{}Request", variant_name),
                res_type: format_ident!("{}Response", variant_name),
                call_fn: format_ident!("{}_call", variant_str.to_case(Case::Snake)),
            })
        })
        .collect()
}
