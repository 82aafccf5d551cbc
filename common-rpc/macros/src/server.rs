use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;
use syn::ItemEnum;

use crate::method::method_variants;

pub fn rpc_router_derive(input: TokenStream) -> TokenStream {
    let enum_item = parse_macro_input!(input as ItemEnum);
    let enum_name = &enum_item.ident;

    let methods = match method_variants(&enum_item) {
        Ok(m) => m,
        Err(e) => return e.to_compile_error().into(),
    };

    let mut inserts = vec![];
    let mut names = vec![];
    let mut permissions = vec![];
    let mut all = vec![];

    for m in &methods {
        let variant = &m.variant;
        let name = &m.name;
        let permission = &m.permission;
        let req_type = &m.req_type;
        let res_type = &m.res_type;
        let call_fn = &m.call_fn;

        inserts.push(quote! {
            builder.insert(#name, #permission, |api, ctx, params| async move {
                let req: #req_type = serde_json::from_value(params)
                    .map_err(|e| HandlerError::InvalidParams(e.to_string()))?;
                let resp: #res_type = api.#call_fn(&ctx, req).await?;
                serde_json::to_value(resp)
                    .map_err(|e| RpcError::from(HandlerError::Internal(e.to_string())))
            });
        });
        names.push(quote! { Self::#variant => #name, });
        permissions.push(quote! { Self::#variant => #permission, });
        all.push(quote! { Self::#variant, });
    }

    let count = methods.len();

    let expanded = quote! {
        impl #enum_name {
            /// every method, in declaration order
            pub const ALL: [Self; #count] = [#(#all)*];

            /// builds the immutable method table for `api`
            pub fn new_registry(api: std::sync::Arc<dyn CommonApi>) -> MethodRegistry {
                let mut builder = RegistryBuilder::new(api);
                #(#inserts)*
                builder.build()
            }

            /// wire name of this method
            pub const fn method_name(&self) -> &'static str {
                match self {
                    #(#names)*
                }
            }

            /// permission a caller must hold to invoke this method
            pub const fn required_permission(&self) -> Permission {
                match self {
                    #(#permissions)*
                }
            }
        }
    };

    expanded.into()
}
