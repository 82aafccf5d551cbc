use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;
use syn::ItemEnum;

use crate::method::method_variants;

pub fn rpc_routes_derive(input: TokenStream) -> TokenStream {
    let enum_item = parse_macro_input!(input as ItemEnum);

    let methods = match method_variants(&enum_item) {
        Ok(m) => m,
        Err(e) => return e.to_compile_error().into(),
    };

    let calls = methods.iter().map(|m| {
        let name = &m.name;
        let req_type = &m.req_type;
        let res_type = &m.res_type;
        let call_fn = &m.call_fn;

        quote! {
            async fn #call_fn(
                &self,
                _ctx: &CallContext,
                request: #req_type,
            ) -> RpcResult<#res_type> {
                let params = serde_json::to_value(&request)
                    .map_err(|e| HandlerError::InvalidParams(e.to_string()))?;
                let value = self.call(#name, params).await?;
                let resp: #res_type = serde_json::from_value(value)
                    .map_err(|e| RpcError::from(HandlerError::Internal(e.to_string())))?;
                Ok(resp)
            }
        }
    });

    let expanded = quote! {
        #[async_trait::async_trait]
        impl<T: Transport> CommonApi for T {
            #(#calls)*
        }
    };

    expanded.into()
}
