use proc_macro::TokenStream;

mod client;
mod method;
mod server;

/// Generates `new_registry()`, `method_name()`, `required_permission()` and
/// `ALL` for a method enum whose variants carry `#[permission(...)]`.
#[proc_macro_derive(Router, attributes(permission))]
pub fn rpc_router_derive(input: TokenStream) -> TokenStream {
    server::rpc_router_derive(input)
}

/// Generates a `CommonApi` implementation for every `Transport`.
#[proc_macro_derive(Routes, attributes(permission))]
pub fn rpc_routes_derive(input: TokenStream) -> TokenStream {
    client::rpc_routes_derive(input)
}
