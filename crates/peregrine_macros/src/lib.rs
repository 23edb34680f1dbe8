use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat, Type};

/// Time a function when the calling crate's `perf_stats` feature is enabled.
///
/// The function body is wrapped in a drop guard that logs the elapsed time
/// through `tracing::info!` when the function returns or unwinds. With the
/// feature disabled the guard is compiled out entirely.
///
/// # Features
/// - Logs when the duration exceeds the threshold (default 1ms)
/// - If the function takes a `tick: u64` parameter, also logs every 100th tick
///
/// # Example
/// ```ignore
/// #[profile]
/// fn resolve_contacts(boxes: &[Aabb], tick: u64) -> Vec<Penetration> {
///     // ... work ...
/// }
///
/// #[profile(4)]  // Custom threshold in milliseconds
/// fn rebuild_pairs() { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        match attr.to_string().trim().parse() {
            Ok(ms) => ms,
            Err(_) => {
                return syn::Error::new(
                    proc_macro2::Span::call_site(),
                    "#[profile] expects an optional integer threshold in milliseconds",
                )
                .to_compile_error()
                .into();
            }
        }
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let has_tick_param = sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(pat_ident) = &*pat_type.pat else {
            return false;
        };
        pat_ident.ident == "tick" && is_u64(&pat_type.ty)
    });

    let tick_field = if has_tick_param {
        quote! { tick_value: Option<u64>, }
    } else {
        quote! {}
    };
    let tick_init = if has_tick_param {
        quote! { tick_value: Some(tick), }
    } else {
        quote! {}
    };
    let tick_check = if has_tick_param {
        quote! { || self.tick_value.map_or(false, |t| t % 100 == 0) }
    } else {
        quote! {}
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    name: &'static str,
                    start: ::std::time::Instant,
                    #tick_field
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() > #threshold_ms #tick_check {
                            ::tracing::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name_str,
                    start: ::std::time::Instant::now(),
                    #tick_init
                }
            };

            #block
        }
    };

    output.into()
}

fn is_u64(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path.path.is_ident("u64"),
        _ => false,
    }
}
