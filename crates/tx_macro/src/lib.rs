extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Runs the annotated async method inside a MongoDB transaction.
///
/// The method must take a `session: &mut Session` argument and return a
/// `Result` whose error type converts from `mongodb::error::Error`.
#[proc_macro_attribute]
pub fn tx(_args: TokenStream, input: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(input as ItemFn);
    let vis = &input_fn.vis;
    let sig = &input_fn.sig;
    let body = &input_fn.block;
    let inner_name = format_ident!("{}_in_tx", sig.ident);

    let mut forwarded = Vec::with_capacity(sig.inputs.len());
    for arg in &sig.inputs {
        match arg {
            FnArg::Receiver(_) => forwarded.push(quote!(self)),
            FnArg::Typed(typed) => match typed.pat.as_ref() {
                Pat::Ident(pat) => {
                    let ident = &pat.ident;
                    forwarded.push(quote!(#ident));
                }
                other => {
                    return syn::Error::new_spanned(other, "tx: unsupported argument pattern")
                        .to_compile_error()
                        .into();
                }
            },
        }
    }

    let mut inner_sig = sig.clone();
    inner_sig.ident = inner_name.clone();

    let expanded = quote! {
        #vis #inner_sig #body

        #vis #sig {
            session.start_transaction().await?;
            match Self::#inner_name(#(#forwarded),*).await {
                Ok(value) => {
                    session.commit_transaction().await?;
                    Ok(value)
                }
                Err(err) => {
                    session.abort_transaction().await?;
                    Err(err)
                }
            }
        }
    };

    TokenStream::from(expanded)
}
