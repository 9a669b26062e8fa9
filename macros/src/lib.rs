use proc_macro::TokenStream;
use quote::{quote, quote_spanned};
use syn::{
  parse_macro_input, spanned::Spanned, DeriveInput, FnArg, ImplItemFn, ItemFn, ReturnType, Type,
};

/// Test attribute used across the crate: sync tests become `#[test]`, async
/// tests run on a current-thread tokio runtime.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);

  let raw_args = proc_macro2::TokenStream::from(attr);
  if !raw_args.is_empty() {
    return TokenStream::from(
      syn::Error::new(raw_args.span(), "take_until_destroy_macro::test takes no arguments")
        .to_compile_error(),
    );
  }

  let native_attr = if input.sig.asyncness.is_some() {
    quote!(tokio::test(flavor = "current_thread"))
  } else {
    quote!(test)
  };

  let expanded = quote! {
      #[#native_attr]
      #input
  };

  TokenStream::from(expanded)
}

/// Bind the stream a method returns to its host's destroy signal.
///
/// The method must borrow its receiver (`&self`, `&mut self` or the typed
/// `self: &Self` forms) and live in an `impl` of a type implementing
/// `Destroyable`. Its body runs unchanged on every call;
/// the declared return type `R` becomes `<R as MemberValue>::Output`, which
/// is `TakeUntil<R, DestroySignal>` for streams and `R` itself otherwise.
///
/// ```ignore
/// impl Counter {
///   #[take_until_destroy]
///   pub fn values(&self) -> Subject<u32, Infallible> { self.values.clone() }
/// }
/// ```
#[proc_macro_attribute]
pub fn take_until_destroy(attr: TokenStream, item: TokenStream) -> TokenStream {
  let raw_args = proc_macro2::TokenStream::from(attr);
  if !raw_args.is_empty() {
    return TokenStream::from(
      syn::Error::new(raw_args.span(), "#[take_until_destroy] takes no arguments")
        .to_compile_error(),
    );
  }

  let method = parse_macro_input!(item as ImplItemFn);
  match expand_method(method) {
    Ok(tokens) => TokenStream::from(tokens),
    Err(err) => TokenStream::from(err.to_compile_error()),
  }
}

fn expand_method(method: ImplItemFn) -> syn::Result<proc_macro2::TokenStream> {
  let ImplItemFn { attrs, vis, defaultness, mut sig, block } = method;

  if let Some(asyncness) = sig.asyncness {
    return Err(syn::Error::new(
      asyncness.span(),
      "#[take_until_destroy] cannot be used on an `async fn`; return the stream instead",
    ));
  }

  match sig.inputs.first() {
    Some(FnArg::Receiver(receiver)) if matches!(*receiver.ty, Type::Reference(_)) => {}
    Some(FnArg::Receiver(receiver)) => {
      return Err(syn::Error::new(
        receiver.span(),
        "#[take_until_destroy] needs a borrowed receiver (`&self`, `&mut self`, `self: &Self` \
         or `self: &mut Self`); by-value and smart-pointer receivers are not supported",
      ));
    }
    _ => {
      return Err(syn::Error::new(
        sig.ident.span(),
        "#[take_until_destroy] can only be used on methods with a `&self` or `&mut self` receiver",
      ));
    }
  }

  let produced: Type = match &sig.output {
    ReturnType::Default => syn::parse_quote!(()),
    ReturnType::Type(_, ty) => {
      if let Type::ImplTrait(impl_trait) = &**ty {
        return Err(syn::Error::new(
          impl_trait.span(),
          "#[take_until_destroy] needs a concrete return type; use `box_it()` to erase the \
           stream type",
        ));
      }
      (**ty).clone()
    }
  };

  let name = sig.ident.to_string();
  let span = sig.output.span();
  sig.output = syn::parse_quote_spanned! {span=>
    -> <#produced as ::take_until_destroy::MemberValue>::Output
  };

  let call = quote_spanned! {span=>
    ::take_until_destroy::intercept_method(&*self, #name, __produced)
  };

  Ok(quote! {
    #(#attrs)*
    #vis #defaultness #sig {
      #[allow(clippy::redundant_closure_call)]
      let __produced: #produced = (|| -> #produced #block)();
      #call
    }
  })
}

/// Let a type be returned from a decorated member as a plain value.
///
/// The generated `MemberValue` impl never binds: the value comes back
/// unchanged and the host reports one diagnostic, as for any non-stream.
///
/// ```ignore
/// #[derive(MemberValue)]
/// struct Config { retries: u32 }
/// ```
#[proc_macro_derive(MemberValue)]
pub fn derive_member_value(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as DeriveInput);
  TokenStream::from(expand_plain_member_value(&input))
}

fn expand_plain_member_value(input: &DeriveInput) -> proc_macro2::TokenStream {
  let name = &input.ident;
  let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

  quote! {
    impl #impl_generics ::take_until_destroy::MemberValue for #name #ty_generics #where_clause {
      type Output = Self;

      fn is_stream_like(&self) -> bool { false }

      fn bind(self, _signal: ::take_until_destroy::DestroySignal) -> Self { self }

      fn pass_through(self) -> Self { self }
    }
  }
}
