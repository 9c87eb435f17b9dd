use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, FnArg, GenericArgument, ImplItem,
    ImplItemFn, ItemImpl, LitStr, PathArguments, ReturnType, Token, Type, Visibility,
};

struct ControllerArgs {
    name: Option<String>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if key == "name" {
                let lit: LitStr = input.parse()?;
                name = Some(lit.value());
            } else {
                return Err(syn::Error::new_spanned(key, "unknown #[controller] argument"));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(ControllerArgs { name })
    }
}

/// How an eligible method takes its context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextArg {
    Owned,
    Borrowed,
}

/// Signature facts needed to call an eligible method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActionShape {
    context: ContextArg,
    is_async: bool,
}

/// What a `<name>_params` sibling can contribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamsShape {
    Segment,
    Mismatched,
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let input = parse_macro_input!(item as ItemImpl);
    match generate_controller_impl(&args, &input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_controller_impl(args: &ControllerArgs, input: &ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[controller] must be placed on an inherent impl block",
        ));
    }

    let methods: Vec<&ImplItemFn> = input
        .items
        .iter()
        .filter_map(|item| match item {
            ImplItem::Fn(method) => Some(method),
            _ => None,
        })
        .collect();

    let actions = methods.iter().filter_map(|method| {
        let shape = action_shape(method)?;
        Some(generate_action(method, shape, &methods))
    });

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();
    let name_fn = controller_name(args, self_ty).map(|name| {
        quote! {
            fn controller_name() -> &'static str { #name }
        }
    });

    Ok(quote! {
        #input

        impl #impl_generics ::trellis::controller::Controller for #self_ty #where_clause {
            #name_fn

            fn actions() -> ::std::vec::Vec<::trellis::controller::Action<Self>> {
                ::std::vec![#(#actions),*]
            }
        }
    })
}

fn controller_name(args: &ControllerArgs, self_ty: &Type) -> Option<String> {
    if let Some(name) = &args.name {
        return Some(name.clone());
    }
    match self_ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

fn generate_action(method: &ImplItemFn, shape: ActionShape, methods: &[&ImplItemFn]) -> TokenStream2 {
    let ident = &method.sig.ident;
    let name = ident.to_string();

    let mut call = match shape.context {
        ContextArg::Owned => quote! { controller.#ident(ctx) },
        ContextArg::Borrowed => quote! { controller.#ident(&ctx) },
    };
    if shape.is_async {
        call = quote! { #call.await };
    }

    let params = params_sibling(&name, methods).map(|sibling| {
        let sibling_ident = &sibling.sig.ident;
        match params_shape(sibling) {
            ParamsShape::Segment => quote! {
                .with_params(|controller: &Self| {
                    ::std::string::ToString::to_string(&controller.#sibling_ident())
                })
            },
            ParamsShape::Mismatched => quote! { .with_mismatched_params() },
        }
    });

    quote! {
        ::trellis::controller::Action::new(
            #name,
            |controller: ::std::sync::Arc<Self>, ctx: ::trellis::Context|
                -> ::std::pin::Pin<::std::boxed::Box<
                    dyn ::std::future::Future<Output = ::trellis::HandlerResult> + ::std::marker::Send
                >>
            {
                ::std::boxed::Box::pin(async move {
                    #call.map_err(::trellis::HandlerError::from)
                })
            },
        )
        #params
    }
}

/// `Some` when `method` can be routed: `pub`, `&self`, one `Context`
/// argument, a `Result<(), _>`-like return, no generics.
fn action_shape(method: &ImplItemFn) -> Option<ActionShape> {
    let sig = &method.sig;
    if !is_public(method) || !sig.generics.params.is_empty() || sig.inputs.len() != 2 {
        return None;
    }

    let mut inputs = sig.inputs.iter();
    if !is_shared_self(inputs.next()?) {
        return None;
    }
    let context = match inputs.next()? {
        FnArg::Typed(arg) => context_arg(&arg.ty)?,
        FnArg::Receiver(_) => return None,
    };

    match &sig.output {
        ReturnType::Type(_, ty) if is_error_result(ty) => Some(ActionShape {
            context,
            is_async: sig.asyncness.is_some(),
        }),
        _ => None,
    }
}

/// The public `<name>_params` method of the block, if any.
fn params_sibling<'a>(name: &str, methods: &[&'a ImplItemFn]) -> Option<&'a ImplItemFn> {
    let params_name = format!("{}_params", name);
    methods
        .iter()
        .copied()
        .find(|m| is_public(m) && m.sig.ident == params_name)
}

fn params_shape(method: &ImplItemFn) -> ParamsShape {
    let sig = &method.sig;
    let callable = sig.asyncness.is_none()
        && sig.generics.params.is_empty()
        && sig.inputs.len() == 1
        && sig.inputs.first().is_some_and(is_shared_self);
    if !callable {
        return ParamsShape::Mismatched;
    }
    match &sig.output {
        ReturnType::Type(_, ty) if is_string_like(ty) => ParamsShape::Segment,
        _ => ParamsShape::Mismatched,
    }
}

fn is_public(method: &ImplItemFn) -> bool {
    matches!(method.vis, Visibility::Public(_))
}

fn is_shared_self(arg: &FnArg) -> bool {
    matches!(
        arg,
        FnArg::Receiver(receiver)
            if receiver.reference.is_some()
                && receiver.mutability.is_none()
                && receiver.colon_token.is_none()
    )
}

fn context_arg(ty: &Type) -> Option<ContextArg> {
    match ty {
        Type::Path(_) if last_ident_is(ty, &["Context"]) => Some(ContextArg::Owned),
        Type::Reference(reference)
            if reference.mutability.is_none() && last_ident_is(&reference.elem, &["Context"]) =>
        {
            Some(ContextArg::Borrowed)
        }
        _ => None,
    }
}

fn is_error_result(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    let Some(segment) = type_path.path.segments.last() else {
        return false;
    };
    if segment.ident == "HandlerResult" {
        return true;
    }
    if segment.ident != "Result" {
        return false;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => matches!(
            args.args.first(),
            Some(GenericArgument::Type(Type::Tuple(tuple))) if tuple.elems.is_empty()
        ),
        _ => false,
    }
}

fn is_string_like(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => last_ident_is(&reference.elem, &["str", "String"]),
        Type::Path(_) => last_ident_is(ty, &["String", "Cow"]),
        _ => false,
    }
}

fn last_ident_is(ty: &Type, names: &[&str]) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|s| names.iter().any(|name| s.ident == name)),
        _ => false,
    }
}
