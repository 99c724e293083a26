use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::visit_mut::{self, VisitMut};
use syn::{
    AngleBracketedGenericArguments, Attribute, Error as SynError, FnArg, GenericArgument, Ident,
    ImplItem, ImplItemFn, ItemImpl, Meta, PathArguments, Result as SynResult, ReturnType,
    Signature, Type, TypePath,
};

use crate::attrs::AttributeData;

static ARGUMENT_ATTRIBUTES: [&str; 5] = ["named", "qualified", "all", "optional", "argument"];

const RETURN_TYPE_MESSAGE: &str = "a constructor's return type should be `Self` or `Result<Self, E>`";

#[derive(Debug)]
struct ConstructorData {
    self_type: TypePath,
    identifier: Ident,
    arguments: Vec<ArgumentData>,
    return_type: ReturnTypeData,
}

#[derive(Debug)]
struct ArgumentData {
    span: Span,
    source: SourceData,
}

/// Where the value of a constructor argument comes from.
#[derive(Debug)]
enum SourceData {
    Unqualified,
    Named(TokenStream2),
    Qualified(TokenStream2),
    All,
    Optional,
    Argument(TokenStream2),
}

#[derive(Debug)]
enum ReturnTypeData {
    Infallible,
    Result { error_type: TypePath },
}

struct AttributeRemovalVisitor;

impl AttributeRemovalVisitor {
    fn is_custom_attribute(attr: &Attribute) -> bool {
        attr.path().is_ident("inject")
            || ARGUMENT_ATTRIBUTES
                .iter()
                .any(|name| attr.path().is_ident(name))
    }
}

impl VisitMut for AttributeRemovalVisitor {
    fn visit_attributes_mut(&mut self, attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !Self::is_custom_attribute(attr));
        attrs
            .iter_mut()
            .for_each(|attr| visit_mut::visit_attribute_mut(self, attr));
    }
}

pub fn expand_implementation(
    impls: TokenStream,
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[component]` should be annotated on the `impl` block",
            ))
        }
    };

    let self_type = get_self_type(&impls)?;
    let signature = get_constructor_signature(&impls.items, impls.span())?;
    let ctor_data = parse_constructor(self_type, signature)?;

    let expanded = expand_component_implementation(ctor_data, attr_data);

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #expanded
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn get_constructor_signature(items: &[ImplItem], impl_span: Span) -> SynResult<Signature> {
    let ctors: Vec<_> = items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(|item_fn| is_annotated_with_inject(item_fn))
        .collect();

    let signature = match ctors.as_slice() {
        [ctor] => ctor.sig.clone(),
        [] => {
            return Err(SynError::new(
                impl_span,
                "no associated function is annotated with `#[inject]`",
            ))
        }
        _ => {
            return Err(SynError::new(
                impl_span,
                "only one associated function can be annotated with `#[inject]`",
            ))
        }
    };

    if let Some(FnArg::Receiver(rec)) = signature.inputs.first() {
        return Err(SynError::new(
            rec.span(),
            "method is not allowed to be annotated with `#[inject]`",
        ));
    }

    Ok(signature)
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_annotated_with_inject(item_fn: &ImplItemFn) -> bool {
    item_fn
        .attrs
        .iter()
        .any(|attr| matches!(&attr.meta, Meta::Path(path) if path.is_ident("inject")))
}

fn parse_constructor(self_type: TypePath, signature: Signature) -> SynResult<ConstructorData> {
    let identifier = signature.ident;
    let arguments = parse_constructor_arguments(signature.inputs)?;
    let return_type = parse_constructor_return_type(signature.output, &self_type)?;

    Ok(ConstructorData {
        self_type,
        identifier,
        arguments,
        return_type,
    })
}

fn parse_constructor_arguments(inputs: Punctuated<FnArg, Comma>) -> SynResult<Vec<ArgumentData>> {
    inputs
        .into_iter()
        .map(|arg| match arg {
            FnArg::Typed(arg) => {
                let span = arg.span();
                parse_argument_attributes(arg.attrs).map(|source| ArgumentData { span, source })
            }
            FnArg::Receiver(rec) => Err(SynError::new(
                rec.span(),
                "a constructor should not have a receiver argument",
            )),
        })
        .collect()
}

fn parse_argument_attributes(attrs: Vec<Attribute>) -> SynResult<SourceData> {
    let mut res = None;

    for attr in attrs {
        let Some(name) = ARGUMENT_ATTRIBUTES
            .iter()
            .find(|name| attr.path().is_ident(name))
        else {
            continue;
        };
        let span = attr.span();

        let data = match (*name, attr.meta) {
            ("named", Meta::List(list)) => SourceData::Named(list.tokens),
            ("qualified", Meta::List(list)) => SourceData::Qualified(list.tokens),
            ("argument", Meta::List(list)) => SourceData::Argument(list.tokens),
            ("all", Meta::Path(_)) => SourceData::All,
            ("optional", Meta::Path(_)) => SourceData::Optional,
            ("named", _) => {
                return Err(SynError::new(
                    span,
                    "expects `#[named(...)]` to receive a `&'static str`",
                ))
            }
            ("qualified", _) => {
                return Err(SynError::new(
                    span,
                    "expects `#[qualified(...)]` to receive a `TypedQualifier` value",
                ))
            }
            ("argument", _) => {
                return Err(SynError::new(
                    span,
                    "expects `#[argument(...)]` to receive the name of a constructor argument",
                ))
            }
            (name, _) => {
                return Err(SynError::new(
                    span,
                    format!("expects `#[{name}]` without arguments"),
                ))
            }
        };

        if res.is_some() {
            return Err(SynError::new(
                span,
                "only one of `#[named(...)]`, `#[qualified(...)]`, `#[all]`, `#[optional]` or `#[argument(...)]` is allowed",
            ));
        }
        res = Some(data);
    }

    Ok(res.unwrap_or(SourceData::Unqualified))
}

fn parse_constructor_return_type(
    output: ReturnType,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let ReturnType::Type(_, return_type) = output else {
        return Err(SynError::new(output.span(), RETURN_TYPE_MESSAGE));
    };
    let Type::Path(return_type) = *return_type else {
        return Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE));
    };

    if &return_type == self_type || return_type.path.is_ident("Self") {
        return Ok(ReturnTypeData::Infallible);
    }

    let segments: Vec<_> = return_type.path.segments.iter().collect();
    match segments.as_slice() {
        [result] if result.ident == "Result" => {
            parse_result_return_type(&result.arguments, self_type)
        }
        [std, module, result]
            if std.ident == "std" && module.ident == "result" && result.ident == "Result" =>
        {
            parse_result_return_type(&result.arguments, self_type)
        }
        _ => Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE)),
    }
}

fn parse_result_return_type(
    type_args: &PathArguments,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) = type_args
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    let args: Vec<_> = args.iter().collect();
    let [GenericArgument::Type(Type::Path(first_type)), GenericArgument::Type(Type::Path(error_type))] =
        args.as_slice()
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    if first_type == self_type || first_type.path.is_ident("Self") {
        Ok(ReturnTypeData::Result {
            error_type: error_type.clone(),
        })
    } else {
        Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE))
    }
}

fn expand_component_implementation(
    ctor_data: ConstructorData,
    attr_data: AttributeData,
) -> TokenStream2 {
    let self_type = &ctor_data.self_type;
    let constructor = &ctor_data.identifier;

    let associated_type_constructed = if let AttributeData::Full { output_type, .. } = &attr_data
    {
        quote! { type Constructed = #output_type; }
    } else {
        quote! { type Constructed = #self_type; }
    };

    let associated_type_error =
        if let ReturnTypeData::Result { error_type } = &ctor_data.return_type {
            quote! { type Error = #error_type; }
        } else {
            quote! { type Error = std::convert::Infallible; }
        };

    let get_dep_statements = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            match &arg.source {
                SourceData::Unqualified => {
                    quote! { let #dep = context.get(custom_scope::key::of())?; }
                }
                SourceData::Named(name) => {
                    quote! { let #dep = context.get(custom_scope::key::named(#name))?; }
                }
                SourceData::Qualified(qualifier) => {
                    quote! { let #dep = context.get(custom_scope::key::qualified(#qualifier))?; }
                }
                SourceData::All => quote! { let #dep = context.get_all()?; },
                SourceData::Optional => {
                    quote! { let #dep = context.try_get(custom_scope::key::of())?; }
                }
                SourceData::Argument(name) => {
                    quote! { let #dep = context.require_argument(#name)?; }
                }
            }
        })
        .collect::<TokenStream2>();

    let dep_args = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            quote! { #dep, }
        })
        .collect::<TokenStream2>();

    let wire_deps = if let ReturnTypeData::Infallible = &ctor_data.return_type {
        quote! { Ok(Ok(#self_type::#constructor(#dep_args))) }
    } else {
        quote! { Ok(#self_type::#constructor(#dep_args)) }
    };

    let post_process_body = if let AttributeData::Full { post_processor, .. } = &attr_data {
        quote! { #post_processor(self) }
    } else {
        quote! { self }
    };

    quote! {
        impl custom_scope::provider::component::Component for #self_type {
            #associated_type_constructed
            #associated_type_error

            fn construct(
                context: &custom_scope::container::resolver::Context,
            ) -> std::result::Result<
                std::result::Result<Self, Self::Error>,
                custom_scope::container::resolver::ResolveError
            > {
                #get_dep_statements
                #wire_deps
            }

            fn post_process(self) -> Self::Constructed {
                #post_process_body
            }
        }
    }
}
