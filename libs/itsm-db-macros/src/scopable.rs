use heck::ToUpperCamelCase;
use proc_macro_error2::abort;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, spanned::Spanned};

/// Dimensions that need an explicit `<name>_col = ".."` or `no_<name>`.
const REQUIRED_DIMENSIONS: [&str; 5] = ["resource", "department", "filiale", "owner", "soft_delete"];

/// Dimensions that only make sense on restricted tables.
const VISIBILITY_DIMENSIONS: [&str; 3] = ["department", "filiale", "owner"];

#[derive(Default)]
struct Dimension {
    col: Option<(String, Span)>,
    disabled: Option<Span>,
}

#[derive(Default)]
struct SecureConfig {
    resource: Dimension,
    department: Dimension,
    filiale: Dimension,
    owner: Dimension,
    soft_delete: Dimension,
    assignee_col: Option<(String, Span)>,
    member_table: Option<(String, Span)>,
    member_fk: Option<(String, Span)>,
    member_user: Option<(String, Span)>,
    unrestricted: Option<Span>,
}

impl SecureConfig {
    fn dimension(&self, name: &str) -> &Dimension {
        match name {
            "resource" => &self.resource,
            "department" => &self.department,
            "filiale" => &self.filiale,
            "owner" => &self.owner,
            _ => &self.soft_delete,
        }
    }

    fn dimension_mut(&mut self, name: &str) -> Option<&mut Dimension> {
        match name {
            "resource" => Some(&mut self.resource),
            "department" => Some(&mut self.department),
            "filiale" => Some(&mut self.filiale),
            "owner" => Some(&mut self.owner),
            "soft_delete" => Some(&mut self.soft_delete),
            _ => None,
        }
    }

    fn optional_slot(&mut self, key: &str) -> Option<&mut Option<(String, Span)>> {
        match key {
            "assignee_col" => Some(&mut self.assignee_col),
            "member_table" => Some(&mut self.member_table),
            "member_fk" => Some(&mut self.member_fk),
            "member_user" => Some(&mut self.member_user),
            _ => None,
        }
    }
}

pub fn expand_derive_scopable(input: &DeriveInput) -> TokenStream {
    if !matches!(&input.data, Data::Struct(_)) {
        abort!(
            input.span(),
            "#[derive(Scopable)] can only be applied to structs"
        );
    }

    let config = parse_secure_attrs(input);
    validate_config(&config, input.span());

    let span = input.ident.span();
    let is_unrestricted = config.unrestricted.is_some();

    let resource = col_method("resource_col", config.resource.col.as_ref(), span);
    let department = col_method("department_col", config.department.col.as_ref(), span);
    let filiale = col_method("filiale_col", config.filiale.col.as_ref(), span);
    let owner = col_method("owner_col", config.owner.col.as_ref(), span);
    let assignee = col_method("assignee_col", config.assignee_col.as_ref(), span);
    let soft_delete = col_method("soft_delete_col", config.soft_delete.col.as_ref(), span);

    let membership = match (&config.member_table, &config.member_fk, &config.member_user) {
        (Some((table, _)), Some((fk, _)), Some((user, _))) => quote! {
            fn membership() -> ::core::option::Option<::itsm_db::secure::Membership> {
                ::core::option::Option::Some(::itsm_db::secure::Membership {
                    table: #table,
                    resource_fk: #fk,
                    user_col: #user,
                })
            }
        },
        _ => TokenStream::new(),
    };

    quote! {
        impl ::itsm_db::secure::ScopableEntity for Entity {
            const IS_UNRESTRICTED: bool = #is_unrestricted;

            #resource

            #department

            #filiale

            #owner

            #assignee

            #soft_delete

            #membership
        }
    }
}

fn col_method(method_name: &str, col: Option<&(String, Span)>, span: Span) -> TokenStream {
    let method_ident = syn::Ident::new(method_name, span);
    match col {
        Some((col_name, _)) => {
            let variant = syn::Ident::new(&snake_to_upper_camel(col_name), span);
            quote! {
                fn #method_ident() -> ::core::option::Option<Self::Column> {
                    ::core::option::Option::Some(Column::#variant)
                }
            }
        }
        None => quote! {
            fn #method_ident() -> ::core::option::Option<Self::Column> {
                ::core::option::Option::None
            }
        },
    }
}

fn validate_config(config: &SecureConfig, struct_span: Span) {
    let member_parts = [
        config.member_table.is_some(),
        config.member_fk.is_some(),
        config.member_user.is_some(),
    ];
    if member_parts.iter().any(|p| *p) && !member_parts.iter().all(|p| *p) {
        abort!(
            struct_span,
            "secure: `member_table`, `member_fk` and `member_user` must be given together"
        );
    }

    if let Some(unrestricted_span) = config.unrestricted {
        let restricted_attr = VISIBILITY_DIMENSIONS.iter().any(|name| {
            let dim = config.dimension(name);
            dim.col.is_some() || dim.disabled.is_some()
        }) || config.assignee_col.is_some()
            || config.member_table.is_some();
        if restricted_attr {
            abort!(
                unrestricted_span,
                "secure: 'unrestricted' cannot be combined with department, filiale, owner, assignee or membership attributes"
            );
        }
        return;
    }

    for name in REQUIRED_DIMENSIONS {
        let dim = config.dimension(name);
        if dim.col.is_none() && dim.disabled.is_none() {
            abort!(
                struct_span,
                "secure: missing explicit decision for {}: use `{}_col = \"column_name\"` or `no_{}`",
                name,
                name,
                name
            );
        }
    }
}

fn parse_secure_attrs(input: &DeriveInput) -> SecureConfig {
    let mut config = SecureConfig::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("secure") {
            continue;
        }

        let result = attr.parse_nested_meta(|meta| {
            let span = meta.path.span();
            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();

            if key == "unrestricted" {
                if config.unrestricted.is_some() {
                    abort!(span, "duplicate attribute 'unrestricted'");
                }
                config.unrestricted = Some(span);
                return Ok(());
            }

            if let Some(name) = key.strip_prefix("no_") {
                let Some(dim) = config.dimension_mut(name) else {
                    abort!(span, "Unknown attribute '{}'", key);
                };
                if dim.disabled.is_some() {
                    abort!(span, "duplicate attribute '{}'", key);
                }
                if dim.col.is_some() {
                    abort!(
                        span,
                        "secure: specify either `{}_col` or `no_{}`, not both",
                        name,
                        name
                    );
                }
                dim.disabled = Some(span);
                return Ok(());
            }

            let value: String = match meta.value() {
                Ok(v) => match v.parse::<syn::LitStr>() {
                    Ok(lit) => lit.value(),
                    Err(_) => abort!(span, "Expected string literal"),
                },
                Err(_) => abort!(span, "Expected '=' followed by a string value"),
            };

            if let Some(slot) = config.optional_slot(&key) {
                if slot.is_some() {
                    abort!(span, "duplicate attribute '{}'", key);
                }
                *slot = Some((value, span));
                return Ok(());
            }

            let dim = key
                .strip_suffix("_col")
                .and_then(|name| config.dimension_mut(name).map(|dim| (name, dim)));
            let Some((name, dim)) = dim else {
                abort!(
                    span,
                    "Unknown attribute '{}'. Valid attributes: resource_col, department_col, filiale_col, owner_col, assignee_col, soft_delete_col, no_<dimension>, member_table, member_fk, member_user, unrestricted",
                    key
                );
            };
            if dim.col.is_some() {
                abort!(span, "duplicate attribute '{}'", key);
            }
            if dim.disabled.is_some() {
                abort!(
                    span,
                    "secure: specify either `{}_col` or `no_{}`, not both",
                    name,
                    name
                );
            }
            dim.col = Some((value, span));
            Ok(())
        });

        if let Err(err) = result {
            abort!(err.span(), "{}", err);
        }
    }

    config
}

fn snake_to_upper_camel(s: &str) -> String {
    s.to_upper_camel_case()
}
