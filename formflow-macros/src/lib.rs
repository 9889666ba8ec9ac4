//! Procedural macros for formflow

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::{format_ident, quote};
use std::collections::BTreeMap;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Enable automatic category inference from variant name prefixes
    #[darling(default)]
    infer_categories: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit category override
    #[darling(default)]
    category: Option<String>,

    /// Exclude from category inference
    #[darling(default)]
    skip_category: bool,
}

// Verbs that end an action name. The words before the first verb form the
// category ("ItemAdd" -> "item", "DrawerToggle" -> "drawer"); a variant
// that *starts* with a verb ("Clear") is a primary action with no category.
const ACTION_VERBS: &[&str] = &[
    // CRUD
    "Add", "Remove", "Set", "Clear", "Update", "Save", "Delete", "Load", "Create",
    // Async flows
    "Start", "Send", "Fetch", "Reset", "Cancel",
    // Field events
    "Change", "Blur", "Touch", "Validate",
    // Visibility & session
    "Open", "Close", "Toggle", "Show", "Hide", "Login", "Logout", "Persist",
];

/// Split a PascalCase identifier into its words.
fn split_pascal_case(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn to_snake_case(name: &str) -> String {
    let mut result = String::new();
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Infer a category from a variant name.
///
/// `SearchDidLoad` groups with `SearchStart` under "search": the prefix
/// before `Did` names the flow a result action belongs to. Otherwise the
/// words before the first action verb form the category, and names that
/// open with a verb stay uncategorized.
fn infer_category(name: &str) -> Option<String> {
    let parts = split_pascal_case(name);
    if parts.is_empty() {
        return None;
    }

    if let Some(did) = parts.iter().position(|part| part == "Did") {
        if did == 0 {
            return Some("async_result".to_string());
        }
        return Some(join_snake(&parts[..did]));
    }

    if ACTION_VERBS.contains(&parts[0].as_str()) {
        return None;
    }

    let verb = parts
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, part)| ACTION_VERBS.contains(&part.as_str()))
        .map(|(i, _)| i)?;

    Some(join_snake(&parts[..verb]))
}

fn join_snake(parts: &[String]) -> String {
    to_snake_case(&parts.concat())
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method returning the variant name.
///
/// With `#[action(infer_categories)]`, also generates:
/// - `category() -> Option<&'static str>`
/// - `category_enum() -> {Name}Category` and the `{Name}Category` enum
/// - `is_{category}()` predicates
/// - an `impl formflow::ActionCategory`
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(infer_categories)]
/// enum SearchAction {
///     QuerySet(String),
///     SearchStart(String),
///     SearchDidLoad { ticket: Ticket, results: Vec<SearchResult> },
///     Clear, // uncategorized: starts with a verb
/// }
///
/// assert_eq!(SearchAction::Clear.name(), "Clear");
/// assert_eq!(SearchAction::SearchStart("q".into()).category(), Some("search"));
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let name_arms = variants.iter().map(|variant| {
        let variant_name = &variant.ident;
        let variant_str = variant_name.to_string();
        match &variant.fields.style {
            darling::ast::Style::Unit => quote! { #name::#variant_name => #variant_str },
            darling::ast::Style::Tuple => quote! { #name::#variant_name(..) => #variant_str },
            darling::ast::Style::Struct => quote! { #name::#variant_name { .. } => #variant_str },
        }
    });

    let mut expanded = quote! {
        impl formflow::Action for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    if opts.infer_categories {
        // BTreeMap keeps generated code deterministic.
        let mut categories: BTreeMap<String, Vec<&Ident>> = BTreeMap::new();
        let mut variant_categories: Vec<(&Ident, Option<String>)> = Vec::new();

        for variant in variants.iter() {
            let category = if variant.skip_category {
                None
            } else if let Some(ref explicit) = variant.category {
                Some(explicit.clone())
            } else {
                infer_category(&variant.ident.to_string())
            };

            variant_categories.push((&variant.ident, category.clone()));
            if let Some(category) = category {
                categories.entry(category).or_default().push(&variant.ident);
            }
        }

        let category_arms: Vec<_> = variant_categories
            .iter()
            .map(|(variant, category)| {
                let value = match category {
                    Some(c) => quote! { ::core::option::Option::Some(#c) },
                    None => quote! { ::core::option::Option::None },
                };
                quote! { #name::#variant { .. } => #value }
            })
            .collect();

        let category_enum_name = format_ident!("{}Category", name);
        let category_names: Vec<&String> = categories.keys().collect();
        let category_variants: Vec<Ident> = categories
            .keys()
            .map(|c| format_ident!("{}", to_pascal_case(c)))
            .collect();

        let category_enum_arms: Vec<_> = variant_categories
            .iter()
            .map(|(variant, category)| {
                let category_variant = match category {
                    Some(c) => format_ident!("{}", to_pascal_case(c)),
                    None => format_ident!("Uncategorized"),
                };
                quote! { #name::#variant { .. } => #category_enum_name::#category_variant }
            })
            .collect();

        let predicates: Vec<_> = categories
            .iter()
            .map(|(category, members)| {
                let predicate = format_ident!("is_{}", category);
                let patterns: Vec<_> = members
                    .iter()
                    .map(|member| quote! { #name::#member { .. } })
                    .collect();
                let doc =
                    format!("Returns true if this action belongs to the `{category}` category.");
                quote! {
                    #[doc = #doc]
                    pub fn #predicate(&self) -> bool {
                        matches!(self, #(#patterns)|*)
                    }
                }
            })
            .collect();

        let category_enum_doc = format!("Action categories for [`{name}`].");

        expanded = quote! {
            #expanded

            #[doc = #category_enum_doc]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum #category_enum_name {
                #(#category_variants,)*
                /// Actions with no specific category.
                Uncategorized,
            }

            impl #category_enum_name {
                /// All category values.
                pub fn all() -> &'static [Self] {
                    &[#(Self::#category_variants,)* Self::Uncategorized]
                }

                /// Category name as a string.
                pub fn name(&self) -> &'static str {
                    match self {
                        #(Self::#category_variants => #category_names,)*
                        Self::Uncategorized => "uncategorized",
                    }
                }
            }

            impl #name {
                /// The action's category, if it has one.
                pub fn category(&self) -> ::core::option::Option<&'static str> {
                    match self {
                        #(#category_arms,)*
                    }
                }

                /// The category as an enum value.
                pub fn category_enum(&self) -> #category_enum_name {
                    match self {
                        #(#category_enum_arms,)*
                    }
                }

                #(#predicates)*
            }

            impl formflow::ActionCategory for #name {
                type Category = #category_enum_name;

                fn category(&self) -> ::core::option::Option<&'static str> {
                    #name::category(self)
                }

                fn category_enum(&self) -> Self::Category {
                    #name::category_enum(self)
                }
            }
        };
    }

    TokenStream::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_pascal_case() {
        assert_eq!(split_pascal_case("ItemAdd"), vec!["Item", "Add"]);
        assert_eq!(
            split_pascal_case("SearchDidLoad"),
            vec!["Search", "Did", "Load"]
        );
        assert_eq!(split_pascal_case("Clear"), vec!["Clear"]);
    }

    #[test]
    fn snake_and_pascal_roundtrip() {
        assert_eq!(to_snake_case("RecentRemove"), "recent_remove");
        assert_eq!(to_pascal_case("recent_remove"), "RecentRemove");
    }

    #[test]
    fn infers_prefix_before_verb() {
        assert_eq!(infer_category("ItemAdd"), Some("item".to_string()));
        assert_eq!(infer_category("QuantitySet"), Some("quantity".to_string()));
        assert_eq!(infer_category("DrawerToggle"), Some("drawer".to_string()));
        assert_eq!(infer_category("SessionLoad"), Some("session".to_string()));
        assert_eq!(infer_category("SubmitStart"), Some("submit".to_string()));
    }

    #[test]
    fn result_actions_group_with_their_flow() {
        assert_eq!(infer_category("SearchDidLoad"), Some("search".to_string()));
        assert_eq!(infer_category("SubmitDidError"), Some("submit".to_string()));
        assert_eq!(infer_category("DidConnect"), Some("async_result".to_string()));
    }

    #[test]
    fn leading_verbs_stay_uncategorized() {
        assert_eq!(infer_category("Clear"), None);
        assert_eq!(infer_category("SetTheme"), None);
        assert_eq!(infer_category("Tick"), None);
    }
}
