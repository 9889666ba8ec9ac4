//! Integration tests for #[derive(Action)] category inference

use formflow::{Action, ActionCategory};

#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
enum StoreAction {
    ItemAdd { id: String },
    ItemRemove(String),
    QuantitySet { id: String, quantity: u32 },
    SearchStart(String),
    SearchDidLoad { results: Vec<String> },
    SearchDidError(String),
    #[action(category = "drawer")]
    Expand,
    #[action(skip_category)]
    DrawerToggle,
    Clear,
}

#[test]
fn name_returns_variant_name() {
    use formflow::Action as _;

    assert_eq!(StoreAction::ItemAdd { id: "a".into() }.name(), "ItemAdd");
    assert_eq!(StoreAction::ItemRemove("a".into()).name(), "ItemRemove");
    assert_eq!(StoreAction::Clear.name(), "Clear");
}

#[test]
fn categories_are_inferred_from_prefixes() {
    assert_eq!(StoreAction::ItemAdd { id: "a".into() }.category(), Some("item"));
    assert_eq!(StoreAction::ItemRemove("a".into()).category(), Some("item"));
    assert_eq!(
        StoreAction::QuantitySet {
            id: "a".into(),
            quantity: 2
        }
        .category(),
        Some("quantity")
    );
    assert_eq!(StoreAction::SearchStart("q".into()).category(), Some("search"));
}

#[test]
fn result_actions_share_their_flow_category() {
    assert_eq!(
        StoreAction::SearchDidLoad { results: vec![] }.category(),
        Some("search")
    );
    assert_eq!(
        StoreAction::SearchDidError("mock".into()).category(),
        Some("search")
    );
    assert!(StoreAction::SearchDidLoad { results: vec![] }.is_search());
}

#[test]
fn explicit_category_overrides_inference() {
    assert_eq!(StoreAction::Expand.category(), Some("drawer"));
    assert!(StoreAction::Expand.is_drawer());
}

#[test]
fn skip_category_and_leading_verbs_are_uncategorized() {
    assert_eq!(StoreAction::DrawerToggle.category(), None);
    assert_eq!(StoreAction::Clear.category(), None);
    assert_eq!(
        StoreAction::Clear.category_enum(),
        StoreActionCategory::Uncategorized
    );
}

#[test]
fn category_enum_lists_all_categories() {
    let names: Vec<&str> = StoreActionCategory::all()
        .iter()
        .map(|category| category.name())
        .collect();

    assert!(names.contains(&"item"));
    assert!(names.contains(&"search"));
    assert!(names.contains(&"drawer"));
    assert_eq!(names.last(), Some(&"uncategorized"));
}

#[test]
fn trait_impl_matches_inherent_methods() {
    let action = StoreAction::SearchStart("q".into());
    assert_eq!(ActionCategory::category(&action), Some("search"));
    assert_eq!(
        ActionCategory::category_enum(&action),
        StoreActionCategory::Search
    );
}
