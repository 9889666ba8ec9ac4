//! formapp - scripted demo driving every formflow store
//!
//! Runs the end-to-end flows headlessly: session load, overlapping
//! searches, cart mutations, the contact form with its debounced name
//! screen, and the persisted theme. Each store logs its transitions
//! through a tracing subscriber, so the lifecycle ordering is visible.
//!
//! ```sh
//! cargo run -p formapp-demo
//! cargo run -p formapp-demo -- --latency-ms 50 --fail-submit
//! ```

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use formflow::{Driver, EffectContext, FieldKind, FieldValue, TraceMiddleware};
use formflow_stores::{
    auth::{self, AuthAction, AuthEffect},
    builder::{self, BuilderAction, Form, FormField, FormStatus},
    cart::{self, CartAction},
    contact::{self, ContactAction, ContactEffect},
    search::{self, SearchAction, SearchEffect},
    storage::{BlobStore, MemoryBlobStore},
    theme::{self, ResolvedTheme, Theme, ThemeAction, THEME_STORAGE_KEY},
};
use tracing::info;

/// Scripted demo of the formflow stores
#[derive(Parser, Debug)]
#[command(name = "formapp")]
#[command(about = "Drives every formflow store through its main flows")]
struct Args {
    /// Simulated latency for the mock auth/search backends, in ms
    #[arg(long, default_value = "300")]
    latency_ms: u64,

    /// Make the contact submission fail instead of succeeding
    #[arg(long)]
    fail_submit: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let latency = Duration::from_millis(args.latency_ms);

    run_auth(latency).await;
    run_search(latency).await;
    run_cart();
    run_contact(args.fail_submit).await;
    run_builder();
    run_theme();
}

async fn run_auth(latency: Duration) {
    info!("--- auth: session load ---");
    let mut driver = Driver::new(auth::AuthState::default(), auth::reducer);
    driver.push_middleware(TraceMiddleware::new());
    driver.subscribe(|state: &auth::AuthState| {
        info!(
            loading = state.is_loading(),
            authenticated = state.is_authenticated,
            user = state.current_user.as_ref().map(|u| u.name.as_str()),
            "auth state"
        );
    });

    driver.enqueue(AuthAction::SessionLoad);
    driver
        .run_until_idle(&mut |effect, ctx: &mut EffectContext<'_, AuthAction>| match effect {
            AuthEffect::LoadSession { ticket } => {
                ctx.tasks().spawn("auth:load", async move {
                    tokio::time::sleep(latency).await;
                    AuthAction::SessionDidLoad {
                        ticket,
                        user: auth::mock_user(),
                    }
                });
            }
        })
        .await;
}

async fn run_search(latency: Duration) {
    info!("--- search: overlapping queries, newest wins ---");
    let mut driver = Driver::new(search::SearchState::default(), search::reducer);
    driver.push_middleware(TraceMiddleware::new());
    driver.subscribe(|state: &search::SearchState| {
        info!(
            query = %state.query,
            searching = state.is_searching(),
            results = state.results.len(),
            recent = ?state.recent,
            "search state"
        );
    });

    // The first query is superseded before its backend call resolves.
    driver.enqueue(SearchAction::SearchStart("invoices".into()));
    driver.enqueue(SearchAction::SearchStart("contracts".into()));
    driver
        .run_until_idle(&mut |effect, ctx: &mut EffectContext<'_, SearchAction>| match effect {
            SearchEffect::Query { query, ticket } => {
                ctx.tasks().spawn(format!("search:{query}"), async move {
                    tokio::time::sleep(latency).await;
                    SearchAction::SearchDidLoad {
                        ticket,
                        results: search::mock_results(&query),
                    }
                });
            }
        })
        .await;
}

fn run_cart() {
    info!("--- cart: add, update, remove ---");
    let mut store = cart::store();
    store.push_middleware(TraceMiddleware::new());
    store.subscribe(|state: &cart::CartState| {
        info!(
            items = state.items.len(),
            count = state.item_count(),
            total = state.total(),
            "cart state"
        );
    });

    store.dispatch(CartAction::ItemAdd {
        id: "sku-1".into(),
        name: "Notebook".into(),
        price: 10.0,
    });
    store.dispatch(CartAction::ItemAdd {
        id: "sku-1".into(),
        name: "Notebook".into(),
        price: 10.0,
    });
    store.dispatch(CartAction::ItemAdd {
        id: "sku-2".into(),
        name: "Pen".into(),
        price: 20.0,
    });
    store.dispatch(CartAction::QuantitySet {
        id: "sku-2".into(),
        quantity: 3,
    });
    store.dispatch(CartAction::ItemRemove("sku-1".into()));
    store.dispatch(CartAction::Clear);
}

async fn run_contact(fail_submit: bool) {
    info!("--- contact: debounced screen + submission lifecycle ---");
    let mut driver = Driver::new(contact::ContactFormState::default(), contact::reducer);
    driver.push_middleware(TraceMiddleware::new());
    driver.subscribe(|state: &contact::ContactFormState| {
        info!(
            status = ?state.lifecycle.status(),
            error = state.lifecycle.error(),
            submissions = state.submissions.len(),
            can_submit = state.can_submit(),
            "contact state"
        );
    });

    let mut handler = move |effect: ContactEffect, ctx: &mut EffectContext<'_, ContactAction>| {
        match effect {
            ContactEffect::Send { ticket, .. } if fail_submit => {
                ctx.tasks().spawn("contact:send", async move {
                    ContactAction::SubmitDidError {
                        ticket,
                        message: "Failed to submit form".into(),
                    }
                });
            }
            other => contact::handle_effect(other, ctx),
        }
    };

    // A rejected name first, then the real one before the screen fires.
    driver.enqueue(ContactAction::FieldChange {
        name: "first_name".into(),
        value: FieldValue::Text("test".into()),
    });
    driver.enqueue(ContactAction::FieldChange {
        name: "first_name".into(),
        value: FieldValue::Text("John".into()),
    });
    driver.enqueue(ContactAction::FieldChange {
        name: "last_name".into(),
        value: FieldValue::Text("Doe".into()),
    });
    driver.enqueue(ContactAction::FieldChange {
        name: "email".into(),
        value: FieldValue::Email("john.doe@example.com".into()),
    });
    driver.enqueue(ContactAction::FieldChange {
        name: "age".into(),
        value: FieldValue::Number(25.0),
    });
    driver.enqueue(ContactAction::FieldChange {
        name: "message".into(),
        value: FieldValue::TextArea("Hello from the formflow demo application.".into()),
    });
    driver.run_until_idle(&mut handler).await;

    driver.enqueue(ContactAction::SubmitStart);
    driver.run_until_idle(&mut handler).await;

    info!(
        submissions = driver.state().submissions.len(),
        error = driver.state().lifecycle.error(),
        "contact flow settled"
    );
}

fn run_builder() {
    info!("--- builder: save, revise, delete ---");
    let mut store = builder::store();
    store.push_middleware(TraceMiddleware::new());
    store.subscribe(|state: &builder::BuilderState| {
        info!(
            forms = state.forms.len(),
            current = state.current.as_ref().map(|form| form.title.as_str()),
            "builder state"
        );
    });

    let now = Utc::now();
    let draft = Form {
        id: "feedback".into(),
        title: "Customer feedback".into(),
        description: "Post-purchase survey".into(),
        status: FormStatus::Draft,
        fields: vec![FormField {
            id: "feedback-email".into(),
            name: "email".into(),
            label: "Email".into(),
            kind: FieldKind::Email,
            required: true,
            value: None,
            rules: vec![],
        }],
        created_at: now,
        updated_at: now,
        submitted_at: None,
    };

    store.dispatch(BuilderAction::FormSave {
        form: draft.clone(),
        at: now,
    });

    let mut revised = draft;
    revised.title = "Customer feedback (v2)".into();
    store.dispatch(BuilderAction::FormSave {
        form: revised,
        at: Utc::now(),
    });

    store.dispatch(BuilderAction::FormDelete("feedback".into()));
}

fn run_theme() {
    info!("--- theme: toggle + persistence ---");
    let mut storage = MemoryBlobStore::new();
    let mut store = theme::store(&storage);
    store.push_middleware(TraceMiddleware::new());
    store.subscribe(|state: &theme::ThemeState| {
        info!(theme = ?state.theme, "theme state");
    });

    // The environment reports dark; toggling from `system` lands on light.
    let system = ResolvedTheme::Dark;
    for action in [
        ThemeAction::Toggle { system },
        ThemeAction::Set(Theme::System),
        ThemeAction::Toggle { system },
    ] {
        let result = store.dispatch(action);
        for effect in result.effects {
            if let Err(err) = theme::persist_effect(effect, &mut storage) {
                tracing::warn!(%err, "theme persist failed");
            }
        }
    }

    info!(
        effective = ?store.state().effective(system),
        persisted = ?storage.read(THEME_STORAGE_KEY),
        "theme settled"
    );
}
