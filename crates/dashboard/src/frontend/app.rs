//! Leptos application: one guarded catch-all route.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::*;
use leptos_router::*;

use graphura_auth::{
    GuardDecision, LOGIN_PATH, PageId, RenderTarget, RoleRouter, RouteEntry, RouteGuard, Session, render_navigation,
};
use graphura_client::types::LoginRequest;
use graphura_client::{ApiClient, IdentityProvider, InitStep, SessionStore};

use crate::config::DEFAULT_API_URL;
use crate::frontend::storage::LocalStorageTokenStore;
use crate::pages::{PageFilters, PageState, PageTable, load_page};
use crate::shell::{APP_TITLE, ProfileBlock};

/// API base URL baked in at build time.
fn api_url() -> &'static str {
    option_env!("GRAPHURA_API_URL").unwrap_or(DEFAULT_API_URL)
}

/// Shared app state. `session` mirrors the store so views can subscribe.
#[derive(Clone)]
struct AppContext {
    api: ApiClient,
    store: Rc<RefCell<SessionStore<LocalStorageTokenStore>>>,
    session: RwSignal<Session>,
}

impl AppContext {
    fn publish(&self) {
        self.session.set(self.store.borrow().session().clone());
    }

    fn logout(&self) {
        self.store.borrow_mut().logout();
        self.publish();
    }

    fn authed_api(&self) -> ApiClient {
        let mut api = self.api.clone();
        api.set_token(self.session.get_untracked().token().cloned());
        api
    }
}

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext {
        api: ApiClient::new(api_url()),
        store: Rc::new(RefCell::new(SessionStore::new(LocalStorageTokenStore))),
        session: create_rw_signal(Session::new()),
    };

    let step = ctx.store.borrow_mut().begin_initialize();
    match step {
        Ok(InitStep::Validate(token)) => {
            let ctx = ctx.clone();
            spawn_local(async move {
                let outcome = ctx.api.whoami(&token).await;
                let completed = ctx.store.borrow_mut().complete_initialize(outcome);
                if let Err(err) = completed {
                    tracing::warn!(error = %err, "session initialization failed");
                }
                ctx.publish();
            });
        }
        Ok(InitStep::Resolved(_)) => ctx.publish(),
        Err(err) => {
            tracing::warn!(error = %err, "session initialization failed");
            ctx.publish();
        }
    }

    provide_context(ctx);

    view! {
        <Router>
            <Routes>
                <Route path="/*any" view=Guarded/>
            </Routes>
        </Router>
    }
}

/// Runs the route guard for every location change.
#[component]
fn Guarded() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let session = ctx.session;
    let pathname = use_location().pathname;

    let decision = create_memo(move |_| RouteGuard::standard().decide(&session.get(), &pathname.get()));

    // Writes `session`, so it stays out of the render closure below.
    create_effect(move |_| {
        if decision.get().requires_logout() {
            ctx.logout();
        }
    });

    move || match decision.get() {
        GuardDecision::Suspend => view! { <div class="loading-message">"Loading..."</div> }.into_view(),
        GuardDecision::Render(RenderTarget::Login) => view! { <LoginPage/> }.into_view(),
        GuardDecision::Render(RenderTarget::Route(entry)) => view! { <ShellView entry=entry/> }.into_view(),
        GuardDecision::RedirectTo(target) => view! { <Redirect path=target/> }.into_view(),
        GuardDecision::ForceLogout => view! { <Redirect path=LOGIN_PATH/> }.into_view(),
    }
}

#[component]
fn LoginPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let is_submitting = create_rw_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }

        let request = match LoginRequest::new(&email.get_untracked(), password.get_untracked()) {
            Ok(request) => request,
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };

        is_submitting.set(true);
        let ctx = ctx.clone();
        spawn_local(async move {
            match ctx.api.login(&request).await {
                Ok(success) => {
                    let saved = ctx.store.borrow_mut().login(success.user, success.token);
                    match saved {
                        Ok(()) => {
                            error.set(None);
                            ctx.publish();
                        }
                        Err(e) => error.set(Some(e.to_string())),
                    }
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            is_submitting.set(false);
        });
    };

    view! {
        <div class="login-page">
            <h1>{APP_TITLE}</h1>
            <form on:submit=submit>
                <div class="form-group">
                    <label for="email">"Email"</label>
                    <input
                        type="email"
                        id="email"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label for="password">"Password"</label>
                    <input
                        type="password"
                        id="password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </div>
                {move || error.get().map(|msg| view! { <p class="error-message">{msg}</p> })}
                <button type="submit" disabled=move || is_submitting.get()>"Login"</button>
            </form>
        </div>
    }
}

/// Header, profile block, navigation and the routed page.
#[component]
fn ShellView(entry: RouteEntry) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let session = ctx.session.get_untracked();
    let Some(user) = session.user().cloned() else {
        return view! { <Redirect path=LOGIN_PATH/> }.into_view();
    };

    let navigation = RoleRouter::standard()
        .for_session(&session, |e| e.page)
        .map(|table| render_navigation(&table, entry.path))
        .unwrap_or_default();
    let profile = ProfileBlock::for_user(&user);

    let api = ctx.authed_api();
    let search = use_location().search;
    let page = create_local_resource(
        move || (entry.page, PageFilters::from_query(&search.get())),
        move |(page, filters): (PageId, PageFilters)| {
            let api = api.clone();
            let user = user.clone();
            async move { PageState::from(load_page(&api, page, &user, &filters).await) }
        },
    );

    view! {
        <div class="layout">
            <header class="header">
                <h1>{APP_TITLE}</h1>
            </header>

            <aside class="sidebar">
                <div class="profile">
                    <img class="avatar" src=profile.avatar alt="Profile"/>
                    <div class="profile-name">{profile.name}</div>
                    <div class="profile-role">{profile.role}</div>
                </div>
                <nav>
                    <ul>
                        {navigation
                            .items
                            .into_iter()
                            .map(|item| {
                                view! {
                                    <li class:active=item.active>
                                        <A href=item.path>{item.label}</A>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                </nav>
                <button class="logout" on:click=move |_| ctx.logout()>"Logout"</button>
            </aside>

            <main class="content">
                <h2>{entry.page.title()}</h2>
                {move || match page.get() {
                    None | Some(PageState::Loading) => {
                        view! { <div class="loading-message">"Loading..."</div> }.into_view()
                    }
                    Some(PageState::Ready(content)) => table_view(content.table()),
                    Some(PageState::Failed { message, retryable }) => {
                        view! {
                            <div class="error-message">
                                <p>{message}</p>
                                {retryable
                                    .then(|| {
                                        view! {
                                            <button class="retry" on:click=move |_| page.refetch()>
                                                "Retry"
                                            </button>
                                        }
                                    })}
                            </div>
                        }
                        .into_view()
                    }
                }}
            </main>
        </div>
    }
    .into_view()
}

fn table_view(table: PageTable) -> View {
    if table.is_empty() {
        return view! { <p class="no-data-message">"No data available."</p> }.into_view();
    }

    let PageTable { columns, rows } = table;
    view! {
        <table>
            <thead>
                <tr>{columns.into_iter().map(|c| view! { <th>{c}</th> }).collect_view()}</tr>
            </thead>
            <tbody>
                {rows
                    .into_iter()
                    .map(|row| view! { <tr>{row.into_iter().map(|cell| view! { <td>{cell}</td> }).collect_view()}</tr> })
                    .collect_view()}
            </tbody>
        </table>
    }
    .into_view()
}
