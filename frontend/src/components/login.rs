use crate::auth::use_auth;
use crate::components::marketplace;
use crate::components::toast::use_toaster;
use crate::forms::LoginForm;
use crate::notify::Notice;
use crate::session::Role;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_navigate};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 客户与管理员共用的登录页
#[component]
pub fn LoginPage(role: Role) -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let navigate = use_navigate();

    let form = RwSignal::new(LoginForm::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }

        let (email, password) = match form.with_untracked(LoginForm::validate) {
            Ok(credentials) => credentials,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            let api = marketplace();
            let result = match role {
                Role::User => api.login_user(&email, &password).await,
                Role::Admin => api.login_admin(&email, &password).await,
            };
            match result {
                Ok(outcome) => {
                    let target = auth.login(role, &outcome.token, outcome.profile);
                    toaster.show(Notice::success("Login successful"));
                    navigate(&target.to_path());
                }
                Err(e) => {
                    tracing::warn!("{role:?} login failed: {e}");
                    set_error_msg.set(Some(e.user_message()));
                }
            }
            set_is_submitting.set(false);
        });
    };

    let (title, subtitle) = match role {
        Role::User => ("Welcome back", "Log in to book services for your vehicle"),
        Role::Admin => ("Admin login", "Manage orders and services"),
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">{title}</h1>
                    <p class="text-base-content/70">{subtitle}</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="you@example.com"
                                on:input=move |ev| form.update(|f| f.email = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.email.clone())
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| form.update(|f| f.password = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.password.clone())
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Logging in..." }.into_any()
                                } else {
                                    "Log in".into_any()
                                }}
                            </button>
                        </div>
                        {match role {
                            Role::User => view! {
                                <p class="text-sm text-center mt-2">
                                    "New here? "
                                    <Link to=AppRoute::Signup.to_path() class="link link-primary">"Create an account"</Link>
                                </p>
                            }.into_any(),
                            Role::Admin => ().into_any(),
                        }}
                    </form>
                </div>
            </div>
        </div>
    }
}
