//! 注册与邮箱验证

use crate::components::marketplace;
use crate::components::toast::use_toaster;
use crate::forms::{OtpForm, SignupForm};
use crate::notify::Notice;
use crate::web::route::AppRoute;
use crate::web::router::{Link, query_param, use_navigate};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
fn TextField<F>(
    id: &'static str,
    label: &'static str,
    #[prop(default = "text")] kind: &'static str,
    value: Signal<String>,
    on_input: F,
) -> impl IntoView
where
    F: Fn(String) + 'static,
{
    view! {
        <div class="form-control">
            <label class="label" for=id>
                <span class="label-text">{label}</span>
            </label>
            <input
                id=id
                type=kind
                on:input=move |ev| on_input(event_target_value(&ev))
                prop:value=value
                class="input input-bordered"
            />
        </div>
    }
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let toaster = use_toaster();
    let navigate = use_navigate();

    let form = RwSignal::new(SignupForm::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let field = move |read: fn(&SignupForm) -> &String| {
        Signal::derive(move || form.with(|f| read(f).clone()))
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }
        let request = match form.with_untracked(SignupForm::validate) {
            Ok(request) => request,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            match marketplace().signup(&request).await {
                Ok(message) => {
                    toaster.show(Notice::success(
                        message.unwrap_or_else(|| "Verification code sent".to_string()),
                    ));
                    let otp = format!(
                        "{}?email={}",
                        AppRoute::Otp.to_path(),
                        urlencoding::encode(&request.email)
                    );
                    navigate(&otp);
                }
                Err(e) => {
                    tracing::warn!("signup failed: {e}");
                    set_error_msg.set(Some(e.user_message()));
                }
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Create your account"</h1>
                    <p class="text-base-content/70">"Vehicle services delivered to you"</p>
                </div>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>
                        <TextField id="name" label="Full name" value=field(|f| &f.name)
                            on_input=move |v| form.update(|f| f.name = v) />
                        <TextField id="email" label="Email" kind="email" value=field(|f| &f.email)
                            on_input=move |v| form.update(|f| f.email = v) />
                        <TextField id="phone" label="Phone" kind="tel" value=field(|f| &f.phone)
                            on_input=move |v| form.update(|f| f.phone = v) />
                        <TextField id="password" label="Password" kind="password" value=field(|f| &f.password)
                            on_input=move |v| form.update(|f| f.password = v) />
                        <TextField id="confirm" label="Confirm password" kind="password"
                            value=field(|f| &f.confirm_password)
                            on_input=move |v| form.update(|f| f.confirm_password = v) />
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() { "Signing up..." } else { "Sign up" }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "Already registered? "
                            <Link to=AppRoute::Login.to_path() class="link link-primary">"Log in"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn OtpPage() -> impl IntoView {
    let toaster = use_toaster();
    let navigate = use_navigate();

    let form = RwSignal::new(OtpForm {
        email: query_param("email").unwrap_or_default(),
        code: String::new(),
    });
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }
        let (email, code) = match form.with_untracked(OtpForm::validate) {
            Ok(values) => values,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            match marketplace().verify_otp(&email, &code).await {
                Ok(message) => {
                    toaster.show(Notice::success(
                        message.unwrap_or_else(|| "Account verified. Please log in.".to_string()),
                    ));
                    navigate(&AppRoute::Login.to_path());
                }
                Err(e) => {
                    tracing::warn!("otp verification failed: {e}");
                    set_error_msg.set(Some(e.user_message()));
                }
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Verify your email"</h1>
                    <p class="text-base-content/70">"Enter the 6-digit code we sent you"</p>
                </div>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>
                        <TextField id="email" label="Email" kind="email"
                            value=Signal::derive(move || form.with(|f| f.email.clone()))
                            on_input=move |v| form.update(|f| f.email = v) />
                        <div class="form-control">
                            <label class="label" for="otp">
                                <span class="label-text">"Verification code"</span>
                            </label>
                            <input
                                id="otp"
                                inputmode="numeric"
                                maxlength="6"
                                placeholder="123456"
                                on:input=move |ev| form.update(|f| f.code = event_target_value(&ev))
                                prop:value=move || form.with(|f| f.code.clone())
                                class="input input-bordered tracking-widest text-center text-2xl"
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() { "Verifying..." } else { "Verify" }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
