use leptos::prelude::*;
use leptos::task::spawn_local;
use loyalty_console_shared::LoginMode;

use crate::components::shell::use_console;

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_console();

    let (mode, set_mode) = signal(LoginMode::default());
    let (identifier, set_identifier) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let select_mode = move |next: LoginMode| {
        set_mode.set(next);
        set_error_msg.set(None);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if identifier.get().trim().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("Please fill in all fields".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let gateway = ctx.gateway.get_value();
        let router = ctx.router.get_value();
        let (mode, identifier, password) = (mode.get(), identifier.get(), password.get());
        spawn_local(async move {
            match gateway.login(mode, identifier.trim(), &password).await {
                // 整页刷新后由路由器重新装载外壳
                Ok(_) => router.complete_login(),
                Err(e) => {
                    set_error_msg.set(Some(e.to_string()));
                    set_is_submitting.set(false);
                }
            }
        });
    };

    let tab_class = move |tab: LoginMode| {
        if mode.get() == tab {
            "tab tab-active"
        } else {
            "tab"
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">
                        "✨ Loyalty" <span class="text-primary">"Pro"</span>
                    </h1>
                    <h2 class="text-xl mt-2">"Welcome Back"</h2>
                    <p class="text-base-content/70">"Login to access your dashboard"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <div role="tablist" class="tabs tabs-boxed m-4 mb-0">
                        <button
                            type="button"
                            role="tab"
                            class=move || tab_class(LoginMode::Operator)
                            on:click=move |_| select_mode(LoginMode::Operator)
                        >
                            "Operator Login"
                        </button>
                        <button
                            type="button"
                            role="tab"
                            class=move || tab_class(LoginMode::Player)
                            on:click=move |_| select_mode(LoginMode::Player)
                        >
                            "Player Login"
                        </button>
                    </div>

                    <form class="card-body" on:submit=on_submit>
                        <div class="form-control">
                            <label class="label" for="identifier">
                                <span class="label-text">{move || mode.get().identifier_label()}</span>
                            </label>
                            <input
                                id="identifier"
                                type="text"
                                placeholder=move || mode.get().identifier_placeholder()
                                on:input=move |ev| set_identifier.set(event_target_value(&ev))
                                prop:value=identifier
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
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>

                        {move || {
                            error_msg
                                .get()
                                .map(|msg| {
                                    view! {
                                        <div role="alert" class="alert alert-error text-sm py-2">
                                            <span>{msg}</span>
                                        </div>
                                    }
                                })
                        }}

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || {
                                    if is_submitting.get() {
                                        view! { <span class="loading loading-spinner"></span> "Logging in..." }
                                            .into_any()
                                    } else {
                                        "Login".into_any()
                                    }
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
