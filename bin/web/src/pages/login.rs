//! Login page component.

use crate::components::ErrorPanel;
use crate::session::use_session;
use leptos::prelude::*;
use medicare_platform_access::{DEMO_PASSWORD, DemoDirectory, Role};
use std::str::FromStr;

/// Login form backed by the demo account directory.
///
/// On success the session is stored; the route guard then moves the user
/// from this public page to the dashboard.
#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let remembered = session.remembered_email();

    let (email, set_email) = signal(remembered.clone().unwrap_or_default());
    let (password, set_password) = signal(String::new());
    let (role, set_role) = signal(Role::Patient);
    let (remember, set_remember) = signal(remembered.is_some());
    let (error, set_error) = signal(Option::<String>::None);

    let directory = DemoDirectory::new();
    let accounts = directory.accounts().to_vec();

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let email_value = email.get_untracked();
        let attempt = directory.authenticate(
            &email_value,
            &password.get_untracked(),
            role.get_untracked(),
        );
        match attempt {
            Ok(login) => {
                let remembered = remember.get_untracked().then(|| email_value.trim().to_string());
                session.remember_email(remembered.as_deref());
                set_error.set(None);
                session.login(login.identity, login.role, Some(login.token));
            }
            Err(e) => {
                tracing::debug!(error = %e, "Login rejected");
                set_error.set(Some("Invalid email, password, or role.".to_string()));
            }
        }
    };

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"Log in to Medicare"</h1>
                {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
                <form on:submit=submit>
                    <div class="form-row">
                        <label for="email">"Email"</label>
                        <input
                            id="email"
                            type="email"
                            required
                            prop:value=email
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="form-row">
                        <label for="password">"Password"</label>
                        <input
                            id="password"
                            type="password"
                            required
                            prop:value=password
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="form-row">
                        <label for="role">"Role"</label>
                        <select
                            id="role"
                            on:change=move |ev| {
                                if let Ok(selected) = Role::from_str(&event_target_value(&ev)) {
                                    set_role.set(selected);
                                }
                            }
                        >
                            {Role::AUTHENTICATED
                                .into_iter()
                                .map(|option| {
                                    view! {
                                        <option
                                            value=option.as_str()
                                            selected=move || role.get() == option
                                        >
                                            {option.label()}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="form-row checkbox">
                        <input
                            id="remember"
                            type="checkbox"
                            prop:checked=remember
                            on:change=move |ev| set_remember.set(event_target_checked(&ev))
                        />
                        <label for="remember">"Remember me"</label>
                    </div>
                    <button type="submit" class="login-button">"Log in"</button>
                </form>
                <p>"New patient? " <a href="/signup">"Create an account"</a></p>
            </div>

            <section class="demo-accounts">
                <h2>"Demo accounts"</h2>
                <p>"Every demo account uses the password " <code>{DEMO_PASSWORD}</code> "."</p>
                <ul>
                    {accounts
                        .into_iter()
                        .map(|account| {
                            let (account_email, account_role) = (account.email, account.role);
                            view! {
                                <li>
                                    <button
                                        type="button"
                                        class="link-button"
                                        on:click=move |_| {
                                            set_email.set(account_email.to_string());
                                            set_password.set(DEMO_PASSWORD.to_string());
                                            set_role.set(account_role);
                                        }
                                    >
                                        {account_role.label()} ": " {account_email}
                                    </button>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </section>
        </div>
    }
}
