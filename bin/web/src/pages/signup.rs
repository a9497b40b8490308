//! Patient self-registration.

use crate::components::{ErrorPanel, non_empty};
use crate::data::ServerFnSource;
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medicare_backend::TableQuery;
use medicare_backend::records::{NewPatient, Patient};
use medicare_platform_access::{Identity, Role};
use std::sync::Arc;

/// Creates a patient record and signs the new patient in.
///
/// Only writes, so it skips the table read that `use_table` would start.
#[component]
pub fn SignupPage() -> impl IntoView {
    let session = use_session();

    let (name, set_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (phone, set_phone) = signal(String::new());
    let (date_of_birth, set_date_of_birth) = signal(String::new());
    let (submitting, set_submitting) = signal(false);
    let (error, set_error) = signal(Option::<String>::None);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let (Some(name), Some(email)) = (
            non_empty(name.get_untracked()),
            non_empty(email.get_untracked()),
        ) else {
            set_error.set(Some("Name and email are required.".to_string()));
            return;
        };
        let payload = NewPatient {
            name,
            email,
            phone: non_empty(phone.get_untracked()),
            date_of_birth: non_empty(date_of_birth.get_untracked()),
            gender: None,
            address: None,
        };

        set_submitting.set(true);
        set_error.set(None);
        spawn_local(async move {
            let patients = TableQuery::<Patient>::new(Arc::new(ServerFnSource));
            let created = patients.create(&payload).await;
            set_submitting.set(false);
            match created {
                Ok(patient) => {
                    tracing::info!(patient_id = %patient.id, "Patient registered");
                    let identity = Identity::new(patient.id, patient.email, patient.name)
                        .with_phone(patient.phone);
                    session.login(identity, Role::Patient, None);
                }
                Err(e) => set_error.set(Some(e.to_string())),
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"Create a patient account"</h1>
                {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
                <form on:submit=submit>
                    <div class="form-row">
                        <label for="name">"Full name"</label>
                        <input id="name" required prop:value=name
                            on:input=move |ev| set_name.set(event_target_value(&ev))/>
                    </div>
                    <div class="form-row">
                        <label for="email">"Email"</label>
                        <input id="email" type="email" required prop:value=email
                            on:input=move |ev| set_email.set(event_target_value(&ev))/>
                    </div>
                    <div class="form-row">
                        <label for="phone">"Phone"</label>
                        <input id="phone" type="tel" prop:value=phone
                            on:input=move |ev| set_phone.set(event_target_value(&ev))/>
                    </div>
                    <div class="form-row">
                        <label for="dob">"Date of birth"</label>
                        <input id="dob" type="date" prop:value=date_of_birth
                            on:input=move |ev| set_date_of_birth.set(event_target_value(&ev))/>
                    </div>
                    <button type="submit" class="login-button" disabled=submitting>
                        {move || if submitting.get() { "Creating..." } else { "Sign up" }}
                    </button>
                </form>
                <p>"Already registered? " <a href="/login">"Log in"</a></p>
            </div>
        </div>
    }
}
