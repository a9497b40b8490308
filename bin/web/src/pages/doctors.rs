//! Doctor directory. Admins add and remove staff.

use crate::components::{ErrorPanel, non_empty, query_view};
use crate::hooks::{TableHandle, use_table};
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medicare_backend::records::{Doctor, NewDoctor};
use medicare_core::RecordId;
use medicare_platform_access::Role;

#[component]
pub fn DoctorsPage() -> impl IntoView {
    let session = use_session();
    let admin = session.role() == Role::Admin;
    let doctors = use_table::<Doctor>();
    let (error, set_error) = signal(Option::<String>::None);

    let remove = move |id: RecordId| {
        spawn_local(async move {
            match doctors.delete(id).await {
                Ok(()) => doctors.refetch(),
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    let list = query_view(doctors, "No doctors on staff.", move |rows| {
        view! {
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Name"</th>
                        <th>"Specialty"</th>
                        <th>"Department"</th>
                        <th>"Email"</th>
                        <th>"Phone"</th>
                        {admin.then(|| view! { <th></th> })}
                    </tr>
                </thead>
                <tbody>
                    {rows
                        .into_iter()
                        .map(|row| {
                            let id = row.id.clone();
                            view! {
                                <tr>
                                    <td>{row.name}</td>
                                    <td>{row.specialty}</td>
                                    <td>{row.department.unwrap_or_default()}</td>
                                    <td>{row.email}</td>
                                    <td>{row.phone.unwrap_or_default()}</td>
                                    {admin.then(|| view! {
                                        <td class="row-actions">
                                            <button class="danger" on:click=move |_| remove(id.clone())>"Remove"</button>
                                        </td>
                                    })}
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        }
        .into_any()
    });

    view! {
        <div class="doctors-page">
            <h1>"Doctors"</h1>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            {admin.then(|| view! { <HireForm doctors=doctors/> })}
            <section class="list-section">{list}</section>
        </div>
    }
}

#[component]
fn HireForm(doctors: TableHandle<Doctor>) -> impl IntoView {
    let (name, set_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (specialty, set_specialty) = signal(String::new());
    let (department, set_department) = signal(String::new());
    let (error, set_error) = signal(Option::<String>::None);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let (Some(name), Some(email), Some(specialty)) = (
            non_empty(name.get_untracked()),
            non_empty(email.get_untracked()),
            non_empty(specialty.get_untracked()),
        ) else {
            set_error.set(Some("Name, email, and specialty are required.".to_string()));
            return;
        };
        let payload = NewDoctor {
            name,
            email,
            specialty,
            department: non_empty(department.get_untracked()),
            phone: None,
        };

        set_error.set(None);
        spawn_local(async move {
            match doctors.create(payload).await {
                Ok(_) => {
                    set_name.set(String::new());
                    set_email.set(String::new());
                    set_specialty.set(String::new());
                    set_department.set(String::new());
                    doctors.refetch();
                }
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    view! {
        <section class="form-section">
            <h2>"Add a doctor"</h2>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            <form on:submit=submit class="inline-form">
                <input placeholder="Name" prop:value=name
                    on:input=move |ev| set_name.set(event_target_value(&ev))/>
                <input type="email" placeholder="Email" prop:value=email
                    on:input=move |ev| set_email.set(event_target_value(&ev))/>
                <input placeholder="Specialty" prop:value=specialty
                    on:input=move |ev| set_specialty.set(event_target_value(&ev))/>
                <input placeholder="Department" prop:value=department
                    on:input=move |ev| set_department.set(event_target_value(&ev))/>
                <button type="submit">"Add"</button>
            </form>
        </section>
    }
}
