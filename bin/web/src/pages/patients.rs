//! Patient register for doctors and the front desk.

use crate::components::{ErrorPanel, format_timestamp, query_view};
use crate::hooks::use_table;
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medicare_backend::records::Patient;
use medicare_core::RecordId;
use medicare_platform_access::Role;

#[component]
pub fn PatientsPage() -> impl IntoView {
    let session = use_session();
    let admin = session.role() == Role::Admin;
    let patients = use_table::<Patient>();
    let (error, set_error) = signal(Option::<String>::None);
    let (search, set_search) = signal(String::new());

    let remove = move |id: RecordId| {
        spawn_local(async move {
            match patients.delete(id).await {
                Ok(()) => patients.refetch(),
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    let list = query_view(patients, "No patients registered.", move |rows| {
        let needle = search.get().trim().to_lowercase();
        view! {
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Name"</th>
                        <th>"Email"</th>
                        <th>"Phone"</th>
                        <th>"Registered"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    {rows
                        .into_iter()
                        .filter(|row| {
                            needle.is_empty()
                                || row.name.to_lowercase().contains(&needle)
                                || row.email.to_lowercase().contains(&needle)
                        })
                        .map(|row| {
                            let history = format!("/patients/{}/history", row.id);
                            let id = row.id.clone();
                            view! {
                                <tr>
                                    <td><a href=history>{row.name}</a></td>
                                    <td>{row.email}</td>
                                    <td>{row.phone.unwrap_or_default()}</td>
                                    <td>{format_timestamp(&row.created_at)}</td>
                                    <td class="row-actions">
                                        {admin.then(|| view! {
                                            <button class="danger" on:click=move |_| remove(id.clone())>"Delete"</button>
                                        })}
                                    </td>
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
        <div class="patients-page">
            <h1>"Patients"</h1>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            <input class="search" type="search" placeholder="Search by name or email"
                prop:value=search on:input=move |ev| set_search.set(event_target_value(&ev))/>
            <section class="list-section">{list}</section>
        </div>
    }
}
