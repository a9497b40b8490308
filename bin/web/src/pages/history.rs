//! Medical history, for a patient's own record and for staff viewing one patient.

use crate::components::{ErrorPanel, format_timestamp, name_lookup, non_empty, query_view};
use crate::hooks::{TableHandle, use_table};
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use medicare_backend::records::{Doctor, HistoryEntry, NewHistoryEntry, Patient};
use medicare_core::RecordId;
use medicare_platform_access::Role;
use std::str::FromStr;

/// The signed-in patient's history.
#[component]
pub fn HistoryPage() -> impl IntoView {
    let session = use_session();
    let Some(identity) = session.identity() else {
        return ().into_any();
    };
    let entries = use_table::<HistoryEntry>();

    view! {
        <div class="history-page">
            <h1>"My medical history"</h1>
            <HistoryList entries=entries patient=identity.id().clone()/>
        </div>
    }
    .into_any()
}

/// One patient's history, reached from the patient register.
#[component]
pub fn PatientHistoryPage() -> impl IntoView {
    let session = use_session();
    let Some(identity) = session.identity() else {
        return ().into_any();
    };
    let params = use_params_map();
    let entries = use_table::<HistoryEntry>();
    let patients = use_table::<Patient>();
    let doctor = (session.role() == Role::Doctor).then(|| identity.id().clone());

    (move || {
        let raw = params.read().get("id").unwrap_or_default();
        let Ok(patient) = RecordId::from_str(&raw) else {
            return view! { <ErrorPanel message="Unknown patient.".to_string()/> }.into_any();
        };
        let title = name_lookup(patients, &patient, |p| p.name.as_str());
        view! {
            <div class="history-page">
                <h1>{format!("History: {title}")}</h1>
                <a href="/patients">"Back to patients"</a>
                {doctor.clone().map(|doctor| view! {
                    <RecordForm entries=entries patient=patient.clone() doctor=doctor/>
                })}
                <HistoryList entries=entries patient=patient/>
            </div>
        }
        .into_any()
    })
    .into_any()
}

#[component]
fn HistoryList(entries: TableHandle<HistoryEntry>, patient: RecordId) -> impl IntoView {
    let doctors = use_table::<Doctor>();

    query_view(entries, "No history recorded.", move |rows| {
        let rows: Vec<HistoryEntry> = rows
            .into_iter()
            .filter(|row| row.patient_id == patient)
            .collect();
        if rows.is_empty() {
            return view! { <p class="empty">"No history recorded."</p> }.into_any();
        }
        view! {
            <ul class="history-list">
                {rows
                    .into_iter()
                    .map(|row| {
                        let by = row
                            .recorded_by
                            .as_ref()
                            .map(|id| name_lookup(doctors, id, |d| d.name.as_str()));
                        view! {
                            <li>
                                <span class="when">{format_timestamp(&row.created_at)}</span>
                                <strong>{row.condition}</strong>
                                {row.notes.map(|notes| view! { <p>{notes}</p> })}
                                {by.map(|by| view! { <span class="by">{format!("Recorded by {by}")}</span> })}
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        }
        .into_any()
    })
}

/// Form for a doctor to add an entry to a patient's history.
#[component]
fn RecordForm(
    entries: TableHandle<HistoryEntry>,
    patient: RecordId,
    doctor: RecordId,
) -> impl IntoView {
    let (condition, set_condition) = signal(String::new());
    let (notes, set_notes) = signal(String::new());
    let (error, set_error) = signal(Option::<String>::None);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Some(condition) = non_empty(condition.get_untracked()) else {
            set_error.set(Some("Condition is required.".to_string()));
            return;
        };
        let payload = NewHistoryEntry {
            patient_id: patient.clone(),
            condition,
            notes: non_empty(notes.get_untracked()),
            recorded_by: Some(doctor.clone()),
        };

        set_error.set(None);
        spawn_local(async move {
            match entries.create(payload).await {
                Ok(_) => {
                    set_condition.set(String::new());
                    set_notes.set(String::new());
                    entries.refetch();
                }
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    view! {
        <section class="form-section">
            <h2>"Add an entry"</h2>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            <form on:submit=submit class="inline-form">
                <input placeholder="Condition" prop:value=condition
                    on:input=move |ev| set_condition.set(event_target_value(&ev))/>
                <textarea placeholder="Notes" prop:value=notes
                    on:input=move |ev| set_notes.set(event_target_value(&ev))></textarea>
                <button type="submit">"Record"</button>
            </form>
        </section>
    }
}
