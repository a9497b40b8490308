//! Prescriptions page.

use crate::components::{ErrorPanel, format_timestamp, name_lookup, non_empty, query_view};
use crate::hooks::{PATIENT_NAMES, TableHandle, use_table, use_table_projected};
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medicare_backend::records::{Doctor, Medicine, NewPrescription, Patient, Prescription};
use medicare_core::RecordId;
use medicare_platform_access::Role;
use std::str::FromStr;

#[component]
pub fn PrescriptionsPage() -> impl IntoView {
    let session = use_session();
    let Some(identity) = session.identity() else {
        return ().into_any();
    };
    let role = session.role();
    let me = identity.id().clone();

    let prescriptions = use_table::<Prescription>();
    let doctors = use_table::<Doctor>();
    let patients = (role != Role::Patient).then(|| use_table_projected::<Patient>(PATIENT_NAMES));
    let (error, set_error) = signal(Option::<String>::None);

    let remove = move |id: RecordId| {
        spawn_local(async move {
            match prescriptions.delete(id).await {
                Ok(()) => prescriptions.refetch(),
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    let mine = me.clone();
    let list = query_view(prescriptions, "No prescriptions yet.", move |rows| {
        view! {
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Written"</th>
                        <th>"Patient"</th>
                        <th>"Doctor"</th>
                        <th>"Medication"</th>
                        <th>"Dosage"</th>
                        <th>"Instructions"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    {rows
                        .into_iter()
                        .filter(|row| match role {
                            Role::Patient => row.patient_id == mine,
                            Role::Doctor => row.doctor_id == mine,
                            Role::Admin => true,
                            Role::Guest => false,
                        })
                        .map(|row| {
                            let patient = patients
                                .map(|handle| name_lookup(handle, &row.patient_id, |p| p.name.as_str()))
                                .unwrap_or_else(|| "You".to_string());
                            let doctor = name_lookup(doctors, &row.doctor_id, |d| d.name.as_str());
                            let id = row.id.clone();
                            view! {
                                <tr>
                                    <td>{format_timestamp(&row.created_at)}</td>
                                    <td>{patient}</td>
                                    <td>{doctor}</td>
                                    <td>{row.medication}</td>
                                    <td>{row.dosage}</td>
                                    <td>{row.instructions.unwrap_or_default()}</td>
                                    <td class="row-actions">
                                        {(role == Role::Admin).then(|| view! {
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
        <div class="prescriptions-page">
            <h1>"Prescriptions"</h1>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            {patients.filter(|_| role == Role::Doctor).map(|patients| view! {
                <PrescribeForm prescriptions=prescriptions patients=patients doctor=me.clone()/>
            })}
            <section class="list-section">{list}</section>
        </div>
    }
    .into_any()
}

/// Form for a doctor to write a prescription.
#[component]
fn PrescribeForm(
    prescriptions: TableHandle<Prescription>,
    patients: TableHandle<Patient>,
    doctor: RecordId,
) -> impl IntoView {
    let medicines = use_table::<Medicine>();
    let (patient_id, set_patient_id) = signal(String::new());
    let (medicine_id, set_medicine_id) = signal(String::new());
    let (medication, set_medication) = signal(String::new());
    let (dosage, set_dosage) = signal(String::new());
    let (instructions, set_instructions) = signal(String::new());
    let (error, set_error) = signal(Option::<String>::None);

    let pick_medicine = move |id: String| {
        let name = medicines.state().data().and_then(|rows| {
            rows.iter()
                .find(|m| m.id.as_str() == id)
                .map(|m| m.name.clone())
        });
        if let Some(name) = name {
            set_medication.set(name);
        }
        set_medicine_id.set(id);
    };

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Ok(patient_id) = RecordId::from_str(&patient_id.get_untracked()) else {
            set_error.set(Some("Choose a patient.".to_string()));
            return;
        };
        let (Some(medication), Some(dosage)) =
            (non_empty(medication.get_untracked()), non_empty(dosage.get_untracked()))
        else {
            set_error.set(Some("Medication and dosage are required.".to_string()));
            return;
        };
        let payload = NewPrescription {
            patient_id,
            doctor_id: doctor.clone(),
            medicine_id: RecordId::from_str(&medicine_id.get_untracked()).ok(),
            medication,
            dosage,
            instructions: non_empty(instructions.get_untracked()),
        };

        set_error.set(None);
        spawn_local(async move {
            match prescriptions.create(payload).await {
                Ok(_) => {
                    set_dosage.set(String::new());
                    set_instructions.set(String::new());
                    prescriptions.refetch();
                }
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    view! {
        <section class="form-section">
            <h2>"Write a prescription"</h2>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            <form on:submit=submit class="inline-form">
                <select on:change=move |ev| set_patient_id.set(event_target_value(&ev))>
                    <option value="">"Patient..."</option>
                    {move || patients.state().data().cloned().unwrap_or_default()
                        .into_iter()
                        .map(|p| view! { <option value=p.id.to_string()>{p.name}</option> })
                        .collect_view()}
                </select>
                <select on:change=move |ev| pick_medicine(event_target_value(&ev))>
                    <option value="">"From stock (optional)..."</option>
                    {move || medicines.state().data().cloned().unwrap_or_default()
                        .into_iter()
                        .map(|m| view! { <option value=m.id.to_string()>{m.name}</option> })
                        .collect_view()}
                </select>
                <input placeholder="Medication" prop:value=medication
                    on:input=move |ev| set_medication.set(event_target_value(&ev))/>
                <input placeholder="Dosage" prop:value=dosage
                    on:input=move |ev| set_dosage.set(event_target_value(&ev))/>
                <input placeholder="Instructions" prop:value=instructions
                    on:input=move |ev| set_instructions.set(event_target_value(&ev))/>
                <button type="submit">"Prescribe"</button>
            </form>
        </section>
    }
}
