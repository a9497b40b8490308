//! Appointments page: booking, listing, and status changes.

use crate::components::{
    ErrorPanel, format_timestamp, name_lookup, non_empty, parse_datetime_local, query_view,
};
use crate::hooks::{PATIENT_NAMES, TableHandle, use_table, use_table_projected};
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medicare_backend::records::{
    Appointment, AppointmentStatus, AppointmentStatusPatch, Doctor, NewAppointment, Patient,
};
use medicare_core::RecordId;
use medicare_platform_access::Role;
use std::str::FromStr;

/// Appointments visible to a role: patients and doctors see their own.
fn visible(role: Role, me: &RecordId, appointment: &Appointment) -> bool {
    match role {
        Role::Patient => &appointment.patient_id == me,
        Role::Doctor => &appointment.doctor_id == me,
        Role::Admin => true,
        Role::Guest => false,
    }
}

#[component]
pub fn AppointmentsPage() -> impl IntoView {
    let session = use_session();
    let Some(identity) = session.identity() else {
        return ().into_any();
    };
    let role = session.role();
    let me = identity.id().clone();

    let appointments = use_table::<Appointment>();
    let doctors = use_table::<Doctor>();
    let patients = (role != Role::Patient).then(|| use_table_projected::<Patient>(PATIENT_NAMES));
    let (error, set_error) = signal(Option::<String>::None);

    let set_status = move |id: RecordId, status: AppointmentStatus| {
        spawn_local(async move {
            match appointments.update(id, AppointmentStatusPatch { status }).await {
                Ok(_) => appointments.refetch(),
                Err(message) => set_error.set(Some(message)),
            }
        });
    };
    let remove = move |id: RecordId| {
        spawn_local(async move {
            match appointments.delete(id).await {
                Ok(()) => appointments.refetch(),
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    let list = query_view(appointments, "No appointments yet.", move |rows| {
        let me = me.clone();
        view! {
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"When"</th>
                        <th>"Patient"</th>
                        <th>"Doctor"</th>
                        <th>"Reason"</th>
                        <th>"Status"</th>
                        <th>"Actions"</th>
                    </tr>
                </thead>
                <tbody>
                    {rows
                        .into_iter()
                        .filter(|row| visible(role, &me, row))
                        .map(|row| {
                            let patient = match patients {
                                Some(handle) => name_lookup(handle, &row.patient_id, |p| p.name.as_str()),
                                None => "You".to_string(),
                            };
                            let doctor = name_lookup(doctors, &row.doctor_id, |d| d.name.as_str());
                            let scheduled = row.status == AppointmentStatus::Scheduled;
                            let (complete_id, cancel_id, delete_id) =
                                (row.id.clone(), row.id.clone(), row.id.clone());
                            view! {
                                <tr>
                                    <td>{format_timestamp(&row.scheduled_for)}</td>
                                    <td>{patient}</td>
                                    <td>{doctor}</td>
                                    <td>{row.reason.unwrap_or_default()}</td>
                                    <td class=format!("status {}", row.status)>{row.status.to_string()}</td>
                                    <td class="row-actions">
                                        {(scheduled && role != Role::Patient).then(|| view! {
                                            <button on:click=move |_| set_status(complete_id.clone(), AppointmentStatus::Completed)>
                                                "Complete"
                                            </button>
                                        })}
                                        {scheduled.then(|| view! {
                                            <button on:click=move |_| set_status(cancel_id.clone(), AppointmentStatus::Cancelled)>
                                                "Cancel"
                                            </button>
                                        })}
                                        {(role == Role::Admin).then(|| view! {
                                            <button class="danger" on:click=move |_| remove(delete_id.clone())>
                                                "Delete"
                                            </button>
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
        <div class="appointments-page">
            <h1>"Appointments"</h1>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            {(role != Role::Doctor).then(|| view! {
                <BookingForm
                    appointments=appointments
                    doctors=doctors
                    patients=patients
                    patient=(role == Role::Patient).then(|| identity.id().clone())
                />
            })}
            <section class="list-section">{list}</section>
        </div>
    }
    .into_any()
}

/// Booking form. Patients book for themselves; admins pick the patient.
#[component]
fn BookingForm(
    appointments: TableHandle<Appointment>,
    doctors: TableHandle<Doctor>,
    patients: Option<TableHandle<Patient>>,
    patient: Option<RecordId>,
) -> impl IntoView {
    let (patient_id, set_patient_id) = signal(String::new());
    let (doctor_id, set_doctor_id) = signal(String::new());
    let (when, set_when) = signal(String::new());
    let (reason, set_reason) = signal(String::new());
    let (error, set_error) = signal(Option::<String>::None);
    let fixed_patient = patient.clone();

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let patient_id = match fixed_patient.clone() {
            Some(id) => Ok(id),
            None => {
                RecordId::from_str(&patient_id.get_untracked()).map_err(|_| "Choose a patient.")
            }
        };
        let doctor_id =
            RecordId::from_str(&doctor_id.get_untracked()).map_err(|_| "Choose a doctor.");
        let scheduled_for =
            parse_datetime_local(&when.get_untracked()).ok_or("Choose a date and time.");

        let payload = match (patient_id, doctor_id, scheduled_for) {
            (Ok(patient_id), Ok(doctor_id), Ok(scheduled_for)) => NewAppointment {
                patient_id,
                doctor_id,
                scheduled_for,
                reason: non_empty(reason.get_untracked()),
                status: AppointmentStatus::Scheduled,
            },
            (Err(message), _, _) | (_, Err(message), _) | (_, _, Err(message)) => {
                set_error.set(Some(message.to_string()));
                return;
            }
        };

        set_error.set(None);
        spawn_local(async move {
            match appointments.create(payload).await {
                Ok(_) => {
                    set_reason.set(String::new());
                    set_when.set(String::new());
                    appointments.refetch();
                }
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    view! {
        <section class="form-section">
            <h2>"Book an appointment"</h2>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            <form on:submit=submit class="inline-form">
                {patient.is_none().then(|| view! {
                    <select on:change=move |ev| set_patient_id.set(event_target_value(&ev))>
                        <option value="">"Patient..."</option>
                        {move || patients
                            .and_then(|handle| handle.state().data().cloned())
                            .unwrap_or_default()
                            .into_iter()
                            .map(|p| view! { <option value=p.id.to_string()>{p.name}</option> })
                            .collect_view()}
                    </select>
                })}
                <select on:change=move |ev| set_doctor_id.set(event_target_value(&ev))>
                    <option value="">"Doctor..."</option>
                    {move || doctors
                        .state()
                        .data()
                        .cloned()
                        .unwrap_or_default()
                        .into_iter()
                        .map(|d| view! { <option value=d.id.to_string()>{format!("{} ({})", d.name, d.specialty)}</option> })
                        .collect_view()}
                </select>
                <input type="datetime-local" prop:value=when
                    on:input=move |ev| set_when.set(event_target_value(&ev))/>
                <input placeholder="Reason" prop:value=reason
                    on:input=move |ev| set_reason.set(event_target_value(&ev))/>
                <button type="submit">"Book"</button>
            </form>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn appointment(patient: &str, doctor: &str) -> Appointment {
        Appointment {
            id: RecordId::new("a1"),
            patient_id: RecordId::new(patient),
            doctor_id: RecordId::new(doctor),
            scheduled_for: Utc::now(),
            reason: None,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn patients_and_doctors_see_their_own() {
        let row = appointment("p1", "d1");
        assert!(visible(Role::Patient, &RecordId::new("p1"), &row));
        assert!(!visible(Role::Patient, &RecordId::new("p2"), &row));
        assert!(visible(Role::Doctor, &RecordId::new("d1"), &row));
        assert!(!visible(Role::Doctor, &RecordId::new("p1"), &row));
        assert!(visible(Role::Admin, &RecordId::new("anyone"), &row));
        assert!(!visible(Role::Guest, &RecordId::new("p1"), &row));
    }
}
