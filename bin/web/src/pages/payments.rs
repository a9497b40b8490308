//! Payments page.

use crate::components::{ErrorPanel, format_timestamp, name_lookup, non_empty, query_view};
use crate::hooks::{PATIENT_NAMES, TableHandle, use_table, use_table_projected};
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medicare_backend::records::{NewPayment, Patient, Payment, PaymentStatus, PaymentStatusPatch};
use medicare_core::RecordId;
use medicare_platform_access::Role;
use std::str::FromStr;

/// Parses an amount typed into the form; must be positive.
fn parse_amount(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

#[component]
pub fn PaymentsPage() -> impl IntoView {
    let session = use_session();
    let Some(identity) = session.identity() else {
        return ().into_any();
    };
    let role = session.role();
    let me = identity.id().clone();
    let admin = role == Role::Admin;

    let payments = use_table::<Payment>();
    let patients = admin.then(|| use_table_projected::<Patient>(PATIENT_NAMES));
    let (error, set_error) = signal(Option::<String>::None);

    let set_status = move |id: RecordId, status: PaymentStatus| {
        spawn_local(async move {
            match payments.update(id, PaymentStatusPatch { status }).await {
                Ok(_) => payments.refetch(),
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    let list = query_view(payments, "No payments recorded.", move |rows| {
        let rows: Vec<Payment> = rows
            .into_iter()
            .filter(|row| admin || row.patient_id == me)
            .collect();
        let outstanding: f64 = rows
            .iter()
            .filter(|row| row.status == PaymentStatus::Pending)
            .map(|row| row.amount)
            .sum();
        view! {
            <p class="summary">{format!("Outstanding: ${outstanding:.2}")}</p>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Date"</th>
                        {admin.then(|| view! { <th>"Patient"</th> })}
                        <th>"Amount"</th>
                        <th>"Method"</th>
                        <th>"Status"</th>
                        {admin.then(|| view! { <th>"Actions"</th> })}
                    </tr>
                </thead>
                <tbody>
                    {rows
                        .into_iter()
                        .map(|row| {
                            let patient = patients
                                .map(|handle| name_lookup(handle, &row.patient_id, |p| p.name.as_str()));
                            let pending = row.status == PaymentStatus::Pending;
                            let paid = row.status == PaymentStatus::Paid;
                            let (pay_id, refund_id) = (row.id.clone(), row.id.clone());
                            view! {
                                <tr>
                                    <td>{format_timestamp(&row.created_at)}</td>
                                    {patient.map(|name| view! { <td>{name}</td> })}
                                    <td>{format!("${:.2}", row.amount)}</td>
                                    <td>{row.method.unwrap_or_default()}</td>
                                    <td class=format!("status {}", row.status)>{row.status.to_string()}</td>
                                    {admin.then(|| view! {
                                        <td class="row-actions">
                                            {pending.then(|| view! {
                                                <button on:click=move |_| set_status(pay_id.clone(), PaymentStatus::Paid)>
                                                    "Mark paid"
                                                </button>
                                            })}
                                            {paid.then(|| view! {
                                                <button on:click=move |_| set_status(refund_id.clone(), PaymentStatus::Refunded)>
                                                    "Refund"
                                                </button>
                                            })}
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
        <div class="payments-page">
            <h1>"Payments"</h1>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            {patients.map(|patients| view! { <ChargeForm payments=payments patients=patients/> })}
            <section class="list-section">{list}</section>
        </div>
    }
    .into_any()
}

/// Form for the front desk to record a charge.
#[component]
fn ChargeForm(payments: TableHandle<Payment>, patients: TableHandle<Patient>) -> impl IntoView {
    let (patient_id, set_patient_id) = signal(String::new());
    let (amount, set_amount) = signal(String::new());
    let (method, set_method) = signal(String::new());
    let (error, set_error) = signal(Option::<String>::None);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Ok(patient_id) = RecordId::from_str(&patient_id.get_untracked()) else {
            set_error.set(Some("Choose a patient.".to_string()));
            return;
        };
        let Some(amount) = parse_amount(&amount.get_untracked()) else {
            set_error.set(Some("Enter a positive amount.".to_string()));
            return;
        };
        let payload = NewPayment {
            patient_id,
            appointment_id: None,
            amount,
            method: non_empty(method.get_untracked()),
            status: PaymentStatus::Pending,
        };

        set_error.set(None);
        spawn_local(async move {
            match payments.create(payload).await {
                Ok(_) => {
                    set_amount.set(String::new());
                    payments.refetch();
                }
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    view! {
        <section class="form-section">
            <h2>"Record a charge"</h2>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            <form on:submit=submit class="inline-form">
                <select on:change=move |ev| set_patient_id.set(event_target_value(&ev))>
                    <option value="">"Patient..."</option>
                    {move || patients.state().data().cloned().unwrap_or_default()
                        .into_iter()
                        .map(|p| view! { <option value=p.id.to_string()>{p.name}</option> })
                        .collect_view()}
                </select>
                <input placeholder="Amount" inputmode="decimal" prop:value=amount
                    on:input=move |ev| set_amount.set(event_target_value(&ev))/>
                <select on:change=move |ev| set_method.set(event_target_value(&ev))>
                    <option value="">"Method..."</option>
                    <option value="cash">"Cash"</option>
                    <option value="card">"Card"</option>
                    <option value="insurance">"Insurance"</option>
                </select>
                <button type="submit">"Charge"</button>
            </form>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_positive_numbers() {
        assert_eq!(parse_amount(" 45.50 "), Some(45.5));
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("-3"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("ten"), None);
    }
}
