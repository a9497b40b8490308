//! Role-specific landing page.

use crate::components::row_count;
use crate::hooks::use_table;
use crate::session::use_session;
use leptos::prelude::*;
use medicare_backend::records::{
    Appointment, AppointmentStatus, Doctor, Medicine, Patient, Payment, PaymentStatus,
    Prescription,
};
use medicare_core::RecordId;
use medicare_platform_access::Role;

/// Medicines at or below this stock level are flagged.
const LOW_STOCK: i64 = 20;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = use_session();

    move || {
        let Some(identity) = session.identity() else {
            return ().into_any();
        };
        let greeting = format!("Welcome, {}", identity.name());
        let me = identity.id().clone();
        let body = match session.role() {
            Role::Patient => view! { <PatientSummary me=me/> }.into_any(),
            Role::Doctor => view! { <DoctorSummary me=me/> }.into_any(),
            Role::Admin => view! { <AdminSummary/> }.into_any(),
            Role::Guest => ().into_any(),
        };
        view! {
            <div class="dashboard">
                <h1>{greeting}</h1>
                <div class="stat-grid">{body}</div>
            </div>
        }
        .into_any()
    }
}

/// A count with a link to the page listing the rows.
#[component]
fn StatCard(
    title: &'static str,
    href: &'static str,
    #[prop(into)] value: Signal<Option<usize>>,
) -> impl IntoView {
    view! {
        <a class="stat-card" href=href>
            <span class="stat-title">{title}</span>
            <span class="stat-value">
                {move || value.get().map_or_else(|| "…".to_string(), |n| n.to_string())}
            </span>
        </a>
    }
}

#[component]
fn PatientSummary(me: RecordId) -> impl IntoView {
    let appointments = use_table::<Appointment>();
    let prescriptions = use_table::<Prescription>();
    let payments = use_table::<Payment>();

    let (a, p, b) = (me.clone(), me.clone(), me);
    let upcoming = Signal::derive(move || {
        row_count(appointments, |row| {
            row.patient_id == a && row.status == AppointmentStatus::Scheduled
        })
    });
    let active = Signal::derive(move || row_count(prescriptions, |row| row.patient_id == p));
    let due = Signal::derive(move || {
        row_count(payments, |row| {
            row.patient_id == b && row.status == PaymentStatus::Pending
        })
    });

    view! {
        <StatCard title="Upcoming appointments" href="/appointments" value=upcoming/>
        <StatCard title="Prescriptions" href="/prescriptions" value=active/>
        <StatCard title="Payments due" href="/payments" value=due/>
    }
}

#[component]
fn DoctorSummary(me: RecordId) -> impl IntoView {
    let appointments = use_table::<Appointment>();
    let prescriptions = use_table::<Prescription>();
    let patients = use_table::<Patient>();

    let (a, p) = (me.clone(), me);
    let scheduled = Signal::derive(move || {
        row_count(appointments, |row| {
            row.doctor_id == a && row.status == AppointmentStatus::Scheduled
        })
    });
    let written = Signal::derive(move || row_count(prescriptions, |row| row.doctor_id == p));
    let registered = Signal::derive(move || row_count(patients, |_| true));

    view! {
        <StatCard title="Scheduled visits" href="/appointments" value=scheduled/>
        <StatCard title="Prescriptions written" href="/prescriptions" value=written/>
        <StatCard title="Patients" href="/patients" value=registered/>
    }
}

#[component]
fn AdminSummary() -> impl IntoView {
    let patients = use_table::<Patient>();
    let doctors = use_table::<Doctor>();
    let medicines = use_table::<Medicine>();
    let payments = use_table::<Payment>();

    let registered = Signal::derive(move || row_count(patients, |_| true));
    let on_staff = Signal::derive(move || row_count(doctors, |_| true));
    let low_stock = Signal::derive(move || row_count(medicines, |row| row.stock <= LOW_STOCK));
    let pending =
        Signal::derive(move || row_count(payments, |row| row.status == PaymentStatus::Pending));

    view! {
        <StatCard title="Patients" href="/patients" value=registered/>
        <StatCard title="Doctors" href="/doctors" value=on_staff/>
        <StatCard title="Medicines low on stock" href="/medicines" value=low_stock/>
        <StatCard title="Pending payments" href="/payments" value=pending/>
    }
}
