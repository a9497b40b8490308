//! Page components for the application.
//!
//! Each page is a Leptos component rendered behind the route guard.

pub mod appointments;
pub mod dashboard;
pub mod doctors;
pub mod history;
pub mod login;
pub mod medicines;
pub mod patients;
pub mod payments;
pub mod prescriptions;
pub mod profile;
pub mod signup;

// Re-export all page components for convenient access
pub use appointments::AppointmentsPage;
pub use dashboard::DashboardPage;
pub use doctors::DoctorsPage;
pub use history::{HistoryPage, PatientHistoryPage};
pub use login::LoginPage;
pub use medicines::MedicinesPage;
pub use patients::PatientsPage;
pub use payments::PaymentsPage;
pub use prescriptions::PrescriptionsPage;
pub use profile::ProfilePage;
pub use signup::SignupPage;
