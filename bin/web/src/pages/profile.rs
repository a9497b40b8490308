//! Profile editing for the signed-in user.

use crate::components::{ErrorPanel, non_empty};
use crate::data::ServerFnSource;
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medicare_backend::records::{Doctor, Patient};
use medicare_backend::{DataSource, Record, TableQuery};
use medicare_core::RecordId;
use medicare_platform_access::{IdentityPatch, Role};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Builds the stored-row patch mirroring an identity change.
///
/// Only columns the role's table has are included, and only when changed.
fn row_patch(role: Role, patch: &IdentityPatch) -> Option<Value> {
    let mut fields = Map::new();
    let mut put = |column: &str, value: &Option<String>| {
        if let Some(value) = value {
            fields.insert(column.to_string(), Value::String(value.clone()));
        }
    };
    match role {
        Role::Patient => {
            put("name", &patch.name);
            put("phone", &patch.phone);
        }
        Role::Doctor => {
            put("name", &patch.name);
            put("phone", &patch.phone);
            put("specialty", &patch.specialty);
            put("department", &patch.department);
        }
        Role::Admin | Role::Guest => return None,
    }
    (!fields.is_empty()).then_some(Value::Object(fields))
}

/// Writes the patch to the user's own row. Only writes, so no table read.
async fn save_row<T: Record>(
    source: Arc<dyn DataSource>,
    id: &RecordId,
    fields: &Value,
) -> Result<(), String> {
    TableQuery::<T>::new(source)
        .update(id, fields)
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Keeps only the fields that differ from the current value.
fn changed(input: String, current: Option<&str>) -> Option<String> {
    non_empty(input).filter(|value| Some(value.as_str()) != current)
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = use_session();
    let Some(identity) = session.identity() else {
        return ().into_any();
    };
    let role = session.role();

    let (name, set_name) = signal(identity.name().to_string());
    let (phone, set_phone) = signal(identity.phone().unwrap_or_default().to_string());
    let (specialty, set_specialty) =
        signal(identity.specialty().unwrap_or_default().to_string());
    let (department, set_department) =
        signal(identity.department().unwrap_or_default().to_string());
    let (notice, set_notice) = signal(Option::<&'static str>::None);
    let (error, set_error) = signal(Option::<String>::None);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Some(current) = session.identity() else {
            return;
        };
        let mut patch = IdentityPatch {
            name: changed(name.get_untracked(), Some(current.name())),
            phone: changed(phone.get_untracked(), current.phone()),
            ..IdentityPatch::default()
        };
        if role == Role::Doctor {
            patch.specialty = changed(specialty.get_untracked(), current.specialty());
            patch.department = changed(department.get_untracked(), current.department());
        }
        if patch.is_empty() {
            set_notice.set(Some("Nothing to save."));
            return;
        }

        set_error.set(None);
        set_notice.set(None);
        let id = current.id().clone();
        let stored = row_patch(role, &patch);
        spawn_local(async move {
            let saved = match (role, stored) {
                (Role::Patient, Some(fields)) => {
                    save_row::<Patient>(Arc::new(ServerFnSource), &id, &fields).await
                }
                (Role::Doctor, Some(fields)) => {
                    save_row::<Doctor>(Arc::new(ServerFnSource), &id, &fields).await
                }
                _ => Ok(()),
            };
            match saved {
                Ok(()) => {
                    session.update_user(patch);
                    set_notice.set(Some("Profile saved."));
                }
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    view! {
        <div class="profile-page">
            <h1>"Profile"</h1>
            <p class="muted">{format!("{} · {}", identity.email(), role)}</p>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            {move || notice.get().map(|text| view! { <p class="notice">{text}</p> })}
            <form on:submit=submit class="stacked-form">
                <label>"Name"
                    <input prop:value=name
                        on:input=move |ev| set_name.set(event_target_value(&ev))/>
                </label>
                <label>"Phone"
                    <input prop:value=phone
                        on:input=move |ev| set_phone.set(event_target_value(&ev))/>
                </label>
                {(role == Role::Doctor).then(|| view! {
                    <label>"Specialty"
                        <input prop:value=specialty
                            on:input=move |ev| set_specialty.set(event_target_value(&ev))/>
                    </label>
                    <label>"Department"
                        <input prop:value=department
                            on:input=move |ev| set_department.set(event_target_value(&ev))/>
                    </label>
                })}
                <button type="submit">"Save"</button>
            </form>
        </div>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;
    use medicare_backend::{MemorySource, Order, Projection};
    use serde_json::json;

    #[tokio::test]
    async fn saving_updates_only_the_users_row() {
        let source = MemorySource::with_demo_data().expect("seed");
        let patch = IdentityPatch {
            phone: Some("555-0199".to_string()),
            ..IdentityPatch::default()
        };
        let fields = row_patch(Role::Patient, &patch).expect("fields");

        save_row::<Patient>(Arc::new(source.clone()), &RecordId::new("demo-patient"), &fields)
            .await
            .expect("saved");

        let rows = source
            .select(
                Patient::TABLE,
                &Projection::parse("id,phone").expect("valid"),
                Order::newest_first(),
            )
            .await
            .expect("select");
        let phone = |id: &str| {
            rows.iter()
                .find(|row| row["id"] == id)
                .map(|row| row["phone"].clone())
        };
        assert_eq!(phone("demo-patient"), Some(json!("555-0199")));
        assert_eq!(phone("p-okafor"), Some(json!("555-0142")));
    }

    #[tokio::test]
    async fn saving_a_missing_row_reports_an_error() {
        let fields = json!({ "name": "Ghost" });
        let err = save_row::<Doctor>(Arc::new(MemorySource::new()), &RecordId::new("d-0"), &fields)
            .await
            .expect_err("missing row");
        assert!(err.contains("d-0"), "{err}");
    }

    #[test]
    fn patient_rows_only_take_name_and_phone() {
        let patch = IdentityPatch {
            name: Some("Ana Ruiz".to_string()),
            specialty: Some("Cardiology".to_string()),
            ..IdentityPatch::default()
        };
        assert_eq!(row_patch(Role::Patient, &patch), Some(json!({ "name": "Ana Ruiz" })));
        assert_eq!(
            row_patch(Role::Doctor, &patch),
            Some(json!({ "name": "Ana Ruiz", "specialty": "Cardiology" }))
        );
    }

    #[test]
    fn admins_have_no_stored_row() {
        let patch = IdentityPatch {
            name: Some("Front Desk".to_string()),
            ..IdentityPatch::default()
        };
        assert_eq!(row_patch(Role::Admin, &patch), None);
        assert_eq!(row_patch(Role::Patient, &IdentityPatch::default()), None);
    }

    #[test]
    fn unchanged_fields_are_dropped() {
        assert_eq!(changed("Ana".to_string(), Some("Ana")), None);
        assert_eq!(changed("  ".to_string(), Some("Ana")), None);
        assert_eq!(changed("Ana R".to_string(), Some("Ana")), Some("Ana R".to_string()));
        assert_eq!(changed("555".to_string(), None), Some("555".to_string()));
    }
}
