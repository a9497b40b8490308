//! Medicine stock.

use crate::components::{ErrorPanel, non_empty, query_view};
use crate::hooks::{TableHandle, use_table};
use crate::session::use_session;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medicare_backend::records::{Medicine, MedicineStockPatch, NewMedicine};
use medicare_core::RecordId;
use medicare_platform_access::Role;

/// Stock after an adjustment, floored at zero.
fn adjusted_stock(current: i64, delta: i64) -> i64 {
    current.saturating_add(delta).max(0)
}

#[component]
pub fn MedicinesPage() -> impl IntoView {
    let session = use_session();
    let role = session.role();
    let can_edit = matches!(role, Role::Doctor | Role::Admin);
    let admin = role == Role::Admin;

    let medicines = use_table::<Medicine>();
    let (error, set_error) = signal(Option::<String>::None);

    let restock = move |id: RecordId, current: i64, delta: i64| {
        let stock = adjusted_stock(current, delta);
        spawn_local(async move {
            match medicines.update(id, MedicineStockPatch { stock }).await {
                Ok(_) => medicines.refetch(),
                Err(message) => set_error.set(Some(message)),
            }
        });
    };
    let remove = move |id: RecordId| {
        spawn_local(async move {
            match medicines.delete(id).await {
                Ok(()) => medicines.refetch(),
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    let list = query_view(medicines, "No medicines in stock.", move |rows| {
        view! {
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Name"</th>
                        <th>"Manufacturer"</th>
                        <th>"Price"</th>
                        <th>"Stock"</th>
                        {can_edit.then(|| view! { <th>"Actions"</th> })}
                    </tr>
                </thead>
                <tbody>
                    {rows
                        .into_iter()
                        .map(|row| {
                            let stock = row.stock;
                            let (up, down, gone) = (row.id.clone(), row.id.clone(), row.id.clone());
                            view! {
                                <tr>
                                    <td>{row.name}</td>
                                    <td>{row.manufacturer.unwrap_or_default()}</td>
                                    <td>{row.price.map(|p| format!("${p:.2}")).unwrap_or_default()}</td>
                                    <td>{stock}</td>
                                    {can_edit.then(|| view! {
                                        <td class="row-actions">
                                            <button on:click=move |_| restock(up.clone(), stock, 10)>"+10"</button>
                                            <button on:click=move |_| restock(down.clone(), stock, -1)>"-1"</button>
                                            {admin.then(|| view! {
                                                <button class="danger" on:click=move |_| remove(gone.clone())>"Delete"</button>
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
        <div class="medicines-page">
            <h1>"Medicines"</h1>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            {can_edit.then(|| view! { <StockForm medicines=medicines/> })}
            <section class="list-section">{list}</section>
        </div>
    }
}

#[component]
fn StockForm(medicines: TableHandle<Medicine>) -> impl IntoView {
    let (name, set_name) = signal(String::new());
    let (manufacturer, set_manufacturer) = signal(String::new());
    let (price, set_price) = signal(String::new());
    let (stock, set_stock) = signal(String::new());
    let (error, set_error) = signal(Option::<String>::None);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Some(name) = non_empty(name.get_untracked()) else {
            set_error.set(Some("Name is required.".to_string()));
            return;
        };
        let Ok(stock) = stock.get_untracked().trim().parse::<i64>() else {
            set_error.set(Some("Stock must be a whole number.".to_string()));
            return;
        };
        let price = match non_empty(price.get_untracked()) {
            None => None,
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) if value >= 0.0 => Some(value),
                _ => {
                    set_error.set(Some("Price must be a non-negative number.".to_string()));
                    return;
                }
            },
        };
        let payload = NewMedicine {
            name,
            manufacturer: non_empty(manufacturer.get_untracked()),
            price,
            stock: stock.max(0),
        };

        set_error.set(None);
        spawn_local(async move {
            match medicines.create(payload).await {
                Ok(_) => {
                    set_name.set(String::new());
                    set_manufacturer.set(String::new());
                    set_price.set(String::new());
                    set_stock.set(String::new());
                    medicines.refetch();
                }
                Err(message) => set_error.set(Some(message)),
            }
        });
    };

    view! {
        <section class="form-section">
            <h2>"Add a medicine"</h2>
            {move || error.get().map(|message| view! { <ErrorPanel message=message/> })}
            <form on:submit=submit class="inline-form">
                <input placeholder="Name" prop:value=name
                    on:input=move |ev| set_name.set(event_target_value(&ev))/>
                <input placeholder="Manufacturer" prop:value=manufacturer
                    on:input=move |ev| set_manufacturer.set(event_target_value(&ev))/>
                <input placeholder="Price" inputmode="decimal" prop:value=price
                    on:input=move |ev| set_price.set(event_target_value(&ev))/>
                <input placeholder="Stock" inputmode="numeric" prop:value=stock
                    on:input=move |ev| set_stock.set(event_target_value(&ev))/>
                <button type="submit">"Add"</button>
            </form>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_never_goes_negative() {
        assert_eq!(adjusted_stock(5, 10), 15);
        assert_eq!(adjusted_stock(0, -1), 0);
        assert_eq!(adjusted_stock(i64::MAX, 10), i64::MAX);
    }
}
