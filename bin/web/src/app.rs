//! Main Leptos application component and routing.

use crate::pages::{
    AppointmentsPage, DashboardPage, DoctorsPage, HistoryPage, LoginPage, MedicinesPage,
    PatientHistoryPage, PatientsPage, PaymentsPage, PrescriptionsPage, ProfilePage, SignupPage,
};
use crate::session::{provide_session, use_session};
use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    components::{A, Redirect, Route, Router, Routes},
    hooks::use_location,
    path,
};
use medicare_platform_access::{DEFAULT_LANDING_PATH, GuardDecision, RouteTable, decide};

/// The main application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_session();

    let routes = RouteTable::clinic().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid route table; every page is unavailable");
        RouteTable::new()
    });
    provide_context(routes);

    view! {
        <Title text="Medicare"/>
        <Router>
            <Header/>
            <main class="container">
                <Routes fallback=|| view! { <NotFound/> }>
                    <Route path=path!("/") view=|| view! { <Redirect path=DEFAULT_LANDING_PATH/> }/>
                    <Route path=path!("/login") view=|| view! { <Guarded><LoginPage/></Guarded> }/>
                    <Route path=path!("/signup") view=|| view! { <Guarded><SignupPage/></Guarded> }/>
                    <Route path=path!("/dashboard") view=|| view! { <Guarded><DashboardPage/></Guarded> }/>
                    <Route path=path!("/profile") view=|| view! { <Guarded><ProfilePage/></Guarded> }/>
                    <Route path=path!("/appointments") view=|| view! { <Guarded><AppointmentsPage/></Guarded> }/>
                    <Route path=path!("/prescriptions") view=|| view! { <Guarded><PrescriptionsPage/></Guarded> }/>
                    <Route path=path!("/payments") view=|| view! { <Guarded><PaymentsPage/></Guarded> }/>
                    <Route path=path!("/doctors") view=|| view! { <Guarded><DoctorsPage/></Guarded> }/>
                    <Route path=path!("/medicines") view=|| view! { <Guarded><MedicinesPage/></Guarded> }/>
                    <Route path=path!("/patients") view=|| view! { <Guarded><PatientsPage/></Guarded> }/>
                    <Route path=path!("/patients/:id/history") view=|| view! { <Guarded><PatientHistoryPage/></Guarded> }/>
                    <Route path=path!("/history") view=|| view! { <Guarded><HistoryPage/></Guarded> }/>
                </Routes>
            </main>
        </Router>
    }
}

/// Renders its children only when the current session may see this path.
///
/// Access comes from the route table entry matching the current location.
/// Until the session has been rehydrated a placeholder is shown instead, so
/// a stored session never flashes a redirect to the login page.
#[component]
fn Guarded(children: ChildrenFn) -> impl IntoView {
    let session = use_session();
    let routes = expect_context::<RouteTable>();
    let location = use_location();

    let decision = Memo::new(move |_| {
        let path = location.pathname.get();
        let state = session.state();
        routes.access_for(&path).map(|access| decide(access, &state))
    });

    move || match decision.get() {
        None => view! { <NotFound/> }.into_any(),
        Some(GuardDecision::Placeholder) => {
            view! { <div class="placeholder" aria-busy="true"></div> }.into_any()
        }
        Some(GuardDecision::Render) => children().into_any(),
        Some(GuardDecision::Redirect(destination)) => {
            tracing::debug!(destination, "Guard redirect");
            view! { <Redirect path=destination/> }.into_any()
        }
    }
}

/// Navigation label for a route, `None` for routes not linked from the menu.
fn nav_label(pattern: &str) -> Option<&'static str> {
    match pattern {
        "/login" => Some("Log in"),
        "/signup" => Some("Sign up"),
        "/dashboard" => Some("Dashboard"),
        "/appointments" => Some("Appointments"),
        "/prescriptions" => Some("Prescriptions"),
        "/payments" => Some("Payments"),
        "/doctors" => Some("Doctors"),
        "/medicines" => Some("Medicines"),
        "/patients" => Some("Patients"),
        "/history" => Some("My History"),
        "/profile" => Some("Profile"),
        _ => None,
    }
}

/// Header with role-specific navigation and the user menu.
#[component]
fn Header() -> impl IntoView {
    let session = use_session();
    let routes = expect_context::<RouteTable>();

    let links = move || {
        if session.state().is_loading() {
            return Vec::new();
        }
        routes
            .visible_to(session.role())
            .filter_map(|route| {
                nav_label(route.pattern()).map(|label| (route.pattern().to_string(), label))
            })
            .collect::<Vec<_>>()
    };

    view! {
        <header class="header">
            <div class="header-left">
                <a href="/" class="logo">"Medicare"</a>
                <nav class="nav">
                    {move || {
                        links()
                            .into_iter()
                            .map(|(href, label)| view! { <A href=href>{label}</A> })
                            .collect_view()
                    }}
                </nav>
            </div>
            <div class="header-right">
                {move || {
                    session.identity().map(|identity| {
                        let role = session.role();
                        view! {
                            <div class="user-menu">
                                <span class="user-name">{identity.name().to_string()}</span>
                                <span class="user-role">{role.label()}</span>
                                <button class="logout-button" on:click=move |_| session.logout()>
                                    "Log out"
                                </button>
                            </div>
                        }
                    })
                }}
            </div>
        </header>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="not-found">
            <h1>"Page not found"</h1>
            <a href=DEFAULT_LANDING_PATH>"Return to the dashboard"</a>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_static_route_has_a_menu_label() {
        let routes = RouteTable::clinic().expect("valid table");
        for route in routes.routes() {
            let labelled = nav_label(route.pattern()).is_some();
            assert_eq!(labelled, !route.pattern().contains(':'), "{}", route.pattern());
        }
    }
}
