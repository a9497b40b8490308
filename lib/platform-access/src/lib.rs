//! Session and access control for the medicare front-end.
//!
//! This crate provides:
//! - Roles and route allow-lists (`Role`, `AllowedRoles`)
//! - The session record and its expiry policy (`Session`, `SessionPolicy`)
//! - Durable client-side storage (`DurableStorage`, `MemoryStorage`)
//! - The session store with rehydration (`SessionStore`, `SessionState`)
//! - Route guards and the route table (`decide`, `RouteTable`)
//! - Demo authentication (`DemoDirectory`)
//!
//! # Example
//!
//! ```
//! use medicare_platform_access::{
//!     DemoDirectory, GuardDecision, MemoryStorage, Role, RouteTable, SessionPolicy,
//!     SessionStore, decide,
//! };
//!
//! let routes = RouteTable::clinic().expect("valid route table");
//! let mut store = SessionStore::new(MemoryStorage::new(), SessionPolicy::default());
//! store.rehydrate();
//!
//! let medicines = routes.access_for("/medicines").expect("declared");
//! assert_eq!(decide(medicines, store.state()), GuardDecision::Redirect("/login"));
//!
//! let login = DemoDirectory::new()
//!     .authenticate("doctor@demo.com", "demo123", Role::Doctor)
//!     .expect("demo credentials");
//! store.login(login.identity, login.role, Some(login.token));
//! assert_eq!(decide(medicines, store.state()), GuardDecision::Render);
//! ```

pub mod demo;
pub mod error;
pub mod guard;
pub mod identity;
pub mod role;
pub mod route;
pub mod session;
pub mod storage;
pub mod store;

// Re-export main types at crate root
pub use demo::{DEMO_PASSWORD, DemoAccount, DemoDirectory, DemoLogin};
pub use error::{AuthenticationError, RouteError, StorageError};
pub use guard::{Access, DEFAULT_LANDING_PATH, GuardDecision, LOGIN_PATH, decide};
pub use identity::{Identity, IdentityPatch};
pub use role::{AllowedRoles, ParseRoleError, Role};
pub use route::{RouteDescriptor, RouteTable};
pub use session::{Session, SessionPolicy};
pub use storage::{AUTH_KEY, DurableStorage, LEGACY_KEYS, MemoryStorage, REMEMBER_KEY};
pub use store::{SessionState, SessionStore};
