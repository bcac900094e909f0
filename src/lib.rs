//! Tether - reactive property-binding engine
//!
//! Keeps two named properties on two different objects synchronized, with
//! optional one-way propagation, transform pipelines, and batched
//! flush-driven delivery.
//!
//! Change flow:
//! ```text
//! property write → observer fires → binding records pending value
//!                       ↓
//!                 flush coordinator (pending set)
//!                       ↓
//!         flush: resolve endpoints → transforms → set-if-changed write
//!                       ↓
//!         write may trigger observers → re-enqueued → loop to empty
//! ```
//!
//! # Example
//!
//! ```
//! use tether::{Binding, BindingRuntime, Object, Value};
//!
//! let runtime = BindingRuntime::new();
//! let account = Object::new();
//! let view = Object::new();
//! runtime.globals().set("account", account.clone());
//! runtime.globals().set("view", view.clone());
//!
//! let binding = Binding::template().from("account.name").to("view.title");
//! binding.connect(&runtime)?;
//!
//! account.set("name", "Ada");
//! runtime.flush();
//! assert_eq!(view.get("title"), Value::from("Ada"));
//! # Ok::<(), tether::TetherError>(())
//! ```

pub mod binding;
pub mod error;
pub mod flush;
pub mod object;
pub mod observer;
pub mod path;
pub mod runtime;
pub mod transforms;
pub mod value;

pub use binding::{Binding, BindingView};
pub use error::TetherError;
pub use flush::FlushCoordinator;
pub use object::{Object, ObserverFn};
pub use observer::ObserverRegistry;
pub use runtime::BindingRuntime;
pub use transforms::TransformFn;
pub use value::{Fault, Value};
