//! vsync-reconcile
//!
//! Brings the inventory's view of a device's VLANs in line with what was just
//! discovered on the device.
//!
//! - Matching key is the numeric VLAN id.
//! - Same id, different name => update. Missing in inventory => create.
//!   Missing on the device => remove.
//! - Planning ([`plan`]) is pure; [`reconcile`] resolves the device's domain and
//!   applies the plan through an [`vsync_ipam::Inventory`].
//! - A counter moves only when the inventory confirms the write.

mod apply;
mod engine;
mod types;

pub use apply::{domain_description, reconcile, resolve_domain, vlan_description};
pub use engine::plan;
pub use types::*;
