//! Lattice Cart
//!
//! Lattice Cart is a headless client-side controller for storefront cart widgets. It keeps an
//! observable view of the visitor's cart in step with the server while quantities are edited,
//! lines removed and products added.

pub mod api;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod errors;
pub mod ids;
pub mod money;
pub mod notify;
pub mod prelude;
pub mod quantity;
pub mod view;
