//! Products domain module (catalog).
//!
//! This crate contains business rules for products and categories, implemented purely
//! as deterministic domain logic (no IO, no storage).

pub mod category;
pub mod product;

pub use category::Category;
pub use product::{NewProduct, Product, ProductDetails};
