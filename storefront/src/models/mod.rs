// storefront/src/models/mod.rs

//! Domain documents and the role order.

pub mod booking;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod role;
pub mod selection;
pub mod user;

pub use booking::{BookingStatus, ServiceBooking};
pub use cart::{Cart, CartItem, CartLine, CartView};
pub use catalog::{CatalogItem, CatalogKind};
pub use order::{Order, OrderItem, OrderStatus};
pub use role::Role;
pub use selection::{SelectedItem, SelectedItems};
pub use user::User;
