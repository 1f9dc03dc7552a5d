//! Core domain types for Tavola: restaurant menu, orders, reservations,
//! contact messages, and accounts. No I/O lives here; the server crate owns
//! persistence, transport, and the in-memory registries.

pub mod error;
pub mod model;

pub use error::{TvError, TvResult};
pub use model::contact::ContactMessage;
pub use model::order::{Order, OrderItem, OrderStatus};
pub use model::product::Product;
pub use model::reservation::{Reservation, ReservationStatus};
pub use model::user::{AuthProvider, PublicUser, User, UserRole};
