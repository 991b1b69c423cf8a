//! Wire protocol between the store controller and a presentation surface.

mod message;
mod normalize;

pub use message::{Inbound, Outbound};
pub use normalize::{coerce_opt, coerce_or, normalize_notes, to_display_string};
