pub mod common;
pub mod health;
pub mod info;
pub mod prices;
pub mod quote;

pub use health::health;
pub use info::get_info;
pub use prices::{get_all_prices, get_price};
pub use quote::get_quote;
