pub mod account_picker;
pub mod customer_search;
pub mod orderbook;
pub mod template;
pub mod toast;
