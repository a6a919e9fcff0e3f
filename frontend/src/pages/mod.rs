pub mod buy_sell;
pub mod cash_transfers;
pub mod customers;
pub mod employees;
pub mod end_of_day;
pub mod home;
pub mod login;
pub mod order_history;
pub mod reports;
pub mod stock_transfers;
