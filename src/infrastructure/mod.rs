pub mod binance;
pub mod csv_store;
pub mod http;
