pub mod candle;
pub mod errors;
pub mod feature_row;
pub mod ports;
