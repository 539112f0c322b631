pub mod errors;
pub mod order;
pub mod order_email;
pub mod ports;
