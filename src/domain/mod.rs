pub mod cart;
pub mod errors;
pub mod invoice;
pub mod order;
pub mod payment;
pub mod ports;
pub mod product;
