pub mod cart;
pub mod message;
pub mod product;
pub mod scan;
