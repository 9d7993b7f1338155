pub mod controller;
pub mod scanner;
pub mod store;
pub mod tree;
