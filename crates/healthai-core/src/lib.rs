#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod table;
pub mod training;
pub mod traits;
pub mod types;
pub mod vocabulary;
