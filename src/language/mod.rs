pub mod catalog;
pub mod errors;
pub mod parser;
pub mod span;
pub mod typecheck;
pub mod types;
