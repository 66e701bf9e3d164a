pub mod language;
pub mod lint;
pub mod project;
pub mod target;
pub mod tools;

#[cfg(test)]
mod tests;
