pub mod plantuml;
pub mod schema;
