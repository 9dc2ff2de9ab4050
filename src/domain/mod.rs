pub mod crisis;
pub mod prompt;
pub mod statement;
