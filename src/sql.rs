// SQL module - statement AST for the DDL the engine accepts

pub mod ast;

pub use ast::*;
