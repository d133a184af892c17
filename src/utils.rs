#![forbid(unsafe_code)]

pub mod config;
pub mod db;
pub mod db_init;
#[cfg(test)]
pub mod db_mem;
pub mod db_statements;
pub mod db_types;
pub mod errors;
pub mod sapatos_utils;
