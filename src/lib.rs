pub mod adapters;
pub mod api;
pub mod common;
pub mod entities;
pub mod models;
pub mod repositories;
pub mod settings;
pub mod usecases;

#[cfg(test)]
mod testing;
