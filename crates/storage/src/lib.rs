#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod auth;
pub mod document;
pub mod documents;
#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
pub mod log;
pub mod memory;
pub mod records;
pub mod rest;
pub mod ticker;

#[cfg(test)]
mod tests {
    pub mod data;
    mod workflow;
}
