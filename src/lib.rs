pub mod catalog;
pub mod cms;
pub mod error;
pub mod models;
pub mod partner;
pub mod routes;
pub mod services;
pub mod state;
