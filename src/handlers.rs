pub mod auth;
pub mod crm;
pub mod customer;
pub mod dashboard;
pub mod orders;
pub mod public;
pub mod service_packs;
