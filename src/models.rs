pub mod auth;
pub mod catalog;
pub mod contact;
pub mod crm;
pub mod dashboard;
pub mod order;
