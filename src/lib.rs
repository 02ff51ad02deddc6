//! AtlasTech Solutions backend: the public storefront API, the customer
//! portal and the back office with its CRM.

pub mod app;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod seed;
pub mod services;
