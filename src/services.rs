pub mod auth;
pub mod catalog_service;
pub mod crm_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod email_domain;
pub mod notification_service;
pub mod order_service;
pub mod password_reset_service;
