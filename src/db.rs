pub mod user_repo;
pub use user_repo::UserRepository;
pub mod service_pack_repo;
pub use service_pack_repo::ServicePackRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod contact_repo;
pub use contact_repo::ContactRepository;
pub mod crm_repo;
pub use crm_repo::LeadRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod password_reset_repo;
pub use password_reset_repo::PasswordResetRepository;
