// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "AtlasTech Solutions API", description = "Storefront, customer portal and back office with CRM"),
    paths(
        // --- Public ---
        handlers::public::list_service_packs,
        handlers::public::place_order,
        handlers::public::submit_contact,

        // --- Admin Auth ---
        handlers::auth::admin_login,
        handlers::auth::admin_me,
        handlers::auth::admin_logout,

        // --- Customer Auth ---
        handlers::auth::register,
        handlers::auth::customer_login,
        handlers::auth::customer_me,
        handlers::auth::customer_logout,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,

        // --- Customer ---
        handlers::customer::list_orders,
        handlers::customer::get_profile,
        handlers::customer::update_profile,
        handlers::customer::change_password,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,

        // --- Orders ---
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::orders::delete_order,

        // --- Service Packs ---
        handlers::service_packs::list_packs,
        handlers::service_packs::get_pack,
        handlers::service_packs::create_pack,
        handlers::service_packs::update_pack,
        handlers::service_packs::delete_pack,

        // --- CRM ---
        handlers::crm::list_leads,
        handlers::crm::create_lead,
        handlers::crm::get_lead,
        handlers::crm::update_lead,
        handlers::crm::delete_lead,
        handlers::crm::get_pipeline,
        handlers::crm::get_stats,
        handlers::crm::add_note,
        handlers::crm::delete_note,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::RegisterCustomerPayload,
            models::auth::AuthResponse,
            models::auth::CustomerProfile,
            models::auth::UpdateProfilePayload,
            models::auth::ChangePasswordPayload,
            models::auth::ForgotPasswordPayload,
            models::auth::ResetPasswordPayload,

            // --- Catalog ---
            models::catalog::ServicePackView,
            models::catalog::CreateServicePackPayload,
            models::catalog::UpdateServicePackPayload,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::Order,
            models::order::OrderView,
            models::order::PlaceOrderPayload,
            models::order::UpdateOrderStatusPayload,

            // --- Contact ---
            models::contact::ContactMessage,
            models::contact::ContactPayload,

            // --- CRM ---
            models::crm::LeadStatus,
            models::crm::LeadSource,
            models::crm::Lead,
            models::crm::LeadSummary,
            models::crm::LeadDetail,
            models::crm::Note,
            models::crm::Pipeline,
            models::crm::LeadStats,
            models::crm::CreateLeadPayload,
            models::crm::UpdateLeadPayload,
            models::crm::CreateNotePayload,

            // --- Dashboard ---
            models::dashboard::DashboardStatistics,
            models::dashboard::CrmSummary,
            models::dashboard::MonthlyOrders,
            models::dashboard::Dashboard,
        )
    ),
    tags(
        (name = "Public", description = "Storefront: packs, orders and contact form"),
        (name = "Admin Auth", description = "Back-office session"),
        (name = "Customer Auth", description = "Customer registration and session"),
        (name = "Customer", description = "Customer self-service"),
        (name = "Dashboard", description = "Back-office counters"),
        (name = "Admin Orders", description = "Order management"),
        (name = "Admin Service Packs", description = "Catalog management"),
        (name = "CRM", description = "Leads, pipeline and notes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
