// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ContactRepository, DashboardRepository, LeadRepository, OrderRepository,
        PasswordResetRepository, ServicePackRepository, UserRepository,
    },
    mail::{LogMailer, Mailer, SmtpConfig, SmtpMailer},
    services::{
        auth::AuthService, catalog_service::CatalogService, crm_service::CrmService,
        customer_service::CustomerService, dashboard_service::DashboardService,
        email_domain::EmailDomainCheck, notification_service::Notifier,
        order_service::OrderService, password_reset_service::PasswordResetService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_JWT_TTL_HOURS: i64 = 24 * 7;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MAIL_FROM: &str = "AtlasTech Solutions <noreply@atlastech.com>";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "https://atlastech.com",
    "https://www.atlastech.com",
];

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub bind_addr: String,
    pub max_connections: u32,
    pub cors_origins: Vec<String>,
    pub mail_from: String,
    pub smtp: Option<SmtpConfig>,
    /// Base URL of the storefront, used to build links in outgoing mail.
    pub frontend_url: String,
    /// Resolve MX/A records for order and contact emails.
    pub email_dns_check: bool,
    pub seed_on_startup: bool,
    pub admin_seed_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl_hours: parse_or(&lookup, "JWT_TTL_HOURS", DEFAULT_JWT_TTL_HOURS)?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            cors_origins: parse_origins(lookup("CORS_ALLOWED_ORIGINS").as_deref()),
            mail_from: lookup("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            smtp: smtp_from(&lookup)?,
            frontend_url: non_empty(&lookup, "FRONTEND_URL")
                .or_else(|| non_empty(&lookup, "APP_URL"))
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            email_dns_check: parse_or(&lookup, "EMAIL_DNS_CHECK", true)?,
            seed_on_startup: parse_or(&lookup, "SEED_ON_STARTUP", false)?,
            admin_seed_password: non_empty(&lookup, "ADMIN_SEED_PASSWORD"),
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// `None` unless SMTP_HOST is set; a malformed port is an error like any
/// other numeric setting.
fn smtp_from<F>(lookup: &F) -> anyhow::Result<Option<SmtpConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(host) = non_empty(lookup, "SMTP_HOST") else {
        return Ok(None);
    };

    Ok(Some(SmtpConfig {
        host: host.trim().to_string(),
        port: parse_or(lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
        user: non_empty(lookup, "SMTP_USER"),
        password: non_empty(lookup, "SMTP_PASSWORD"),
    }))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

/// Comma separated list; blank entries are dropped and an empty list falls back
/// to the default origins.
pub fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() {
        DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
    } else {
        origins
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub password_reset_service: PasswordResetService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService,
    pub crm_service: CrmService,
    pub customer_service: CustomerService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("Database connection established");

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp, &config.mail_from)?),
            None => {
                tracing::warn!("SMTP_HOST not set, outgoing mail will only be logged");
                Arc::new(LogMailer)
            }
        };

        Ok(Self::from_parts(db_pool, config, mailer))
    }

    /// Wires the dependency graph on top of an existing pool and mailer.
    pub fn from_parts(db_pool: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let pack_repo = ServicePackRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let contact_repo = ContactRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());
        let reset_repo = PasswordResetRepository::new(db_pool.clone());

        let notifier = Notifier::new(mailer);
        let email_domains = EmailDomainCheck::new(config.email_dns_check);

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_hours,
        );
        let password_reset_service = PasswordResetService::new(
            user_repo.clone(),
            reset_repo,
            notifier.clone(),
            config.frontend_url.clone(),
        );
        let catalog_service = CatalogService::new(pack_repo.clone());
        let order_service = OrderService::new(
            order_repo.clone(),
            pack_repo.clone(),
            lead_repo.clone(),
            notifier,
            email_domains.clone(),
            db_pool.clone(),
        );
        let crm_service = CrmService::new(
            lead_repo,
            contact_repo,
            order_service.clone(),
            email_domains,
            db_pool.clone(),
        );
        let customer_service = CustomerService::new(user_repo, order_service.clone());
        let dashboard_service = DashboardService::new(dashboard_repo, order_service.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            password_reset_service,
            catalog_service,
            order_service,
            crm_service,
            customer_service,
            dashboard_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [("DATABASE_URL", "postgres://localhost/atlastech"), ("JWT_SECRET", "s3cret")];

    #[test]
    fn origins_fall_back_to_defaults_when_blank() {
        assert_eq!(parse_origins(None).len(), DEFAULT_CORS_ORIGINS.len());
        assert_eq!(parse_origins(Some(" , ")).len(), DEFAULT_CORS_ORIGINS.len());
    }

    #[test]
    fn origins_are_trimmed() {
        assert_eq!(
            parse_origins(Some("https://a.example, https://b.example ,")),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.jwt_ttl_hours, DEFAULT_JWT_TTL_HOURS);
        assert_eq!(config.frontend_url, DEFAULT_FRONTEND_URL);
        assert!(config.email_dns_check);
        assert!(config.smtp.is_none());
        assert!(config.admin_seed_password.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/x")]));
        assert!(result.is_err());
    }

    #[test]
    fn smtp_is_read_with_its_port() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("SMTP_HOST", "smtp.mailtrap.io"), ("SMTP_PORT", "2525"), ("SMTP_USER", "bot")]);
        let smtp = Config::from_lookup(lookup_from(&pairs)).unwrap().smtp.unwrap();
        assert_eq!(
            smtp,
            SmtpConfig {
                host: "smtp.mailtrap.io".into(),
                port: 2525,
                user: Some("bot".into()),
                password: None,
            }
        );

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SMTP_HOST", "smtp.mailtrap.io"));
        let smtp = Config::from_lookup(lookup_from(&pairs)).unwrap().smtp.unwrap();
        assert_eq!(smtp.port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn malformed_smtp_port_fails_startup() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("SMTP_HOST", "smtp.mailtrap.io"), ("SMTP_PORT", "abc")]);
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SMTP_PORT"));
    }

    #[test]
    fn frontend_url_falls_back_to_app_url_without_trailing_slash() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_URL", "https://atlastech.com/"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.frontend_url, "https://atlastech.com");
    }
}
