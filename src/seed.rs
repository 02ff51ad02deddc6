// src/seed.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ServicePackRepository, UserRepository},
    models::auth::Role,
    services::auth::hash_password,
};

struct SeedPack {
    name: &'static str,
    description: &'static str,
    price: i64,
    features: &'static [&'static str],
}

const STAFF: &[(&str, &str, Role)] = &[
    ("Admin User", "admin@atlastech.com", Role::SuperAdmin),
    ("Manager", "manager@atlastech.com", Role::Admin),
];

const PACKS: &[SeedPack] = &[
    SeedPack {
        name: "Basic Pack",
        description: "Perfect for small businesses starting their online journey. Includes essential web \
                      development features to get your business online quickly.",
        price: 499,
        features: &[
            "5-page responsive website",
            "Contact form integration",
            "Basic SEO optimization",
            "Mobile-friendly design",
            "1 month support",
            "Social media links",
        ],
    },
    SeedPack {
        name: "Professional Pack",
        description: "Ideal for growing businesses that need more advanced features and customization. \
                      Perfect for establishing a strong online presence.",
        price: 999,
        features: &[
            "10-page responsive website",
            "Advanced contact form",
            "Full SEO package",
            "CMS integration",
            "Blog functionality",
            "Analytics integration",
            "3 months support",
            "Custom animations",
            "E-commerce ready",
        ],
    },
    SeedPack {
        name: "Enterprise Pack",
        description: "Comprehensive solution for large organizations requiring custom development, \
                      advanced features, and dedicated support.",
        price: 2499,
        features: &[
            "Unlimited pages",
            "Custom web application",
            "Advanced SEO & marketing",
            "User authentication",
            "Payment gateway integration",
            "API development",
            "Database design",
            "12 months priority support",
            "Dedicated account manager",
            "Custom integrations",
        ],
    },
];

/// Creates the staff accounts that don't exist yet and upserts the default
/// packs by name. Safe to run on every startup.
pub async fn run(
    users: &UserRepository,
    packs: &ServicePackRepository,
    admin_password: Option<&str>,
) -> Result<(), AppError> {
    let password = match admin_password {
        Some(password) => password.to_owned(),
        None => {
            let generated = Uuid::new_v4().simple().to_string();
            tracing::warn!(
                "ADMIN_SEED_PASSWORD not set. Temporary password for new staff accounts: {}",
                generated
            );
            generated
        }
    };
    let password_hash = hash_password(&password).await?;

    for (name, email, role) in STAFF {
        if users.insert_if_absent(name, email, &password_hash, *role).await? {
            tracing::info!(email, ?role, "seeded staff account");
        }
    }

    for pack in PACKS {
        let features: Vec<String> = pack.features.iter().map(|f| f.to_string()).collect();
        let inserted = packs
            .upsert_by_name(pack.name, pack.description, Decimal::from(pack.price), &features)
            .await?;
        tracing::info!(name = pack.name, inserted, "seeded service pack");
    }

    Ok(())
}
