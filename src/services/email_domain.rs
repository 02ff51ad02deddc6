// src/services/email_domain.rs

use std::time::Duration;

use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    system_conf, TokioAsyncResolver,
};

use crate::common::error::AppError;

// RFC 2606 / RFC 6761 names that can never receive mail
const RESERVED_TLDS: &[&str] = &["example", "invalid", "localhost", "test"];

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Checks that the domain of a submitted email can receive mail: an MX record,
/// or failing that an A/AAAA record.
///
/// Reserved top-level domains are always rejected. With DNS disabled that is
/// the whole check. A lookup that fails for any reason other than "no such
/// records" (timeout, unreachable resolver) lets the address through.
#[derive(Clone)]
pub struct EmailDomainCheck {
    resolver: Option<TokioAsyncResolver>,
}

impl EmailDomainCheck {
    pub fn new(dns_enabled: bool) -> Self {
        if !dns_enabled {
            return Self::offline();
        }

        let (config, mut opts) = system_conf::read_system_conf().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read system resolver config, using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        });
        opts.timeout = LOOKUP_TIMEOUT;
        opts.attempts = 1;

        Self { resolver: Some(TokioAsyncResolver::tokio(config, opts)) }
    }

    pub fn offline() -> Self {
        Self { resolver: None }
    }

    pub async fn verify(&self, field: &'static str, email: &str) -> Result<(), AppError> {
        let Some(domain) = email_domain(email) else {
            return Err(undeliverable(field));
        };

        if is_reserved(&domain) {
            return Err(undeliverable(field));
        }

        let Some(resolver) = &self.resolver else {
            return Ok(());
        };

        match accepts_mail(resolver, &domain).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::info!(%domain, "email domain has no mail records");
                Err(undeliverable(field))
            }
            Err(e) => {
                tracing::warn!(%domain, error = %e, "email domain lookup failed, accepting address");
                Ok(())
            }
        }
    }
}

fn undeliverable(field: &'static str) -> AppError {
    AppError::field(field, "dns", "The email domain does not accept mail.")
}

fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    (!domain.is_empty()).then_some(domain)
}

fn is_reserved(domain: &str) -> bool {
    let tld = domain.rsplit('.').next().unwrap_or(domain);
    RESERVED_TLDS.contains(&tld)
}

fn is_missing(error: &ResolveError) -> bool {
    matches!(error.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

async fn accepts_mail(resolver: &TokioAsyncResolver, domain: &str) -> Result<bool, ResolveError> {
    let fqdn = format!("{}.", domain);

    match resolver.mx_lookup(fqdn.as_str()).await {
        // A lone "." exchange is a null MX: the domain explicitly takes no mail
        Ok(mx) => return Ok(mx.iter().any(|record| !record.exchange().is_root())),
        Err(e) if is_missing(&e) => {}
        Err(e) => return Err(e),
    }

    match resolver.lookup_ip(fqdn.as_str()).await {
        Ok(ips) => Ok(ips.iter().next().is_some()),
        Err(e) if is_missing(&e) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_the_part_after_the_last_at() {
        assert_eq!(email_domain("sara@Example.COM").as_deref(), Some("example.com"));
        assert_eq!(email_domain("\"a@b\"@atlastech.ma.").as_deref(), Some("atlastech.ma"));
        assert_eq!(email_domain("no-at-sign"), None);
        assert_eq!(email_domain("trailing@"), None);
    }

    #[test]
    fn reserved_names_are_matched_on_the_last_label() {
        assert!(is_reserved("no-such-host.invalid"));
        assert!(is_reserved("localhost"));
        assert!(is_reserved("shop.test"));
        assert!(!is_reserved("example.com"));
        assert!(!is_reserved("atlastech.ma"));
    }

    #[tokio::test]
    async fn reserved_domains_fail_even_without_dns() {
        let check = EmailDomainCheck::offline();

        let err = check.verify("email", "buyer@no-such-host.invalid").await.unwrap_err();
        assert!(matches!(&err, AppError::ValidationError(errors) if errors.field_errors().contains_key("email")));

        assert!(check.verify("email", "buyer@atlastech.ma").await.is_ok());
    }
}
