//! Tenant locators.
//!
//! A blog is reachable by exactly one of a custom domain, a subdomain, or a
//! `(user slug, blog slug)` path pair. The front-door router has already
//! parsed the Host header into query parameters by the time a request reaches
//! the gateway, so tenant selection is a pure priority pick over those fields.

use serde::{Deserialize, Serialize};

/// Raw tenant identifiers extracted by the upstream router.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TenantLocator {
    pub domain: Option<String>,
    pub subdomain: Option<String>,
    pub user_slug: Option<String>,
    pub blog_slug: Option<String>,
}

/// The single identifier that wins tenant resolution.
///
/// Priority order: custom domain, then subdomain, then slug pair. Matching is
/// exact and case-sensitive; callers must pre-strip port numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TenantKey {
    CustomDomain(String),
    Subdomain(String),
    Slugs {
        user_slug: Option<String>,
        blog_slug: String,
    },
}

impl TenantLocator {
    /// Pick the authoritative identifier, first non-empty wins.
    pub fn key(&self) -> Option<TenantKey> {
        if let Some(domain) = non_empty(&self.domain) {
            return Some(TenantKey::CustomDomain(domain));
        }
        if let Some(subdomain) = non_empty(&self.subdomain) {
            return Some(TenantKey::Subdomain(subdomain));
        }
        if let Some(blog_slug) = non_empty(&self.blog_slug) {
            return Some(TenantKey::Slugs {
                user_slug: non_empty(&self.user_slug),
                blog_slug,
            });
        }
        None
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field.as_deref().filter(|s| !s.is_empty()).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_wins_over_subdomain_and_slug() {
        let locator = TenantLocator {
            domain: Some("a.com".to_string()),
            subdomain: Some("a".to_string()),
            user_slug: Some("u".to_string()),
            blog_slug: Some("b".to_string()),
        };
        assert_eq!(
            locator.key(),
            Some(TenantKey::CustomDomain("a.com".to_string()))
        );
    }

    #[test]
    fn test_empty_strings_are_skipped() {
        let locator = TenantLocator {
            domain: Some(String::new()),
            subdomain: None,
            user_slug: None,
            blog_slug: Some("b".to_string()),
        };
        assert_eq!(
            locator.key(),
            Some(TenantKey::Slugs {
                user_slug: None,
                blog_slug: "b".to_string(),
            })
        );
    }

    #[test]
    fn test_no_identifier() {
        assert_eq!(TenantLocator::default().key(), None);
    }
}
