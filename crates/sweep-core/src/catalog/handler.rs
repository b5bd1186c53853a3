use tracing::{info, warn};

use crate::backend::SearchBackend;

use super::errors::CatalogError;
use super::types::{
    NON_BILLABLE_KEYWORDS, PRIORITY_TYPES, ResolvedCatalog, SkippedType, SupportedTypeCatalog,
};

const SKIP_REASON_UNSUPPORTED: &str = "not in the backend's resource type catalog";

/// Curated priority types followed by configured extras.
pub fn priority_types_with(extra: &[String]) -> Vec<String> {
    PRIORITY_TYPES
        .iter()
        .map(|t| t.to_string())
        .chain(extra.iter().map(|t| t.trim().to_string()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Built-in non-billable keywords plus configured extras, lower-cased.
pub fn non_billable_keywords_with(extra: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = NON_BILLABLE_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .chain(extra.iter().map(|k| k.trim().to_lowercase()))
        .filter(|k| !k.is_empty())
        .collect();
    keywords.sort();
    keywords.dedup();
    keywords
}

/// Split the backend catalog into the priority and fallback tiers.
///
/// Priority entries the backend does not know are reported in
/// `ResolvedCatalog::skipped`; they never fail resolution.
pub fn resolve_catalog(
    priority: &[String],
    non_billable_keywords: &[String],
    supported: SupportedTypeCatalog,
) -> ResolvedCatalog {
    let mut resolved = ResolvedCatalog {
        non_billable_keywords: non_billable_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect(),
        ..Default::default()
    };

    for name in priority {
        match supported.canonical(name) {
            Some(canonical) => {
                if !resolved.is_priority(canonical) {
                    resolved.priority.push(canonical.to_string());
                }
            }
            None => {
                warn!(
                    event = "core.catalog.priority_type_skipped",
                    resource_type = %name,
                    reason = SKIP_REASON_UNSUPPORTED
                );
                resolved.skipped.push(SkippedType {
                    name: name.clone(),
                    reason: SKIP_REASON_UNSUPPORTED.to_string(),
                });
            }
        }
    }

    resolved.fallback = supported
        .names()
        .filter(|name| !resolved.is_priority(name) && !resolved.is_non_billable(name))
        .map(str::to_string)
        .collect();
    resolved.supported = supported;

    info!(
        event = "core.catalog.resolve_completed",
        supported = resolved.supported.len(),
        priority = resolved.priority.len(),
        fallback = resolved.fallback.len(),
        skipped = resolved.skipped.len()
    );
    resolved
}

/// Fetch the backend's catalog once and resolve the tiers for a run.
///
/// Any backend failure aborts; there is no partial catalog.
pub async fn fetch_catalog(
    backend: &dyn SearchBackend,
    priority: &[String],
    non_billable_keywords: &[String],
) -> Result<ResolvedCatalog, CatalogError> {
    info!(event = "core.catalog.fetch_started", backend = backend.name());

    let names = backend
        .list_resource_types()
        .await
        .map_err(|source| CatalogError::FetchFailed { source })?;

    let supported = SupportedTypeCatalog::from_names(names);
    if supported.is_empty() {
        return Err(CatalogError::EmptyCatalog);
    }

    Ok(resolve_catalog(priority, non_billable_keywords, supported))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FixtureBackend, FixtureData};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn default_keywords() -> Vec<String> {
        non_billable_keywords_with(&[])
    }

    #[test]
    fn test_priority_resolved_to_backend_spelling() {
        let supported = SupportedTypeCatalog::from_names(["instance", "NatGateway", "Vcn"]);
        let resolved = resolve_catalog(
            &names(&["Instance", "NATGateway", "Vcn"]),
            &default_keywords(),
            supported,
        );
        assert_eq!(resolved.priority, vec!["instance", "NatGateway", "Vcn"]);
        assert!(resolved.skipped.is_empty());
        assert!(resolved.fallback.is_empty());
    }

    #[test]
    fn test_unsupported_priority_types_are_skipped() {
        let supported = SupportedTypeCatalog::from_names(["Instance"]);
        let resolved = resolve_catalog(
            &names(&["Instance", "Bastion", "ServiceConnector"]),
            &default_keywords(),
            supported,
        );
        assert_eq!(resolved.priority, vec!["Instance"]);
        let skipped: Vec<&str> = resolved.skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, vec!["Bastion", "ServiceConnector"]);
        assert!(resolved.skipped[0].reason.contains("catalog"));
    }

    #[test]
    fn test_keywords_do_not_demote_priority_types() {
        let supported = SupportedTypeCatalog::from_names(["LogGroup", "Log"]);
        let resolved = resolve_catalog(&names(&["LogGroup", "Log"]), &default_keywords(), supported);
        assert_eq!(resolved.priority, vec!["LogGroup", "Log"]);
    }

    #[test]
    fn test_duplicate_priority_entries_collapse() {
        let supported = SupportedTypeCatalog::from_names(["Bucket"]);
        let resolved = resolve_catalog(
            &names(&["Bucket", "bucket", "BUCKET"]),
            &default_keywords(),
            supported,
        );
        assert_eq!(resolved.priority, vec!["Bucket"]);
    }

    #[test]
    fn test_fallback_excludes_priority_and_non_billable() {
        let supported = SupportedTypeCatalog::from_names([
            "Instance",
            "Compartment",
            "TagNamespace",
            "TagDefault",
            "Policy",
            "Group",
            "DynamicGroup",
            "User",
            "Tenancy",
            "OdaInstance",
            "DataScienceProject",
            "ContainerRepo",
        ]);
        let resolved = resolve_catalog(&names(&["Instance"]), &default_keywords(), supported);
        assert_eq!(
            resolved.fallback,
            vec!["ContainerRepo", "DataScienceProject", "OdaInstance"]
        );
    }

    #[test]
    fn test_fallback_never_contains_keyword_match_or_priority() {
        let catalogs: Vec<Vec<&str>> = vec![
            vec!["Instance", "Bucket", "UserGroupMembership", "Key"],
            vec!["PolicyBinding", "MyTagThing", "Subnet", "Vault", "Zzz"],
            vec!["COMPARTMENTX", "tenancyinfo", "Alarm", "NoSqlTable"],
            vec![],
        ];
        let priority = priority_types_with(&[]);
        let keywords = default_keywords();

        for catalog in catalogs {
            let resolved = resolve_catalog(
                &priority,
                &keywords,
                SupportedTypeCatalog::from_names(catalog.clone()),
            );
            for entry in &resolved.fallback {
                let lower = entry.to_lowercase();
                assert!(
                    !keywords.iter().any(|k| lower.contains(k.as_str())),
                    "{entry} leaked into fallback for {catalog:?}"
                );
                assert!(!resolved.is_priority(entry));
            }
        }
    }

    #[test]
    fn test_extra_keywords_and_priority_types() {
        let keywords = non_billable_keywords_with(&names(&[" Announcement ", "tag"]));
        assert!(keywords.contains(&"announcement".to_string()));
        assert_eq!(keywords.iter().filter(|k| *k == "tag").count(), 1);

        let priority = priority_types_with(&names(&["OdaInstance", " "]));
        assert_eq!(priority.last().map(String::as_str), Some("OdaInstance"));
        assert_eq!(priority.len(), PRIORITY_TYPES.len() + 1);
    }

    #[tokio::test]
    async fn test_fetch_catalog_failure_is_fatal() {
        let backend = FixtureBackend::new(FixtureData {
            catalog_unavailable: true,
            ..Default::default()
        });
        let err = fetch_catalog(&backend, &priority_types_with(&[]), &default_keywords())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_catalog_empty_is_fatal() {
        let backend = FixtureBackend::new(FixtureData::default());
        let err = fetch_catalog(&backend, &priority_types_with(&[]), &default_keywords())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCatalog));
    }

    #[tokio::test]
    async fn test_fetch_catalog_resolves() {
        let backend = FixtureBackend::new(FixtureData {
            resource_types: names(&["Bucket", "Instance", "OdaInstance", "TagNamespace"]),
            ..Default::default()
        });
        let resolved = fetch_catalog(&backend, &priority_types_with(&[]), &default_keywords())
            .await
            .unwrap();
        assert_eq!(resolved.priority, vec!["Instance", "Bucket"]);
        assert_eq!(resolved.fallback, vec!["OdaInstance"]);
        assert_eq!(resolved.skipped.len(), PRIORITY_TYPES.len() - 2);
    }
}
