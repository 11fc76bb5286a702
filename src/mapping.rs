//! Configurable mappings from business concepts to ledger accounts
//!
//! A mapping ties a domain source type (a fee type, an expense category, an
//! asset category, a liability source) to one active account. Resolution
//! never fails: unconfigured source types fall back to a generic account so
//! the primary business operation is never blocked on mapping completeness.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::chart::codes;
use crate::traits::MappingStore;
use crate::types::{FinanceError, FinanceResult};

/// The kind of account a mapping points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    Revenue,
    Expense,
    Asset,
    Liability,
}

impl MappingType {
    /// The generic account used when no mapping is configured for a source
    /// type
    pub fn fallback_account(&self) -> &'static str {
        match self {
            MappingType::Revenue => codes::OTHER_INCOME,
            MappingType::Expense => codes::OTHER_EXPENSE,
            MappingType::Asset => codes::FIXED_ASSETS,
            MappingType::Liability => codes::SUSPENSE,
        }
    }
}

/// Association from a `(mapping_type, source_type)` key to an account.
///
/// At most one active mapping may exist per key. Mappings are deactivated,
/// never hard-deleted, to preserve the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMapping {
    pub id: String,
    pub mapping_type: MappingType,
    /// Domain concept being mapped, e.g. "tuition" or "utilities"
    pub source_type: String,
    /// Target account code
    pub account_code: String,
    /// Whether this mapping came from the default seed
    pub is_default: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Optimistic-concurrency token
    pub version: u64,
}

impl AccountMapping {
    pub fn new(
        mapping_type: MappingType,
        source_type: impl Into<String>,
        account_code: impl Into<String>,
        is_default: bool,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            mapping_type,
            source_type: source_type.into(),
            account_code: account_code.into(),
            is_default,
            is_active: true,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

/// Default mappings seeded for a school: (type, source, account)
fn default_mappings() -> Vec<(MappingType, &'static str, &'static str)> {
    vec![
        (MappingType::Revenue, "tuition", codes::TUITION_FEES),
        (MappingType::Revenue, "registration", codes::REGISTRATION_FEES),
        (MappingType::Revenue, "examination", codes::EXAMINATION_FEES),
        (MappingType::Revenue, "bank_interest", codes::INTEREST_INCOME),
        (MappingType::Expense, "utilities", codes::UTILITIES_EXPENSE),
        (MappingType::Expense, "maintenance", codes::REPAIRS_MAINTENANCE),
        (MappingType::Expense, "bank_charge", codes::BANK_CHARGES),
        (MappingType::Asset, "furniture", codes::FURNITURE_EQUIPMENT),
        (MappingType::Asset, "vehicle", codes::MOTOR_VEHICLES),
    ]
}

/// Resolver and lifecycle manager for account mappings
pub struct MappingResolver<S: MappingStore> {
    storage: S,
}

impl<S: MappingStore> MappingResolver<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// All active mappings for one `(mapping_type, source_type)` key
    async fn active_for_key(
        &self,
        mapping_type: MappingType,
        source_type: &str,
    ) -> FinanceResult<Vec<AccountMapping>> {
        let mappings = self.storage.list_mappings(Some(mapping_type)).await?;
        Ok(mappings
            .into_iter()
            .filter(|m| m.is_active && m.source_type == source_type)
            .collect())
    }

    /// Resolve the account code for a source type.
    ///
    /// A unique active mapping wins. Multiple active mappings are a data
    /// anomaly: the most recently updated one is used and a warning is
    /// logged. No mapping at all resolves to the mapping type's fallback
    /// account.
    pub async fn resolve(
        &self,
        mapping_type: MappingType,
        source_type: &str,
    ) -> FinanceResult<String> {
        let mut matches = self.active_for_key(mapping_type, source_type).await?;

        match matches.len() {
            0 => Ok(mapping_type.fallback_account().to_string()),
            1 => Ok(matches.remove(0).account_code),
            n => {
                warn!(
                    source_type,
                    count = n,
                    "multiple active mappings for one key; using the most recently updated"
                );
                matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                Ok(matches.remove(0).account_code)
            }
        }
    }

    /// Upsert a mapping for a key.
    ///
    /// If the key already has an active mapping, the caller must pass its
    /// id to update it in place; omitting it rejects the call with a
    /// duplicate-mapping error rather than silently creating a second
    /// active mapping.
    pub async fn set_mapping(
        &mut self,
        mapping_type: MappingType,
        source_type: &str,
        account_code: &str,
        existing_id: Option<&str>,
    ) -> FinanceResult<AccountMapping> {
        let existing = self.active_for_key(mapping_type, source_type).await?;

        if existing.is_empty() {
            let mapping = AccountMapping::new(mapping_type, source_type, account_code, false);
            self.storage.save_mapping(&mapping).await?;
            return Ok(mapping);
        }

        match existing_id {
            Some(id) => {
                let mut current = existing
                    .into_iter()
                    .find(|m| m.id == id)
                    .ok_or_else(|| {
                        FinanceError::Validation(format!(
                            "Mapping '{}' is not the active mapping for '{}'",
                            id, source_type
                        ))
                    })?;
                current.account_code = account_code.to_string();
                current.updated_at = chrono::Utc::now().naive_utc();
                self.storage.update_mapping(&current).await
            }
            None => Err(FinanceError::DuplicateMapping(format!(
                "an active {:?} mapping for '{}' already exists",
                mapping_type, source_type
            ))),
        }
    }

    /// Convenience upsert that replaces whatever active mapping the key has
    pub async fn set_or_replace(
        &mut self,
        mapping_type: MappingType,
        source_type: &str,
        account_code: &str,
    ) -> FinanceResult<AccountMapping> {
        let existing = self.active_for_key(mapping_type, source_type).await?;
        let existing_id = existing
            .iter()
            .max_by_key(|m| m.updated_at)
            .map(|m| m.id.clone());
        self.set_mapping(mapping_type, source_type, account_code, existing_id.as_deref())
            .await
    }

    /// Deactivate a mapping by id; mappings are never hard-deleted
    pub async fn deactivate(&mut self, id: &str) -> FinanceResult<AccountMapping> {
        let mut mapping = self
            .storage
            .get_mapping(id)
            .await?
            .ok_or_else(|| FinanceError::RecordNotFound(format!("mapping {}", id)))?;
        mapping.is_active = false;
        mapping.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_mapping(&mapping).await
    }

    /// Repair operation: for every key with more than one active mapping,
    /// keep the most recently updated one and deactivate the rest. Returns
    /// the number of mappings deactivated.
    pub async fn remove_duplicates(&mut self) -> FinanceResult<usize> {
        use std::collections::HashMap;

        let all = self.storage.list_mappings(None).await?;
        let mut by_key: HashMap<(MappingType, String), Vec<AccountMapping>> = HashMap::new();
        for mapping in all.into_iter().filter(|m| m.is_active) {
            by_key
                .entry((mapping.mapping_type, mapping.source_type.clone()))
                .or_default()
                .push(mapping);
        }

        let mut removed = 0;
        for (_, mut group) in by_key {
            if group.len() < 2 {
                continue;
            }
            group.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            for mut duplicate in group.into_iter().skip(1) {
                duplicate.is_active = false;
                duplicate.updated_at = chrono::Utc::now().naive_utc();
                self.storage.update_mapping(&duplicate).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Seed the default school mappings. Idempotent: keys that already have
    /// an active mapping are skipped. Returns the number created.
    pub async fn seed_defaults(&mut self) -> FinanceResult<usize> {
        let mut created = 0;
        for (mapping_type, source_type, account_code) in default_mappings() {
            if !self.active_for_key(mapping_type, source_type).await?.is_empty() {
                continue;
            }
            let mapping = AccountMapping::new(mapping_type, source_type, account_code, true);
            self.storage.save_mapping(&mapping).await?;
            created += 1;
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MappingStore;
    use crate::utils::memory_store::MemoryStore;
    use chrono::Duration;

    #[tokio::test]
    async fn unconfigured_source_resolves_to_fallback() {
        let storage = MemoryStore::new();
        let resolver = MappingResolver::new(storage);

        let code = resolver
            .resolve(MappingType::Revenue, "sports_levy")
            .await
            .unwrap();
        assert_eq!(code, codes::OTHER_INCOME);

        let code = resolver
            .resolve(MappingType::Expense, "unmapped")
            .await
            .unwrap();
        assert_eq!(code, codes::OTHER_EXPENSE);

        let code = resolver
            .resolve(MappingType::Asset, "unmapped")
            .await
            .unwrap();
        assert_eq!(code, codes::FIXED_ASSETS);
    }

    #[tokio::test]
    async fn second_mapping_without_identity_is_rejected() {
        let storage = MemoryStore::new();
        let mut resolver = MappingResolver::new(storage);

        resolver
            .set_mapping(MappingType::Revenue, "tuition", codes::TUITION_FEES, None)
            .await
            .unwrap();

        let err = resolver
            .set_mapping(MappingType::Revenue, "tuition", codes::OTHER_INCOME, None)
            .await;
        assert!(matches!(err, Err(FinanceError::DuplicateMapping(_))));
    }

    #[tokio::test]
    async fn upsert_with_identity_leaves_one_active_mapping() {
        let storage = MemoryStore::new();
        let mut resolver = MappingResolver::new(storage.clone());

        let first = resolver
            .set_mapping(MappingType::Revenue, "tuition", codes::TUITION_FEES, None)
            .await
            .unwrap();

        resolver
            .set_mapping(
                MappingType::Revenue,
                "tuition",
                codes::OTHER_INCOME,
                Some(&first.id),
            )
            .await
            .unwrap();

        let active: Vec<_> = storage
            .list_mappings(Some(MappingType::Revenue))
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.is_active && m.source_type == "tuition")
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].account_code, codes::OTHER_INCOME);

        let resolved = resolver
            .resolve(MappingType::Revenue, "tuition")
            .await
            .unwrap();
        assert_eq!(resolved, codes::OTHER_INCOME);
    }

    #[tokio::test]
    async fn duplicate_actives_resolve_to_newest() {
        let mut storage = MemoryStore::new();

        let mut older = AccountMapping::new(
            MappingType::Expense,
            "utilities",
            codes::OTHER_EXPENSE,
            false,
        );
        older.updated_at -= Duration::seconds(60);
        let newer = AccountMapping::new(
            MappingType::Expense,
            "utilities",
            codes::UTILITIES_EXPENSE,
            false,
        );

        storage.save_mapping(&older).await.unwrap();
        storage.save_mapping(&newer).await.unwrap();

        let resolver = MappingResolver::new(storage);
        let resolved = resolver
            .resolve(MappingType::Expense, "utilities")
            .await
            .unwrap();
        assert_eq!(resolved, codes::UTILITIES_EXPENSE);
    }

    #[tokio::test]
    async fn remove_duplicates_keeps_newest_only() {
        let mut storage = MemoryStore::new();

        let mut older = AccountMapping::new(
            MappingType::Revenue,
            "tuition",
            codes::OTHER_INCOME,
            false,
        );
        older.updated_at -= Duration::seconds(60);
        let newer =
            AccountMapping::new(MappingType::Revenue, "tuition", codes::TUITION_FEES, false);

        storage.save_mapping(&older).await.unwrap();
        storage.save_mapping(&newer).await.unwrap();

        let mut resolver = MappingResolver::new(storage.clone());
        let removed = resolver.remove_duplicates().await.unwrap();
        assert_eq!(removed, 1);

        let active: Vec<_> = storage
            .list_mappings(None)
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].account_code, codes::TUITION_FEES);

        // running the repair again finds nothing to do
        assert_eq!(resolver.remove_duplicates().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn seed_defaults_is_idempotent() {
        let storage = MemoryStore::new();
        let mut resolver = MappingResolver::new(storage);

        let first = resolver.seed_defaults().await.unwrap();
        assert!(first > 0);
        assert_eq!(resolver.seed_defaults().await.unwrap(), 0);

        let resolved = resolver
            .resolve(MappingType::Revenue, "tuition")
            .await
            .unwrap();
        assert_eq!(resolved, codes::TUITION_FEES);
    }
}
