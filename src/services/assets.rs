//! Fixed assets: registration, purchase posting, and straight-line
//! depreciation runs

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::posting::{
    AssetPurchasePosting, AutoPostingEngine, DepreciationPosting, PaymentMethod, PostingEvent,
};
use crate::traits::{FinanceStore, RegistryStore};
use crate::types::*;
use crate::utils::references;
use crate::utils::validation::{validate_non_negative, validate_positive_amount};

/// A fixed asset on the register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    /// Asset category, resolved through the asset mapping table
    pub category: String,
    pub vendor: String,
    pub method: PaymentMethod,
    pub purchase_date: NaiveDate,
    pub cost: BigDecimal,
    /// Expected value at end of life; depreciation never eats into it
    pub residual_value: BigDecimal,
    /// Straight-line life in months (mutually exclusive with rate)
    pub useful_life_months: Option<u32>,
    /// Annual depreciation rate in percent (mutually exclusive with life)
    pub annual_rate_percent: Option<BigDecimal>,
    pub accumulated_depreciation: BigDecimal,
    /// Last period ("YYYY-MM") a depreciation run charged this asset
    pub last_depreciation_period: Option<String>,
    /// Audit reference, `AST-{year}-{6 alphanumeric}`
    pub reference: String,
    pub recorded_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Optimistic-concurrency token
    pub version: u64,
}

impl Asset {
    /// Cost less residual value: the total that can ever be depreciated
    pub fn depreciable_base(&self) -> BigDecimal {
        &self.cost - &self.residual_value
    }

    /// The straight-line monthly charge, before capping against the
    /// remaining base
    pub fn monthly_depreciation(&self) -> BigDecimal {
        if let Some(months) = self.useful_life_months {
            if months == 0 {
                return BigDecimal::from(0);
            }
            return (self.depreciable_base() / BigDecimal::from(months)).round(2);
        }
        if let Some(ref rate) = self.annual_rate_percent {
            return ((&self.cost * rate) / BigDecimal::from(100) / BigDecimal::from(12)).round(2);
        }
        BigDecimal::from(0)
    }

    /// Cost less accumulated depreciation
    pub fn book_value(&self) -> BigDecimal {
        &self.cost - &self.accumulated_depreciation
    }
}

/// One asset's charge within a depreciation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationCharge {
    pub asset_id: String,
    pub asset_name: String,
    pub amount: BigDecimal,
}

/// Outcome of a monthly depreciation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationRun {
    /// The period charged, "YYYY-MM"
    pub period: String,
    pub charges: Vec<DepreciationCharge>,
    pub total: BigDecimal,
}

/// Service owning the asset lifecycle
pub struct AssetService<S: FinanceStore + Clone> {
    storage: S,
    engine: AutoPostingEngine<S>,
}

impl<S: FinanceStore + Clone> AssetService<S> {
    pub fn new(storage: S) -> Self {
        Self {
            engine: AutoPostingEngine::new(storage.clone()),
            storage,
        }
    }

    /// Register a purchased asset and shadow-post the purchase
    #[allow(clippy::too_many_arguments)]
    pub async fn register_asset(
        &mut self,
        name: String,
        category: String,
        vendor: String,
        method: PaymentMethod,
        purchase_date: NaiveDate,
        cost: BigDecimal,
        residual_value: BigDecimal,
        useful_life_months: Option<u32>,
        annual_rate_percent: Option<BigDecimal>,
    ) -> FinanceResult<Asset> {
        validate_positive_amount(&cost)?;
        validate_non_negative(&residual_value, "Residual value")?;
        if residual_value > cost {
            return Err(FinanceError::Validation(
                "Residual value cannot exceed cost".to_string(),
            ));
        }
        if useful_life_months.is_some() && annual_rate_percent.is_some() {
            return Err(FinanceError::Validation(
                "Specify either a useful life or an annual rate, not both".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let asset = Asset {
            id: Uuid::new_v4().to_string(),
            name: name.clone(),
            category: category.clone(),
            vendor: vendor.clone(),
            method,
            purchase_date,
            cost: cost.clone(),
            residual_value,
            useful_life_months,
            annual_rate_percent,
            accumulated_depreciation: BigDecimal::from(0),
            last_depreciation_period: None,
            reference: references::asset_reference(purchase_date.year()),
            recorded_at: now,
            updated_at: now,
            version: 0,
        };
        self.storage.save_asset(&asset).await?;

        let event = PostingEvent::AssetPurchase(AssetPurchasePosting {
            asset_name: name,
            asset_type: category,
            price: cost,
            method,
            vendor,
            reference: asset.reference.clone(),
            entry_date: purchase_date,
        });
        super::shadow_post(&mut self.storage, &mut self.engine, event).await;

        Ok(asset)
    }

    /// Run straight-line depreciation for the month containing
    /// `period_end`. Assets already charged for the period are skipped, so
    /// the run is safe to repeat.
    pub async fn run_depreciation(&mut self, period_end: NaiveDate) -> FinanceResult<DepreciationRun> {
        let period = format!("{:04}-{:02}", period_end.year(), period_end.month());
        let mut charges = Vec::new();
        let mut total = BigDecimal::from(0);
        let zero = BigDecimal::from(0);

        for mut asset in self.storage.list_assets().await? {
            if asset.purchase_date > period_end {
                continue;
            }
            if asset.last_depreciation_period.as_deref() == Some(period.as_str()) {
                continue;
            }

            let remaining = asset.depreciable_base() - &asset.accumulated_depreciation;
            if remaining <= zero {
                continue;
            }
            let monthly = asset.monthly_depreciation();
            let charge = if monthly < remaining { monthly } else { remaining };
            if charge <= zero {
                continue;
            }

            asset.accumulated_depreciation += &charge;
            asset.last_depreciation_period = Some(period.clone());
            asset.updated_at = chrono::Utc::now().naive_utc();
            let asset = self.storage.update_asset(&asset).await?;

            // deterministic per asset and period, so a replay cannot
            // double-post
            let reference = format!("DEP-{}-{}", period, &asset.id[..6]);
            let event = PostingEvent::Depreciation(DepreciationPosting {
                asset_name: asset.name.clone(),
                amount: charge.clone(),
                reference,
                entry_date: period_end,
            });
            super::shadow_post(&mut self.storage, &mut self.engine, event).await;

            total += &charge;
            charges.push(DepreciationCharge {
                asset_id: asset.id,
                asset_name: asset.name,
                amount: charge,
            });
        }

        Ok(DepreciationRun {
            period,
            charges,
            total,
        })
    }

    pub async fn get_required(&self, id: &str) -> FinanceResult<Asset> {
        self.storage
            .get_asset(id)
            .await?
            .ok_or_else(|| FinanceError::RecordNotFound(format!("asset {}", id)))
    }

    pub async fn list_assets(&self) -> FinanceResult<Vec<Asset>> {
        self.storage.list_assets().await
    }
}
