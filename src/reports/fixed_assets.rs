//! Asset register and depreciation schedule reports

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::services::assets::Asset;
use crate::traits::{FinanceStore, RegistryStore};
use crate::types::FinanceResult;

use super::ReportsGenerator;

/// One asset's line on the register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRegisterRow {
    pub asset_id: String,
    pub name: String,
    pub category: String,
    pub purchase_date: NaiveDate,
    pub cost: BigDecimal,
    pub residual_value: BigDecimal,
    pub accumulated_depreciation: BigDecimal,
    pub book_value: BigDecimal,
}

/// All assets held as of a date, with totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRegister {
    pub as_of_date: NaiveDate,
    pub rows: Vec<AssetRegisterRow>,
    pub total_cost: BigDecimal,
    pub total_accumulated_depreciation: BigDecimal,
    pub total_book_value: BigDecimal,
}

/// One projected period in a depreciation schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Period charged, "YYYY-MM"
    pub period: String,
    pub charge: BigDecimal,
    pub accumulated: BigDecimal,
    pub book_value: BigDecimal,
}

/// The projected straight-line write-down of one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationSchedule {
    pub asset_id: String,
    pub asset_name: String,
    pub rows: Vec<ScheduleRow>,
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

impl<S: FinanceStore + Clone> ReportsGenerator<S> {
    /// The asset register as of a date, from the stored asset records
    pub async fn asset_register(&self, as_of_date: NaiveDate) -> FinanceResult<AssetRegister> {
        let mut rows = Vec::new();
        let mut total_cost = BigDecimal::from(0);
        let mut total_accumulated_depreciation = BigDecimal::from(0);
        let mut total_book_value = BigDecimal::from(0);

        let mut assets = self.storage.list_assets().await?;
        assets.sort_by(|a, b| a.purchase_date.cmp(&b.purchase_date));

        for asset in assets {
            if asset.purchase_date > as_of_date {
                continue;
            }
            let book_value = asset.book_value();
            total_cost += &asset.cost;
            total_accumulated_depreciation += &asset.accumulated_depreciation;
            total_book_value += &book_value;
            rows.push(AssetRegisterRow {
                asset_id: asset.id,
                name: asset.name,
                category: asset.category,
                purchase_date: asset.purchase_date,
                cost: asset.cost,
                residual_value: asset.residual_value,
                accumulated_depreciation: asset.accumulated_depreciation,
                book_value,
            });
        }

        Ok(AssetRegister {
            as_of_date,
            rows,
            total_cost,
            total_accumulated_depreciation,
            total_book_value,
        })
    }

    /// Project an asset's straight-line schedule from its purchase date,
    /// period by period, capped at cost less residual value. Projection
    /// stops at `until` even if the asset is not fully written down.
    pub fn depreciation_schedule(asset: &Asset, until: NaiveDate) -> DepreciationSchedule {
        let mut rows = Vec::new();
        let zero = BigDecimal::from(0);
        let base = asset.depreciable_base();
        let monthly = asset.monthly_depreciation();
        let mut accumulated = BigDecimal::from(0);

        if monthly > zero {
            let mut year = asset.purchase_date.year();
            let mut month = asset.purchase_date.month();

            while accumulated < base {
                let cutoff =
                    NaiveDate::from_ymd_opt(year, month, 1).is_none_or(|first| first > until);
                if cutoff {
                    break;
                }

                let remaining = &base - &accumulated;
                let charge = if monthly < remaining {
                    monthly.clone()
                } else {
                    remaining
                };
                accumulated += &charge;
                rows.push(ScheduleRow {
                    period: format!("{:04}-{:02}", year, month),
                    charge,
                    accumulated: accumulated.clone(),
                    book_value: &asset.cost - &accumulated,
                });

                let (next_year, next_month) = next_month(year, month);
                year = next_year;
                month = next_month;
            }
        }

        DepreciationSchedule {
            asset_id: asset.id.clone(),
            asset_name: asset.name.clone(),
            rows,
        }
    }
}
