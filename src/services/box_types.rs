//! Box type selection and box utilization.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::{percent_of, round2};
use crate::entities::{packing_box, packing_box_type};
use crate::errors::ServiceError;
use crate::services::capacity::CargoLine;
use crate::services::packaging::calculate_cbm;

const NEAR_LIMIT_RATIO: f64 = 0.95;
const LOW_UTILIZATION_PERCENT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PackingEfficiency {
    pub weight_utilization: f64,
    pub volume_utilization: f64,
    pub efficiency_score: f64,
    pub is_optimal: bool,
    pub is_overloaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxTypeStatistics {
    pub box_type_id: Uuid,
    pub total_boxes: usize,
    pub avg_weight_utilization: f64,
    pub avg_volume_utilization: f64,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxTypeComparison {
    pub box_type_id: Uuid,
    pub box_type: String,
    pub box_type_name: String,
    pub boxes_needed: i64,
    pub weight_utilization: f64,
    pub volume_utilization: f64,
    pub avg_utilization: f64,
    pub total_cost: f64,
    pub cost_per_m3: f64,
    pub is_recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxTypeSelection {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub weight_utilization: f64,
    pub volume_utilization: f64,
}

/// Smallest type (by `max_volume`) carrying `weight` kg and `volume` m³.
///
/// `types` must already be ordered by ascending `max_volume`.
pub fn smallest_fitting(
    types: &[packing_box_type::Model],
    weight: f64,
    volume: f64,
) -> Option<&packing_box_type::Model> {
    types
        .iter()
        .find(|box_type| box_type.max_weight >= weight && box_type.max_volume >= volume)
}

/// A box's gross weight and volume against its type's limits.
///
/// Boxes without a type score zero. A missing gross weight falls back to the
/// net content weight; a missing volume counts as zero.
pub fn efficiency_of(
    packing_box: &packing_box::Model,
    box_type: Option<&packing_box_type::Model>,
) -> PackingEfficiency {
    let Some(box_type) = box_type else {
        return PackingEfficiency {
            weight_utilization: 0.0,
            volume_utilization: 0.0,
            efficiency_score: 0.0,
            is_optimal: false,
            is_overloaded: false,
        };
    };

    let weight = packing_box.gross_weight.unwrap_or(packing_box.net_weight);
    let volume = packing_box.volume.unwrap_or(0.0);
    let weight_utilization = percent_of(weight, box_type.max_weight);
    let volume_utilization = percent_of(volume, box_type.max_volume);
    let score = (weight_utilization + volume_utilization) / 2.0;

    PackingEfficiency {
        weight_utilization: round2(weight_utilization),
        volume_utilization: round2(volume_utilization),
        efficiency_score: round2(score),
        is_optimal: (70.0..=95.0).contains(&score),
        is_overloaded: weight_utilization > 100.0 || volume_utilization > 100.0,
    }
}

/// Box count, utilization and cost of every type for a load of the given totals.
///
/// Ordered by descending average utilization, then ascending total cost.
pub fn compare_for_totals(
    total_weight: f64,
    total_volume: f64,
    types: &[packing_box_type::Model],
) -> Vec<BoxTypeComparison> {
    let mut comparisons = Vec::with_capacity(types.len());

    for box_type in types {
        if box_type.max_weight <= 0.0 || box_type.max_volume <= 0.0 {
            continue;
        }

        let by_weight = (total_weight / box_type.max_weight).ceil() as i64;
        let by_volume = (total_volume / box_type.max_volume).ceil() as i64;
        let boxes_needed = by_weight.max(by_volume).max(1);
        let count = boxes_needed as f64;

        let weight_utilization = percent_of(total_weight, count * box_type.max_weight);
        let volume_utilization = percent_of(total_volume, count * box_type.max_volume);
        let avg_utilization = (weight_utilization + volume_utilization) / 2.0;

        let unit_cost = box_type.unit_cost.and_then(|c| c.to_f64()).unwrap_or(0.0);
        let total_cost = count * unit_cost;
        let cost_per_m3 = if total_cost > 0.0 && total_volume > 0.0 {
            total_cost / total_volume
        } else {
            0.0
        };

        comparisons.push(BoxTypeComparison {
            box_type_id: box_type.id,
            box_type: box_type.code.clone(),
            box_type_name: box_type.name.clone(),
            boxes_needed,
            weight_utilization: round2(weight_utilization),
            volume_utilization: round2(volume_utilization),
            avg_utilization: round2(avg_utilization),
            total_cost: round2(total_cost),
            cost_per_m3: round2(cost_per_m3),
            is_recommended: (70.0..=95.0).contains(&avg_utilization),
        });
    }

    comparisons.sort_by(|a, b| {
        b.avg_utilization
            .total_cmp(&a.avg_utilization)
            .then(a.total_cost.total_cmp(&b.total_cost))
    });
    comparisons
}

/// Is `box_type` a sensible choice for contents of `weight` kg and `volume` m³?
pub fn validate_box_type_selection(
    box_type: &packing_box_type::Model,
    weight: f64,
    volume: f64,
) -> BoxTypeSelection {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if weight > box_type.max_weight {
        errors.push(format!(
            "Content weight ({}kg) exceeds box capacity ({}kg)",
            weight, box_type.max_weight
        ));
    } else if weight > box_type.max_weight * NEAR_LIMIT_RATIO {
        warnings.push("Content weight is very close to maximum capacity (>95%)".to_string());
    }

    if volume > box_type.max_volume {
        errors.push(format!(
            "Content volume ({}m³) exceeds box capacity ({}m³)",
            volume, box_type.max_volume
        ));
    } else if volume > box_type.max_volume * NEAR_LIMIT_RATIO {
        warnings.push("Content volume is very close to maximum capacity (>95%)".to_string());
    }

    let weight_utilization = percent_of(weight, box_type.max_weight);
    let volume_utilization = percent_of(volume, box_type.max_volume);
    if weight_utilization < LOW_UTILIZATION_PERCENT || volume_utilization < LOW_UTILIZATION_PERCENT
    {
        warnings.push(
            "Box utilization is low (<50%). Consider using a smaller box type.".to_string(),
        );
    }

    BoxTypeSelection {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        weight_utilization: round2(weight_utilization),
        volume_utilization: round2(volume_utilization),
    }
}

/// Service for choosing and evaluating packing box types.
#[derive(Clone)]
pub struct BoxTypeService {
    db_pool: Arc<DatabaseConnection>,
}

impl BoxTypeService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Active box types, smallest first.
    pub async fn active_box_types(&self) -> Result<Vec<packing_box_type::Model>, ServiceError> {
        Ok(packing_box_type::Entity::find()
            .filter(packing_box_type::Column::IsActive.eq(true))
            .order_by_asc(packing_box_type::Column::MaxVolume)
            .all(&*self.db_pool)
            .await?)
    }

    /// Smallest active type holding an item of the given dimensions (cm) and weight (kg).
    pub async fn suggest_box_type(
        &self,
        length: f64,
        width: f64,
        height: f64,
        weight: f64,
    ) -> Result<Option<packing_box_type::Model>, ServiceError> {
        let types = self.active_box_types().await?;
        let volume = calculate_cbm(length, width, height);
        Ok(smallest_fitting(&types, weight, volume).cloned())
    }

    /// Smallest active type holding all `lines` together.
    pub async fn suggest_box_type_for_items(
        &self,
        lines: &[CargoLine],
    ) -> Result<Option<packing_box_type::Model>, ServiceError> {
        let weight = lines.iter().fold(0.0_f64, |total, line| total + line.total_weight);
        let volume = lines.iter().fold(0.0_f64, |total, line| total + line.total_volume);
        let types = self.active_box_types().await?;
        Ok(smallest_fitting(&types, weight, volume).cloned())
    }

    pub async fn packing_efficiency(&self, box_id: Uuid) -> Result<PackingEfficiency, ServiceError> {
        let (packing_box, box_type) = packing_box::Entity::find_by_id(box_id)
            .find_also_related(packing_box_type::Entity)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Packing box {} not found", box_id)))?;
        Ok(efficiency_of(&packing_box, box_type.as_ref()))
    }

    pub async fn box_type_statistics(
        &self,
        box_type_id: Uuid,
    ) -> Result<BoxTypeStatistics, ServiceError> {
        let db = &*self.db_pool;
        let box_type = packing_box_type::Entity::find_by_id(box_type_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Box type {} not found", box_type_id)))?;
        let boxes = packing_box::Entity::find()
            .filter(packing_box::Column::PackingBoxTypeId.eq(box_type.id))
            .all(db)
            .await?;

        let mut stats = BoxTypeStatistics {
            box_type_id: box_type.id,
            total_boxes: boxes.len(),
            avg_weight_utilization: 0.0,
            avg_volume_utilization: 0.0,
            total_cost: Decimal::ZERO,
        };
        if boxes.is_empty() {
            return Ok(stats);
        }

        let (weight_sum, volume_sum) = boxes
            .iter()
            .map(|packing_box| efficiency_of(packing_box, Some(&box_type)))
            .fold((0.0, 0.0), |(w, v), e| {
                (w + e.weight_utilization, v + e.volume_utilization)
            });
        let count = boxes.len() as f64;
        stats.avg_weight_utilization = round2(weight_sum / count);
        stats.avg_volume_utilization = round2(volume_sum / count);
        stats.total_cost = Decimal::from(boxes.len() as u64) * box_type.unit_cost.unwrap_or_default();
        Ok(stats)
    }

    pub async fn compare_box_types(
        &self,
        total_weight: f64,
        total_volume: f64,
    ) -> Result<Vec<BoxTypeComparison>, ServiceError> {
        let types = self.active_box_types().await?;
        Ok(compare_for_totals(total_weight, total_volume, &types))
    }
}
