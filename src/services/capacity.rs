//! Container capacity checks.
//!
//! None of these checks fail with an error: each returns a report carrying a
//! pass/fail flag plus the issues, warnings and metrics that explain it.

use serde::Serialize;
use uuid::Uuid;

use crate::common::{percent_of, round2, round4};
use crate::entities::{container_type, shipment_container, shipment_container_item};

/// Share of the weight limit above which a loaded container is unsafe.
pub const SAFE_WEIGHT_RATIO: f64 = 0.95;
const CRITICAL_RATIO: f64 = 0.95;
const HIGH_RATIO: f64 = 0.90;
const UNDERUTILIZED_PERCENT: f64 = 30.0;
const HEAVY_ITEM_FACTOR: f64 = 2.0;
const CONCENTRATION_PERCENT: f64 = 70.0;

/// Weight and volume contributed by a candidate load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CargoLine {
    pub total_weight: f64,
    pub total_volume: f64,
}

impl CargoLine {
    pub fn new(total_weight: f64, total_volume: f64) -> Self {
        Self {
            total_weight,
            total_volume,
        }
    }

    /// `quantity` units of a line with the given per-unit snapshot.
    pub fn of_units(unit_weight: f64, unit_volume: f64, quantity: i32) -> Self {
        let quantity = f64::from(quantity);
        Self::new(unit_weight * quantity, unit_volume * quantity)
    }
}

impl From<&shipment_container_item::Model> for CargoLine {
    fn from(item: &shipment_container_item::Model) -> Self {
        Self::new(item.total_weight, item.total_volume)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitBreach {
    pub message: String,
    pub current: f64,
    pub additional: f64,
    pub new_total: f64,
    pub limit: f64,
    pub excess: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapacityIssue {
    WeightExceeded(LimitBreach),
    VolumeExceeded(LimitBreach),
    SafetyWeightExceeded {
        message: String,
        current: f64,
        safe_limit: f64,
        max_limit: f64,
    },
    Underutilized {
        message: String,
        utilization: f64,
        recommendation: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapacityWarning {
    WeightCritical { message: String, utilization: f64 },
    WeightHigh { message: String, utilization: f64 },
    VolumeCritical { message: String, utilization: f64 },
    VolumeHigh { message: String, utilization: f64 },
    UnbalancedWeight {
        message: String,
        heavy_items: Vec<Uuid>,
        recommendation: String,
    },
    WeightConcentration {
        message: String,
        concentration: f64,
        recommendation: String,
    },
}

/// Usage of one dimension (weight or volume) after a proposed load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionMetrics {
    pub current: f64,
    pub additional: f64,
    pub new_total: f64,
    pub limit: f64,
    /// `new_total / limit * 100`, rounded to 2 decimals
    pub utilization: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitMetrics {
    pub weight: DimensionMetrics,
    pub volume: DimensionMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub can_fit: bool,
    pub issues: Vec<CapacityIssue>,
    pub warnings: Vec<CapacityWarning>,
    pub metrics: FitMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    pub is_balanced: bool,
    pub warnings: Vec<CapacityWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyReport {
    pub is_safe: bool,
    pub issues: Vec<CapacityIssue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightVolume {
    pub weight: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizationSuggestion {
    AddMoreItems {
        priority: Priority,
        message: String,
        remaining_capacity: WeightVolume,
    },
    DownsizeContainer {
        priority: Priority,
        message: String,
        current_utilization: WeightVolume,
    },
    SplitContainer {
        priority: Priority,
        message: String,
        current_utilization: WeightVolume,
    },
    Rebalance {
        priority: Priority,
        message: String,
        details: Vec<CapacityWarning>,
    },
}

#[derive(Clone, Copy)]
enum Dimension {
    Weight,
    Volume,
}

impl Dimension {
    fn unit(self) -> &'static str {
        match self {
            Dimension::Weight => "kg",
            Dimension::Volume => "m³",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Dimension::Weight => "Weight",
            Dimension::Volume => "Volume",
        }
    }
}

fn dimension_metrics(current: f64, additional: f64, limit: f64) -> DimensionMetrics {
    let new_total = current + additional;
    DimensionMetrics {
        current,
        additional,
        new_total,
        limit,
        utilization: round2(percent_of(new_total, limit)),
        remaining: limit - new_total,
    }
}

/// Threshold checks for one dimension; at most one of issue or warning is produced.
fn check_dimension(
    dimension: Dimension,
    metrics: &DimensionMetrics,
    issues: &mut Vec<CapacityIssue>,
    warnings: &mut Vec<CapacityWarning>,
) -> bool {
    let unit = dimension.unit();
    let label = dimension.label();
    let new_total = metrics.new_total;
    let limit = metrics.limit;

    if new_total > limit {
        let breach = LimitBreach {
            message: format!(
                "{} limit exceeded: {}{} > {}{}",
                label, new_total, unit, limit, unit
            ),
            current: metrics.current,
            additional: metrics.additional,
            new_total,
            limit,
            excess: new_total - limit,
        };
        issues.push(match dimension {
            Dimension::Weight => CapacityIssue::WeightExceeded(breach),
            Dimension::Volume => CapacityIssue::VolumeExceeded(breach),
        });
        return false;
    }

    let utilization = metrics.utilization;
    if new_total >= limit * CRITICAL_RATIO {
        let message = format!(
            "{} capacity critical: {}{} (95%+ of limit)",
            label, new_total, unit
        );
        warnings.push(match dimension {
            Dimension::Weight => CapacityWarning::WeightCritical {
                message,
                utilization,
            },
            Dimension::Volume => CapacityWarning::VolumeCritical {
                message,
                utilization,
            },
        });
    } else if new_total >= limit * HIGH_RATIO {
        let message = format!("{} capacity high: {}{} (90%+ of limit)", label, new_total, unit);
        warnings.push(match dimension {
            Dimension::Weight => CapacityWarning::WeightHigh {
                message,
                utilization,
            },
            Dimension::Volume => CapacityWarning::VolumeHigh {
                message,
                utilization,
            },
        });
    }
    true
}

/// Would `items` fit into `container` on top of what it already holds?
///
/// Limits come from the container type: its weight rating and the cubic
/// volume of its internal dimensions.
pub fn validate_items_fit(
    container: &shipment_container::Model,
    container_type: &container_type::Model,
    items: &[CargoLine],
) -> FitReport {
    let additional_weight = items.iter().fold(0.0_f64, |total, item| total + item.total_weight);
    let additional_volume = items.iter().fold(0.0_f64, |total, item| total + item.total_volume);

    let metrics = FitMetrics {
        weight: dimension_metrics(
            container.current_weight,
            additional_weight,
            container_type.max_weight,
        ),
        volume: dimension_metrics(
            container.current_volume,
            additional_volume,
            container_type.max_volume(),
        ),
    };

    let mut issues = Vec::new();
    let mut warnings = Vec::new();
    let weight_fits = check_dimension(Dimension::Weight, &metrics.weight, &mut issues, &mut warnings);
    let volume_fits = check_dimension(Dimension::Volume, &metrics.volume, &mut issues, &mut warnings);

    FitReport {
        can_fit: weight_fits && volume_fits,
        issues,
        warnings,
        metrics,
    }
}

/// Weight distribution across the lines loaded in one container.
pub fn validate_balance(items: &[shipment_container_item::Model]) -> BalanceReport {
    let mut report = BalanceReport {
        is_balanced: true,
        warnings: Vec::new(),
    };
    if items.is_empty() {
        return report;
    }

    let total_weight: f64 = items.iter().map(|item| item.total_weight).sum();
    let average_weight = total_weight / items.len() as f64;

    let heavy_items: Vec<Uuid> = items
        .iter()
        .filter(|item| item.total_weight > average_weight * HEAVY_ITEM_FACTOR)
        .map(|item| item.id)
        .collect();

    if !heavy_items.is_empty() {
        report.warnings.push(CapacityWarning::UnbalancedWeight {
            message: format!(
                "Container has {} items significantly heavier than average",
                heavy_items.len()
            ),
            heavy_items,
            recommendation: "Consider distributing heavy items across multiple containers"
                .to_string(),
        });
    }

    let mut weights: Vec<f64> = items.iter().map(|item| item.total_weight).collect();
    weights.sort_by(|a, b| b.total_cmp(a));
    let top_weight: f64 = weights.iter().take(3).sum();
    let concentration = percent_of(top_weight, total_weight);

    if concentration > CONCENTRATION_PERCENT {
        report.is_balanced = false;
        report.warnings.push(CapacityWarning::WeightConcentration {
            message: format!(
                "Top 3 items account for {}% of total weight",
                round2(concentration)
            ),
            concentration: round2(concentration),
            recommendation: "Redistribute items for better balance".to_string(),
        });
    }

    report
}

/// Safety margin and waste check for a container's current load.
pub fn validate_safety_limits(
    container: &shipment_container::Model,
    container_type: &container_type::Model,
    item_count: usize,
) -> SafetyReport {
    let mut report = SafetyReport {
        is_safe: true,
        issues: Vec::new(),
    };

    let safe_limit = container_type.max_weight * SAFE_WEIGHT_RATIO;
    if container.current_weight > safe_limit {
        report.is_safe = false;
        report.issues.push(CapacityIssue::SafetyWeightExceeded {
            message: "Container weight exceeds safe limit (95% of maximum)".to_string(),
            current: container.current_weight,
            safe_limit,
            max_limit: container_type.max_weight,
        });
    }

    let utilization = percent_of(container.current_weight, container_type.max_weight);
    if utilization < UNDERUTILIZED_PERCENT && item_count > 0 {
        report.issues.push(CapacityIssue::Underutilized {
            message: format!(
                "Container is significantly underutilized ({}%)",
                round2(utilization)
            ),
            utilization: round2(utilization),
            recommendation: "Consider consolidating with other containers".to_string(),
        });
    }

    report
}

/// Advisory actions for a container given its current load and contents.
pub fn optimization_suggestions(
    container: &shipment_container::Model,
    container_type: &container_type::Model,
    items: &[shipment_container_item::Model],
) -> Vec<OptimizationSuggestion> {
    let max_weight = container_type.max_weight;
    let max_volume = container_type.max_volume();
    let weight_utilization = percent_of(container.current_weight, max_weight);
    let volume_utilization = percent_of(container.current_volume, max_volume);
    let current_utilization = WeightVolume {
        weight: round2(weight_utilization),
        volume: round2(volume_utilization),
    };

    let mut suggestions = Vec::new();

    if weight_utilization < 70.0 && volume_utilization < 70.0 {
        suggestions.push(OptimizationSuggestion::AddMoreItems {
            priority: Priority::High,
            message: "Container can accommodate more items".to_string(),
            remaining_capacity: WeightVolume {
                weight: round2(max_weight - container.current_weight),
                volume: round4(max_volume - container.current_volume),
            },
        });
    }

    if weight_utilization < 50.0 && volume_utilization < 50.0 {
        suggestions.push(OptimizationSuggestion::DownsizeContainer {
            priority: Priority::Medium,
            message: "Consider using a smaller container type".to_string(),
            current_utilization,
        });
    }

    if weight_utilization > 95.0 || volume_utilization > 95.0 {
        suggestions.push(OptimizationSuggestion::SplitContainer {
            priority: Priority::High,
            message: "Container is at capacity - consider splitting into multiple containers"
                .to_string(),
            current_utilization,
        });
    }

    let balance = validate_balance(items);
    if !balance.is_balanced {
        suggestions.push(OptimizationSuggestion::Rebalance {
            priority: Priority::Medium,
            message: "Container weight distribution should be rebalanced".to_string(),
            details: balance.warnings,
        });
    }

    suggestions
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn critical_weight_still_fits() {
        let kind = container_type(1000.0);
        let container = container(&kind, 800.0, 0.0);

        let report = validate_items_fit(&container, &kind, &[CargoLine::new(150.0, 0.1)]);

        assert!(report.can_fit);
        assert!(report.issues.is_empty());
        assert_matches!(
            report.warnings.as_slice(),
            [CapacityWarning::WeightCritical { utilization, .. }] if *utilization == 95.0
        );
        assert_eq!(report.metrics.weight.new_total, 950.0);
        assert_eq!(report.metrics.weight.remaining, 50.0);
    }

    #[test]
    fn high_weight_warns_below_critical() {
        let kind = container_type(1000.0);
        let container = container(&kind, 850.0, 0.0);

        let report = validate_items_fit(&container, &kind, &[CargoLine::new(60.0, 0.0)]);
        assert!(report.can_fit);
        assert_matches!(report.warnings.as_slice(), [CapacityWarning::WeightHigh { .. }]);
    }

    #[test]
    fn exceeding_weight_reports_excess() {
        let kind = container_type(1000.0);
        let container = container(&kind, 900.0, 0.2);

        let report = validate_items_fit(
            &container,
            &kind,
            &[CargoLine::new(80.0, 0.1), CargoLine::new(70.0, 0.1)],
        );

        assert!(!report.can_fit);
        let breach = assert_matches!(
            report.issues.as_slice(),
            [CapacityIssue::WeightExceeded(breach)] => breach
        );
        assert_eq!(breach.additional, 150.0);
        assert_eq!(breach.new_total, 1050.0);
        assert_eq!(breach.excess, 50.0);
        assert_eq!(breach.message, "Weight limit exceeded: 1050kg > 1000kg");
        // weight breach does not suppress volume metrics
        assert_eq!(report.metrics.weight.utilization, 105.0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn volume_is_checked_independently() {
        let kind = container_type(10_000.0);
        let container = container(&kind, 100.0, 0.5);

        let report = validate_items_fit(&container, &kind, &[CargoLine::new(10.0, 0.6)]);

        assert!(!report.can_fit);
        assert_matches!(report.issues.as_slice(), [CapacityIssue::VolumeExceeded(_)]);
    }

    #[test]
    fn both_dimensions_can_warn_at_once() {
        let kind = container_type(1000.0);
        let container = container(&kind, 0.0, 0.0);

        let report = validate_items_fit(&container, &kind, &[CargoLine::new(960.0, 0.91)]);
        assert!(report.can_fit);
        assert_eq!(report.warnings.len(), 2);
        assert_matches!(report.warnings[0], CapacityWarning::WeightCritical { .. });
        assert_matches!(report.warnings[1], CapacityWarning::VolumeHigh { .. });
    }

    #[test]
    fn no_new_items_report_positive_zero_additions() {
        let kind = container_type(1000.0);
        let container = container(&kind, 400.0, 0.3);
        let report = validate_items_fit(&container, &kind, &[]);

        assert!(report.can_fit);
        assert!(report.metrics.weight.additional.is_sign_positive());
        assert!(report.metrics.volume.additional.is_sign_positive());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metrics"]["weight"]["additional"].to_string(), "0.0");
    }

    #[test]
    fn empty_container_is_balanced() {
        let report = validate_balance(&[]);
        assert!(report.is_balanced);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn few_items_are_always_concentrated() {
        // with three or fewer lines the top three carry all the weight
        let container_id = Uuid::new_v4();
        let items = vec![
            loaded_item(container_id, 100.0),
            loaded_item(container_id, 100.0),
        ];
        let report = validate_balance(&items);
        assert!(!report.is_balanced);
        assert_matches!(
            report.warnings.as_slice(),
            [CapacityWarning::WeightConcentration { concentration, .. }] if *concentration == 100.0
        );
    }

    #[test]
    fn heavy_outlier_is_flagged_without_unbalancing_evenly_spread_load() {
        let container_id = Uuid::new_v4();
        let mut items: Vec<_> = (0..9).map(|_| loaded_item(container_id, 10.0)).collect();
        let heavy = loaded_item(container_id, 40.0);
        let heavy_id = heavy.id;
        items.push(heavy);

        let report = validate_balance(&items);

        // total 130, mean 13, top three 60 -> 46%
        assert!(report.is_balanced);
        assert_matches!(
            report.warnings.as_slice(),
            [CapacityWarning::UnbalancedWeight { heavy_items, .. }] if heavy_items == &vec![heavy_id]
        );
    }

    #[test]
    fn safety_limit_fails_above_ninety_five_percent() {
        let kind = container_type(1000.0);
        let report = validate_safety_limits(&container(&kind, 960.0, 0.5), &kind, 4);

        assert!(!report.is_safe);
        assert_matches!(
            report.issues.as_slice(),
            [CapacityIssue::SafetyWeightExceeded { safe_limit, .. }] if *safe_limit == 950.0
        );
    }

    #[test]
    fn underutilization_is_reported_but_safe() {
        let kind = container_type(1000.0);

        let loaded = validate_safety_limits(&container(&kind, 200.0, 0.1), &kind, 3);
        assert!(loaded.is_safe);
        assert_matches!(loaded.issues.as_slice(), [CapacityIssue::Underutilized { utilization, .. }] if *utilization == 20.0);

        let empty = validate_safety_limits(&container(&kind, 0.0, 0.0), &kind, 0);
        assert!(empty.is_safe);
        assert!(empty.issues.is_empty());
    }

    #[test]
    fn light_container_gets_growth_and_downsize_suggestions() {
        let kind = container_type(1000.0);
        let container = container(&kind, 100.0, 0.1);
        let items: Vec<_> = (0..5).map(|_| loaded_item(container.id, 20.0)).collect();

        let suggestions = optimization_suggestions(&container, &kind, &items);

        assert_eq!(suggestions.len(), 2);
        assert_matches!(
            &suggestions[0],
            OptimizationSuggestion::AddMoreItems { priority: Priority::High, remaining_capacity, .. }
                if remaining_capacity.weight == 900.0 && remaining_capacity.volume == 0.9
        );
        assert_matches!(
            &suggestions[1],
            OptimizationSuggestion::DownsizeContainer { priority: Priority::Medium, .. }
        );
    }

    #[test]
    fn full_and_concentrated_container_gets_split_and_rebalance() {
        let kind = container_type(1000.0);
        let container = container(&kind, 980.0, 0.5);
        let items = vec![loaded_item(container.id, 900.0), loaded_item(container.id, 80.0)];

        let suggestions = optimization_suggestions(&container, &kind, &items);

        assert_matches!(
            suggestions.as_slice(),
            [
                OptimizationSuggestion::SplitContainer { .. },
                OptimizationSuggestion::Rebalance { .. }
            ]
        );
    }

    #[test]
    fn issues_serialize_with_type_tag() {
        let kind = container_type(1000.0);
        let report = validate_items_fit(&container(&kind, 990.0, 0.0), &kind, &[CargoLine::new(20.0, 0.0)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["issues"][0]["type"], "weight_exceeded");
        assert_eq!(json["metrics"]["weight"]["limit"], 1000.0);
    }
}
