//! Dimensional math for packing and container planning.
//!
//! Everything here is pure: centimeters in, cubic meters and percentages out.
//! Fit counts use per-axis floor division with the item in its given
//! orientation; rotations are never tried.

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use strum::Display;
use uuid::Uuid;

use crate::common::{percent_of, round2, units_within};
use crate::entities::{container_type, packing_box_type, shipment_item};

/// Cubic meters for centimeter dimensions.
pub fn calculate_cbm(length: f64, width: f64, height: f64) -> f64 {
    (length / 100.0) * (width / 100.0) * (height / 100.0)
}

/// Total weight of `quantity` units, with optional packaging weight per unit.
pub fn calculate_total_weight(unit_weight: f64, quantity: i32, packaging_weight: f64) -> f64 {
    (unit_weight + packaging_weight) * f64::from(quantity)
}

/// Total volume of `quantity` units, with optional packaging volume per unit.
pub fn calculate_total_volume(unit_volume: f64, quantity: i32, packaging_volume: f64) -> f64 {
    (unit_volume + packaging_volume) * f64::from(quantity)
}

/// Physical description of one product unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProductDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// kg per unit
    pub weight: f64,
    /// m³ per unit
    pub volume: f64,
}

impl ProductDimensions {
    /// Unit volume is derived from the dimensions.
    pub fn new(length: f64, width: f64, height: f64, weight: f64) -> Self {
        Self {
            length,
            width,
            height,
            weight,
            volume: calculate_cbm(length, width, height),
        }
    }

    /// Dimensions of a shipment line, if its product snapshot carries all three axes.
    pub fn from_shipment_item(item: &shipment_item::Model) -> Option<Self> {
        match (item.unit_length, item.unit_width, item.unit_height) {
            (Some(length), Some(width), Some(height)) => Some(Self {
                length,
                width,
                height,
                weight: item.unit_weight,
                volume: item.unit_volume,
            }),
            _ => None,
        }
    }
}

/// Rectangular envelope with a weight limit: a box type or container type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Envelope {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub max_weight: f64,
}

impl Envelope {
    pub fn volume(&self) -> f64 {
        calculate_cbm(self.length, self.width, self.height)
    }
}

impl From<&packing_box_type::Model> for Envelope {
    fn from(box_type: &packing_box_type::Model) -> Self {
        Self {
            length: box_type.length,
            width: box_type.width,
            height: box_type.height,
            max_weight: box_type.max_weight,
        }
    }
}

impl From<&container_type::Model> for Envelope {
    fn from(container_type: &container_type::Model) -> Self {
        Self {
            length: container_type.length,
            width: container_type.width,
            height: container_type.height,
            max_weight: container_type.max_weight,
        }
    }
}

/// Units that fit along each axis, multiplied. Non-positive item dimensions fit nothing.
fn dimensional_fit(outer: &Envelope, length: f64, width: f64, height: f64) -> i64 {
    let axes = [
        (outer.length, length),
        (outer.width, width),
        (outer.height, height),
    ];
    axes.iter()
        .map(|&(space, size)| units_within(space, size).unwrap_or(0))
        .product()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxCapacity {
    pub max_quantity: i64,
    pub volume_utilization: f64,
    pub weight_utilization: f64,
    pub overall_utilization: f64,
}

/// How many units of `product` one box holds, limited by both geometry and weight.
pub fn calculate_box_capacity(product: &ProductDimensions, box_type: &Envelope) -> BoxCapacity {
    let by_dimensions = dimensional_fit(box_type, product.length, product.width, product.height);
    let max_quantity = match units_within(box_type.max_weight, product.weight) {
        Some(by_weight) => by_dimensions.min(by_weight),
        None => by_dimensions,
    };

    let quantity = max_quantity as f64;
    let volume_utilization = percent_of(product.volume * quantity, box_type.volume());
    let weight_utilization = percent_of(product.weight * quantity, box_type.max_weight);

    BoxCapacity {
        max_quantity,
        volume_utilization: round2(volume_utilization),
        weight_utilization: round2(weight_utilization),
        overall_utilization: round2((volume_utilization + weight_utilization) / 2.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxesNeeded {
    pub boxes_needed: i64,
    pub items_per_box: i64,
    pub last_box_quantity: i64,
    /// Boxes × the box type's weight limit
    pub total_weight: f64,
    /// Boxes × the box's cubic volume
    pub total_volume: f64,
}

/// Boxes required for `quantity` units. `None` when the product does not fit the box type.
pub fn calculate_boxes_needed(
    product: &ProductDimensions,
    box_type: &Envelope,
    quantity: i64,
) -> Option<BoxesNeeded> {
    let items_per_box = calculate_box_capacity(product, box_type).max_quantity;
    if items_per_box <= 0 {
        return None;
    }

    let boxes_needed = (quantity + items_per_box - 1) / items_per_box;
    let last_box_quantity = match quantity % items_per_box {
        0 => items_per_box,
        rest => rest,
    };

    Some(BoxesNeeded {
        boxes_needed,
        items_per_box,
        last_box_quantity,
        total_weight: boxes_needed as f64 * box_type.max_weight,
        total_volume: boxes_needed as f64 * box_type.volume(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LimitingFactor {
    Dimensions,
    Weight,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainerCapacity {
    pub max_boxes: i64,
    pub volume_utilization: f64,
    pub weight_utilization: f64,
    pub overall_utilization: f64,
    pub limiting_factor: LimitingFactor,
}

/// How many full boxes of `box_type` fit in `container_type`.
///
/// Boxes are assumed loaded to their weight limit. Ties between limits
/// resolve to dimensions, then weight, then volume.
pub fn calculate_container_capacity(
    box_type: &Envelope,
    container_type: &Envelope,
) -> ContainerCapacity {
    let by_dimensions =
        dimensional_fit(container_type, box_type.length, box_type.width, box_type.height);
    let by_weight =
        units_within(container_type.max_weight, box_type.max_weight).unwrap_or(by_dimensions);
    let box_volume = box_type.volume();
    let container_volume = container_type.volume();
    let by_volume = units_within(container_volume, box_volume).unwrap_or(0);

    let max_boxes = by_dimensions.min(by_weight).min(by_volume);
    let limiting_factor = if max_boxes == by_dimensions {
        LimitingFactor::Dimensions
    } else if max_boxes == by_weight {
        LimitingFactor::Weight
    } else {
        LimitingFactor::Volume
    };

    let boxes = max_boxes as f64;
    let volume_utilization = percent_of(box_volume * boxes, container_volume);
    let weight_utilization = percent_of(box_type.max_weight * boxes, container_type.max_weight);

    ContainerCapacity {
        max_boxes,
        volume_utilization: round2(volume_utilization),
        weight_utilization: round2(weight_utilization),
        overall_utilization: round2((volume_utilization + weight_utilization) / 2.0),
        limiting_factor,
    }
}

/// One candidate box type evaluated for a packing job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackingOption {
    pub box_type_id: Uuid,
    pub box_type_code: String,
    pub box_type_name: String,
    pub boxes_needed: i64,
    pub items_per_box: i64,
    pub total_weight: f64,
    pub total_volume: f64,
    /// Overall utilization of a full box
    pub utilization: f64,
    pub cost_estimate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalPacking {
    pub recommended: Option<PackingOption>,
    /// Up to three runners-up after the recommendation
    pub alternatives: Vec<PackingOption>,
    pub all_options: Vec<PackingOption>,
}

/// Rank candidate box types for packing `quantity` units of `product`.
///
/// Box types the product does not fit are dropped. The rest are ordered by
/// descending utilization; equal utilizations keep their input order.
pub fn calculate_optimal_packing(
    product: &ProductDimensions,
    quantity: i64,
    box_types: &[packing_box_type::Model],
) -> OptimalPacking {
    let mut options = Vec::with_capacity(box_types.len());

    for box_type in box_types {
        let envelope = Envelope::from(box_type);
        let Some(needed) = calculate_boxes_needed(product, &envelope, quantity) else {
            continue;
        };
        let capacity = calculate_box_capacity(product, &envelope);
        let unit_cost = box_type
            .unit_cost
            .and_then(|cost| cost.to_f64())
            .unwrap_or(0.0);

        options.push(PackingOption {
            box_type_id: box_type.id,
            box_type_code: box_type.code.clone(),
            box_type_name: box_type.name.clone(),
            boxes_needed: needed.boxes_needed,
            items_per_box: needed.items_per_box,
            total_weight: needed.total_weight,
            total_volume: needed.total_volume,
            utilization: capacity.overall_utilization,
            cost_estimate: needed.boxes_needed as f64 * unit_cost,
        });
    }

    options.sort_by(|a, b| b.utilization.total_cmp(&a.utilization));

    OptimalPacking {
        recommended: options.first().cloned(),
        alternatives: options.iter().skip(1).take(3).cloned().collect(),
        all_options: options,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreightClass {
    /// kg/m³, rounded to 2 decimals
    pub density: f64,
    pub class: String,
    pub description: String,
}

/// Upper density bound (exclusive), class, description.
const FREIGHT_BANDS: &[(f64, &str, &str)] = &[
    (50.0, "Class 500", "Very low density"),
    (100.0, "Class 400", "Low density"),
    (200.0, "Class 300", "Medium-low density"),
    (300.0, "Class 200", "Medium density"),
    (400.0, "Class 150", "Medium-high density"),
    (600.0, "Class 100", "High density"),
];

/// NMFC-style freight class from shipment density.
pub fn calculate_freight_class(weight: f64, volume: f64) -> FreightClass {
    if volume == 0.0 {
        return FreightClass {
            density: 0.0,
            class: "unknown".to_string(),
            description: "Invalid volume".to_string(),
        };
    }

    let density = weight / volume;
    let (class, description) = FREIGHT_BANDS
        .iter()
        .find(|(upper, _, _)| density < *upper)
        .map(|&(_, class, description)| (class, description))
        .unwrap_or(("Class 50", "Very high density"));

    FreightClass {
        density: round2(density),
        class: class.to_string(),
        description: description.to_string(),
    }
}
