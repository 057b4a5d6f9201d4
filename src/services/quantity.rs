//! Quantity and readiness checks that report instead of failing.
//!
//! Callers that need a hard stop turn an invalid result into a
//! [`ServiceError`](crate::errors::ServiceError) themselves.

use serde::Serialize;
use uuid::Uuid;

use crate::entities::packing_box::{self, BoxStatus};
use crate::entities::shipment;
use crate::entities::shipment_item::{self, ItemPackingStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackingQuantityCheck {
    pub valid: bool,
    pub errors: Vec<String>,
    pub available_quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SealCheck {
    pub valid: bool,
    pub errors: Vec<String>,
    pub can_seal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationCheck {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub can_confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReadiness {
    pub item_id: Uuid,
    pub product_name: String,
    pub quantity_to_ship: i32,
    pub quantity_packed: i32,
    pub packing_status: ItemPackingStatus,
    pub is_fully_packed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxReadiness {
    pub box_id: Uuid,
    pub box_number: i32,
    pub total_items: i32,
    pub total_quantity: i32,
    pub packing_status: BoxStatus,
    pub can_seal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessCounts {
    pub total_items: usize,
    pub fully_packed_items: usize,
    pub total_boxes: usize,
    pub sealed_boxes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipmentValidationSummary {
    pub shipment_id: Uuid,
    pub can_confirm: bool,
    pub confirmation_errors: Vec<String>,
    pub confirmation_warnings: Vec<String>,
    pub items: Vec<ItemReadiness>,
    pub boxes: Vec<BoxReadiness>,
    pub summary: ReadinessCounts,
}

/// Can `quantity` more units of `item` go into boxes?
pub fn validate_packing_quantity(
    item: &shipment_item::Model,
    quantity: i32,
) -> PackingQuantityCheck {
    let mut errors = Vec::new();
    let available = item.quantity_to_ship - item.quantity_packed;

    if quantity <= 0 {
        errors.push("Quantity must be greater than 0".to_string());
    }

    if i64::from(item.quantity_packed) + i64::from(quantity) > i64::from(item.quantity_to_ship) {
        errors.push(format!(
            "Cannot pack {} units. Only {} remaining (to ship: {}, already packed: {})",
            quantity, available, item.quantity_to_ship, item.quantity_packed
        ));
    }

    PackingQuantityCheck {
        valid: errors.is_empty(),
        errors,
        available_quantity: available,
    }
}

pub fn validate_box_for_sealing(packing_box: &packing_box::Model) -> SealCheck {
    let mut errors = Vec::new();

    if packing_box.total_quantity <= 0 {
        errors.push("Box must have at least one item before sealing".to_string());
    }
    if packing_box.packing_status != BoxStatus::Packing {
        errors.push(format!(
            "Box must be in \"packing\" status to be sealed (current: {})",
            packing_box.packing_status
        ));
    }
    if packing_box.packing_status == BoxStatus::Sealed {
        errors.push("Box is already sealed".to_string());
    }

    SealCheck {
        valid: errors.is_empty(),
        can_seal: errors.is_empty(),
        errors,
    }
}

/// Readiness of a shipment for confirmation.
///
/// Packing completeness is only enforced once the shipment uses boxes at all.
pub fn validate_shipment_for_confirmation(
    shipment: &shipment::Model,
    items: &[shipment_item::Model],
    box_count: usize,
) -> ConfirmationCheck {
    let mut errors = Vec::new();

    if items.is_empty() {
        errors.push("Shipment must have at least one item".to_string());
    }

    if box_count > 0 {
        let unpacked: Vec<&shipment_item::Model> =
            items.iter().filter(|item| !item.is_fully_packed()).collect();
        if !unpacked.is_empty() {
            errors.push(format!(
                "{} item(s) are not fully packed. All items must be packed before confirmation.",
                unpacked.len()
            ));
            for item in unpacked {
                errors.push(format!(
                    "  - {}: {}/{} packed",
                    item.product_name, item.quantity_packed, item.quantity_to_ship
                ));
            }
        }
    }

    if !shipment.status.can_confirm() {
        errors.push(format!(
            "Shipment cannot be confirmed in \"{}\" status",
            shipment.status
        ));
    }

    if shipment.confirmed_at.is_some() {
        errors.push("Shipment is already confirmed".to_string());
    }

    ConfirmationCheck {
        valid: errors.is_empty(),
        can_confirm: errors.is_empty(),
        errors,
        warnings: Vec::new(),
    }
}

pub fn shipment_validation_summary(
    shipment: &shipment::Model,
    items: &[shipment_item::Model],
    boxes: &[packing_box::Model],
) -> ShipmentValidationSummary {
    let confirmation = validate_shipment_for_confirmation(shipment, items, boxes.len());

    let items: Vec<ItemReadiness> = items
        .iter()
        .map(|item| ItemReadiness {
            item_id: item.id,
            product_name: item.product_name.clone(),
            quantity_to_ship: item.quantity_to_ship,
            quantity_packed: item.quantity_packed,
            packing_status: item.packing_status,
            is_fully_packed: item.is_fully_packed(),
        })
        .collect();

    let boxes: Vec<BoxReadiness> = boxes
        .iter()
        .map(|packing_box| BoxReadiness {
            box_id: packing_box.id,
            box_number: packing_box.box_number,
            total_items: packing_box.total_items,
            total_quantity: packing_box.total_quantity,
            packing_status: packing_box.packing_status,
            can_seal: validate_box_for_sealing(packing_box).can_seal,
        })
        .collect();

    let summary = ReadinessCounts {
        total_items: items.len(),
        fully_packed_items: items.iter().filter(|item| item.is_fully_packed).count(),
        total_boxes: boxes.len(),
        sealed_boxes: boxes
            .iter()
            .filter(|b| b.packing_status == BoxStatus::Sealed)
            .count(),
    };

    ShipmentValidationSummary {
        shipment_id: shipment.id,
        can_confirm: confirmation.can_confirm,
        confirmation_errors: confirmation.errors,
        confirmation_warnings: confirmation.warnings,
        items,
        boxes,
        summary,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::entities::packing_box::BoxKind;
    use crate::entities::shipment::ShipmentStatus;
    use chrono::Utc;

    pub fn shipment(status: ShipmentStatus) -> shipment::Model {
        shipment::Model {
            id: Uuid::new_v4(),
            shipment_number: "SHP-0001".to_string(),
            status,
            notes: None,
            confirmed_at: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn item(quantity_to_ship: i32, quantity_packed: i32) -> shipment_item::Model {
        shipment_item::Model {
            id: Uuid::new_v4(),
            shipment_id: Uuid::new_v4(),
            product_name: "Widget".to_string(),
            product_sku: Some("WID-1".to_string()),
            unit_weight: 2.0,
            unit_volume: 0.01,
            unit_length: None,
            unit_width: None,
            unit_height: None,
            quantity_to_ship,
            quantity_packed,
            quantity_remaining: quantity_to_ship - quantity_packed,
            packing_status: ItemPackingStatus::for_quantities(quantity_packed, quantity_to_ship),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn packing_box(status: BoxStatus, total_quantity: i32) -> packing_box::Model {
        packing_box::Model {
            id: Uuid::new_v4(),
            shipment_id: Uuid::new_v4(),
            shipment_container_id: None,
            packing_box_type_id: None,
            box_number: 1,
            box_label: packing_box::default_box_label(1),
            box_kind: BoxKind::Carton,
            length: None,
            width: None,
            height: None,
            gross_weight: None,
            net_weight: 0.0,
            volume: None,
            total_items: i32::from(total_quantity > 0),
            total_quantity,
            packing_status: status,
            sealed_at: None,
            sealed_by: None,
            notes: None,
            contents_description: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}
