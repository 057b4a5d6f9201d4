mod common;

use assert_matches::assert_matches;
use common::TestEnv;
use shipment_capacity::{
    entities::{
        packing_box::{BoxKind, BoxStatus},
        shipment::ShipmentStatus,
        shipment_item::ItemPackingStatus,
    },
    services::packing::{NewPackingBox, UpdatePackingBox},
    ServiceError,
};

#[tokio::test]
async fn manual_packing_tracks_item_and_box_counters() {
    let env = TestEnv::new().await;
    let packing = &env.services.packing;
    let shipment = env.shipment("SHP-1001").await;
    let lamp = env.item(shipment.id, "Desk lamp", 2.0, 0.01, 100).await;

    let packing_box = packing
        .create_box(shipment.id, NewPackingBox::default(), &env.ctx)
        .await
        .expect("create box");
    assert_eq!(packing_box.box_number, 1);
    assert_eq!(packing_box.box_label, "BOX-001");
    assert_eq!(packing_box.box_kind, BoxKind::Carton);
    assert_eq!(packing_box.packing_status, BoxStatus::Empty);
    assert_eq!(packing_box.created_by, Some(env.actor));

    let row = packing
        .add_item_to_box(packing_box.id, lamp.id, 60, &env.ctx)
        .await
        .expect("pack 60");
    assert_eq!(row.quantity, 60);

    let lamp_now = env.item_state(lamp.id).await;
    assert_eq!(lamp_now.quantity_packed, 60);
    assert_eq!(lamp_now.quantity_remaining, 40);
    assert_eq!(lamp_now.packing_status, ItemPackingStatus::PartiallyPacked);

    let err = packing
        .add_item_to_box(packing_box.id, lamp.id, 45, &env.ctx)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) => {
        assert_eq!(msg, "Cannot pack 45 units. Only 40 remaining for Desk lamp");
    });

    // adding the same item again merges into the existing row
    let merged = packing
        .add_item_to_box(packing_box.id, lamp.id, 40, &env.ctx)
        .await
        .expect("pack the rest");
    assert_eq!(merged.id, row.id);
    assert_eq!(merged.quantity, 100);

    let packed_box = packing.get_box(packing_box.id).await.unwrap();
    assert_eq!(packed_box.packing_status, BoxStatus::Packing);
    assert_eq!(packed_box.total_items, 1);
    assert_eq!(packed_box.total_quantity, 100);
    assert!((packed_box.net_weight - 200.0).abs() < 1e-9);
    assert_eq!(
        env.item_state(lamp.id).await.packing_status,
        ItemPackingStatus::FullyPacked
    );

    packing
        .update_item_quantity(row.id, 70, &env.ctx)
        .await
        .expect("shrink row");
    assert_eq!(env.item_state(lamp.id).await.quantity_remaining, 30);

    let emptied = packing
        .remove_item_from_box(row.id, &env.ctx)
        .await
        .expect("remove row");
    assert_eq!(emptied.packing_status, BoxStatus::Empty);
    assert_eq!(emptied.total_quantity, 0);
    assert_eq!(emptied.net_weight, 0.0);

    let lamp_now = env.item_state(lamp.id).await;
    assert_eq!(lamp_now.quantity_packed, 0);
    assert_eq!(lamp_now.packing_status, ItemPackingStatus::Unpacked);
}

#[tokio::test]
async fn sealed_boxes_reject_changes_until_unsealed() {
    let env = TestEnv::new().await;
    let packing = &env.services.packing;
    let shipment = env.shipment("SHP-1002").await;
    let mug = env.item(shipment.id, "Mug", 0.4, 0.002, 10).await;

    let packing_box = packing
        .create_box(shipment.id, NewPackingBox::default(), &env.ctx)
        .await
        .unwrap();

    let err = packing.seal_box(packing_box.id, &env.ctx).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(msg) => {
        assert_eq!(msg, "Box cannot be sealed. It must be in packing status and have items.");
    });

    let row = packing
        .add_item_to_box(packing_box.id, mug.id, 4, &env.ctx)
        .await
        .unwrap();
    let sealed = packing.seal_box(packing_box.id, &env.ctx).await.unwrap();
    assert_eq!(sealed.packing_status, BoxStatus::Sealed);
    assert_eq!(sealed.sealed_by, Some(env.actor));
    assert_eq!(sealed.sealed_at, Some(env.ctx.now()));

    assert_matches!(
        packing.add_item_to_box(packing_box.id, mug.id, 1, &env.ctx).await,
        Err(ServiceError::InvalidOperation(msg)) if msg == "Cannot add items to a sealed box"
    );
    assert_matches!(
        packing.update_item_quantity(row.id, 5, &env.ctx).await,
        Err(ServiceError::InvalidOperation(msg)) if msg == "Cannot update items in a sealed box"
    );
    assert_matches!(
        packing.remove_item_from_box(row.id, &env.ctx).await,
        Err(ServiceError::InvalidOperation(msg)) if msg == "Cannot remove items from a sealed box"
    );
    assert_matches!(
        packing
            .update_box(packing_box.id, UpdatePackingBox::default(), &env.ctx)
            .await,
        Err(ServiceError::InvalidOperation(msg)) if msg == "Cannot update a sealed box"
    );
    assert_matches!(
        packing.delete_box(packing_box.id).await,
        Err(ServiceError::InvalidOperation(msg)) if msg == "Cannot delete a sealed box"
    );

    let unsealed = packing.unseal_box(packing_box.id, &env.ctx).await.unwrap();
    assert_eq!(unsealed.packing_status, BoxStatus::Packing);
    assert!(unsealed.sealed_at.is_none());
    assert!(unsealed.sealed_by.is_none());

    assert_matches!(
        packing.unseal_box(packing_box.id, &env.ctx).await,
        Err(ServiceError::InvalidOperation(msg)) if msg == "Box is not sealed"
    );
    assert_matches!(
        packing.delete_box(packing_box.id).await,
        Err(ServiceError::InvalidOperation(msg))
            if msg == "Cannot delete a box with items. Remove items first."
    );

    packing.seal_box(packing_box.id, &env.ctx).await.unwrap();
    let shipped = packing.mark_shipped(packing_box.id, &env.ctx).await.unwrap();
    assert_eq!(shipped.packing_status, BoxStatus::Shipped);
    assert_matches!(
        packing.unseal_box(packing_box.id, &env.ctx).await,
        Err(ServiceError::InvalidOperation(_))
    );
}

#[tokio::test]
async fn box_dimensions_define_volume_and_update_recomputes_it() {
    let env = TestEnv::new().await;
    let packing = &env.services.packing;
    let shipment = env.shipment("SHP-1003").await;

    let packing_box = packing
        .create_box(
            shipment.id,
            NewPackingBox {
                box_kind: Some(BoxKind::Crate),
                box_label: Some("FRAGILE-1".to_string()),
                length: Some(100.0),
                width: Some(50.0),
                height: Some(20.0),
                ..Default::default()
            },
            &env.ctx,
        )
        .await
        .unwrap();
    assert_eq!(packing_box.box_kind, BoxKind::Crate);
    assert_eq!(packing_box.box_label, "FRAGILE-1");
    assert_eq!(packing_box.volume, Some(0.1));

    let updated = packing
        .update_box(
            packing_box.id,
            UpdatePackingBox {
                height: Some(40.0),
                ..Default::default()
            },
            &env.ctx,
        )
        .await
        .unwrap();
    assert_eq!(updated.volume, Some(0.2));
    assert_eq!(updated.box_label, "FRAGILE-1");

    let second = packing
        .create_box(shipment.id, NewPackingBox::default(), &env.ctx)
        .await
        .unwrap();
    assert_eq!(second.box_number, 2);
    assert!(second.volume.is_none());

    packing.delete_box(second.id).await.expect("empty box deletes");
    assert_eq!(packing.count_boxes(shipment.id).await.unwrap(), 1);
}

#[tokio::test]
async fn auto_pack_deals_chunks_round_robin_and_enables_confirmation() {
    let env = TestEnv::new().await;
    let packing = &env.services.packing;
    let shipment = env.shipment("SHP-1004").await;
    let chairs = env.item(shipment.id, "A chair", 7.5, 0.25, 10).await;
    let tables = env.item(shipment.id, "B table", 20.0, 0.6, 5).await;

    assert_matches!(
        packing.auto_pack_items(shipment.id, 0, &env.ctx).await,
        Err(ServiceError::ValidationError(msg)) if msg == "Number of boxes must be greater than 0"
    );

    let result = packing
        .auto_pack_items(shipment.id, 3, &env.ctx)
        .await
        .expect("auto-pack");
    assert_eq!(result.boxes_used, 3);
    assert_eq!(result.items_packed, 2);

    // chairs: 4, 4, 2 over boxes 1..3; tables continue at box 1: 2, 2, 1
    let quantities: Vec<i32> = result.boxes.iter().map(|b| b.total_quantity).collect();
    assert_eq!(quantities, vec![6, 6, 3]);
    let numbers: Vec<i32> = result.boxes.iter().map(|b| b.box_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(result
        .boxes
        .iter()
        .all(|b| b.packing_status == BoxStatus::Packing));

    assert!(env.item_state(chairs.id).await.is_fully_packed());
    assert!(env.item_state(tables.id).await.is_fully_packed());
    assert!(packing
        .validate_all_items_packed(shipment.id)
        .await
        .unwrap()
        .is_empty());

    let summary = packing.packing_summary(shipment.id).await.unwrap();
    assert_eq!(summary.total_boxes, 3);
    assert_eq!(summary.fully_packed_items, 2);
    assert_eq!(summary.packed_quantity, 15);
    assert_eq!(summary.remaining_quantity, 0);
    assert!(summary.packing_complete);

    assert_matches!(
        packing.auto_pack_items(shipment.id, 3, &env.ctx).await,
        Err(ServiceError::NothingToProcess(msg)) if msg == "No items to pack"
    );

    let confirmed = env
        .services
        .shipments
        .confirm_shipment(shipment.id, &env.ctx)
        .await
        .expect("confirm");
    assert_eq!(confirmed.status, ShipmentStatus::Confirmed);
    assert_eq!(confirmed.confirmed_at, Some(env.ctx.now()));
}

#[tokio::test]
async fn auto_pack_reuses_open_boxes_and_skips_sealed_ones() {
    let env = TestEnv::new().await;
    let packing = &env.services.packing;
    let shipment = env.shipment("SHP-1005").await;
    let books = env.item(shipment.id, "Books", 1.0, 0.002, 12).await;

    let sealed = packing
        .create_box(shipment.id, NewPackingBox::default(), &env.ctx)
        .await
        .unwrap();
    packing
        .add_item_to_box(sealed.id, books.id, 2, &env.ctx)
        .await
        .unwrap();
    packing.seal_box(sealed.id, &env.ctx).await.unwrap();
    let open = packing
        .create_box(shipment.id, NewPackingBox::default(), &env.ctx)
        .await
        .unwrap();

    let result = packing
        .auto_pack_items(shipment.id, 2, &env.ctx)
        .await
        .unwrap();
    let ids: Vec<_> = result.boxes.iter().map(|b| b.id).collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], open.id);
    assert!(!ids.contains(&sealed.id));
    assert_eq!(result.boxes[0].total_quantity, 5);
    assert_eq!(result.boxes[1].total_quantity, 5);
    assert_eq!(packing.count_boxes(shipment.id).await.unwrap(), 3);
}

#[tokio::test]
async fn unpacked_items_block_confirmation_once_boxes_exist() {
    let env = TestEnv::new().await;
    let packing = &env.services.packing;
    let shipment = env.shipment("SHP-1006").await;
    let item = env.item(shipment.id, "Vase", 3.0, 0.02, 8).await;

    let packing_box = packing
        .create_box(shipment.id, NewPackingBox::default(), &env.ctx)
        .await
        .unwrap();
    packing
        .add_item_to_box(packing_box.id, item.id, 5, &env.ctx)
        .await
        .unwrap();

    let err = env
        .services
        .shipments
        .confirm_shipment(shipment.id, &env.ctx)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) => {
        assert!(msg.contains("1 item(s) are not fully packed"));
        assert!(msg.contains("  - Vase: 5/8 packed"));
    });

    let unpacked = packing.validate_all_items_packed(shipment.id).await.unwrap();
    assert_eq!(unpacked.len(), 1);
    assert_eq!(unpacked[0].quantity_remaining, 3);
}

#[tokio::test]
async fn clear_all_packing_resets_boxes_and_items() {
    let env = TestEnv::new().await;
    let packing = &env.services.packing;
    let shipment = env.shipment("SHP-1007").await;
    let item = env.item(shipment.id, "Plates", 0.5, 0.001, 20).await;

    let result = packing
        .auto_pack_items(shipment.id, 2, &env.ctx)
        .await
        .unwrap();
    packing.seal_box(result.boxes[0].id, &env.ctx).await.unwrap();

    packing
        .clear_all_packing(shipment.id, &env.ctx)
        .await
        .expect("clear");

    for packing_box in packing.list_boxes(shipment.id).await.unwrap() {
        assert_eq!(packing_box.packing_status, BoxStatus::Empty);
        assert_eq!(packing_box.total_quantity, 0);
        assert!(packing_box.sealed_at.is_none());
        assert!(packing.box_items(packing_box.id).await.unwrap().is_empty());
    }
    let item = env.item_state(item.id).await;
    assert_eq!(item.quantity_packed, 0);
    assert_eq!(item.quantity_remaining, 20);
    assert_eq!(item.packing_status, ItemPackingStatus::Unpacked);
}
