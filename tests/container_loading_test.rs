mod common;

use assert_matches::assert_matches;
use common::TestEnv;
use shipment_capacity::{
    entities::{shipment::ShipmentStatus, shipment_container::ContainerStatus},
    services::loading::LoadingStrategy,
    ServiceError,
};

#[tokio::test]
async fn best_fit_fills_one_container_and_overflows_into_another() {
    let env = TestEnv::new().await;
    let shipment = env.shipment("SHP-2001").await;
    let crates = env.item(shipment.id, "Machine part", 500.0, 1.0, 40).await;

    let result = env
        .services
        .loading
        .auto_load_best_fit(shipment.id, None, &env.ctx)
        .await
        .expect("auto-load");

    assert_eq!(result.strategy, LoadingStrategy::BestFit);
    assert_eq!(result.containers_used, 2);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].quantity_loaded, 40);
    assert_eq!(result.items[0].quantity_remaining, 0);

    let containers = env
        .services
        .containers
        .list_containers(shipment.id)
        .await
        .unwrap();
    assert_eq!(containers.len(), 2);
    assert_eq!(containers[0].container_number, "SHP-2001-CNT001");
    assert_eq!(containers[1].container_number, "SHP-2001-CNT002");

    // a 20GP holds 33 whole cubic meters
    assert!((containers[0].current_volume - 33.0).abs() < 1e-9);
    assert!((containers[0].current_weight - 16_500.0).abs() < 1e-9);
    assert!((containers[1].current_volume - 7.0).abs() < 1e-9);
    for container in &containers {
        assert!(container.current_weight <= container.max_weight);
        assert!(container.current_volume <= container.max_volume);
    }

    // every unit is now in a container
    let err = env
        .services
        .containers
        .add_item_to_container(containers[1].id, crates.id, 1, &env.ctx)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) => {
        assert_eq!(msg, "Insufficient quantity for Machine part. Remaining: 0, Requested: 1");
    });

    let efficiency = env
        .services
        .loading
        .calculate_loading_efficiency(shipment.id)
        .await
        .unwrap();
    assert_eq!(efficiency.total_containers, 2);
    assert!(efficiency.avg_volume_utilization > 50.0);
}

#[tokio::test]
async fn weight_balanced_spreads_heavy_lines_over_requested_containers() {
    let env = TestEnv::new().await;
    let shipment = env.shipment("SHP-2002").await;
    env.item(shipment.id, "Steel coil", 1_000.0, 0.5, 10).await;
    env.item(shipment.id, "Cable drum", 100.0, 0.2, 20).await;

    assert_matches!(
        env.services
            .loading
            .auto_load_weight_balanced(shipment.id, 0, None, &env.ctx)
            .await,
        Err(ServiceError::ValidationError(msg)) if msg == "Number of containers must be greater than 0"
    );

    let forty = env.container_type("40GP").await;
    let result = env
        .services
        .loading
        .auto_load_weight_balanced(shipment.id, 2, Some(forty.id), &env.ctx)
        .await
        .expect("auto-load");
    assert_eq!(result.strategy, LoadingStrategy::WeightBalanced);
    assert_eq!(result.containers_used, 2);

    let containers = env
        .services
        .containers
        .list_containers(shipment.id)
        .await
        .unwrap();
    assert!(containers.iter().all(|c| c.container_type_id == forty.id));

    let mut weights: Vec<f64> = containers.iter().map(|c| c.current_weight).collect();
    weights.sort_by(f64::total_cmp);
    assert_eq!(weights, vec![2_000.0, 10_000.0]);
}

#[tokio::test]
async fn loading_requires_items_and_an_open_shipment() {
    let env = TestEnv::new().await;
    let shipment = env.shipment("SHP-2003").await;

    assert_matches!(
        env.services
            .loading
            .auto_load_best_fit(shipment.id, None, &env.ctx)
            .await,
        Err(ServiceError::NothingToProcess(msg)) if msg == "No items to load"
    );
    assert!(env
        .services
        .loading
        .suggest_container_types(shipment.id)
        .await
        .unwrap()
        .is_empty());

    env.item(shipment.id, "Pallet of tiles", 900.0, 1.2, 4).await;
    env.services
        .shipments
        .update_status(shipment.id, ShipmentStatus::ReadyToShip, &env.ctx)
        .await
        .unwrap();
    assert_matches!(
        env.services
            .loading
            .auto_load_best_fit(shipment.id, None, &env.ctx)
            .await,
        Err(ServiceError::InvalidOperation(_))
    );
}

#[tokio::test]
async fn suggestions_rank_seeded_types_for_cargo() {
    let env = TestEnv::new().await;
    let shipment = env.shipment("SHP-2004").await;
    env.item(shipment.id, "Flat-pack wardrobe", 40.0, 0.5, 50).await;

    let suggestions = env
        .services
        .loading
        .suggest_container_types(shipment.id)
        .await
        .unwrap();
    assert_eq!(suggestions.len(), 3);
    for pair in suggestions.windows(2) {
        assert!(pair[0].avg_utilization >= pair[1].avg_utilization);
    }

    // 25 m³ and 2000 kg fit one container of every standard type
    assert!(suggestions.iter().all(|s| s.containers_needed == 1));
    assert_eq!(suggestions[0].container_type, "20GP");
}

#[tokio::test]
async fn container_seal_lifecycle_enforces_unique_seals() {
    let env = TestEnv::new().await;
    let containers = &env.services.containers;
    let shipment = env.shipment("SHP-2005").await;
    let item = env.item(shipment.id, "Generator", 1_200.0, 2.5, 6).await;
    let twenty = env.container_type("20GP").await;

    let first = containers
        .create_container(shipment.id, twenty.id, &env.ctx)
        .await
        .unwrap();
    let second = containers
        .create_container(shipment.id, twenty.id, &env.ctx)
        .await
        .unwrap();
    assert_eq!(first.status, ContainerStatus::Draft);
    assert_eq!(second.container_number, "SHP-2005-CNT002");

    assert_matches!(
        containers.seal_container(first.id, "SEAL-001", &env.ctx).await,
        Err(ServiceError::InvalidOperation(msg)) if msg == "Container cannot be empty"
    );

    containers
        .add_item_to_container(first.id, item.id, 3, &env.ctx)
        .await
        .unwrap();
    let loaded = containers
        .add_item_to_container(second.id, item.id, 3, &env.ctx)
        .await
        .unwrap();
    assert!((loaded.current_weight - 3_600.0).abs() < 1e-9);

    let sealed = containers
        .seal_container(first.id, "SEAL-001", &env.ctx)
        .await
        .unwrap();
    assert_eq!(sealed.status, ContainerStatus::Sealed);
    assert_eq!(sealed.seal_number.as_deref(), Some("SEAL-001"));
    assert_eq!(sealed.sealed_by, Some(env.actor));

    assert_matches!(
        containers.seal_container(second.id, "SEAL-001", &env.ctx).await,
        Err(ServiceError::Conflict(_))
    );
    assert_matches!(
        containers
            .add_item_to_container(first.id, item.id, 1, &env.ctx)
            .await,
        Err(ServiceError::InvalidOperation(_)) | Err(ServiceError::ValidationError(_))
    );

    let in_transit = containers.mark_in_transit(first.id, &env.ctx).await.unwrap();
    assert_eq!(in_transit.status, ContainerStatus::InTransit);
    assert_matches!(
        containers.unseal_container(first.id, &env.ctx).await,
        Err(ServiceError::InvalidOperation(_)) | Err(ServiceError::InvalidStatus(_))
    );
    let delivered = containers.mark_delivered(first.id, &env.ctx).await.unwrap();
    assert_eq!(delivered.status, ContainerStatus::Delivered);
    let reloaded = containers.get_container(first.id).await.unwrap();
    assert_eq!(reloaded.status, ContainerStatus::Delivered);
    assert_eq!(reloaded.seal_number.as_deref(), Some("SEAL-001"));

    let summary = containers.container_summary(second.id).await.unwrap();
    assert_eq!(summary.item_count, 1);
    assert_eq!(summary.total_quantity, 3);
}

#[tokio::test]
async fn oversized_manual_load_is_rejected_with_capacity_message() {
    let env = TestEnv::new().await;
    let containers = &env.services.containers;
    let shipment = env.shipment("SHP-2006").await;
    let item = env.item(shipment.id, "Transformer", 15_000.0, 5.0, 2).await;
    let twenty = env.container_type("20GP").await;

    let container = containers
        .create_container(shipment.id, twenty.id, &env.ctx)
        .await
        .unwrap();

    let fit = containers
        .check_items_fit(container.id, &[(item.id, 2)])
        .await
        .unwrap();
    assert!(!fit.can_fit);

    let err = containers
        .add_item_to_container(container.id, item.id, 2, &env.ctx)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(msg) => {
        assert!(msg.starts_with("Container SHP-2006-CNT001 has insufficient capacity. Weight: 30000kg / 28200kg"));
    });

    containers
        .add_item_to_container(container.id, item.id, 1, &env.ctx)
        .await
        .expect("one unit fits");
}
