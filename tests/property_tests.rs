//! Property-based tests for the capacity calculators and loading planners.
//!
//! These use proptest to check limits and bookkeeping across a wide range of
//! cargo shapes, catching edge cases the example-based unit tests miss.

use chrono::Utc;
use proptest::prelude::*;
use shipment_capacity::{
    common::{round2, units_within},
    entities::{container_type, shipment_container, shipment_container::ContainerStatus},
    services::{
        capacity::{validate_items_fit, CargoLine},
        loading::{plan_best_fit, plan_weight_balanced, suggest_for_totals, BinState, LoadLine},
        packaging::{calculate_box_capacity, calculate_freight_class, Envelope, ProductDimensions},
    },
};
use uuid::Uuid;

const EPS: f64 = 1e-9;

// Strategies for generating test data
fn line_strategy() -> impl Strategy<Value = LoadLine> {
    (0.0f64..2_000.0, 0.0f64..5.0, 1i32..200).prop_map(|(unit_weight, unit_volume, quantity)| {
        LoadLine {
            shipment_item_id: Uuid::new_v4(),
            product_name: "cargo".to_string(),
            unit_weight,
            unit_volume,
            quantity,
        }
    })
}

fn bin(max_weight: f64, max_volume: f64) -> BinState {
    BinState {
        container_id: None,
        max_weight,
        max_volume,
        current_weight: 0.0,
        current_volume: 0.0,
    }
}

fn container(max_weight: f64, current_weight: f64, max_volume: f64, current_volume: f64) -> shipment_container::Model {
    shipment_container::Model {
        id: Uuid::new_v4(),
        shipment_id: Uuid::new_v4(),
        container_type_id: Uuid::new_v4(),
        container_number: "SHP-1-CNT001".to_string(),
        max_weight,
        max_volume,
        current_weight,
        current_volume,
        status: ContainerStatus::Draft,
        seal_number: None,
        sealed_at: None,
        sealed_by: None,
        created_by: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn container_type(code: &str, max_weight: f64, internal_volume: f64) -> container_type::Model {
    container_type::Model {
        id: Uuid::new_v4(),
        type_code: code.to_string(),
        name: code.to_string(),
        length: 589.0,
        width: 235.0,
        height: 239.0,
        max_weight,
        internal_volume,
        estimated_cost: None,
        is_active: true,
        created_at: Utc::now(),
    }
}

// Property: anything a container accepts keeps it within its limits
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn accepted_cargo_stays_within_limits(
        max_weight in 1.0f64..30_000.0,
        used_weight in 0.0f64..1.0,
        max_volume in 0.1f64..80.0,
        used_volume in 0.0f64..1.0,
        weight in 0.0f64..30_000.0,
        volume in 0.0f64..80.0,
    ) {
        let c = container(max_weight, max_weight * used_weight, max_volume, max_volume * used_volume);
        if c.can_fit(weight, volume) {
            prop_assert!(c.current_weight + weight <= c.max_weight + EPS);
            prop_assert!(c.current_volume + volume <= c.max_volume + EPS);
        } else {
            prop_assert!(weight > c.remaining_weight() || volume > c.remaining_volume());
        }
    }

    #[test]
    fn utilization_grows_with_load(
        max_weight in 1.0f64..30_000.0,
        a in 0.0f64..30_000.0,
        b in 0.0f64..30_000.0,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let lighter = container(max_weight, low, 1.0, 0.0);
        let heavier = container(max_weight, high, 1.0, 0.0);
        prop_assert!(lighter.weight_utilization() <= heavier.weight_utilization());
    }

    #[test]
    fn units_within_is_the_largest_whole_count(budget in 0.0f64..10_000.0, unit in 0.001f64..500.0) {
        let count = units_within(budget, unit).expect("positive unit constrains");
        prop_assert!(count >= 0);
        prop_assert!(count as f64 * unit <= budget + EPS);
        prop_assert!((count + 1) as f64 * unit > budget - EPS);
    }
}

// Property: planners never overload a container and account for every unit
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn best_fit_never_exceeds_container_limits(
        lines in prop::collection::vec(line_strategy(), 1..8),
        max_weight in 1_000.0f64..30_000.0,
        max_volume in 5.0f64..80.0,
    ) {
        let template = bin(max_weight, max_volume);
        let plan = plan_best_fit(lines, Vec::new(), &template);

        for state in &plan.bins {
            prop_assert!(state.current_weight <= state.max_weight);
            prop_assert!(state.current_volume <= state.max_volume);
        }
        for (index, line) in plan.lines.iter().enumerate() {
            let placed: i32 = plan
                .placements
                .iter()
                .filter(|p| p.line == index)
                .map(|p| p.quantity)
                .sum();
            prop_assert_eq!(placed, plan.loaded[index]);
            prop_assert!(plan.loaded[index] <= line.quantity);
        }
        // at most the starting bin plus one overflow bin per line
        prop_assert!(plan.bins.len() <= plan.lines.len() + 1);
    }

    #[test]
    fn weight_balanced_respects_weight_and_single_bin_per_line(
        lines in prop::collection::vec(line_strategy(), 1..8),
        containers in 1usize..5,
        max_weight in 1_000.0f64..30_000.0,
    ) {
        let bins = vec![bin(max_weight, 1_000.0); containers];
        let plan = plan_weight_balanced(lines, bins);

        prop_assert_eq!(plan.bins.len(), containers);
        for state in &plan.bins {
            prop_assert!(state.current_weight <= state.max_weight);
        }
        for index in 0..plan.lines.len() {
            let placements = plan.placements.iter().filter(|p| p.line == index).count();
            prop_assert!(placements <= 1);
        }
    }

    #[test]
    fn suggested_counts_cover_the_cargo(
        total_weight in 0.0f64..200_000.0,
        total_volume in 0.0f64..500.0,
    ) {
        let types = vec![
            container_type("20GP", 28_200.0, 33.2),
            container_type("40HC", 26_500.0, 76.3),
        ];
        let suggestions = suggest_for_totals(total_weight, total_volume, &types);
        prop_assert_eq!(suggestions.len(), 2);

        for suggestion in &suggestions {
            let t = types.iter().find(|t| t.id == suggestion.container_type_id).unwrap();
            let count = suggestion.containers_needed as f64;
            prop_assert!(suggestion.containers_needed >= 1);
            prop_assert!(count * t.max_weight >= total_weight - EPS);
            prop_assert!(count * t.internal_volume >= total_volume - EPS);
        }
    }
}

fn cargo_strategy() -> impl Strategy<Value = CargoLine> {
    (0.0f64..5_000.0, 0.0f64..10.0).prop_map(|(weight, volume)| CargoLine::new(weight, volume))
}

fn loaded_container(
    max_weight: f64,
    current_weight: f64,
    current_volume: f64,
) -> (container_type::Model, shipment_container::Model) {
    let kind = container_type("20GP", max_weight, 33.2);
    let loaded = container(kind.max_weight, current_weight, kind.max_volume(), current_volume);
    (kind, loaded)
}

// Property: the fit validator agrees with the limits it reports
proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn fit_is_rejected_exactly_when_a_limit_is_exceeded(
        max_weight in 1_000.0f64..30_000.0,
        current_weight in 0.0f64..30_000.0,
        current_volume in 0.0f64..40.0,
        items in prop::collection::vec(cargo_strategy(), 0..6),
    ) {
        let (kind, loaded) = loaded_container(max_weight, current_weight, current_volume);
        let report = validate_items_fit(&loaded, &kind, &items);

        let new_weight = current_weight + items.iter().fold(0.0, |total, item| total + item.total_weight);
        let new_volume = current_volume + items.iter().fold(0.0, |total, item| total + item.total_volume);
        let over = new_weight > kind.max_weight || new_volume > kind.max_volume();

        prop_assert_eq!(report.can_fit, !over);
        prop_assert_eq!(report.issues.is_empty(), !over);
        prop_assert_eq!(report.metrics.weight.new_total, new_weight);
        prop_assert_eq!(report.metrics.volume.new_total, new_volume);
    }

    #[test]
    fn reported_utilization_is_the_rounded_share_of_the_limit(
        max_weight in 1_000.0f64..30_000.0,
        current_weight in 0.0f64..30_000.0,
        current_volume in 0.0f64..40.0,
        items in prop::collection::vec(cargo_strategy(), 0..6),
    ) {
        let (kind, loaded) = loaded_container(max_weight, current_weight, current_volume);
        let report = validate_items_fit(&loaded, &kind, &items);

        let weight = &report.metrics.weight;
        let volume = &report.metrics.volume;
        prop_assert_eq!(weight.utilization, round2(weight.new_total / kind.max_weight * 100.0));
        prop_assert_eq!(volume.utilization, round2(volume.new_total / kind.max_volume() * 100.0));
    }

    #[test]
    fn utilization_never_drops_as_cargo_is_added(
        max_weight in 1_000.0f64..30_000.0,
        current_weight in 0.0f64..30_000.0,
        current_volume in 0.0f64..40.0,
        items in prop::collection::vec(cargo_strategy(), 0..6),
        extra in cargo_strategy(),
    ) {
        let (kind, loaded) = loaded_container(max_weight, current_weight, current_volume);
        let before = validate_items_fit(&loaded, &kind, &items);
        let mut more = items.clone();
        more.push(extra);
        let after = validate_items_fit(&loaded, &kind, &more);

        prop_assert!(after.metrics.weight.utilization >= before.metrics.weight.utilization);
        prop_assert!(after.metrics.volume.utilization >= before.metrics.volume.utilization);
        prop_assert!(before.can_fit || !after.can_fit);
    }
}

// Property: box capacity honors weight and geometry
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn box_capacity_never_overweights_the_box(
        dims in (1.0f64..60.0, 1.0f64..60.0, 1.0f64..60.0),
        weight in 0.01f64..50.0,
        box_dims in (10.0f64..120.0, 10.0f64..120.0, 10.0f64..120.0),
        max_weight in 1.0f64..100.0,
    ) {
        let product = ProductDimensions::new(dims.0, dims.1, dims.2, weight);
        let envelope = Envelope {
            length: box_dims.0,
            width: box_dims.1,
            height: box_dims.2,
            max_weight,
        };
        let capacity = calculate_box_capacity(&product, &envelope);

        prop_assert!(capacity.max_quantity >= 0);
        prop_assert!(capacity.max_quantity as f64 * weight <= max_weight + EPS);
        prop_assert!(capacity.max_quantity as f64 * product.volume <= envelope.volume() + EPS);
        prop_assert_eq!(calculate_box_capacity(&product, &envelope), capacity);
    }

    #[test]
    fn denser_cargo_never_gets_a_higher_class(weight in 1.0f64..5_000.0, volume in 0.01f64..20.0) {
        let class_number = |class: &str| -> u32 {
            class.trim_start_matches("Class ").parse().unwrap()
        };
        let base = calculate_freight_class(weight, volume);
        let denser = calculate_freight_class(weight * 2.0, volume);
        prop_assert!(class_number(&denser.class) <= class_number(&base.class));
    }
}
