//! Container loading heuristics.
//!
//! Planning is pure: [`plan_best_fit`] and [`plan_weight_balanced`] work on
//! owned [`LoadLine`]s and [`BinState`]s and return a [`LoadPlan`]. The
//! [`LoadingService`] turns a plan into containers and container items inside
//! one transaction.
//!
//! Loading does not touch `quantity_packed` on shipment items, so running an
//! auto-load twice over the same shipment loads the same units twice. There
//! is no row locking either: two concurrent auto-loads on one shipment can
//! both read the same free capacity.

use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::sync::Arc;
use strum::Display;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::common::{percent_of, round2, round4, units_within};
use crate::config::CapacityConfig;
use crate::context::OperationContext;
use crate::db::transaction_scope;
use crate::entities::{container_type, shipment, shipment_container, shipment_item};
use crate::errors::ServiceError;
use crate::services::catalog::find_container_type_by_code_in;
use crate::services::containers::{
    create_container_in, load_container_type, load_into_container_in, shipment_containers_in,
};
use crate::services::shipments::{load_shipment, shipment_items_in};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadingStrategy {
    BestFit,
    WeightBalanced,
}

/// Units of one shipment line waiting to be loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadLine {
    pub shipment_item_id: Uuid,
    pub product_name: String,
    pub unit_weight: f64,
    pub unit_volume: f64,
    pub quantity: i32,
}

impl LoadLine {
    /// The unpacked remainder of a shipment item, if any.
    pub fn from_item(item: &shipment_item::Model) -> Option<Self> {
        let quantity = item.quantity_to_ship - item.quantity_packed;
        if item.is_fully_packed() || quantity <= 0 {
            return None;
        }
        Some(Self {
            shipment_item_id: item.id,
            product_name: item.product_name.clone(),
            unit_weight: item.unit_weight,
            unit_volume: item.unit_volume,
            quantity,
        })
    }

    fn total_volume(&self) -> f64 {
        self.unit_volume * f64::from(self.quantity)
    }

    fn total_weight(&self) -> f64 {
        self.unit_weight * f64::from(self.quantity)
    }
}

/// Capacity of one container during planning.
///
/// `container_id` is `None` for containers the plan wants created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinState {
    pub container_id: Option<Uuid>,
    pub max_weight: f64,
    pub max_volume: f64,
    pub current_weight: f64,
    pub current_volume: f64,
}

impl BinState {
    /// An empty container of `container_type`.
    pub fn empty(container_type: &container_type::Model) -> Self {
        Self {
            container_id: None,
            max_weight: container_type.max_weight,
            max_volume: container_type.max_volume(),
            current_weight: 0.0,
            current_volume: 0.0,
        }
    }

    pub fn remaining_weight(&self) -> f64 {
        (self.max_weight - self.current_weight).max(0.0)
    }

    pub fn remaining_volume(&self) -> f64 {
        (self.max_volume - self.current_volume).max(0.0)
    }

    /// Whole units of `line` this bin can still take, capped at `wanted`.
    fn room_for(&self, line: &LoadLine, wanted: i32) -> i32 {
        let wanted = i64::from(wanted);
        let by_weight = units_within(self.remaining_weight(), line.unit_weight).unwrap_or(wanted);
        let by_volume = units_within(self.remaining_volume(), line.unit_volume).unwrap_or(wanted);
        // bounded by `wanted`, which came from an i32
        let mut quantity = by_weight.min(by_volume).min(wanted).max(0) as i32;
        while quantity > 0
            && !(self.within_weight(line, quantity) && self.within_volume(line, quantity))
        {
            quantity -= 1;
        }
        quantity
    }

    /// Units of `line` the bin can take by weight alone, capped at `wanted`.
    fn weight_room_for(&self, line: &LoadLine, wanted: i32) -> i32 {
        let mut quantity = match units_within(self.remaining_weight(), line.unit_weight) {
            Some(by_weight) => by_weight.min(i64::from(wanted)).max(0) as i32,
            None => return wanted,
        };
        while quantity > 0 && !self.within_weight(line, quantity) {
            quantity -= 1;
        }
        quantity
    }

    // Same arithmetic as `take`, so an accepted quantity never lands past the limit.
    fn within_weight(&self, line: &LoadLine, quantity: i32) -> bool {
        line.unit_weight <= 0.0
            || self.current_weight + line.unit_weight * f64::from(quantity) <= self.max_weight
    }

    fn within_volume(&self, line: &LoadLine, quantity: i32) -> bool {
        line.unit_volume <= 0.0
            || self.current_volume + line.unit_volume * f64::from(quantity) <= self.max_volume
    }

    fn take(&mut self, line: &LoadLine, quantity: i32) {
        let quantity = f64::from(quantity);
        self.current_weight += line.unit_weight * quantity;
        self.current_volume += line.unit_volume * quantity;
    }
}

impl From<&shipment_container::Model> for BinState {
    fn from(container: &shipment_container::Model) -> Self {
        Self {
            container_id: Some(container.id),
            max_weight: container.max_weight,
            max_volume: container.max_volume,
            current_weight: container.current_weight,
            current_volume: container.current_volume,
        }
    }
}

/// `quantity` units of `lines[line]` go into `bins[bin]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub bin: usize,
    pub line: usize,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadPlan {
    /// Lines in the order they were placed
    pub lines: Vec<LoadLine>,
    /// Final state of every bin, existing ones first
    pub bins: Vec<BinState>,
    pub placements: Vec<Placement>,
    /// Units placed per line, parallel to `lines`
    pub loaded: Vec<i32>,
}

impl LoadPlan {
    fn new(lines: Vec<LoadLine>, bins: Vec<BinState>) -> Self {
        let loaded = vec![0; lines.len()];
        Self {
            lines,
            bins,
            placements: Vec::new(),
            loaded,
        }
    }

    fn place(&mut self, bin: usize, line: usize, quantity: i32) {
        if quantity <= 0 {
            return;
        }
        self.bins[bin].take(&self.lines[line], quantity);
        self.loaded[line] += quantity;
        self.placements.push(Placement {
            bin,
            line,
            quantity,
        });
    }
}

/// Volume-descending first fit with one overflow container per line.
///
/// Lines are placed in descending `unit_volume × quantity` (ties keep their
/// input order). Each line fills the bins in order; whatever is left opens
/// exactly one new bin shaped like `template`, which later lines may also
/// use. Units that do not fit even the fresh bin stay unloaded. When `bins`
/// is empty the plan starts with one new bin.
pub fn plan_best_fit(mut lines: Vec<LoadLine>, bins: Vec<BinState>, template: &BinState) -> LoadPlan {
    lines.sort_by(|a, b| b.total_volume().total_cmp(&a.total_volume()));

    let mut bins = bins;
    if bins.is_empty() {
        bins.push(template.clone());
    }
    let mut plan = LoadPlan::new(lines, bins);

    for line in 0..plan.lines.len() {
        let wanted = plan.lines[line].quantity;

        for bin in 0..plan.bins.len() {
            let left = wanted - plan.loaded[line];
            if left <= 0 {
                break;
            }
            let quantity = plan.bins[bin].room_for(&plan.lines[line], left);
            plan.place(bin, line, quantity);
        }

        let left = wanted - plan.loaded[line];
        if left > 0 {
            plan.bins.push(template.clone());
            let bin = plan.bins.len() - 1;
            let quantity = plan.bins[bin].room_for(&plan.lines[line], left);
            plan.place(bin, line, quantity);
        }
    }

    plan
}

/// Heaviest line first into the currently lightest bin.
///
/// Each line goes to a single bin, limited by that bin's remaining weight
/// only. Ties on weight pick the earliest bin.
pub fn plan_weight_balanced(mut lines: Vec<LoadLine>, bins: Vec<BinState>) -> LoadPlan {
    lines.sort_by(|a, b| b.total_weight().total_cmp(&a.total_weight()));
    let mut plan = LoadPlan::new(lines, bins);
    if plan.bins.is_empty() {
        return plan;
    }

    for line in 0..plan.lines.len() {
        let mut lightest = 0;
        for (index, bin) in plan.bins.iter().enumerate() {
            if bin.current_weight < plan.bins[lightest].current_weight {
                lightest = index;
            }
        }

        let current = &plan.lines[line];
        let quantity = plan.bins[lightest].weight_room_for(current, current.quantity);
        plan.place(lightest, line, quantity);
    }

    plan
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerTypeSuggestion {
    pub container_type_id: Uuid,
    pub container_type: String,
    pub container_type_name: String,
    pub containers_needed: i64,
    pub weight_utilization: f64,
    pub volume_utilization: f64,
    pub avg_utilization: f64,
    pub total_cost_estimate: Decimal,
    pub is_recommended: bool,
}

/// Container counts and utilization per type for a cargo of the given totals.
///
/// Types without a positive weight rating or volume are skipped. The result
/// is ordered by descending average utilization; equal averages keep the
/// order of `types`.
pub fn suggest_for_totals(
    total_weight: f64,
    total_volume: f64,
    types: &[container_type::Model],
) -> Vec<ContainerTypeSuggestion> {
    let mut suggestions = Vec::with_capacity(types.len());

    for container_type in types {
        if container_type.max_weight <= 0.0 || container_type.internal_volume <= 0.0 {
            continue;
        }

        let by_weight = (total_weight / container_type.max_weight).ceil() as i64;
        let by_volume = (total_volume / container_type.internal_volume).ceil() as i64;
        let containers_needed = by_weight.max(by_volume).max(1);
        let count = containers_needed as f64;

        let weight_utilization = percent_of(total_weight, count * container_type.max_weight);
        let volume_utilization = percent_of(total_volume, count * container_type.internal_volume);
        let avg_utilization = (weight_utilization + volume_utilization) / 2.0;

        suggestions.push(ContainerTypeSuggestion {
            container_type_id: container_type.id,
            container_type: container_type.type_code.clone(),
            container_type_name: container_type.name.clone(),
            containers_needed,
            weight_utilization: round2(weight_utilization),
            volume_utilization: round2(volume_utilization),
            avg_utilization: round2(avg_utilization),
            total_cost_estimate: Decimal::from(containers_needed)
                * container_type.estimated_cost.unwrap_or_default(),
            is_recommended: (70.0..=95.0).contains(&avg_utilization),
        });
    }

    suggestions.sort_by(|a, b| b.avg_utilization.total_cmp(&a.avg_utilization));
    suggestions
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerLoad {
    pub container_id: Uuid,
    pub container_number: String,
    pub weight_utilization: f64,
    pub volume_utilization: f64,
}

impl From<&shipment_container::Model> for ContainerLoad {
    fn from(container: &shipment_container::Model) -> Self {
        Self {
            container_id: container.id,
            container_number: container.container_number.clone(),
            weight_utilization: round2(container.weight_utilization()),
            volume_utilization: round2(container.volume_utilization()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLoad {
    pub item_id: Uuid,
    pub product_name: String,
    pub quantity_loaded: i32,
    pub quantity_remaining: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingResult {
    pub shipment_id: Uuid,
    pub strategy: LoadingStrategy,
    pub containers_used: usize,
    pub containers: Vec<ContainerLoad>,
    pub items: Vec<ItemLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerEfficiency {
    pub container_id: Uuid,
    pub container_number: String,
    pub weight_utilization: f64,
    pub volume_utilization: f64,
    pub wasted_weight: f64,
    pub wasted_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingEfficiency {
    pub total_containers: usize,
    pub avg_weight_utilization: f64,
    pub avg_volume_utilization: f64,
    pub total_wasted_weight: f64,
    pub total_wasted_volume: f64,
    pub efficiency_score: f64,
    pub containers: Vec<ContainerEfficiency>,
}

/// Utilization and unused capacity across a shipment's containers.
pub fn efficiency_for(containers: &[shipment_container::Model]) -> LoadingEfficiency {
    let mut report = LoadingEfficiency {
        total_containers: containers.len(),
        avg_weight_utilization: 0.0,
        avg_volume_utilization: 0.0,
        total_wasted_weight: 0.0,
        total_wasted_volume: 0.0,
        efficiency_score: 0.0,
        containers: Vec::with_capacity(containers.len()),
    };
    if containers.is_empty() {
        return report;
    }

    let mut weight_sum = 0.0;
    let mut volume_sum = 0.0;
    let mut wasted_weight = 0.0;
    let mut wasted_volume = 0.0;

    for container in containers {
        let weight_utilization = container.weight_utilization();
        let volume_utilization = container.volume_utilization();
        weight_sum += weight_utilization;
        volume_sum += volume_utilization;
        wasted_weight += container.remaining_weight();
        wasted_volume += container.remaining_volume();

        report.containers.push(ContainerEfficiency {
            container_id: container.id,
            container_number: container.container_number.clone(),
            weight_utilization: round2(weight_utilization),
            volume_utilization: round2(volume_utilization),
            wasted_weight: round2(container.remaining_weight()),
            wasted_volume: round4(container.remaining_volume()),
        });
    }

    let count = containers.len() as f64;
    report.avg_weight_utilization = round2(weight_sum / count);
    report.avg_volume_utilization = round2(volume_sum / count);
    report.total_wasted_weight = round2(wasted_weight);
    report.total_wasted_volume = round4(wasted_volume);
    report.efficiency_score = round2(((weight_sum + volume_sum) / 2.0) / count);
    report
}

/// Service that plans and persists container loads for a shipment.
#[derive(Clone)]
pub struct LoadingService {
    db_pool: Arc<DatabaseConnection>,
    config: CapacityConfig,
}

impl LoadingService {
    pub fn new(db_pool: Arc<DatabaseConnection>, config: CapacityConfig) -> Self {
        Self { db_pool, config }
    }

    /// Ranks every active container type for the shipment's full cargo.
    #[instrument(skip(self))]
    pub async fn suggest_container_types(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<ContainerTypeSuggestion>, ServiceError> {
        let db = &*self.db_pool;
        load_shipment(db, shipment_id).await?;
        let items = shipment_items_in(db, shipment_id).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let total_weight: f64 = items.iter().map(|item| item.total_weight()).sum();
        let total_volume: f64 = items.iter().map(|item| item.total_volume()).sum();

        let types = container_type::Entity::find()
            .filter(container_type::Column::IsActive.eq(true))
            .order_by_asc(container_type::Column::InternalVolume)
            .all(db)
            .await?;

        Ok(suggest_for_totals(total_weight, total_volume, &types))
    }

    /// Loads every unpacked unit using [`plan_best_fit`].
    ///
    /// Open (draft or packed) containers are filled first; new containers
    /// use `container_type_id` or the configured default type.
    ///
    /// # Errors
    /// `NothingToProcess` when no item has units left to load.
    #[instrument(skip(self, ctx))]
    pub async fn auto_load_best_fit(
        &self,
        shipment_id: Uuid,
        container_type_id: Option<Uuid>,
        ctx: &OperationContext,
    ) -> Result<LoadingResult, ServiceError> {
        let service = self.clone();
        let ctx = ctx.clone();
        let result = transaction_scope(&self.db_pool, "auto_load_best_fit", move |txn| {
            Box::pin(async move {
                let shipment = load_shipment(txn, shipment_id).await?;
                let lines = service.pending_lines(txn, &shipment).await?;
                let container_type = service.resolve_container_type(txn, container_type_id).await?;

                let open: Vec<shipment_container::Model> = shipment_containers_in(txn, shipment.id)
                    .await?
                    .into_iter()
                    .filter(|container| container.status.is_open())
                    .collect();
                let bins = open.iter().map(BinState::from).collect();

                let plan = plan_best_fit(lines, bins, &BinState::empty(&container_type));
                service
                    .persist_plan(txn, &shipment, &container_type, open, plan, LoadingStrategy::BestFit, &ctx)
                    .await
            })
        })
        .await?;

        counter!("capacity.auto_load.runs", 1, "strategy" => "best_fit");
        info!(
            shipment_id = %shipment_id,
            containers_used = result.containers_used,
            items_loaded = result.items.len(),
            "Auto-load completed (best-fit)"
        );
        Ok(result)
    }

    /// Creates `number_of_containers` containers and spreads the cargo by weight.
    ///
    /// # Errors
    /// `ValidationError` when `number_of_containers` is zero,
    /// `NothingToProcess` when no item has units left to load.
    #[instrument(skip(self, ctx))]
    pub async fn auto_load_weight_balanced(
        &self,
        shipment_id: Uuid,
        number_of_containers: usize,
        container_type_id: Option<Uuid>,
        ctx: &OperationContext,
    ) -> Result<LoadingResult, ServiceError> {
        if number_of_containers == 0 {
            return Err(ServiceError::ValidationError(
                "Number of containers must be greater than 0".to_string(),
            ));
        }

        let service = self.clone();
        let ctx = ctx.clone();
        let result = transaction_scope(&self.db_pool, "auto_load_weight_balanced", move |txn| {
            Box::pin(async move {
                let shipment = load_shipment(txn, shipment_id).await?;
                let lines = service.pending_lines(txn, &shipment).await?;
                let container_type = service.resolve_container_type(txn, container_type_id).await?;

                let bins = vec![BinState::empty(&container_type); number_of_containers];
                let plan = plan_weight_balanced(lines, bins);
                service
                    .persist_plan(
                        txn,
                        &shipment,
                        &container_type,
                        Vec::new(),
                        plan,
                        LoadingStrategy::WeightBalanced,
                        &ctx,
                    )
                    .await
            })
        })
        .await?;

        counter!("capacity.auto_load.runs", 1, "strategy" => "weight_balanced");
        info!(
            shipment_id = %shipment_id,
            containers_used = result.containers_used,
            "Auto-load completed (weight-balanced)"
        );
        Ok(result)
    }

    pub async fn calculate_loading_efficiency(
        &self,
        shipment_id: Uuid,
    ) -> Result<LoadingEfficiency, ServiceError> {
        let db = &*self.db_pool;
        load_shipment(db, shipment_id).await?;
        let containers = shipment_containers_in(db, shipment_id).await?;
        Ok(efficiency_for(&containers))
    }

    async fn pending_lines<C: ConnectionTrait>(
        &self,
        db: &C,
        shipment: &shipment::Model,
    ) -> Result<Vec<LoadLine>, ServiceError> {
        if !shipment.status.accepts_container_changes() {
            return Err(ServiceError::InvalidOperation(format!(
                "Shipment {} does not allow additions (status: {})",
                shipment.shipment_number, shipment.status
            )));
        }

        let lines: Vec<LoadLine> = shipment_items_in(db, shipment.id)
            .await?
            .iter()
            .filter_map(LoadLine::from_item)
            .collect();
        if lines.is_empty() {
            return Err(ServiceError::NothingToProcess("No items to load".to_string()));
        }
        Ok(lines)
    }

    async fn resolve_container_type<C: ConnectionTrait>(
        &self,
        db: &C,
        container_type_id: Option<Uuid>,
    ) -> Result<container_type::Model, ServiceError> {
        match container_type_id {
            Some(id) => load_container_type(db, id).await,
            None => {
                let code = &self.config.default_container_type;
                find_container_type_by_code_in(db, code)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("Container type {} not found", code)))
            }
        }
    }

    /// Creates the plan's new containers in bin order, then records every placement.
    #[allow(clippy::too_many_arguments)]
    async fn persist_plan<C: ConnectionTrait>(
        &self,
        db: &C,
        shipment: &shipment::Model,
        container_type: &container_type::Model,
        existing: Vec<shipment_container::Model>,
        plan: LoadPlan,
        strategy: LoadingStrategy,
        ctx: &OperationContext,
    ) -> Result<LoadingResult, ServiceError> {
        let mut containers = existing;
        for _ in containers.len()..plan.bins.len() {
            containers.push(create_container_in(db, shipment, container_type, ctx).await?);
        }

        let items = shipment_items_in(db, shipment.id).await?;
        for placement in &plan.placements {
            let line = &plan.lines[placement.line];
            let item = items
                .iter()
                .find(|item| item.id == line.shipment_item_id)
                .ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Planned item {} disappeared from shipment",
                        line.shipment_item_id
                    ))
                })?;
            let updated =
                load_into_container_in(db, &containers[placement.bin], item, placement.quantity, ctx)
                    .await?;
            containers[placement.bin] = updated;
        }

        let items = plan
            .lines
            .iter()
            .zip(&plan.loaded)
            .map(|(line, &loaded)| ItemLoad {
                item_id: line.shipment_item_id,
                product_name: line.product_name.clone(),
                quantity_loaded: loaded,
                quantity_remaining: line.quantity - loaded,
            })
            .collect();

        Ok(LoadingResult {
            shipment_id: shipment.id,
            strategy,
            containers_used: containers.len(),
            containers: containers.iter().map(ContainerLoad::from).collect(),
            items,
        })
    }
}
