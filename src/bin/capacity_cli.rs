use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use shipment_capacity::{
    config::{self, AppConfig},
    db::{self, DbPool},
    services::{
        loading::LoadingStrategy,
        packaging::{calculate_cbm, calculate_freight_class},
        CapacityServices,
    },
    OperationContext,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Pure calculations need neither config nor a database
    match &cli.command {
        Commands::Cbm(args) => return handle_cbm(args, cli.json),
        Commands::FreightClass(args) => return handle_freight_class(args, cli.json),
        _ => {}
    }

    let context = CliContext::initialize().await?;
    match cli.command {
        Commands::Migrate => handle_migrate(&context).await?,
        Commands::Seed => handle_seed(&context, cli.json).await?,
        Commands::SuggestContainers(args) => {
            handle_suggest_containers(&context, args, cli.json).await?
        }
        Commands::AutoLoad(args) => handle_auto_load(&context, args, cli.json).await?,
        Commands::AutoPack(args) => handle_auto_pack(&context, args, cli.json).await?,
        Commands::Efficiency(args) => handle_efficiency(&context, args, cli.json).await?,
        Commands::PackingSummary(args) => handle_packing_summary(&context, args, cli.json).await?,
        Commands::Cbm(_) | Commands::FreightClass(_) => {}
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "capacity",
    about = "Container loading and box packing for shipments",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Insert the standard container and box types
    Seed,
    /// Cubic meters of a box given in centimeters
    Cbm(CbmArgs),
    /// Freight class for a weight (kg) and volume (m³)
    FreightClass(FreightClassArgs),
    /// Rank container types for a shipment's cargo
    SuggestContainers(ShipmentArgs),
    /// Load unpacked units into containers
    AutoLoad(AutoLoadArgs),
    /// Spread unpacked units over packing boxes
    AutoPack(AutoPackArgs),
    /// Utilization of a shipment's containers
    Efficiency(ShipmentArgs),
    /// Packing progress of a shipment
    PackingSummary(ShipmentArgs),
}

#[derive(Args)]
struct CbmArgs {
    length: f64,
    width: f64,
    height: f64,
}

#[derive(Args)]
struct FreightClassArgs {
    weight: f64,
    volume: f64,
}

#[derive(Args)]
struct ShipmentArgs {
    #[arg(long)]
    shipment: Uuid,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    BestFit,
    WeightBalanced,
}

#[derive(Args)]
struct AutoLoadArgs {
    #[arg(long)]
    shipment: Uuid,
    #[arg(long, value_enum, default_value = "best-fit")]
    strategy: StrategyArg,
    /// Containers to balance over (weight-balanced only)
    #[arg(long, default_value_t = 1)]
    containers: usize,
    /// Container type for new containers; defaults to the configured type
    #[arg(long)]
    container_type: Option<Uuid>,
    /// Acting user recorded on created rows
    #[arg(long, env = "CAPACITY_ACTOR")]
    actor: Option<Uuid>,
}

#[derive(Args)]
struct AutoPackArgs {
    #[arg(long)]
    shipment: Uuid,
    #[arg(long)]
    boxes: usize,
    #[arg(long, env = "CAPACITY_ACTOR")]
    actor: Option<Uuid>,
}

struct CliContext {
    config: AppConfig,
    db: Arc<DbPool>,
    services: CapacityServices,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(&config.log_level, config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(db_pool);

        if config.auto_migrate {
            db::run_migrations(&db)
                .await
                .context("failed to run migrations")?;
        }

        let services = CapacityServices::new(db.clone(), config.capacity.clone());
        Ok(Self {
            config,
            db,
            services,
        })
    }
}

fn operation_context(actor: Option<Uuid>) -> OperationContext {
    actor.map_or_else(OperationContext::system, OperationContext::for_actor)
}

fn handle_cbm(args: &CbmArgs, json: bool) -> Result<()> {
    let cbm = calculate_cbm(args.length, args.width, args.height);
    if json {
        print_json(&serde_json::json!({ "cbm": cbm }))?;
    } else {
        println!("{} m³", cbm);
    }
    Ok(())
}

fn handle_freight_class(args: &FreightClassArgs, json: bool) -> Result<()> {
    let freight = calculate_freight_class(args.weight, args.volume);
    if json {
        print_json(&freight)?;
    } else {
        println!(
            "{} ({}), density {} kg/m³",
            freight.class, freight.description, freight.density
        );
    }
    Ok(())
}

async fn handle_migrate(context: &CliContext) -> Result<()> {
    if !context.config.auto_migrate {
        db::run_migrations(&context.db)
            .await
            .context("failed to run migrations")?;
    }
    println!("Migrations applied");
    Ok(())
}

async fn handle_seed(context: &CliContext, json: bool) -> Result<()> {
    let report = context
        .services
        .catalog
        .seed_standard_types(&OperationContext::system())
        .await
        .context("failed to seed catalog")?;
    if json {
        print_json(&report)?;
    } else {
        println!(
            "Created {} container type(s) and {} box type(s)",
            report.container_types_created, report.box_types_created
        );
    }
    Ok(())
}

async fn handle_suggest_containers(
    context: &CliContext,
    args: ShipmentArgs,
    json: bool,
) -> Result<()> {
    let suggestions = context
        .services
        .loading
        .suggest_container_types(args.shipment)
        .await
        .context("failed to suggest container types")?;

    if json {
        return print_json(&suggestions);
    }
    if suggestions.is_empty() {
        println!("Shipment has no items");
    }
    for suggestion in &suggestions {
        println!(
            "- {} x{} • weight {}% • volume {}% • cost {}{}",
            suggestion.container_type,
            suggestion.containers_needed,
            suggestion.weight_utilization,
            suggestion.volume_utilization,
            suggestion.total_cost_estimate,
            if suggestion.is_recommended {
                " • recommended"
            } else {
                ""
            }
        );
    }
    Ok(())
}

async fn handle_auto_load(context: &CliContext, args: AutoLoadArgs, json: bool) -> Result<()> {
    let ctx = operation_context(args.actor);
    let loading = &context.services.loading;
    let result = match args.strategy {
        StrategyArg::BestFit => {
            loading
                .auto_load_best_fit(args.shipment, args.container_type, &ctx)
                .await
        }
        StrategyArg::WeightBalanced => {
            loading
                .auto_load_weight_balanced(args.shipment, args.containers, args.container_type, &ctx)
                .await
        }
    }
    .context("auto-load failed")?;

    if json {
        return print_json(&result);
    }
    let strategy = match result.strategy {
        LoadingStrategy::BestFit => "best fit",
        LoadingStrategy::WeightBalanced => "weight balanced",
    };
    println!(
        "Loaded into {} container(s) ({})",
        result.containers_used, strategy
    );
    for container in &result.containers {
        println!(
            "- {} • weight {}% • volume {}%",
            container.container_number, container.weight_utilization, container.volume_utilization
        );
    }
    for item in result.items.iter().filter(|item| item.quantity_remaining > 0) {
        println!(
            "! {} has {} unit(s) left over",
            item.product_name, item.quantity_remaining
        );
    }
    Ok(())
}

async fn handle_auto_pack(context: &CliContext, args: AutoPackArgs, json: bool) -> Result<()> {
    let ctx = operation_context(args.actor);
    let result = context
        .services
        .packing
        .auto_pack_items(args.shipment, args.boxes, &ctx)
        .await
        .context("auto-pack failed")?;

    if json {
        return print_json(&result);
    }
    println!(
        "Packed {} item(s) into {} box(es)",
        result.items_packed, result.boxes_used
    );
    for packing_box in &result.boxes {
        println!(
            "- {} • {} unit(s) • {} kg net",
            packing_box.box_label, packing_box.total_quantity, packing_box.net_weight
        );
    }
    Ok(())
}

async fn handle_efficiency(context: &CliContext, args: ShipmentArgs, json: bool) -> Result<()> {
    let efficiency = context
        .services
        .loading
        .calculate_loading_efficiency(args.shipment)
        .await
        .context("failed to calculate loading efficiency")?;

    if json {
        return print_json(&efficiency);
    }
    println!(
        "{} container(s) • weight {}% • volume {}% • score {}",
        efficiency.total_containers,
        efficiency.avg_weight_utilization,
        efficiency.avg_volume_utilization,
        efficiency.efficiency_score
    );
    Ok(())
}

async fn handle_packing_summary(context: &CliContext, args: ShipmentArgs, json: bool) -> Result<()> {
    let summary = context
        .services
        .packing
        .packing_summary(args.shipment)
        .await
        .context("failed to load packing summary")?;

    if json {
        return print_json(&summary);
    }
    println!(
        "{} box(es), {} sealed • {}/{} unit(s) packed • {}",
        summary.total_boxes,
        summary.sealed_boxes,
        summary.packed_quantity,
        summary.total_quantity,
        if summary.packing_complete {
            "complete"
        } else {
            "in progress"
        }
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
