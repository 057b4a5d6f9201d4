// Domain math and validators
pub mod box_types;
pub mod capacity;
pub mod packaging;
pub mod quantity;

// Persistence-backed services
pub mod catalog;
pub mod containers;
pub mod loading;
pub mod packing;
pub mod shipments;

use std::sync::Arc;

use crate::config::CapacityConfig;
use crate::db::DbPool;

use self::{
    box_types::BoxTypeService, catalog::CatalogService, containers::ContainerService,
    loading::LoadingService, packing::PackingService, shipments::ShipmentService,
};

/// Every service, sharing one pool and one capacity configuration.
#[derive(Clone)]
pub struct CapacityServices {
    pub shipments: Arc<ShipmentService>,
    pub catalog: Arc<CatalogService>,
    pub containers: Arc<ContainerService>,
    pub loading: Arc<LoadingService>,
    pub box_types: Arc<BoxTypeService>,
    pub packing: Arc<PackingService>,
}

impl CapacityServices {
    pub fn new(db_pool: Arc<DbPool>, config: CapacityConfig) -> Self {
        Self {
            shipments: Arc::new(ShipmentService::new(db_pool.clone())),
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            containers: Arc::new(ContainerService::new(db_pool.clone())),
            loading: Arc::new(LoadingService::new(db_pool.clone(), config.clone())),
            box_types: Arc::new(BoxTypeService::new(db_pool.clone())),
            packing: Arc::new(PackingService::new(db_pool, config)),
        }
    }
}
