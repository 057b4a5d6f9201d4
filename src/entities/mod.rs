pub mod container_type;
pub mod packing_box;
pub mod packing_box_item;
pub mod packing_box_type;
pub mod shipment;
pub mod shipment_container;
pub mod shipment_container_item;
pub mod shipment_item;

pub mod prelude {
    pub use super::container_type::Entity as ContainerType;
    pub use super::packing_box::Entity as PackingBox;
    pub use super::packing_box_item::Entity as PackingBoxItem;
    pub use super::packing_box_type::Entity as PackingBoxType;
    pub use super::shipment::Entity as Shipment;
    pub use super::shipment_container::Entity as ShipmentContainer;
    pub use super::shipment_container_item::Entity as ShipmentContainerItem;
    pub use super::shipment_item::Entity as ShipmentItem;
}
