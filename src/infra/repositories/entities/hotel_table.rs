//! Hotel / restaurant table entity.

use sea_orm::entity::prelude::*;

use crate::domain::{HotelTable, TableStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "hotel_tables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub table_number: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for HotelTable {
    fn from(model: Model) -> Self {
        HotelTable {
            id: model.id,
            status: super::parse_column(&model.status, TableStatus::Maintenance, "hotel_tables.status"),
            table_number: model.table_number,
            capacity: model.capacity,
            location: model.location,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
