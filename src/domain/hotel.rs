//! Hotel tables and reservations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use policy::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::Maintenance => "maintenance",
        }
    }
}

impl FromStr for TableStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(TableStatus::Available),
            "occupied" => Ok(TableStatus::Occupied),
            "reserved" => Ok(TableStatus::Reserved),
            "maintenance" => Ok(TableStatus::Maintenance),
            other => Err(DomainError::validation(format!("Unknown table status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    /// Statuses that hold a table
    pub const HOLDING: [ReservationStatus; 2] =
        [ReservationStatus::Pending, ReservationStatus::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::NoShow => "no_show",
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "completed" => Ok(ReservationStatus::Completed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "no_show" | "no-show" => Ok(ReservationStatus::NoShow),
            other => Err(DomainError::validation(format!("Unknown reservation status '{}'", other))),
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelTable {
    pub id: Uuid,
    pub table_number: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub status: TableStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTable {
    #[validate(length(min = 1, max = 20, message = "Table number is required"))]
    pub table_number: String,
    #[validate(range(min = 1, max = 100, message = "Capacity must be between 1 and 100"))]
    pub capacity: i32,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTable {
    #[validate(length(min = 1, max = 20))]
    pub table_number: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub status: Option<TableStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub table_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub party_size: i32,
    pub reservation_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    pub table_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Customer name is required"))]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub customer_email: Option<String>,
    #[validate(range(min = 1, max = 100, message = "Party size must be between 1 and 100"))]
    pub party_size: i32,
    pub reservation_time: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservation {
    #[validate(length(min = 1, max = 100))]
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub customer_email: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub party_size: Option<i32>,
    pub reservation_time: Option<DateTime<Utc>>,
    pub status: Option<ReservationStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub date: Option<NaiveDate>,
    pub table_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelStats {
    pub total_tables: u64,
    pub available_tables: u64,
    pub occupied_tables: u64,
    pub reserved_tables: u64,
    pub total_reservations: u64,
    pub today_reservations: u64,
    /// Percentage of tables currently occupied
    pub occupancy_rate: f64,
}
