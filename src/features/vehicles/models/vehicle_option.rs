use sqlx::FromRow;

/// Database model for a vehicle option (one equipment line)
#[derive(Debug, Clone, FromRow)]
pub struct VehicleOption {
    pub id: i64,
    pub vehicle_id: i64,
    pub label: String,
    pub sort_order: i32,
}
