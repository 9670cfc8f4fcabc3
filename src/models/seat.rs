use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub seat_number: i64,
    pub is_reserved: bool,
    pub reserved_by: Option<i64>,
}

impl Seat {
    pub fn free(seat_number: i64) -> Self {
        Seat {
            seat_number,
            is_reserved: false,
            reserved_by: None,
        }
    }

    /// is_reserved == false <=> reserved_by == None, at every observation point.
    pub fn invariant_holds(&self) -> bool {
        self.is_reserved == self.reserved_by.is_some()
    }
}
