use crate::models::{Requester, Seat};

/// Owner-or-admin check applied before a cancel mutates a seat. Reset uses
/// a stricter admin-only check; reserve needs authentication only.
pub fn can_modify(requester: &Requester, seat: &Seat) -> bool {
    requester.is_admin || seat.reserved_by == Some(requester.user_id)
}
