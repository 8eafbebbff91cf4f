//! Flyer status enum mapping to the `flyer_statuses` lookup table.
//!
//! Variant discriminants match the seed data order (1-based) in the
//! migration.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Flyer job lifecycle status.
///
/// `pending → processing → {completed, failed}`; an accepted edit request
/// re-enters at `pending`. Terminal states are reachable from
/// `processing` only.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlyerStatus {
    Pending = 1,
    Processing = 2,
    Completed = 3,
    Failed = 4,
}

impl FlyerStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Look up a status by its database ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Processing),
            3 => Some(Self::Completed),
            4 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Wire name used in API responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl From<FlyerStatus> for StatusId {
    fn from(value: FlyerStatus) -> Self {
        value as StatusId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for status in [
            FlyerStatus::Pending,
            FlyerStatus::Processing,
            FlyerStatus::Completed,
            FlyerStatus::Failed,
        ] {
            assert_eq!(FlyerStatus::from_id(status.id()), Some(status));
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert_eq!(FlyerStatus::from_id(99), None);
    }

    #[test]
    fn wire_names_match_seed_data() {
        assert_eq!(FlyerStatus::Pending.as_str(), "pending");
        assert_eq!(FlyerStatus::Failed.as_str(), "failed");
    }
}
