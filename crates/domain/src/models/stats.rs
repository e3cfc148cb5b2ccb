//! Event statistics models.

use serde::Serialize;

use super::check_in::CheckInType;

/// Per-kind check-in counts for one attendee pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInCounts {
    pub entry: i64,
    pub lunch: i64,
    pub dinner: i64,
    pub session: i64,
}

impl CheckInCounts {
    pub fn set(&mut self, check_in_type: CheckInType, count: i64) {
        match check_in_type {
            CheckInType::Entry => self.entry = count,
            CheckInType::Lunch => self.lunch = count,
            CheckInType::Dinner => self.dinner = count,
            CheckInType::Session => self.session = count,
        }
    }

    pub fn total(&self) -> i64 {
        self.entry + self.lunch + self.dinner + self.session
    }
}

/// Statistics for registered attendees.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerStats {
    pub total: i64,
    pub delegates_attending: i64,
    pub check_ins: CheckInCounts,
}

/// Statistics for guest passes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestPassStats {
    pub total: i64,
    pub assigned: i64,
    pub check_ins: CheckInCounts,
}

/// Volunteer counts by status.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerStats {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

/// Dashboard response for `GET /stats`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub farmers: FarmerStats,
    pub guest_passes: GuestPassStats,
    pub volunteers: VolunteerStats,
    pub feedback_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_counts_set_and_total() {
        let mut counts = CheckInCounts::default();
        counts.set(CheckInType::Entry, 10);
        counts.set(CheckInType::Lunch, 7);
        counts.set(CheckInType::Session, 2);
        assert_eq!(counts.dinner, 0);
        assert_eq!(counts.total(), 19);
    }

    #[test]
    fn test_event_stats_serialization() {
        let stats = EventStats::default();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["guestPasses"]["assigned"], 0);
        assert_eq!(json["farmers"]["checkIns"]["entry"], 0);
        assert_eq!(json["feedbackCount"], 0);
    }
}
