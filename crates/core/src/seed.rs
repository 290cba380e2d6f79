//! Deterministic fixtures loaded at startup.
//!
//! Ids come from a string hash and dates are anchored to a fixed base, so every
//! run produces identical requests.

use chrono::{DateTime, Duration, Utc};

use crate::domain::request::{
    HistoryAction, HistoryLog, ItemId, PurchaseRequest, RequestId, RequestItem, RequestStatus,
    Unit,
};

/// 2024-01-01T09:00:00Z
const SEED_BASE_EPOCH_SECS: i64 = 1_704_099_600;

struct SeedRequest {
    title: &'static str,
    requester: &'static str,
    department: &'static str,
    status: RequestStatus,
}

const SEED_REQUESTS: &[SeedRequest] = &[
    SeedRequest {
        title: "Office Supplies Q1 2024",
        requester: "John Doe",
        department: "Administration",
        status: RequestStatus::Approved,
    },
    SeedRequest {
        title: "Lab Equipment Upgrade",
        requester: "Dr. Smith",
        department: "Research",
        status: RequestStatus::PendingApproval,
    },
    SeedRequest {
        title: "Marketing Materials",
        requester: "Sarah Wilson",
        department: "Marketing",
        status: RequestStatus::Draft,
    },
    SeedRequest {
        title: "IT Infrastructure Update",
        requester: "Mike Johnson",
        department: "IT",
        status: RequestStatus::Rejected,
    },
];

const ITEMS_PER_REQUEST: usize = 2;

/// djb2 variant over UTF-16 code units: `h = (h * 33) ^ unit`, wrapping at 32 bits.
pub fn hash_string(input: &str) -> u32 {
    input
        .encode_utf16()
        .fold(5381u32, |hash, unit| hash.wrapping_mul(33) ^ u32::from(unit))
}

/// 16 hex characters: the 32-bit hash printed twice.
pub fn deterministic_id(base: &str) -> String {
    let hash = hash_string(base);
    format!("{hash:08x}{hash:08x}")
}

pub fn seed_base() -> DateTime<Utc> {
    DateTime::from_timestamp(SEED_BASE_EPOCH_SECS, 0).unwrap_or_default()
}

pub fn seed_requests() -> Vec<PurchaseRequest> {
    SEED_REQUESTS.iter().enumerate().map(|(index, seed)| seed_request(index, seed)).collect()
}

fn seed_request(index: usize, seed: &SeedRequest) -> PurchaseRequest {
    let title = seed.title;
    let created_at = seed_base() + Duration::days(index as i64);

    let items = (0..ITEMS_PER_REQUEST)
        .map(|item| RequestItem {
            id: ItemId(deterministic_id(&format!("{title}-item-{item}-{index}"))),
            name: format!("Item {} for {title}", item + 1),
            quantity: (((item + 1) * (index + 2)) % 10 + 1) as u32,
            unit: Unit::cycle(item + index),
            material_id: None,
            category: None,
            subcategory: None,
            code: None,
        })
        .collect();

    let mut history = vec![HistoryLog {
        id: deterministic_id(&format!("{title}-hist-0-{index}")),
        user: seed.requester.to_string(),
        action: HistoryAction::RequestCreated,
        timestamp: created_at,
        comment: Some("Initial request creation".to_string()),
    }];

    if seed.status != RequestStatus::Draft {
        history.push(HistoryLog {
            id: deterministic_id(&format!("{title}-hist-1-{index}")),
            user: seed.requester.to_string(),
            action: HistoryAction::StatusChanged,
            timestamp: created_at + Duration::hours(2),
            comment: Some(format!("Status changed to {}", seed.status)),
        });
    }

    PurchaseRequest {
        id: RequestId(deterministic_id(&format!("{title}-{index}"))),
        title: title.to_string(),
        requester: seed.requester.to_string(),
        department: seed.department.to_string(),
        status: seed.status,
        created_at,
        items,
        history,
        attachments: Vec::new(),
        notes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::{deterministic_id, hash_string, seed_base, seed_requests};
    use crate::domain::request::{HistoryAction, RequestStatus, Unit};

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(hash_string(""), 5381);
        // 5381 * 33 ^ 'a'
        assert_eq!(hash_string("a"), (5381u32 * 33) ^ 97);
        assert_eq!(deterministic_id(""), "0000150500001505");
    }

    #[test]
    fn ids_are_sixteen_hex_characters() {
        let id = deterministic_id("Office Supplies Q1 2024-0");

        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(&id[..8], &id[8..]);
    }

    #[test]
    fn seed_is_reproducible() {
        assert_eq!(seed_requests(), seed_requests());
    }

    #[test]
    fn seed_covers_every_status() {
        let requests = seed_requests();
        let statuses = requests.iter().map(|request| request.status).collect::<Vec<_>>();

        assert_eq!(
            statuses,
            vec![
                RequestStatus::Approved,
                RequestStatus::PendingApproval,
                RequestStatus::Draft,
                RequestStatus::Rejected
            ]
        );
    }

    #[test]
    fn seed_dates_are_anchored_to_base() {
        let base = seed_base();
        assert_eq!((base.year(), base.month(), base.day(), base.hour()), (2024, 1, 1, 9));

        let requests = seed_requests();
        assert_eq!(requests[3].created_at.day(), 4);
        let status_change = &requests[3].history[1];
        assert_eq!(status_change.timestamp.hour(), 11);
        assert_eq!(status_change.comment.as_deref(), Some("Status changed to Rejected"));
    }

    #[test]
    fn seed_history_matches_status() {
        for request in seed_requests() {
            assert_eq!(request.history[0].action, HistoryAction::RequestCreated);
            let expected = if request.status == RequestStatus::Draft { 1 } else { 2 };
            assert_eq!(request.history.len(), expected, "{}", request.title);
            assert!(request.notes.is_empty());
            assert!(request.attachments.is_empty());
        }
    }

    #[test]
    fn seed_items_follow_quantity_and_unit_rules() {
        let requests = seed_requests();
        let lab = &requests[1];

        assert_eq!(lab.items[0].name, "Item 1 for Lab Equipment Upgrade");
        // ((0 + 1) * (1 + 2)) % 10 + 1 == 4, ((1 + 1) * 3) % 10 + 1 == 7
        assert_eq!(lab.items[0].quantity, 4);
        assert_eq!(lab.items[1].quantity, 7);
        assert_eq!(lab.items[0].unit, Unit::Kg);
        assert_eq!(lab.items[1].unit, Unit::Liter);
    }
}
