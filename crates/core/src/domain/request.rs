use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::material::{Material, MaterialId};
use crate::errors::ValidationError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Draft,
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] =
        [Self::Draft, Self::PendingApproval, Self::Approved, Self::Rejected];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingApproval => "Pending Approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match compact_key(value).as_str() {
            "draft" => Ok(Self::Draft),
            "pendingapproval" | "pending" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ValidationError::UnknownValue { kind: "status", value: value.to_string() }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Piece,
    Kg,
    Liter,
    Package,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Self::Piece, Self::Kg, Self::Liter, Self::Package];

    /// Cycles through [`Unit::ALL`], used by the synthetic catalog and seed data.
    pub fn cycle(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Piece => "Piece",
            Self::Kg => "Kg",
            Self::Liter => "Liter",
            Self::Package => "Package",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match compact_key(value).as_str() {
            "piece" | "pcs" => Ok(Self::Piece),
            "kg" => Ok(Self::Kg),
            "liter" | "litre" => Ok(Self::Liter),
            "package" | "pkg" => Ok(Self::Package),
            _ => Err(ValidationError::UnknownValue { kind: "unit", value: value.to_string() }),
        }
    }
}

fn compact_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub unit: Unit,
    pub material_id: Option<MaterialId>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub code: Option<String>,
}

impl RequestItem {
    /// Free-hand item typed by the requester, not linked to the catalog.
    pub fn new(name: impl Into<String>, quantity: u32, unit: Unit) -> Self {
        Self {
            id: ItemId(Uuid::new_v4().to_string()),
            name: name.into(),
            quantity,
            unit,
            material_id: None,
            category: None,
            subcategory: None,
            code: None,
        }
    }

    /// Copies the catalog fields into a new item; later catalog changes never reach it.
    pub fn from_material(material: &Material, quantity: u32) -> Self {
        Self {
            id: ItemId(Uuid::new_v4().to_string()),
            name: material.name.clone(),
            quantity,
            unit: material.unit,
            material_id: Some(material.id.clone()),
            category: Some(material.category.clone()),
            subcategory: Some(material.subcategory.clone()),
            code: material.code.clone(),
        }
    }

    pub fn is_from_catalog(&self) -> bool {
        self.material_id.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryAction {
    #[serde(rename = "Request Created")]
    RequestCreated,
    #[serde(rename = "Request Updated")]
    RequestUpdated,
    #[serde(rename = "Status Changed")]
    StatusChanged,
    #[serde(rename = "Comment Added")]
    CommentAdded,
    #[serde(rename = "Attachment Added")]
    AttachmentAdded,
}

impl HistoryAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::RequestCreated => "Request Created",
            Self::RequestUpdated => "Request Updated",
            Self::StatusChanged => "Status Changed",
            Self::CommentAdded => "Comment Added",
            Self::AttachmentAdded => "Attachment Added",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    pub id: String,
    pub user: String,
    pub action: HistoryAction,
    pub timestamp: DateTime<Utc>,
    pub comment: Option<String>,
}

impl HistoryLog {
    pub fn new(user: impl Into<String>, action: HistoryAction, comment: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user: user.into(),
            action,
            timestamp: Utc::now(),
            comment,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    pub file_url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Attachment metadata supplied by the caller. Nothing is uploaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttachment {
    pub file_name: String,
    pub file_url: Option<String>,
}

impl NewAttachment {
    pub fn named(file_name: impl Into<String>) -> Self {
        Self { file_name: file_name.into(), file_url: None }
    }

    /// Falls back to a `#slug` reference derived from the file name.
    pub fn resolved_url(&self) -> String {
        match self.file_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                let slug = self
                    .file_name
                    .trim()
                    .to_lowercase()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join("-");
                format!("#{slug}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub id: RequestId,
    pub title: String,
    pub requester: String,
    pub department: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<RequestItem>,
    pub history: Vec<HistoryLog>,
    pub attachments: Vec<Attachment>,
    pub notes: Vec<HistoryLog>,
}

impl PurchaseRequest {
    pub fn is_editable(&self) -> bool {
        self.status == RequestStatus::Draft
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn latest_entry(&self) -> Option<&HistoryLog> {
        self.history.last()
    }

    pub(crate) fn record(&mut self, entry: HistoryLog) {
        self.history.push(entry);
    }
}

/// Fields a caller supplies to open a new request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRequest {
    pub title: String,
    pub requester: String,
    pub department: String,
    pub items: Vec<RequestItem>,
}

impl NewRequest {
    /// Trims the text fields and drops blank items, then checks what remains.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let title = required("title", &self.title)?;
        let requester = required("requester", &self.requester)?;
        let department = required("department", &self.department)?;
        let items = validated_items(self.items)?;

        Ok(Self { title, requester, department, items })
    }
}

/// Partial update. `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPatch {
    pub title: Option<String>,
    pub requester: Option<String>,
    pub department: Option<String>,
    pub items: Option<Vec<RequestItem>>,
}

impl RequestPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.requester.is_none()
            && self.department.is_none()
            && self.items.is_none()
    }

    /// Merged view of `current` with this patch applied, validated like a new request.
    pub(crate) fn merge_onto(
        self,
        current: &PurchaseRequest,
    ) -> Result<NewRequest, ValidationError> {
        NewRequest {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            requester: self.requester.unwrap_or_else(|| current.requester.clone()),
            department: self.department.unwrap_or_else(|| current.department.clone()),
            items: self.items.unwrap_or_else(|| current.items.clone()),
        }
        .validated()
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

fn validated_items(items: Vec<RequestItem>) -> Result<Vec<RequestItem>, ValidationError> {
    let items = items
        .into_iter()
        .filter(|item| !item.name.trim().is_empty())
        .map(|item| RequestItem { name: item.name.trim().to_string(), ..item })
        .collect::<Vec<_>>();

    if items.is_empty() {
        return Err(ValidationError::NoItems);
    }

    if let Some(item) = items.iter().find(|item| item.quantity == 0) {
        return Err(ValidationError::InvalidQuantity { item: item.name.clone() });
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::{NewAttachment, NewRequest, RequestItem, RequestStatus, Unit};
    use crate::domain::material::{Material, MaterialId};
    use crate::errors::ValidationError;

    fn new_request() -> NewRequest {
        NewRequest {
            title: "  Lab Glassware  ".to_string(),
            requester: "Dr. Smith".to_string(),
            department: "Research".to_string(),
            items: vec![RequestItem::new("Beaker 250ml", 4, Unit::Piece), RequestItem::new("   ", 1, Unit::Kg)],
        }
    }

    #[test]
    fn validation_trims_fields_and_drops_blank_items() {
        let validated = new_request().validated().expect("valid request");

        assert_eq!(validated.title, "Lab Glassware");
        assert_eq!(validated.items.len(), 1);
        assert_eq!(validated.items[0].name, "Beaker 250ml");
    }

    #[test]
    fn validation_rejects_blank_required_field() {
        let error = NewRequest { department: " ".to_string(), ..new_request() }
            .validated()
            .expect_err("blank department");

        assert_eq!(error, ValidationError::MissingField { field: "department" });
    }

    #[test]
    fn validation_rejects_requests_without_named_items() {
        let error = NewRequest { items: vec![RequestItem::new("", 1, Unit::Piece)], ..new_request() }
            .validated()
            .expect_err("no named items");

        assert_eq!(error, ValidationError::NoItems);
    }

    #[test]
    fn validation_rejects_zero_quantity() {
        let error = NewRequest { items: vec![RequestItem::new("Gloves", 0, Unit::Package)], ..new_request() }
            .validated()
            .expect_err("zero quantity");

        assert!(matches!(error, ValidationError::InvalidQuantity { ref item } if item == "Gloves"));
    }

    #[test]
    fn status_parses_labels_and_compact_forms() {
        assert_eq!("Pending Approval".parse::<RequestStatus>(), Ok(RequestStatus::PendingApproval));
        assert_eq!("pending_approval".parse::<RequestStatus>(), Ok(RequestStatus::PendingApproval));
        assert_eq!("REJECTED".parse::<RequestStatus>(), Ok(RequestStatus::Rejected));
        assert!("archived".parse::<RequestStatus>().is_err());
        assert_eq!(RequestStatus::PendingApproval.to_string(), "Pending Approval");
    }

    #[test]
    fn unit_parses_labels_and_abbreviations() {
        assert_eq!("Kg".parse::<Unit>(), Ok(Unit::Kg));
        assert_eq!(" litre ".parse::<Unit>(), Ok(Unit::Liter));
        assert_eq!("PKG".parse::<Unit>(), Ok(Unit::Package));
        assert_eq!("pcs".parse::<Unit>(), Ok(Unit::Piece));
        assert_eq!(
            "crate".parse::<Unit>(),
            Err(ValidationError::UnknownValue { kind: "unit", value: "crate".to_string() })
        );
    }

    #[test]
    fn status_and_unit_serialize_with_display_labels() {
        let status = serde_json::to_string(&RequestStatus::PendingApproval).expect("serialize");
        let unit = serde_json::to_string(&Unit::Liter).expect("serialize");

        assert_eq!(status, "\"Pending Approval\"");
        assert_eq!(unit, "\"Liter\"");
    }

    #[test]
    fn catalog_item_copies_material_fields() {
        let material = Material {
            id: MaterialId("IT-Laptops-3".to_string()),
            code: Some("IT-LA-003".to_string()),
            name: "Laptops Item 3".to_string(),
            category: "IT".to_string(),
            subcategory: "Laptops".to_string(),
            unit: Unit::Liter,
        };

        let item = RequestItem::from_material(&material, 2);

        assert!(item.is_from_catalog());
        assert_eq!(item.code.as_deref(), Some("IT-LA-003"));
        assert_eq!(item.unit, Unit::Liter);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn attachment_url_falls_back_to_slug() {
        assert_eq!(NewAttachment::named("Vendor  Quote.pdf").resolved_url(), "#vendor-quote.pdf");
        assert_eq!(
            NewAttachment { file_name: "a.pdf".to_string(), file_url: Some("s3://bucket/a.pdf".to_string()) }
                .resolved_url(),
            "s3://bucket/a.pdf"
        );
    }
}
