use chrono::Utc;
use uuid::Uuid;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, NoopAuditSink};
use crate::domain::request::{
    Attachment, HistoryAction, HistoryLog, NewAttachment, NewRequest, PurchaseRequest, RequestId,
    RequestPatch, RequestStatus,
};
use crate::errors::{DomainError, ValidationError};
use crate::seed::seed_requests;
use crate::workflow::{TransitionOutcome, WorkflowEngine, WorkflowTransition};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorePolicy {
    /// Reject updates to requests that have left `Draft`.
    pub draft_only_edits: bool,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self { draft_only_edits: true }
    }
}

/// Owns every purchase request of a session together with its history, notes
/// and attachments.
///
/// All mutations go through `&mut self`. A failed call leaves the collection
/// exactly as it was and is reported to the audit sink.
pub struct RequestStore<S = NoopAuditSink> {
    requests: Vec<PurchaseRequest>,
    engine: WorkflowEngine,
    policy: StorePolicy,
    sink: S,
    session_id: String,
}

impl RequestStore<NoopAuditSink> {
    pub fn new(policy: StorePolicy) -> Self {
        Self::with_sink(policy, NoopAuditSink)
    }
}

impl Default for RequestStore<NoopAuditSink> {
    fn default() -> Self {
        Self::new(StorePolicy::default())
    }
}

impl<S> RequestStore<S>
where
    S: AuditSink,
{
    pub fn with_sink(policy: StorePolicy, sink: S) -> Self {
        Self {
            requests: Vec::new(),
            engine: WorkflowEngine::default(),
            policy,
            sink,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Replaces the collection with the deterministic startup fixtures.
    pub fn seeded(mut self) -> Self {
        self.requests = seed_requests();
        tracing::debug!(
            event_name = "request_store.seeded",
            correlation_id = %self.session_id,
            requests = self.requests.len(),
            "request store seeded"
        );
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn policy(&self) -> &StorePolicy {
        &self.policy
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn list(&self) -> &[PurchaseRequest] {
        &self.requests
    }

    pub fn get(&self, id: &RequestId) -> Option<&PurchaseRequest> {
        self.requests.iter().find(|request| &request.id == id)
    }

    pub fn list_by_status(&self, status: RequestStatus) -> Vec<&PurchaseRequest> {
        self.requests.iter().filter(|request| request.status == status).collect()
    }

    /// Case-insensitive match on title, requester or department. Blank matches all.
    pub fn search(&self, query: &str) -> Vec<&PurchaseRequest> {
        let needle = query.trim().to_lowercase();
        self.requests
            .iter()
            .filter(|request| {
                needle.is_empty()
                    || [&request.title, &request.requester, &request.department]
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn available_transitions(&self, id: &RequestId) -> Option<&'static [WorkflowTransition]> {
        self.get(id).map(|request| self.engine.available_actions(request.status))
    }

    pub fn total_quantity(&self, id: &RequestId) -> Option<u64> {
        self.get(id).map(PurchaseRequest::total_quantity)
    }

    pub fn create(&mut self, new_request: NewRequest) -> Result<RequestId, DomainError> {
        let context = self.context(None, &new_request.requester);
        let fields = self.audited(
            &context,
            "request.create_rejected",
            AuditCategory::Request,
            new_request.validated().map_err(DomainError::from),
        )?;

        let id = RequestId::generate();
        let request = PurchaseRequest {
            id: id.clone(),
            history: vec![HistoryLog::new(
                fields.requester.as_str(),
                HistoryAction::RequestCreated,
                Some("Initial request creation".to_string()),
            )],
            title: fields.title,
            requester: fields.requester,
            department: fields.department,
            status: self.engine.initial_status(),
            created_at: Utc::now(),
            items: fields.items,
            attachments: Vec::new(),
            notes: Vec::new(),
        };

        let context = AuditContext { request_id: Some(id.clone()), ..context };
        self.sink.emit(
            AuditEvent::new(
                &context,
                "request.created",
                AuditCategory::Request,
                AuditOutcome::Success,
            )
            .with_metadata("items", request.items.len().to_string()),
        );
        tracing::info!(
            event_name = "request.created",
            request_id = %id,
            actor = %request.requester,
            items = request.items.len(),
            "purchase request created"
        );

        self.requests.push(request);
        Ok(id)
    }

    pub fn update(
        &mut self,
        id: &RequestId,
        patch: RequestPatch,
        actor: &str,
    ) -> Result<(), DomainError> {
        let context = self.context(Some(id), actor);
        let index = self.audited(
            &context,
            "request.update_rejected",
            AuditCategory::Request,
            self.locate(id),
        )?;

        let current = &self.requests[index];
        let merged = if self.policy.draft_only_edits && !current.is_editable() {
            Err(DomainError::NotEditable { id: id.clone(), status: current.status })
        } else {
            patch.merge_onto(current).map_err(DomainError::from)
        };
        let merged =
            self.audited(&context, "request.update_rejected", AuditCategory::Request, merged)?;

        let request = &mut self.requests[index];
        request.title = merged.title;
        request.requester = merged.requester;
        request.department = merged.department;
        request.items = merged.items;
        request.record(HistoryLog::new(
            actor,
            HistoryAction::RequestUpdated,
            Some("Request details updated".to_string()),
        ));

        self.sink.emit(AuditEvent::new(
            &context,
            "request.updated",
            AuditCategory::Request,
            AuditOutcome::Success,
        ));
        tracing::info!(
            event_name = "request.updated",
            request_id = %id,
            actor,
            "purchase request updated"
        );
        Ok(())
    }

    pub fn change_status(
        &mut self,
        id: &RequestId,
        to: RequestStatus,
        actor: &str,
        comment: Option<&str>,
    ) -> Result<TransitionOutcome, DomainError> {
        let context = self.context(Some(id), actor);
        let index = self.audited(
            &context,
            "workflow.transition_rejected",
            AuditCategory::Workflow,
            self.locate(id),
        )?;

        let request = &mut self.requests[index];
        match self.engine.apply_with_audit(request, to, actor, comment, &self.sink, &context) {
            Ok(outcome) => {
                tracing::info!(
                    event_name = "workflow.transition_applied",
                    request_id = %id,
                    actor,
                    from = %outcome.from,
                    to = %outcome.to,
                    action = %outcome.action,
                    "request status changed"
                );
                Ok(outcome)
            }
            Err(error) => {
                tracing::warn!(
                    event_name = "workflow.transition_rejected",
                    request_id = %id,
                    actor,
                    error = %error,
                    "request status change rejected"
                );
                Err(error.into())
            }
        }
    }

    /// Appends the comment to both `notes` and `history`, text kept as given.
    pub fn add_comment(
        &mut self,
        id: &RequestId,
        text: &str,
        actor: &str,
    ) -> Result<HistoryLog, DomainError> {
        let context = self.context(Some(id), actor);
        let checked = self.locate(id).and_then(|index| {
            if text.trim().is_empty() {
                return Err(ValidationError::EmptyComment.into());
            }
            Ok(index)
        });
        let index = self.audited(&context, "comment.rejected", AuditCategory::Comment, checked)?;

        let entry = HistoryLog::new(actor, HistoryAction::CommentAdded, Some(text.to_string()));
        let request = &mut self.requests[index];
        request.notes.push(entry.clone());
        request.record(entry.clone());

        self.sink.emit(AuditEvent::new(
            &context,
            "comment.added",
            AuditCategory::Comment,
            AuditOutcome::Success,
        ));
        tracing::info!(event_name = "comment.added", request_id = %id, actor, "comment added");
        Ok(entry)
    }

    /// Records attachment metadata. Nothing is stored beyond the reference.
    pub fn add_attachment(
        &mut self,
        id: &RequestId,
        attachment: NewAttachment,
        actor: &str,
    ) -> Result<Attachment, DomainError> {
        let context = self.context(Some(id), actor);
        let checked = self.locate(id).and_then(|index| {
            if attachment.file_name.trim().is_empty() {
                return Err(ValidationError::EmptyFileName.into());
            }
            Ok(index)
        });
        let index =
            self.audited(&context, "attachment.rejected", AuditCategory::Attachment, checked)?;

        let file_name = attachment.file_name.trim().to_string();
        let stored = Attachment {
            id: Uuid::new_v4().to_string(),
            file_url: attachment.resolved_url(),
            file_name: file_name.clone(),
            uploaded_at: Utc::now(),
        };

        let request = &mut self.requests[index];
        request.attachments.push(stored.clone());
        request.record(HistoryLog::new(
            actor,
            HistoryAction::AttachmentAdded,
            Some(format!("Added file: {file_name}")),
        ));

        self.sink.emit(
            AuditEvent::new(
                &context,
                "attachment.added",
                AuditCategory::Attachment,
                AuditOutcome::Success,
            )
            .with_metadata("file_name", file_name),
        );
        tracing::info!(
            event_name = "attachment.added",
            request_id = %id,
            actor,
            "attachment added"
        );
        Ok(stored)
    }

    /// Removes the request outright; nothing else refers to it.
    pub fn delete(&mut self, id: &RequestId, actor: &str) -> Result<PurchaseRequest, DomainError> {
        let context = self.context(Some(id), actor);
        let index = self.audited(
            &context,
            "request.delete_rejected",
            AuditCategory::Request,
            self.locate(id),
        )?;
        let removed = self.requests.remove(index);

        self.sink.emit(AuditEvent::new(
            &context,
            "request.deleted",
            AuditCategory::Request,
            AuditOutcome::Success,
        ));
        tracing::info!(
            event_name = "request.deleted",
            request_id = %id,
            actor,
            "purchase request deleted"
        );
        Ok(removed)
    }

    /// Reports a failed pre-check made outside the store, such as a catalog
    /// lookup, as a rejected update of `id`.
    pub(crate) fn audit_update<T>(
        &self,
        id: &RequestId,
        actor: &str,
        result: Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let context = self.context(Some(id), actor);
        self.audited(&context, "request.update_rejected", AuditCategory::Request, result)
    }

    fn locate(&self, id: &RequestId) -> Result<usize, DomainError> {
        self.requests
            .iter()
            .position(|request| &request.id == id)
            .ok_or_else(|| DomainError::NotFound { id: id.clone() })
    }

    fn context(&self, id: Option<&RequestId>, actor: &str) -> AuditContext {
        AuditContext::new(id.cloned(), self.session_id.as_str(), actor)
    }

    /// Passes `result` through, reporting an error to the audit sink and the log first.
    fn audited<T>(
        &self,
        context: &AuditContext,
        event_type: &str,
        category: AuditCategory,
        result: Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        if let Err(error) = &result {
            self.sink.emit(
                AuditEvent::new(context, event_type, category, AuditOutcome::Rejected)
                    .with_metadata("error", error.to_string()),
            );
            tracing::warn!(
                event_name = event_type,
                correlation_id = %context.correlation_id,
                actor = %context.actor,
                error = %error,
                "request store operation rejected"
            );
        }
        result
    }
}
