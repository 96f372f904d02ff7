//! Application state store: one in-progress application, held as immutable
//! snapshots.
//!
//! Every mutation runs the aggregate's decide/evolve pair against the current
//! snapshot and swaps in the result. Old snapshots are never touched, so a
//! caller holding an `Arc<Application>` keeps a stable view.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;

use ecert_core::{Aggregate, AggregateRoot, DomainError, DomainResult, ItemId};
use ecert_events::{Event, EventEnvelope};

use crate::application::{
    AddItem, Application, ApplicationCommand, ApplicationEvent, ChangeStatus, CreateApplication,
    RemoveItem, UpdateField,
};
use crate::field::FieldUpdate;
use crate::item::Item;
use crate::model::ApplicationStatus;

pub const AGGREGATE_TYPE: &str = "application";

#[derive(Debug, Clone)]
pub struct ApplicationStore {
    current: Arc<Application>,
    undo: Vec<Arc<Application>>,
    redo: Vec<Arc<Application>>,
    journal: Vec<EventEnvelope<ApplicationEvent>>,
}

impl ApplicationStore {
    /// Start a new application.
    pub fn create(cmd: CreateApplication) -> DomainResult<Self> {
        let (app, event) = Application::create(cmd)?;
        let envelope =
            EventEnvelope::record(app.id().to_string(), AGGREGATE_TYPE, app.version(), event);
        tracing::debug!(application_id = %app.id(), kind = %app.application_type(), "application created");

        Ok(Self {
            current: Arc::new(app),
            undo: Vec::new(),
            redo: Vec::new(),
            journal: vec![envelope],
        })
    }

    /// Re-open a stored application. The journal starts empty.
    pub fn open(app: Application) -> DomainResult<Self> {
        if !app.is_created() {
            return Err(DomainError::not_found());
        }
        tracing::debug!(application_id = %app.id(), version = app.version(), "application opened");
        Ok(Self {
            current: Arc::new(app),
            undo: Vec::new(),
            redo: Vec::new(),
            journal: Vec::new(),
        })
    }

    /// Shared handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<Application> {
        Arc::clone(&self.current)
    }

    pub fn current(&self) -> &Application {
        &self.current
    }

    /// Accepted changes, oldest first. Undo and redo move between snapshots
    /// without adding entries.
    pub fn journal(&self) -> &[EventEnvelope<ApplicationEvent>] {
        &self.journal
    }

    pub fn update(&mut self, update: FieldUpdate) -> DomainResult<Arc<Application>> {
        let command = ApplicationCommand::UpdateField(UpdateField {
            application_id: self.current.id().clone(),
            update,
            occurred_at: Utc::now(),
        });
        self.dispatch(command)
    }

    /// Dot-path form of [`update`](Self::update).
    pub fn update_path(&mut self, path: &str, value: &JsonValue) -> DomainResult<Arc<Application>> {
        let update = FieldUpdate::from_path(path, value)?;
        self.update(update)
    }

    pub fn add_item(&mut self, item: Item) -> DomainResult<Arc<Application>> {
        let command = ApplicationCommand::AddItem(AddItem {
            application_id: self.current.id().clone(),
            item,
            occurred_at: Utc::now(),
        });
        self.dispatch(command)
    }

    /// Removing an id that is not on the manifest returns the current
    /// snapshot unchanged.
    pub fn remove_item(&mut self, item_id: &ItemId) -> DomainResult<Arc<Application>> {
        let command = ApplicationCommand::RemoveItem(RemoveItem {
            application_id: self.current.id().clone(),
            item_id: item_id.clone(),
            occurred_at: Utc::now(),
        });
        self.dispatch(command)
    }

    /// Status changes are not undoable: history is cleared once one lands.
    pub fn change_status(&mut self, status: ApplicationStatus) -> DomainResult<Arc<Application>> {
        let before = self.current.status();
        let command = ApplicationCommand::ChangeStatus(ChangeStatus {
            application_id: self.current.id().clone(),
            status,
            occurred_at: Utc::now(),
        });
        let snapshot = self.dispatch(command)?;
        if snapshot.status() != before {
            self.undo.clear();
            self.redo.clear();
        }
        Ok(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Step back one snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, previous);
        self.redo.push(current);
        tracing::debug!(application_id = %self.current.id(), version = self.current.version(), "undo");
        true
    }

    /// Re-apply the last undone snapshot. Returns false when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.undo.push(current);
        tracing::debug!(application_id = %self.current.id(), version = self.current.version(), "redo");
        true
    }

    fn dispatch(&mut self, command: ApplicationCommand) -> DomainResult<Arc<Application>> {
        let (next, events) = self.current.execute(&command)?;
        let Some(next) = next else {
            return Ok(self.snapshot());
        };

        let base = self.current.version();
        for (offset, event) in events.into_iter().enumerate() {
            tracing::debug!(
                application_id = %next.id(),
                event_type = event.event_type(),
                "snapshot updated"
            );
            self.journal.push(EventEnvelope::record(
                next.id().to_string(),
                AGGREGATE_TYPE,
                base + offset as u64 + 1,
                event,
            ));
        }

        let previous = std::mem::replace(&mut self.current, Arc::new(next));
        self.undo.push(previous);
        self.redo.clear();
        Ok(self.snapshot())
    }
}
