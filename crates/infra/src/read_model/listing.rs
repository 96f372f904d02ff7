use std::sync::{Arc, RwLock};

use thiserror::Error;

use ecert_application::{Application, ApplicationStatus, ApplicationStore};
use ecert_core::{AggregateRoot, ApplicationId, DomainError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("application {0} not found")]
    NotFound(ApplicationId),

    #[error("listing storage unavailable")]
    Unavailable,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Ordered collection of every saved application.
pub trait ListingService: Send + Sync {
    /// All applications, in first-insertion order.
    fn list(&self) -> Vec<Application>;

    fn get(&self, id: &ApplicationId) -> Option<Application>;

    /// Replace the record with the same id in place, or append it.
    ///
    /// A record that has left `New` is only replaced by a legal status
    /// successor; anything else is a `Conflict`.
    fn upsert(&self, app: Application) -> Result<Upsert, ListingError>;

    /// Back-office status progression. Only the status changes.
    fn transition(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, ListingError>;

    fn contains(&self, id: &ApplicationId) -> bool {
        self.get(id).is_some()
    }

    /// Only drafts can be re-opened in the wizard.
    fn is_editable(&self, id: &ApplicationId) -> bool {
        self.get(id)
            .is_some_and(|app| app.status() == ApplicationStatus::New)
    }
}

impl<S> ListingService for Arc<S>
where
    S: ListingService + ?Sized,
{
    fn list(&self) -> Vec<Application> {
        (**self).list()
    }

    fn get(&self, id: &ApplicationId) -> Option<Application> {
        (**self).get(id)
    }

    fn upsert(&self, app: Application) -> Result<Upsert, ListingError> {
        (**self).upsert(app)
    }

    fn transition(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, ListingError> {
        (**self).transition(id, status)
    }

    fn contains(&self, id: &ApplicationId) -> bool {
        (**self).contains(id)
    }

    fn is_editable(&self, id: &ApplicationId) -> bool {
        (**self).is_editable(id)
    }
}

/// In-memory listing for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryListing {
    inner: RwLock<Vec<Application>>,
}

impl InMemoryListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing pre-filled with `apps`. Later duplicates replace earlier ones.
    pub fn with_applications(apps: impl IntoIterator<Item = Application>) -> Self {
        let listing = Self::new();
        for app in apps {
            let _ = listing.upsert(app);
        }
        listing
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|apps| apps.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ListingService for InMemoryListing {
    fn list(&self) -> Vec<Application> {
        match self.inner.read() {
            Ok(apps) => apps.clone(),
            Err(_) => vec![],
        }
    }

    fn get(&self, id: &ApplicationId) -> Option<Application> {
        let apps = self.inner.read().ok()?;
        apps.iter().find(|app| app.id() == id).cloned()
    }

    fn upsert(&self, app: Application) -> Result<Upsert, ListingError> {
        let mut apps = self.inner.write().map_err(|_| ListingError::Unavailable)?;
        let id = app.id().clone();
        let status = app.status();

        let outcome = match apps.iter_mut().find(|existing| existing.id() == &id) {
            Some(existing) => {
                let stored = existing.status();
                if stored != ApplicationStatus::New && !stored.can_transition_to(status) {
                    tracing::warn!(application_id = %id, %stored, incoming = %status, "stale upsert rejected");
                    return Err(ListingError::Domain(DomainError::conflict(format!(
                        "application {id} is already '{stored}' and cannot be saved as '{status}'"
                    ))));
                }
                *existing = app;
                Upsert::Replaced
            }
            None => {
                apps.push(app);
                Upsert::Inserted
            }
        };
        tracing::info!(application_id = %id, %status, ?outcome, "listing upsert");
        Ok(outcome)
    }

    fn transition(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, ListingError> {
        let mut apps = self.inner.write().map_err(|_| ListingError::Unavailable)?;
        let slot = apps
            .iter_mut()
            .find(|existing| existing.id() == id)
            .ok_or_else(|| ListingError::NotFound(id.clone()))?;

        let mut store = ApplicationStore::open(slot.clone())?;
        let next = store.change_status(status)?;
        *slot = next.as_ref().clone();

        tracing::info!(application_id = %id, %status, "status transition");
        Ok(slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{draft, seed_applications};
    use ecert_application::ApplicationType;

    #[test]
    fn upsert_appends_new_and_replaces_existing_in_place() {
        let listing = InMemoryListing::with_applications(seed_applications().unwrap());
        let before: Vec<ApplicationId> = listing.list().iter().map(|a| a.id().clone()).collect();

        let fresh = draft(ApplicationType::Replacement, "REP-2024-5555");
        assert_eq!(listing.upsert(fresh.clone()).unwrap(), Upsert::Inserted);
        assert_eq!(listing.len(), before.len() + 1);
        assert_eq!(listing.list().last().unwrap().id(), fresh.id());

        let draft = listing.get(&before[1]).unwrap();
        assert_eq!(listing.upsert(draft).unwrap(), Upsert::Replaced);
        let after: Vec<ApplicationId> = listing.list().iter().map(|a| a.id().clone()).collect();
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.len(), before.len() + 1);
    }

    #[test]
    fn only_new_applications_are_editable() {
        let listing = InMemoryListing::with_applications(seed_applications().unwrap());
        let waiting: ApplicationId = "APP-2024-001".parse().unwrap();
        let draft: ApplicationId = "REX-2024-002".parse().unwrap();

        assert!(!listing.is_editable(&waiting));
        assert!(listing.is_editable(&draft));
        assert!(!listing.is_editable(&"APP-2024-404".parse().unwrap()));
    }

    #[test]
    fn transition_follows_the_lifecycle() {
        let listing = InMemoryListing::with_applications(seed_applications().unwrap());
        let id: ApplicationId = "APP-2024-001".parse().unwrap();
        let before = listing.get(&id).unwrap();

        let paid = listing.transition(&id, ApplicationStatus::WaitingPayment).unwrap();
        assert_eq!(paid.status(), ApplicationStatus::WaitingPayment);
        assert_eq!(paid.consignee(), before.consignee());
        assert_eq!(paid.items(), before.items());
        assert_eq!(listing.get(&id).unwrap(), paid);

        let err = listing.transition(&id, ApplicationStatus::New).unwrap_err();
        assert!(matches!(err, ListingError::Domain(DomainError::InvariantViolation(_))));
        assert_eq!(listing.get(&id).unwrap().status(), ApplicationStatus::WaitingPayment);
    }

    #[test]
    fn stale_draft_cannot_overwrite_a_progressed_record() {
        let listing = InMemoryListing::with_applications(seed_applications().unwrap());
        let id: ApplicationId = "REX-2024-002".parse().unwrap();
        let stale = listing.get(&id).unwrap();

        let checked = listing
            .transition(&id, ApplicationStatus::WaitingDocumentCheck)
            .unwrap();

        let err = listing.upsert(stale).unwrap_err();
        assert!(matches!(err, ListingError::Domain(DomainError::Conflict(_))));
        assert_eq!(listing.get(&id).unwrap(), checked);

        // The next lifecycle step is still accepted.
        let mut store = ApplicationStore::open(checked).unwrap();
        let inspected = store.change_status(ApplicationStatus::WaitingInspection).unwrap();
        assert_eq!(listing.upsert(inspected.as_ref().clone()).unwrap(), Upsert::Replaced);
        assert_eq!(
            listing.get(&id).unwrap().status(),
            ApplicationStatus::WaitingInspection
        );
    }

    #[test]
    fn transition_of_unknown_id_is_not_found() {
        let listing = InMemoryListing::new();
        let id: ApplicationId = "APP-2024-404".parse().unwrap();
        assert_eq!(
            listing.transition(&id, ApplicationStatus::Cancelled).unwrap_err(),
            ListingError::NotFound(id)
        );
    }

    #[test]
    fn shared_listing_through_arc() {
        let listing = Arc::new(InMemoryListing::new());
        let handle = Arc::clone(&listing);
        handle.upsert(draft(ApplicationType::Export, "APP-2024-7777")).unwrap();
        assert_eq!(listing.list().len(), 1);
        assert!(ListingService::contains(&handle, &"APP-2024-7777".parse().unwrap()));
    }
}
