//! Five-step wizard over a single in-progress application.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use rand::Rng;
use serde_json::Value as JsonValue;

use ecert_application::validation::all_issues;
use ecert_application::{
    Application, ApplicationDefaults, ApplicationStatus, ApplicationStore, ApplicationType,
    CreateApplication, FieldIssue, FieldUpdate, ItemComposer, ItemDetails, NavigationPolicy,
    Step, english_issues, step_issues, weight_mismatch,
};
use ecert_catalog::{CatalogProvider, InMemoryCatalog, ProductId, ReferenceData};
use ecert_core::{AggregateRoot, ApplicationId, ItemId};
use ecert_infra::ListingService;

use crate::error::{WizardError, WizardResult};

/// Id generation gives up after this many collisions with the listing.
pub const MAX_ID_ATTEMPTS: usize = 64;

/// Drives one application through the wizard and hands it to the listing.
///
/// The wizard closes after a draft save or a final submission; every command
/// after that returns [`WizardError::Closed`]. Items are only ever added by
/// catalog product id.
pub struct WizardController<L: ListingService> {
    listing: L,
    catalog: Arc<dyn CatalogProvider>,
    store: ApplicationStore,
    step: Step,
    policy: NavigationPolicy,
    reference: ReferenceData,
    composer: ItemComposer,
    closed: bool,
}

impl<L: ListingService> WizardController<L> {
    /// Start a new application of `application_type`, dated today.
    pub fn create(
        application_type: ApplicationType,
        defaults: &ApplicationDefaults,
        listing: L,
    ) -> WizardResult<Self> {
        let today = Utc::now().date_naive();
        Self::create_with(
            application_type,
            defaults,
            listing,
            today,
            &mut rand::thread_rng(),
        )
    }

    /// Like [`create`](Self::create) with an explicit date and RNG.
    pub fn create_with<R: Rng + ?Sized>(
        application_type: ApplicationType,
        defaults: &ApplicationDefaults,
        listing: L,
        created_at: NaiveDate,
        rng: &mut R,
    ) -> WizardResult<Self> {
        let prefix = application_type.id_prefix();
        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| ApplicationId::generate(prefix, created_at.year(), rng))
            .find(|candidate| !listing.contains(candidate))
            .ok_or(WizardError::IdSpaceExhausted {
                prefix,
                attempts: MAX_ID_ATTEMPTS,
            })?;

        let store = ApplicationStore::create(CreateApplication {
            application_id: id,
            application_type,
            created_at,
            defaults: defaults.clone(),
            occurred_at: Utc::now(),
        })?;
        tracing::info!(application_id = %store.current().id(), kind = %application_type, "wizard opened for new application");

        Ok(Self::with_store(listing, store))
    }

    /// Re-open a stored application. Only drafts qualify.
    pub fn edit(id: &ApplicationId, listing: L) -> WizardResult<Self> {
        let app = listing
            .get(id)
            .ok_or_else(|| WizardError::NotFound(id.clone()))?;
        if !listing.is_editable(id) {
            return Err(WizardError::NotEditable {
                id: id.clone(),
                status: app.status(),
            });
        }

        let store = ApplicationStore::open(app)?;
        tracing::info!(application_id = %id, "wizard opened for edit");
        Ok(Self::with_store(listing, store))
    }

    fn with_store(listing: L, store: ApplicationStore) -> Self {
        Self {
            listing,
            catalog: Arc::new(InMemoryCatalog::standard()),
            store,
            step: Step::FIRST,
            policy: NavigationPolicy::default(),
            reference: ReferenceData::standard(),
            composer: ItemComposer::new(),
            closed: false,
        }
    }

    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the standard product catalog.
    pub fn with_catalog<C: CatalogProvider + 'static>(mut self, catalog: C) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = reference;
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn application(&self) -> &Application {
        self.store.current()
    }

    pub fn snapshot(&self) -> Arc<Application> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &ApplicationStore {
        &self.store
    }

    pub fn listing(&self) -> &L {
        &self.listing
    }

    /// Issues on the current step.
    pub fn current_issues(&self) -> Vec<FieldIssue> {
        step_issues(self.store.current(), self.step, &self.reference)
    }

    /// Issues across all five steps.
    pub fn issues(&self) -> Vec<FieldIssue> {
        all_issues(self.store.current(), &self.reference)
    }

    fn ensure_open(&self) -> WizardResult<()> {
        if self.closed {
            return Err(WizardError::Closed);
        }
        Ok(())
    }

    /// First step before `target` that still has issues, if the policy cares.
    fn blocking_step(&self, target: Step) -> Option<WizardError> {
        if self.policy == NavigationPolicy::Permissive {
            return None;
        }
        Step::ALL
            .into_iter()
            .filter(|s| *s < target)
            .find_map(|step| {
                let issues = step_issues(self.store.current(), step, &self.reference);
                (!issues.is_empty()).then_some(WizardError::IncompleteStep { step, issues })
            })
    }

    /// Advance one step, clamped at the last.
    pub fn next(&mut self) -> WizardResult<Step> {
        self.goto(self.step.next())
    }

    /// Go back one step, clamped at the first. Never blocked.
    pub fn previous(&mut self) -> WizardResult<Step> {
        self.goto(self.step.prev())
    }

    /// Jump to `target`. Backward jumps are never blocked.
    pub fn goto(&mut self, target: Step) -> WizardResult<Step> {
        self.ensure_open()?;
        if target > self.step {
            if let Some(err) = self.blocking_step(target) {
                tracing::debug!(from = %self.step, to = %target, "navigation blocked");
                return Err(err);
            }
        }
        self.step = target;
        Ok(self.step)
    }

    pub fn update(&mut self, update: FieldUpdate) -> WizardResult<Arc<Application>> {
        self.ensure_open()?;
        Ok(self.store.update(update)?)
    }

    pub fn update_path(&mut self, path: &str, value: &JsonValue) -> WizardResult<Arc<Application>> {
        self.ensure_open()?;
        Ok(self.store.update_path(path, value)?)
    }

    /// Look `product_id` up in the catalog, compose an item from it and
    /// append it. Unknown products are `NotFound`.
    pub fn add_item(
        &mut self,
        product_id: &ProductId,
        details: ItemDetails,
    ) -> WizardResult<Arc<Application>> {
        self.ensure_open()?;
        let item = self
            .composer
            .compose_from_catalog(self.catalog.as_ref(), product_id, details)?;
        Ok(self.store.add_item(item)?)
    }

    pub fn remove_item(&mut self, item_id: &ItemId) -> WizardResult<Arc<Application>> {
        self.ensure_open()?;
        Ok(self.store.remove_item(item_id)?)
    }

    pub fn undo(&mut self) -> WizardResult<bool> {
        self.ensure_open()?;
        Ok(self.store.undo())
    }

    pub fn redo(&mut self) -> WizardResult<bool> {
        self.ensure_open()?;
        Ok(self.store.redo())
    }

    /// Save as `New` and hand to the listing. No validation runs.
    pub fn save_draft(&mut self) -> WizardResult<Application> {
        self.ensure_open()?;
        let app = self.hand_over(ApplicationStatus::New)?;
        tracing::info!(application_id = %app.id(), "draft saved");
        Ok(app)
    }

    /// Move a copy of the store to `status` and upsert it. The wizard only
    /// adopts the copy and closes once the listing has accepted it.
    fn hand_over(&mut self, status: ApplicationStatus) -> WizardResult<Application> {
        let mut staged = self.store.clone();
        let app = staged.change_status(status)?.as_ref().clone();
        if let Err(err) = self.listing.upsert(app.clone()) {
            tracing::warn!(application_id = %app.id(), %status, error = %err, "listing rejected application");
            return Err(err.into());
        }
        self.store = staged;
        self.closed = true;
        Ok(app)
    }

    /// Validate, move to `Waiting for Document Check` and hand to the
    /// listing. A blocked submission leaves the status at `New` and the
    /// listing untouched.
    pub fn submit_final(&mut self) -> WizardResult<Application> {
        self.ensure_open()?;
        if self.step != Step::LAST {
            return Err(WizardError::NotOnFinalStep { step: self.step });
        }

        let current = self.store.current();
        if let Some(m) = weight_mismatch(current) {
            tracing::warn!(
                application_id = %current.id(),
                declared = m.declared,
                itemized = m.itemized,
                "submission blocked: net weight mismatch"
            );
            return Err(WizardError::WeightMismatch {
                declared: m.declared,
                itemized: m.itemized,
            });
        }
        let english = english_issues(current);
        if !english.is_empty() {
            let fields: Vec<String> = english.into_iter().map(|i| i.path).collect();
            tracing::warn!(application_id = %current.id(), ?fields, "submission blocked: non-English text");
            return Err(WizardError::NonEnglishText { fields });
        }

        let app = self.hand_over(ApplicationStatus::WaitingDocumentCheck)?;
        tracing::info!(application_id = %app.id(), status = %app.status(), "application submitted");
        Ok(app)
    }
}
