use std::rc::Rc;

use vitadeck_core::{HostError, MirrorOp, ReconcilerMetrics};

use crate::host::{Backend, BackendKind, DiffDriver};
use crate::instrument::Instrumented;
use crate::mutation::MutationBackend;
use crate::persistent::PersistentBackend;

pub enum ActiveBackend {
    Persistent(Instrumented<PersistentBackend>),
    Mutation(Instrumented<MutationBackend>),
}

impl ActiveBackend {
    pub fn as_backend(&self) -> &dyn Backend {
        match self {
            ActiveBackend::Persistent(b) => b,
            ActiveBackend::Mutation(b) => b,
        }
    }

    pub fn as_backend_mut(&mut self) -> &mut dyn Backend {
        match self {
            ActiveBackend::Persistent(b) => b,
            ActiveBackend::Mutation(b) => b,
        }
    }

    /// Hands this backend to the driver through the contract it speaks.
    pub fn drive(&mut self, driver: &mut dyn DiffDriver) -> Result<(), HostError> {
        match self {
            ActiveBackend::Persistent(b) => driver.drive_persistent(b),
            ActiveBackend::Mutation(b) => driver.drive_mutation(b),
        }
    }
}

/// Owns the active backend and one metrics store per backend kind. Metrics
/// survive switching; backends do not.
pub struct ReconcilerManager {
    active: ActiveBackend,
    persistent_metrics: Rc<ReconcilerMetrics>,
    mutation_metrics: Rc<ReconcilerMetrics>,
}

impl ReconcilerManager {
    pub fn new(initial: BackendKind) -> Self {
        let persistent_metrics = Rc::new(ReconcilerMetrics::new(BackendKind::Persistent.id()));
        let mutation_metrics = Rc::new(ReconcilerMetrics::new(BackendKind::Mutation.id()));
        let mut manager = Self {
            active: ActiveBackend::Mutation(Instrumented::new(
                MutationBackend::new(),
                mutation_metrics.clone(),
            )),
            persistent_metrics,
            mutation_metrics,
        };
        manager.active = manager.fresh(initial);
        log::debug!("reconciler manager started with {} backend", initial);
        manager
    }

    fn fresh(&self, kind: BackendKind) -> ActiveBackend {
        match kind {
            BackendKind::Persistent => ActiveBackend::Persistent(Instrumented::new(
                PersistentBackend::new(),
                self.persistent_metrics.clone(),
            )),
            BackendKind::Mutation => ActiveBackend::Mutation(Instrumented::new(
                MutationBackend::new(),
                self.mutation_metrics.clone(),
            )),
        }
    }

    pub fn active_kind(&self) -> BackendKind {
        self.active.as_backend().kind()
    }

    pub fn active(&self) -> &ActiveBackend {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActiveBackend {
        &mut self.active
    }

    pub fn backend(&self) -> &dyn Backend {
        self.active.as_backend()
    }

    pub fn metrics(&self, kind: BackendKind) -> &Rc<ReconcilerMetrics> {
        match kind {
            BackendKind::Persistent => &self.persistent_metrics,
            BackendKind::Mutation => &self.mutation_metrics,
        }
    }

    /// `None` resets every store.
    pub fn reset_metrics(&self, kind: Option<BackendKind>) {
        match kind {
            Some(kind) => self.metrics(kind).reset(),
            None => BackendKind::ALL
                .into_iter()
                .for_each(|k| self.metrics(k).reset()),
        }
    }

    pub fn drive(&mut self, driver: &mut dyn DiffDriver) -> Result<(), HostError> {
        self.active.drive(driver)
    }

    /// Unmounts the active backend and replaces it with a fresh one of
    /// `kind`. Returns the mirror ops the unmount produced; the caller is
    /// expected to flush them and re-render. Switching to the active kind
    /// does nothing and returns `None`.
    pub fn switch_to(&mut self, kind: BackendKind) -> Result<Option<Vec<MirrorOp>>, HostError> {
        if self.active_kind() == kind {
            return Ok(None);
        }
        let previous = self.active_kind();
        let backend = self.active.as_backend_mut();
        backend.unmount()?;
        let ops = backend.drain_mirror_ops();
        self.active = self.fresh(kind);
        log::info!("switched reconciler backend {} -> {}", previous, kind);
        Ok(Some(ops))
    }
}
