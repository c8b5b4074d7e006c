//! Cascading project -> units -> unit selection.
//!
//! State lives behind a mutex that is only held for synchronous updates, so
//! several loads may be in flight at once. Every unit load is tagged with a
//! generation; a response whose generation is no longer current is dropped.

use crate::domain::model::{
    CalculationRequest, Project, Selection, Unit, DEFAULT_HORIZON_YEARS, MAX_HORIZON_YEARS,
};
use crate::domain::ports::ProjectDirectory;
use crate::utils::error::{Result, SimError};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UnitsPhase {
    #[default]
    Idle,
    LoadingUnits,
    UnitsReady,
    UnitsEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitLoadOutcome {
    Ready(usize),
    Empty,
    /// A newer load started before this one finished; its response was ignored.
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionSnapshot {
    pub projects: Vec<Project>,
    pub units: Vec<Unit>,
    pub selection: Selection,
    pub phase: UnitsPhase,
    pub busy: bool,
    pub generation: u64,
}

impl SelectionSnapshot {
    /// The selected unit, provided it belongs to the selected project.
    pub fn selected_unit(&self) -> Option<&Unit> {
        let id = self.selection.selected_unit_id?;
        self.find_unit(id)
    }

    fn find_unit(&self, id: i64) -> Option<&Unit> {
        self.units
            .iter()
            .find(|u| u.id == id && u.project == self.selection.selected_project)
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    snapshot: SelectionSnapshot,
    in_flight: usize,
}

/// Mutex-guarded state plus a watch channel that publishes every change.
#[derive(Debug)]
pub(crate) struct SelectionStore {
    state: Mutex<ControllerState>,
    updates: watch::Sender<SelectionSnapshot>,
}

impl SelectionStore {
    fn new(snapshot: SelectionSnapshot) -> Self {
        let (updates, _) = watch::channel(snapshot.clone());
        Self {
            state: Mutex::new(ControllerState {
                snapshot,
                in_flight: 0,
            }),
            updates,
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut ControllerState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let out = f(&mut state);
        state.snapshot.busy = state.in_flight > 0;
        self.updates.send_replace(state.snapshot.clone());
        out
    }

    fn snapshot(&self) -> SelectionSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    pub(crate) fn busy_guard(&self) -> BusyGuard<'_> {
        self.update(|s| s.in_flight += 1);
        BusyGuard { store: self }
    }
}

/// Keeps the busy flag raised until dropped, whatever the request outcome.
pub(crate) struct BusyGuard<'a> {
    store: &'a SelectionStore,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.store
            .update(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}

pub struct SelectionController<D: ProjectDirectory> {
    directory: D,
    store: SelectionStore,
}

impl<D: ProjectDirectory> SelectionController<D> {
    pub fn new(directory: D) -> Self {
        Self::with_horizon(directory, DEFAULT_HORIZON_YEARS)
    }

    pub fn with_horizon(directory: D, horizon_years: i32) -> Self {
        let snapshot = SelectionSnapshot {
            selection: Selection {
                horizon_years: horizon_years.min(MAX_HORIZON_YEARS),
                ..Selection::default()
            },
            ..SelectionSnapshot::default()
        };
        Self {
            directory,
            store: SelectionStore::new(snapshot),
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.store.snapshot()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SelectionSnapshot> {
        self.store.updates.subscribe()
    }

    pub(crate) fn busy_guard(&self) -> BusyGuard<'_> {
        self.store.busy_guard()
    }

    /// Fetches the project list and cascades into the first project's units.
    pub async fn load_projects(&self) -> Result<usize> {
        let fetched = {
            let _busy = self.store.busy_guard();
            self.directory.list_projects().await
        };

        let projects = match fetched {
            Ok(projects) => projects,
            Err(e) => {
                tracing::error!("Failed to load projects: {}", e);
                self.store.update(|s| s.snapshot.projects.clear());
                return Err(e);
            }
        };

        let count = projects.len();
        let first = projects.first().map(|p| p.name.clone());
        self.store.update(|s| s.snapshot.projects = projects);
        tracing::info!("Loaded {} projects", count);

        if let Some(first) = first {
            // Unit failures are logged and reflected in state by load_units.
            if let Err(e) = self.select_project(&first).await {
                tracing::debug!("Initial unit load for {} failed: {}", first, e);
            }
        }
        Ok(count)
    }

    /// Replaces the unit list with the units of `project` and selects the first one.
    pub async fn load_units(&self, project: &str) -> Result<UnitLoadOutcome> {
        let generation = self.store.update(|s| {
            s.snapshot.generation += 1;
            s.snapshot.selection.selected_project = project.to_string();
            s.snapshot.selection.selected_unit_id = None;
            s.snapshot.units.clear();
            s.snapshot.phase = UnitsPhase::LoadingUnits;
            s.snapshot.generation
        });

        let fetched = {
            let _busy = self.store.busy_guard();
            self.directory.list_units(project).await
        };

        self.store.update(|s| {
            if s.snapshot.generation != generation {
                tracing::debug!(
                    "Discarding stale unit response for {} (generation {} < {})",
                    project,
                    generation,
                    s.snapshot.generation
                );
                return Ok(UnitLoadOutcome::Stale);
            }

            match fetched {
                Ok(units) => {
                    // 後端可能未精確過濾，客戶端再過濾一次
                    let units: Vec<Unit> =
                        units.into_iter().filter(|u| u.project == project).collect();
                    let count = units.len();
                    s.snapshot.selection.selected_unit_id = units.first().map(|u| u.id);
                    s.snapshot.units = units;
                    if count == 0 {
                        s.snapshot.phase = UnitsPhase::UnitsEmpty;
                        tracing::info!("No units available for {}", project);
                        Ok(UnitLoadOutcome::Empty)
                    } else {
                        s.snapshot.phase = UnitsPhase::UnitsReady;
                        tracing::info!("Loaded {} units for {}", count, project);
                        Ok(UnitLoadOutcome::Ready(count))
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to load units for {}: {}", project, e);
                    s.snapshot.units.clear();
                    s.snapshot.selection.selected_unit_id = None;
                    s.snapshot.phase = UnitsPhase::UnitsEmpty;
                    Err(e)
                }
            }
        })
    }

    pub async fn select_project(&self, project: &str) -> Result<UnitLoadOutcome> {
        tracing::debug!("Project selected: {}", project);
        self.load_units(project).await
    }

    /// Like `select_project`, but rejects names missing from the loaded project list.
    pub async fn select_listed_project(&self, project: &str) -> Result<UnitLoadOutcome> {
        let listed = self
            .snapshot()
            .projects
            .iter()
            .any(|p| p.name == project);
        if !listed {
            return Err(SimError::validation(format!(
                "project '{}' is not in the project list",
                project
            )));
        }
        self.select_project(project).await
    }

    /// Only ids from the current unit list are accepted.
    pub fn select_unit(&self, unit_id: i64) -> Result<()> {
        self.store.update(|s| {
            if let Some(unit) = s.snapshot.find_unit(unit_id) {
                tracing::debug!("Unit selected: {} ({})", unit_id, unit.description());
                s.snapshot.selection.selected_unit_id = Some(unit_id);
                Ok(())
            } else {
                Err(SimError::validation(format!(
                    "unit {} is not available for project {}",
                    unit_id, s.snapshot.selection.selected_project
                )))
            }
        })
    }

    /// Truncates values above the maximum; returns the stored horizon.
    pub fn set_horizon(&self, years: i32) -> i32 {
        let stored = years.min(MAX_HORIZON_YEARS);
        if stored < 1 {
            tracing::warn!("Horizon {} is below one year; passing it through", stored);
        }
        self.store
            .update(|s| s.snapshot.selection.horizon_years = stored);
        stored
    }

    /// Builds the calculation request from the selected unit. No unit, no request.
    pub fn submit(&self) -> Result<CalculationRequest> {
        let snapshot = self.snapshot();
        let Some(unit) = snapshot.selected_unit() else {
            tracing::warn!(
                "Submit blocked: no unit selected for project '{}'",
                snapshot.selection.selected_project
            );
            return Err(SimError::validation("no unit selected"));
        };

        Ok(CalculationRequest {
            project: snapshot.selection.selected_project.clone(),
            unit_id: unit.id,
            horizon_years: snapshot.selection.horizon_years,
            price: unit.price,
            surface_area: unit.surface_area,
            down_payment_ratio: unit.down_payment_ratio,
        })
    }
}
