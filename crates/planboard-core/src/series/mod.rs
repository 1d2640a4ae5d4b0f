//! Series mutator.
//!
//! Applies deletes and edits to the stored record set. A change aimed at a
//! materialized instance is translated into changes to its template, scoped
//! by [`UpdateMode`]:
//!
//! | operation | SINGLE                         | FUTURE                               | ALL                |
//! |-----------|--------------------------------|--------------------------------------|--------------------|
//! | delete    | skip the date on the template  | end the template the day before      | drop the template  |
//! | edit      | skip + new standalone record   | end the template + new template      | replace the record |
//!
//! The in-memory set is updated first. Store writes are fire-and-forget: a
//! failure is logged and never rolls the in-memory change back.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::activity::{Activity, ActivityDraft, UpdateMode};
use crate::error::ValidationError;
use crate::ids::IdGenerator;
use crate::recurrence;
use crate::storage::ActivityStore;

/// Outcome of a delete or submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Mutation {
    /// The target is locked; nothing changed.
    Rejected { id: String },
    /// A new record was stored.
    Created { activity: Activity },
    /// An existing record was overwritten, keeping its id.
    Replaced { activity: Activity },
    /// A record was removed.
    Removed { id: String },
    /// One occurrence was excluded from its template.
    Skipped { template: Activity, date: NaiveDate },
    /// The template now ends before the targeted occurrence.
    Truncated { template: Activity },
    /// One occurrence became a standalone record.
    Detached {
        template: Option<Activity>,
        detached: Activity,
    },
    /// The series was cut at the occurrence and continues as a new template.
    Split {
        template: Option<Activity>,
        series: Activity,
    },
    /// The template of the targeted instance is not stored.
    Missing { id: String },
}

/// Copy of `template` that no longer produces an instance on `date`.
pub fn with_skipped_date(template: &Activity, date: NaiveDate) -> Activity {
    let mut updated = template.clone();
    updated.skipped_dates.insert(date);
    updated
}

/// Copy of `template` whose recurrence ends the day before `date`.
///
/// Records without a rule are returned unchanged.
pub fn truncated_before(template: &Activity, date: NaiveDate) -> Activity {
    let mut updated = template.clone();
    if let Some(rule) = updated.recurrence.as_mut() {
        rule.end_recurrence = Some(date.pred_opt().unwrap_or(date));
    }
    updated
}

/// Owns the in-memory record set and keeps the store in step with it.
pub struct Planner<S, G> {
    store: S,
    ids: G,
    activities: Vec<Activity>,
}

impl<S: ActivityStore, G: IdGenerator> Planner<S, G> {
    /// Planner with an empty record set. Nothing is read from `store`.
    pub fn new(store: S, ids: G) -> Self {
        Self {
            store,
            ids,
            activities: Vec::new(),
        }
    }

    /// Planner seeded from `store`. A failed load is logged and leaves the
    /// record set empty.
    pub fn load(store: S, ids: G) -> Self {
        let activities = store.load_all().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load activities, starting empty");
            Vec::new()
        });
        info!(count = activities.len(), "loaded activities");
        Self {
            store,
            ids,
            activities,
        }
    }

    /// Stored records (templates and standalone activities), in insertion
    /// order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Stored record by id.
    pub fn get(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Every activity a calendar shows up to `horizon`.
    pub fn expanded(&self, horizon: NaiveDate) -> Vec<Activity> {
        recurrence::expand(&self.activities, horizon)
    }

    /// A stored record, or an instance materialized up to `horizon`.
    pub fn find(&self, id: &str, horizon: NaiveDate) -> Option<Activity> {
        if let Some(stored) = self.get(id) {
            return Some(stored.clone());
        }
        self.expanded(horizon).into_iter().find(|a| a.id == id)
    }

    /// Delete `target` (a stored record or an instance) within `scope`.
    ///
    /// `scope` only matters for recurring targets.
    pub fn delete(&mut self, target: &Activity, scope: UpdateMode) -> Mutation {
        if target.is_locked {
            warn!(id = %target.id, "refusing to delete locked activity");
            return Mutation::Rejected {
                id: target.id.clone(),
            };
        }

        if !target.is_recurring() || scope == UpdateMode::All {
            let id = target.template_id().to_string();
            self.remove(&id);
            info!(%id, "deleted activity");
            return Mutation::Removed { id };
        }

        let template_id = target.template_id();
        let Some(template) = self.get(template_id) else {
            warn!(id = %target.id, template = %template_id, "template not found");
            return Mutation::Missing {
                id: template_id.to_string(),
            };
        };

        if scope == UpdateMode::Single {
            let template = with_skipped_date(template, target.start_date);
            self.upsert(&template);
            info!(template = %template.id, date = %target.start_date, "skipped occurrence");
            Mutation::Skipped {
                template,
                date: target.start_date,
            }
        } else {
            let template = truncated_before(template, target.start_date);
            self.upsert(&template);
            info!(template = %template.id, from = %target.start_date, "ended series");
            Mutation::Truncated { template }
        }
    }

    /// Store submitted values.
    ///
    /// `editing` is the activity the form was opened on (`None` for a new
    /// activity). SINGLE and FUTURE only split a series when `editing` is a
    /// materialized instance; otherwise the record is replaced wholesale.
    ///
    /// # Errors
    /// Returns an error if the draft fails [`ActivityDraft::normalize`].
    pub fn submit(
        &mut self,
        draft: ActivityDraft,
        editing: Option<&Activity>,
        scope: Option<UpdateMode>,
    ) -> Result<Mutation, ValidationError> {
        if let Some(locked) = editing.filter(|a| a.is_locked) {
            warn!(id = %locked.id, "refusing to edit locked activity");
            return Ok(Mutation::Rejected {
                id: locked.id.clone(),
            });
        }

        let draft = draft.normalize()?;

        let Some(editing) = editing else {
            let activity = draft.into_activity(self.ids.next_id());
            self.upsert(&activity);
            info!(id = %activity.id, "created activity");
            return Ok(Mutation::Created { activity });
        };

        let mutation = match (editing.parent_id.as_deref(), scope) {
            (Some(parent_id), Some(UpdateMode::Single)) => {
                let template = self.update_template(parent_id, |t| {
                    with_skipped_date(t, editing.start_date)
                });
                let detached = ActivityDraft {
                    recurrence: None,
                    ..draft
                }
                .into_activity(self.ids.next_id());
                self.upsert(&detached);
                info!(id = %detached.id, template = %parent_id, "detached occurrence");
                Mutation::Detached { template, detached }
            }
            (Some(parent_id), Some(UpdateMode::Future)) => {
                let template = self.update_template(parent_id, |t| {
                    truncated_before(t, editing.start_date)
                });
                let series = draft.into_activity(self.ids.next_id());
                self.upsert(&series);
                info!(id = %series.id, template = %parent_id, "split series");
                Mutation::Split { template, series }
            }
            _ => {
                let activity = draft.into_activity(editing.template_id().to_string());
                self.upsert(&activity);
                info!(id = %activity.id, "replaced activity");
                Mutation::Replaced { activity }
            }
        };
        Ok(mutation)
    }

    /// Store a batch of drafts, each under a fresh id.
    ///
    /// Every draft is validated before anything is written.
    ///
    /// # Errors
    /// Returns the first validation error; nothing is stored in that case.
    pub fn import(&mut self, drafts: Vec<ActivityDraft>) -> Result<Vec<Activity>, ValidationError> {
        let drafts = drafts
            .into_iter()
            .map(ActivityDraft::normalize)
            .collect::<Result<Vec<_>, _>>()?;

        let created: Vec<Activity> = drafts
            .into_iter()
            .map(|draft| draft.into_activity(self.ids.next_id()))
            .collect();
        for activity in &created {
            self.upsert(activity);
        }
        info!(count = created.len(), "imported activities");
        Ok(created)
    }

    fn update_template(
        &mut self,
        template_id: &str,
        update: impl FnOnce(&Activity) -> Activity,
    ) -> Option<Activity> {
        let Some(template) = self.get(template_id) else {
            warn!(template = %template_id, "template not found, leaving series untouched");
            return None;
        };
        let updated = update(template);
        self.upsert(&updated);
        Some(updated)
    }

    fn upsert(&mut self, activity: &Activity) {
        match self.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(existing) => *existing = activity.clone(),
            None => self.activities.push(activity.clone()),
        }
        if let Err(e) = self.store.save(activity) {
            warn!(id = %activity.id, error = %e, "failed to save activity");
        }
    }

    fn remove(&mut self, id: &str) {
        self.activities.retain(|a| a.id != id);
        if let Err(e) = self.store.delete(id) {
            warn!(%id, error = %e, "failed to delete activity");
        }
    }
}
