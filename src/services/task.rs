// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Active tasks and worker time tracking.
//!
//! Tasks are scoped to the user's garage for garage-bound accounts and to
//! the company otherwise. Starting or stopping work also patches the
//! worker's task linkage in the user cache.

use super::cache::{DomainCache, Scope};
use super::user::UserService;
use crate::error::{AppError, Result};
use crate::http::{api_path, ApiClient};
use crate::models::wire::{entity_from_body, list_from_body};
use crate::models::{NewTask, Task, TaskRecord, TaskStatus, UpdateTask, UserPatch};
use validator::Validate;

#[derive(Clone)]
pub struct TaskService {
    api: ApiClient,
    cache: DomainCache<Task>,
    users: UserService,
}

impl TaskService {
    pub fn new(api: ApiClient, cache: DomainCache<Task>, users: UserService) -> Self {
        Self { api, cache, users }
    }

    fn scope(&self) -> Result<Scope> {
        Scope::workplace_of(&self.api.tokens().require_user()?)
    }

    // ─── Cache ──────────────────────────────────────────────────────────────

    pub fn save_to_cache(&self, tasks: Vec<Task>) -> Result<()> {
        self.cache.save(&self.scope()?, tasks)
    }

    pub fn get_from_cache(&self) -> Vec<Task> {
        self.scope()
            .map(|scope| self.cache.load(&scope))
            .unwrap_or_default()
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    /// Put the server's copy of a task into the active-task cache, or drop
    /// it from there once it is no longer active.
    fn store_task(&self, scope: &Scope, task: Task) -> Result<()> {
        self.cache.update(scope, |tasks| {
            let position = tasks.iter().position(|t| t.id == task.id);
            match (position, task.is_active()) {
                (Some(i), true) => tasks[i] = task,
                (Some(i), false) => {
                    tasks.remove(i);
                }
                (None, true) => tasks.push(task),
                (None, false) => {}
            }
        })?;
        Ok(())
    }

    fn store_record(&self, scope: &Scope, record: TaskRecord) -> Result<()> {
        self.cache.update(scope, |tasks| {
            if let Some(task) = tasks.iter_mut().find(|t| t.id == record.task_id) {
                task.upsert_record(record);
            }
        })?;
        Ok(())
    }

    // ─── Reads ──────────────────────────────────────────────────────────────

    /// Fetch active tasks for the current scope and replace the cache.
    pub async fn fetch_active_tasks(&self) -> Result<Vec<Task>> {
        let scope = self.scope()?;
        let path = match &scope {
            Scope::Company(id) => api_path(&["tasks", "company", id, "active"]),
            Scope::Garage(id) => api_path(&["tasks", "garage", id, "active"]),
        };

        let body = self.api.get_json(&path).await?;
        let tasks: Vec<Task> = list_from_body::<Task>(body, "tasks")?
            .into_iter()
            .filter(Task::is_active)
            .collect();

        tracing::info!(scope = %scope, count = tasks.len(), "Fetched active tasks");
        self.cache.save(&scope, tasks.clone())?;
        Ok(tasks)
    }

    /// Cached active tasks, fetched on a cold cache.
    pub async fn get_active_tasks(&self) -> Result<Vec<Task>> {
        let cached = self.cache.load(&self.scope()?);
        if cached.is_empty() {
            return self.fetch_active_tasks().await;
        }
        Ok(cached)
    }

    pub async fn find_task(&self, task_id: &str) -> Result<Task> {
        self.get_active_tasks()
            .await?
            .into_iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::NotFound(format!("Task {}", task_id)))
    }

    // ─── Time tracking ──────────────────────────────────────────────────────

    /// Open a work interval for `user_id` on `task_id`.
    ///
    /// The open-record check runs against the active-task list, read
    /// through on a cold cache. A task missing from that list is left for
    /// the server to accept or refuse.
    pub async fn start_task(&self, task_id: &str, user_id: &str) -> Result<TaskRecord> {
        let scope = self.scope()?;
        let tasks = self.get_active_tasks().await?;
        if let Some(task) = tasks.iter().find(|t| t.id == task_id) {
            if !task.is_active() {
                return Err(AppError::Conflict(format!("Task {} is not active", task_id)));
            }
            if let Some(open) = task.open_record_for(user_id) {
                return Err(AppError::Conflict(format!(
                    "User {} already has open record {} on task {}",
                    user_id, open.id, task_id
                )));
            }
        }

        let body = self
            .api
            .post_json(
                &api_path(&["tasks", task_id, "start"]),
                &serde_json::json!({ "user_id": user_id }),
            )
            .await?;
        let record: TaskRecord = entity_from_body(body, "record")?;

        tracing::info!(task_id, user_id, record_id = %record.id, "Task started");
        self.store_record(&scope, record.clone())?;
        self.users
            .update_user_in_cache(user_id, &UserPatch::working_on(task_id, &record.id))?;
        Ok(record)
    }

    /// Close the work interval `record_id` on `task_id`.
    pub async fn stop_task(&self, task_id: &str, record_id: &str) -> Result<TaskRecord> {
        let scope = self.scope()?;

        let body = self
            .api
            .patch(&api_path(&["tasks", task_id, "records", record_id, "stop"]))
            .await?;
        let record: TaskRecord = entity_from_body(body, "record")?;

        tracing::info!(task_id, record_id, "Task stopped");
        self.store_record(&scope, record.clone())?;
        self.users.release_record(record_id)?;
        Ok(record)
    }

    // ─── Status ─────────────────────────────────────────────────────────────

    pub async fn complete_task(&self, task_id: &str) -> Result<Task> {
        self.set_status(task_id, TaskStatus::Completed).await
    }

    /// Cancel a task, closing every open work interval first.
    ///
    /// The open intervals come from a fresh fetch, so ones opened from
    /// another workstation are closed too. Stops run one after another and
    /// all complete before the status change is sent; if one fails the task
    /// is left active.
    pub async fn cancel_task(&self, task_id: &str) -> Result<Task> {
        let task = self
            .fetch_active_tasks()
            .await?
            .into_iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::NotFound(format!("Task {}", task_id)))?;
        let open: Vec<String> = task.open_records().map(|r| r.id.clone()).collect();

        if !open.is_empty() {
            tracing::info!(task_id, open = open.len(), "Stopping open records before cancel");
        }
        for record_id in &open {
            self.stop_task(task_id, record_id).await?;
        }

        self.set_status(task_id, TaskStatus::Cancelled).await
    }

    async fn set_status(&self, task_id: &str, status: TaskStatus) -> Result<Task> {
        let scope = self.scope()?;

        let body = self
            .api
            .patch_json(
                &api_path(&["tasks", task_id, "status"]),
                &serde_json::json!({ "status": i64::from(status) }),
            )
            .await?;
        let task: Task = entity_from_body(body, "task")?;

        tracing::info!(task_id, status = ?task.status, "Task status changed");
        self.store_task(&scope, task.clone())?;
        Ok(task)
    }

    // ─── Task management ────────────────────────────────────────────────────

    pub async fn create_task(&self, task: &NewTask) -> Result<Task> {
        task.validate()?;
        let scope = self.scope()?;

        let body = self.api.post_json("/tasks", task).await?;
        let created: Task = entity_from_body(body, "task")?;

        tracing::info!(task_id = %created.id, "Task created");
        let in_scope = match &scope {
            Scope::Garage(id) => *id == task.garage_id,
            Scope::Company(_) => true,
        };
        if in_scope {
            self.store_task(&scope, created.clone())?;
        }
        Ok(created)
    }

    pub async fn update_task(&self, task_id: &str, update: &UpdateTask) -> Result<Task> {
        update.validate()?;
        let scope = self.scope()?;

        let body = self
            .api
            .patch_json(&api_path(&["tasks", task_id]), update)
            .await?;
        let task: Task = entity_from_body(body, "task")?;

        self.store_task(&scope, task.clone())?;
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        let scope = self.scope()?;
        self.api.delete(&api_path(&["tasks", task_id])).await?;

        tracing::info!(task_id, "Task deleted");
        self.cache
            .update(&scope, |tasks| tasks.retain(|t| t.id != task_id))?;
        Ok(())
    }
}
