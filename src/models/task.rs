// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task and work-interval models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Task lifecycle status, numeric on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TaskStatus {
    Cancelled,
    Active,
    Completed,
}

impl TryFrom<i64> for TaskStatus {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(TaskStatus::Cancelled),
            0 => Ok(TaskStatus::Active),
            1 => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status {}", other)),
        }
    }
}

impl From<TaskStatus> for i64 {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Cancelled => -1,
            TaskStatus::Active => 0,
            TaskStatus::Completed => 1,
        }
    }
}

/// One worker's work interval on a task. Open while `end_date` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    #[serde(alias = "taskId")]
    pub task_id: String,
    #[serde(alias = "userId", alias = "workerId", alias = "worker_id")]
    pub user_id: String,
    #[serde(alias = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }
}

/// A repair job on a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub immatriculation: String,
    #[serde(default, alias = "vehicleModel")]
    pub vehicle_model: String,
    /// Estimated hours
    #[serde(default)]
    pub hours: f64,
    #[serde(default)]
    pub price: f64,
    pub status: TaskStatus,
    #[serde(default, alias = "taskRecords", alias = "records")]
    pub task_records: Vec<TaskRecord>,
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    pub fn open_records(&self) -> impl Iterator<Item = &TaskRecord> {
        self.task_records.iter().filter(|r| r.is_open())
    }

    pub fn open_record_for(&self, user_id: &str) -> Option<&TaskRecord> {
        self.open_records().find(|r| r.user_id == user_id)
    }

    /// Insert or replace a record by id.
    pub fn upsert_record(&mut self, record: TaskRecord) {
        match self.task_records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.task_records.push(record),
        }
    }
}

/// Request body for creating a task.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, message = "task name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "immatriculation is required"))]
    pub immatriculation: String,
    pub vehicle_model: String,
    #[validate(range(min = 0.0))]
    pub hours: f64,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub garage_id: String,
}

/// Request body for updating a task. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub immatriculation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
}
