use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use gymgrid_core::{DomainError, PlanId, TaskId, UserId};

/// Task status lifecycle.
///
/// Deliberately flat: any status is reachable from any other (a completed
/// task may be reverted) and no terminal state exists. The only constraint
/// on a transition is *who* may trigger it, which the policy engine decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl core::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(DomainError::validation(
                "status must be pending, in_progress, or completed",
            )),
        }
    }
}

/// A workout task assigned to a member.
///
/// # Invariants (at creation, enforced by policy + service)
/// - The assignee's role is member.
/// - The plan's branch equals the assignee's branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutTask {
    pub id: TaskId,
    pub plan_id: PlanId,
    pub member_id: UserId,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Payload for assigning a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    pub plan_id: PlanId,
    pub member_id: UserId,
    pub status: Option<TaskStatus>,
    pub due_date: NaiveDate,
}

impl WorkoutTask {
    pub fn create(cmd: CreateTask, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            plan_id: cmd.plan_id,
            member_id: cmd.member_id,
            status: cmd.status.unwrap_or_default(),
            due_date: cmd.due_date,
            created_at: now,
        }
    }

    /// Apply a status change. All transitions are legal, including reverts.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }
}
