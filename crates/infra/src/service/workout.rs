use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use gymgrid_auth::{DenyReason, Identity, RecordKind, policy, scope};
use gymgrid_core::{DomainError, TaskId};
use gymgrid_workouts::{CreatePlan, CreateTask, TaskStatus, WorkoutPlan, WorkoutTask};

use crate::error::{EngineError, EngineResult};
use crate::store::{BranchStore, IdentityStore, PlanStore, TaskStore};

/// Workout plans and member tasks.
pub struct WorkoutService {
    users: Arc<dyn IdentityStore>,
    branches: Arc<dyn BranchStore>,
    plans: Arc<dyn PlanStore>,
    tasks: Arc<dyn TaskStore>,
}

impl WorkoutService {
    pub fn new(
        users: Arc<dyn IdentityStore>,
        branches: Arc<dyn BranchStore>,
        plans: Arc<dyn PlanStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Self {
        Self {
            users,
            branches,
            plans,
            tasks,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Plans
    // ─────────────────────────────────────────────────────────────────────

    /// Create a plan. Trainers land in their own branch; admins must name
    /// an existing branch.
    pub fn create_plan(
        &self,
        actor: &Identity,
        cmd: CreatePlan,
        now: DateTime<Utc>,
    ) -> EngineResult<WorkoutPlan> {
        let requested_resolves = cmd
            .branch_id
            .is_some_and(|id| self.branches.get_branch(id).is_some());
        let branch_id = policy::authorize_create_plan(actor, cmd.branch_id, requested_resolves)?;

        let plan = WorkoutPlan::create(cmd, actor.user_id, branch_id, now).map_err(|e| match e {
            DomainError::Validation(msg) => EngineError::validation("title", msg),
            other => EngineError::validation("title", other.to_string()),
        })?;

        self.plans.insert_plan(plan.clone());
        info!(plan_id = %plan.id, branch_id = %plan.branch_id, "workout plan created");
        Ok(plan)
    }

    /// List plans visible to `actor`. Members are denied outright.
    pub fn list_plans(&self, actor: &Identity) -> EngineResult<Vec<WorkoutPlan>> {
        let scope = scope::scope(actor, RecordKind::WorkoutPlans);
        if scope.is_forbidden() {
            return Err(DenyReason::RoleNotAllowed(actor.role).into());
        }
        Ok(self
            .plans
            .list_plans()
            .into_iter()
            .filter(|p| scope.matches_branch(Some(p.branch_id)))
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tasks
    // ─────────────────────────────────────────────────────────────────────

    /// Assign a task to a member.
    pub fn create_task(
        &self,
        actor: &Identity,
        cmd: CreateTask,
        now: DateTime<Utc>,
    ) -> EngineResult<WorkoutTask> {
        let plan = self
            .plans
            .get_plan(cmd.plan_id)
            .ok_or(EngineError::InvalidReference("workout plan"))?;
        let assignee = self
            .users
            .get_user(cmd.member_id)
            .ok_or(EngineError::InvalidReference("member"))?;

        policy::authorize_create_task(actor, plan.branch_id, assignee.role, assignee.branch_id)
            .require()?;

        let task = WorkoutTask::create(cmd, now);
        self.tasks.insert_task(task.clone());
        info!(task_id = %task.id, member_id = %task.member_id, "workout task assigned");
        Ok(task)
    }

    /// Change a task's status. Any status is reachable from any other; only
    /// the actor is constrained.
    pub fn update_task_status(
        &self,
        actor: &Identity,
        task_id: TaskId,
        new_status: &str,
    ) -> EngineResult<WorkoutTask> {
        let task = self
            .tasks
            .get_task(task_id)
            .ok_or(EngineError::InvalidReference("task"))?;
        let plan = self
            .plans
            .get_plan(task.plan_id)
            .ok_or(EngineError::InvalidReference("workout plan"))?;

        policy::authorize_update_task_status(actor, task.member_id, plan.branch_id).require()?;

        let status: TaskStatus = new_status
            .parse()
            .map_err(|e: DomainError| EngineError::validation("status", e.to_string()))?;

        self.tasks
            .set_status(task_id, status)
            .ok_or(EngineError::InvalidReference("task"))
    }

    /// List tasks visible to `actor`: admins all, members their own,
    /// managers/trainers their branch.
    pub fn list_tasks(&self, actor: &Identity) -> EngineResult<Vec<WorkoutTask>> {
        let scope = scope::scope(actor, RecordKind::WorkoutTasks);
        Ok(self
            .tasks
            .list_tasks()
            .into_iter()
            .filter(|t| {
                scope.matches_owner(t.member_id)
                    || self
                        .plans
                        .get_plan(t.plan_id)
                        .is_some_and(|p| scope.matches_branch(Some(p.branch_id)))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gymgrid_auth::{NewUserGrant, Role};
    use gymgrid_branches::{CreateBranch, GymBranch};
    use gymgrid_core::{BranchId, Email, UserId};
    use gymgrid_identity::UserAccount;

    use crate::memory::{
        InMemoryBranchStore, InMemoryIdentityStore, InMemoryPlanStore, InMemoryTaskStore,
    };

    struct Fixture {
        service: WorkoutService,
        users: Arc<InMemoryIdentityStore>,
        branches: Arc<InMemoryBranchStore>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryIdentityStore::new());
        let branches = Arc::new(InMemoryBranchStore::new());
        let service = WorkoutService::new(
            users.clone(),
            branches.clone(),
            Arc::new(InMemoryPlanStore::new()),
            Arc::new(InMemoryTaskStore::new()),
        );
        Fixture {
            service,
            users,
            branches,
        }
    }

    fn seed_branch(fx: &Fixture, name: &str) -> BranchId {
        let branch = GymBranch::create(
            CreateBranch {
                name: name.into(),
                location: String::new(),
            },
            Utc::now(),
        )
        .unwrap();
        let id = branch.id;
        fx.branches.insert_branch(branch);
        id
    }

    fn seed_user(fx: &Fixture, role: Role, branch: Option<BranchId>, email: &str) -> UserAccount {
        fx.users
            .create_user(UserAccount::from_grant(
                Email::parse(email).unwrap(),
                NewUserGrant {
                    role,
                    branch_id: branch,
                },
                Utc::now(),
            ))
            .unwrap()
    }

    fn plan_cmd() -> CreatePlan {
        CreatePlan {
            title: "Conditioning".into(),
            description: "Week 1".into(),
            branch_id: None,
        }
    }

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 15).unwrap()
    }

    #[test]
    fn trainer_plan_is_forced_into_own_branch() {
        let fx = fixture();
        let own = seed_branch(&fx, "A");
        let other = seed_branch(&fx, "B");
        let trainer = Identity::new(UserId::new(), Role::Trainer, Some(own));

        let plan = fx
            .service
            .create_plan(
                &trainer,
                CreatePlan {
                    branch_id: Some(other),
                    ..plan_cmd()
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(plan.branch_id, own);
    }

    #[test]
    fn admin_plan_with_dangling_branch_is_denied_as_missing_reference() {
        let fx = fixture();
        let admin = Identity::admin(UserId::new());

        let err = fx
            .service
            .create_plan(
                &admin,
                CreatePlan {
                    branch_id: Some(BranchId::new()),
                    ..plan_cmd()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::PermissionDenied(DenyReason::InvalidReference)
        );
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn members_cannot_list_plans() {
        let fx = fixture();
        let member = Identity::new(UserId::new(), Role::Member, None);
        assert_eq!(fx.service.list_plans(&member).unwrap_err().status(), 403);
    }

    #[test]
    fn cross_branch_task_assignment_is_denied_with_distinct_reasons() {
        let fx = fixture();
        let own = seed_branch(&fx, "A");
        let other = seed_branch(&fx, "B");
        let trainer = Identity::new(UserId::new(), Role::Trainer, Some(own));

        let own_plan = fx.service.create_plan(&trainer, plan_cmd(), Utc::now()).unwrap();
        let other_trainer = Identity::new(UserId::new(), Role::Trainer, Some(other));
        let other_plan = fx
            .service
            .create_plan(&other_trainer, plan_cmd(), Utc::now())
            .unwrap();

        let same_branch_member = seed_user(&fx, Role::Member, Some(own), "m1@gym.com");
        let cross_branch_member = seed_user(&fx, Role::Member, Some(other), "m2@gym.com");

        let err = fx
            .service
            .create_task(
                &trainer,
                CreateTask {
                    plan_id: other_plan.id,
                    member_id: same_branch_member.id,
                    status: None,
                    due_date: due(),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::PermissionDenied(DenyReason::CrossBranchPlan));

        let err = fx
            .service
            .create_task(
                &trainer,
                CreateTask {
                    plan_id: own_plan.id,
                    member_id: cross_branch_member.id,
                    status: None,
                    due_date: due(),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::PermissionDenied(DenyReason::CrossBranchMember));

        let fellow_trainer = seed_user(&fx, Role::Trainer, Some(own), "t2@gym.com");
        let err = fx
            .service
            .create_task(
                &trainer,
                CreateTask {
                    plan_id: own_plan.id,
                    member_id: fellow_trainer.id,
                    status: None,
                    due_date: due(),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::PermissionDenied(DenyReason::InvalidAssignee));
    }

    #[test]
    fn status_update_permissions_follow_the_rule_table() {
        let fx = fixture();
        let branch = seed_branch(&fx, "A");
        let trainer = Identity::new(UserId::new(), Role::Trainer, Some(branch));
        let plan = fx.service.create_plan(&trainer, plan_cmd(), Utc::now()).unwrap();

        let member = seed_user(&fx, Role::Member, Some(branch), "m@gym.com");
        let task = fx
            .service
            .create_task(
                &trainer,
                CreateTask {
                    plan_id: plan.id,
                    member_id: member.id,
                    status: None,
                    due_date: due(),
                },
                Utc::now(),
            )
            .unwrap();

        // Assignee may move their own task.
        let me = member.identity();
        let updated = fx
            .service
            .update_task_status(&me, task.id, "in_progress")
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);

        // Another member may not, whatever the requested status.
        let stranger = seed_user(&fx, Role::Member, Some(branch), "other@gym.com");
        let err = fx
            .service
            .update_task_status(&stranger.identity(), task.id, "completed")
            .unwrap_err();
        assert_eq!(err.status(), 403);

        // Managers never mutate tasks, even in their own branch.
        let manager = Identity::new(UserId::new(), Role::Manager, Some(branch));
        let err = fx
            .service
            .update_task_status(&manager, task.id, "completed")
            .unwrap_err();
        assert_eq!(err.status(), 403);

        // Cross-branch trainer is denied; admin is not.
        let foreign_trainer = Identity::new(UserId::new(), Role::Trainer, Some(BranchId::new()));
        assert_eq!(
            fx.service
                .update_task_status(&foreign_trainer, task.id, "completed")
                .unwrap_err(),
            EngineError::PermissionDenied(DenyReason::CrossBranchPlan)
        );
        let admin = Identity::admin(UserId::new());
        let done = fx
            .service
            .update_task_status(&admin, task.id, "completed")
            .unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let fx = fixture();
        let branch = seed_branch(&fx, "A");
        let trainer = Identity::new(UserId::new(), Role::Trainer, Some(branch));
        let plan = fx.service.create_plan(&trainer, plan_cmd(), Utc::now()).unwrap();
        let member = seed_user(&fx, Role::Member, Some(branch), "m@gym.com");
        let task = fx
            .service
            .create_task(
                &trainer,
                CreateTask {
                    plan_id: plan.id,
                    member_id: member.id,
                    status: None,
                    due_date: due(),
                },
                Utc::now(),
            )
            .unwrap();

        let err = fx
            .service
            .update_task_status(&Identity::admin(UserId::new()), task.id, "done")
            .unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn task_listings_are_scoped_per_role() {
        let fx = fixture();
        let branch_a = seed_branch(&fx, "A");
        let branch_b = seed_branch(&fx, "B");

        let trainer_a = Identity::new(UserId::new(), Role::Trainer, Some(branch_a));
        let trainer_b = Identity::new(UserId::new(), Role::Trainer, Some(branch_b));
        let plan_a = fx.service.create_plan(&trainer_a, plan_cmd(), Utc::now()).unwrap();
        let plan_b = fx.service.create_plan(&trainer_b, plan_cmd(), Utc::now()).unwrap();

        let member_a = seed_user(&fx, Role::Member, Some(branch_a), "a@gym.com");
        let member_b = seed_user(&fx, Role::Member, Some(branch_b), "b@gym.com");

        fx.service
            .create_task(
                &trainer_a,
                CreateTask {
                    plan_id: plan_a.id,
                    member_id: member_a.id,
                    status: None,
                    due_date: due(),
                },
                Utc::now(),
            )
            .unwrap();
        fx.service
            .create_task(
                &trainer_b,
                CreateTask {
                    plan_id: plan_b.id,
                    member_id: member_b.id,
                    status: None,
                    due_date: due(),
                },
                Utc::now(),
            )
            .unwrap();

        assert_eq!(fx.service.list_tasks(&Identity::admin(UserId::new())).unwrap().len(), 2);
        assert_eq!(fx.service.list_tasks(&trainer_a).unwrap().len(), 1);

        let manager_b = Identity::new(UserId::new(), Role::Manager, Some(branch_b));
        assert_eq!(fx.service.list_tasks(&manager_b).unwrap().len(), 1);

        let me = member_a.identity();
        let mine = fx.service.list_tasks(&me).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].member_id, member_a.id);
    }
}
