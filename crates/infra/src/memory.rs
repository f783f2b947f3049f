//! In-memory store implementations for tests and development.
//!
//! Each table sits behind one lock; the operations that must be atomic
//! (trainer quota reserve, address default swap, OTP supersede) each run
//! inside a single lock acquisition.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use gymgrid_auth::{self as auth, OtpError, OtpRecord, Role, TokenPair};
use gymgrid_branches::GymBranch;
use gymgrid_core::{AddressId, BranchId, DomainError, DomainResult, Email, PlanId, TaskId, UserId};
use gymgrid_identity::{
    Address, AddressBook, AddressPatch, NewAddress, UserAccount, UserProfile, check_trainer_slot,
};
use gymgrid_workouts::{TaskStatus, WorkoutPlan, WorkoutTask};

use crate::store::{
    AddressStore, BranchStore, CreateUserError, IdentityStore, OtpStore, PlanStore, TaskStore,
};
use crate::token::{CredentialStore, TokenIssuer};

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    users: Mutex<HashMap<UserId, UserAccount>>,
    profiles: Mutex<HashMap<UserId, UserProfile>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn get_user(&self, id: UserId) -> Option<UserAccount> {
        self.users.lock().expect("identity store poisoned").get(&id).cloned()
    }

    fn find_by_email(&self, email: &Email) -> Option<UserAccount> {
        self.users
            .lock()
            .expect("identity store poisoned")
            .values()
            .find(|u| &u.email == email)
            .cloned()
    }

    fn count_trainers(&self, branch_id: BranchId) -> usize {
        self.users
            .lock()
            .expect("identity store poisoned")
            .values()
            .filter(|u| u.role == Role::Trainer && u.branch_id == Some(branch_id))
            .count()
    }

    fn create_user(&self, account: UserAccount) -> Result<UserAccount, CreateUserError> {
        // Single critical section: uniqueness + quota check + insert. Two
        // concurrent trainer creations cannot both see the same free slot.
        let mut users = self.users.lock().expect("identity store poisoned");

        if users.values().any(|u| u.email == account.email) {
            return Err(CreateUserError::DuplicateEmail);
        }

        if account.role == Role::Trainer {
            if let Some(branch_id) = account.branch_id {
                let committed = users
                    .values()
                    .filter(|u| u.role == Role::Trainer && u.branch_id == Some(branch_id))
                    .count();
                check_trainer_slot(committed)?;
            }
        }

        users.insert(account.id, account.clone());
        // Every account carries a profile from the start.
        self.profiles
            .lock()
            .expect("identity store poisoned")
            .insert(account.id, UserProfile::default());
        Ok(account)
    }

    fn mark_verified(&self, id: UserId) -> bool {
        let mut users = self.users.lock().expect("identity store poisoned");
        match users.get_mut(&id) {
            Some(user) => {
                user.is_verified = true;
                true
            }
            None => false,
        }
    }

    fn list_users(&self) -> Vec<UserAccount> {
        let mut all: Vec<_> = self
            .users
            .lock()
            .expect("identity store poisoned")
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|u| u.created_at);
        all
    }

    fn get_profile(&self, id: UserId) -> Option<UserProfile> {
        self.profiles
            .lock()
            .expect("identity store poisoned")
            .get(&id)
            .cloned()
    }

    fn set_profile(&self, id: UserId, profile: UserProfile) -> bool {
        if !self.users.lock().expect("identity store poisoned").contains_key(&id) {
            return false;
        }
        self.profiles
            .lock()
            .expect("identity store poisoned")
            .insert(id, profile);
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Branches / plans / tasks
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryBranchStore {
    branches: RwLock<HashMap<BranchId, GymBranch>>,
}

impl InMemoryBranchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BranchStore for InMemoryBranchStore {
    fn get_branch(&self, id: BranchId) -> Option<GymBranch> {
        self.branches.read().expect("branch store poisoned").get(&id).cloned()
    }

    fn insert_branch(&self, branch: GymBranch) {
        self.branches
            .write()
            .expect("branch store poisoned")
            .insert(branch.id, branch);
    }

    fn list_branches(&self) -> Vec<GymBranch> {
        let mut all: Vec<_> = self
            .branches
            .read()
            .expect("branch store poisoned")
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|b| b.created_at);
        all
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: RwLock<HashMap<PlanId, WorkoutPlan>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for InMemoryPlanStore {
    fn get_plan(&self, id: PlanId) -> Option<WorkoutPlan> {
        self.plans.read().expect("plan store poisoned").get(&id).cloned()
    }

    fn insert_plan(&self, plan: WorkoutPlan) {
        self.plans.write().expect("plan store poisoned").insert(plan.id, plan);
    }

    fn list_plans(&self) -> Vec<WorkoutPlan> {
        let mut all: Vec<_> = self
            .plans
            .read()
            .expect("plan store poisoned")
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|p| p.created_at);
        all
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, WorkoutTask>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn get_task(&self, id: TaskId) -> Option<WorkoutTask> {
        self.tasks.read().expect("task store poisoned").get(&id).cloned()
    }

    fn insert_task(&self, task: WorkoutTask) {
        self.tasks.write().expect("task store poisoned").insert(task.id, task);
    }

    fn set_status(&self, id: TaskId, status: TaskStatus) -> Option<WorkoutTask> {
        let mut tasks = self.tasks.write().expect("task store poisoned");
        let task = tasks.get_mut(&id)?;
        task.set_status(status);
        Some(task.clone())
    }

    fn list_tasks(&self) -> Vec<WorkoutTask> {
        let mut all: Vec<_> = self
            .tasks
            .read()
            .expect("task store poisoned")
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|t| t.created_at);
        all
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Addresses
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryAddressStore {
    books: Mutex<HashMap<UserId, AddressBook>>,
}

impl InMemoryAddressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AddressStore for InMemoryAddressStore {
    fn list_addresses(&self, user_id: UserId) -> Vec<Address> {
        self.books
            .lock()
            .expect("address store poisoned")
            .get(&user_id)
            .map(|book| book.addresses().to_vec())
            .unwrap_or_default()
    }

    fn insert_address(&self, user_id: UserId, new: NewAddress, now: DateTime<Utc>) -> Address {
        // Whole-book normalization under one lock: the default swap is
        // atomic and a crash cannot leave zero or two defaults visible.
        let mut books = self.books.lock().expect("address store poisoned");
        books
            .entry(user_id)
            .or_insert_with(|| AddressBook::new(user_id))
            .insert(new, now)
    }

    fn update_address(
        &self,
        user_id: UserId,
        id: AddressId,
        patch: AddressPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<Address> {
        let mut books = self.books.lock().expect("address store poisoned");
        let book = books.get_mut(&user_id).ok_or(DomainError::NotFound)?;
        book.update(id, patch, now)
    }

    fn remove_address(&self, user_id: UserId, id: AddressId) -> DomainResult<()> {
        let mut books = self.books.lock().expect("address store poisoned");
        let book = books.get_mut(&user_id).ok_or(DomainError::NotFound)?;
        book.remove(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OTP
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryOtpStore {
    rows: Mutex<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_code() -> String {
        format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
    }
}

impl OtpStore for InMemoryOtpStore {
    fn issue(&self, email: &Email, now: DateTime<Utc>) -> OtpRecord {
        let record = OtpRecord::new(email.clone(), Self::generate_code(), now);
        // Replace-then-insert in one critical section keeps at most one live
        // row per email, invalidating every previously issued code.
        let mut rows = self.rows.lock().expect("otp store poisoned");
        rows.insert(email.as_str().to_string(), record.clone());
        record
    }

    fn verify(&self, email: &Email, code: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        let mut rows = self.rows.lock().expect("otp store poisoned");
        let outcome = auth::otp::verify(rows.get(email.as_str()), code, now);
        match &outcome {
            Ok(()) => {
                // Consume on success.
                rows.remove(email.as_str());
            }
            Err(OtpError::Mismatch) => {
                if let Some(record) = rows.get_mut(email.as_str()) {
                    record.attempts += 1;
                }
            }
            Err(_) => {}
        }
        outcome
    }

    fn live(&self, email: &Email) -> Option<OtpRecord> {
        self.rows
            .lock()
            .expect("otp store poisoned")
            .get(email.as_str())
            .cloned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokens / credentials
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque token issuer backed by a refresh-token table.
///
/// Tokens are random strings; refresh rotates the pair and invalidates the
/// old refresh token.
#[derive(Debug, Default)]
pub struct InMemoryTokenIssuer {
    refresh_tokens: Mutex<HashMap<String, UserId>>,
}

impl InMemoryTokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    fn opaque() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl TokenIssuer for InMemoryTokenIssuer {
    fn issue(&self, user_id: UserId) -> TokenPair {
        let pair = TokenPair {
            access_token: Self::opaque(),
            refresh_token: Self::opaque(),
        };
        self.refresh_tokens
            .lock()
            .expect("token issuer poisoned")
            .insert(pair.refresh_token.clone(), user_id);
        pair
    }

    fn refresh(&self, refresh_token: &str) -> Option<TokenPair> {
        let mut tokens = self.refresh_tokens.lock().expect("token issuer poisoned");
        let user_id = tokens.remove(refresh_token)?;
        let pair = TokenPair {
            access_token: Self::opaque(),
            refresh_token: Self::opaque(),
        };
        tokens.insert(pair.refresh_token.clone(), user_id);
        Some(pair)
    }
}

/// Plaintext credential table. Real hashing is an external collaborator;
/// this stand-in only answers match/no-match for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    passwords: Mutex<HashMap<UserId, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn set_password(&self, user_id: UserId, password: &str) {
        self.passwords
            .lock()
            .expect("credential store poisoned")
            .insert(user_id, password.to_string());
    }

    fn verify_password(&self, user_id: UserId, password: &str) -> bool {
        self.passwords
            .lock()
            .expect("credential store poisoned")
            .get(&user_id)
            .is_some_and(|stored| stored == password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use gymgrid_auth::NewUserGrant;

    fn account(role: Role, branch: Option<BranchId>, email: &str) -> UserAccount {
        UserAccount::from_grant(
            Email::parse(email).unwrap(),
            NewUserGrant {
                role,
                branch_id: branch,
            },
            Utc::now(),
        )
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = InMemoryIdentityStore::new();
        store.create_user(account(Role::Member, None, "x@gym.com")).unwrap();
        let err = store
            .create_user(account(Role::Member, None, "x@gym.com"))
            .unwrap_err();
        assert_eq!(err, CreateUserError::DuplicateEmail);
    }

    #[test]
    fn trainer_cap_holds_under_concurrent_creation() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let branch = BranchId::new();

        // Two committed trainers; eight threads race for the last slot.
        for i in 0..2 {
            store
                .create_user(account(Role::Trainer, Some(branch), &format!("t{i}@gym.com")))
                .unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store
                    .create_user(account(
                        Role::Trainer,
                        Some(branch),
                        &format!("race{i}@gym.com"),
                    ))
                    .is_ok()
            }));
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.count_trainers(branch), 3);
    }

    #[test]
    fn every_account_starts_with_an_empty_profile() {
        let store = InMemoryIdentityStore::new();
        let created = store.create_user(account(Role::Member, None, "p@gym.com")).unwrap();

        assert_eq!(store.get_profile(created.id), Some(UserProfile::default()));
        assert!(!store.set_profile(UserId::new(), UserProfile::default()));
    }

    #[test]
    fn otp_issue_supersedes_previous_code() {
        let store = InMemoryOtpStore::new();
        let email = Email::parse("a@gym.com").unwrap();
        let now = Utc::now();

        let first = store.issue(&email, now);
        let second = store.issue(&email, now);

        let live = store.live(&email).unwrap();
        assert_eq!(live.code, second.code);
        // The superseded code no longer verifies (unless identical by chance).
        if first.code != second.code {
            assert_eq!(store.verify(&email, &first.code, now), Err(OtpError::Mismatch));
        }
    }

    #[test]
    fn otp_mismatch_increments_attempts() {
        let store = InMemoryOtpStore::new();
        let email = Email::parse("b@gym.com").unwrap();
        let now = Utc::now();

        store.issue(&email, now);
        let _ = store.verify(&email, "not-it", now);
        let _ = store.verify(&email, "still-not", now);

        assert_eq!(store.live(&email).unwrap().attempts, 2);
    }

    #[test]
    fn otp_is_consumed_on_success() {
        let store = InMemoryOtpStore::new();
        let email = Email::parse("c@gym.com").unwrap();
        let now = Utc::now();

        let record = store.issue(&email, now);
        store.verify(&email, &record.code, now).unwrap();

        assert!(store.live(&email).is_none());
        assert_eq!(store.verify(&email, &record.code, now), Err(OtpError::NotFound));
    }

    #[test]
    fn refresh_rotates_and_invalidates_old_token() {
        let issuer = InMemoryTokenIssuer::new();
        let pair = issuer.issue(UserId::new());

        let rotated = issuer.refresh(&pair.refresh_token).unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);
        assert!(issuer.refresh(&pair.refresh_token).is_none());
        assert!(issuer.refresh(&rotated.refresh_token).is_some());
    }

    #[test]
    fn address_mutations_hold_single_default_across_threads() {
        let store = Arc::new(InMemoryAddressStore::new());
        let user = UserId::new();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.insert_address(
                    user,
                    NewAddress {
                        label: format!("Addr {i}"),
                        text: "Somewhere".into(),
                        is_default: i % 2 == 0,
                    },
                    Utc::now(),
                );
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let defaults = store
            .list_addresses(user)
            .iter()
            .filter(|a| a.is_default)
            .count();
        assert_eq!(defaults, 1);
    }
}
