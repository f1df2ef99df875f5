//! Circulation service: borrow and return workflows.
//!
//! Holds the circulation policy injected at construction; the transactional
//! work itself lives in the borrows repository.

use uuid::Uuid;

use crate::{
    config::CirculationConfig,
    error::AppResult,
    models::borrow::{BorrowDetails, CreateBorrow, Penalty},
    penalty::PenaltyCalculator,
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    policy: CirculationConfig,
    calculator: PenaltyCalculator,
}

impl BorrowsService {
    pub fn new(repository: Repository, policy: CirculationConfig) -> Self {
        let calculator = PenaltyCalculator::new(policy.penalty_rate_per_day);
        Self {
            repository,
            policy,
            calculator,
        }
    }

    /// Borrow one or more books for a user
    pub async fn borrow_books(&self, borrow: CreateBorrow) -> AppResult<BorrowDetails> {
        self.repository.borrows.create(&borrow, &self.policy).await
    }

    /// Return a borrow, applying a penalty when past the deadline
    pub async fn return_borrow(&self, borrow_id: Uuid) -> AppResult<BorrowDetails> {
        self.repository
            .borrows
            .return_borrow(borrow_id, &self.policy, &self.calculator)
            .await
    }

    /// Borrow history for a user
    pub async fn get_user_borrows(&self, user_id: Uuid) -> AppResult<Vec<BorrowDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrows.get_user_borrows(user_id).await
    }

    /// Penalties accrued by a user
    pub async fn get_user_penalties(&self, user_id: Uuid) -> AppResult<Vec<Penalty>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrows.get_user_penalties(user_id).await
    }
}
