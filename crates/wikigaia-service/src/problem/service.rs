//! Problem proposal and lookup.

use std::sync::Arc;

use tracing::info;

use wikigaia_core::error::AppError;
use wikigaia_core::result::AppResult;
use wikigaia_core::types::{CategoryId, ProblemId};
use wikigaia_database::store::ProblemStore;
use wikigaia_entity::problem::{CreateProblem, Problem};

use crate::context::RequestContext;
use crate::user::UserService;

/// Caller-supplied fields of a new problem.
#[derive(Debug, Clone)]
pub struct NewProblem {
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Optional category.
    pub category_id: Option<CategoryId>,
}

/// Creates and reads problems.
#[derive(Clone)]
pub struct ProblemService {
    problems: Arc<dyn ProblemStore>,
    users: UserService,
}

impl ProblemService {
    /// Creates a new problem service.
    pub fn new(problems: Arc<dyn ProblemStore>, users: UserService) -> Self {
        Self { problems, users }
    }

    /// Propose a problem. The proposer's creator-interest vote is created in
    /// the same store transaction, so the new problem starts at one vote.
    pub async fn create(&self, ctx: &RequestContext, input: NewProblem) -> AppResult<Problem> {
        let title = input.title.trim();
        let description = input.description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(AppError::validation("Title and description are required"));
        }

        self.users.sync(ctx).await?;
        let problem = self
            .problems
            .create_with_creator_vote(&CreateProblem {
                title: title.to_string(),
                description: description.to_string(),
                category_id: input.category_id,
                proposer_id: ctx.user_id,
            })
            .await?;

        info!(
            problem_id = %problem.id,
            proposer_id = %ctx.user_id,
            "Problem proposed"
        );
        Ok(problem)
    }

    /// Fetch an active problem.
    pub async fn get(&self, id: ProblemId) -> AppResult<Problem> {
        self.problems
            .find_by_id(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::not_found(format!("Problem {id} not found")))
    }
}
