use crate::context::AppContext;
use crate::domain::crisis::CrisisDescription;
use crate::domain::prompt::PromptTemplate;
use crate::domain::statement::{Stage, StatementPair};
use crate::error::{AppError, AppResult, StageFailure};

/// Where a run currently is. A run walks these in order, once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ValidatingInput,
    CallingCrisisStage,
    CallingLegalStage,
    Done,
    Failed,
}

impl RunState {
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, ValidatingInput)
                | (ValidatingInput, CallingCrisisStage)
                | (CallingCrisisStage, CallingLegalStage)
                | (CallingLegalStage, Done)
                | (ValidatingInput | CallingCrisisStage | CallingLegalStage, Failed)
        )
    }
}

struct Run {
    state: RunState,
}

impl Run {
    fn new() -> Self {
        Self {
            state: RunState::Idle,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run transition {:?} -> {next:?}",
            self.state
        );
        tracing::debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }

    fn fail(&mut self, error: AppError) -> AppError {
        self.advance(RunState::Failed);
        tracing::warn!("statement run failed: {error}");
        error
    }
}

/// Drafts the crisis statement, then has it revised for legal safety.
/// The legal stage only runs once the crisis stage has produced text.
pub async fn generate_statements(ctx: &AppContext, input: &str) -> AppResult<StatementPair> {
    let mut run = Run::new();

    run.advance(RunState::ValidatingInput);
    let description = CrisisDescription::parse(input).map_err(|err| run.fail(err))?;

    run.advance(RunState::CallingCrisisStage);
    let crisis_prompt = PromptTemplate::Crisis {
        description: &description,
    }
    .render();
    let crisis_statement = ctx
        .language_model
        .complete(&crisis_prompt)
        .await
        .map_err(|failure| {
            run.fail(
                StageFailure {
                    stage: Stage::Crisis,
                    failure,
                    crisis_statement: None,
                }
                .into(),
            )
        })?;

    run.advance(RunState::CallingLegalStage);
    let legal_prompt = PromptTemplate::Legal {
        description: &description,
        crisis_statement: &crisis_statement,
    }
    .render();
    let legal_statement = match ctx.language_model.complete(&legal_prompt).await {
        Ok(text) => text,
        Err(failure) => {
            return Err(run.fail(
                StageFailure {
                    stage: Stage::Legal,
                    failure,
                    crisis_statement: Some(crisis_statement),
                }
                .into(),
            ));
        }
    };

    run.advance(RunState::Done);
    tracing::info!("generated crisis and legal-safe statements");
    Ok(StatementPair {
        crisis_statement,
        legal_statement,
    })
}
