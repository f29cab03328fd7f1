//! E-learning: courses, the fixed quiz and training records.

pub mod flow;
pub mod quiz;

use statig::prelude::*;
use std::sync::Arc;
use tracing::info;

use crate::api::{ApiError, TrainingApi};
use crate::models::{Course, TrainingSubmission, User};
use crate::notify::Notifier;
use crate::workflows::permissions::can_take_course;

pub use flow::{CourseEvent, CourseFlow, QuizResult, State as CourseStep};
pub use quiz::{all_answered, score, Answers, Question, QUESTION_BANK};

pub struct TrainingService {
    api: Arc<dyn TrainingApi>,
    notifier: Arc<dyn Notifier>,
}

impl TrainingService {
    pub fn new(api: Arc<dyn TrainingApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    pub async fn courses(&self) -> Result<Vec<Course>, ApiError> {
        self.api.list_courses().await.inspect_err(|e| {
            self.notifier.error(&format!("Could not load courses: {e}"));
        })
    }

    /// Begin a course for a contractor. The returned flow sits on the video.
    pub fn start(&self, actor: Option<&User>, course: Course) -> Result<StateMachine<CourseFlow>, ApiError> {
        let actor = actor.ok_or(ApiError::NotLoggedIn)?;
        if !can_take_course(actor.role) {
            let err = ApiError::not_permitted(actor.role, "take training courses");
            self.notifier.error(&err.to_string());
            return Err(err);
        }
        let mut flow = CourseFlow::default().state_machine();
        flow.handle(&CourseEvent::SelectCourse(course));
        Ok(flow)
    }

    /// Score the quiz, record it, and move the flow to its result.
    pub async fn submit(&self, actor: &User, flow: &mut StateMachine<CourseFlow>) -> Result<QuizResult, ApiError> {
        let result = self.try_submit(actor, flow).await;
        match &result {
            Ok(r) if r.passed => self.notifier.success(&format!("Passed with {}%", r.score)),
            Ok(r) => self.notifier.warning(&format!("Not passed: {}%", r.score)),
            Err(e) => self.notifier.error(&format!("Could not submit quiz: {e}")),
        }
        result
    }

    async fn try_submit(&self, actor: &User, flow: &mut StateMachine<CourseFlow>) -> Result<QuizResult, ApiError> {
        if !matches!(flow.state(), CourseStep::TakeQuiz {}) {
            return Err(ApiError::validation("the quiz has not been started"));
        }
        if !all_answered(flow.inner().answers()) {
            return Err(ApiError::validation("answer every question before submitting"));
        }
        let course_id = flow
            .inner()
            .course()
            .map(|c| c.id.clone())
            .ok_or_else(|| ApiError::validation("no course selected"))?;

        let score = score(flow.inner().answers());
        let record = self
            .api
            .submit_training(&TrainingSubmission {
                user_id: actor.id.clone(),
                course_id: course_id.clone(),
                score,
            })
            .await?;

        let result = QuizResult {
            score,
            passed: record.passed,
        };
        flow.handle(&CourseEvent::Graded(result));
        info!(user_id = %actor.id, course_id = %course_id, score, passed = record.passed, "Training recorded");
        Ok(result)
    }
}
