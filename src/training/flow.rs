use statig::prelude::*;

use super::quiz::{Answers, QUESTION_BANK};
use crate::models::Course;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseEvent {
    SelectCourse(Course),
    StartQuiz,
    Answer { question: usize, option: usize },
    Graded(QuizResult),
    Retake,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub score: u32,
    pub passed: bool,
}

/// One trainee's way through a course: pick it, watch the video, take the
/// quiz, see the result.
#[derive(Debug, Default)]
pub struct CourseFlow {
    course: Option<Course>,
    answers: Answers,
    result: Option<QuizResult>,
}

impl CourseFlow {
    pub fn course(&self) -> Option<&Course> {
        self.course.as_ref()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn result(&self) -> Option<QuizResult> {
        self.result
    }

    fn clear(&mut self) {
        self.course = None;
        self.answers.clear();
        self.result = None;
    }
}

#[state_machine(initial = "State::select_course()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl CourseFlow {
    #[state]
    fn select_course(&mut self, event: &CourseEvent) -> Outcome<State> {
        match event {
            CourseEvent::SelectCourse(course) => {
                self.clear();
                self.course = Some(course.clone());
                tracing::debug!(course_id = %course.id, "Course selected");
                Transition(State::watch_video())
            }
            _ => Handled,
        }
    }

    #[state]
    fn watch_video(&mut self, event: &CourseEvent) -> Outcome<State> {
        match event {
            CourseEvent::StartQuiz => Transition(State::take_quiz()),
            CourseEvent::Reset => {
                self.clear();
                Transition(State::select_course())
            }
            _ => Handled,
        }
    }

    #[state]
    fn take_quiz(&mut self, event: &CourseEvent) -> Outcome<State> {
        match event {
            CourseEvent::Answer { question, option } => {
                let valid = QUESTION_BANK
                    .iter()
                    .any(|q| q.id == *question && *option < q.options.len());
                if valid {
                    self.answers.insert(*question, *option);
                }
                Handled
            }
            CourseEvent::Graded(result) => {
                self.result = Some(*result);
                Transition(State::show_result())
            }
            CourseEvent::Reset => {
                self.clear();
                Transition(State::select_course())
            }
            _ => Handled,
        }
    }

    #[state]
    fn show_result(&mut self, event: &CourseEvent) -> Outcome<State> {
        match event {
            // Retaking is only offered after a fail.
            CourseEvent::Retake if self.result.is_some_and(|r| !r.passed) => {
                self.answers.clear();
                self.result = None;
                Transition(State::take_quiz())
            }
            CourseEvent::Reset => {
                self.clear();
                Transition(State::select_course())
            }
            _ => Handled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        Course {
            id: "crs-1".into(),
            title: "Hot Work Safety".into(),
            description: None,
            video_url: None,
            passing_score: Some(80),
        }
    }

    #[test]
    fn walks_through_to_result() {
        let mut sm = CourseFlow::default().state_machine();
        assert_eq!(sm.state(), &State::select_course());

        sm.handle(&CourseEvent::StartQuiz);
        assert_eq!(sm.state(), &State::select_course());

        sm.handle(&CourseEvent::SelectCourse(course()));
        assert_eq!(sm.state(), &State::watch_video());
        assert_eq!(sm.inner().course().map(|c| c.id.as_str()), Some("crs-1"));

        sm.handle(&CourseEvent::StartQuiz);
        sm.handle(&CourseEvent::Answer { question: 1, option: 0 });
        sm.handle(&CourseEvent::Answer { question: 9, option: 0 });
        sm.handle(&CourseEvent::Answer { question: 2, option: 7 });
        assert_eq!(sm.inner().answers().len(), 1);

        sm.handle(&CourseEvent::Graded(QuizResult { score: 33, passed: false }));
        assert_eq!(sm.state(), &State::show_result());
    }

    #[test]
    fn retake_only_after_failing() {
        let mut sm = CourseFlow::default().state_machine();
        sm.handle(&CourseEvent::SelectCourse(course()));
        sm.handle(&CourseEvent::StartQuiz);
        sm.handle(&CourseEvent::Graded(QuizResult { score: 100, passed: true }));

        sm.handle(&CourseEvent::Retake);
        assert_eq!(sm.state(), &State::show_result());

        sm.handle(&CourseEvent::Reset);
        assert_eq!(sm.state(), &State::select_course());
        assert!(sm.inner().course().is_none());

        sm.handle(&CourseEvent::SelectCourse(course()));
        sm.handle(&CourseEvent::StartQuiz);
        sm.handle(&CourseEvent::Answer { question: 1, option: 1 });
        sm.handle(&CourseEvent::Graded(QuizResult { score: 0, passed: false }));
        sm.handle(&CourseEvent::Retake);
        assert_eq!(sm.state(), &State::take_quiz());
        assert!(sm.inner().answers().is_empty());
        assert_eq!(sm.inner().result(), None);
    }
}
