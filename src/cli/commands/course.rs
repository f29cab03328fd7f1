use anyhow::{anyhow, Result};

use crate::cli::CourseCommand;
use crate::session::AppContext;
use crate::training::{CourseEvent, QUESTION_BANK};

use super::{or_dash, require_user};

impl CourseCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let service = ctx.training();
        match self {
            CourseCommand::List => {
                let courses = service.courses().await?;
                println!("📚 {} courses", courses.len());
                for course in courses {
                    println!(
                        "   {:<10} {:<36} pass mark {}%",
                        course.id,
                        course.title,
                        course.passing_score.map(|s| s.to_string()).unwrap_or_else(|| "-".into())
                    );
                }
                Ok(())
            }
            CourseCommand::Take { course, answers } => {
                let user = require_user(ctx)?;
                let courses = service.courses().await?;
                let Some(course) = courses.into_iter().find(|c| c.id == course) else {
                    ctx.notifier.error("No such course");
                    return Err(anyhow!("course not found"));
                };

                println!("📚 {}", course.title);
                println!("   {}", or_dash(course.description.as_deref()));
                if let Some(video) = course.embed_url() {
                    println!("   🎬 Watch first: {video}");
                }

                let mut flow = service.start(Some(&user), course)?;
                flow.handle(&CourseEvent::StartQuiz);

                if answers.is_empty() {
                    for (n, question) in QUESTION_BANK.iter().enumerate() {
                        println!();
                        println!("   {}. {}", n + 1, question.prompt);
                        for (i, option) in question.options.iter().enumerate() {
                            println!("      {}) {option}", i + 1);
                        }
                    }
                    println!();
                    println!("💡 Answer with --answers, e.g. --answers 1,3,2");
                    return Ok(());
                }

                for (question, choice) in QUESTION_BANK.iter().zip(&answers) {
                    if *choice >= 1 {
                        flow.handle(&CourseEvent::Answer {
                            question: question.id,
                            option: choice - 1,
                        });
                    }
                }

                let result = service.submit(&user, &mut flow).await?;
                println!("   Score: {}%", result.score);
                if !result.passed {
                    println!("💡 Watch the video again and retake with new --answers");
                }
                Ok(())
            }
        }
    }
}
