use anyhow::Result;

use crate::cli::BbsCommand;
use crate::models::{BehaviorType, NewBbsObservation};
use crate::session::AppContext;

use super::{require_user, short_time};

impl BbsCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let service = ctx.observations();
        match self {
            BbsCommand::List => {
                let observations = service.list().await?;
                println!("👁️  {} observations", observations.len());
                for o in observations {
                    let icon = match o.behavior_type {
                        BehaviorType::Safe => "🟢",
                        BehaviorType::Unsafe => "🔴",
                    };
                    println!(
                        "   {icon} {:<20} {:<12?} {:<14?} {} {}",
                        o.location,
                        o.category,
                        o.action_taken,
                        o.description,
                        o.created_at.map(short_time).unwrap_or_default()
                    );
                }
                Ok(())
            }
            BbsCommand::Record {
                location,
                behavior,
                category,
                description,
                action,
            } => {
                let user = require_user(ctx)?;
                let observation = NewBbsObservation {
                    location,
                    behavior_type: behavior.into(),
                    category: category.into(),
                    description,
                    action_taken: action.into(),
                    observer_id: user.id.clone(),
                };
                service.record(Some(&user), observation).await?;
                Ok(())
            }
        }
    }
}
