use anyhow::Result;

use crate::cli::EquipmentCommand;
use crate::models::EquipmentStatus;
use crate::session::AppContext;

use super::{or_dash, short_time};

impl EquipmentCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let service = ctx.inspections();
        match self {
            EquipmentCommand::Inspect { code, fail, dry_run } => {
                let (equipment, mut checklist) = service.scan(&code).await?;

                for item in fail {
                    if item == 0 || item > checklist.len() {
                        ctx.notifier
                            .warning(&format!("Checklist has {} items; ignoring {item}", checklist.len()));
                        continue;
                    }
                    checklist.fail(item - 1);
                }

                println!("🔧 {} ({})", equipment.name, or_dash(equipment.code.as_deref()));
                println!("   Location: {}", or_dash(equipment.location.as_deref()));
                println!("   Current status: {:?}", equipment.status);
                for (index, label, pass) in checklist.items() {
                    println!("   {} {}. {label}", if pass { "✅" } else { "❌" }, index + 1);
                }
                if let Some(last) = equipment.history.first() {
                    println!(
                        "   Last inspected {} by {}",
                        last.inspected_at.map(short_time).unwrap_or_default(),
                        or_dash(last.inspector_name.as_deref())
                    );
                }

                if dry_run {
                    println!("   Verdict would be {:?}", checklist.verdict());
                    return Ok(());
                }

                let status = service.submit(ctx.current_user(), &equipment, &checklist).await?;
                if status == EquipmentStatus::Defective {
                    println!("   ⚠️  Tag the equipment out of service until repaired");
                }
                Ok(())
            }
        }
    }
}
