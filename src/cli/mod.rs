use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::{
    ActionTaken, BehaviorType, CertificateStatus, EntryRole, IncidentType, PermitType, SafetyCategory,
};

pub mod commands;

#[derive(Parser)]
#[command(name = "safetyos")]
#[command(about = "Permit-to-work and site safety from the terminal")]
#[command(long_about = "safetyos talks to the SafetyOS backend: submit and approve work permits, \
                       track confined-space entries, record observations, certificates, incidents \
                       and equipment inspections. Start with 'safetyos login'.")]
#[command(version)]
pub struct Cli {
    /// Extra configuration file layered over safetyos.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the user for later commands
    Login {
        #[arg(long, short)]
        username: String,
        /// Read from SAFETYOS_PASSWORD when omitted
        #[arg(long, short, env = "SAFETYOS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the logged-in user
    Logout,
    /// Show who is logged in
    Whoami,
    /// List registered users
    Users,
    /// Site-wide counters and the latest incidents
    Dashboard,
    /// Work permits: submit, review, approve, reject
    #[command(subcommand)]
    Permit(PermitCommand),
    /// Confined-space entry board
    #[command(subcommand)]
    Confined(ConfinedCommand),
    /// Behavior-based safety observations
    #[command(subcommand)]
    Bbs(BbsCommand),
    /// Training and competency certificates
    #[command(subcommand)]
    Cert(CertCommand),
    /// Near misses, unsafe acts and unsafe conditions
    #[command(subcommand)]
    Incident(IncidentCommand),
    /// QR equipment inspections
    #[command(subcommand)]
    Equipment(EquipmentCommand),
    /// E-learning courses and quizzes
    #[command(subcommand)]
    Course(CourseCommand),
}

#[derive(Subcommand)]
pub enum PermitCommand {
    /// List permits, marking the ones waiting on you
    List {
        /// Only permits you can act on now
        #[arg(long)]
        mine: bool,
    },
    /// Show one permit in full
    Show { permit: String },
    /// Submit a new permit (contractors only)
    Submit(SubmitArgs),
    /// Approve a permit waiting on your role
    Approve { permit: String },
    /// Reject a permit waiting on your role
    Reject { permit: String },
}

#[derive(Args)]
pub struct SubmitArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long = "type", value_enum)]
    pub permit_type: PermitTypeArg,
    #[arg(long)]
    pub location: String,
    #[arg(long, default_value = "")]
    pub details: String,
    /// Number of workers on the job
    #[arg(long)]
    pub workers: Option<u32>,
    /// Required PPE, comma separated
    #[arg(long, value_delimiter = ',')]
    pub ppe: Vec<String>,
    /// Safety measures in place, comma separated
    #[arg(long = "measure", value_delimiter = ',')]
    pub measures: Vec<String>,
    /// RFC 3339 start time, defaults to now
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,
    /// RFC 3339 end time, defaults to now
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,
    /// JSA document to attach
    #[arg(long = "attach", required = true)]
    pub attachments: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfinedCommand {
    /// Active confined-space permits
    Active,
    /// Entry board for one permit
    Board { permit: Option<String> },
    /// Sign a worker into the space
    CheckIn {
        #[arg(long)]
        permit: Option<String>,
        #[arg(long)]
        worker: String,
        #[arg(long, value_enum, default_value = "entrant")]
        role: EntryRoleArg,
    },
    /// Sign one entry out
    CheckOut { entry: String },
    /// Order everyone out of the space
    Evacuate {
        permit: Option<String>,
        /// Required; evacuation raises the site alarm
        #[arg(long)]
        yes: bool,
    },
    /// Keep the board on screen, refreshing on the poll interval
    Watch {
        permit: Option<String>,
        /// Stop after this many refreshes
        #[arg(long)]
        ticks: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum BbsCommand {
    List,
    /// Record an observation (safety engineers and area owners)
    Record {
        #[arg(long)]
        location: String,
        #[arg(long, value_enum)]
        behavior: BehaviorArg,
        #[arg(long, value_enum)]
        category: CategoryArg,
        #[arg(long)]
        description: String,
        #[arg(long, value_enum)]
        action: ActionArg,
    },
}

#[derive(Subcommand)]
pub enum CertCommand {
    /// Certificates with their expiry state
    List,
    /// Upload a certificate document (contractors only)
    Upload {
        #[arg(long)]
        name: String,
        #[arg(long)]
        issued: NaiveDate,
        #[arg(long)]
        expires: NaiveDate,
        #[arg(long)]
        file: PathBuf,
    },
    /// Approve or reject a pending certificate (safety engineers only)
    Verify {
        certificate: String,
        #[arg(value_enum)]
        verdict: VerdictArg,
    },
}

#[derive(Subcommand)]
pub enum IncidentCommand {
    List,
    Report {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "type", value_enum)]
        incident_type: IncidentTypeArg,
        #[arg(long, requires = "lng")]
        lat: Option<f64>,
        #[arg(long, requires = "lat")]
        lng: Option<f64>,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Move an incident to its next status (safety engineers only)
    Advance { incident: String },
}

#[derive(Subcommand)]
pub enum EquipmentCommand {
    /// Look up equipment by QR code and record an inspection
    Inspect {
        code: String,
        /// Checklist item numbers (from 1) that failed
        #[arg(long, value_delimiter = ',')]
        fail: Vec<usize>,
        /// Only show the equipment and its checklist
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum CourseCommand {
    List,
    /// Take a course quiz (contractors only)
    Take {
        course: String,
        /// Chosen option per question, from 1, comma separated
        #[arg(long, value_delimiter = ',')]
        answers: Vec<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PermitTypeArg {
    HotWork,
    ConfinedSpace,
    Electrical,
    ColdWork,
}

impl From<PermitTypeArg> for PermitType {
    fn from(arg: PermitTypeArg) -> Self {
        match arg {
            PermitTypeArg::HotWork => PermitType::HotWork,
            PermitTypeArg::ConfinedSpace => PermitType::ConfinedSpace,
            PermitTypeArg::Electrical => PermitType::Electrical,
            PermitTypeArg::ColdWork => PermitType::ColdWork,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EntryRoleArg {
    Entrant,
    Standby,
}

impl From<EntryRoleArg> for EntryRole {
    fn from(arg: EntryRoleArg) -> Self {
        match arg {
            EntryRoleArg::Entrant => EntryRole::Entrant,
            EntryRoleArg::Standby => EntryRole::Standby,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BehaviorArg {
    Safe,
    Unsafe,
}

impl From<BehaviorArg> for BehaviorType {
    fn from(arg: BehaviorArg) -> Self {
        match arg {
            BehaviorArg::Safe => BehaviorType::Safe,
            BehaviorArg::Unsafe => BehaviorType::Unsafe,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Ppe,
    Tools,
    Posture,
    Housekeeping,
}

impl From<CategoryArg> for SafetyCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Ppe => SafetyCategory::Ppe,
            CategoryArg::Tools => SafetyCategory::Tools,
            CategoryArg::Posture => SafetyCategory::Posture,
            CategoryArg::Housekeeping => SafetyCategory::Housekeeping,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ActionArg {
    Praised,
    VerbalWarning,
    StopWork,
}

impl From<ActionArg> for ActionTaken {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Praised => ActionTaken::Praised,
            ActionArg::VerbalWarning => ActionTaken::VerbalWarning,
            ActionArg::StopWork => ActionTaken::StopWork,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum IncidentTypeArg {
    NearMiss,
    UnsafeAct,
    UnsafeCondition,
}

impl From<IncidentTypeArg> for IncidentType {
    fn from(arg: IncidentTypeArg) -> Self {
        match arg {
            IncidentTypeArg::NearMiss => IncidentType::NearMiss,
            IncidentTypeArg::UnsafeAct => IncidentType::UnsafeAct,
            IncidentTypeArg::UnsafeCondition => IncidentType::UnsafeCondition,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum VerdictArg {
    Approve,
    Reject,
}

impl From<VerdictArg> for CertificateStatus {
    fn from(arg: VerdictArg) -> Self {
        match arg {
            VerdictArg::Approve => CertificateStatus::Approved,
            VerdictArg::Reject => CertificateStatus::Rejected,
        }
    }
}

impl Commands {
    /// Short name used in logs and spans.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Logout => "logout",
            Commands::Whoami => "whoami",
            Commands::Users => "users",
            Commands::Dashboard => "dashboard",
            Commands::Permit(_) => "permit",
            Commands::Confined(_) => "confined",
            Commands::Bbs(_) => "bbs",
            Commands::Cert(_) => "cert",
            Commands::Incident(_) => "incident",
            Commands::Equipment(_) => "equipment",
            Commands::Course(_) => "course",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn submit_splits_lists() {
        let cli = Cli::try_parse_from([
            "safetyos", "permit", "submit", "--title", "Weld", "--type", "hot-work", "--location", "Unit 3",
            "--ppe", "Helmet,Gloves", "--attach", "jsa.pdf",
        ])
        .unwrap();
        match cli.command {
            Commands::Permit(PermitCommand::Submit(args)) => {
                assert_eq!(args.ppe, vec!["Helmet", "Gloves"]);
                assert_eq!(args.attachments, vec![PathBuf::from("jsa.pdf")]);
                assert!(matches!(args.permit_type, PermitTypeArg::HotWork));
            }
            _ => panic!("expected permit submit"),
        }
    }

    #[test]
    fn submit_requires_an_attachment() {
        let result = Cli::try_parse_from([
            "safetyos", "permit", "submit", "--title", "Weld", "--type", "hot-work", "--location", "Unit 3",
        ]);
        assert!(result.is_err());
    }
}
