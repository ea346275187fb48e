use std::process::ExitCode;

use campusdesk_cli::maintenance::{self, OrphanReport};
use campusdesk_cli::seeder::{self, SeedConfig};
use campusdesk_cli::admin::create_super_admin;
use campusdesk_config::AcademicYearConfig;
use campusdesk_db::{DatabaseConfig, PgPool};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

/// Exit status for `audit-orphans` when problems were found.
const EXIT_ISSUES_FOUND: u8 = 2;

#[derive(Parser)]
#[command(name = "campusdesk-cli")]
#[command(about = "Campusdesk CLI - administration and data maintenance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a super administrator account
    CreateSuperadmin {
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Prompted securely if not provided
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed fake organizations, institutions, classes and admissions
    Seed {
        #[arg(long, default_value = "2")]
        organizations: usize,

        /// Institutions per organization
        #[arg(long, default_value = "2")]
        institutions: usize,

        /// Classes per institution
        #[arg(long, default_value = "6")]
        classes: usize,

        /// Admissions per institution
        #[arg(long, default_value = "50")]
        admissions: usize,

        /// Spread admission creation dates over this many past days
        #[arg(long, default_value = "90")]
        spread_days: i64,
    },
    /// Report broken links between admissions and students (read-only)
    AuditOrphans,
    /// Recompute admission academic-year tags from their creation dates
    FixAcademicYears {
        /// Write the fixes instead of only reporting them
        #[arg(long)]
        apply: bool,
    },
    /// Reset updated_at to created_at where it is earlier
    FixTimestamps {
        /// Write the fixes instead of only reporting them
        #[arg(long)]
        apply: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    let pool = match connect().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::CreateSuperadmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_superadmin(&pool, first_name, last_name, email, password).await,
        Commands::Seed {
            organizations,
            institutions,
            classes,
            admissions,
            spread_days,
        } => {
            let config = SeedConfig {
                organizations,
                institutions_per_organization: institutions,
                classes_per_institution: classes,
                admissions_per_institution: admissions,
                spread_days,
            };
            handle_seed(&pool, config).await
        }
        Commands::AuditOrphans => handle_audit_orphans(&pool).await,
        Commands::FixAcademicYears { apply } => handle_fix_academic_years(&pool, apply).await,
        Commands::FixTimestamps { apply } => handle_fix_timestamps(&pool, apply).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let mut config = DatabaseConfig::from_env()?;
    config.max_connections = config.max_connections.min(5);
    campusdesk_db::connect(&config).await
}

fn prompt_if_missing(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

async fn handle_create_superadmin(
    pool: &PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<ExitCode> {
    let first_name = prompt_if_missing(first_name, "First name")?;
    let last_name = prompt_if_missing(last_name, "Last name")?;
    let email = prompt_if_missing(email, "Email address")?;
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let id = create_super_admin(pool, &first_name, &last_name, &email, &password).await?;

    println!("\n✅ Super admin created");
    println!("   ID: {id}");
    println!("   Email: {}", email.trim().to_lowercase());
    println!("   Name: {first_name} {last_name}");
    Ok(ExitCode::SUCCESS)
}

async fn handle_seed(pool: &PgPool, config: SeedConfig) -> anyhow::Result<ExitCode> {
    let academic = AcademicYearConfig::from_env();
    let summary = seeder::seed_all(pool, &config, &academic).await?;

    println!("\n✅ Seeded:");
    println!("   Organizations: {}", summary.organizations);
    println!("   Institutions:  {}", summary.institutions);
    println!("   Classes:       {}", summary.classes);
    println!("   Admissions:    {}", summary.admissions);
    Ok(ExitCode::SUCCESS)
}

fn print_orphan_report(report: &OrphanReport) {
    println!(
        "Enrolled admissions without a student: {}",
        report.enrolled_without_student.len()
    );
    for row in &report.enrolled_without_student {
        println!(
            "   {} ({}) student_id={:?}",
            row.application_number, row.admission_id, row.student_id
        );
    }

    println!(
        "Students whose admission is not enrolled: {}",
        report.students_not_enrolled.len()
    );
    for row in &report.students_not_enrolled {
        println!(
            "   student {} -> admission {} [{}]",
            row.student_id, row.admission_id, row.admission_status
        );
    }

    println!(
        "Admission/student link mismatches: {}",
        report.mismatched_links.len()
    );
    for row in &report.mismatched_links {
        println!(
            "   student {} -> admission {} (admission points at {:?})",
            row.student_id, row.admission_id, row.admission_student_id
        );
    }
}

async fn handle_audit_orphans(pool: &PgPool) -> anyhow::Result<ExitCode> {
    let report = maintenance::audit_orphans(pool).await?;
    print_orphan_report(&report);

    if report.is_clean() {
        println!("\n✅ No orphaned records found");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("\n⚠️  {} issue(s) found", report.issue_count());
        Ok(ExitCode::from(EXIT_ISSUES_FOUND))
    }
}

async fn handle_fix_academic_years(pool: &PgPool, apply: bool) -> anyhow::Result<ExitCode> {
    let academic = AcademicYearConfig::from_env();
    let report = maintenance::fix_academic_years(pool, &academic, apply).await?;

    println!(
        "Checked {} admissions (year starts in month {})",
        report.checked, academic.start_month
    );
    for m in &report.mismatched {
        println!("   {}: {} -> {}", m.application_number, m.stored, m.expected);
    }
    if !report.skipped_enrolled.is_empty() {
        println!("Enrolled admissions left unchanged:");
        for m in &report.skipped_enrolled {
            println!("   {}: {} (expected {})", m.application_number, m.stored, m.expected);
        }
    }

    if apply {
        println!("\n✅ Updated {} admission(s)", report.applied);
    } else if !report.mismatched.is_empty() {
        println!("\nDry run. Re-run with --apply to write {} fix(es).", report.mismatched.len());
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_fix_timestamps(pool: &PgPool, apply: bool) -> anyhow::Result<ExitCode> {
    let report = maintenance::fix_timestamps(pool, apply).await?;

    if report.stale.is_empty() {
        println!("✅ All timestamps are consistent");
        return Ok(ExitCode::SUCCESS);
    }
    for (table, count) in &report.stale {
        println!("   {table}: {count} row(s) with updated_at < created_at");
    }

    if apply {
        println!("\n✅ Repaired {} row(s)", report.applied);
    } else {
        println!(
            "\nDry run. Re-run with --apply to repair {} row(s).",
            report.total_stale()
        );
    }
    Ok(ExitCode::SUCCESS)
}
