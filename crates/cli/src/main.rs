use clap::{Parser, Subcommand};

use carebook_core::{
    AppointmentService, CoreConfig, EmailAddress, NonEmptyText, ShardableUuid, UserService,
};
use records::Role;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "carebook")]
#[command(about = "Carebook appointment system admin CLI")]
struct Cli {
    /// Root of the document store (overrides CARE_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account
    CreateAdmin {
        /// Login email
        email: String,
        /// Password
        password: String,
        /// Display name
        name: String,
    },
    /// List accounts, optionally one role only
    ListUsers {
        /// Filter: patient, doctor, caregiver or admin
        #[arg(long)]
        role: Option<String>,
    },
    /// Approve a doctor account
    ApproveDoctor {
        /// Doctor account UUID (32 lowercase hex characters)
        user_uuid: String,
    },
    /// Remove an account and its stored documents
    RemoveUser {
        /// Account UUID (32 lowercase hex characters)
        user_uuid: String,
    },
    /// List appointments, soonest first
    ListAppointments {
        /// Only this patient's appointments
        #[arg(long)]
        patient: Option<String>,
        /// Only this doctor's appointments
        #[arg(long)]
        doctor: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        std::env::var("CARE_DATA_DIR")
            .unwrap_or_else(|_| carebook_core::DEFAULT_CARE_DATA_DIR.into())
            .into()
    });
    let cfg = Arc::new(CoreConfig::new(data_dir)?);

    match cli.command {
        Commands::CreateAdmin {
            email,
            password,
            name,
        } => {
            let users = UserService::new(cfg);
            let admin = users.create_admin(
                EmailAddress::new(&email)?,
                &password,
                NonEmptyText::new(&name)?,
            )?;
            println!("Created admin {} ({})", admin.display_name, admin.id);
        }
        Commands::ListUsers { role } => {
            let role = match role.as_deref() {
                None => None,
                Some(raw) => match Role::from_wire(raw) {
                    Some(role) => Some(role),
                    None => return Err(format!("unknown role: {raw}").into()),
                },
            };

            let users = UserService::new(cfg);
            let listing = users.list(role)?;
            if listing.is_empty() {
                println!("No accounts found.");
            } else {
                for user in listing {
                    let approval = match user.approved {
                        Some(true) => ", approved",
                        Some(false) => ", awaiting approval",
                        None => "",
                    };
                    println!(
                        "ID: {}, Name: {}, Email: {}, Role: {}{}",
                        user.id, user.display_name, user.email, user.role, approval
                    );
                }
            }
        }
        Commands::ApproveDoctor { user_uuid } => {
            let id = ShardableUuid::parse(&user_uuid)?;
            let users = UserService::new(cfg);
            let doctor = users.approve_doctor(&id)?;
            println!("Approved doctor {} ({})", doctor.display_name, doctor.id);
        }
        Commands::RemoveUser { user_uuid } => {
            let id = ShardableUuid::parse(&user_uuid)?;
            let users = UserService::new(cfg);
            users.remove(&id)?;
            println!("Removed account {id}");
        }
        Commands::ListAppointments { patient, doctor } => {
            let appointments = AppointmentService::new(cfg);

            let listing = match (patient, doctor) {
                (Some(patient), None) => {
                    appointments.list_for_patient(&ShardableUuid::parse(&patient)?)?
                }
                (None, Some(doctor)) => {
                    appointments.list_for_doctor(&ShardableUuid::parse(&doctor)?)?
                }
                (None, None) => appointments.list_all()?,
                (Some(_), Some(_)) => {
                    return Err("pass at most one of --patient and --doctor".into());
                }
            };

            if listing.is_empty() {
                println!("No appointments found.");
            } else {
                for appointment in listing {
                    println!(
                        "ID: {}, Patient: {}, Doctor: {}, At: {}, Status: {}, Attachments: {}",
                        appointment.id,
                        appointment.patient_id,
                        appointment.doctor_id,
                        appointment.scheduled_at.to_rfc3339(),
                        appointment.status,
                        appointment.attachments.len()
                    );
                }
            }
        }
    }

    Ok(())
}
