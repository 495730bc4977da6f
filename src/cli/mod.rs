//! Command-line front end: argument parsing, logging setup, prompts and report
//! output around [`crate::run`].

pub mod logging;
pub mod output;
pub mod prompt;

use crate::{
    Action, ActionRequest, DestroyOptions, DispatchMode, ExitStatus, GuardPolicy, HaState,
    Interrupt, InterruptHandle, Invocation, PowerAction, ProxmoxClient, ProxmoxError,
    RateLimitConfig, TargetRequest, TransitionGuard, VzdumpMode, VzdumpOptions,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use logging::LogFormat;
use tracing::warn;

/// Exit code clap uses for malformed command lines.
const USAGE_EXIT_CODE: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "pvectl",
    version,
    about = "Lifecycle commands for Proxmox VE virtual machines and containers"
)]
pub struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Wait for each task to finish before moving to the next guest
    #[arg(long, global = true)]
    sync: bool,

    /// Reject snapshot, backup, HA and replication commands on guests whose status is unknown
    #[arg(long, global = true)]
    strict_status: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Human, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ConnectionArgs {
    /// Proxmox VE host name or address
    #[arg(long, env = "PROXMOX_HOST")]
    host: String,

    #[arg(long, env = "PROXMOX_PORT", default_value_t = 8006)]
    port: u16,

    #[arg(long, env = "PROXMOX_USERNAME")]
    username: String,

    #[arg(long, env = "PROXMOX_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, env = "PROXMOX_REALM", default_value = "pam")]
    realm: String,

    /// Use https
    #[arg(long, env = "PROXMOX_SECURE", default_value_t = true, action = ArgAction::Set)]
    secure: bool,

    /// Accept self-signed certificates
    #[arg(long, env = "PROXMOX_ACCEPT_INVALID_CERTS")]
    accept_invalid_certs: bool,

    /// Client-side request limit, in requests per second
    #[arg(long)]
    rate_limit: Option<u32>,
}

impl ConnectionArgs {
    fn client(&self) -> Result<ProxmoxClient> {
        let rate_limit = self.rate_limit.map(|rps| RateLimitConfig {
            requests_per_second: rps,
            burst_size: rps,
        });
        let client = ProxmoxClient::builder()
            .host(&self.host)
            .port(self.port)
            .credentials(&self.username, &self.password, &self.realm)
            .secure(self.secure)
            .accept_invalid_certs(self.accept_invalid_certs)
            .rate_limit(rate_limit)
            .build()
            .context("invalid connection settings")?;
        Ok(client)
    }
}

/// VMIDs and node filters shared by every command.
#[derive(Debug, Clone, Default, Args)]
struct Targets {
    /// VMIDs to act on
    vmids: Vec<String>,

    /// Act on every guest hosted on this node (repeatable)
    #[arg(long = "node")]
    nodes: Vec<String>,
}

impl Targets {
    fn into_requests(self) -> Vec<TargetRequest> {
        self.vmids
            .into_iter()
            .map(TargetRequest::Guest)
            .chain(self.nodes.into_iter().map(TargetRequest::Node))
            .collect()
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show name, status and uptime (every guest when no target is given)
    Status(Targets),
    Start(Targets),
    Stop(Targets),
    Shutdown(Targets),
    Reboot(Targets),
    Suspend(Targets),
    Resume(Targets),
    /// Destroy guests and, by default, their jobs and unreferenced disks
    Destroy {
        #[command(flatten)]
        targets: Targets,
        /// Do not ask for confirmation
        #[arg(long)]
        skip_confirm: bool,
        /// Also destroy stopped guests
        #[arg(long)]
        allow_stopped: bool,
        /// Keep replication, backup and HA job entries
        #[arg(long)]
        do_not_purge_jobs: bool,
        /// Keep disks that are not referenced in the guest config
        #[arg(long)]
        do_not_destroy_unreferenced_disks: bool,
    },
    /// Take a snapshot
    Snapshot {
        #[command(flatten)]
        targets: Targets,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a snapshot
    #[command(name = "delsnapshot")]
    DeleteSnapshot {
        #[command(flatten)]
        targets: Targets,
        #[arg(long)]
        name: String,
        /// Remove the snapshot from the config even if removing disk snapshots fails
        #[arg(long)]
        force: bool,
    },
    /// List snapshots (every guest when no target is given)
    #[command(name = "listsnapshot")]
    ListSnapshots(Targets),
    /// Back up with vzdump, zstd-compressed
    Vzdump {
        #[command(flatten)]
        targets: Targets,
        /// Target storage; the node default when omitted
        #[arg(long)]
        storage: Option<String>,
        /// snapshot, suspend or stop
        #[arg(long)]
        mode: Option<VzdumpMode>,
    },
    /// Show the HA state (every guest when no target is given)
    HaStatus(Targets),
    /// Set the HA state, adding the guest to HA if needed
    HaSet {
        #[command(flatten)]
        targets: Targets,
        /// started, stopped, disabled or ignored
        #[arg(long)]
        ha_state: HaState,
    },
    /// Remove guests from HA
    HaRemove(Targets),
    /// List enabled replication jobs (every guest when no target is given)
    ReplicationList(Targets),
    /// Run enabled replication jobs now
    ReplicationScheduleNow(Targets),
}

impl Command {
    fn into_request(self, mode: DispatchMode) -> ActionRequest {
        let mut skip_confirm = false;
        let (action, targets) = match self {
            Command::Status(t) => (Action::Status, t),
            Command::Start(t) => (Action::Power(PowerAction::Start), t),
            Command::Stop(t) => (Action::Power(PowerAction::Stop), t),
            Command::Shutdown(t) => (Action::Power(PowerAction::Shutdown), t),
            Command::Reboot(t) => (Action::Power(PowerAction::Reboot), t),
            Command::Suspend(t) => (Action::Power(PowerAction::Suspend), t),
            Command::Resume(t) => (Action::Power(PowerAction::Resume), t),
            Command::Destroy {
                targets,
                skip_confirm: skip,
                do_not_purge_jobs,
                do_not_destroy_unreferenced_disks,
                ..
            } => {
                skip_confirm = skip;
                let options = DestroyOptions {
                    purge_jobs: !do_not_purge_jobs,
                    destroy_unreferenced_disks: !do_not_destroy_unreferenced_disks,
                };
                (Action::Destroy(options), targets)
            }
            Command::Snapshot {
                targets,
                name,
                description,
            } => (Action::Snapshot { name, description }, targets),
            Command::DeleteSnapshot {
                targets,
                name,
                force,
            } => (Action::DeleteSnapshot { name, force }, targets),
            Command::ListSnapshots(t) => (Action::ListSnapshots, t),
            Command::Vzdump {
                targets,
                storage,
                mode,
            } => {
                let options = VzdumpOptions {
                    storage,
                    mode,
                    ..VzdumpOptions::default()
                };
                (Action::Vzdump(options), targets)
            }
            Command::HaStatus(t) => (Action::HaStatus, t),
            Command::HaSet { targets, ha_state } => (Action::HaSet(ha_state), targets),
            Command::HaRemove(t) => (Action::HaRemove, t),
            Command::ReplicationList(t) => (Action::ReplicationList, t),
            Command::ReplicationScheduleNow(t) => (Action::ReplicationScheduleNow, t),
        };

        ActionRequest {
            action,
            targets: targets.into_requests(),
            mode,
            skip_confirm,
        }
    }
}

impl Cli {
    fn request(self) -> (ActionRequest, ConnectionArgs, GuardPolicy) {
        let mode = if self.sync {
            DispatchMode::Sync
        } else {
            DispatchMode::Async
        };
        let policy = GuardPolicy {
            strict_configuration: self.strict_status,
            destroy_stopped: matches!(
                self.command,
                Command::Destroy {
                    allow_stopped: true,
                    ..
                }
            ),
        };
        (self.command.into_request(mode), self.connection, policy)
    }
}

/// Parses the command line, runs it and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose);

    match execute(cli).await {
        Ok(status) => status.code(),
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code(&e)
        }
    }
}

async fn execute(cli: Cli) -> Result<ExitStatus> {
    let (request, connection, policy) = cli.request();
    let client = connection.client()?;

    let (handle, interrupt) = Interrupt::channel();
    tokio::spawn(forward_ctrl_c(handle));

    let confirmer = prompt::TerminalConfirm;
    let guard = TransitionGuard::new(policy, request.skip_confirm);
    let invocation = Invocation::new(&client, guard, &confirmer, interrupt)
        .with_progress(&output::StdoutProgress);

    let report = crate::run(&invocation, &request).await?;
    if report.interrupted {
        eprintln!("Interrupted by user, remaining targets were not touched.");
    }
    Ok(report.exit_status())
}

async fn forward_ctrl_c(handle: InterruptHandle) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, stopping after the current call");
        handle.trigger();
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ProxmoxError>() {
        Some(ProxmoxError::Interrupted) => ExitStatus::Interrupted.code(),
        Some(ProxmoxError::Usage(_)) => USAGE_EXIT_CODE,
        _ => ExitStatus::Failure.code(),
    }
}
