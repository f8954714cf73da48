//! xrctl: configure the VDXR and PimaxXR OpenXR runtimes.

#![deny(unsafe_code)]

mod elevation;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use xrctl_settings::notify::{ERROR_TITLE, STORE_ACCESS_MESSAGE};
use xrctl_settings::{
    open_form, Deployment, Form, FormError, FormKind, Notifier, RuntimeChoice, RuntimeSelector,
};
use xrctl_store::{FileStore, Store};

use output::{render_form, to_json, FormReport, StderrNotifier};

#[derive(Parser, Debug)]
#[command(name = "xrctl")]
#[command(about = "Configure the VDXR and PimaxXR OpenXR runtimes")]
struct Args {
    /// Use the settings of the standalone VDXR install
    #[arg(long, global = true, env = "XRCTL_STANDALONE")]
    standalone: bool,

    /// Keep settings in a JSON file instead of the registry
    #[arg(long, global = true, env = "XRCTL_STORE_FILE")]
    store_file: Option<PathBuf>,

    /// Never re-launch with administrator rights
    #[arg(long, global = true)]
    no_elevate: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the PimaxXR runtime (defaults to this executable's directory)
    #[arg(long, global = true, env = "XRCTL_INSTALL_DIR")]
    install_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every control of a form
    Show {
        /// advanced, offsets, companion or experimental
        form: FormKind,
    },

    /// Change one control and save it immediately
    Set {
        form: FormKind,
        control: String,
        /// Integer, on/off, or an option name
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Restore the runtime defaults of a form
    Reset {
        form: FormKind,
        /// Only restore one group of controls
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Inspect or select the OpenXR runtime
    Runtime {
        #[command(subcommand)]
        command: RuntimeCommand,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
enum RuntimeCommand {
    /// Headset status and version reported by PimaxXR
    Status,
    /// The system-wide OpenXR runtime
    Active,
    /// Make a runtime the system-wide OpenXR runtime
    Select { runtime: RuntimeArg },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RuntimeArg {
    Pimax,
    Steamvr,
}

impl From<RuntimeArg> for RuntimeChoice {
    fn from(arg: RuntimeArg) -> Self {
        match arg {
            RuntimeArg::Pimax => RuntimeChoice::PimaxXr,
            RuntimeArg::Steamvr => RuntimeChoice::SteamVr,
        }
    }
}

impl Command {
    fn writes_store(&self) -> bool {
        matches!(
            self,
            Command::Set { .. }
                | Command::Reset { .. }
                | Command::Runtime {
                    command: RuntimeCommand::Select { .. }
                }
        )
    }
}

struct Session {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    deployment: Deployment,
    install_dir: PathBuf,
    json: bool,
}

impl Session {
    fn from_args(args: &Args) -> Result<Self> {
        let store: Arc<dyn Store> = match &args.store_file {
            Some(path) => Arc::new(
                FileStore::open(path)
                    .with_context(|| format!("failed to open {}", path.display()))?,
            ),
            None => xrctl_store::open_system_store()?,
        };
        debug!(
            "using {} store",
            if args.store_file.is_some() { "file" } else { "system" }
        );
        let install_dir = match &args.install_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_exe()?
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default(),
        };
        Ok(Self {
            store,
            notifier: Arc::new(StderrNotifier),
            deployment: if args.standalone {
                Deployment::Standalone
            } else {
                Deployment::Bundled
            },
            install_dir,
            json: args.json,
        })
    }

    fn selector(&self) -> RuntimeSelector {
        RuntimeSelector::new(self.store.clone(), self.install_dir.display().to_string())
    }

    fn open(&self, kind: FormKind) -> Form {
        let mut form = open_form(
            kind,
            self.deployment,
            self.store.clone(),
            self.notifier.clone(),
        );
        if kind == FormKind::Companion {
            form.set_interactive(self.selector().pimax_is_active(self.notifier.as_ref()));
        }
        form
    }

    fn print_form(&self, form: &Form) -> Result<()> {
        let report = FormReport::new(form);
        if self.json {
            println!("{}", to_json(&report)?);
        } else {
            print!("{}", render_form(&report));
        }
        Ok(())
    }
}

fn run(args: Args) -> Result<()> {
    if let Command::Version = args.command {
        println!("xrctl {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let ctx = Session::from_args(&args)?;

    match args.command {
        Command::Show { form } => {
            let form = ctx.open(form);
            ctx.print_form(&form)?;
        }
        Command::Set {
            form,
            control,
            value,
        } => {
            let mut form = ctx.open(form);
            let change = form.set_from_str(&control, &value)?;
            if ctx.json {
                println!("{}", to_json(&change)?);
            } else {
                let view = form.view(change.id)?;
                println!("{} = {}", view.id, view.display);
            }
            if !change.persisted {
                bail!("'{}' was changed but could not be saved", change.id);
            }
        }
        Command::Reset { form, group } => {
            let mut form = ctx.open(form);
            match group {
                Some(group) => form.restore_group(&group)?,
                None => form.restore_defaults()?,
            }
            ctx.print_form(&form)?;
        }
        Command::Runtime { command } => match command {
            RuntimeCommand::Status => {
                let runtime = xrctl_runtime::open_default(&ctx.install_dir);
                let version = runtime.version()?;
                let status = runtime.status()?;
                if ctx.json {
                    let report = serde_json::json!({ "version": version, "status": status });
                    println!("{}", to_json(&report)?);
                } else {
                    println!("PimaxXR {version}");
                    println!("{status}");
                }
            }
            RuntimeCommand::Active => {
                let active = ctx.selector().active()?;
                if ctx.json {
                    println!("{}", to_json(&active)?);
                } else {
                    println!("{active}");
                }
            }
            RuntimeCommand::Select { runtime } => {
                let selector = ctx.selector();
                if let Err(e) = selector.select(runtime.into()) {
                    if matches!(e, FormError::Store(_)) {
                        ctx.notifier.error(ERROR_TITLE, STORE_ACCESS_MESSAGE);
                    }
                    return Err(e.into());
                }
                println!("{}", selector.active()?);
            }
        },
        Command::Version => {}
    }

    Ok(())
}

fn main() -> Result<()> {
    xrctl_common::init_tracing_with_default("warn");

    let args = Args::parse();

    if args.command.writes_store()
        && args.store_file.is_none()
        && !args.no_elevate
        && !elevation::is_elevated()
    {
        let forwarded: Vec<String> = std::env::args().skip(1).collect();
        let code = elevation::relaunch_elevated(&forwarded)?.exit_code()?;
        std::process::exit(code);
    }

    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("xrctl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_set_with_negative_value() {
        let args = parse(&["set", "offsets", "aim_pose_rot_x", "-45", "--standalone"]);
        assert!(args.standalone);
        match args.command {
            Command::Set {
                form,
                control,
                value,
            } => {
                assert_eq!(form, FormKind::Offsets);
                assert_eq!(control, "aim_pose_rot_x");
                assert_eq!(value, "-45");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_form_is_rejected() {
        assert!(Args::try_parse_from(["xrctl", "show", "bogus"]).is_err());
    }

    #[test]
    fn test_mutating_commands() {
        assert!(parse(&["set", "advanced", "turbo", "on"]).command.writes_store());
        assert!(parse(&["reset", "offsets", "--group", "aim"]).command.writes_store());
        assert!(parse(&["runtime", "select", "pimax"]).command.writes_store());
        assert!(!parse(&["show", "companion"]).command.writes_store());
        assert!(!parse(&["runtime", "active"]).command.writes_store());
    }

    #[test]
    fn test_run_against_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");
        let store = store.to_str().unwrap();

        run(parse(&["--store-file", store, "set", "advanced", "supersampling", "150"])).unwrap();
        run(parse(&["--store-file", store, "show", "advanced", "--json"])).unwrap();

        let reopened = FileStore::open(store).unwrap();
        assert_eq!(
            reopened
                .get_dword(xrctl_settings::namespace::VDXR_BUNDLED, "Supersampling")
                .unwrap(),
            Some(150)
        );

        run(parse(&["--store-file", store, "reset", "advanced"])).unwrap();
        let reopened = FileStore::open(store).unwrap();
        assert_eq!(
            reopened
                .get_dword(xrctl_settings::namespace::VDXR_BUNDLED, "Supersampling")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_companion_is_read_only_without_pimax() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");
        let store = store.to_str().unwrap();

        assert!(run(parse(&["--store-file", store, "set", "companion", "guardian", "off"])).is_err());

        run(parse(&[
            "--store-file",
            store,
            "--install-dir",
            "C:\\PimaxXR",
            "runtime",
            "select",
            "pimax",
        ]))
        .unwrap();
        run(parse(&[
            "--store-file",
            store,
            "--install-dir",
            "C:\\PimaxXR",
            "set",
            "companion",
            "guardian",
            "off",
        ]))
        .unwrap();
        assert!(run(parse(&[
            "--store-file",
            store,
            "--install-dir",
            "D:\\Elsewhere",
            "set",
            "companion",
            "guardian",
            "on",
        ]))
        .is_err());
    }
}
