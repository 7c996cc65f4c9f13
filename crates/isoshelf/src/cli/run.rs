use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use isoshelf_fetch::{Fetcher, ReqwestClient};
use isoshelf_update::{NoProgress, ProgressSink, UpdateJob, UpdateOutcome, Updater};
use isoshelf_vendor::VendorKind;
use serde::Serialize;

use super::report::{self, CheckView};
use super::{App, Commands, RunArg};
use crate::config::{Config, Plan};
use crate::tracker::ProgressTracker;

/// Run the selected command. `Ok(false)` means at least one job failed.
pub async fn run(app: App) -> Result<bool> {
    match &app.cmd {
        Commands::Vendors => vendors(&app),
        Commands::Check(arg) => {
            let (plan, updater, workers) = prepare(&app, arg)?;
            check(&app, plan, &updater, workers).await
        }
        Commands::Update(arg) => {
            let (plan, updater, workers) = prepare(&app, arg)?;
            sweep(&plan.jobs);
            update(&app, plan, &updater, workers).await
        }
    }
}

type Client = ReqwestClient;

fn prepare(app: &App, arg: &RunArg) -> Result<(Plan<Client>, Updater<Client>, usize)> {
    let config = Config::load(&app.config).with_context(|| format!("failed to load {}", app.config.display()))?;
    let root = arg.root.clone().unwrap_or_else(|| config.library.root.clone());

    let timeouts = config.network.timeouts();
    let client = ReqwestClient::new(&timeouts, &config.network.user_agent).context("failed to build HTTP client")?;
    let fetcher = Arc::new(Fetcher::new(client, timeouts));
    let plan = config.plan(&root, &arg.vendors, &fetcher)?;
    tracing::info!(root = %root.display(), jobs = plan.jobs.len(), "library loaded");

    let progress: Arc<dyn ProgressSink> = if app.quiet || app.json {
        Arc::new(NoProgress)
    } else {
        Arc::new(ProgressTracker::new())
    };
    let updater = Updater::new(fetcher).with_progress(progress);
    Ok((plan, updater, config.library.workers))
}

/// Remove staging files a killed run left behind.
fn sweep<V>(jobs: &[UpdateJob<V>]) {
    let dirs: BTreeSet<&PathBuf> = jobs.iter().map(|job| &job.directory).collect();
    for dir in dirs {
        match isoshelf_fs::sweep_staging(dir) {
            Ok(removed) if !removed.is_empty() => {
                tracing::info!(dir = %dir.display(), count = removed.len(), "removed stale downloads");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "could not sweep stale downloads"),
        }
    }
}

async fn check(app: &App, plan: Plan<Client>, updater: &Updater<Client>, workers: usize) -> Result<bool> {
    let results = tokio::select! {
        results = updater.check_all(&plan.jobs, workers) => results,
        _ = tokio::signal::ctrl_c() => return interrupted(),
    };

    let labels: Vec<String> = plan.jobs.iter().map(UpdateJob::label).collect();
    let rejected: Vec<UpdateOutcome> = plan.rejected.into_iter().map(report::rejected_outcome).collect();
    let ok = rejected.is_empty() && results.iter().all(Result::is_ok);

    if app.json {
        #[derive(Serialize)]
        struct Output<'a> {
            checks:   Vec<CheckView<'a>>,
            rejected: &'a [UpdateOutcome],
        }
        let checks = labels.iter().zip(&results).map(|(job, r)| CheckView::new(job, r)).collect();
        print_json(&Output {
            checks,
            rejected: &rejected,
        })?;
    } else {
        for (job, result) in labels.iter().zip(&results) {
            println!("{}", report::check_line(job, result));
        }
        for outcome in &rejected {
            println!("{}", report::update_line(outcome));
        }
    }
    Ok(ok)
}

async fn update(app: &App, plan: Plan<Client>, updater: &Updater<Client>, workers: usize) -> Result<bool> {
    let mut outcomes = tokio::select! {
        outcomes = updater.update_all(&plan.jobs, workers) => outcomes,
        _ = tokio::signal::ctrl_c() => return interrupted(),
    };
    outcomes.extend(plan.rejected.into_iter().map(report::rejected_outcome));

    if app.json {
        print_json(&outcomes)?;
    } else {
        for outcome in &outcomes {
            println!("{}", report::update_line(outcome));
        }
    }
    Ok(outcomes.iter().all(|o| o.final_state.is_success()))
}

/// In-flight downloads are dropped with their futures, which removes their
/// staging files.
fn interrupted() -> Result<bool> {
    tracing::warn!("interrupted, in-flight jobs cancelled");
    Ok(false)
}

fn vendors(app: &App) -> Result<bool> {
    #[derive(Serialize)]
    struct VendorView {
        name:      &'static str,
        title:     &'static str,
        template:  String,
        editions:  Vec<String>,
        languages: Vec<String>,
    }

    let views = VendorKind::ALL
        .into_iter()
        .map(|kind| {
            let profile = kind.profile()?;
            let list = |choices: Option<&isoshelf_template::Choices>| {
                choices.map(|c| c.iter().map(str::to_string).collect::<Vec<_>>()).unwrap_or_default()
            };
            Ok(VendorView {
                name:      kind.name(),
                title:     kind.title(),
                template:  profile.template().to_string(),
                editions:  list(profile.editions()),
                languages: list(profile.languages()),
            })
        })
        .collect::<Result<Vec<_>, isoshelf_template::TemplateError>>()?;

    if app.json {
        print_json(&views)?;
    } else {
        for view in &views {
            println!("{:<8} {}", view.name, view.title);
            println!("         {}", view.template);
            if !view.editions.is_empty() {
                println!("         editions:  {}", view.editions.join(", "));
            }
            if !view.languages.is_empty() {
                println!("         languages: {}", view.languages.join(", "));
            }
        }
    }
    Ok(true)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
