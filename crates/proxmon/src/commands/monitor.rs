//! Monitoring command handlers, including the `watch` live view.

use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use chrono::Local;
use tabled::Tabled;

use proxmon_core::{
    ConfigUpdate, Countdown, GroupId, GroupStat, MetricLevel, MetricValue, MonitoringConfig,
    MonitoringSummary, Notification, Notifier, ProxyStatus, RefreshController, ResourceRefresh,
    ResourceSample, Thresholds,
};
use serde_json::Value;

use super::{Ctx, util};
use crate::cli::{GlobalOpts, MonitorArgs, MonitorCommand, OutputFormat, SetConfigArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::notify::StatusLine;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Main")]
    main: String,
    #[tabled(rename = "CPU %")]
    cpu: String,
    #[tabled(rename = "Mem %")]
    memory: String,
    #[tabled(rename = "UC")]
    uc: String,
    #[tabled(rename = "CC")]
    cc: String,
    #[tabled(rename = "CS")]
    cs: String,
    #[tabled(rename = "HTTP")]
    http: String,
    #[tabled(rename = "HTTPS")]
    https: String,
    #[tabled(rename = "FTP")]
    ftp: String,
    #[tabled(rename = "Sessions")]
    sessions: String,
    #[tabled(rename = "Sampled")]
    sampled: String,
}

fn resource_row(s: &ResourceSample, thresholds: &Thresholds, color: bool) -> ResourceRow {
    let gauge = |value: MetricValue, threshold: f64| {
        output::paint_metric(
            &value.to_string(),
            Thresholds::classify(value, threshold),
            color,
        )
    };
    let count = |value: MetricValue| {
        if value.is_error() && color {
            output::paint_metric(&value.to_string(), MetricLevel::Critical, true)
        } else {
            value.to_string()
        }
    };
    let m = &s.metrics;
    ResourceRow {
        id: s.proxy_id.to_string(),
        name: s.proxy_name.clone(),
        host: s.host.clone(),
        group: output::or_dash(s.group_name.as_deref()),
        main: output::flag(s.is_main),
        cpu: gauge(m.cpu, thresholds.cpu),
        memory: gauge(m.memory, thresholds.memory),
        uc: count(m.uc),
        cc: count(m.cc),
        cs: count(m.cs),
        http: count(m.http),
        https: count(m.https),
        ftp: count(m.ftp),
        sessions: count(s.total_sessions),
        sampled: format!("{} {}", s.date, s.time).trim().to_owned(),
    }
}

fn resource_detail(s: &ResourceSample, thresholds: &Thresholds) -> String {
    let m = &s.metrics;
    output::detail_block(&[
        ("Proxy", format!("{} ({})", s.proxy_name, s.proxy_id)),
        ("Host", s.host.clone()),
        ("Group", output::or_dash(s.group_name.as_deref())),
        ("Level", s.level(thresholds).to_string()),
        ("CPU", format!("{} %", m.cpu)),
        ("Memory", format!("{} %", m.memory)),
        ("UC / CC / CS", format!("{} / {} / {}", m.uc, m.cc, m.cs)),
        (
            "HTTP / HTTPS / FTP",
            format!("{} / {} / {}", m.http, m.https, m.ftp),
        ),
        ("Sessions", s.total_sessions.to_string()),
        ("Device", output::or_dash(s.device.as_deref())),
        ("Sampled", format!("{} {}", s.date, s.time)),
    ])
}

fn render_resources(
    format: &OutputFormat,
    samples: &[Arc<ResourceSample>],
    thresholds: &Thresholds,
    color: bool,
) -> String {
    output::render_list(
        format,
        samples,
        |s| resource_row(s, thresholds, color),
        |s| s.proxy_id.to_string(),
    )
}

fn status_detail(s: &ProxyStatus) -> String {
    let head = output::detail_block(&[
        ("Proxy", format!("{} ({})", s.proxy_name, s.proxy_id)),
        ("Host", s.host.clone()),
        ("Group", output::or_dash(s.group_name.as_deref())),
        ("Main", if s.is_main { "yes" } else { "no" }.into()),
    ]);
    if s.status.is_empty() {
        return format!("{head}

No status reported");
    }
    let rows: Vec<(&str, String)> = s
        .status
        .iter()
        .map(|(key, value)| (key.as_str(), status_text(value)))
        .collect();
    format!("{head}

{}", output::detail_block(&rows))
}

fn status_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "-".into(),
        other => other.to_string(),
    }
}

#[derive(Tabled)]
struct GroupStatRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Total")]
    total: u32,
    #[tabled(rename = "Active")]
    active: u32,
    #[tabled(rename = "Offline")]
    offline: u32,
}

impl From<&GroupStat> for GroupStatRow {
    fn from(g: &GroupStat) -> Self {
        Self {
            group: g.group_id.map_or_else(|| "(none)".into(), |id| id.to_string()),
            total: g.total,
            active: g.active,
            offline: g.offline,
        }
    }
}

fn summary_detail(s: &MonitoringSummary) -> String {
    let head = output::detail_block(&[
        ("Proxies", s.total.to_string()),
        ("Active", s.active.to_string()),
        ("Offline", s.offline.to_string()),
        ("Configured", s.configured.to_string()),
    ]);
    if s.groups.is_empty() {
        return head;
    }
    let rows: Vec<GroupStatRow> = s.groups.iter().map(GroupStatRow::from).collect();
    format!("{head}\n\n{}", output::render_table(&rows))
}

fn config_detail(c: &MonitoringConfig) -> String {
    let mut lines = output::detail_block(&[
        ("CPU threshold", format!("{} %", c.cpu_threshold)),
        ("Memory threshold", format!("{} %", c.memory_threshold)),
        ("Default interval", format!("{}s", c.default_interval)),
        ("Session command", output::or_dash(c.session_cmd.as_deref())),
    ]);
    if !c.snmp_oids.is_empty() {
        lines.push_str("\nSNMP OIDs:");
        for (name, oid) in &c.snmp_oids {
            lines.push_str(&format!("\n  {name:<8} {oid}"));
        }
    }
    lines
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Thresholds for coloring. Only worth a request when the table is
/// actually colored; a failed fetch falls back to the defaults.
async fn display_thresholds(ctx: &Ctx, format: &OutputFormat) -> Thresholds {
    if !ctx.color || !matches!(format, OutputFormat::Table) {
        return Thresholds::default();
    }
    match ctx.console.monitoring_config().await {
        Ok(cfg) => cfg.thresholds(),
        Err(e) => {
            tracing::debug!(error = %e, "using default thresholds");
            Thresholds::default()
        }
    }
}

fn parse_oids(raw: &[String]) -> Result<Option<BTreeMap<String, String>>, CliError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.iter()
        .map(|pair| {
            let (name, oid) = pair.split_once('=').ok_or_else(|| CliError::Validation {
                field: "oid".into(),
                reason: format!("expected NAME=OID, got '{pair}'"),
            })?;
            let (name, oid) = (name.trim(), oid.trim());
            if name.is_empty() || oid.is_empty() {
                return Err(CliError::Validation {
                    field: "oid".into(),
                    reason: format!("expected NAME=OID, got '{pair}'"),
                });
            }
            Ok((name.to_owned(), oid.to_owned()))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(Some)
}

fn config_update(args: SetConfigArgs) -> Result<ConfigUpdate, CliError> {
    let update = ConfigUpdate {
        snmp_oids: parse_oids(&args.oids)?,
        session_cmd: args.session_cmd,
        cpu_threshold: args.cpu_threshold,
        memory_threshold: args.memory_threshold,
        default_interval: args.interval,
    };
    if update.is_empty() {
        return Err(CliError::Validation {
            field: "set-config".into(),
            reason: "nothing to change; pass at least one option".into(),
        });
    }
    Ok(update)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx, args: MonitorArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        MonitorCommand::Resources { group } => {
            let scope = util::group_scope(ctx, group.as_deref()).await?;
            let thresholds = display_thresholds(ctx, &global.output).await;
            let samples: Vec<Arc<ResourceSample>> = ctx
                .console
                .resources(scope)
                .await?
                .into_iter()
                .map(Arc::new)
                .collect();
            let out = render_resources(&global.output, &samples, &thresholds, ctx.color);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitorCommand::Latest => {
            let thresholds = display_thresholds(ctx, &global.output).await;
            let samples: Vec<Arc<ResourceSample>> = ctx
                .console
                .latest_resources()
                .await?
                .into_iter()
                .map(Arc::new)
                .collect();
            let out = render_resources(&global.output, &samples, &thresholds, ctx.color);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitorCommand::Proxy { id } => {
            let sample = ctx.console.proxy_resources(id.into()).await?;
            let thresholds = display_thresholds(ctx, &global.output).await;
            let out = output::render_single(
                &global.output,
                &sample,
                |s| resource_detail(s, &thresholds),
                |s| s.proxy_id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitorCommand::Status { id } => {
            let bar = util::spinner(&format!("querying proxy {id}"), global.quiet);
            let status = ctx.console.proxy_status(id.into()).await;
            bar.finish_and_clear();
            let status = status?;
            let out = output::render_single(&global.output, &status, status_detail, |s| {
                s.proxy_id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitorCommand::Summary => {
            let summary = ctx.console.summary().await?;
            let out = output::render_single(&global.output, &summary, summary_detail, |s| {
                s.total.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitorCommand::Config => {
            let cfg = ctx.console.monitoring_config().await?;
            let out = output::render_single(&global.output, &cfg, config_detail, |c| {
                c.default_interval.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitorCommand::SetConfig(args) => {
            let update = config_update(args)?;
            let cfg = ctx.console.update_monitoring_config(&update).await?;
            let out = output::render_single(&global.output, &cfg, config_detail, |c| {
                c.default_interval.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitorCommand::Watch {
            interval,
            group,
            count,
        } => {
            let scope = util::group_scope(ctx, group.as_deref()).await?;
            watch(ctx, global, scope, interval, count).await
        }
    }
}

// ── Live view ───────────────────────────────────────────────────────

struct Screen<'a> {
    global: &'a GlobalOpts,
    thresholds: Thresholds,
    color: bool,
    /// Redraw in place (interactive terminal) or append frames.
    live: bool,
    status: Arc<StatusLine>,
}

impl Screen<'_> {
    fn frame(&self, samples: &[Arc<ResourceSample>], countdown: Countdown) -> String {
        let mut out = String::new();
        if self.live {
            out.push_str("\x1b[2J\x1b[H");
            out.push_str(&format!(
                "proxmon  {} proxies  next refresh {countdown}  {}\n\n",
                samples.len(),
                Local::now().format("%H:%M:%S"),
            ));
        }
        out.push_str(&render_resources(
            &self.global.output,
            samples,
            &self.thresholds,
            self.color,
        ));
        if self.live {
            if let Some(line) = self.status.render(self.color) {
                out.push('\n');
                out.push_str(&line);
            }
        }
        out
    }

    fn draw(&self, samples: &[Arc<ResourceSample>], countdown: Countdown) {
        let frame = self.frame(samples, countdown);
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{frame}");
        let _ = stdout.flush();
    }

    /// Appended frames have no status area; problems go to stderr once.
    fn flush_status(&self) {
        if self.live {
            return;
        }
        if let Some(line) = self.status.render(false) {
            eprintln!("{line}");
            self.status.clear();
        }
    }
}

// ── Interval reload ─────────────────────────────────────────────────

/// Refresh interval the active profile asks for.
fn profile_interval(cfg: &Config, global: &GlobalOpts) -> Result<u64, CliError> {
    Ok(config::resolve_with(cfg, global)?.console.refresh_interval_secs)
}

/// SIGHUP listener. Never fires where the signal does not exist.
struct Hangup {
    #[cfg(unix)]
    signal: Option<tokio::signal::unix::Signal>,
}

impl Hangup {
    #[cfg(unix)]
    fn install() -> Self {
        use tokio::signal::unix::{SignalKind, signal};
        let signal = signal(SignalKind::hangup())
            .map_err(|e| tracing::debug!(error = %e, "SIGHUP reload unavailable"))
            .ok();
        Self { signal }
    }

    #[cfg(not(unix))]
    fn install() -> Self {
        Self {}
    }

    #[cfg_attr(not(unix), allow(clippy::unused_self))]
    async fn recv(&mut self) {
        #[cfg(unix)]
        if let Some(signal) = self.signal.as_mut() {
            if signal.recv().await.is_some() {
                return;
            }
        }
        std::future::pending::<()>().await;
    }
}

async fn watch(
    ctx: &Ctx,
    global: &GlobalOpts,
    scope: Option<GroupId>,
    pinned_interval: Option<u64>,
    count: Option<u64>,
) -> Result<(), CliError> {
    let interval = pinned_interval.unwrap_or(ctx.console.config().refresh_interval_secs);
    let screen = Screen {
        global,
        thresholds: display_thresholds(ctx, &global.output).await,
        color: ctx.color,
        live: io::stdout().is_terminal() && matches!(global.output, OutputFormat::Table),
        status: Arc::new(StatusLine::default()),
    };

    let task = Arc::new(ResourceRefresh::new(ctx.console.clone(), scope));
    let notifier: Arc<dyn Notifier> = screen.status.clone();
    let controller = RefreshController::new(task, interval, notifier)?;
    let mut board_rx = ctx.console.board().subscribe();
    let mut countdown_rx = controller.subscribe_countdown();
    let mut hangup = Hangup::install();

    controller.start();
    tracing::info!(interval, group = ?scope, "watching resources");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut refreshes = 0u64;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,

            changed = board_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                screen.status.clear();
                let samples = board_rx.borrow_and_update().clone();
                screen.draw(&samples, controller.countdown());
                refreshes += 1;
                if count.is_some_and(|n| refreshes >= n) {
                    break;
                }
            }

            () = hangup.recv() => {
                if pinned_interval.is_some() {
                    tracing::debug!("interval pinned by --interval, SIGHUP ignored");
                    continue;
                }
                let reloaded = config::load_config()
                    .map_err(CliError::from)
                    .and_then(|cfg| profile_interval(&cfg, global));
                match reloaded {
                    Ok(secs) if secs != controller.interval_secs() => {
                        controller.set_interval(secs).await?;
                        if !screen.live && !global.quiet {
                            eprintln!("refresh interval now {secs}s");
                        }
                    }
                    Ok(_) => tracing::debug!("refresh interval unchanged"),
                    Err(e) => {
                        screen
                            .status
                            .notify(Notification::warning("Reload failed", e.to_string()));
                        screen.flush_status();
                    }
                }
            }

            changed = countdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let countdown = *countdown_rx.borrow_and_update();
                if screen.live {
                    screen.draw(&ctx.console.board().snapshot(), countdown);
                } else {
                    screen.flush_status();
                }
            }
        }
    }

    controller.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use proxmon_core::ProxyId;
    use serde_json::json;

    use super::*;
    use crate::cli::Cli;
    use crate::config::Profile;

    #[test]
    fn status_detail_lists_collector_fields() {
        let status = ProxyStatus {
            proxy_id: ProxyId(10),
            proxy_name: "PROD-MAIN-01".into(),
            host: "192.168.1.10".into(),
            group_name: None,
            is_main: true,
            status: BTreeMap::from([
                ("uptime".to_owned(), json!("12 days")),
                ("cpu".to_owned(), json!(41.5)),
                ("snmp".to_owned(), Value::Null),
            ]),
        };
        let text = status_detail(&status);
        assert!(text.contains("PROD-MAIN-01 (10)"), "{text}");
        assert!(text.contains("uptime: 12 days"), "{text}");
        assert!(text.contains("cpu:    41.5"), "{text}");
        assert!(text.contains("snmp:   -"), "{text}");
    }

    #[test]
    fn profile_interval_follows_active_profile() {
        let mut lab = Profile::new("http://10.1.1.1:5007");
        lab.refresh_interval = Some(12);
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), lab);
        cfg.default_profile = Some("lab".into());

        let global = Cli::try_parse_from(["proxmon", "monitor", "summary"])
            .map(|cli| cli.global)
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        let secs = profile_interval(&cfg, &global).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(secs, 12);
    }

    #[test]
    fn oid_pairs_parse_into_map() {
        let parsed = parse_oids(&["cpu=1.3.6.1.4.1.1".into(), " memory = 1.3.6.1.4.1.2 ".into()])
            .unwrap_or_else(|e| panic!("{e}"))
            .unwrap_or_default();
        assert_eq!(parsed.get("memory").map(String::as_str), Some("1.3.6.1.4.1.2"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn malformed_oid_is_a_validation_error() {
        let err = parse_oids(&["cpu".into()])
            .err()
            .unwrap_or_else(|| panic!("expected error"));
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn empty_set_config_is_rejected() {
        let args = SetConfigArgs {
            cpu_threshold: None,
            memory_threshold: None,
            interval: None,
            session_cmd: None,
            oids: Vec::new(),
        };
        assert!(config_update(args).is_err());
    }
}
