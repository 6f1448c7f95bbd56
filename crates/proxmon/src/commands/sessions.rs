//! Session command handlers.

use std::io::Write;
use std::path::Path;

use tabled::Tabled;

use proxmon_core::{
    CollectOutcome, ProxyId, ProxySessions, SessionFilter, SessionId, SessionRecord,
    SessionWindowRequest,
};

use super::{Ctx, util};
use crate::cli::{GlobalOpts, OutputFormat, SessionFilterArgs, SessionsArgs, SessionsCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Proxy")]
    proxy: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Proto")]
    protocol: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Bytes")]
    bytes: String,
    #[tabled(rename = "Age")]
    age: String,
}

impl From<&SessionRecord> for SessionRow {
    fn from(s: &SessionRecord) -> Self {
        Self {
            id: s.id.to_string(),
            proxy: s.proxy_id.map_or_else(|| "-".into(), |id| id.to_string()),
            client: output::or_dash(s.client_ip.as_deref()),
            server: output::or_dash(s.server_ip.as_deref()),
            protocol: output::or_dash(s.protocol.as_deref()),
            user: output::or_dash(s.user.as_deref()),
            url: output::truncate(s.url.as_deref().unwrap_or("-"), 48),
            bytes: output::human_bytes(s.total_bytes()),
            age: s.age_seconds.map_or_else(|| "-".into(), |a| format!("{a}s")),
        }
    }
}

fn session_detail(s: &SessionRecord) -> String {
    let bytes = |v: Option<u64>| v.map_or_else(|| "-".into(), output::human_bytes);
    let mut pairs = vec![
        ("ID", s.id.to_string()),
        (
            "Proxy",
            s.proxy_id.map_or_else(|| "-".into(), |id| id.to_string()),
        ),
        (
            "Group",
            s.group_id.map_or_else(|| "-".into(), |id| id.to_string()),
        ),
        ("Client", output::or_dash(s.client_ip.as_deref())),
        ("Server", output::or_dash(s.server_ip.as_deref())),
        ("Protocol", output::or_dash(s.protocol.as_deref())),
        ("User", output::or_dash(s.user.as_deref())),
        ("URL", output::or_dash(s.url.as_deref())),
        ("Policy", output::or_dash(s.policy.as_deref())),
        ("Category", output::or_dash(s.category.as_deref())),
        ("Transaction", output::or_dash(s.transaction.as_deref())),
        ("Started", output::or_dash(s.creation_time.as_deref())),
        ("Client sent", bytes(s.client_bytes_sent)),
        ("Client received", bytes(s.client_bytes_received)),
        ("Server sent", bytes(s.server_bytes_sent)),
        ("Server received", bytes(s.server_bytes_received)),
        (
            "Age",
            s.age_seconds.map_or_else(|| "-".into(), |a| format!("{a}s")),
        ),
        ("In use", output::or_dash(s.in_use.as_deref())),
    ];
    if let Some(at) = s.created_at {
        pairs.push(("Collected", at.to_rfc3339()));
    }
    output::detail_block(&pairs)
}

#[derive(Tabled)]
struct OverviewRow {
    #[tabled(rename = "Proxy")]
    proxy: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Main")]
    main: String,
    #[tabled(rename = "Clients")]
    clients: u64,
    #[tabled(rename = "Sessions")]
    sessions: u64,
}

impl From<&ProxySessions> for OverviewRow {
    fn from(p: &ProxySessions) -> Self {
        Self {
            proxy: format!("{} ({})", p.proxy_name, p.proxy_id),
            host: p.host.clone(),
            group: output::or_dash(p.group_name.as_deref()),
            main: output::flag(p.is_main),
            clients: p.unique_clients,
            sessions: p.total_sessions,
        }
    }
}

fn collected_detail(p: &ProxySessions) -> String {
    format!(
        "{} ({}): {} sessions from {} clients",
        p.proxy_name, p.host, p.total_sessions, p.unique_clients
    )
}

fn collect_detail(o: &CollectOutcome) -> String {
    let status = if o.success { "collected" } else { "failed" };
    match (o.saved, o.message.as_deref()) {
        (Some(n), Some(msg)) => format!("{status}: {n} sessions saved ({msg})"),
        (Some(n), None) => format!("{status}: {n} sessions saved"),
        (None, Some(msg)) => format!("{status}: {msg}"),
        (None, None) => status.to_owned(),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn session_filter(ctx: &Ctx, args: SessionFilterArgs) -> Result<SessionFilter, CliError> {
    Ok(SessionFilter {
        group_id: util::explicit_group(ctx, args.group.as_deref()).await?,
        proxy_id: args.proxy.map(ProxyId::from),
        keyword: args.keyword,
        protocol: args.protocol,
        status: args.status,
        client_ip: args.client_ip,
        server_ip: args.server_ip,
        user: args.user,
        url: args.url,
        page: None,
        page_size: None,
    })
}

fn write_export(out: &Path, body: &[u8]) -> Result<(), CliError> {
    if out.as_os_str() == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(body)?;
        stdout.flush()?;
        return Ok(());
    }
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, body)?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(ctx: &Ctx, args: SessionsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SessionsCommand::Overview => {
            let overview = ctx.console.session_overview().await?;
            let out = output::render_list(&global.output, &overview, |x| OverviewRow::from(x), |p| {
                p.proxy_id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SessionsCommand::Search {
            filter,
            page,
            page_size,
        } => {
            let mut filter = session_filter(ctx, filter).await?;
            filter.page = Some(page);
            filter.page_size = Some(page_size);
            let result = ctx.console.search_sessions(&filter).await?;

            let out = output::render_list(&global.output, &result.items, |x| SessionRow::from(x), |s| {
                s.id.to_string()
            });
            output::print_output(&out, global.quiet);
            if !global.quiet && matches!(global.output, OutputFormat::Table) {
                eprintln!(
                    "page {} of {} ({} sessions)",
                    result.page,
                    result.page_count(),
                    result.total
                );
            }
            Ok(())
        }

        SessionsCommand::Browse {
            start,
            length,
            search,
            group,
            proxy,
        } => {
            let request = SessionWindowRequest {
                draw: 1,
                start,
                length,
                search,
                group_id: util::explicit_group(ctx, group.as_deref()).await?,
                proxy_id: proxy.map(ProxyId::from),
            };
            let window = ctx.console.session_page(&request).await?;

            let out = output::render_list(&global.output, &window.records, |x| SessionRow::from(x), |s| {
                s.id.to_string()
            });
            output::print_output(&out, global.quiet);
            if !global.quiet && matches!(global.output, OutputFormat::Table) {
                let shown = u64::try_from(window.records.len()).unwrap_or(u64::MAX);
                let first = u64::from(start) + u64::from(shown > 0);
                eprintln!(
                    "rows {first}-{} of {} ({} total)",
                    u64::from(start) + shown,
                    window.filtered,
                    window.total
                );
            }
            Ok(())
        }

        SessionsCommand::Collect { group, proxy } => {
            if let Some(id) = proxy {
                let bar =
                    util::spinner(&format!("collecting sessions from proxy {id}"), global.quiet);
                let result = ctx.console.collect_proxy_sessions(ProxyId::from(id)).await;
                bar.finish_and_clear();
                let collected = result?;
                let out = output::render_single(&global.output, &collected, collected_detail, |p| {
                    p.total_sessions.to_string()
                });
                output::print_output(&out, global.quiet);
                return Ok(());
            }

            let Some(key) = group else {
                return Err(CliError::Validation {
                    field: "target".into(),
                    reason: "pass --group or --proxy".into(),
                });
            };
            let group = util::group_id(ctx, &key).await?;
            let bar = util::spinner(&format!("collecting sessions for group {key}"), global.quiet);
            let result = ctx.console.collect_group_sessions(group).await;
            bar.finish_and_clear();
            let outcome = result?;
            let out = output::render_single(&global.output, &outcome, collect_detail, |o| {
                o.saved.unwrap_or_default().to_string()
            });
            output::print_output(&out, global.quiet);
            if outcome.success {
                Ok(())
            } else {
                Err(CliError::ApiError {
                    message: outcome
                        .message
                        .unwrap_or_else(|| "session collection failed".into()),
                    status: None,
                })
            }
        }

        SessionsCommand::Get { id } => {
            let record = ctx.console.session_detail(SessionId::from(id)).await?;
            let out = output::render_single(&global.output, &record, session_detail, |s| {
                s.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SessionsCommand::Export { filter, out } => {
            let filter = session_filter(ctx, filter).await?;
            let bar = util::spinner("exporting sessions", global.quiet);
            let body = ctx.console.export_sessions(&filter).await;
            bar.finish_and_clear();
            let body = body?;
            write_export(&out, &body)?;
            if !global.quiet && out.as_os_str() != "-" {
                eprintln!(
                    "✓ wrote {} to {}",
                    output::human_bytes(u64::try_from(body.len()).unwrap_or(u64::MAX)),
                    out.display()
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_detail_mentions_saved_count() {
        let outcome = CollectOutcome {
            success: true,
            saved: Some(12),
            message: None,
        };
        assert_eq!(collect_detail(&outcome), "collected: 12 sessions saved");
    }

    #[test]
    fn export_writes_file_and_parents() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let path = dir.path().join("nested").join("sessions.csv");
        write_export(&path, b"id,client_ip\n1,10.0.0.1\n").unwrap_or_else(|e| panic!("{e}"));
        let written = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{e}"));
        assert!(written.starts_with("id,client_ip"));
    }
}
