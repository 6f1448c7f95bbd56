//! Proxy command handlers.

use tabled::Tabled;

use proxmon_core::{
    ConnectionTestResult, FormMode, Proxy, ProxyFilter, ProxyForm, ProxyId, SnmpVersion, TestMode,
};

use super::{Ctx, util};
use crate::cli::{
    GlobalOpts, ProxiesArgs, ProxiesCommand, ProxyCreateArgs, ProxyUpdateArgs, SnmpVersionArg,
};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProxyRow {
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
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "SSH")]
    ssh: u16,
    #[tabled(rename = "SNMP")]
    snmp: String,
}

impl From<&Proxy> for ProxyRow {
    fn from(p: &Proxy) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            host: p.host.clone(),
            group: output::or_dash(p.group_name.as_deref()),
            main: output::flag(p.is_main),
            active: if p.is_active { "yes" } else { "no" }.into(),
            ssh: p.ssh_port,
            snmp: format!("{} {}", p.snmp_version, p.snmp_port),
        }
    }
}

fn detail(p: &Proxy) -> String {
    output::detail_block(&[
        ("ID", p.id.to_string()),
        ("Name", p.name.clone()),
        ("Host", p.host.clone()),
        ("SSH", format!("{}@{}:{}", p.username, p.host, p.ssh_port)),
        (
            "SNMP",
            format!(
                "{} port {} community '{}'",
                p.snmp_version, p.snmp_port, p.snmp_community
            ),
        ),
        (
            "Group",
            match (&p.group_name, p.group_id) {
                (Some(name), Some(id)) => format!("{name} ({id})"),
                (None, Some(id)) => id.to_string(),
                _ => "-".into(),
            },
        ),
        ("Main", if p.is_main { "yes" } else { "no" }.into()),
        ("Active", if p.is_active { "yes" } else { "no" }.into()),
        ("Description", output::or_dash(p.description.as_deref())),
        (
            "Updated",
            p.updated_at.map_or_else(|| "-".into(), |t| t.to_rfc3339()),
        ),
    ])
}

fn test_detail(r: &ConnectionTestResult) -> String {
    let status = if r.success { "reachable" } else { "unreachable" };
    format!("{status}: {}", r.message)
}

fn snmp_version(arg: SnmpVersionArg) -> SnmpVersion {
    match arg {
        SnmpVersionArg::V1 => SnmpVersion::V1,
        SnmpVersionArg::V2c => SnmpVersion::V2c,
        SnmpVersionArg::V3 => SnmpVersion::V3,
    }
}

fn print_proxy(p: &Proxy, global: &GlobalOpts) {
    let out = output::render_single(&global.output, p, detail, |p| p.id.to_string());
    output::print_output(&out, global.quiet);
}

async fn create_form(ctx: &Ctx, args: ProxyCreateArgs) -> Result<ProxyForm, CliError> {
    let group_key = args.group.as_deref().or(ctx.default_group.as_deref());
    let group_id = match group_key {
        Some(key) => Some(util::group_id(ctx, key).await?),
        None => None,
    };
    let password = if args.ask_password {
        Some(util::prompt_password("SSH password: ")?)
    } else {
        None
    };

    Ok(ProxyForm {
        mode: FormMode::Create,
        name: args.name,
        host: args.host,
        ssh_port: args.ssh_port,
        snmp_port: args.snmp_port,
        snmp_version: snmp_version(args.snmp_version),
        snmp_community: args.community,
        username: args.username,
        password,
        group_id,
        is_main: args.main,
        is_active: !args.inactive,
        description: args.description.unwrap_or_default(),
    })
}

async fn apply_update(ctx: &Ctx, form: &mut ProxyForm, f: ProxyUpdateArgs) -> Result<(), CliError> {
    if let Some(v) = f.name {
        form.name = v;
    }
    if let Some(v) = f.host {
        form.host = v;
    }
    if let Some(v) = f.ssh_port {
        form.ssh_port = v;
    }
    if let Some(v) = f.snmp_port {
        form.snmp_port = v;
    }
    if let Some(v) = f.snmp_version {
        form.snmp_version = snmp_version(v);
    }
    if let Some(v) = f.community {
        form.snmp_community = v;
    }
    if let Some(v) = f.username {
        form.username = v;
    }
    if f.ask_password {
        form.password = Some(util::prompt_password("New SSH password: ")?);
    }
    if let Some(key) = f.group {
        form.group_id = Some(util::group_id(ctx, &key).await?);
    }
    if let Some(v) = f.main {
        form.is_main = v;
    }
    if let Some(v) = f.active {
        form.is_active = v;
    }
    if let Some(v) = f.description {
        form.description = v;
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx, args: ProxiesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProxiesCommand::List { group, main } => {
            let filter = ProxyFilter {
                group_id: util::explicit_group(ctx, group.as_deref()).await?,
                main_only: main,
            };
            let proxies = ctx.console.list_proxies(&filter).await?;
            let out = output::render_list(&global.output, &proxies, |x| ProxyRow::from(x), |p| {
                p.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProxiesCommand::Get { id } => {
            let proxy = ctx.console.get_proxy(ProxyId::from(id)).await?;
            print_proxy(&proxy, global);
            Ok(())
        }

        ProxiesCommand::Create(args) => {
            let form = create_form(ctx, args).await?;
            let proxy = ctx.console.save_proxy(&form).await?;
            print_proxy(&proxy, global);
            Ok(())
        }

        ProxiesCommand::Update { id, fields } => {
            let existing = ctx.console.get_proxy(ProxyId::from(id)).await?;
            let mut form = ProxyForm::edit(&existing);
            apply_update(ctx, &mut form, fields).await?;
            let proxy = ctx.console.save_proxy(&form).await?;
            print_proxy(&proxy, global);
            Ok(())
        }

        ProxiesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete proxy {id}?"), global.yes)? {
                return Ok(());
            }
            ctx.console.delete_proxy(ProxyId::from(id)).await?;
            Ok(())
        }

        ProxiesCommand::Test { id, deep } => {
            let mode = if deep { TestMode::Deep } else { TestMode::Quick };
            let bar = util::spinner(&format!("testing proxy {id} ({mode})"), global.quiet);
            let result = ctx.console.test_proxy(ProxyId::from(id), mode).await;
            bar.finish_and_clear();
            let result = result?;

            let out = output::render_single(&global.output, &result, test_detail, |r| {
                r.success.to_string()
            });
            output::print_output(&out, global.quiet);
            if result.success {
                Ok(())
            } else {
                Err(CliError::ProxyUnreachable {
                    proxy: id,
                    reason: result.message,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snmp_arg_maps_to_wire_version() {
        assert_eq!(snmp_version(SnmpVersionArg::V1).to_string(), "v1");
        assert_eq!(snmp_version(SnmpVersionArg::V2c).to_string(), "v2c");
        assert_eq!(snmp_version(SnmpVersionArg::V3).to_string(), "v3");
    }

    #[test]
    fn failed_test_reads_unreachable() {
        let result = ConnectionTestResult {
            success: false,
            message: "SSH timeout".into(),
            timestamp: None,
        };
        assert_eq!(test_detail(&result), "unreachable: SSH timeout");
    }
}
