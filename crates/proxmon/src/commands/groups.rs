//! Group command handlers.

use tabled::Tabled;

use proxmon_core::{Group, GroupForm, validate};

use super::{Ctx, util};
use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Proxies")]
    proxies: u32,
    #[tabled(rename = "Main")]
    main: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Group> for GroupRow {
    fn from(g: &Group) -> Self {
        Self {
            id: g.id.to_string(),
            name: g.name.clone(),
            proxies: g.proxy_count,
            main: output::or_dash(g.main_server.as_deref()),
            description: output::truncate(g.description.as_deref().unwrap_or_default(), 40),
        }
    }
}

fn detail(g: &Group) -> String {
    output::detail_block(&[
        ("ID", g.id.to_string()),
        ("Name", g.name.clone()),
        ("Description", output::or_dash(g.description.as_deref())),
        ("Proxies", g.proxy_count.to_string()),
        ("Main proxy", output::or_dash(g.main_server.as_deref())),
        (
            "Created",
            g.created_at.map_or_else(|| "-".into(), |t| t.to_rfc3339()),
        ),
        (
            "Updated",
            g.updated_at.map_or_else(|| "-".into(), |t| t.to_rfc3339()),
        ),
    ])
}

fn print_group(g: &Group, global: &GlobalOpts) {
    let out = output::render_single(&global.output, g, detail, |g| g.id.to_string());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx, args: GroupsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        GroupsCommand::List => {
            let groups = ctx.console.list_groups().await?;
            let out = output::render_list(&global.output, &groups, |x| GroupRow::from(x), |g| {
                g.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Get { group } => {
            let group = util::resolve_group(ctx, &group).await?;
            print_group(&group, global);
            Ok(())
        }

        GroupsCommand::Create { name, description } => {
            let mut form = GroupForm::create(name);
            form.description = description.unwrap_or_default();
            let group = ctx.console.save_group(&form).await?;
            print_group(&group, global);
            Ok(())
        }

        GroupsCommand::Update {
            group,
            name,
            description,
        } => {
            let existing = util::resolve_group(ctx, &group).await?;
            let mut form = GroupForm::edit(&existing);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(description) = description {
                form.description = description;
            }
            let group = ctx.console.save_group(&form).await?;
            print_group(&group, global);
            Ok(())
        }

        GroupsCommand::Delete { group } => {
            let group = util::resolve_group(ctx, &group).await?;
            validate::group_deletable(&group)?;
            if !util::confirm(&format!("Delete group '{}'?", group.name), global.yes)? {
                return Ok(());
            }
            ctx.console.delete_group(&group).await?;
            Ok(())
        }
    }
}
