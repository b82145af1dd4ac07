//! `tekstil list | create | update | delete`

use std::path::Path;

use anyhow::{Result, anyhow, bail};
use console::style;
use dialoguer::Confirm;
use serde::Serialize;
use serde::de::DeserializeOwned;

use tekstil::api::Resource;
use tekstil::api::models::{
    Customer, DyeRecipe, MaintenancePlan, MaintenanceRequest, Notification, Order, Permission,
    ProductionCard, QualityReport, RefakatCard, Role, SampleCard,
};
use tekstil::errors::FormError;
use tekstil::forms::FormSubmitter;
use tekstil::listing::{EntityList, ListQuery, Tabular};

use super::{AppContext, read_json};

fn parse_resource(name: &str) -> Result<Resource> {
    name.parse::<Resource>().map_err(|e| anyhow!(e))
}

pub async fn cmd_list(ctx: &AppContext, resource: &str, query: ListQuery, json: bool) -> Result<()> {
    let resource = parse_resource(resource)?;
    match resource {
        Resource::Customers => list_as::<Customer>(ctx, resource, &query, json).await,
        Resource::Orders => list_as::<Order>(ctx, resource, &query, json).await,
        Resource::Notifications => list_as::<Notification>(ctx, resource, &query, json).await,
        Resource::DyeRecipes => list_as::<DyeRecipe>(ctx, resource, &query, json).await,
        Resource::ProductionCards => list_as::<ProductionCard>(ctx, resource, &query, json).await,
        Resource::RefakatCards => list_as::<RefakatCard>(ctx, resource, &query, json).await,
        Resource::Maintenance => list_as::<MaintenanceRequest>(ctx, resource, &query, json).await,
        Resource::MaintenancePlans => {
            list_as::<MaintenancePlan>(ctx, resource, &query, json).await
        }
        Resource::QualityReports => list_as::<QualityReport>(ctx, resource, &query, json).await,
        Resource::SampleCards => list_as::<SampleCard>(ctx, resource, &query, json).await,
        Resource::Roles => list_as::<Role>(ctx, resource, &query, json).await,
        Resource::Permissions => list_as::<Permission>(ctx, resource, &query, json).await,
    }
}

async fn list_as<T>(ctx: &AppContext, resource: Resource, query: &ListQuery, json: bool) -> Result<()>
where
    T: Tabular + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let client = ctx.client()?;
    let list = EntityList::<T>::load(&client, &ctx.cache, resource)
        .await
        .map_err(|e| anyhow!("{} could not be loaded: {}", resource.title(), e.user_message()))?;
    let page = list.page(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    println!("{}", style(resource.title()).bold().cyan());
    println!();
    if page.items.is_empty() {
        if page.total_items > 0 {
            println!(
                "{}",
                style(format!(
                    "Sayfa {} boş ({} sayfa var).",
                    page.page, page.total_pages
                ))
                .dim()
            );
        } else {
            println!("{}", style("Kayıt bulunamadı.").dim());
        }
        return Ok(());
    }
    print!("{}", list.render_table(&page));
    Ok(())
}

/// Turn a submit failure into a readable error, listing every invalid field.
fn report(err: FormError) -> anyhow::Error {
    match err {
        FormError::Validation(errors) => {
            eprintln!("{}", style("Form is invalid:").red().bold());
            for e in errors.iter() {
                eprintln!("  - {}", e);
            }
            anyhow!("{} field(s) failed validation", errors.len())
        }
        FormError::Api(e) => anyhow!(e.user_message()),
    }
}

pub async fn cmd_create(ctx: &AppContext, resource: &str, data: &Path) -> Result<()> {
    let resource = parse_resource(resource)?;
    let body = read_json(data)?;
    let submitter = FormSubmitter::new(ctx.client()?, ctx.cache.clone());
    let created = submitter.create(resource, &body).await.map_err(report)?;
    println!("{}", style("Kayıt oluşturuldu.").green());
    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}

pub async fn cmd_update(ctx: &AppContext, resource: &str, id: i64, data: &Path) -> Result<()> {
    let resource = parse_resource(resource)?;
    let body = read_json(data)?;
    let submitter = FormSubmitter::new(ctx.client()?, ctx.cache.clone());
    let updated = submitter
        .update(resource, id, &body)
        .await
        .map_err(report)?;
    println!("{}", style("Kayıt güncellendi.").green());
    println!("{}", serde_json::to_string_pretty(&updated)?);
    Ok(())
}

pub async fn cmd_delete(ctx: &AppContext, resource: &str, id: i64, yes: bool) -> Result<()> {
    let resource = parse_resource(resource)?;
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {} #{}?", resource, id))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            bail!("Cancelled.");
        }
    }
    let submitter = FormSubmitter::new(ctx.client()?, ctx.cache.clone());
    submitter.delete(resource, id).await.map_err(report)?;
    println!("{}", style("Kayıt silindi.").green());
    Ok(())
}
