use anyhow::Result;
use colored::Colorize;
use kumactl_core::{Monitor, ReconciliationResult, Resource};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value(value: &impl Serialize, format: OutputFormat) -> Result<()> {
    println!("{}", render(value, format)?.trim_end());
    Ok(())
}

fn render(value: &impl Serialize, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json | OutputFormat::Table => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_result(result: &ReconciliationResult, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return print_value(result, format);
    }
    let mut builder = Builder::default();
    builder.push_record(["Changed", "Resource", "Message"]);
    builder.push_record([
        result.changed.to_string(),
        describe_resource(result.resource.as_ref()),
        result
            .error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string()),
    ]);
    println!("{}", builder.build().with(Style::rounded()));
    Ok(())
}

pub fn print_monitors(monitors: &[Monitor], format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return print_value(&monitors, format);
    }
    if monitors.is_empty() {
        println!("No monitors found.");
        return Ok(());
    }
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Tags", "Notifications"]);
    for monitor in monitors {
        let tags = monitor
            .tags
            .iter()
            .map(|link| match link.value.as_str() {
                "" => link.tag_name.clone(),
                value => format!("{}:{value}", link.tag_name),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let notifications = monitor
            .notification_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        builder.push_record([monitor.id.to_string(), monitor.name.clone(), tags, notifications]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    println!("Total: {}", monitors.len());
    Ok(())
}

fn describe_resource(resource: Option<&Resource>) -> String {
    match resource {
        Some(Resource::Tag(tag)) => format!("tag {} (#{}, {})", tag.name, tag.id, tag.color),
        Some(Resource::MonitorTag(link)) => format!(
            "monitor #{} tag {} = {:?}",
            link.monitor_id, link.tag_name, link.value
        ),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kumactl_core::{MonitorTagLink, Tag};
    use serde_json::json;

    #[test]
    fn test_yaml_keeps_strings_intact() {
        let value = json!({"changed": true, "msg": "line one\nline two", "name": "Tag: 1"});
        let yaml = render(&value, OutputFormat::Yaml).unwrap();

        let parsed: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_describe_resource() {
        let tag = Tag {
            id: 4,
            name: "env".to_string(),
            color: "#00ff00".to_string(),
        };
        assert_eq!(
            describe_resource(Some(&Resource::Tag(tag.clone()))),
            "tag env (#4, #00ff00)"
        );

        let link = MonitorTagLink::new(&tag, 9, "prod");
        assert_eq!(
            describe_resource(Some(&Resource::MonitorTag(link))),
            "monitor #9 tag env = \"prod\""
        );
        assert_eq!(describe_resource(None), "-");
    }
}
